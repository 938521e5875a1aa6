//! Commit-message rewriting: the `Closes #<prNo>` trailer.

use regex::Regex;

/// Append a `Closes #<prNo>` trailer to a commit message.
///
/// The message is normalized (CRLF to LF, trimmed) first. If it already
/// contains a recognized closing trailer for this PR number, it is
/// returned unchanged beyond normalization, so the rewrite is idempotent.
/// Otherwise the trailer is inserted immediately before a
/// `BREAKING CHANGE:` line when one exists (breaking-change notes stay
/// the trailing block), else appended at the end.
pub fn rewrite_commit_message(message: &str, pr_no: u64) -> String {
    let normalized = message.replace("\r\n", "\n").trim().to_string();

    if has_closing_trailer(&normalized, pr_no) {
        return normalized;
    }

    let trailer = format!("\n\nCloses #{pr_no}");
    let breaking = Regex::new(r"\n\s*BREAKING CHANGE:").expect("static regex");
    match breaking.find(&normalized) {
        Some(m) => format!(
            "{}{}{}",
            &normalized[..m.start()],
            trailer,
            &normalized[m.start()..]
        ),
        None => format!("{normalized}{trailer}"),
    }
}

/// Whether the message already closes this PR.
///
/// Recognizes the GitHub closing keywords, case-insensitively, followed
/// by `#<prNo>` at a non-digit boundary (so `Closes #423` does not count
/// as closing PR 42).
fn has_closing_trailer(message: &str, pr_no: u64) -> bool {
    let pattern = format!(
        r"(?i)\b(?:close[sd]?|fix(?:e[sd])?|resolve[sd]?)\s+#{pr_no}(?:[^0-9]|$)"
    );
    Regex::new(&pattern).expect("closing-trailer regex").is_match(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_trailer_by_default() {
        assert_eq!(rewrite_commit_message("foo bar", 42), "foo bar\n\nCloses #42");
    }

    #[test]
    fn test_places_trailer_before_breaking_change() {
        assert_eq!(
            rewrite_commit_message("foo\nBREAKING CHANGE: x", 42),
            "foo\n\nCloses #42\nBREAKING CHANGE: x"
        );
    }

    #[test]
    fn test_breaking_change_with_indentation() {
        assert_eq!(
            rewrite_commit_message("feat: thing\n\n  BREAKING CHANGE: api", 7),
            "feat: thing\n\nCloses #7\n\n  BREAKING CHANGE: api"
        );
    }

    #[test]
    fn test_normalizes_crlf_and_trims() {
        assert_eq!(
            rewrite_commit_message("  foo\r\nbar \n", 42),
            "foo\nbar\n\nCloses #42"
        );
    }

    #[test]
    fn test_idempotent_once_trailer_present() {
        let once = rewrite_commit_message("some fix", 42);
        let twice = rewrite_commit_message(&once, 42);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_recognizes_existing_closing_keywords() {
        for message in ["Fixes #42", "closed #42", "resolve #42.", "Fix for it\n\nCloses #42"] {
            assert_eq!(
                rewrite_commit_message(message, 42),
                message,
                "should not duplicate trailer for: {message}"
            );
        }
    }

    #[test]
    fn test_missing_hash_gets_trailer() {
        assert_eq!(
            rewrite_commit_message("Closes 42", 42),
            "Closes 42\n\nCloses #42"
        );
    }

    #[test]
    fn test_different_number_gets_trailer() {
        assert_eq!(
            rewrite_commit_message("Closes #423", 42),
            "Closes #423\n\nCloses #42"
        );
    }

    #[test]
    fn test_keyword_mid_message_counts() {
        let message = "fix(thing): frobnicate\n\nThis fixes #42 properly.";
        assert_eq!(rewrite_commit_message(message, 42), message);
    }
}
