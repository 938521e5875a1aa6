//! The fixed phase definitions.
//!
//! Descriptions, per-phase error messages, and the rendered command lists
//! shown by `--instructions`. The actual work functions live in the
//! orchestrator; these definitions are pure data derived from the input.

use crate::config::Config;
use crate::phase::Phase;
use crate::types::MergeInput;

const CLEANUP_HINT: &str = "(Clean-up might be needed.)";

/// Build the ordered phase list for this input.
pub fn phase_list(input: &MergeInput, config: &Config) -> Vec<Phase> {
    let MergeInput {
        repo,
        branch,
        pr_no,
        temp_branch,
        patch_url,
    } = input;

    vec![
        Phase {
            number: 1,
            description: "Verifying the CLA signature".to_string(),
            instructions: vec![format!("{} {pr_no} --repo=\"{repo}\"", config.cla_tool)],
            error: Some("Failed to verify the CLA signature.".to_string()),
        },
        Phase {
            number: 2,
            description: "Fetching the PR as a local branch".to_string(),
            instructions: vec![
                format!("git checkout {branch}"),
                format!("git pull --rebase origin {branch}"),
                format!("git checkout -b {temp_branch}"),
                format!("curl -L {patch_url} | git am -3"),
            ],
            error: Some(format!("Failed to fetch the PR as a local branch. {CLEANUP_HINT}")),
        },
        Phase {
            number: 3,
            description: format!("Merging into '{branch}'"),
            instructions: vec![
                format!("git rev-list --count {branch}..HEAD"),
                format!("git checkout {branch}"),
                format!("git rebase {temp_branch}"),
                format!("git branch --delete --force {temp_branch}"),
                "git rebase --interactive HEAD~<commit count> (if more than 1 commit)".to_string(),
                format!("git commit --amend (append 'Closes #{pr_no}' to the message)"),
            ],
            error: Some(format!(
                "Failed to properly merge the PR into '{branch}'. {CLEANUP_HINT}"
            )),
        },
        Phase {
            number: 4,
            description: "Inspecting the changes".to_string(),
            instructions: vec![
                format!("git diff origin/{branch}"),
                "git log".to_string(),
            ],
            // Purely informational; no destructive state is introduced here
            error: None,
        },
        Phase {
            number: 5,
            description: "Running the CI checks".to_string(),
            instructions: vec![format!("{} ci-checks", config.ci_tool)],
            error: Some(format!(
                "Failed to run the CI checks or the CI checks didn't pass. {CLEANUP_HINT}"
            )),
        },
        Phase {
            number: 6,
            description: "Pushing to origin".to_string(),
            instructions: vec![format!("git push origin {branch}")],
            error: Some(format!("Failed to push the changes to origin. {CLEANUP_HINT}")),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileConfig;

    fn fixture() -> (MergeInput, Config) {
        let config =
            Config::resolve(&FileConfig::default(), None, None, Some("foo/bar"), Some("main"))
                .unwrap();
        (MergeInput::new(&config, 42), config)
    }

    #[test]
    fn test_phases_are_numbered_in_order() {
        let (input, config) = fixture();
        let phases = phase_list(&input, &config);
        let numbers: Vec<u8> = phases.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_instructions_are_interpolated() {
        let (input, config) = fixture();
        let phases = phase_list(&input, &config);

        assert!(phases[1].instructions.iter().any(|i| i.contains("pr-42")));
        assert!(
            phases[1]
                .instructions
                .iter()
                .any(|i| i.contains("/raw/foo/bar/pull/42.patch"))
        );
        assert_eq!(phases[5].instructions, vec!["git push origin main"]);
    }

    #[test]
    fn test_inspect_phase_has_no_error_message() {
        let (input, config) = fixture();
        let phases = phase_list(&input, &config);
        assert!(phases[3].error.is_none());
    }
}
