//! Clean-up task bookkeeping for the merge workflow.
//!
//! Every destructive step of the merge registers a reversal action here
//! (abort the rebase, delete the temp branch, check the original branch
//! back out, ...). While the risk covered by an action is live, the action
//! is *scheduled* on a pending stack; once the risk has passed it is
//! retired. If a phase fails with tasks still pending, the stack is drained
//! top-down, so later actions are undone before earlier ones.
//!
//! The catalog of tasks is fixed at construction; only the pending stack
//! changes during a run. Callers must not schedule a task that is already
//! pending without unscheduling it first (the stack model assumes each
//! task appears at most once; this is a caller contract, not enforced).

use crate::error::Result;
use crate::style::Stylize;
use anstream::println;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Boxed future returned by a clean-up action.
pub type CleanupFuture = Pin<Box<dyn Future<Output = Result<()>> + Send + 'static>>;

/// A boxed reversal operation.
///
/// Actions covering steps that may legitimately have nothing to undo
/// (e.g. "abort rebase" when no rebase is in progress) should swallow
/// their own errors so a failing reversal never blocks the rest of the
/// drain.
pub type CleanupAction = Arc<dyn Fn() -> CleanupFuture + Send + Sync>;

/// Opaque handle to a registered clean-up task.
///
/// Only the registry that issued it can resolve it, which keeps task
/// identity unforgeable even when two tasks share a description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskId(usize);

struct CleanupTask {
    description: String,
    action: CleanupAction,
}

#[derive(Default)]
struct Inner {
    /// Fixed catalog, indexed by `TaskId`. Entries are never removed.
    tasks: Vec<CleanupTask>,
    /// LIFO stack of currently-pending task ids.
    pending: Vec<TaskId>,
}

/// Registry of named reversal actions plus the stack of pending ones.
///
/// The mutex is only held in synchronous sections (never across an await):
/// the tool is single-logical-threaded, but the futures still have to be
/// `Send` under the multi-threaded runtime.
#[derive(Default)]
pub struct CleanupRegistry {
    inner: Mutex<Inner>,
}

impl CleanupRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task to the catalog and return its handle.
    ///
    /// Called once per task at orchestrator construction; never fails.
    pub fn register<F, Fut>(&self, description: impl Into<String>, action: F) -> TaskId
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let mut inner = self.inner.lock().expect("cleanup registry poisoned");
        let id = TaskId(inner.tasks.len());
        inner.tasks.push(CleanupTask {
            description: description.into(),
            action: Arc::new(move || -> CleanupFuture { Box::pin(action()) }),
        });
        id
    }

    /// Push a task onto the pending stack.
    ///
    /// Pushes unconditionally; see the module docs for the
    /// no-double-scheduling caller contract.
    pub fn schedule(&self, id: TaskId) {
        let mut inner = self.inner.lock().expect("cleanup registry poisoned");
        debug!(task = %inner.tasks[id.0].description, "scheduling clean-up task");
        inner.pending.push(id);
    }

    /// Remove the most recent occurrence of a task from the pending stack.
    ///
    /// No-op when the task is not pending.
    pub fn unschedule(&self, id: TaskId) {
        let mut inner = self.inner.lock().expect("cleanup registry poisoned");
        if let Some(pos) = inner.pending.iter().rposition(|pending| *pending == id) {
            debug!(task = %inner.tasks[id.0].description, "retiring clean-up task");
            inner.pending.remove(pos);
        }
    }

    /// Whether any tasks are currently pending.
    pub fn has_pending(&self) -> bool {
        let inner = self.inner.lock().expect("cleanup registry poisoned");
        !inner.pending.is_empty()
    }

    /// Descriptions of the pending tasks, most recently scheduled first.
    pub fn pending_descriptions(&self) -> Vec<String> {
        let inner = self.inner.lock().expect("cleanup registry poisoned");
        inner
            .pending
            .iter()
            .rev()
            .map(|id| inner.tasks[id.0].description.clone())
            .collect()
    }

    /// Drain the pending stack in LIFO order.
    ///
    /// Each task's description is reported as it is popped. Unless
    /// `list_only`, the task's action is invoked and awaited before the
    /// next one is popped. A failing action is reported and the drain
    /// continues with the remaining tasks; the drain itself still
    /// returns `Ok`.
    pub async fn run_cleanup(&self, list_only: bool) -> Result<()> {
        loop {
            let Some((description, action)) = self.pop() else {
                return Ok(());
            };

            println!("  - {}", description.accent());
            if list_only {
                continue;
            }

            if let Err(err) = action().await {
                warn!(task = %description, error = %err, "clean-up task failed");
                println!(
                    "    {}",
                    format!("(failed: {err} - needs manual attention)").warn()
                );
            }
        }
    }

    /// Schedule `id` for the duration of `work`.
    ///
    /// The task is unscheduled again when `work` settles, on both the
    /// success and failure path, and `work`'s outcome is passed through.
    pub async fn with_task<T, Fut>(&self, id: TaskId, work: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        self.schedule(id);
        let result = work.await;
        self.unschedule(id);
        result
    }

    fn pop(&self) -> Option<(String, CleanupAction)> {
        let mut inner = self.inner.lock().expect("cleanup registry poisoned");
        let id = inner.pending.pop()?;
        let task = &inner.tasks[id.0];
        Some((task.description.clone(), Arc::clone(&task.action)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    /// Registry plus a log of which actions ran, in order.
    fn recording_registry() -> (CleanupRegistry, Arc<Mutex<Vec<&'static str>>>) {
        (CleanupRegistry::new(), Arc::new(Mutex::new(Vec::new())))
    }

    fn register_recording(
        registry: &CleanupRegistry,
        log: &Arc<Mutex<Vec<&'static str>>>,
        name: &'static str,
    ) -> TaskId {
        let log = Arc::clone(log);
        registry.register(name, move || {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(name);
                Ok(())
            }
        })
    }

    #[tokio::test]
    async fn test_cleanup_runs_in_lifo_order() {
        let (registry, log) = recording_registry();
        let a = register_recording(&registry, &log, "a");
        let b = register_recording(&registry, &log, "b");
        let c = register_recording(&registry, &log, "c");

        registry.schedule(a);
        registry.schedule(b);
        registry.schedule(c);
        registry.run_cleanup(false).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["c", "b", "a"]);
        assert!(!registry.has_pending());
    }

    #[tokio::test]
    async fn test_cleanup_order_independent_of_registration_order() {
        let (registry, log) = recording_registry();
        let a = register_recording(&registry, &log, "a");
        let b = register_recording(&registry, &log, "b");

        // Schedule in the opposite order from registration
        registry.schedule(b);
        registry.schedule(a);
        registry.run_cleanup(false).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_list_only_drains_without_running_actions() {
        let (registry, log) = recording_registry();
        let a = register_recording(&registry, &log, "a");

        registry.schedule(a);
        registry.run_cleanup(true).await.unwrap();

        assert!(log.lock().unwrap().is_empty());
        assert!(!registry.has_pending());
    }

    #[tokio::test]
    async fn test_drain_continues_past_failing_action() {
        let (registry, log) = recording_registry();
        let ok_task = register_recording(&registry, &log, "ok");
        let failing = registry.register("failing", || async {
            Err(Error::Internal("boom".to_string()))
        });

        // `failing` is on top, so it runs (and fails) first
        registry.schedule(ok_task);
        registry.schedule(failing);
        registry.run_cleanup(false).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["ok"]);
        assert!(!registry.has_pending());
    }

    #[tokio::test]
    async fn test_unschedule_removes_most_recent_occurrence() {
        let (registry, log) = recording_registry();
        let a = register_recording(&registry, &log, "a");
        let b = register_recording(&registry, &log, "b");

        registry.schedule(a);
        registry.schedule(b);
        registry.unschedule(b);
        registry.run_cleanup(false).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_unschedule_is_noop_when_absent() {
        let (registry, log) = recording_registry();
        let a = register_recording(&registry, &log, "a");
        let b = register_recording(&registry, &log, "b");

        registry.schedule(a);
        // b was never scheduled
        registry.unschedule(b);

        assert!(registry.has_pending());
        registry.run_cleanup(false).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_with_task_unschedules_on_success() {
        let (registry, log) = recording_registry();
        let a = register_recording(&registry, &log, "a");

        let value = registry.with_task(a, async { Ok(42) }).await.unwrap();

        assert_eq!(value, 42);
        assert!(!registry.has_pending());
    }

    #[tokio::test]
    async fn test_with_task_unschedules_on_failure() {
        let (registry, log) = recording_registry();
        let a = register_recording(&registry, &log, "a");

        let result: Result<()> = registry
            .with_task(a, async { Err(Error::Internal("boom".to_string())) })
            .await;

        assert!(matches!(result, Err(Error::Internal(_))));
        assert!(!registry.has_pending());
    }

    #[tokio::test]
    async fn test_with_task_is_pending_while_work_runs() {
        let (registry, log) = recording_registry();
        let _ = log;
        let registry = Arc::new(registry);
        let a = registry.register("a", || async { Ok(()) });

        let inner = Arc::clone(&registry);
        registry
            .with_task(a, async move {
                assert!(inner.has_pending());
                Ok(())
            })
            .await
            .unwrap();

        assert!(!registry.has_pending());
    }

    #[test]
    fn test_pending_descriptions_most_recent_first() {
        let registry = CleanupRegistry::new();
        let a = registry.register("undo a", || async { Ok(()) });
        let b = registry.register("undo b", || async { Ok(()) });

        registry.schedule(a);
        registry.schedule(b);

        assert_eq!(registry.pending_descriptions(), vec!["undo b", "undo a"]);
    }

    #[test]
    fn test_duplicate_descriptions_stay_distinct() {
        let registry = CleanupRegistry::new();
        let a = registry.register("same", || async { Ok(()) });
        let b = registry.register("same", || async { Ok(()) });

        assert_ne!(a, b);
        registry.schedule(a);
        assert!(registry.has_pending());
        registry.unschedule(b);
        // b was never scheduled, so a must still be pending
        assert!(registry.has_pending());
    }
}
