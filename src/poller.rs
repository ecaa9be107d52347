//! Task-status polling
//!
//! Polling-until-completion is modeled as an explicit two-state machine
//! driven by a repeating timer, independent of any UI: [`TaskState::Pending`]
//! until the backend reports the literal status `"completed"`, then
//! [`TaskState::Completed`] with the result URL. Cancellation is the
//! caller's side of the contract: the poller runs inside a spawned task
//! whose handle is aborted when the hosting view goes away.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::api::errors::ApiError;
use crate::models::TaskStatusResponse;

/// Fixed delay between status checks.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Externally observable task states. Any status other than `"completed"`
/// is Pending; nothing else is modeled client-side.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskState {
    Pending,
    Completed { file_url: String },
}

impl TaskState {
    fn from_response(response: &TaskStatusResponse) -> TaskState {
        if response.status == "completed" {
            if let Some(file_url) = &response.file_url {
                return TaskState::Completed {
                    file_url: file_url.clone(),
                };
            }
            // A completed status without a file URL is a malformed
            // response; stay pending and let the next tick retry.
            warn!("Task reported completed without a file_url");
        }
        TaskState::Pending
    }
}

/// Source of task-status responses. The API client is the production
/// implementation; tests substitute scripted sources.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn task_status(&self, task_id: &str) -> Result<TaskStatusResponse, ApiError>;
}

#[async_trait]
impl<'a, S: StatusSource + ?Sized> StatusSource for &'a S {
    async fn task_status(&self, task_id: &str) -> Result<TaskStatusResponse, ApiError> {
        (**self).task_status(task_id).await
    }
}

#[async_trait]
impl<S: StatusSource + ?Sized> StatusSource for std::sync::Arc<S> {
    async fn task_status(&self, task_id: &str) -> Result<TaskStatusResponse, ApiError> {
        (**self).task_status(task_id).await
    }
}

pub struct StatusPoller<S> {
    source: S,
    interval: Duration,
}

impl<S: StatusSource> StatusPoller<S> {
    pub fn new(source: S, interval: Duration) -> Self {
        Self { source, interval }
    }

    /// Issue one status check and fold the response into a [`TaskState`].
    ///
    /// A failed check is logged and treated as still pending; the caller's
    /// timer retries on the next tick. No distinction is made between
    /// transient and permanent failures.
    pub async fn check(&self, task_id: &str) -> TaskState {
        match self.source.task_status(task_id).await {
            Ok(response) => {
                debug!(status = %response.status, "Task status received");
                TaskState::from_response(&response)
            }
            Err(e) => {
                warn!("Status check for task {} failed: {}", task_id, e);
                TaskState::Pending
            }
        }
    }

    /// Poll until the task completes, returning the result file URL.
    ///
    /// One status check per interval, issued strictly sequentially: a tick
    /// awaits its response before the next check goes out. Unbounded: no
    /// backoff, no retry cap, no timeout. The only way out short of
    /// completion is aborting the future.
    pub async fn run_to_completion(&self, task_id: &str) -> String {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of a tokio interval resolves immediately; consume
        // it so the first check waits one full interval.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if let TaskState::Completed { file_url } = self.check(task_id).await {
                return file_url;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Scripted status source: plays back a fixed sequence of responses,
    /// repeating the last one forever, and counts every query.
    struct ScriptedSource {
        responses: Mutex<Vec<TaskStatusResponse>>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedSource {
        fn new(statuses: Vec<(&str, Option<&str>)>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let responses = statuses
                .into_iter()
                .map(|(status, file_url)| TaskStatusResponse {
                    status: status.to_string(),
                    file_url: file_url.map(str::to_string),
                    message: None,
                })
                .collect();
            (
                Self {
                    responses: Mutex::new(responses),
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedSource {
        async fn task_status(&self, _task_id: &str) -> Result<TaskStatusResponse, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().unwrap();
            if responses.len() > 1 {
                Ok(responses.remove(0))
            } else {
                Ok(responses[0].clone())
            }
        }
    }

    /// Source that always fails, as if the backend were unreachable.
    struct FailingSource {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl StatusSource for FailingSource {
        async fn task_status(&self, _task_id: &str) -> Result<TaskStatusResponse, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ApiError::Rejected {
                status_code: 502,
                message: "bad gateway".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_polls_until_completed_then_stops() {
        let (source, calls) = ScriptedSource::new(vec![
            ("processing", None),
            ("processing", None),
            ("completed", Some("http://127.0.0.1:8000/media/report.docx")),
        ]);
        let poller = StatusPoller::new(source, Duration::from_millis(10));

        let file_url = poller.run_to_completion("task-1").await;
        assert_eq!(file_url, "http://127.0.0.1:8000/media/report.docx");
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        // The poller returned; no timer is left behind to issue more checks.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_completed_statuses_keep_polling() {
        let (source, calls) = ScriptedSource::new(vec![
            ("queued", None),
            ("processing", None),
            ("error", None),
            ("completed", Some("http://127.0.0.1:8000/media/report.docx")),
        ]);
        let poller = StatusPoller::new(source, Duration::from_millis(10));

        poller.run_to_completion("task-2").await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_failed_checks_are_retried_on_next_tick() {
        let calls = Arc::new(AtomicUsize::new(0));
        let poller = StatusPoller::new(
            FailingSource {
                calls: calls.clone(),
            },
            Duration::from_millis(10),
        );

        let state = poller.check("task-3").await;
        assert_eq!(state, TaskState::Pending);

        // Failures never terminate the loop; abort it after a few ticks.
        let poll_task = tokio::spawn(async move {
            poller.run_to_completion("task-3").await;
        });
        tokio::time::sleep(Duration::from_millis(55)).await;
        poll_task.abort();

        assert!(calls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_completed_without_file_url_stays_pending() {
        let (source, _calls) = ScriptedSource::new(vec![("completed", None)]);
        let poller = StatusPoller::new(source, Duration::from_millis(10));

        assert_eq!(poller.check("task-4").await, TaskState::Pending);
    }

    #[tokio::test]
    async fn test_abort_prevents_further_checks() {
        let (source, calls) = ScriptedSource::new(vec![("processing", None)]);
        let poller = StatusPoller::new(source, Duration::from_millis(10));

        let poll_task = tokio::spawn(async move {
            poller.run_to_completion("task-5").await;
        });

        tokio::time::sleep(Duration::from_millis(35)).await;
        poll_task.abort();
        let after_abort = calls.load(Ordering::SeqCst);
        assert!(after_abort >= 1);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(calls.load(Ordering::SeqCst), after_abort);
    }

    #[tokio::test]
    async fn test_first_check_waits_one_interval() {
        let (source, calls) = ScriptedSource::new(vec![("completed", Some("u"))]);
        let poller = StatusPoller::new(source, Duration::from_millis(40));

        let poll_task = tokio::spawn(async move {
            poller.run_to_completion("task-6").await;
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        poll_task.await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
