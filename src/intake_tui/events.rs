//! Application events produced by background tasks
//!
//! The event loop drains these between redraws; screens never block on
//! network I/O themselves.

use std::path::PathBuf;

use crate::models::AuditCriteria;

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The one-shot criteria fetch resolved
    CriteriaLoaded(Vec<AuditCriteria>),
    /// The criteria fetch failed; the list stays empty, no retry
    CriteriaLoadFailed(String),

    /// The backend accepted the submission and issued a task id
    SubmissionAccepted(String),
    /// The submission failed; the form re-enables
    SubmissionFailed(String),

    /// The poller observed a completed status for the given task
    TaskCompleted { task_id: String, file_url: String },

    /// The report download finished
    DownloadFinished(PathBuf),
    /// The report download failed
    DownloadFailed(String),
}
