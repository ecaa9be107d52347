//! HTTP client for the audit backend
//!
//! All calls the client makes go through [`ApiClient`]: the one-shot
//! criteria fetch, the multipart submission, task-status checks, and the
//! final report download.

pub mod errors;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::{AuditCriteria, SubmissionFields, TaskStatusResponse, UploadResponse};
use crate::poller::StatusSource;
use errors::ApiError;

// Task-status checks always go to the local backend address, regardless of
// the configured base URL. Known inconsistency; see DESIGN.md.
const STATUS_BASE_URL: &str = "http://127.0.0.1:8000";

/// Failure bodies carry a human-readable `message` field.
#[derive(Debug, Deserialize)]
struct FailureBody {
    #[serde(default)]
    message: Option<String>,
}

pub struct ApiClient {
    http: Client,
    backend_url: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(config.http.user_agent.clone())
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self {
            http,
            backend_url: config.backend_url.clone(),
        })
    }

    /// Fetch the full audit-criteria list. Issued once per form session.
    pub async fn fetch_criteria(&self) -> Result<Vec<AuditCriteria>, ApiError> {
        let url = format!("{}/api/criteria", self.backend_url);
        debug!("Fetching audit criteria from {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Rejected {
                status_code: status.as_u16(),
                message: failure_message(&body),
            });
        }

        let criteria: Vec<AuditCriteria> = serde_json::from_str(&body)?;
        info!("Fetched {} audit criteria", criteria.len());
        Ok(criteria)
    }

    /// Post the form fields and attached files as one multipart request.
    ///
    /// The payload carries a single JSON-encoded `data` part for all scalar
    /// fields and one `file` part per attachment, in list order. Returns the
    /// task id issued by the backend.
    pub async fn submit(
        &self,
        fields: &SubmissionFields,
        files: &[PathBuf],
    ) -> Result<String, ApiError> {
        let url = format!("{}/api/upload/", self.backend_url);
        info!(
            "Submitting project '{}' with {} file(s)",
            fields.project_name,
            files.len()
        );

        let mut form = Form::new().text("data", serde_json::to_string(fields)?);
        for path in files {
            let bytes = tokio::fs::read(path).await.map_err(|source| {
                ApiError::Attachment {
                    path: path.clone(),
                    source,
                }
            })?;
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "attachment".to_string());
            form = form.part("file", Part::bytes(bytes).file_name(file_name));
        }

        let response = self.http.post(&url).multipart(form).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Rejected {
                status_code: status.as_u16(),
                message: failure_message(&body),
            });
        }

        let accepted: UploadResponse = serde_json::from_str(&body)?;
        info!("Submission accepted, task id {}", accepted.task_id);
        Ok(accepted.task_id)
    }

    /// Download a generated report to the given directory.
    ///
    /// The result URL handed out by the backend is absolute; relative URLs
    /// are resolved against the configured base.
    pub async fn download_report(
        &self,
        file_url: &str,
        output_dir: &Path,
    ) -> Result<PathBuf, ApiError> {
        std::fs::create_dir_all(output_dir)?;

        let url = if file_url.starts_with("http://") || file_url.starts_with("https://") {
            file_url.to_string()
        } else {
            format!("{}{}", self.backend_url, file_url)
        };
        info!("Downloading generated report from {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Rejected {
                status_code: status.as_u16(),
                message: format!("report download failed for {}", url),
            });
        }

        let output_path = output_dir.join(report_file_name(&url));
        let content = response.bytes().await?;
        std::fs::write(&output_path, &content)?;
        info!("Report saved to {}", output_path.display());

        Ok(output_path)
    }
}

#[async_trait]
impl StatusSource for ApiClient {
    async fn task_status(&self, task_id: &str) -> Result<TaskStatusResponse, ApiError> {
        let url = format!("{}/api/task-status/{}", STATUS_BASE_URL, task_id);
        debug!("Checking status for task {}", task_id);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Rejected {
                status_code: status.as_u16(),
                message: failure_message(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Best-effort extraction of the `message` field from a failure body.
fn failure_message(body: &str) -> String {
    serde_json::from_str::<FailureBody>(body)
        .ok()
        .and_then(|failure| failure.message)
        .unwrap_or_else(|| {
            warn!("Failure response had no message field");
            "no error message provided".to_string()
        })
}

/// File name for a downloaded report, taken from the last URL path segment.
fn report_file_name(url: &str) -> String {
    let trimmed = url.split(['?', '#']).next().unwrap_or(url);
    let last_segment = trimmed.rsplit('/').next().filter(|s| !s.is_empty());
    match last_segment {
        Some(name) => name.to_string(),
        None => format!(
            "audit_report_{}.docx",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        ),
    }
}
