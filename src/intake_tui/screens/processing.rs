//! Processing screen
//!
//! Hosts the status poller for one submitted task. Pending shows a
//! spinner; a completed status flips the view to the download prompt.
//! Tearing the screen down aborts the poll task, so no further status
//! queries leave the client after navigating away.

use std::path::PathBuf;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::intake_tui::ui::{centered_rect, Styles};

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Processing screen state
pub struct ProcessingScreen {
    pub task_id: Option<String>,
    poll_task: Option<JoinHandle<()>>,
    pub file_url: Option<String>,
    pub is_downloading: bool,
    pub downloaded_to: Option<PathBuf>,
    spinner_frame: usize,
}

impl ProcessingScreen {
    pub fn new() -> Self {
        Self {
            task_id: None,
            poll_task: None,
            file_url: None,
            is_downloading: false,
            downloaded_to: None,
            spinner_frame: 0,
        }
    }

    /// Begin tracking a task; any previous poll task is cancelled first.
    pub fn start(&mut self, task_id: String, poll_task: JoinHandle<()>) {
        self.cancel_polling();
        self.task_id = Some(task_id);
        self.poll_task = Some(poll_task);
        self.file_url = None;
        self.is_downloading = false;
        self.downloaded_to = None;
    }

    /// Record a completed task. Events for a task other than the one being
    /// tracked are stale and ignored.
    pub fn complete(&mut self, task_id: &str, file_url: String) {
        if self.task_id.as_deref() != Some(task_id) {
            debug!("Ignoring completion event for stale task {}", task_id);
            return;
        }
        self.file_url = Some(file_url);
        self.poll_task = None;
    }

    /// Abort the poll task, if one is running.
    pub fn cancel_polling(&mut self) {
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.task_id.is_some() && self.file_url.is_none()
    }

    pub fn is_completed(&self) -> bool {
        self.file_url.is_some()
    }

    /// Draw the processing screen
    pub fn draw(&mut self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(60, 40, area);

        let text = if let Some(file_url) = &self.file_url {
            let mut lines = vec![
                Line::from(Span::styled("The document is ready", Styles::title())),
                Line::from(""),
                Line::from(Span::styled(file_url.as_str(), Styles::info())),
                Line::from(""),
            ];
            if self.is_downloading {
                lines.push(Line::from(Span::styled("Downloading...", Styles::info())));
            } else if let Some(path) = &self.downloaded_to {
                lines.push(Line::from(Span::styled(
                    format!("Saved to {}", path.display()),
                    Styles::success(),
                )));
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "n: Submit another project | q: Quit",
                    Styles::inactive(),
                )));
            } else {
                lines.push(Line::from(Span::styled(
                    "d: Download the document | n: Submit another project | q: Quit",
                    Styles::inactive(),
                )));
            }
            lines
        } else {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
            let spinner = SPINNER_FRAMES[self.spinner_frame];
            vec![
                Line::from(Span::styled(
                    format!("{} Generating audit report...", spinner),
                    Styles::title(),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    format!(
                        "Task {}",
                        self.task_id.as_deref().unwrap_or("(no task)")
                    ),
                    Styles::inactive(),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Esc: Cancel and return to the form | q: Quit",
                    Styles::inactive(),
                )),
            ]
        };

        let widget = Paragraph::new(text)
            .alignment(ratatui::layout::Alignment::Center)
            .block(
                Block::default()
                    .title("Processing")
                    .borders(Borders::ALL)
                    .border_style(Styles::active_border()),
            );
        f.render_widget(ratatui::widgets::Clear, popup_area);
        f.render_widget(widget, popup_area);
    }
}

impl Drop for ProcessingScreen {
    fn drop(&mut self) {
        self.cancel_polling();
    }
}
