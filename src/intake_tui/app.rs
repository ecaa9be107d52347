//! Main TUI application state and logic

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::events::AppEvent;
use super::screens::form::FormField;
use super::screens::{FormScreen, ProcessingScreen, SuccessScreen};
use super::ui::Styles;
use super::Entry;
use crate::api::ApiClient;
use crate::config::Config;
use crate::poller::{StatusPoller, POLL_INTERVAL};

/// Application screens
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Screen {
    Form,
    Processing,
    Success,
}

/// Main TUI application state
pub struct App {
    /// Current active screen
    pub current_screen: Screen,
    /// Application configuration
    pub config: Config,
    client: Arc<ApiClient>,

    // Screen states
    pub form: FormScreen,
    pub processing: ProcessingScreen,
    pub success: SuccessScreen,

    // Global application state
    pub should_quit: bool,
    pub status_message: Option<String>,
    pub error_message: Option<String>,

    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl App {
    /// Create a new TUI application, entering at the given route
    pub fn new(config: Config, entry: Entry) -> Result<Self> {
        let client = Arc::new(ApiClient::new(&config)?);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let mut app = Self {
            current_screen: Screen::Form,
            config,
            client,

            form: FormScreen::new(),
            processing: ProcessingScreen::new(),
            success: SuccessScreen::new(),

            should_quit: false,
            status_message: None,
            error_message: None,

            events_tx,
            events_rx,
        };

        match entry {
            Entry::Form => app.start_new_form(),
            Entry::Processing { task_id } => {
                app.current_screen = Screen::Processing;
                app.start_polling(task_id);
            }
            Entry::Result { file_url } => {
                app.current_screen = Screen::Success;
                app.success.file_url = file_url;
            }
        }

        Ok(app)
    }

    /// Run the main application loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;

            // Drain events from background tasks before waiting on input
            while let Ok(app_event) = self.events_rx.try_recv() {
                self.handle_app_event(app_event);
            }

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }

            // Advance the criteria selector's deferred-close deadline
            self.form.criteria_select.tick();

            if self.should_quit {
                break;
            }
        }

        // Leaving the app tears the processing view down with it
        self.processing.cancel_polling();
        Ok(())
    }

    /// Reset to a fresh form session; the criteria list is fetched anew
    pub fn start_new_form(&mut self) {
        self.processing.cancel_polling();
        self.processing = ProcessingScreen::new();
        self.success = SuccessScreen::new();
        self.form = FormScreen::new();
        self.current_screen = Screen::Form;
        self.clear_messages();
        self.spawn_criteria_fetch();
    }

    /// One-shot criteria fetch for the current form session
    fn spawn_criteria_fetch(&self) {
        let client = self.client.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            match client.fetch_criteria().await {
                Ok(criteria) => {
                    let _ = tx.send(AppEvent::CriteriaLoaded(criteria));
                }
                Err(e) => {
                    warn!("Criteria fetch failed: {}", e);
                    let _ = tx.send(AppEvent::CriteriaLoadFailed(e.to_string()));
                }
            }
        });
    }

    /// Spawn the status poller for a task and hand its handle to the
    /// processing screen, which owns cancellation.
    fn start_polling(&mut self, task_id: String) {
        let poller = StatusPoller::new(self.client.clone(), POLL_INTERVAL);
        let tx = self.events_tx.clone();
        let id = task_id.clone();
        let poll_task = tokio::spawn(async move {
            let file_url = poller.run_to_completion(&id).await;
            let _ = tx.send(AppEvent::TaskCompleted {
                task_id: id,
                file_url,
            });
        });
        self.processing.start(task_id, poll_task);
    }

    /// Validate and submit the form in a background task
    fn submit_form(&mut self) {
        let fields = self.form.collect_fields();
        if let Some(missing) = fields.first_missing_field() {
            self.set_error(format!("{} is required", missing));
            return;
        }

        self.form.is_submitting = true;
        self.clear_messages();

        let files = self.form.files.paths();
        let client = self.client.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            match client.submit(&fields, &files).await {
                Ok(task_id) => {
                    let _ = tx.send(AppEvent::SubmissionAccepted(task_id));
                }
                Err(e) => {
                    error!("Submission failed: {}", e);
                    let _ = tx.send(AppEvent::SubmissionFailed(e.to_string()));
                }
            }
        });
    }

    /// Download the generated report in a background task
    fn start_download(&mut self, file_url: String) {
        match self.current_screen {
            Screen::Processing => self.processing.is_downloading = true,
            Screen::Success => self.success.is_downloading = true,
            Screen::Form => return,
        }
        self.set_status("Downloading report...".to_string());

        let client = self.client.clone();
        let output_dir = self.config.download_dir.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            match client.download_report(&file_url, &output_dir).await {
                Ok(path) => {
                    let _ = tx.send(AppEvent::DownloadFinished(path));
                }
                Err(e) => {
                    error!("Report download failed: {}", e);
                    let _ = tx.send(AppEvent::DownloadFailed(e.to_string()));
                }
            }
        });
    }

    /// Fold a background-task event into screen state
    fn handle_app_event(&mut self, app_event: AppEvent) {
        match app_event {
            AppEvent::CriteriaLoaded(criteria) => {
                info!("Loaded {} audit criteria", criteria.len());
                self.form.criteria_select.set_criteria(criteria);
            }
            AppEvent::CriteriaLoadFailed(message) => {
                self.set_error(format!("Could not fetch criteria: {}", message));
            }
            AppEvent::SubmissionAccepted(task_id) => {
                self.form.is_submitting = false;
                self.set_status(format!("Submission accepted, task {}", task_id));
                self.start_polling(task_id);
                self.current_screen = Screen::Processing;
            }
            AppEvent::SubmissionFailed(message) => {
                self.form.is_submitting = false;
                self.set_error(format!("Submission failed: {}", message));
            }
            AppEvent::TaskCompleted { task_id, file_url } => {
                self.processing.complete(&task_id, file_url);
                if self.processing.is_completed() {
                    self.set_status("The report is ready".to_string());
                }
            }
            AppEvent::DownloadFinished(path) => {
                match self.current_screen {
                    Screen::Processing => {
                        self.processing.is_downloading = false;
                        self.processing.downloaded_to = Some(path.clone());
                    }
                    Screen::Success => {
                        self.success.is_downloading = false;
                        self.success.downloaded_to = Some(path.clone());
                    }
                    Screen::Form => {}
                }
                self.set_status(format!("Report saved to {}", path.display()));
            }
            AppEvent::DownloadFailed(message) => {
                self.processing.is_downloading = false;
                self.success.is_downloading = false;
                self.set_error(format!("Download failed: {}", message));
            }
        }
    }

    /// Handle keyboard input events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        // Ctrl+C quits from anywhere, including text inputs
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.current_screen {
            Screen::Form => self.handle_form_key(key),
            Screen::Processing => self.handle_processing_key(key),
            Screen::Success => self.handle_success_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        // The form is disabled while a submission is in flight
        if self.form.is_submitting {
            return;
        }

        if self.form.show_premise_dropdown {
            match key.code {
                KeyCode::Up => self.form.premise_list.previous(),
                KeyCode::Down => self.form.premise_list.next(),
                KeyCode::Enter | KeyCode::Esc => self.form.show_premise_dropdown = false,
                _ => {}
            }
            return;
        }

        let focused = self.form.focused();

        // An open suggestion panel takes the navigation keys
        if focused == FormField::Criteria && self.form.criteria_select.panel_open {
            match key.code {
                KeyCode::Up => {
                    self.form.criteria_select.highlight_previous();
                    return;
                }
                KeyCode::Down => {
                    self.form.criteria_select.highlight_next();
                    return;
                }
                KeyCode::Enter => {
                    if let Some(criterion) = self.form.criteria_select.select_highlighted() {
                        self.set_status(format!("Selected criterion {}", criterion.criteria_id));
                    }
                    return;
                }
                KeyCode::Esc => {
                    self.form.criteria_select.panel_open = false;
                    return;
                }
                _ => {}
            }
        }

        match key.code {
            KeyCode::Tab => self.form.next_field(),
            KeyCode::BackTab => self.form.previous_field(),
            KeyCode::Enter => match focused {
                FormField::Premise => {
                    if self.form.premise_list.selected_index().is_none() {
                        self.form.premise_list.select(Some(0));
                    }
                    self.form.show_premise_dropdown = true;
                }
                FormField::Criteria => self.form.criteria_select.on_focus(),
                FormField::FileInput => {
                    let added = self.form.files.add_from_input();
                    if added > 0 {
                        self.set_status(format!("Added {} file(s)", added));
                    }
                }
                FormField::FileListing => {}
                _ => self.submit_form(),
            },
            KeyCode::Up => {
                if focused == FormField::FileListing {
                    self.form.files.select_previous();
                } else {
                    self.form.previous_field();
                }
            }
            KeyCode::Down => {
                if focused == FormField::FileListing {
                    self.form.files.select_next();
                } else {
                    self.form.next_field();
                }
            }
            KeyCode::Delete => {
                if focused == FormField::FileListing {
                    if let Some(removed) = self.form.files.remove_selected() {
                        self.set_status(format!("Removed {}", removed.name()));
                    }
                } else {
                    self.form.handle_delete();
                }
            }
            KeyCode::Backspace => {
                if focused == FormField::FileListing {
                    if let Some(removed) = self.form.files.remove_selected() {
                        self.set_status(format!("Removed {}", removed.name()));
                    }
                } else {
                    self.form.handle_backspace();
                }
            }
            KeyCode::Char(c) => self.form.handle_char_input(c),
            KeyCode::Left => self.form.handle_cursor_left(),
            KeyCode::Right => self.form.handle_cursor_right(),
            KeyCode::Home => self.form.handle_cursor_home(),
            KeyCode::End => self.form.handle_cursor_end(),
            KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_processing_key(&mut self, key: KeyEvent) {
        if self.processing.is_downloading {
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => {
                // Tearing the view down stops the poll timer
                if self.processing.is_pending() {
                    info!("Cancelled polling for task {:?}", self.processing.task_id);
                }
                self.start_new_form();
            }
            KeyCode::Char('d') => {
                if let Some(file_url) = self.processing.file_url.clone() {
                    if self.processing.downloaded_to.is_none() {
                        self.start_download(file_url);
                    }
                }
            }
            KeyCode::Char('n') => {
                if self.processing.is_completed() {
                    self.start_new_form();
                }
            }
            _ => {}
        }
    }

    fn handle_success_key(&mut self, key: KeyEvent) {
        if self.success.is_downloading {
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc | KeyCode::Char('n') => self.start_new_form(),
            KeyCode::Char('d') => {
                if let Some(file_url) = self.success.file_url.clone() {
                    if self.success.downloaded_to.is_none() {
                        self.start_download(file_url);
                    }
                }
            }
            _ => {}
        }
    }

    /// Draw the UI
    pub fn draw(&mut self, f: &mut Frame) {
        let size = f.size();

        // Main layout: status bar at bottom, content area above
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        match self.current_screen {
            Screen::Form => self.form.draw(f, chunks[0]),
            Screen::Processing => self.processing.draw(f, chunks[0]),
            Screen::Success => self.success.draw(f, chunks[0]),
        }

        self.draw_status_bar(f, chunks[1]);
    }

    /// Draw status bar with current screen info and shortcuts
    fn draw_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = if let Some(ref msg) = self.status_message {
            format!("Status: {}", msg)
        } else if let Some(ref err) = self.error_message {
            format!("Error: {}", err)
        } else {
            format!(
                "BREEAM Intake - {}",
                match self.current_screen {
                    Screen::Form => "Submission Form",
                    Screen::Processing => "Processing",
                    Screen::Success => "Result",
                }
            )
        };

        let style = if self.error_message.is_some() {
            Styles::error()
        } else if self.status_message.is_some() {
            Styles::success()
        } else {
            Styles::inactive()
        };

        let status_bar = Paragraph::new(status_text)
            .style(style)
            .block(Block::default().borders(Borders::ALL));

        f.render_widget(status_bar, area);
    }

    /// Set status message
    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
        self.error_message = None;
    }

    /// Set error message
    pub fn set_error(&mut self, message: String) {
        self.error_message = Some(message);
        self.status_message = None;
    }

    /// Clear status and error messages
    pub fn clear_messages(&mut self) {
        self.status_message = None;
        self.error_message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;

    fn test_app(entry: Entry) -> App {
        let config = Config {
            backend_url: "http://127.0.0.1:8000".to_string(),
            download_dir: "./downloads".into(),
            http: HttpConfig::default(),
        };
        App::new(config, entry).unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn test_submit_with_empty_form_sets_required_error() {
        let mut app = test_app(Entry::Form);

        // Jump to the submit button and press Enter
        while app.form.focused() != FormField::Submit {
            app.form.next_field();
        }
        app.handle_key_event(key(KeyCode::Enter));

        assert!(!app.form.is_submitting);
        assert_eq!(
            app.error_message.as_deref(),
            Some("Project name is required")
        );
    }

    #[tokio::test]
    async fn test_submission_failure_reenables_form() {
        let mut app = test_app(Entry::Form);
        app.form.is_submitting = true;

        app.handle_app_event(AppEvent::SubmissionFailed("connection refused".to_string()));

        assert!(!app.form.is_submitting);
        assert_eq!(app.current_screen, Screen::Form);
        assert!(app
            .error_message
            .as_deref()
            .unwrap()
            .contains("connection refused"));
    }

    #[tokio::test]
    async fn test_submission_accepted_navigates_to_processing() {
        let mut app = test_app(Entry::Form);
        app.form.is_submitting = true;

        app.handle_app_event(AppEvent::SubmissionAccepted("task-7".to_string()));

        assert_eq!(app.current_screen, Screen::Processing);
        assert_eq!(app.processing.task_id.as_deref(), Some("task-7"));
        assert!(app.processing.is_pending());
        app.processing.cancel_polling();
    }

    #[tokio::test]
    async fn test_task_completed_event_updates_processing_screen() {
        let mut app = test_app(Entry::Processing {
            task_id: "task-9".to_string(),
        });

        app.handle_app_event(AppEvent::TaskCompleted {
            task_id: "task-9".to_string(),
            file_url: "http://127.0.0.1:8000/media/report.docx".to_string(),
        });

        assert!(app.processing.is_completed());
        assert_eq!(
            app.processing.file_url.as_deref(),
            Some("http://127.0.0.1:8000/media/report.docx")
        );
    }

    #[tokio::test]
    async fn test_escape_from_processing_cancels_and_returns_to_form() {
        let mut app = test_app(Entry::Processing {
            task_id: "task-3".to_string(),
        });
        assert!(app.processing.is_pending());

        app.handle_key_event(key(KeyCode::Esc));

        assert_eq!(app.current_screen, Screen::Form);
        assert!(!app.processing.is_pending());
    }

    #[tokio::test]
    async fn test_result_entry_without_url_shows_placeholder() {
        let app = test_app(Entry::Result { file_url: None });
        assert_eq!(app.current_screen, Screen::Success);
        assert!(app.success.file_url.is_none());
    }

    #[tokio::test]
    async fn test_input_is_ignored_while_submitting() {
        let mut app = test_app(Entry::Form);
        app.form.is_submitting = true;

        app.handle_key_event(key(KeyCode::Char('x')));
        assert_eq!(app.form.project_name_input.value, "");

        app.handle_key_event(key(KeyCode::Esc));
        assert!(!app.should_quit);
    }
}
