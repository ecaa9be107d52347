//! Intake Terminal User Interface (TUI)
//!
//! Interactive flow for BREEAM project audit submissions: fill the form,
//! pick an audit criterion, attach documentation files, submit, then watch
//! the processing view until the generated report is ready to download.

pub mod app;
pub mod components;
pub mod events;
pub mod screens;
pub mod ui;

pub use app::App;
pub use events::AppEvent;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::config::Config;

/// Entry routes into the TUI, one per page of the submission flow.
#[derive(Debug, Clone)]
pub enum Entry {
    /// The submission form (default)
    Form,
    /// The processing view for an already submitted task
    Processing { task_id: String },
    /// The terminal result view; not reachable from the main flow
    Result { file_url: Option<String> },
}

/// Set up the terminal, run the application, and restore the terminal.
pub async fn run(config: Config, entry: Entry) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, entry)?;
    let result = app.run(&mut terminal).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}
