//! Result screen
//!
//! Stateless terminal view over a result URL handed in at entry. Not part
//! of the main flow (the processing screen already shows the download
//! prompt), but reachable directly via `tui --file-url`.

use std::path::PathBuf;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::intake_tui::ui::{centered_rect, Styles};

pub struct SuccessScreen {
    pub file_url: Option<String>,
    pub is_downloading: bool,
    pub downloaded_to: Option<PathBuf>,
}

impl SuccessScreen {
    pub fn new() -> Self {
        Self {
            file_url: None,
            is_downloading: false,
            downloaded_to: None,
        }
    }

    /// Draw the result screen
    pub fn draw(&mut self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(60, 40, area);

        let mut lines = vec![
            Line::from(Span::styled(
                "Submission sent successfully",
                Styles::title(),
            )),
            Line::from(""),
        ];

        match &self.file_url {
            Some(file_url) => {
                lines.push(Line::from(Span::styled(file_url.as_str(), Styles::info())));
                lines.push(Line::from(""));
                if self.is_downloading {
                    lines.push(Line::from(Span::styled("Downloading...", Styles::info())));
                } else if let Some(path) = &self.downloaded_to {
                    lines.push(Line::from(Span::styled(
                        format!("Saved to {}", path.display()),
                        Styles::success(),
                    )));
                } else {
                    lines.push(Line::from(Span::styled(
                        "d: Download the document",
                        Styles::inactive(),
                    )));
                }
            }
            None => {
                lines.push(Line::from(Span::styled(
                    "No file available for download.",
                    Styles::inactive(),
                )));
            }
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "n: Submit another project | q: Quit",
            Styles::inactive(),
        )));

        let widget = Paragraph::new(lines)
            .alignment(ratatui::layout::Alignment::Center)
            .block(
                Block::default()
                    .title("Result")
                    .borders(Borders::ALL)
                    .border_style(Styles::active_border()),
            );
        f.render_widget(ratatui::widgets::Clear, popup_area);
        f.render_widget(widget, popup_area);
    }
}
