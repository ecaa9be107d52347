//! Searchable audit-criteria selector
//!
//! Owns the criteria list fetched once per form session and a free-text
//! query. Non-empty queries open a suggestion panel filtered on the
//! criterion identifier; selecting writes the identifier into the input
//! and hands the full entity to the owning form. Losing focus arms a short
//! deferred-close deadline instead of closing outright, so a selection
//! landing just after the blur still wins; selection disarms the deadline.

use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::intake_tui::ui::{InputField, Styles};
use crate::models::{filter_criteria, AuditCriteria};

/// Grace period between losing focus and the suggestion panel closing.
pub const CLOSE_GRACE: Duration = Duration::from_millis(200);

pub struct CriteriaSelect {
    pub input: InputField,
    criteria: Vec<AuditCriteria>,
    pub panel_open: bool,
    pub list_state: ListState,
    close_deadline: Option<Instant>,
    pub selected: Option<AuditCriteria>,
}

impl CriteriaSelect {
    pub fn new() -> Self {
        Self {
            input: InputField::new("Audit criteria").with_placeholder("Type to search criteria"),
            criteria: Vec::new(),
            panel_open: false,
            list_state: ListState::default(),
            close_deadline: None,
            selected: None,
        }
    }

    /// Install the fetched criteria list. Called once per form session;
    /// a failed fetch leaves the list empty and the selector inert.
    pub fn set_criteria(&mut self, criteria: Vec<AuditCriteria>) {
        self.criteria = criteria;
    }

    pub fn has_criteria(&self) -> bool {
        !self.criteria.is_empty()
    }

    /// Entries whose identifier contains the query, case-insensitively.
    /// An empty query yields the full list (panel stays hidden then).
    pub fn filtered(&self) -> Vec<&AuditCriteria> {
        filter_criteria(&self.criteria, &self.input.value)
    }

    pub fn insert_char(&mut self, c: char) {
        self.input.insert_char(c);
        self.query_changed();
    }

    pub fn delete_char(&mut self) {
        self.input.delete_char();
        self.query_changed();
    }

    fn query_changed(&mut self) {
        self.panel_open = !self.input.is_empty();
        self.close_deadline = None;
        let count = self.filtered().len();
        if count == 0 {
            self.list_state.select(None);
        } else {
            // Keep the highlight in range as the subset shrinks
            let selected = self.list_state.selected().unwrap_or(0);
            self.list_state.select(Some(selected.min(count - 1)));
        }
    }

    /// Focus gained: show suggestions and disarm any pending close.
    pub fn on_focus(&mut self) {
        self.panel_open = true;
        self.close_deadline = None;
        if self.list_state.selected().is_none() && !self.filtered().is_empty() {
            self.list_state.select(Some(0));
        }
    }

    /// Focus lost: arm the deferred close instead of closing immediately.
    pub fn on_blur(&mut self) {
        self.close_deadline = Some(Instant::now() + CLOSE_GRACE);
    }

    /// Advance the deferred-close deadline. Called from the event loop.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    pub(crate) fn tick_at(&mut self, now: Instant) {
        if let Some(deadline) = self.close_deadline {
            if now >= deadline {
                self.panel_open = false;
                self.close_deadline = None;
            }
        }
    }

    pub fn highlight_next(&mut self) {
        let count = self.filtered().len();
        if count == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1) % count,
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn highlight_previous(&mut self) {
        let count = self.filtered().len();
        if count == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => {
                if i == 0 {
                    count - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    /// Take the highlighted suggestion: writes its identifier into the
    /// input, closes the panel, disarms the deferred close, and returns
    /// the full entity for the owning form.
    pub fn select_highlighted(&mut self) -> Option<AuditCriteria> {
        let selected = {
            let filtered = self.filtered();
            let index = self.list_state.selected()?;
            filtered.get(index).map(|crit| (*crit).clone())
        }?;

        self.input.set_value(&selected.criteria_id);
        self.panel_open = false;
        self.close_deadline = None;
        self.selected = Some(selected.clone());
        Some(selected)
    }

    /// Render the query input; the suggestion panel is drawn separately so
    /// it can overlay the fields below the selector.
    pub fn render_input(&self, f: &mut Frame, area: Rect) {
        self.input.render(f, area);
    }

    /// Render the suggestion panel, if open, overlaying the given area.
    pub fn render_panel(&mut self, f: &mut Frame, area: Rect) {
        if !self.panel_open {
            return;
        }

        let filtered: Vec<AuditCriteria> = self.filtered().into_iter().cloned().collect();
        let items: Vec<ListItem> = filtered
            .iter()
            .enumerate()
            .map(|(i, crit)| {
                let style = if Some(i) == self.list_state.selected() {
                    Styles::selected()
                } else {
                    Styles::default()
                };
                ListItem::new(Line::from(Span::styled(
                    format!("{}  {}", crit.criteria_id, crit.name),
                    style,
                )))
            })
            .collect();

        let title = format!("Criteria ({} match)", filtered.len());
        let list = List::new(items).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Styles::active_border()),
        );

        f.render_widget(Clear, area);
        f.render_stateful_widget(list, area, &mut self.list_state);
    }

    /// Render a short description of the chosen criterion.
    pub fn render_selected(&self, f: &mut Frame, area: Rect) {
        let text = match &self.selected {
            Some(crit) => format!(
                "{}: {} ({} {})",
                crit.criteria_id, crit.name, crit.issue_number, crit.issue_name
            ),
            None => "No criterion selected".to_string(),
        };
        let style = if self.selected.is_some() {
            Styles::info()
        } else {
            Styles::inactive()
        };
        let paragraph = Paragraph::new(text).style(style).wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }
}
