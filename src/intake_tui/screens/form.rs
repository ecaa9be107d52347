//! Submission form screen
//!
//! Owns the whole form state: one input per scalar field, the criteria
//! selector, and the attached-file list. Children mutate nothing on their
//! own; the app routes key events into the focused part and reads the
//! assembled [`SubmissionFields`] back out at submission time.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use crate::intake_tui::components::{CriteriaSelect, FileList};
use crate::intake_tui::ui::{centered_rect, InputField, SelectableList, Styles};
use crate::models::{Premise, SubmissionFields};

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Focusable parts of the form, in tab order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormField {
    ProjectName,
    EntrepreneurResponsible,
    CivilEngineerResponsible,
    Assessor,
    Criteria,
    Premise,
    PreparedBy,
    FileInput,
    FileListing,
    Submit,
}

/// Submission form state
pub struct FormScreen {
    pub current_field: usize,
    pub fields: Vec<FormField>,

    pub project_name_input: InputField,
    pub entrepreneur_input: InputField,
    pub civil_engineer_input: InputField,
    pub assessor_input: InputField,
    pub prepared_by_input: InputField,

    pub criteria_select: CriteriaSelect,

    pub premise_list: SelectableList<Premise>,
    pub show_premise_dropdown: bool,

    pub files: FileList,

    pub is_submitting: bool,
    spinner_frame: usize,
}

impl FormScreen {
    pub fn new() -> Self {
        let fields = vec![
            FormField::ProjectName,
            FormField::EntrepreneurResponsible,
            FormField::CivilEngineerResponsible,
            FormField::Assessor,
            FormField::Criteria,
            FormField::Premise,
            FormField::PreparedBy,
            FormField::FileInput,
            FormField::FileListing,
            FormField::Submit,
        ];

        let mut form = Self {
            current_field: 0,
            fields,

            project_name_input: InputField::new("Project name").with_placeholder("e.g., Bygg A"),
            entrepreneur_input: InputField::new("BREEAM responsible (entrepreneur)"),
            civil_engineer_input: InputField::new("BREEAM responsible (civil engineer)"),
            assessor_input: InputField::new("BREEAM assessor"),
            prepared_by_input: InputField::new("Prepared by"),

            criteria_select: CriteriaSelect::new(),

            premise_list: {
                let mut list = SelectableList::new(vec![Premise::Ja, Premise::Nei]);
                list.select(None); // No premise chosen by default
                list
            },
            show_premise_dropdown: false,

            files: FileList::new(),

            is_submitting: false,
            spinner_frame: 0,
        };

        form.update_field_focus();
        form
    }

    pub fn focused(&self) -> FormField {
        self.fields[self.current_field]
    }

    pub fn next_field(&mut self) {
        self.set_current_field((self.current_field + 1) % self.fields.len());
    }

    pub fn previous_field(&mut self) {
        let previous = if self.current_field == 0 {
            self.fields.len() - 1
        } else {
            self.current_field - 1
        };
        self.set_current_field(previous);
    }

    pub fn set_current_field(&mut self, field: usize) {
        if field >= self.fields.len() || field == self.current_field {
            return;
        }
        let leaving = self.fields[self.current_field];
        self.current_field = field;

        // Focus transitions drive the selector's deferred close
        if leaving == FormField::Criteria {
            self.criteria_select.on_blur();
        }
        if self.fields[field] == FormField::Criteria {
            self.criteria_select.on_focus();
        }
        self.update_field_focus();
    }

    pub fn update_field_focus(&mut self) {
        let focused = self.fields[self.current_field];
        self.project_name_input
            .set_focus(focused == FormField::ProjectName);
        self.entrepreneur_input
            .set_focus(focused == FormField::EntrepreneurResponsible);
        self.civil_engineer_input
            .set_focus(focused == FormField::CivilEngineerResponsible);
        self.assessor_input.set_focus(focused == FormField::Assessor);
        self.criteria_select
            .input
            .set_focus(focused == FormField::Criteria);
        self.prepared_by_input
            .set_focus(focused == FormField::PreparedBy);
        self.files
            .path_input
            .set_focus(focused == FormField::FileInput);
    }

    pub fn handle_char_input(&mut self, c: char) {
        match self.focused() {
            FormField::ProjectName => self.project_name_input.insert_char(c),
            FormField::EntrepreneurResponsible => self.entrepreneur_input.insert_char(c),
            FormField::CivilEngineerResponsible => self.civil_engineer_input.insert_char(c),
            FormField::Assessor => self.assessor_input.insert_char(c),
            FormField::Criteria => self.criteria_select.insert_char(c),
            FormField::PreparedBy => self.prepared_by_input.insert_char(c),
            FormField::FileInput => self.files.path_input.insert_char(c),
            FormField::Premise | FormField::FileListing | FormField::Submit => {}
        }
    }

    pub fn handle_backspace(&mut self) {
        match self.focused() {
            FormField::ProjectName => self.project_name_input.delete_char(),
            FormField::EntrepreneurResponsible => self.entrepreneur_input.delete_char(),
            FormField::CivilEngineerResponsible => self.civil_engineer_input.delete_char(),
            FormField::Assessor => self.assessor_input.delete_char(),
            FormField::Criteria => self.criteria_select.delete_char(),
            FormField::PreparedBy => self.prepared_by_input.delete_char(),
            FormField::FileInput => self.files.path_input.delete_char(),
            FormField::Premise | FormField::FileListing | FormField::Submit => {}
        }
    }

    fn current_input_mut(&mut self) -> Option<&mut InputField> {
        match self.focused() {
            FormField::ProjectName => Some(&mut self.project_name_input),
            FormField::EntrepreneurResponsible => Some(&mut self.entrepreneur_input),
            FormField::CivilEngineerResponsible => Some(&mut self.civil_engineer_input),
            FormField::Assessor => Some(&mut self.assessor_input),
            FormField::Criteria => Some(&mut self.criteria_select.input),
            FormField::PreparedBy => Some(&mut self.prepared_by_input),
            FormField::FileInput => Some(&mut self.files.path_input),
            FormField::Premise | FormField::FileListing | FormField::Submit => None,
        }
    }

    pub fn handle_delete(&mut self) {
        if let Some(input) = self.current_input_mut() {
            input.delete_char_forward();
        }
    }

    pub fn handle_cursor_left(&mut self) {
        if let Some(input) = self.current_input_mut() {
            input.move_cursor_left();
        }
    }

    pub fn handle_cursor_right(&mut self) {
        if let Some(input) = self.current_input_mut() {
            input.move_cursor_right();
        }
    }

    pub fn handle_cursor_home(&mut self) {
        if let Some(input) = self.current_input_mut() {
            input.move_cursor_to_start();
        }
    }

    pub fn handle_cursor_end(&mut self) {
        if let Some(input) = self.current_input_mut() {
            input.move_cursor_to_end();
        }
    }

    /// Assemble the wire-format fields from current form state. The
    /// criteria identifier comes from the reported selection, not the raw
    /// query text, so an unconfirmed query never reaches the backend.
    pub fn collect_fields(&self) -> SubmissionFields {
        SubmissionFields {
            project_name: self.project_name_input.value.clone(),
            breeam_entrepreneur_responsible: self.entrepreneur_input.value.clone(),
            breeam_civil_engineer_responsible: self.civil_engineer_input.value.clone(),
            breeam_assessor: self.assessor_input.value.clone(),
            audit_criteria: self
                .criteria_select
                .selected
                .as_ref()
                .map(|crit| crit.criteria_id.clone())
                .unwrap_or_default(),
            premise: self
                .premise_list
                .selected()
                .map(|premise| premise.as_str().to_string())
                .unwrap_or_default(),
            prepared_by: self.prepared_by_input.value.clone(),
        }
    }

    /// Draw the form screen
    pub fn draw(&mut self, f: &mut Frame, area: Rect) {
        if self.is_submitting {
            self.draw_submitting(f, area);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),  // Title
                Constraint::Length(12), // Field grid
                Constraint::Length(3),  // File input
                Constraint::Min(4),     // Attached files
                Constraint::Length(3),  // Submit
                Constraint::Length(3),  // Instructions
            ])
            .split(area);

        self.draw_title(f, chunks[0]);
        let criteria_area = self.draw_field_grid(f, chunks[1]);
        self.files.render_input(f, chunks[2]);
        self.files
            .render_list(f, chunks[3], self.focused() == FormField::FileListing);
        self.draw_submit(f, chunks[4]);
        self.draw_instructions(f, chunks[5]);

        // Overlays go last so they sit on top of the fields below them
        if self.criteria_select.panel_open {
            let panel_area = suggestion_panel_area(criteria_area, area);
            self.criteria_select.render_panel(f, panel_area);
        }
        if self.show_premise_dropdown {
            self.draw_premise_dropdown(f, area);
        }
    }

    fn draw_title(&self, f: &mut Frame, area: Rect) {
        let title = Paragraph::new("BREEAM Project Submission")
            .style(Styles::title())
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, area);
    }

    /// Two-column field grid; returns the criteria input's area so the
    /// suggestion panel can be anchored under it.
    fn draw_field_grid(&mut self, f: &mut Frame, area: Rect) -> Rect {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Project name
                Constraint::Length(3), // Entrepreneur
                Constraint::Length(3), // Civil engineer
                Constraint::Length(3), // Assessor
            ])
            .split(columns[0]);

        self.project_name_input.render(f, left[0]);
        self.entrepreneur_input.render(f, left[1]);
        self.civil_engineer_input.render(f, left[2]);
        self.assessor_input.render(f, left[3]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Prepared by
                Constraint::Length(3), // Premise
                Constraint::Length(3), // Criteria query
                Constraint::Length(3), // Selected criterion
            ])
            .split(columns[1]);

        self.prepared_by_input.render(f, right[0]);
        self.draw_premise_field(f, right[1]);
        self.criteria_select.render_input(f, right[2]);
        self.criteria_select.render_selected(f, right[3]);

        right[2]
    }

    fn draw_premise_field(&self, f: &mut Frame, area: Rect) {
        let value = self
            .premise_list
            .selected()
            .map(|premise| premise.as_str())
            .unwrap_or("Choose ja or nei");

        let border_style = if self.focused() == FormField::Premise {
            Styles::active_border()
        } else {
            Styles::inactive_border()
        };
        let text_style = if self.premise_list.selected().is_some() {
            Styles::default()
        } else {
            Styles::inactive()
        };

        let field = Paragraph::new(value).style(text_style).block(
            Block::default()
                .title("Premise (Enter to choose)")
                .borders(Borders::ALL)
                .border_style(border_style),
        );
        f.render_widget(field, area);
    }

    fn draw_premise_dropdown(&mut self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(30, 20, area);

        let items: Vec<ListItem> = self
            .premise_list
            .items
            .iter()
            .enumerate()
            .map(|(i, premise)| {
                let style = if Some(i) == self.premise_list.selected_index() {
                    Styles::selected()
                } else {
                    Styles::default()
                };
                ListItem::new(Line::from(Span::styled(premise.as_str(), style)))
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .title("Premise")
                .borders(Borders::ALL)
                .border_style(Styles::active_border()),
        );

        f.render_widget(Clear, popup_area);
        f.render_stateful_widget(list, popup_area, &mut self.premise_list.state);
    }

    fn draw_submit(&self, f: &mut Frame, area: Rect) {
        let focused = self.focused() == FormField::Submit;
        let style = if focused {
            Styles::selected()
        } else {
            Styles::default()
        };
        let border_style = if focused {
            Styles::active_border()
        } else {
            Styles::inactive_border()
        };

        let button = Paragraph::new("[ Submit project ]")
            .style(style)
            .alignment(ratatui::layout::Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(border_style));
        f.render_widget(button, area);
    }

    fn draw_instructions(&self, f: &mut Frame, area: Rect) {
        let instructions =
            "Tab/Shift+Tab: Move | Enter: Choose/Add/Submit | Del: Remove file | Esc: Quit";
        let widget = Paragraph::new(instructions).style(Styles::info()).block(
            Block::default()
                .title("Instructions")
                .borders(Borders::ALL)
                .border_style(Styles::inactive_border()),
        );
        f.render_widget(widget, area);
    }

    fn draw_submitting(&mut self, f: &mut Frame, area: Rect) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
        let spinner = SPINNER_FRAMES[self.spinner_frame];

        let popup_area = centered_rect(50, 30, area);
        let text = vec![
            Line::from(Span::styled(
                format!("{} Submitting project...", spinner),
                Styles::title(),
            )),
            Line::from(""),
            Line::from(Span::styled("Please wait.", Styles::inactive())),
        ];
        let widget = Paragraph::new(text)
            .alignment(ratatui::layout::Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(Clear, popup_area);
        f.render_widget(widget, popup_area);
    }
}

/// Area for the suggestion panel: directly below the criteria input,
/// clipped to the screen.
fn suggestion_panel_area(input_area: Rect, screen: Rect) -> Rect {
    let top = input_area.y.saturating_add(input_area.height);
    let height = screen
        .bottom()
        .saturating_sub(top)
        .min(10)
        .max(3);
    Rect {
        x: input_area.x,
        y: top.min(screen.bottom().saturating_sub(height)),
        width: input_area.width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AuditCriteria;

    fn criterion(id: &str) -> AuditCriteria {
        AuditCriteria {
            criteria_id: id.to_string(),
            name: format!("Criterion {}", id),
            description: String::new(),
            criteria_type: None,
            issue_number: "Man 03".to_string(),
            issue_name: "Responsible construction practices".to_string(),
            category_number: "1".to_string(),
            category_name: "Management".to_string(),
        }
    }

    fn filled_form() -> FormScreen {
        let mut form = FormScreen::new();
        form.project_name_input.set_value("Bygg A");
        form.entrepreneur_input.set_value("Kari Nordmann");
        form.civil_engineer_input.set_value("Ola Nordmann");
        form.assessor_input.set_value("Anne Hansen");
        form.prepared_by_input.set_value("Per Olsen");
        form.criteria_select.set_criteria(vec![criterion("MAN-03-1")]);
        form
    }

    #[test]
    fn test_collect_fields_uses_reported_selection_not_query_text() {
        let mut form = filled_form();

        // Typed but never confirmed: nothing reaches the payload
        form.criteria_select.insert_char('m');
        assert_eq!(form.collect_fields().audit_criteria, "");

        form.criteria_select.select_highlighted().unwrap();
        assert_eq!(form.collect_fields().audit_criteria, "MAN-03-1");
    }

    #[test]
    fn test_collect_fields_premise_text_values() {
        let mut form = filled_form();
        assert_eq!(form.collect_fields().premise, "");

        form.premise_list.select(Some(0));
        assert_eq!(form.collect_fields().premise, "ja");

        form.premise_list.next();
        assert_eq!(form.collect_fields().premise, "nei");
    }

    #[test]
    fn test_required_check_spots_missing_criteria() {
        let mut form = filled_form();
        form.premise_list.select(Some(0));

        let fields = form.collect_fields();
        assert_eq!(fields.first_missing_field(), Some("Audit criteria"));
    }

    #[test]
    fn test_tab_order_wraps() {
        let mut form = FormScreen::new();
        assert_eq!(form.focused(), FormField::ProjectName);

        for _ in 0..form.fields.len() {
            form.next_field();
        }
        assert_eq!(form.focused(), FormField::ProjectName);

        form.previous_field();
        assert_eq!(form.focused(), FormField::Submit);
    }

    #[test]
    fn test_leaving_criteria_field_arms_deferred_close() {
        use std::time::{Duration, Instant};

        let mut form = FormScreen::new();
        form.criteria_select.set_criteria(vec![criterion("MAN-03-1")]);

        // Focus the criteria field (index 4 in tab order) and type
        form.set_current_field(4);
        form.criteria_select.insert_char('m');
        assert!(form.criteria_select.panel_open);

        // Tabbing away does not close the panel outright
        form.next_field();
        assert!(form.criteria_select.panel_open);

        form.criteria_select
            .tick_at(Instant::now() + crate::intake_tui::components::criteria_select::CLOSE_GRACE + Duration::from_millis(1));
        assert!(!form.criteria_select.panel_open);
    }

    #[test]
    fn test_char_routing_goes_to_focused_field() {
        let mut form = FormScreen::new();
        form.handle_char_input('B');
        assert_eq!(form.project_name_input.value, "B");

        form.next_field();
        form.handle_char_input('K');
        assert_eq!(form.entrepreneur_input.value, "K");
        assert_eq!(form.project_name_input.value, "B");
    }
}
