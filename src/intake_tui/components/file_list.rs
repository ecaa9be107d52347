//! Documentation file collector
//!
//! Holds the ordered list of files attached to a submission. Each add
//! round appends to the existing list, so several selection rounds
//! accumulate; removal takes out exactly one entry by position and keeps
//! the order of the rest. No validation and no duplicate detection; the
//! list is sent as-is.

use std::path::PathBuf;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::intake_tui::ui::{InputField, Styles};

#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub path: PathBuf,
}

impl FileEntry {
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }
}

pub struct FileList {
    pub path_input: InputField,
    entries: Vec<FileEntry>,
    pub state: ListState,
}

impl FileList {
    pub fn new() -> Self {
        Self {
            path_input: InputField::new("Add documentation files")
                .with_placeholder("Paths, whitespace separated, Enter to add"),
            entries: Vec::new(),
            state: ListState::default(),
        }
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries.iter().map(|entry| entry.path.clone()).collect()
    }

    /// Append every path currently in the input, in the order typed, and
    /// clear the input for the next round.
    pub fn add_from_input(&mut self) -> usize {
        let paths: Vec<PathBuf> = self
            .path_input
            .value
            .split_whitespace()
            .map(PathBuf::from)
            .collect();
        let added = paths.len();
        self.append_paths(paths);
        self.path_input.clear();
        added
    }

    pub fn append_paths(&mut self, paths: impl IntoIterator<Item = PathBuf>) {
        for path in paths {
            self.entries.push(FileEntry { path });
        }
        if self.state.selected().is_none() && !self.entries.is_empty() {
            self.state.select(Some(0));
        }
    }

    /// Remove the entry at `index`, preserving the order of the rest.
    pub fn remove_at(&mut self, index: usize) -> Option<FileEntry> {
        if index >= self.entries.len() {
            return None;
        }
        let removed = self.entries.remove(index);

        if self.entries.is_empty() {
            self.state.select(None);
        } else if let Some(selected) = self.state.selected() {
            if selected >= self.entries.len() {
                self.state.select(Some(self.entries.len() - 1));
            }
        }
        Some(removed)
    }

    pub fn remove_selected(&mut self) -> Option<FileEntry> {
        let index = self.state.selected()?;
        self.remove_at(index)
    }

    pub fn select_next(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => (i + 1) % self.entries.len(),
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    self.entries.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn render_input(&self, f: &mut Frame, area: Rect) {
        self.path_input.render(f, area);
    }

    pub fn render_list(&mut self, f: &mut Frame, area: Rect, focused: bool) {
        let items: Vec<ListItem> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let style = if focused && Some(i) == self.state.selected() {
                    Styles::selected()
                } else {
                    Styles::default()
                };
                ListItem::new(Line::from(Span::styled(
                    format!("{}. {}", i + 1, entry.name()),
                    style,
                )))
            })
            .collect();

        let border_style = if focused {
            Styles::active_border()
        } else {
            Styles::inactive_border()
        };
        let title = format!("Attached files ({})", self.entries.len());
        let list = List::new(items).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border_style),
        );

        f.render_stateful_widget(list, area, &mut self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &FileList) -> Vec<String> {
        list.entries().iter().map(|entry| entry.name()).collect()
    }

    #[test]
    fn test_two_add_rounds_accumulate_in_order() {
        let mut list = FileList::new();
        list.path_input.set_value("plan.pdf evidence.xlsx");
        assert_eq!(list.add_from_input(), 2);

        list.path_input.set_value("photos.zip");
        assert_eq!(list.add_from_input(), 1);

        assert_eq!(names(&list), vec!["plan.pdf", "evidence.xlsx", "photos.zip"]);
        assert!(list.path_input.is_empty());
    }

    #[test]
    fn test_remove_preserves_order_of_rest() {
        let mut list = FileList::new();
        list.append_paths(["a.pdf", "b.pdf", "c.pdf"].map(PathBuf::from));

        let removed = list.remove_at(1).unwrap();
        assert_eq!(removed.name(), "b.pdf");
        assert_eq!(names(&list), vec!["a.pdf", "c.pdf"]);

        assert!(list.remove_at(5).is_none());
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut list = FileList::new();
        list.path_input.set_value("plan.pdf plan.pdf");
        list.add_from_input();
        assert_eq!(names(&list), vec!["plan.pdf", "plan.pdf"]);
    }

    #[test]
    fn test_remove_selected_clamps_selection() {
        let mut list = FileList::new();
        list.append_paths(["a.pdf", "b.pdf"].map(PathBuf::from));
        list.select_next();
        assert_eq!(list.state.selected(), Some(1));

        list.remove_selected().unwrap();
        assert_eq!(list.state.selected(), Some(0));

        list.remove_selected().unwrap();
        assert!(list.state.selected().is_none());
        assert!(list.is_empty());
    }
}
