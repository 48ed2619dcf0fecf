// src/dashboard/page.rs
use crate::api::dir_sizer::SizeEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Lines(Vec<String>),
    Flag { text: String, ok: bool },
    /// Size not known yet; resolved later by a size query for `path`.
    Pending { path: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: RowId,
    pub title: String,
    pub value: Cell,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub rows: Vec<Row>,
}

/// A pending size cell found on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub row: RowId,
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    sections: Vec<Section>,
    next_id: usize,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_section(&mut self, title: impl Into<String>, rows: Vec<(String, Cell)>) {
        let rows = rows
            .into_iter()
            .map(|(title, value)| {
                let id = RowId(self.next_id);
                self.next_id += 1;
                Row { id, title, value }
            })
            .collect();
        self.sections.push(Section {
            title: title.into(),
            rows,
        });
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.sections
            .iter()
            .flat_map(|s| s.rows.iter())
            .find(|r| r.id == id)
    }

    pub fn placeholders(&self) -> Vec<Placeholder> {
        self.sections
            .iter()
            .flat_map(|s| s.rows.iter())
            .filter_map(|r| match &r.value {
                Cell::Pending { path } => Some(Placeholder {
                    row: r.id,
                    path: path.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    /// Applies one query outcome: the size text replaces the placeholder
    /// verbatim, a failure removes the whole row. Returns `false` if the
    /// row is gone or no longer pending.
    pub fn apply(&mut self, event: &SizeEvent) -> bool {
        match event {
            SizeEvent::Resolved { row, mb, .. } => match self.row_mut(*row) {
                Some(r) if matches!(r.value, Cell::Pending { .. }) => {
                    r.value = Cell::Text(mb.clone());
                    true
                }
                _ => false,
            },
            SizeEvent::Failed { row, .. } => self.remove_row(*row),
        }
    }

    fn row_mut(&mut self, id: RowId) -> Option<&mut Row> {
        self.sections
            .iter_mut()
            .flat_map(|s| s.rows.iter_mut())
            .find(|r| r.id == id)
    }

    fn remove_row(&mut self, id: RowId) -> bool {
        for section in &mut self.sections {
            if let Some(pos) = section.rows.iter().position(|r| r.id == id) {
                section.rows.remove(pos);
                return true;
            }
        }
        false
    }
}
