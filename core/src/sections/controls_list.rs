use crate::sections::controls::RowId;
use crate::sections::section::Section;
use crate::sections::view::Key;

/// One entry of the vertical controls layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutItem {
    Row(RowId),
    Spacer,
}

/// Vertical stack of control rows in section order, closed by a stretch spacer.
#[derive(Debug)]
pub struct SectionControlsList {
    layout: Vec<LayoutItem>,
    next_row: u64,
}

impl SectionControlsList {
    pub fn new() -> Self {
        Self {
            layout: vec![LayoutItem::Spacer],
            next_row: 0,
        }
    }

    /// Inserts the section's row just before the trailing spacer.
    pub fn add_section(&mut self, section: &mut Section) {
        let row = RowId(self.next_row);
        self.next_row += 1;
        let spacer = self.layout.len() - 1;
        self.layout.insert(spacer, LayoutItem::Row(row));
        section.controls_mut().attach(row);
    }

    /// Detaches and closes the section's row.
    pub fn remove_section(&mut self, section: &mut Section) {
        if let Some(row) = section.controls().row() {
            self.layout.retain(|item| *item != LayoutItem::Row(row));
        }
        section.controls_mut().close();
    }

    pub fn rows(&self) -> impl Iterator<Item = RowId> + '_ {
        self.layout.iter().filter_map(|item| match item {
            LayoutItem::Row(row) => Some(*row),
            LayoutItem::Spacer => None,
        })
    }

    pub fn len(&self) -> usize {
        self.layout.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn layout(&self) -> &[LayoutItem] {
        &self.layout
    }

    /// Keys pressed while the list has focus go to the owner unchanged.
    pub fn key_press(&self, code: i32) -> Key {
        Key::from_code(code)
    }
}

impl Default for SectionControlsList {
    fn default() -> Self {
        Self::new()
    }
}
