//! Pipe table construction
//!
//! [`TableSpec`] backs the table-insert dialog: a rectangular grid whose first
//! row is the header, plus one alignment per column. Resizing operations keep
//! the grid rectangular and never shrink below a header plus one data row, or
//! below one column.

use serde::{Deserialize, Serialize};

/// Minimum number of rows (header + one data row).
pub const MIN_ROWS: usize = 2;
/// Minimum number of columns.
pub const MIN_COLS: usize = 1;

/// Column alignment, rendered in the separator row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Separator cell for this alignment.
    pub fn separator(self) -> &'static str {
        match self {
            Alignment::Left => "---",
            Alignment::Center => ":---:",
            Alignment::Right => "---:",
        }
    }

    /// Parse `left`, `center` or `right` (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Some(Alignment::Left),
            "center" | "c" => Some(Alignment::Center),
            "right" | "r" => Some(Alignment::Right),
            _ => None,
        }
    }
}

/// A table to be inserted as markdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    cells: Vec<Vec<String>>,
    alignments: Vec<Alignment>,
}

impl TableSpec {
    /// Create a `rows x cols` table filled with placeholder text.
    ///
    /// Sizes below the minimum are raised to it.
    pub fn new(rows: usize, cols: usize) -> Self {
        let rows = rows.max(MIN_ROWS);
        let cols = cols.max(MIN_COLS);
        let cells = (0..rows)
            .map(|r| (0..cols).map(|c| placeholder(r, c)).collect())
            .collect();
        Self {
            cells,
            alignments: vec![Alignment::Left; cols],
        }
    }

    /// Build from explicit cells. Ragged rows are padded with empty cells;
    /// missing alignments default to left.
    pub fn from_cells(cells: Vec<Vec<String>>, alignments: Vec<Alignment>) -> Self {
        let cols = cells
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(alignments.len())
            .max(MIN_COLS);
        let mut cells = cells;
        while cells.len() < MIN_ROWS {
            cells.push(Vec::new());
        }
        for row in &mut cells {
            row.resize(cols, String::new());
        }
        let mut alignments = alignments;
        alignments.resize(cols, Alignment::Left);
        Self { cells, alignments }
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.alignments.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.cells.get(row)?.get(col).map(String::as_str)
    }

    pub fn alignments(&self) -> &[Alignment] {
        &self.alignments
    }

    /// Overwrite one cell. Returns false when out of range.
    pub fn set_cell(&mut self, row: usize, col: usize, text: impl Into<String>) -> bool {
        match self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) => {
                *cell = text.into();
                true
            }
            None => false,
        }
    }

    /// Set a column's alignment. Returns false when out of range.
    pub fn set_alignment(&mut self, col: usize, alignment: Alignment) -> bool {
        match self.alignments.get_mut(col) {
            Some(slot) => {
                *slot = alignment;
                true
            }
            None => false,
        }
    }

    /// Append a data row of placeholders.
    pub fn add_row(&mut self) {
        let r = self.rows();
        let row = (0..self.cols()).map(|c| placeholder(r, c)).collect();
        self.cells.push(row);
    }

    /// Remove a data row. The header and the last data row are kept.
    pub fn remove_row(&mut self, row: usize) -> bool {
        if row == 0 || row >= self.rows() || self.rows() <= MIN_ROWS {
            return false;
        }
        self.cells.remove(row);
        true
    }

    /// Append a left-aligned column of placeholders.
    pub fn add_column(&mut self) {
        let c = self.cols();
        for (r, row) in self.cells.iter_mut().enumerate() {
            row.push(placeholder(r, c));
        }
        self.alignments.push(Alignment::Left);
    }

    /// Remove a column, never the last one.
    pub fn remove_column(&mut self, col: usize) -> bool {
        if col >= self.cols() || self.cols() <= MIN_COLS {
            return false;
        }
        for row in &mut self.cells {
            row.remove(col);
        }
        self.alignments.remove(col);
        true
    }

    /// Render as a GFM pipe table: header, separator, data rows.
    pub fn to_markdown(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows() + 1);
        for (r, row) in self.cells.iter().enumerate() {
            let cells: Vec<String> = row.iter().map(|c| escape_cell(c)).collect();
            lines.push(format!("| {} |", cells.join(" | ")));
            if r == 0 {
                let sep: Vec<&str> = self.alignments.iter().map(|a| a.separator()).collect();
                lines.push(format!("| {} |", sep.join(" | ")));
            }
        }
        lines.join("\n")
    }
}

/// Render a table spec; see [`TableSpec::to_markdown`].
pub fn generate_table_markdown(spec: &TableSpec) -> String {
    spec.to_markdown()
}

fn placeholder(row: usize, col: usize) -> String {
    if row == 0 {
        format!("Header {}", col + 1)
    } else {
        format!("Cell {},{}", row, col + 1)
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
