//! Column-aligned rendering of nullable scalar values.
//!
//! Widths are computed from the whole result set before anything is
//! written, so rendering needs every row up front.

use serde_json::Value;

/// Truncation length for attribute listings.
pub const ATTRIBUTE_MAX_LEN: usize = 80;

/// Truncation length for tabular query cells.
pub const CELL_MAX_LEN: usize = 40;

/// Minimum column width.
pub const MIN_COLUMN_WIDTH: usize = 10;

const NULL_TEXT: &str = "(null)";
const ELLIPSIS: &str = "...";

/// Format a value for display.
///
/// Null becomes `(null)`, strings are shown unquoted, everything else uses
/// its JSON text. Text longer than `max_len` characters is cut and ends in
/// `...`, keeping the result within `max_len`.
pub fn format_value(value: &Value, max_len: usize) -> String {
    let text = match value {
        Value::Null => return NULL_TEXT.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    truncate(&text, max_len)
}

/// Cut `text` to at most `max_len` characters, marking the cut with `...`.
pub fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let keep = max_len.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Left-justify to `width` characters.
fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        format!("{text}{}", " ".repeat(width - len))
    }
}

// ============================================================================
// Table
// ============================================================================

/// Named columns plus rows of nullable values. Rows may be ragged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Renders [`Table`]s as aligned text.
#[derive(Debug, Clone)]
pub struct TableRenderer {
    cell_max_len: usize,
    min_width: usize,
    indent: String,
    gutter: String,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self {
            cell_max_len: CELL_MAX_LEN,
            min_width: MIN_COLUMN_WIDTH,
            indent: "  ".to_string(),
            gutter: "  ".to_string(),
        }
    }
}

impl TableRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the cell truncation length.
    pub fn with_cell_max_len(mut self, max_len: usize) -> Self {
        self.cell_max_len = max_len;
        self
    }

    /// Override the left indent.
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    /// Column widths: max(min width, header, longest formatted cell).
    pub fn column_widths(&self, table: &Table) -> Vec<usize> {
        let mut widths: Vec<usize> = table
            .columns
            .iter()
            .map(|c| c.chars().count().max(self.min_width))
            .collect();
        for row in &table.rows {
            for (i, cell) in row.iter().enumerate().take(widths.len()) {
                let len = format_value(cell, self.cell_max_len).chars().count();
                widths[i] = widths[i].max(len);
            }
        }
        widths
    }

    /// Render the header, a dash rule and every row, one line each.
    ///
    /// Cells beyond the header are appended unpadded; cells missing from a
    /// short row are omitted.
    pub fn render(&self, table: &Table) -> String {
        let widths = self.column_widths(table);
        let mut lines = Vec::with_capacity(table.rows.len() + 2);

        let header: Vec<String> = table
            .columns
            .iter()
            .zip(&widths)
            .map(|(name, w)| pad(name, *w))
            .collect();
        lines.push(header.join(&self.gutter));

        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        lines.push(rule.join(&self.gutter));

        for row in &table.rows {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    let text = format_value(cell, self.cell_max_len);
                    match widths.get(i) {
                        Some(w) => pad(&text, *w),
                        None => text,
                    }
                })
                .collect();
            lines.push(cells.join(&self.gutter));
        }

        let mut out = String::new();
        for line in lines {
            out.push_str(&self.indent);
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

// ============================================================================
// Key/value listings
// ============================================================================

/// Render `name = value` lines with names padded to `key_width`.
pub fn render_key_values<'a, I>(pairs: I, indent: &str, key_width: usize, max_len: usize) -> String
where
    I: IntoIterator<Item = (&'a str, &'a Value)>,
{
    let mut out = String::new();
    for (name, value) in pairs {
        out.push_str(indent);
        out.push_str(&pad(name, key_width));
        out.push_str(" = ");
        out.push_str(&format_value(value, max_len));
        out.push('\n');
    }
    out
}
