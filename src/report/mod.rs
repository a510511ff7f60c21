//! Plain-text report rendering.
//!
//! Everything here is pure: formatters take typed records and return
//! strings, and the command layer decides where they are written.

pub mod ambari;
pub mod nifi;
pub mod oozie;

use chrono::{DateTime, Local, TimeZone};

/// Placeholder for a value the server did not report.
pub const NOT_DEFINED: &str = "Not defined";

/// Separator between table columns.
const COLUMN_GAP: &str = "   ";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A left-aligned, fixed-width table column.
#[derive(Debug, Clone)]
pub struct Column {
    pub header: &'static str,
    pub width: usize,
}

impl Column {
    pub const fn new(header: &'static str, width: usize) -> Self {
        Self { header, width }
    }
}

/// A fixed-width table.
///
/// Cells are padded to their column width but never truncated, so a long
/// value pushes the rest of its row to the right.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
    framed: bool,
}

impl Table {
    pub fn new(columns: impl Into<Vec<Column>>) -> Self {
        Self {
            columns: columns.into(),
            rows: Vec::new(),
            framed: false,
        }
    }

    /// Also draw a rule above the header and below the last row.
    pub fn framed(mut self, framed: bool) -> Self {
        self.framed = framed;
        self
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn line<'a>(&self, cells: impl Iterator<Item = &'a str>) -> String {
        let mut line = self
            .columns
            .iter()
            .zip(cells)
            .map(|(column, cell)| format!("{:<width$}", cell, width = column.width))
            .collect::<Vec<_>>()
            .join(COLUMN_GAP);
        line.truncate(line.trim_end().len());
        line.push('\n');
        line
    }

    fn rule(&self) -> String {
        let dashes: Vec<String> = self.columns.iter().map(|c| "-".repeat(c.width)).collect();
        self.line(dashes.iter().map(String::as_str))
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.framed {
            out.push_str(&self.rule());
        }
        out.push_str(&self.line(self.columns.iter().map(|c| c.header)));
        out.push_str(&self.rule());
        for row in &self.rows {
            out.push_str(&self.line(row.iter().map(String::as_str)));
        }
        if self.framed {
            out.push_str(&self.rule());
        }
        out
    }
}

/// Render `label: value` lines with the labels padded to a common width,
/// followed by a blank line.
pub fn field_block(fields: &[(&str, String)]) -> String {
    let width = fields.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (label, value) in fields {
        out.push_str(&format!("{:<width$}: {}\n", label, value, width = width));
    }
    out.push('\n');
    out
}

/// Display an optional value, falling back to [`NOT_DEFINED`].
pub fn or_not_defined<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| NOT_DEFINED.to_string(), |v| v.to_string())
}

fn format_local(time: Option<DateTime<Local>>) -> Option<String> {
    time.map(|t| t.format(TIMESTAMP_FORMAT).to_string())
}

/// Local time for epoch milliseconds, as `YYYY-MM-DD HH:MM:SS`.
pub fn format_timestamp_ms(millis: i64) -> Option<String> {
    format_local(Local.timestamp_millis_opt(millis).single())
}

/// Local time for epoch seconds, as `YYYY-MM-DD HH:MM:SS`.
pub fn format_timestamp_secs(secs: i64) -> Option<String> {
    format_local(Local.timestamp_opt(secs, 0).single())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        let mut table = Table::new(vec![Column::new("Name", 6), Column::new("ID", 4)]);
        table.push_row(vec!["a".to_string(), "1".to_string()]);
        table.push_row(vec!["longer-name".to_string(), "2".to_string()]);
        table
    }

    #[test]
    fn test_table_render() {
        assert_eq!(
            sample_table().render(),
            "Name     ID\n------   ----\na        1\nlonger-name   2\n"
        );
    }

    #[test]
    fn test_framed_table() {
        let rendered = sample_table().framed(true).render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "------   ----");
        assert_eq!(lines[1], "Name     ID");
        assert_eq!(lines[5], "------   ----");
    }

    #[test]
    fn test_field_block_aligns_labels() {
        let block = field_block(&[
            ("host_name", "node1".to_string()),
            ("id", "7".to_string()),
        ]);
        assert_eq!(block, "host_name: node1\nid       : 7\n\n");
    }

    #[test]
    fn test_or_not_defined() {
        assert_eq!(or_not_defined(Some(42)), "42");
        assert_eq!(or_not_defined(None::<i64>), "Not defined");
    }

    #[test]
    fn test_timestamp_ms_is_local_time() {
        let expected = DateTime::from_timestamp(1_700_000_000, 0)
            .unwrap()
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();

        let rendered = format_timestamp_ms(1_700_000_000_000).unwrap();
        assert_eq!(rendered, expected);
        assert_eq!(rendered.len(), 19);
        assert_eq!(format_timestamp_secs(1_700_000_000).unwrap(), expected);
    }
}
