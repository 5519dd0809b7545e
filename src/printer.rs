//! Result Printer Module
//!
//! Diagnostic text rendering for the tabular model: fixed-width tables plus
//! CSV, JSON and Markdown exports. Purely cosmetic; nothing here is meant to
//! be parsed back.

use crate::core::{DalError, Result};
use crate::model::{Entry, ResultSet, Row};
use serde::Deserialize;

/// Characters and limits used when drawing tables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    /// Where borders meet
    pub corner: char,
    /// Vertical border
    pub wall: char,
    /// Horizontal border
    pub edge: char,
    /// Last character of a truncated value
    pub mask: char,
    /// Padding
    pub space: char,
    /// Widest a column may grow
    pub max_width: usize,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        PrinterConfig {
            corner: '+',
            wall: '|',
            edge: '-',
            mask: '~',
            space: ' ',
            max_width: 50,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResultPrinter {
    config: PrinterConfig,
}

impl ResultPrinter {
    pub fn new(config: PrinterConfig) -> Self {
        ResultPrinter { config }
    }

    pub fn config(&self) -> &PrinterConfig {
        &self.config
    }

    /// Renders every row of `set` as a table headed by the first row's
    /// fields. An empty set renders as `(0 rows)`.
    pub fn print_set(&self, set: &ResultSet) -> String {
        if set.is_empty() {
            return "(0 rows)\n".to_string();
        }
        let headers = set.field_names();
        let widths = self.column_widths(&headers, set.rows());

        // Truncate on a copy; the caller's set is left untouched.
        let mut display = set.clone();
        for index in 0..display.len() {
            if let Some(row) = display.get_mut(index) {
                for (header, width) in headers.iter().zip(&widths) {
                    let shown = self.fit(row.get_value(header), *width);
                    row.set_value(header, shown);
                }
            }
        }

        let border = self.border(&widths);
        let mut output = String::new();
        output.push_str(&border);
        output.push_str(&self.line(&headers, &widths));
        output.push_str(&border);
        for row in &display {
            let cells: Vec<String> = headers.iter().map(|h| row.get_value(h).to_string()).collect();
            output.push_str(&self.line(&cells, &widths));
        }
        output.push_str(&border);
        output
    }

    pub fn print_row(&self, row: &Row) -> String {
        let mut set = ResultSet::new();
        set.add_item(row.clone());
        self.print_set(&set)
    }

    pub fn print_entry(&self, entry: &Entry) -> String {
        format!("{}: {}", entry.field(), self.fit(entry.value(), self.config.max_width))
    }

    /// One-line description of how the statement went.
    pub fn summary(&self, set: &ResultSet) -> String {
        format!(
            "{} | rows: {} | affected: {} | {}",
            set.outcome(),
            set.len(),
            set.rows_affected(),
            set.query()
        )
    }

    /// Exports the set to a specified format.
    /// Supported formats: CSV, JSON, Markdown.
    pub fn export(&self, set: &ResultSet, format: &str) -> Result<String> {
        match format.to_lowercase().as_str() {
            "csv" => Ok(self.export_to_csv(set)),
            "json" => self.export_to_json(set),
            "markdown" | "md" => Ok(self.export_to_markdown(set)),
            _ => Err(DalError::Validation(format!(
                "Unsupported export format: '{}'. Supported formats: csv, json, markdown",
                format
            ))),
        }
    }

    fn export_to_csv(&self, set: &ResultSet) -> String {
        let headers = set.field_names();
        let mut output = String::new();
        if !headers.is_empty() {
            output.push_str(&headers.join(","));
            output.push('\n');
        }
        for row in set {
            let cells: Vec<String> = headers.iter().map(|h| csv_field(row.get_value(h))).collect();
            output.push_str(&cells.join(","));
            output.push('\n');
        }
        output
    }

    fn export_to_json(&self, set: &ResultSet) -> Result<String> {
        Ok(serde_json::to_string(set.rows())?)
    }

    fn export_to_markdown(&self, set: &ResultSet) -> String {
        let headers = set.field_names();
        let mut output = String::new();
        if !headers.is_empty() {
            output.push_str(&headers.join(" | "));
            output.push('\n');
            let underline: Vec<String> = headers.iter().map(|h| "-".repeat(h.len())).collect();
            output.push_str(&underline.join(" | "));
            output.push('\n');
        }
        for row in set {
            let cells: Vec<&str> = headers.iter().map(|h| row.get_value(h)).collect();
            output.push_str(&cells.join(" | "));
            output.push('\n');
        }
        output
    }

    fn column_widths(&self, headers: &[String], rows: &[Row]) -> Vec<usize> {
        headers
            .iter()
            .map(|header| {
                rows.iter()
                    .map(|row| row.get_value(header).chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
                    .min(self.config.max_width)
            })
            .collect()
    }

    /// Cuts `value` to `width` characters, ending in the mask when cut.
    fn fit(&self, value: &str, width: usize) -> String {
        if value.chars().count() <= width {
            return value.to_string();
        }
        if width == 0 {
            return String::new();
        }
        let mut cut: String = value.chars().take(width - 1).collect();
        cut.push(self.config.mask);
        cut
    }

    fn border(&self, widths: &[usize]) -> String {
        let mut line = String::new();
        line.push(self.config.corner);
        for width in widths {
            line.extend(std::iter::repeat(self.config.edge).take(width + 2));
            line.push(self.config.corner);
        }
        line.push('\n');
        line
    }

    fn line<S: AsRef<str>>(&self, cells: &[S], widths: &[usize]) -> String {
        let mut line = String::new();
        line.push(self.config.wall);
        for (cell, width) in cells.iter().zip(widths) {
            let cell = self.fit(cell.as_ref(), *width);
            line.push(self.config.space);
            line.push_str(&cell);
            line.extend(std::iter::repeat(self.config.space).take(width - cell.chars().count()));
            line.push(self.config.space);
            line.push(self.config.wall);
        }
        line.push('\n');
        line
    }
}

fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
