//! Minimal CSV codec for the rule table.
//!
//! Comma-delimited, `"`-quoted fields with `""` escapes, LF or CRLF line
//! endings. Header names are lowercased on read.

use indexmap::IndexMap;

use super::error::{Result, RuleError};

/// One table row keyed by header name, in column order.
pub type RuleRecord = IndexMap<String, String>;

/// A parsed table: lowercased header plus the raw data rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Map a data row onto the header. Short rows are padded with empty
    /// cells. Fields past the header are folded into the last column,
    /// joined by commas, after dropping trailing empty ones; the flag
    /// reports whether anything was folded.
    pub fn record(&self, fields: &[String]) -> (RuleRecord, bool) {
        let width = self.header.len();
        let mut cells: Vec<String> = fields.to_vec();
        while cells.len() > width && cells.last().is_some_and(|c| c.is_empty()) {
            cells.pop();
        }

        let folded = cells.len() > width;
        if folded && width > 0 {
            let overflow = cells.split_off(width - 1);
            cells.push(overflow.join(","));
        }

        let padded = cells.into_iter().chain(std::iter::repeat(String::new()));
        (self.header.iter().cloned().zip(padded).collect(), folded)
    }
}

/// Parse CSV text. Blank lines are ignored; a leading BOM is stripped.
pub fn parse_table(input: &str) -> Result<CsvTable> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut rows = split_rows(input)?.into_iter();

    let header = match rows.next() {
        Some(header) => header
            .into_iter()
            .map(|name| name.trim().to_lowercase())
            .collect(),
        None => return Ok(CsvTable::default()),
    };
    Ok(CsvTable {
        header,
        rows: rows.collect(),
    })
}

fn split_rows(input: &str) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut quote_line = 0;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() => {
                in_quotes = true;
                quote_line = line;
            }
            ',' => row.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\r' | '\n' => {
                line += 1;
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(RuleError::Csv(format!(
            "unterminated quoted field starting on line {}",
            quote_line
        )));
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows.retain(|r| !(r.len() == 1 && r[0].trim().is_empty()));
    Ok(rows)
}

/// Serialize records. The header is taken from the keys of the first
/// record; absent cells are written as empty strings.
pub fn write_records(records: &[RuleRecord]) -> String {
    let first = match records.first() {
        Some(first) => first,
        None => return String::new(),
    };
    let header: Vec<&str> = first.keys().map(String::as_str).collect();

    let mut out = String::new();
    write_row(&mut out, header.iter().copied());
    for record in records {
        write_row(
            &mut out,
            header
                .iter()
                .map(|key| record.get(*key).map(String::as_str).unwrap_or("")),
        );
    }
    out
}

fn write_row<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        if field.contains([',', '"', '\n', '\r']) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
}
