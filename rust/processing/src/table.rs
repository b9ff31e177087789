// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Comma-separated input tables.
//!
//! Fields may be wrapped in double quotes; inside quotes a doubled quote is a
//! literal quote and commas or line breaks are part of the field. The first
//! record is a header and is skipped: columns are addressed by position.

use std::path::Path;

use crate::error::{Error, Result};

/// One data record of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// 1-based line on which the record starts
    pub line: usize,
    pub fields: Vec<String>,
}

impl TableRow {
    /// Field at `index`, or `""` when the record is short.
    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or("")
    }

    /// Parses a finite numeric field, reporting the column name on failure.
    pub fn number(&self, index: usize, column: &str) -> Result<f64> {
        let raw = self.field(index).trim();
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(Error::malformed(
                self.line,
                format!("{} '{}' is not a number", column, raw),
            )),
        }
    }
}

/// A parsed table: header plus data records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Reads a table from disk.
    ///
    /// A missing file aborts with [`Error::MissingInput`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::MissingInput(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        Ok(Self::parse(&text))
    }

    /// Parses delimited text. Blank lines are ignored.
    pub fn parse(text: &str) -> Self {
        let mut records = parse_records(text).into_iter();
        let header = records.next().map(|r| r.fields).unwrap_or_default();
        Self {
            header,
            rows: records.collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn parse_records(text: &str) -> Vec<TableRow> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = text.chars().peekable();

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
            '"' => in_quotes = true,
            ',' => fields.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                fields.push(std::mem::take(&mut field));
                push_record(&mut records, std::mem::take(&mut fields), record_line);
                line += 1;
                record_line = line;
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        push_record(&mut records, fields, record_line);
    }

    records
}

fn push_record(records: &mut Vec<TableRow>, fields: Vec<String>, line: usize) {
    let blank = fields.iter().all(|f| f.trim().is_empty());
    if !blank {
        records.push(TableRow { line, fields });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_skipped() {
        let table = Table::parse("A,B\n1,2\n3,4\n");
        assert_eq!(table.header, vec!["A", "B"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1].field(0), "3");
        assert_eq!(table.rows[1].line, 3);
    }

    #[test]
    fn quoted_fields() {
        let table = Table::parse("Sign,Designation\r\n\"Stop, all ways\",R1-1\n\"Say \"\"hi\"\"\",X\n");
        assert_eq!(table.rows[0].field(0), "Stop, all ways");
        assert_eq!(table.rows[0].field(1), "R1-1");
        assert_eq!(table.rows[1].field(0), "Say \"hi\"");
    }

    #[test]
    fn multiline_quoted_field_keeps_line_numbers() {
        let table = Table::parse("A,B\n\"two\nlines\",x\nnext,y");
        assert_eq!(table.rows[0].field(0), "two\nlines");
        assert_eq!(table.rows[0].line, 2);
        assert_eq!(table.rows[1].line, 4);
        assert_eq!(table.rows[1].field(1), "y");
    }

    #[test]
    fn short_rows_and_blank_lines() {
        let table = Table::parse("A,B,C\n\n1\n,,\n");
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].field(2), "");
    }

    #[test]
    fn number_reports_column() {
        let table = Table::parse("X\nabc\n");
        let err = table.rows[0].number(0, "X").unwrap_err();
        assert!(err.to_string().contains("X 'abc'"));
    }

    #[test]
    fn number_rejects_non_finite() {
        let table = Table::parse("W,H\nNaN,inf\n");
        assert!(table.rows[0].number(0, "W").is_err());
        assert!(table.rows[0].number(1, "H").is_err());
    }

    #[test]
    fn missing_file() {
        let path = std::env::temp_dir().join("ifc-signs-definitely-missing.csv");
        assert!(matches!(Table::open(&path), Err(Error::MissingInput(_))));
    }
}
