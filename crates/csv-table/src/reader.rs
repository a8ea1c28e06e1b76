//! Header-aware CSV parsing into a [`CsvTable`].

use crate::{CsvReadOptions, CsvTable, ParseMode};
use std::collections::HashSet;

/// Errors produced while parsing CSV input
#[derive(Debug, thiserror::Error)]
pub enum CsvTableError {
    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Column count mismatch on line {line}: expected {expected} columns, found {found}")]
    ColumnCount {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("Value on line {line} spans multiple lines but multi-line parsing is disabled")]
    MultiLineValue { line: u64 },
}

/// Parse CSV input into a table of strings
///
/// Quoted values may contain delimiters, doubled quotes, and line breaks.
/// Header names are made unique and non-empty; without a header, columns are
/// named `_c0`, `_c1`, ... after the first record.
pub fn read_csv_table<R: std::io::Read>(
    reader: R,
    options: &CsvReadOptions,
) -> Result<CsvTable, CsvTableError> {
    let mut csv_reader = options.reader_builder().from_reader(reader);
    let mut records = csv_reader.records();

    let Some(first) = records.next().transpose()? else {
        tracing::warn!("CSV input is empty");
        return Ok(CsvTable::default());
    };

    let mut table = CsvTable::default();
    if options.header {
        table.columns = safe_header(&first);
    } else {
        table.columns = (0..first.len()).map(|i| format!("_c{i}")).collect();
        table.rows.push(to_row(&first, table.columns.len(), options)?);
    }

    tracing::debug!("CSV columns: {:?}", table.columns);

    for result in records {
        let record = result?;
        table.rows.push(to_row(&record, table.columns.len(), options)?);
    }

    Ok(table)
}

/// Make header names usable as column names
///
/// Empty names become `_c<index>`. Names that occur more than once (compared
/// case-insensitively) get their index appended on every occurrence.
fn safe_header(record: &csv::StringRecord) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates = HashSet::new();
    for name in record.iter().filter(|n| !n.is_empty()) {
        let key = name.to_lowercase();
        if !seen.insert(key.clone()) {
            duplicates.insert(key);
        }
    }

    record
        .iter()
        .enumerate()
        .map(|(index, name)| {
            if name.is_empty() {
                format!("_c{index}")
            } else if duplicates.contains(&name.to_lowercase()) {
                format!("{name}{index}")
            } else {
                name.to_string()
            }
        })
        .collect()
}

fn to_row(
    record: &csv::StringRecord,
    width: usize,
    options: &CsvReadOptions,
) -> Result<Vec<Option<String>>, CsvTableError> {
    let line = record.position().map(|p| p.line()).unwrap_or_default();

    if record.len() != width && options.mode == ParseMode::FailFast {
        return Err(CsvTableError::ColumnCount {
            line,
            expected: width,
            found: record.len(),
        });
    }

    if !options.multi_line && record.iter().any(|v| v.contains(['\n', '\r'])) {
        return Err(CsvTableError::MultiLineValue { line });
    }

    let mut row: Vec<Option<String>> = record
        .iter()
        .take(width)
        .map(|v| (!v.is_empty()).then(|| v.to_string()))
        .collect();
    row.resize(width, None);

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(data: &str) -> CsvTable {
        read_csv_table(data.as_bytes(), &CsvReadOptions::default()).unwrap()
    }

    fn owned(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    #[test]
    fn test_quoted_comma_and_embedded_newline() {
        let table = read("id,name\n1,\"a,b\"\n2,\"c\nd\"");
        assert_eq!(table.columns, vec!["id", "name"]);
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.column("name"), Some(vec![Some("a,b"), Some("c\nd")]));
        assert_eq!(table.column("id"), Some(vec![Some("1"), Some("2")]));
    }

    #[test]
    fn test_doubled_quote_escape() {
        let table = read("id,quote\n1,\"she said \"\"hi\"\"\"\n");
        assert_eq!(table.column("quote"), Some(vec![Some("she said \"hi\"")]));
    }

    #[test]
    fn test_backslash_escape() {
        let options = CsvReadOptions {
            escape: b'\\',
            ..Default::default()
        };
        let table = read_csv_table("id,v\n1,\"a\\\"b\"\n".as_bytes(), &options).unwrap();
        assert_eq!(table.column("v"), Some(vec![Some("a\"b")]));
    }

    #[test]
    fn test_empty_fields_are_null() {
        let table = read("a,b,c\n1,,3\n");
        assert_eq!(table.rows[0], owned(&[Some("1"), None, Some("3")]));
    }

    #[test]
    fn test_empty_input() {
        let table = read("");
        assert_eq!(table, CsvTable::default());
    }

    #[test]
    fn test_header_only() {
        let table = read("id,name\n");
        assert_eq!(table.columns, vec!["id", "name"]);
        assert_eq!(table.num_rows(), 0);
    }

    #[test]
    fn test_header_naming() {
        let table = read("id,,Name,name,x\n1,2,3,4,5\n");
        assert_eq!(table.columns, vec!["id", "_c1", "Name2", "name3", "x"]);
    }

    #[test]
    fn test_no_header() {
        let options = CsvReadOptions {
            header: false,
            ..Default::default()
        };
        let table = read_csv_table("1,a\n2,b\n".as_bytes(), &options).unwrap();
        assert_eq!(table.columns, vec!["_c0", "_c1"]);
        assert_eq!(table.num_rows(), 2);
    }

    #[test]
    fn test_permissive_pads_and_truncates() {
        let table = read("a,b\n1\n1,2,3\n");
        assert_eq!(table.rows[0], owned(&[Some("1"), None]));
        assert_eq!(table.rows[1], owned(&[Some("1"), Some("2")]));
    }

    #[test]
    fn test_fail_fast_rejects_mismatch() {
        let options = CsvReadOptions {
            mode: ParseMode::FailFast,
            ..Default::default()
        };
        let err = read_csv_table("a,b\n1,2\n1,2,3\n".as_bytes(), &options).unwrap_err();
        match err {
            CsvTableError::ColumnCount {
                line,
                expected,
                found,
            } => {
                assert_eq!(line, 3);
                assert_eq!(expected, 2);
                assert_eq!(found, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_multi_line_disabled() {
        let options = CsvReadOptions {
            multi_line: false,
            ..Default::default()
        };
        let result = read_csv_table("id,name\n2,\"c\nd\"\n".as_bytes(), &options);
        assert!(matches!(result, Err(CsvTableError::MultiLineValue { line: 2 })));
    }

    #[test]
    fn test_semicolon_delimiter() {
        let options = CsvReadOptions {
            delimiter: b';',
            ..Default::default()
        };
        let table = read_csv_table("id;name\n1;a,b\n".as_bytes(), &options).unwrap();
        assert_eq!(table.column("name"), Some(vec![Some("a,b")]));
    }
}
