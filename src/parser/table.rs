use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{RowError, RowResult};
use crate::schema::SourceTable;

#[derive(Debug, Clone)]
enum Field {
    Text(String),
    InvalidUtf8,
}

/// One source row, holding only the columns its table declares
#[derive(Debug, Clone)]
pub struct Row {
    /// 1-based line in the source file, header included
    pub line: u64,
    values: HashMap<&'static str, Field>,
}

impl Row {
    #[cfg(test)]
    pub(crate) fn from_pairs(line: u64, pairs: &[(&'static str, &str)]) -> Self {
        let values = pairs
            .iter()
            .map(|(k, v)| (*k, Field::Text(v.to_string())))
            .collect();
        Self { line, values }
    }

    /// Raw string value, verbatim from the export
    pub fn get(&self, column: &'static str) -> RowResult<&str> {
        match self.values.get(column) {
            Some(Field::Text(s)) => Ok(s.as_str()),
            Some(Field::InvalidUtf8) => Err(RowError::InvalidUtf8 { column }),
            None => Err(RowError::MissingValue { column }),
        }
    }

    pub fn int(&self, column: &'static str) -> RowResult<i64> {
        let raw = self.get(column)?;
        raw.trim()
            .parse::<i64>()
            .map_err(|_| RowError::InvalidInteger {
                column,
                value: raw.to_string(),
            })
    }

    /// Integer-valued id, kept in its original string form
    pub fn id(&self, column: &'static str) -> RowResult<String> {
        self.int(column)?;
        Ok(self.get(column)?.to_string())
    }
}

/// Read every row of a source table from the data directory.
///
/// A missing file or missing declared column is fatal. Short rows are kept;
/// their absent columns surface as [`RowError::MissingValue`], and fields
/// that are not UTF-8 as [`RowError::InvalidUtf8`].
pub fn read_table(data_dir: &Path, table: &SourceTable) -> Result<Vec<Row>> {
    let path = data_dir.join(table.source_file);
    if !path.exists() {
        bail!("Missing source file for {}: {:?}", table.name, path);
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(&path)
        .with_context(|| format!("Failed to open: {:?}", path))?;

    let headers = reader
        .byte_headers()
        .with_context(|| format!("Failed to read header of {:?}", path))?
        .clone();

    let mut positions = Vec::with_capacity(table.columns.len());
    for column in table.columns {
        match headers.iter().position(|h| h == column.as_bytes()) {
            Some(idx) => positions.push((*column, idx)),
            None => bail!(
                "Missing column {} in {} ({:?})",
                column,
                table.name,
                path
            ),
        }
    }

    let mut rows = Vec::new();
    for (n, record) in reader.byte_records().enumerate() {
        let record =
            record.with_context(|| format!("Failed to read record in {}", table.source_file))?;

        let mut values = HashMap::with_capacity(positions.len());
        for (column, idx) in &positions {
            if let Some(bytes) = record.get(*idx) {
                let field = match std::str::from_utf8(bytes) {
                    Ok(text) => Field::Text(text.to_string()),
                    Err(_) => Field::InvalidUtf8,
                };
                values.insert(*column, field);
            }
        }

        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(n as u64 + 2);
        rows.push(Row { line, values });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    static PEOPLE: SourceTable = SourceTable::new("people", "people.csv", &["ID", "Name_lang"]);

    fn write(dir: &TempDir, contents: &str) {
        fs::write(dir.path().join("people.csv"), contents).unwrap();
    }

    #[test]
    fn test_reads_declared_columns_only() {
        let dir = TempDir::new().unwrap();
        write(&dir, "Name_lang,Extra,ID\nAlice,x,1\n\"Bob, Jr\",y,2\n");

        let rows = read_table(dir.path(), &PEOPLE).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("ID").unwrap(), "1");
        assert_eq!(rows[1].get("Name_lang").unwrap(), "Bob, Jr");
        assert!(rows[0].get("Extra").is_err());
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let dir = TempDir::new().unwrap();
        write(&dir, "ID,Name\n1,Alice\n");

        let err = read_table(dir.path(), &PEOPLE).unwrap_err();
        assert!(err.to_string().contains("Name_lang"));
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = read_table(dir.path(), &PEOPLE).unwrap_err();
        assert!(err.to_string().contains("people.csv"));
    }

    #[test]
    fn test_short_row_reports_missing_value() {
        let dir = TempDir::new().unwrap();
        write(&dir, "ID,Name_lang\n7\n");

        let rows = read_table(dir.path(), &PEOPLE).unwrap();
        assert_eq!(
            rows[0].get("Name_lang"),
            Err(RowError::MissingValue { column: "Name_lang" })
        );
    }

    #[test]
    fn test_invalid_utf8_is_a_row_error() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("people.csv"),
            b"ID,Name_lang\n1,Normal\n2,Bad\xff\n3,Mythic\n",
        )
        .unwrap();

        let rows = read_table(dir.path(), &PEOPLE).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].get("ID").unwrap(), "2");
        assert_eq!(
            rows[1].get("Name_lang"),
            Err(RowError::InvalidUtf8 { column: "Name_lang" })
        );
        assert_eq!(rows[2].get("Name_lang").unwrap(), "Mythic");
    }

    #[test]
    fn test_id_validates_but_preserves_text() {
        let row = Row::from_pairs(2, &[("ID", "00042"), ("Bad", "4x")]);
        assert_eq!(row.id("ID").unwrap(), "00042");
        assert!(matches!(
            row.int("Bad"),
            Err(RowError::InvalidInteger { column: "Bad", .. })
        ));
    }
}
