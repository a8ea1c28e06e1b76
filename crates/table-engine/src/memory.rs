//! In-memory table engine.
//!
//! Parses CSV sources locally and keeps committed tables in a map keyed by
//! their identifier. Each overwrite bumps the table version, mirroring a
//! transactional table log.

use crate::{ColumnMapping, TableEngine, TableIdent, TableWriteOptions};
use anyhow::{Context, Result};
use csv_table::{read_csv_table, CsvReadOptions, CsvTable};
use dbfs_export_file::{SourceStorage, Storage, StoragePath};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use tracing::info;

/// Errors raised by [`MemoryEngine`] writes
#[derive(Debug, thiserror::Error)]
pub enum MemoryEngineError {
    #[error("Schema mismatch writing {table}: table has columns {existing:?}, data has columns {incoming:?}")]
    SchemaMismatch {
        table: String,
        existing: Vec<String>,
        incoming: Vec<String>,
    },

    #[error("Unsupported table format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid table name '{0}': expected exactly catalog.schema.table")]
    InvalidTableName(String),
}

/// A committed table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryTable {
    pub data: CsvTable,
    /// Starts at 0 on creation, incremented by every overwrite
    pub version: u64,
    pub properties: BTreeMap<String, String>,
}

/// Table engine that keeps tables in process memory
pub struct MemoryEngine<S = Storage> {
    storage: S,
    tables: Mutex<HashMap<TableIdent, MemoryTable>>,
}

impl<S: SourceStorage> MemoryEngine<S> {
    /// Create an engine reading sources through `storage`
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            tables: Mutex::new(HashMap::new()),
        }
    }

    /// Snapshot of a committed table
    pub fn table(&self, ident: &TableIdent) -> Option<MemoryTable> {
        self.tables
            .lock()
            .ok()
            .and_then(|tables| tables.get(ident).cloned())
    }
}

#[async_trait::async_trait]
impl<S: SourceStorage> TableEngine for MemoryEngine<S> {
    type Frame = CsvTable;

    async fn read_csv(&self, source: &StoragePath, options: &CsvReadOptions) -> Result<CsvTable> {
        let reader = self
            .storage
            .open(source)
            .await
            .with_context(|| format!("Failed to open CSV source: {source}"))?;

        let table = read_csv_table(reader, options)
            .with_context(|| format!("Failed to parse CSV source: {source}"))?;

        info!(
            "Read {} rows with {} columns from {}",
            table.num_rows(),
            table.num_columns(),
            source
        );

        Ok(table)
    }

    async fn write_table(
        &self,
        frame: CsvTable,
        target: &TableIdent,
        options: &TableWriteOptions,
    ) -> Result<()> {
        if !options.format.eq_ignore_ascii_case("delta") {
            return Err(MemoryEngineError::UnsupportedFormat(options.format.clone()).into());
        }

        let qualified_name = target.qualified_name();
        if qualified_name.split('.').count() != 3 || qualified_name.contains('`') {
            return Err(MemoryEngineError::InvalidTableName(qualified_name).into());
        }

        let mut tables = self
            .tables
            .lock()
            .map_err(|_| anyhow::anyhow!("Table catalog lock poisoned"))?;

        let previous = tables.get(target);
        let data = match previous {
            Some(existing) if !options.overwrite_schema => {
                // Match incoming columns to the existing schema by name
                frame
                    .select(&existing.data.columns)
                    .filter(|_| frame.num_columns() == existing.data.num_columns())
                    .ok_or_else(|| MemoryEngineError::SchemaMismatch {
                        table: target.qualified_name(),
                        existing: existing.data.columns.clone(),
                        incoming: frame.columns.clone(),
                    })?
            }
            _ => frame,
        };
        let version = previous.map_or(0, |t| t.version + 1);

        let mut properties = BTreeMap::new();
        if options.column_mapping != ColumnMapping::None {
            properties.insert(
                "delta.columnMapping.mode".to_string(),
                options.column_mapping.as_property_value().to_string(),
            );
        }

        info!(
            "Committed {} rows to {} (version {})",
            data.num_rows(),
            target,
            version
        );

        tables.insert(
            target.clone(),
            MemoryTable {
                data,
                version,
                properties,
            },
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ident() -> TableIdent {
        TableIdent::new("main", "default", "people").unwrap()
    }

    fn table(columns: &[&str], rows: &[&[&str]]) -> CsvTable {
        CsvTable {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|v| Some(v.to_string())).collect())
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_read_csv_from_local_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("people.csv");
        std::fs::write(&path, "id,name\n1,\"a,b\"\n2,\"c\nd\"\n").unwrap();

        let engine = MemoryEngine::new(Storage::new());
        let source = StoragePath::Local(path);
        let frame = engine
            .read_csv(&source, &CsvReadOptions::default())
            .await
            .unwrap();

        assert_eq!(frame.columns, vec!["id", "name"]);
        assert_eq!(frame.column("name"), Some(vec![Some("a,b"), Some("c\nd")]));
    }

    #[tokio::test]
    async fn test_read_csv_missing_source() {
        let temp_dir = TempDir::new().unwrap();
        let engine = MemoryEngine::new(Storage::new());
        let source = StoragePath::Local(temp_dir.path().join("missing.csv"));

        let err = engine
            .read_csv(&source, &CsvReadOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to open CSV source"));
    }

    #[tokio::test]
    async fn test_overwrite_replaces_rows_and_schema() {
        let engine = MemoryEngine::new(Storage::new());
        let options = TableWriteOptions::default();

        engine
            .write_table(table(&["id", "name"], &[&["1", "a"]]), &ident(), &options)
            .await
            .unwrap();
        engine
            .write_table(
                table(&["id", "email"], &[&["7", "x@y"], &["8", "z@y"]]),
                &ident(),
                &options,
            )
            .await
            .unwrap();

        let committed = engine.table(&ident()).unwrap();
        assert_eq!(committed.version, 1);
        assert_eq!(committed.data.columns, vec!["id", "email"]);
        assert_eq!(committed.data.num_rows(), 2);
        assert_eq!(
            committed.properties.get("delta.columnMapping.mode").map(String::as_str),
            Some("name")
        );
    }

    #[tokio::test]
    async fn test_keep_schema_matches_columns_by_name() {
        let engine = MemoryEngine::new(Storage::new());
        let keep_schema = TableWriteOptions {
            overwrite_schema: false,
            ..Default::default()
        };

        engine
            .write_table(table(&["id", "name"], &[&["1", "a"]]), &ident(), &keep_schema)
            .await
            .unwrap();
        engine
            .write_table(table(&["name", "id"], &[&["b", "2"]]), &ident(), &keep_schema)
            .await
            .unwrap();

        let committed = engine.table(&ident()).unwrap();
        assert_eq!(committed.data, table(&["id", "name"], &[&["2", "b"]]));
    }

    #[tokio::test]
    async fn test_keep_schema_rejects_different_columns() {
        let engine = MemoryEngine::new(Storage::new());
        let keep_schema = TableWriteOptions {
            overwrite_schema: false,
            ..Default::default()
        };

        engine
            .write_table(table(&["id", "name"], &[&["1", "a"]]), &ident(), &keep_schema)
            .await
            .unwrap();
        let err = engine
            .write_table(
                table(&["id", "name", "age"], &[&["1", "a", "3"]]),
                &ident(),
                &keep_schema,
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<MemoryEngineError>(),
            Some(MemoryEngineError::SchemaMismatch { .. })
        ));
        assert_eq!(engine.table(&ident()).unwrap().version, 0);
    }

    #[tokio::test]
    async fn test_unsupported_format() {
        let engine = MemoryEngine::new(Storage::new());
        let options = TableWriteOptions {
            format: "parquet".to_string(),
            ..Default::default()
        };

        let result = engine.write_table(CsvTable::default(), &ident(), &options).await;
        assert!(result.is_err());
        assert!(engine.table(&ident()).is_none());
    }

    #[tokio::test]
    async fn test_multi_part_table_name_rejected() {
        let engine = MemoryEngine::new(Storage::new());
        let target = TableIdent::new("main", "sales", "orders.v2").unwrap();

        let err = engine
            .write_table(table(&["id"], &[&["1"]]), &target, &TableWriteOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<MemoryEngineError>(),
            Some(MemoryEngineError::InvalidTableName(name)) if name == "main.sales.orders.v2"
        ));
        assert!(engine.table(&target).is_none());
    }
}
