//! TableEngine trait definition.

use crate::{TableIdent, TableWriteOptions};
use anyhow::Result;
use csv_table::CsvReadOptions;
use dbfs_export_file::StoragePath;

/// Trait for engines that load a CSV source and commit it as a table.
///
/// The export runs the two steps back to back: `read_csv` produces an
/// engine-specific frame, and `write_table` consumes it.
///
/// # Usage Pattern
///
/// ```ignore
/// pub async fn export<E: TableEngine>(engine: &E, config: &Config) -> Result<()> {
///     let frame = engine.read_csv(&config.source, &config.read_options).await?;
///     engine.write_table(frame, &config.target, &config.write_options).await
/// }
/// ```
#[async_trait::async_trait]
pub trait TableEngine: Send + Sync {
    /// Tabular data produced by `read_csv`
    type Frame: Send;

    /// Open the CSV at `source` with the given reader options.
    async fn read_csv(&self, source: &StoragePath, options: &CsvReadOptions)
        -> Result<Self::Frame>;

    /// Write `frame` to `target`, replacing the table's existing rows.
    ///
    /// With `overwrite_schema` the frame's columns also replace the table's
    /// schema; otherwise columns are matched to the existing schema by name.
    async fn write_table(
        &self,
        frame: Self::Frame,
        target: &TableIdent,
        options: &TableWriteOptions,
    ) -> Result<()>;
}
