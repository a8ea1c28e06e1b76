//! CSV to table export
//!
//! Reads the CSV source through a [`TableEngine`], writes it to the destination
//! table, and removes the source afterwards whether or not the load succeeded.

use crate::cleanup::run_with_cleanup;
use anyhow::{Context, Result};
use csv_table::CsvReadOptions;
use dbfs_export_file::{Removal, SourceStorage, StoragePath};
use table_engine::{TableEngine, TableIdent, TableWriteOptions};
use tracing::{debug, error, info, warn};

/// Configuration for one export
#[derive(Debug, Clone)]
pub struct Config {
    /// CSV source, removed once the export has finished
    pub source: StoragePath,

    /// Destination table
    pub target: TableIdent,

    /// CSV reader options (default: header row, `"` escape, multi-line values)
    pub read_options: CsvReadOptions,

    /// Table writer options (default: delta, overwrite schema, column mapping by name)
    pub write_options: TableWriteOptions,
}

impl Config {
    pub fn new(source: StoragePath, target: TableIdent) -> Self {
        Self {
            source,
            target,
            read_options: CsvReadOptions::default(),
            write_options: TableWriteOptions::default(),
        }
    }
}

/// Save the CSV at `config.source` as the table `config.target`
///
/// The table's rows and schema are replaced. The source is removed
/// recursively on every exit path, including a panic inside the engine.
///
/// Errors from the read or write step are logged and returned unchanged. A
/// cleanup failure is returned only when the load itself succeeded; after a
/// failed load it is logged and the load error is returned instead.
pub async fn export<E, S>(engine: &E, storage: &S, config: &Config) -> Result<()>
where
    E: TableEngine,
    S: SourceStorage,
{
    info!("Starting export of {} to {}", config.source, config.target);

    let outcome = run_with_cleanup(
        load(engine, config),
        remove_source(storage, &config.source),
    )
    .await;

    let cleanup = outcome.cleanup;
    let operation = match outcome.operation {
        Ok(result) => result,
        Err(panic) => {
            if let Err(e) = &cleanup {
                warn!("{e:#}");
            }
            std::panic::resume_unwind(panic);
        }
    };

    match (operation, cleanup) {
        (Ok(()), Ok(())) => {
            info!("Export to {} completed successfully", config.target);
            Ok(())
        }
        (Ok(()), Err(e)) => {
            error!("Error: {e:#}");
            Err(e)
        }
        (Err(e), Ok(())) => {
            error!("Error: {e:#}");
            Err(e)
        }
        (Err(e), Err(cleanup_error)) => {
            error!("Error: {e:#}");
            warn!("{cleanup_error:#}");
            Err(e)
        }
    }
}

async fn load<E: TableEngine>(engine: &E, config: &Config) -> Result<()> {
    info!("Reading CSV from {}", config.source);
    let frame = engine
        .read_csv(&config.source, &config.read_options)
        .await?;

    info!("Writing table {}", config.target);
    engine
        .write_table(frame, &config.target, &config.write_options)
        .await
}

async fn remove_source<S: SourceStorage>(storage: &S, source: &StoragePath) -> Result<()> {
    let removal = storage
        .remove(source, true)
        .await
        .with_context(|| format!("Failed to remove source {source}"))?;

    match removal {
        Removal::Deleted => info!("Removed source {source}"),
        Removal::NotFound => debug!("Source {source} was already absent"),
    }

    Ok(())
}
