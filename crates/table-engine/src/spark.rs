//! Spark Connect engine.
//!
//! Reads CSV sources and writes managed Delta tables through a remote Spark
//! session, for example a Databricks cluster reached over Spark Connect.

use crate::{TableEngine, TableIdent, TableWriteOptions};
use anyhow::Result;
use csv_table::CsvReadOptions;
use dbfs_export_file::StoragePath;
use spark_connect_rs::dataframe::{DataFrame, SaveMode};
use spark_connect_rs::{SparkSession, SparkSessionBuilder};
use std::sync::Arc;
use tracing::{debug, info};

/// Table engine backed by a Spark Connect session
pub struct SparkConnectEngine {
    session: Arc<SparkSession>,
}

impl SparkConnectEngine {
    /// Connect to a Spark Connect server
    ///
    /// `connection` uses the Spark Connect URL format, e.g.
    /// `sc://host:15002/;token=...;x-databricks-cluster-id=...`.
    pub async fn connect(connection: &str) -> Result<Self> {
        info!(
            "Connecting to Spark Connect server: {}",
            redact_connection(connection)
        );

        let session = SparkSessionBuilder::remote(connection)
            .build()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to connect to Spark Connect server: {e}"))?;

        Ok(Self {
            session: Arc::new(session),
        })
    }
}

#[async_trait::async_trait]
impl TableEngine for SparkConnectEngine {
    type Frame = DataFrame;

    async fn read_csv(&self, source: &StoragePath, options: &CsvReadOptions) -> Result<DataFrame> {
        let uri = source.engine_uri();
        let reader_options = options.engine_options();
        debug!("CSV reader options: {reader_options:?}");

        let reader = reader_options.iter().fold(
            self.session.clone().read().format("csv"),
            |reader, (key, value)| reader.option(key, value.as_str()),
        );

        let frame = reader
            .load([uri.as_str()])
            .map_err(|e| anyhow::anyhow!("Failed to read CSV from {uri}: {e}"))?;

        Ok(frame)
    }

    async fn write_table(
        &self,
        frame: DataFrame,
        target: &TableIdent,
        options: &TableWriteOptions,
    ) -> Result<()> {
        let table_name = target.qualified_name();
        let writer_options = options.engine_options();
        debug!(
            "Table writer options for {table_name}: format={}, {writer_options:?}",
            options.format
        );

        let writer = writer_options.iter().fold(
            frame
                .write()
                .format(&options.format)
                .mode(SaveMode::Overwrite),
            |writer, (key, value)| writer.option(key, value.as_str()),
        );

        writer
            .save_as_table(&table_name)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to write table {table_name}: {e}"))?;

        Ok(())
    }
}

/// Strip connection parameters (tokens, user ids) before logging
fn redact_connection(connection: &str) -> &str {
    connection.split(';').next().unwrap_or(connection).trim_end_matches('/')
}
