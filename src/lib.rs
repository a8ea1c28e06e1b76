//! dbfs-export library
//!
//! Saves a CSV file from DBFS (or local/S3 storage) as a managed table in a
//! catalog-backed Delta store, then deletes the source file.
//!
//! # Crates
//!
//! - `dbfs_export_file` - storage paths and source removal
//! - `csv_table` - CSV read options and local parsing
//! - `table_engine` - table identifiers, write options, Spark and in-memory engines
//!
//! # CLI Usage
//!
//! ```bash
//! dbfs-export \
//!   --dbfs-path dbfs:/FileStore/uploads/orders.csv \
//!   --catalog main --schema sales --table orders
//! ```

use anyhow::Context;
use clap::builder::NonEmptyStringValueParser;
use clap::Parser;

pub mod cleanup;
pub mod export;

pub use csv_table::CsvReadOptions;
pub use dbfs_export_file::{DbfsClient, Removal, SourceStorage, Storage, StoragePath};
pub use export::{export, Config};
pub use table_engine::{
    MemoryEngine, SparkConnectEngine, TableEngine, TableIdent, TableWriteOptions,
};

/// The export operation's inputs
#[derive(Parser, Clone, Debug)]
pub struct ExportArgs {
    /// Path of the CSV file in DBFS (dbfs:/..., file:/..., or s3://...)
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    pub dbfs_path: String,

    /// Catalog where the Delta table will be created
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    pub catalog: String,

    /// Schema where the Delta table will be created
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    pub schema: String,

    /// Name of the Delta table
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    pub table: String,
}

impl ExportArgs {
    /// Validate the inputs and build an export config with default read/write options
    pub fn to_config(&self) -> anyhow::Result<Config> {
        let source = StoragePath::parse(&self.dbfs_path)
            .with_context(|| format!("Invalid source path: {}", self.dbfs_path))?;
        let target = TableIdent::new(&self.catalog, &self.schema, &self.table)
            .context("Invalid destination table")?;
        Ok(Config::new(source, target))
    }
}

/// Spark Connect options
#[derive(Parser, Clone)]
pub struct SparkOpts {
    /// Spark Connect URL
    #[arg(
        long,
        default_value = "sc://localhost:15002",
        env = "SPARK_REMOTE",
        hide_env_values = true
    )]
    pub spark_remote: String,
}

/// Databricks workspace options used for DBFS access
#[derive(Parser, Clone)]
pub struct DbfsOpts {
    /// Databricks workspace URL
    #[arg(long, env = "DATABRICKS_HOST")]
    pub databricks_host: Option<String>,

    /// Databricks personal access token
    #[arg(long, env = "DATABRICKS_TOKEN", hide_env_values = true)]
    pub databricks_token: Option<String>,
}

impl DbfsOpts {
    /// Build the source storage, attaching a DBFS client when credentials are set
    pub fn storage(&self) -> anyhow::Result<Storage> {
        match (&self.databricks_host, &self.databricks_token) {
            (Some(host), Some(token)) => {
                Ok(Storage::new().with_dbfs(DbfsClient::new(host, token)?))
            }
            (None, None) => Ok(Storage::new()),
            (Some(_), None) => {
                anyhow::bail!("DATABRICKS_TOKEN is required when DATABRICKS_HOST is set")
            }
            (None, Some(_)) => {
                anyhow::bail!("DATABRICKS_HOST is required when DATABRICKS_TOKEN is set")
            }
        }
    }
}
