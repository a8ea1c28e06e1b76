//! Command-line interface for dbfs-export
//!
//! # Usage Examples
//!
//! ```bash
//! # Save a DBFS upload as main.sales.orders through a Databricks cluster
//! export SPARK_REMOTE="sc://adb-123.azuredatabricks.net:443/;token=$TOKEN;x-databricks-cluster-id=0101-abc"
//! export DATABRICKS_HOST=https://adb-123.azuredatabricks.net
//! export DATABRICKS_TOKEN=$TOKEN
//!
//! dbfs-export \
//!   --dbfs-path dbfs:/FileStore/uploads/orders.csv \
//!   --catalog main \
//!   --schema sales \
//!   --table orders
//! ```
//!
//! The source file is deleted after the export, whether it succeeded or not.
//! Set `RUST_LOG=info` to follow progress.

use clap::Parser;
use dbfs_export::{export, DbfsOpts, ExportArgs, SparkConnectEngine, SparkOpts};

#[derive(Parser)]
#[command(name = "dbfs-export")]
#[command(about = "Save a CSV file from DBFS as a managed Delta table, then delete the file")]
#[command(long_about = None)]
struct Cli {
    #[command(flatten)]
    export: ExportArgs,

    /// Spark Connect options
    #[command(flatten)]
    spark: SparkOpts,

    /// DBFS access options
    #[command(flatten)]
    dbfs: DbfsOpts,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = cli.export.to_config()?;
    let storage = cli.dbfs.storage()?;
    let engine = SparkConnectEngine::connect(&cli.spark.spark_remote).await?;

    export(&engine, &storage, &config).await
}
