//! Table engine abstraction.
//!
//! This crate defines the `TableEngine` trait that separates the export
//! orchestration from the engine that actually parses the CSV source and
//! commits the destination table. Two engines implement it:
//!
//! - [`SparkConnectEngine`] - a remote Spark Connect session writing Delta tables
//! - [`MemoryEngine`] - a local engine keeping tables in memory
//!
//! Destinations are addressed by a three-level [`TableIdent`]
//! (`catalog.schema.table`).

mod ident;
mod memory;
mod options;
mod spark;
mod traits;

pub use ident::{TableIdent, TableIdentError};
pub use memory::{MemoryEngine, MemoryEngineError, MemoryTable};
pub use options::{ColumnMapping, TableWriteOptions};
pub use spark::SparkConnectEngine;
pub use traits::TableEngine;
