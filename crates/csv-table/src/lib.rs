//! CSV reading for table exports.
//!
//! This crate owns the CSV read configuration used by `dbfs-export`. The same
//! [`CsvReadOptions`] value is rendered into engine reader options for a Spark
//! session and drives the local parser in [`read_csv_table`].
//!
//! # Modules
//!
//! - [`options`] - read options and their engine rendering
//! - [`reader`] - header-aware, quote-escaping, multi-line tolerant parsing
//! - [`table`] - the in-memory string table produced by the parser
//!
//! # Example
//!
//! ```ignore
//! use csv_table::{read_csv_table, CsvReadOptions};
//!
//! let data = "id,name\n1,\"a,b\"\n2,\"c\nd\"\n";
//! let table = read_csv_table(data.as_bytes(), &CsvReadOptions::default())?;
//! assert_eq!(table.columns, vec!["id", "name"]);
//! assert_eq!(table.num_rows(), 2);
//! ```

pub mod options;
pub mod reader;
pub mod table;

pub use options::{CsvReadOptions, ParseMode};
pub use reader::{read_csv_table, CsvTableError};
pub use table::CsvTable;
