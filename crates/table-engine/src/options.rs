//! Table write options.

/// How the table format tracks column identity across schema changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnMapping {
    /// Columns are tracked by position
    None,
    /// Columns are tracked by name, allowing reorder, add, and drop
    #[default]
    Name,
}

impl ColumnMapping {
    /// Value of the `delta.columnMapping.mode` table property
    pub fn as_property_value(&self) -> &'static str {
        match self {
            ColumnMapping::None => "none",
            ColumnMapping::Name => "name",
        }
    }
}

/// Options for writing a frame to a managed table in overwrite mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableWriteOptions {
    /// Table format (default: "delta")
    pub format: String,

    /// Replace the table schema along with its data (default: true)
    pub overwrite_schema: bool,

    /// Column mapping mode (default: name)
    pub column_mapping: ColumnMapping,
}

impl Default for TableWriteOptions {
    fn default() -> Self {
        Self {
            format: "delta".to_string(),
            overwrite_schema: true,
            column_mapping: ColumnMapping::Name,
        }
    }
}

impl TableWriteOptions {
    /// Render as Spark writer options
    pub fn engine_options(&self) -> Vec<(&'static str, String)> {
        vec![
            (
                "delta.columnMapping.mode",
                self.column_mapping.as_property_value().to_string(),
            ),
            ("overwriteSchema", self.overwrite_schema.to_string()),
        ]
    }
}
