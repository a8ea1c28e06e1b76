//! Three-level table identifiers.

/// Error returned for an unusable catalog, schema, or table name
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TableIdentError {
    #[error("{part} name must not be empty")]
    Empty { part: &'static str },
}

/// A managed table addressed as `catalog.schema.table`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableIdent {
    catalog: String,
    schema: String,
    table: String,
}

impl TableIdent {
    /// Build an identifier from its three parts
    ///
    /// Parts only need to be non-blank. Whether a name is usable is up to the
    /// engine, which rejects it when the table is written.
    pub fn new(catalog: &str, schema: &str, table: &str) -> Result<Self, TableIdentError> {
        Ok(Self {
            catalog: validate("catalog", catalog)?,
            schema: validate("schema", schema)?,
            table: validate("table", table)?,
        })
    }

    pub fn catalog(&self) -> &str {
        &self.catalog
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// The fully qualified reference handed to the engine
    pub fn qualified_name(&self) -> String {
        format!("{}.{}.{}", self.catalog, self.schema, self.table)
    }
}

impl std::fmt::Display for TableIdent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.catalog, self.schema, self.table)
    }
}

fn validate(part: &'static str, name: &str) -> Result<String, TableIdentError> {
    if name.trim().is_empty() {
        return Err(TableIdentError::Empty { part });
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name() {
        let ident = TableIdent::new("main", "sales", "orders").unwrap();
        assert_eq!(ident.qualified_name(), "main.sales.orders");
        assert_eq!(ident.to_string(), "main.sales.orders");
        assert_eq!(ident.catalog(), "main");
        assert_eq!(ident.schema(), "sales");
        assert_eq!(ident.table(), "orders");
    }

    #[test]
    fn test_empty_parts_rejected() {
        assert_eq!(
            TableIdent::new("", "sales", "orders"),
            Err(TableIdentError::Empty { part: "catalog" })
        );
        assert_eq!(
            TableIdent::new("main", "  ", "orders"),
            Err(TableIdentError::Empty { part: "schema" })
        );
        assert_eq!(
            TableIdent::new("main", "sales", ""),
            Err(TableIdentError::Empty { part: "table" })
        );
    }

    #[test]
    fn test_dotted_part_kept_verbatim() {
        let ident = TableIdent::new("main", "sales", "orders.v2").unwrap();
        assert_eq!(ident.table(), "orders.v2");
        assert_eq!(ident.qualified_name(), "main.sales.orders.v2");
    }
}
