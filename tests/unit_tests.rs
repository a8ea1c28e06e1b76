use clap::Parser;
use dbfs_export::{DbfsOpts, ExportArgs, StoragePath, TableIdent};

fn args(dbfs_path: &str, catalog: &str, schema: &str, table: &str) -> Vec<String> {
    [
        "dbfs-export",
        "--dbfs-path",
        dbfs_path,
        "--catalog",
        catalog,
        "--schema",
        schema,
        "--table",
        table,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[test]
fn test_export_args_to_config() {
    let parsed =
        ExportArgs::try_parse_from(args("dbfs:/tmp/orders.csv", "main", "sales", "orders"))
            .unwrap();
    let config = parsed.to_config().unwrap();

    assert_eq!(
        config.source,
        StoragePath::Dbfs("/tmp/orders.csv".to_string())
    );
    assert_eq!(
        config.target,
        TableIdent::new("main", "sales", "orders").unwrap()
    );
    assert!(config.read_options.header);
    assert!(config.read_options.multi_line);
    assert_eq!(config.read_options.escape, b'"');
    assert_eq!(config.write_options.format, "delta");
    assert!(config.write_options.overwrite_schema);
}

#[test]
fn test_export_args_all_required() {
    let result = ExportArgs::try_parse_from([
        "dbfs-export",
        "--dbfs-path",
        "dbfs:/tmp/orders.csv",
        "--catalog",
        "main",
        "--schema",
        "sales",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_export_args_reject_empty_values() {
    let result = ExportArgs::try_parse_from(args("dbfs:/tmp/orders.csv", "", "sales", "orders"));
    assert!(result.is_err());
}

#[test]
fn test_export_args_defer_table_name_checks_to_engine() {
    let parsed =
        ExportArgs::try_parse_from(args("dbfs:/tmp/orders.csv", "main", "sales", "orders.v2"))
            .unwrap();
    let config = parsed.to_config().unwrap();
    assert_eq!(config.target.qualified_name(), "main.sales.orders.v2");
}

#[test]
fn test_export_args_reject_blank_table() {
    let parsed =
        ExportArgs::try_parse_from(args("dbfs:/tmp/orders.csv", "main", "sales", "  ")).unwrap();
    let err = parsed.to_config().unwrap_err();
    assert!(err.to_string().contains("Invalid destination table"));
}

#[test]
fn test_export_args_reject_relative_path() {
    let parsed =
        ExportArgs::try_parse_from(args("tmp/orders.csv", "main", "sales", "orders")).unwrap();
    let err = parsed.to_config().unwrap_err();
    assert!(err.to_string().contains("Invalid source path"));
}

#[test]
fn test_dbfs_opts_storage() {
    let opts = DbfsOpts {
        databricks_host: Some("https://adb-123.azuredatabricks.net".to_string()),
        databricks_token: Some("dapi-token".to_string()),
    };
    assert!(opts.storage().is_ok());

    let opts = DbfsOpts {
        databricks_host: None,
        databricks_token: None,
    };
    assert!(opts.storage().is_ok());
}

#[test]
fn test_dbfs_opts_require_both_settings() {
    let opts = DbfsOpts {
        databricks_host: Some("https://adb-123.azuredatabricks.net".to_string()),
        databricks_token: None,
    };
    let err = opts.storage().unwrap_err();
    assert!(err.to_string().contains("DATABRICKS_TOKEN"));
}
