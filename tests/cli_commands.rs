//! CLI Command Tests
//!
//! Runs the command functions against shape, record and config files on disk.

use std::path::{Path, PathBuf};

use apifilter::cli::{self, CliError, RequestArgs};
use apifilter::RequestValidationStatus;
use serde_json::{json, Value};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

const SHAPES: &str = r#"[
    {
        "name": "accounts",
        "description": "Accounts as returned by the API",
        "fields": [
            {"name": "Id", "type": "int"},
            {"name": "DisplayName", "type": "text", "map": {"field": "display_name"}},
            {"name": "Status", "type": "enum", "variants": ["Active", "Pending", "Closed"]},
            {"name": "Joined", "type": "date", "map": {"field": "joined_on"}},
            {"name": "Rank", "type": "int", "map": {"computed_only": true}}
        ]
    },
    {
        "name": "account_rows",
        "fields": [
            {"name": "id", "type": "int"},
            {"name": "display_name", "type": "text"},
            {"name": "status", "type": "text"},
            {"name": "joined_on", "type": "date"}
        ]
    }
]"#;

fn setup() -> (TempDir, PathBuf, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let shapes = tmp.path().join("shapes.json");
    std::fs::write(&shapes, SHAPES).unwrap();

    let records = tmp.path().join("records.json");
    let rows = json!([
        {"id": 1, "display_name": "Acme", "status": "Active", "joined_on": "2023-06-01", "Rank": 3},
        {"id": 2, "display_name": "Beta", "status": "Pending", "joined_on": "2024-01-15", "Rank": 1},
        {"id": 3, "display_name": "Cobalt", "status": "Active", "joined_on": "2024-02-20", "Rank": 2},
        {"id": 4, "display_name": "Delta", "status": "Closed", "joined_on": "2022-11-30", "Rank": 4}
    ]);
    std::fs::write(&records, rows.to_string()).unwrap();

    (tmp, shapes, records)
}

fn args(shapes: &Path, query: &str) -> RequestArgs {
    RequestArgs {
        shape: shapes.to_path_buf(),
        model: Some("accounts".to_string()),
        entity: Some("account_rows".to_string()),
        query: query.to_string(),
        config: None,
        max_take: None,
        date_format: None,
    }
}

fn ids(data: &Value) -> Vec<i64> {
    data["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["Id"].as_i64().unwrap())
        .collect()
}

// =============================================================================
// validate
// =============================================================================

#[test]
fn test_validate_accepts_good_query() {
    let (_tmp, shapes, _) = setup();
    let data = cli::validate(&args(&shapes, "status=Active&sort=-rank&take=2")).unwrap();
    assert_eq!(data["validation"], "valid");
    assert_eq!(data["http_status"], 200);
    assert_eq!(data["memory_stage"], true);
}

#[test]
fn test_validate_reports_rejection_status() {
    let (_tmp, shapes, _) = setup();
    let data = cli::validate(&args(&shapes, "take=abc")).unwrap();
    assert_eq!(data["validation"], "invalid_take");
    assert_eq!(data["http_status"], 400);
    assert!(data["reason"].as_str().unwrap().contains("abc"));

    let data = cli::validate(&args(&shapes, "status=>Active")).unwrap();
    assert_eq!(data["validation"], "invalid_filter");
    assert_eq!(data["filters"], 1);
}

#[test]
fn test_query_rejects_bad_take() {
    let (_tmp, shapes, records) = setup();
    let err = cli::query(&args(&shapes, "take=abc"), &records).unwrap_err();
    match &err {
        CliError::Rejected(e) => assert_eq!(e.status(), RequestValidationStatus::InvalidTake),
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(err.code(), "APIFILTER_REQUEST_REJECTED");
}

#[test]
fn test_unknown_model() {
    let (_tmp, shapes, _) = setup();
    let mut a = args(&shapes, "");
    a.model = Some("ghost".to_string());
    assert!(matches!(cli::validate(&a), Err(CliError::Shape(_))));
}

#[test]
fn test_model_required_with_many_shapes() {
    let (_tmp, shapes, _) = setup();
    let mut a = args(&shapes, "");
    a.model = None;
    assert!(matches!(cli::validate(&a), Err(CliError::Usage(_))));
}

// =============================================================================
// query
// =============================================================================

#[test]
fn test_query_remote_filters_and_projection() {
    let (_tmp, shapes, records) = setup();
    let data = cli::query(
        &args(&shapes, "status=Active&status=Closed&sort=-joined&fields=id,displayName"),
        &records,
    )
    .unwrap();

    assert_eq!(data["count"], 3);
    assert_eq!(ids(&data), vec![3, 1, 4]);
    assert_eq!(
        data["records"][0],
        json!({"Id": 3, "DisplayName": "Cobalt"})
    );
}

#[test]
fn test_query_computed_sort_pages_in_memory() {
    let (_tmp, shapes, records) = setup();
    let data = cli::query(&args(&shapes, "sort=rank&skip=1&take=2"), &records).unwrap();
    assert_eq!(ids(&data), vec![3, 1]);
}

#[test]
fn test_query_date_format_override() {
    let (_tmp, shapes, records) = setup();
    let mut a = args(&shapes, "joined=>31/12/2023");
    a.date_format = Some("%d/%m/%Y".to_string());
    let data = cli::query(&a, &records).unwrap();
    assert_eq!(ids(&data), vec![2, 3]);
}

#[test]
fn test_query_config_file_and_flag() {
    let (tmp, shapes, records) = setup();
    let config = tmp.path().join("apifilter.json");
    std::fs::write(&config, r#"{"max_take": 3}"#).unwrap();

    let mut a = args(&shapes, "sort=id&take=10");
    a.config = Some(config);
    assert_eq!(ids(&cli::query(&a, &records).unwrap()), vec![1, 2, 3]);

    a.max_take = Some(1);
    assert_eq!(ids(&cli::query(&a, &records).unwrap()), vec![1]);
}

#[test]
fn test_query_records_must_be_array() {
    let (tmp, shapes, _) = setup();
    let records = tmp.path().join("object.json");
    std::fs::write(&records, r#"{"id": 1}"#).unwrap();
    assert!(matches!(
        cli::query(&args(&shapes, ""), &records),
        Err(CliError::Usage(_))
    ));
}

// =============================================================================
// sql
// =============================================================================

#[test]
fn test_sql_output() {
    let (_tmp, shapes, _) = setup();
    let data = cli::sql(&args(&shapes, "displayName=Acme&sort=joined&take=5"), None).unwrap();

    assert_eq!(
        data["sql"],
        r#"SELECT "id", "display_name", "status", "joined_on" FROM "account_rows" WHERE "display_name" = $1 ORDER BY "joined_on" ASC NULLS FIRST LIMIT $2"#
    );
    assert_eq!(
        data["params"],
        json!([{"type": "text", "value": "Acme"}, {"type": "int", "value": 5}])
    );
    assert_eq!(data["memory_stage"], false);
}

#[test]
fn test_sql_table_override_and_deferred_paging() {
    let (_tmp, shapes, _) = setup();
    let data = cli::sql(&args(&shapes, "rank=>1&take=5"), Some("accounts_v2")).unwrap();

    assert_eq!(
        data["sql"],
        r#"SELECT "id", "display_name", "status", "joined_on" FROM "accounts_v2""#
    );
    assert_eq!(data["memory_stage"], true);
}
