// tests/integration_tests.rs
//
// End-to-end conversions: query text in, logical JSON shape out.

use serde_json::{json, Value};
use vantage::cli::{
    execute_check, execute_convert, CheckOptions, CheckResult, CliError, ConvertOptions,
};
use vantage::{output, parser, transform};

fn convert_value(query: &str) -> Value {
    let query = parser::parse(query).expect("parse failure");
    let config = transform::transform(&query).expect("transform failure");
    config.to_value()
}

#[test]
fn test_minimal_table() {
    assert_eq!(
        convert_value("TABLE WITHOUT ID"),
        json!({ "views": [{ "type": "table", "name": "Table" }] })
    );
}

#[test]
fn test_full_query() {
    let value = convert_value(
        r#"
        TABLE file.name, status
        FROM "tasks"
        WHERE status != "done"
        SORT file.name ASC
        LIMIT 5
        "#,
    );

    assert_eq!(
        value,
        json!({
            "display": {
                "file.name": "file.name",
                "status": "status"
            },
            "views": [{
                "type": "table",
                "name": "Table",
                "limit": 5,
                "filters": {
                    "and": [
                        "file.inFolder(\"tasks\")",
                        "status != \"done\""
                    ]
                },
                "order": ["file.name", "status"],
                "sort": [{ "column": "file.name", "direction": "asc" }]
            }]
        })
    );
}

#[test]
fn test_computed_columns_and_grouping() {
    let value = convert_value(
        "TABLE WITHOUT ID price * quantity AS \"Total Price\", status \
         GROUP BY status \
         SORT price * quantity DESC",
    );

    assert_eq!(
        value,
        json!({
            "formulas": {
                "total_price": "price * quantity"
            },
            "display": {
                "formula.total_price": "Total Price",
                "status": "status"
            },
            "views": [{
                "type": "table",
                "name": "Table",
                "order": ["formula.total_price", "status"],
                "group_by": "status",
                "sort": [{ "column": "formula.total_price", "direction": "desc" }]
            }]
        })
    );
}

#[test]
fn test_date_arithmetic_in_where() {
    let value = convert_value(
        "TABLE status WHERE file.cday >= date(today) - dur(1 week) AND !archived",
    );

    assert_eq!(
        value,
        json!({
            "display": { "file.name": "File", "status": "status" },
            "views": [{
                "type": "table",
                "name": "Table",
                "filters": {
                    "and": [
                        "file.ctime >= now() + \"-7 days\"",
                        { "not": ["archived"] }
                    ]
                },
                "order": ["file.name", "status"],
            }]
        })
    );
}

#[test]
fn test_tag_source_with_nested_where() {
    let value = convert_value(
        "TABLE WITHOUT ID status \
         FROM #task and !\"archive\" \
         WHERE contains(tags, \"urgent\") or notempty(due)",
    );

    assert_eq!(
        value,
        json!({
            "display": { "status": "status" },
            "views": [{
                "type": "table",
                "name": "Table",
                "filters": {
                    "and": [
                        "file.hasTag(\"task\")",
                        { "not": ["file.inFolder(\"archive\")"] },
                        "file.hasTag(\"urgent\") || !isEmpty(due)"
                    ]
                },
                "order": ["status"],
            }]
        })
    );
}

#[test]
fn test_json_output_round_trips_through_serde() {
    let query = parser::parse("TABLE status LIMIT 3").unwrap();
    let config = transform::transform(&query).unwrap();

    let compact: Value = serde_json::from_str(&output::to_json(&config)).unwrap();
    let pretty: Value = serde_json::from_str(&output::to_json_pretty(&config)).unwrap();
    assert_eq!(compact, config.to_value());
    assert_eq!(compact, pretty);
}

// ============================================================================
// CLI commands
// ============================================================================

#[test]
fn test_convert_command() {
    let options = ConvertOptions {
        query: "TABLE WITHOUT ID status".to_string(),
        pretty: false,
    };
    let json: Value = serde_json::from_str(&execute_convert(&options).unwrap()).unwrap();
    assert_eq!(json["views"][0]["type"], "table");
    assert_eq!(json["views"][0]["order"], json!(["status"]));
}

#[test]
fn test_convert_command_reports_parse_errors() {
    let options = ConvertOptions {
        query: "SELECT nope".to_string(),
        pretty: false,
    };
    assert!(matches!(
        execute_convert(&options),
        Err(CliError::Parse(_))
    ));
}

#[test]
fn test_check_command() {
    let options = CheckOptions {
        query: "TABLE status WHERE done = false".to_string(),
        syntax_only: false,
    };
    assert!(matches!(
        execute_check(&options),
        Ok(CheckResult::Convertible)
    ));
}

#[test]
fn test_check_syntax_only_accepts_list_queries() {
    // LIST parses but does not convert; syntax-only checking stops short
    // of the transform.
    let options = CheckOptions {
        query: "LIST FROM #task".to_string(),
        syntax_only: true,
    };
    assert!(matches!(
        execute_check(&options),
        Ok(CheckResult::SyntaxValid)
    ));

    let options = CheckOptions {
        query: "LIST FROM #task".to_string(),
        syntax_only: false,
    };
    assert!(matches!(
        execute_check(&options),
        Err(CliError::Transform(_))
    ));
}
