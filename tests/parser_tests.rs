// tests/parser_tests.rs

use vantage::ast::{
    BinOp, DateValue, DurationUnit, Field, Header, Literal, Operation, SortDirection, Source,
    SourceOp,
};
use vantage::lexer::Lexer;
use vantage::parser::{parse, parse_field_text, parse_source_text, Parser};

fn parse_expr(input: &str) -> Field {
    let mut parser = Parser::new(Lexer::new(input)).expect("lexer failure");
    parser.parse().expect("parse failure")
}

// ============================================================================
// Expression grammar
// ============================================================================

#[test]
fn test_comparison() {
    let expr = parse_expr("price > 100");
    assert!(matches!(
        expr,
        Field::BinaryOp {
            op: BinOp::GreaterThan,
            ..
        }
    ));
}

#[test]
fn test_arithmetic_precedence() {
    let expr = parse_expr("1 + 2 * 3");

    // Should be: Add(1, Multiply(2, 3))
    match expr {
        Field::BinaryOp {
            op: BinOp::Add,
            left,
            right,
        } => {
            assert!(matches!(*left, Field::Literal(Literal::Integer(1))));
            match *right {
                Field::BinaryOp {
                    op: BinOp::Multiply,
                    left,
                    right,
                } => {
                    assert!(matches!(*left, Field::Literal(Literal::Integer(2))));
                    assert!(matches!(*right, Field::Literal(Literal::Integer(3))));
                }
                _ => panic!("Expected multiplication"),
            }
        }
        _ => panic!("Expected addition"),
    }
}

#[test]
fn test_parentheses() {
    let expr = parse_expr("(1 + 2) * 3");

    // Should be: Multiply(Add(1, 2), 3)
    match expr {
        Field::BinaryOp {
            op: BinOp::Multiply,
            left,
            right,
        } => {
            assert!(matches!(*left, Field::BinaryOp { op: BinOp::Add, .. }));
            assert!(matches!(*right, Field::Literal(Literal::Integer(3))));
        }
        _ => panic!("Expected multiplication"),
    }
}

#[test]
fn test_logical_precedence() {
    // or binds looser than and
    let expr = parse_expr("a = 1 and b = 2 or c = 3");
    match expr {
        Field::BinaryOp {
            op: BinOp::Or,
            left,
            ..
        } => {
            assert!(matches!(*left, Field::BinaryOp { op: BinOp::And, .. }));
        }
        _ => panic!("Expected or at the root"),
    }
}

#[test]
fn test_comparison_binds_tighter_than_and() {
    let expr = parse_expr("a = 1 & b = 2");
    match expr {
        Field::BinaryOp {
            op: BinOp::And,
            left,
            right,
        } => {
            assert!(matches!(*left, Field::BinaryOp { op: BinOp::Equal, .. }));
            assert!(matches!(*right, Field::BinaryOp { op: BinOp::Equal, .. }));
        }
        _ => panic!("Expected and at the root"),
    }
}

#[test]
fn test_dotted_access() {
    let expr = parse_expr("file.name");
    match expr {
        Field::Index { object, key } => {
            assert!(matches!(*object, Field::Variable(ref n) if n == "file"));
            assert!(matches!(*key, Field::Literal(Literal::String(ref k)) if k == "name"));
        }
        _ => panic!("Expected index access"),
    }
}

#[test]
fn test_bracket_access() {
    let expr = parse_expr("row[\"due date\"]");
    match expr {
        Field::Index { object, key } => {
            assert!(matches!(*object, Field::Variable(ref n) if n == "row"));
            assert!(matches!(*key, Field::Literal(Literal::String(ref k)) if k == "due date"));
        }
        _ => panic!("Expected index access"),
    }
}

#[test]
fn test_function_call() {
    let expr = parse_expr("contains(tags, \"project\")");
    match expr {
        Field::Function { name, args } => {
            assert_eq!(name, "contains");
            assert_eq!(args.len(), 2);
        }
        _ => panic!("Expected function call"),
    }
}

#[test]
fn test_list_literal() {
    let expr = parse_expr("[1, 2, 3]");
    match expr {
        Field::List(items) => assert_eq!(items.len(), 3),
        _ => panic!("Expected list literal"),
    }
}

#[test]
fn test_negation() {
    let expr = parse_expr("!done");
    assert!(matches!(expr, Field::Negated(_)));
}

#[test]
fn test_negative_number() {
    let expr = parse_expr("-5");
    assert!(matches!(expr, Field::Literal(Literal::Integer(-5))));
}

#[test]
fn test_commas_inside_strings_do_not_split_args() {
    let expr = parse_expr("contains(tags, \"a, b\")");
    match expr {
        Field::Function { args, .. } => assert_eq!(args.len(), 2),
        _ => panic!("Expected function call"),
    }
}

// ============================================================================
// Date and duration literals
// ============================================================================

#[test]
fn test_date_today() {
    let expr = parse_expr("date(today)");
    assert!(matches!(
        expr,
        Field::Literal(Literal::Date(DateValue::Today))
    ));
}

#[test]
fn test_date_ymd() {
    let expr = parse_expr("date(2024-1-31)");
    assert!(matches!(
        expr,
        Field::Literal(Literal::Date(DateValue::Ymd {
            year: 2024,
            month: 1,
            day: 31
        }))
    ));
}

#[test]
fn test_invalid_calendar_date() {
    assert!(parse_field_text("date(2024-13-01)").is_err());
}

#[test]
fn test_date_with_expression_body_degrades_to_call() {
    let expr = parse_expr("date(file.ctime)");
    assert!(matches!(expr, Field::Function { ref name, .. } if name == "date"));
}

#[test]
fn test_duration_literal() {
    let expr = parse_expr("dur(7 days)");
    match expr {
        Field::Literal(Literal::Duration(d)) => {
            assert_eq!(d.amount, 7);
            assert_eq!(d.unit, DurationUnit::Days);
        }
        _ => panic!("Expected duration literal"),
    }
}

#[test]
fn test_duration_abbreviated_unit() {
    let expr = parse_expr("dur(2 wks)");
    match expr {
        Field::Literal(Literal::Duration(d)) => {
            assert_eq!(d.amount, 2);
            assert_eq!(d.unit, DurationUnit::Weeks);
        }
        _ => panic!("Expected duration literal"),
    }
}

#[test]
fn test_unknown_duration_unit() {
    assert!(parse_field_text("dur(3 fortnights)").is_err());
}

#[test]
fn test_week_amount_too_large_for_day_conversion() {
    assert!(parse_field_text("dur(9223372036854775807 weeks)").is_err());
    assert!(parse("TABLE x WHERE due < date(today) + dur(9000000000000000000 weeks)").is_err());
}

#[test]
fn test_large_day_amount_still_accepted() {
    let expr = parse_expr("dur(9000000000000000000 days)");
    match expr {
        Field::Literal(Literal::Duration(d)) => {
            assert_eq!(d.amount, 9_000_000_000_000_000_000);
            assert_eq!(d.unit, DurationUnit::Days);
        }
        _ => panic!("Expected duration literal"),
    }
}

#[test]
fn test_date_arithmetic_shape() {
    let expr = parse_expr("date(today) - dur(7 days)");
    match expr {
        Field::BinaryOp {
            op: BinOp::Subtract,
            left,
            right,
        } => {
            assert!(matches!(*left, Field::Literal(Literal::Date(_))));
            assert!(matches!(*right, Field::Literal(Literal::Duration(_))));
        }
        _ => panic!("Expected subtraction"),
    }
}

// ============================================================================
// Source grammar
// ============================================================================

#[test]
fn test_source_folder() {
    assert_eq!(
        parse_source_text("\"projects/active\"").unwrap(),
        Source::Folder("projects/active".to_string())
    );
}

#[test]
fn test_source_empty_folder() {
    assert_eq!(parse_source_text("\"\"").unwrap(), Source::Empty);
}

#[test]
fn test_source_blank() {
    assert_eq!(parse_source_text("   ").unwrap(), Source::Empty);
}

#[test]
fn test_source_tag_stripped() {
    assert_eq!(
        parse_source_text("#task/urgent").unwrap(),
        Source::Tag("task/urgent".to_string())
    );
}

#[test]
fn test_source_link() {
    assert_eq!(
        parse_source_text("[[Inbox]]").unwrap(),
        Source::Link("Inbox".to_string())
    );
}

#[test]
fn test_source_link_alias_dropped() {
    assert_eq!(
        parse_source_text("[[Inbox|my inbox]]").unwrap(),
        Source::Link("Inbox".to_string())
    );
}

#[test]
fn test_source_combinators() {
    let source = parse_source_text("#task and !\"archive\"").unwrap();
    match source {
        Source::BinaryOp {
            op: SourceOp::And,
            left,
            right,
        } => {
            assert!(matches!(*left, Source::Tag(_)));
            assert!(matches!(*right, Source::Negated(_)));
        }
        _ => panic!("Expected and-combination"),
    }
}

#[test]
fn test_source_or_case_insensitive() {
    let source = parse_source_text("#a OR #b").unwrap();
    assert!(matches!(
        source,
        Source::BinaryOp {
            op: SourceOp::Or,
            ..
        }
    ));
}

#[test]
fn test_source_parenthesized() {
    let source = parse_source_text("(#a or #b) and \"notes\"").unwrap();
    match source {
        Source::BinaryOp {
            op: SourceOp::And,
            left,
            ..
        } => {
            assert!(matches!(
                *left,
                Source::BinaryOp {
                    op: SourceOp::Or,
                    ..
                }
            ));
        }
        _ => panic!("Expected and at the root"),
    }
}

#[test]
fn test_source_garbage() {
    assert!(parse_source_text("wat").is_err());
}

// ============================================================================
// Query grammar
// ============================================================================

#[test]
fn test_full_query() {
    let query = parse(
        r#"
        TABLE file.name, status
        FROM "tasks"
        WHERE status != "done"
        SORT file.name ASC
        LIMIT 5
        "#,
    )
    .unwrap();

    match &query.header {
        Header::Table { fields, show_id } => {
            assert_eq!(fields.len(), 2);
            assert!(*show_id);
            assert_eq!(fields[0].name, "file.name");
            assert_eq!(fields[1].name, "status");
        }
        _ => panic!("Expected table header"),
    }
    assert_eq!(query.source, Source::Folder("tasks".to_string()));
    assert_eq!(query.operations.len(), 3);
    assert!(matches!(query.operations[0], Operation::Where(_)));
    assert!(matches!(query.operations[1], Operation::SortBy(_)));
    assert!(matches!(query.operations[2], Operation::Limit(_)));
}

#[test]
fn test_without_id() {
    let query = parse("TABLE WITHOUT ID status").unwrap();
    match query.header {
        Header::Table { fields, show_id } => {
            assert!(!show_id);
            assert_eq!(fields.len(), 1);
        }
        _ => panic!("Expected table header"),
    }
}

#[test]
fn test_table_with_no_columns() {
    let query = parse("TABLE\nFROM #task").unwrap();
    match query.header {
        Header::Table { fields, show_id } => {
            assert!(fields.is_empty());
            assert!(show_id);
        }
        _ => panic!("Expected table header"),
    }
}

#[test]
fn test_column_alias() {
    let query = parse("TABLE due AS \"Due Date\"").unwrap();
    match query.header {
        Header::Table { fields, .. } => {
            assert_eq!(fields[0].name, "Due Date");
            assert!(matches!(fields[0].field, Field::Variable(ref n) if n == "due"));
        }
        _ => panic!("Expected table header"),
    }
}

#[test]
fn test_non_ascii_column_before_keyword() {
    let query = parse("TABLE prénom FROM \"gens\"").unwrap();
    match &query.header {
        Header::Table { fields, .. } => {
            assert_eq!(fields[0].name, "prénom");
            assert!(matches!(fields[0].field, Field::Variable(ref n) if n == "prénom"));
        }
        _ => panic!("Expected table header"),
    }
    assert_eq!(query.source, Source::Folder("gens".to_string()));
}

#[test]
fn test_non_ascii_alias() {
    let query = parse("TABLE due AS Année").unwrap();
    match &query.header {
        Header::Table { fields, .. } => assert_eq!(fields[0].name, "Année"),
        _ => panic!("Expected table header"),
    }
}

#[test]
fn test_non_ascii_only_table_body() {
    let query = parse("TABLE éééé").unwrap();
    match &query.header {
        Header::Table { fields, show_id } => {
            assert!(*show_id);
            assert_eq!(fields[0].name, "éééé");
        }
        _ => panic!("Expected table header"),
    }
}

#[test]
fn test_non_ascii_sort_and_where() {
    let query = parse("TABLE статус WHERE статус != \"готово\" SORT статус DESC").unwrap();
    assert_eq!(query.operations.len(), 2);
    match &query.operations[1] {
        Operation::SortBy(fields) => {
            assert_eq!(fields[0].direction, SortDirection::Descending);
        }
        _ => panic!("Expected sort operation"),
    }
}

#[test]
fn test_keywords_case_insensitive() {
    let query = parse("table status from #task where status = \"open\"").unwrap();
    assert!(matches!(query.header, Header::Table { .. }));
    assert_eq!(query.source, Source::Tag("task".to_string()));
    assert_eq!(query.operations.len(), 1);
}

#[test]
fn test_keyword_inside_string_does_not_split() {
    let query = parse("TABLE status WHERE note = \"from the top\"").unwrap();
    assert_eq!(query.source, Source::Empty);
    assert_eq!(query.operations.len(), 1);
}

#[test]
fn test_keyword_inside_call_does_not_split() {
    // `sort` appears inside parentheses; only the top-level SORT splits.
    let query = parse("TABLE length(sort) SORT status DESC").unwrap();
    match &query.operations[0] {
        Operation::SortBy(fields) => {
            assert_eq!(fields.len(), 1);
            assert_eq!(fields[0].direction, SortDirection::Descending);
        }
        _ => panic!("Expected sort operation"),
    }
}

#[test]
fn test_sort_default_direction() {
    let query = parse("TABLE status SORT due").unwrap();
    match &query.operations[0] {
        Operation::SortBy(fields) => {
            assert_eq!(fields[0].direction, SortDirection::Ascending);
        }
        _ => panic!("Expected sort operation"),
    }
}

#[test]
fn test_sort_multiple_keys() {
    let query = parse("TABLE status SORT priority DESC, due ASCENDING").unwrap();
    match &query.operations[0] {
        Operation::SortBy(fields) => {
            assert_eq!(fields.len(), 2);
            assert_eq!(fields[0].direction, SortDirection::Descending);
            assert_eq!(fields[1].direction, SortDirection::Ascending);
        }
        _ => panic!("Expected sort operation"),
    }
}

#[test]
fn test_group_by() {
    let query = parse("TABLE status GROUP BY project AS Project").unwrap();
    match &query.operations[0] {
        Operation::GroupBy(named) => {
            assert_eq!(named.name, "Project");
        }
        _ => panic!("Expected group by operation"),
    }
}

#[test]
fn test_group_without_by_is_not_a_clause() {
    // A bare `group` word is an ordinary identifier, not a clause opener.
    let query = parse("TABLE status WHERE group = 1").unwrap();
    assert_eq!(query.operations.len(), 1);
    assert!(matches!(query.operations[0], Operation::Where(_)));
}

#[test]
fn test_flatten_and_extract_parse() {
    let query = parse("TABLE status FLATTEN authors AS author EXTRACT a, b").unwrap();
    assert!(matches!(query.operations[0], Operation::Flatten(_)));
    match &query.operations[1] {
        Operation::Extract(fields) => assert_eq!(fields.len(), 2),
        _ => panic!("Expected extract operation"),
    }
}

#[test]
fn test_multiline_where_clause() {
    let query = parse(
        "TABLE status\nWHERE status = \"open\"\n  and priority > 2\nLIMIT 3",
    )
    .unwrap();
    assert_eq!(query.operations.len(), 2);
    match &query.operations[0] {
        Operation::Where(field) => {
            assert!(matches!(field, Field::BinaryOp { op: BinOp::And, .. }));
        }
        _ => panic!("Expected where operation"),
    }
}

#[test]
fn test_list_header_recognized() {
    let query = parse("LIST FROM #task").unwrap();
    assert!(matches!(query.header, Header::List));
    assert_eq!(query.source, Source::Tag("task".to_string()));
}

#[test]
fn test_repeated_clauses_all_parse() {
    let query = parse("TABLE status LIMIT 5 LIMIT 10").unwrap();
    assert_eq!(query.operations.len(), 2);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_missing_header() {
    let err = parse("SELECT * FROM x").unwrap_err();
    assert!(err.message.contains("must begin with"));
}

#[test]
fn test_empty_query() {
    assert!(parse("").is_err());
}

#[test]
fn test_unbalanced_parens() {
    assert!(parse("TABLE status WHERE (a = 1").is_err());
}

#[test]
fn test_unterminated_string_in_query() {
    assert!(parse("TABLE status WHERE a = \"oops").is_err());
}

#[test]
fn test_empty_where_clause() {
    assert!(parse("TABLE status WHERE").is_err());
}

#[test]
fn test_depth_bound_reported_not_crashed() {
    let deep = format!("{}1{}", "(".repeat(80), ")".repeat(80));
    let err = parse_field_text(&deep).unwrap_err();
    assert!(err.message.contains("nesting"));
}

#[test]
fn test_no_partial_ast_on_failure() {
    // The whole parse fails even though earlier clauses were fine.
    assert!(parse("TABLE status WHERE a = ]").is_err());
}
