//! 공개 범위 조회 명령어

use std::path::Path;

use serde_json::Value;

use rsv_core::permissions::CallerContext;
use rsv_core::workflow::{normalize_row, RecordSchema};
use rsv_sql::{filtered_query, MemorySource, QueryResult, ThreadNode};

use super::{read_document, QueryArgs};
use crate::OutputFormat;

pub fn run(
    caller: &CallerContext,
    alias: &str,
    rows_path: &Path,
    display_field: &str,
    query: &QueryArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let document = read_document(rows_path)?;
    let rows = match document {
        Value::Array(rows) => rows,
        _ => anyhow::bail!("{} must contain an array of rows", rows_path.display()),
    };

    let schema = detect_schema(alias, &rows);
    let has_language = schema.has_language;
    let source = MemorySource::from_json_rows(schema, &rows)?.with_display_field(display_field);
    if source.is_empty() {
        tracing::warn!(alias, path = %rows_path.display(), "no rows loaded");
    }
    tracing::info!(alias, rows = source.len(), has_language, "loaded rows");

    let result = filtered_query(&source, query.kind, query.to_options()?, caller)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => print_text(&result),
    }
    Ok(())
}

/// Row 컬럼에서 언어 관련 컬럼 유무 판단
fn detect_schema(alias: &str, rows: &[Value]) -> RecordSchema {
    let mut names: Vec<&str> = Vec::new();
    for row in rows {
        if let Some(fields) = normalize_row(alias, row) {
            for key in fields.keys() {
                if !names.contains(&key.as_str()) {
                    names.push(key.as_str());
                }
            }
        }
    }
    RecordSchema::from_columns(alias, names)
}

fn print_text(result: &QueryResult) {
    match result {
        QueryResult::Rows(rows) => {
            for row in rows {
                println!("{}", Value::Object(row.clone()));
            }
            println!("({} rows)", rows.len());
        }
        QueryResult::Row(Some(row)) => println!("{}", Value::Object(row.clone())),
        QueryResult::Row(None) => println!("(no row)"),
        QueryResult::Count(count) => println!("{}", count),
        QueryResult::List(pairs) => {
            for (key, value) in pairs {
                println!("{}\t{}", key, value);
            }
        }
        QueryResult::Threaded(nodes) => print_tree(nodes, 0),
    }
}

fn print_tree(nodes: &[ThreadNode], depth: usize) {
    for node in nodes {
        println!("{}{}", "  ".repeat(depth), Value::Object(node.row.clone()));
        print_tree(&node.children, depth + 1);
    }
}
