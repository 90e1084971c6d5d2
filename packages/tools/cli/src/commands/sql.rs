//! SQL 출력 명령어

use rsv_core::permissions::CallerContext;
use rsv_core::workflow::RecordSchema;
use rsv_sql::{prepare_visible_query, SelectBuilder};

use super::QueryArgs;

pub fn run(
    caller: &CallerContext,
    alias: &str,
    table: &str,
    columns: &[String],
    query: &QueryArgs,
) -> anyhow::Result<()> {
    let schema = RecordSchema::from_columns(alias, columns.iter().map(String::as_str));
    let options = prepare_visible_query(&schema, query.to_options()?, caller);

    let sql = SelectBuilder::new(table)
        .with_alias(alias)
        .build(query.kind, &options);
    tracing::debug!(table, kind = query.kind.as_str(), "rendered select");
    println!("{};", sql);
    Ok(())
}
