//! CLI 명령어 구현

pub mod can_edit;
pub mod permissions;
pub mod sql;
pub mod visible;

use std::path::Path;

use anyhow::Context as _;
use clap::Args;
use serde_json::Value;

use rsv_core::visibility::Condition;
use rsv_sql::{QueryKind, QueryOptions, SortOrder};

/// 조회 옵션
#[derive(Debug, Clone, Default, Args)]
pub struct QueryArgs {
    /// Query kind (all, first, count, list, threaded)
    #[arg(long, default_value = "all")]
    pub kind: QueryKind,

    /// Caller conditions as a JSON where object
    #[arg(long = "where")]
    pub where_json: Option<String>,

    /// Selected fields (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Order (repeatable, `column` or `column:desc`)
    #[arg(long)]
    pub order: Vec<String>,

    /// Group by columns (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub group: Vec<String>,

    #[arg(long)]
    pub limit: Option<u64>,

    #[arg(long)]
    pub offset: Option<u64>,

    /// Page number (1-based, requires --limit)
    #[arg(long)]
    pub page: Option<u64>,

    /// Relation loading depth (defaults to -1)
    #[arg(long, allow_hyphen_values = true)]
    pub recursive: Option<i32>,
}

impl QueryArgs {
    /// 조회 옵션으로 변환
    pub fn to_options(&self) -> anyhow::Result<QueryOptions> {
        let conditions = match &self.where_json {
            Some(json) => {
                let value: Value =
                    serde_json::from_str(json).context("--where must be a JSON object")?;
                Condition::from_where(&value)?
            }
            None => Condition::always(),
        };

        let mut options = QueryOptions::new().with_conditions(conditions);
        if !self.fields.is_empty() {
            options = options.with_fields(self.fields.iter().cloned());
        }
        for item in &self.order {
            let (column, order) = parse_order(item)?;
            options = options.order_by(column, order);
        }
        options.group = self.group.clone();
        options.limit = self.limit;
        options.offset = self.offset;
        options.page = self.page;
        options.recursive = self.recursive;
        Ok(options)
    }
}

fn parse_order(item: &str) -> anyhow::Result<(&str, SortOrder)> {
    match item.split_once(':') {
        None => Ok((item, SortOrder::Asc)),
        Some((column, dir)) => match dir.to_ascii_lowercase().as_str() {
            "asc" => Ok((column, SortOrder::Asc)),
            "desc" => Ok((column, SortOrder::Desc)),
            other => anyhow::bail!("Unknown sort direction '{}' in --order {}", other, item),
        },
    }
}

/// JSON/YAML 문서 읽기 (확장자가 `.yaml`/`.yml`이면 YAML)
pub fn read_document(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let is_yaml = path
        .extension()
        .is_some_and(|ext| ext == "yaml" || ext == "yml");
    let value = if is_yaml {
        serde_yaml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order() {
        assert_eq!(parse_order("start_datetime").unwrap(), ("start_datetime", SortOrder::Asc));
        assert_eq!(parse_order("id:DESC").unwrap(), ("id", SortOrder::Desc));
        assert!(parse_order("id:sideways").is_err());
    }

    #[test]
    fn test_query_args_to_options() {
        let args = QueryArgs {
            where_json: Some(r#"{ "location_key": "room_a" }"#.to_string()),
            fields: vec!["id".to_string(), "title".to_string()],
            order: vec!["id:desc".to_string()],
            limit: Some(10),
            page: Some(2),
            ..Default::default()
        };

        let options = args.to_options().unwrap();
        assert_eq!(options.conditions, Condition::all([Condition::eq("location_key", "room_a")]));
        assert_eq!(options.fields.as_ref().map(Vec::len), Some(2));
        assert_eq!(options.order[0].order, SortOrder::Desc);
        assert_eq!(options.effective_offset(), Some(10));
        assert_eq!(options.recursive, None);
    }

    #[test]
    fn test_invalid_where() {
        let args = QueryArgs {
            where_json: Some("not json".to_string()),
            ..Default::default()
        };
        assert!(args.to_options().is_err());
    }
}
