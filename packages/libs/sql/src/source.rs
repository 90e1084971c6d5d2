//! 레코드 소스
//!
//! 조회를 실제로 실행하는 협력자 계약과, JSON Row를 메모리에 들고 있는 기본 구현입니다.

use std::cmp::Ordering;

use serde::Serialize;
use serde_json::{Map, Value};

use rsv_core::visibility::loose_eq;
use rsv_core::workflow::{coerce_id, columns, normalize_row, RecordSchema};

use crate::params::{QueryKind, QueryOptions, SortOrder};

/// 평평한 Row
pub type Row = Map<String, Value>;

/// 트리 노드 (`threaded` 조회 결과)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadNode {
    #[serde(flatten)]
    pub row: Row,
    pub children: Vec<ThreadNode>,
}

/// 조회 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryResult {
    /// `all`
    Rows(Vec<Row>),
    /// `first`
    Row(Option<Row>),
    /// `count`
    Count(u64),
    /// `list`: (키, 표시값)
    List(Vec<(Value, Value)>),
    /// `threaded`
    Threaded(Vec<ThreadNode>),
}

impl QueryResult {
    /// Row 목록 (`all`)
    pub fn into_rows(self) -> Option<Vec<Row>> {
        match self {
            QueryResult::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    /// 개수 (`count`)
    pub fn count(&self) -> Option<u64> {
        match self {
            QueryResult::Count(n) => Some(*n),
            _ => None,
        }
    }
}

/// 레코드 소스 (읽기 전용 조회 실행)
pub trait RecordSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// 모델 스키마
    fn schema(&self) -> &RecordSchema;

    /// 조회 실행
    fn query(&self, kind: QueryKind, options: &QueryOptions) -> Result<QueryResult, Self::Error>;
}

/// 메모리 소스 에러
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    #[error("unsupported query option: {option}")]
    UnsupportedOption { option: String },

    #[error("invalid row at index {index}: {message}")]
    InvalidRow { index: usize, message: String },
}

/// 메모리 레코드 소스
///
/// 조건, group, 정렬, 페이지, 컬럼 선택을 메모리에서 처리합니다. 조인은 지원하지 않습니다.
#[derive(Debug, Clone)]
pub struct MemorySource {
    schema: RecordSchema,
    rows: Vec<Row>,
    display_field: String,
}

impl MemorySource {
    /// 새 소스 생성
    pub fn new(schema: RecordSchema, rows: Vec<Row>) -> Self {
        Self {
            schema,
            rows,
            display_field: "title".to_string(),
        }
    }

    /// JSON Row 목록에서 생성
    ///
    /// alias 그룹으로 감싼 Row도 평평하게 풀어 저장합니다.
    pub fn from_json_rows(schema: RecordSchema, rows: &[Value]) -> Result<Self, SourceError> {
        let rows = rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                normalize_row(&schema.alias, row)
                    .cloned()
                    .ok_or_else(|| SourceError::InvalidRow {
                        index,
                        message: "expected a JSON object".to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(schema, rows))
    }

    /// `list` 조회의 표시 컬럼 설정
    pub fn with_display_field(mut self, field: impl Into<String>) -> Self {
        self.display_field = field.into();
        self
    }

    /// 전체 Row 수
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn select(&self, options: &QueryOptions) -> Vec<Row> {
        let mut rows: Vec<Row> = self
            .rows
            .iter()
            .filter(|row| options.conditions.matches(row))
            .cloned()
            .collect();

        if !options.order.is_empty() {
            rows.sort_by(|a, b| {
                for item in &options.order {
                    let column = unqualified(&item.column);
                    let ord = compare_values(a.get(column), b.get(column));
                    let ord = match item.order {
                        SortOrder::Asc => ord,
                        SortOrder::Desc => ord.reverse(),
                    };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            });
        }

        if !options.group.is_empty() {
            let mut seen: Vec<Vec<Value>> = Vec::new();
            rows.retain(|row| {
                let key: Vec<Value> = options
                    .group
                    .iter()
                    .map(|c| row.get(unqualified(c)).cloned().unwrap_or(Value::Null))
                    .collect();
                if seen.contains(&key) {
                    false
                } else {
                    seen.push(key);
                    true
                }
            });
        }

        rows
    }
}

impl RecordSource for MemorySource {
    type Error = SourceError;

    fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    fn query(&self, kind: QueryKind, options: &QueryOptions) -> Result<QueryResult, SourceError> {
        if !options.joins.is_empty() {
            return Err(SourceError::UnsupportedOption {
                option: "joins".to_string(),
            });
        }

        let rows = self.select(options);
        let total = rows.len() as u64;

        let offset = options
            .effective_offset()
            .map_or(0, |o| usize::try_from(o).unwrap_or(usize::MAX));
        let limit = match kind {
            QueryKind::First => Some(1),
            _ => options.limit.map(|l| usize::try_from(l).unwrap_or(usize::MAX)),
        };
        let paged = rows.into_iter().skip(offset);
        let rows: Vec<Row> = match limit {
            Some(limit) => paged.take(limit).collect(),
            None => paged.collect(),
        };

        let result = match kind {
            QueryKind::All => QueryResult::Rows(project(rows, options.fields.as_deref())),
            QueryKind::First => {
                QueryResult::Row(project(rows, options.fields.as_deref()).into_iter().next())
            }
            QueryKind::List => QueryResult::List(self.list_pairs(&rows, options.fields.as_deref())),
            QueryKind::Threaded => {
                QueryResult::Threaded(thread(project(rows, options.fields.as_deref())))
            }
            QueryKind::Count => QueryResult::Count(total),
        };
        Ok(result)
    }
}

impl MemorySource {
    fn list_pairs(&self, rows: &[Row], fields: Option<&[String]>) -> Vec<(Value, Value)> {
        let (key, display) = match fields {
            Some([key, display, ..]) => (unqualified(key), unqualified(display)),
            Some([display]) => (columns::ID, unqualified(display)),
            _ => (columns::ID, self.display_field.as_str()),
        };
        rows.iter()
            .map(|row| {
                (
                    row.get(key).cloned().unwrap_or(Value::Null),
                    row.get(display).cloned().unwrap_or(Value::Null),
                )
            })
            .collect()
    }
}

fn unqualified(column: &str) -> &str {
    column.rsplit('.').next().unwrap_or(column)
}

fn project(rows: Vec<Row>, fields: Option<&[String]>) -> Vec<Row> {
    let Some(fields) = fields.filter(|f| !f.is_empty()) else {
        return rows;
    };
    rows.into_iter()
        .map(|row| {
            fields
                .iter()
                .map(|f| unqualified(f))
                .filter_map(|f| row.get(f).map(|v| (f.to_string(), v.clone())))
                .collect()
        })
        .collect()
}

/// 정렬용 값 비교 (null이 가장 앞)
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => {
            if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
                return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            }
            match (a.as_str(), b.as_str()) {
                (Some(x), Some(y)) => x.cmp(y),
                _ => a.to_string().cmp(&b.to_string()),
            }
        }
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// parent_id 기준으로 트리 구성
///
/// 부모가 결과에 없는 Row는 루트가 됩니다.
fn thread(rows: Vec<Row>) -> Vec<ThreadNode> {
    let ids: Vec<&Value> = rows.iter().filter_map(|r| r.get(columns::ID)).collect();
    let is_root = |row: &Row| match row.get(columns::PARENT_ID) {
        None | Some(Value::Null) => true,
        Some(parent) => coerce_id(parent) == Some(0) || !ids.iter().any(|id| loose_eq(id, parent)),
    };

    let roots: Vec<usize> = (0..rows.len()).filter(|&i| is_root(&rows[i])).collect();
    let mut used = vec![false; rows.len()];
    for &i in &roots {
        used[i] = true;
    }

    roots
        .into_iter()
        .map(|i| build_node(i, &rows, &mut used))
        .collect()
}

fn build_node(index: usize, rows: &[Row], used: &mut [bool]) -> ThreadNode {
    let mut children = Vec::new();
    if let Some(id) = rows[index].get(columns::ID) {
        for (j, row) in rows.iter().enumerate() {
            if used[j] {
                continue;
            }
            if row
                .get(columns::PARENT_ID)
                .is_some_and(|parent| loose_eq(parent, id))
            {
                used[j] = true;
                children.push(j);
            }
        }
    }

    ThreadNode {
        row: rows[index].clone(),
        children: children
            .into_iter()
            .map(|j| build_node(j, rows, used))
            .collect(),
    }
}
