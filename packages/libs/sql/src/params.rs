//! 조회 파라미터
//!
//! 조회 종류와 옵션(conditions / fields / joins / limit / offset / order / page / group)을 정의합니다.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use rsv_core::visibility::Condition;

/// 조회 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    /// 전체 Row
    #[default]
    All,
    /// 첫 번째 Row
    First,
    /// 개수
    Count,
    /// (키, 표시값) 목록
    List,
    /// parent_id 기준 트리
    Threaded,
}

impl QueryKind {
    /// 문자열로 변환
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::All => "all",
            QueryKind::First => "first",
            QueryKind::Count => "count",
            QueryKind::List => "list",
            QueryKind::Threaded => "threaded",
        }
    }
}

impl FromStr for QueryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(QueryKind::All),
            "first" => Ok(QueryKind::First),
            "count" => Ok(QueryKind::Count),
            "list" => Ok(QueryKind::List),
            "threaded" => Ok(QueryKind::Threaded),
            other => Err(format!("unknown query kind: {}", other)),
        }
    }
}

/// 정렬 순서
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// 정렬 항목
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: String,
    #[serde(default)]
    pub order: SortOrder,
}

/// 조인 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
}

/// 조인 (`left = right` 등호 조인)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Join {
    pub table: String,
    #[serde(default)]
    pub kind: JoinKind,
    pub left: String,
    pub right: String,
}

/// 조회 옵션
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// WHERE 조건
    #[serde(default)]
    pub conditions: Condition,

    /// SELECT할 컬럼 목록 (None = 전체)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,

    /// 조인
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub joins: Vec<Join>,

    /// 제한
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,

    /// 오프셋
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,

    /// 정렬
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order: Vec<OrderBy>,

    /// 페이지 (1부터, offset이 없을 때 limit과 함께 사용)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,

    /// GROUP BY 컬럼
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group: Vec<String>,

    /// 연관 모델 로드 깊이 (-1 = 로드하지 않음)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recursive: Option<i32>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_conditions(mut self, conditions: Condition) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, order: SortOrder) -> Self {
        self.order.push(OrderBy {
            column: column.into(),
            order,
        });
        self
    }

    pub fn with_recursive(mut self, recursive: i32) -> Self {
        self.recursive = Some(recursive);
        self
    }

    /// 실제로 적용할 오프셋
    ///
    /// `offset`이 있으면 그대로, 없으면 `(page - 1) * limit`.
    /// 곱이 범위를 넘으면 `u64::MAX`로 고정되어 빈 페이지가 됩니다.
    pub fn effective_offset(&self) -> Option<u64> {
        if self.offset.is_some() {
            return self.offset;
        }
        match (self.page, self.limit) {
            (Some(page), Some(limit)) if page > 1 => Some((page - 1).saturating_mul(limit)),
            _ => None,
        }
    }
}
