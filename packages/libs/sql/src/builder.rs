//! SELECT 빌더
//!
//! 조회 종류와 옵션을 받아 PostgreSQL SELECT 문을 생성합니다.
//! SeaQuery를 사용하여 값은 항상 이스케이프됩니다.

use sea_query::{
    Asterisk, Cond, Expr, Func, Iden, JoinType, Order, PostgresQueryBuilder, Query,
    SelectStatement, SimpleExpr,
};
use serde_json::Value;

use rsv_core::visibility::Condition;

use crate::params::{JoinKind, QueryKind, QueryOptions, SortOrder};

/// 동적 테이블/컬럼 식별자
#[derive(Debug, Clone)]
struct DynIden(String);

impl Iden for DynIden {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        let _ = s.write_str(&self.0);
    }
}

/// PostgreSQL bigint 상한 (LIMIT / OFFSET)
const MAX_BIGINT: u64 = i64::MAX as u64;

/// SELECT 쿼리 빌더
pub struct SelectBuilder<'a> {
    table: &'a str,
    alias: Option<&'a str>,
}

impl<'a> SelectBuilder<'a> {
    /// 새 빌더 생성
    pub fn new(table: &'a str) -> Self {
        Self { table, alias: None }
    }

    /// 모델 alias 설정 (`FROM "table" AS "Alias"`)
    ///
    /// `Alias.column`과 `table.column`은 모두 alias로 한정됩니다.
    pub fn with_alias(mut self, alias: &'a str) -> Self {
        self.alias = Some(alias).filter(|a| *a != self.table);
        self
    }

    /// SQL 생성
    pub fn build(&self, kind: QueryKind, options: &QueryOptions) -> String {
        self.statement(kind, options).to_string(PostgresQueryBuilder)
    }

    /// SeaQuery 문 생성
    pub fn statement(&self, kind: QueryKind, options: &QueryOptions) -> SelectStatement {
        let mut query = self.filtered(options);

        if kind == QueryKind::Count {
            if options.group.is_empty() {
                query.expr(Func::count(Expr::col(Asterisk)));
                return query;
            }

            // group 수를 센다
            for column in &options.group {
                query.column(self.column_ref(column));
            }
            let mut outer = Query::select();
            outer
                .expr(Func::count(Expr::col(Asterisk)))
                .from_subquery(query, DynIden("grouped".to_string()));
            return outer;
        }

        // SELECT columns
        match &options.fields {
            Some(fields) if !fields.is_empty() => {
                for field in fields {
                    query.column(self.column_ref(field));
                }
            }
            _ => {
                query.column(Asterisk);
            }
        }

        // ORDER BY
        for item in &options.order {
            let order = match item.order {
                SortOrder::Asc => Order::Asc,
                SortOrder::Desc => Order::Desc,
            };
            query.order_by(self.column_ref(&item.column), order);
        }

        // LIMIT / OFFSET
        if kind == QueryKind::First {
            query.limit(1);
        } else if let Some(limit) = options.limit {
            query.limit(limit.min(MAX_BIGINT));
        }
        if let Some(offset) = options.effective_offset() {
            query.offset(offset.min(MAX_BIGINT));
        }

        query
    }

    /// FROM / JOIN / WHERE / GROUP BY
    fn filtered(&self, options: &QueryOptions) -> SelectStatement {
        let mut query = Query::select();

        // FROM
        match self.alias {
            Some(alias) => {
                query.from_as(DynIden(self.table.to_string()), DynIden(alias.to_string()));
            }
            None => {
                query.from(DynIden(self.table.to_string()));
            }
        }

        // JOIN
        for join in &options.joins {
            let join_type = match join.kind {
                JoinKind::Inner => JoinType::InnerJoin,
                JoinKind::Left => JoinType::LeftJoin,
            };
            query.join(
                join_type,
                DynIden(join.table.clone()),
                Expr::col(self.column_ref(&join.left)).equals(self.column_ref(&join.right)),
            );
        }

        // WHERE
        if !options.conditions.is_always() {
            query.cond_where(self.to_cond(&options.conditions));
        }

        // GROUP BY
        for column in &options.group {
            query.group_by_col(self.column_ref(column));
        }

        query
    }

    /// FROM 절에서 이 모델을 가리키는 이름
    fn source_name(&self) -> &'a str {
        self.alias.unwrap_or(self.table)
    }

    /// `table.column` 또는 `column`을 컬럼 참조로 변환
    fn column_ref(&self, column: &str) -> (DynIden, DynIden) {
        let (qualifier, name) = match column.rsplit_once('.') {
            Some((prefix, name)) if prefix == self.table || Some(prefix) == self.alias => {
                (self.source_name(), name)
            }
            Some((prefix, name)) => (prefix, name),
            None => (self.source_name(), column),
        };
        (DynIden(qualifier.to_string()), DynIden(name.to_string()))
    }

    fn to_cond(&self, condition: &Condition) -> Cond {
        match condition {
            Condition::And(parts) if parts.is_empty() => Cond::all().add(Expr::cust("1 = 1")),
            Condition::Or(parts) if parts.is_empty() => Cond::all().add(Expr::cust("1 = 0")),
            Condition::And(parts) => parts
                .iter()
                .fold(Cond::all(), |cond, part| cond.add(self.to_cond(part))),
            Condition::Or(parts) => parts
                .iter()
                .fold(Cond::any(), |cond, part| cond.add(self.to_cond(part))),
            Condition::Eq { column, value } => {
                let col = Expr::col(self.column_ref(column));
                let expr = match value {
                    Value::Null => col.is_null(),
                    other => col.eq(value_to_expr(other)),
                };
                Cond::all().add(expr)
            }
        }
    }
}

/// serde_json::Value를 SeaQuery 식으로 변환
fn value_to_expr(value: &Value) -> SimpleExpr {
    match value {
        Value::Null => Expr::val(Option::<String>::None).into(),
        Value::Bool(b) => Expr::val(*b).into(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Expr::val(i).into()
            } else if let Some(f) = n.as_f64() {
                Expr::val(f).into()
            } else {
                Expr::val(n.to_string()).into()
            }
        }
        Value::String(s) => Expr::val(s.as_str()).into(),
        Value::Array(_) | Value::Object(_) => Expr::val(value.to_string()).into(),
    }
}
