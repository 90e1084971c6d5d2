//! 조건 트리
//!
//! AND/OR/등호로 이루어진 필터 조건입니다.
//! 메모리 상의 Row에 직접 평가하거나 rsv-sql에서 SQL로 변환합니다.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::workflow::{coerce_bool, coerce_id};

/// 필터 조건
///
/// - `And([])`는 항상 참
/// - `Or([])`는 항상 거짓
/// - `Eq`의 값이 `null`이면 `IS NULL`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Eq { column: String, value: Value },
}

impl Default for Condition {
    fn default() -> Self {
        Condition::always()
    }
}

impl Condition {
    /// 항상 참인 조건
    pub fn always() -> Self {
        Condition::And(Vec::new())
    }

    /// 등호 조건
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition::Eq {
            column: column.into(),
            value: value.into(),
        }
    }

    /// AND 결합 (항상 참인 항목은 생략)
    pub fn all(parts: impl IntoIterator<Item = Condition>) -> Self {
        Condition::And(parts.into_iter().filter(|c| !c.is_always()).collect())
    }

    /// OR 결합
    pub fn any(parts: impl IntoIterator<Item = Condition>) -> Self {
        Condition::Or(parts.into_iter().collect())
    }

    /// 항상 참인지
    pub fn is_always(&self) -> bool {
        matches!(self, Condition::And(parts) if parts.iter().all(Condition::is_always))
    }

    /// 조건이 참조하는 컬럼 이름 (중복 제거, 등장 순서)
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Condition::And(parts) | Condition::Or(parts) => {
                for part in parts {
                    part.collect_columns(out);
                }
            }
            Condition::Eq { column, .. } => {
                if !out.contains(&column.as_str()) {
                    out.push(column.as_str());
                }
            }
        }
    }

    /// 평평한 Row에 대해 평가
    ///
    /// `Alias.column` 형태의 컬럼 이름은 `column`으로 조회합니다.
    pub fn matches(&self, row: &Map<String, Value>) -> bool {
        match self {
            Condition::And(parts) => parts.iter().all(|c| c.matches(row)),
            Condition::Or(parts) => parts.iter().any(|c| c.matches(row)),
            Condition::Eq { column, value } => {
                let actual = row
                    .get(column.as_str())
                    .or_else(|| row.get(unqualified(column)));
                match actual {
                    None => value.is_null(),
                    Some(actual) => loose_eq(actual, value),
                }
            }
        }
    }

    /// WHERE 객체 형식에서 변환
    ///
    /// # 예시
    ///
    /// ```json
    /// { "location_key": "room_a" }                          // location_key = 'room_a'
    /// { "status": 1, "$or": [{ "a": 1 }, { "b": 2 }] }      // status = 1 AND (a = 1 OR b = 2)
    /// { "$and": [{ "a": 1 }, { "b": null }] }               // a = 1 AND b IS NULL
    /// { "eq": { "column": "a", "value": 1 } }               // 태그 형식도 허용
    /// ```
    pub fn from_where(value: &Value) -> Result<Self> {
        let obj = match value {
            Value::Null => return Ok(Condition::always()),
            Value::Object(obj) => obj,
            Value::Array(items) => {
                return Ok(Condition::all(
                    items.iter().map(Condition::from_where).collect::<Result<Vec<_>>>()?,
                ))
            }
            other => {
                return Err(Error::InvalidCondition {
                    message: format!("expected object, got {}", other),
                })
            }
        };

        if obj.len() == 1 && ["and", "or", "eq"].iter().any(|k| obj.contains_key(*k)) {
            return Ok(serde_json::from_value(value.clone())?);
        }

        let mut parts = Vec::with_capacity(obj.len());
        for (key, val) in obj {
            match key.as_str() {
                "$and" | "AND" => parts.push(Condition::all(nested(key, val)?)),
                "$or" | "OR" => parts.push(Condition::any(nested(key, val)?)),
                k if k.starts_with('$') => {
                    return Err(Error::InvalidCondition {
                        message: format!("unsupported operator: {}", k),
                    })
                }
                column => {
                    if val.is_object() || val.is_array() {
                        return Err(Error::InvalidCondition {
                            message: format!("column {} expects a scalar value", column),
                        });
                    }
                    parts.push(Condition::eq(column, val.clone()));
                }
            }
        }
        Ok(Condition::all(parts))
    }
}

fn nested(key: &str, value: &Value) -> Result<Vec<Condition>> {
    match value {
        Value::Array(items) => items.iter().map(Condition::from_where).collect(),
        Value::Object(obj) => obj
            .iter()
            .map(|(k, v)| {
                let mut single = Map::new();
                single.insert(k.clone(), v.clone());
                Condition::from_where(&Value::Object(single))
            })
            .collect(),
        other => Err(Error::InvalidCondition {
            message: format!("{} expects an array or object, got {}", key, other),
        }),
    }
}

fn unqualified(column: &str) -> &str {
    column.rsplit('.').next().unwrap_or(column)
}

/// DB 값 비교 규칙을 흉내 낸 느슨한 등호
///
/// 숫자와 숫자 문자열, bool과 0/1을 같은 값으로 봅니다.
pub fn loose_eq(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (_, Value::Bool(b)) => coerce_bool(actual) == Some(*b),
        (Value::Bool(a), _) => coerce_bool(expected) == Some(*a),
        (Value::String(a), Value::String(b)) => a == b,
        _ => match (coerce_id(actual), coerce_id(expected)) {
            (Some(a), Some(b)) => a == b,
            _ => actual == expected,
        },
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::And(parts) if parts.is_empty() => f.write_str("TRUE"),
            Condition::Or(parts) if parts.is_empty() => f.write_str("FALSE"),
            Condition::And(parts) | Condition::Or(parts) => {
                let sep = if matches!(self, Condition::And(_)) {
                    " AND "
                } else {
                    " OR "
                };
                f.write_str("(")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(sep)?;
                    }
                    write!(f, "{}", part)?;
                }
                f.write_str(")")
            }
            Condition::Eq { column, value } if value.is_null() => write!(f, "{} IS NULL", column),
            Condition::Eq { column, value } => write!(f, "{} = {}", column, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_empty_and_or() {
        let r = row(json!({ "a": 1 }));
        assert!(Condition::always().matches(&r));
        assert!(!Condition::any([]).matches(&r));
    }

    #[test]
    fn test_loose_matching() {
        let r = row(json!({ "is_active": 1, "status": "2", "created_user": 42, "language_id": null }));

        assert!(Condition::eq("is_active", true).matches(&r));
        assert!(Condition::eq("status", 2).matches(&r));
        assert!(Condition::eq("created_user", "42").matches(&r));
        assert!(Condition::eq("language_id", Value::Null).matches(&r));
        assert!(Condition::eq("is_origin", Value::Null).matches(&r));
        assert!(!Condition::eq("is_origin", true).matches(&r));
        assert!(Condition::eq("ReservationEvent.status", 2).matches(&r));
    }

    #[test]
    fn test_all_skips_always_true_parts() {
        let cond = Condition::all([Condition::always(), Condition::eq("a", 1)]);
        assert_eq!(cond, Condition::And(vec![Condition::eq("a", 1)]));
        assert!(Condition::all([Condition::always()]).is_always());
    }

    #[test]
    fn test_all_keeps_both_sides() {
        let cond = Condition::all([Condition::eq("a", 1), Condition::eq("a", 2)]);
        assert_eq!(cond.columns(), vec!["a"]);
        assert!(!cond.matches(&row(json!({ "a": 1 }))));
    }

    #[test]
    fn test_from_where_object() {
        let cond = Condition::from_where(&json!({
            "location_key": "room_a",
            "$or": [{ "status": 1 }, { "created_user": 5 }]
        }))
        .unwrap();

        assert!(cond.matches(&row(json!({ "location_key": "room_a", "status": 1 }))));
        assert!(cond.matches(&row(json!({ "location_key": "room_a", "status": 3, "created_user": "5" }))));
        assert!(!cond.matches(&row(json!({ "location_key": "room_b", "status": 1 }))));
    }

    #[test]
    fn test_from_where_tagged() {
        let cond = Condition::from_where(&json!({ "eq": { "column": "a", "value": 1 } })).unwrap();
        assert_eq!(cond, Condition::eq("a", 1));
    }

    #[test]
    fn test_from_where_rejects_operators() {
        assert!(Condition::from_where(&json!({ "age": { "$gt": 18 } })).is_err());
        assert!(Condition::from_where(&json!({ "$like": "a%" })).is_err());
        assert!(Condition::from_where(&json!(5)).is_err());
    }

    #[test]
    fn test_display() {
        let cond = Condition::all([
            Condition::eq("is_origin", true),
            Condition::any([Condition::eq("is_active", true), Condition::eq("parent_id", Value::Null)]),
        ]);
        assert_eq!(
            cond.to_string(),
            "(is_origin = true AND (is_active = true OR parent_id IS NULL))"
        );
    }
}
