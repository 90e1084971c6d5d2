//! 타입이 지정된 리비전 레코드

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::schema::columns;
use super::status::WorkflowStatus;
use crate::error::{Error, Result};

/// 사용자 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

/// 언어 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LanguageId(pub i64);

macro_rules! id_impls {
    ($name:ident) => {
        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(i64::from(id))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let value = Value::deserialize(deserializer)?;
                coerce_id(&value).map(Self).ok_or_else(|| {
                    serde::de::Error::custom(format!("expected integer id, got {}", value))
                })
            }
        }

        impl $name {
            /// 조건 트리에 넣을 JSON 값
            pub fn to_value(&self) -> Value {
                Value::from(self.0)
            }
        }
    };
}

id_impls!(UserId);
id_impls!(LanguageId);

/// JSON 값을 정수 ID로 변환
///
/// 숫자와 숫자 문자열("5")을 같은 값으로 취급합니다.
pub fn coerce_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// JSON 값을 bool로 변환
///
/// `true/false`, `0/1`, `"0"/"1"`, `"true"/"false"`를 허용합니다.
pub fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        Value::String(s) => match s.trim() {
            "1" | "true" => Some(true),
            "0" | "false" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Row를 모델 alias 그룹 기준으로 정규화
///
/// `{"ReservationEvent": {...}}` 형태면 안쪽 객체를,
/// 평평한 속성 맵이면 그대로 돌려줍니다.
pub fn normalize_row<'a>(alias: &str, row: &'a Value) -> Option<&'a Map<String, Value>> {
    let obj = row.as_object()?;
    match obj.get(alias) {
        Some(Value::Object(inner)) => Some(inner),
        _ => Some(obj),
    }
}

/// 리비전 레코드
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// 워크플로 상태
    pub status: WorkflowStatus,

    /// 공개 중인 리비전 여부
    #[serde(default)]
    pub is_active: bool,

    /// 최신 리비전 여부
    #[serde(default)]
    pub is_latest: bool,

    /// 작성자
    #[serde(default)]
    pub created_user: Option<UserId>,

    /// 콘텐츠 언어
    #[serde(default)]
    pub language_id: Option<LanguageId>,

    /// 원본 언어 리비전 여부
    #[serde(default)]
    pub is_origin: Option<bool>,

    /// 번역 리비전 여부
    #[serde(default)]
    pub is_translation: Option<bool>,
}

impl ContentRecord {
    /// 새 레코드 생성 (비공개, 최신 아님)
    pub fn new(status: WorkflowStatus) -> Self {
        Self {
            status,
            is_active: false,
            is_latest: false,
            created_user: None,
            language_id: None,
            is_origin: None,
            is_translation: None,
        }
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    pub fn latest(mut self, is_latest: bool) -> Self {
        self.is_latest = is_latest;
        self
    }

    pub fn created_by(mut self, user: impl Into<UserId>) -> Self {
        self.created_user = Some(user.into());
        self
    }

    pub fn in_language(mut self, language: impl Into<LanguageId>) -> Self {
        self.language_id = Some(language.into());
        self
    }

    pub fn origin(mut self, is_origin: bool) -> Self {
        self.is_origin = Some(is_origin);
        self
    }

    pub fn translation(mut self, is_translation: bool) -> Self {
        self.is_translation = Some(is_translation);
        self
    }

    /// JSON Row에서 생성
    ///
    /// alias 그룹으로 감싼 형태와 평평한 형태를 모두 받습니다.
    /// `status`가 없거나 알 수 없는 코드면 에러입니다.
    pub fn from_row(alias: &str, row: &Value) -> Result<Self> {
        let fields = normalize_row(alias, row).ok_or_else(|| Error::InvalidStatus {
            value: row.to_string(),
        })?;

        let status = match fields.get(columns::STATUS) {
            Some(value) => WorkflowStatus::from_value(value)?,
            None => {
                return Err(Error::InvalidStatus {
                    value: "null".to_string(),
                })
            }
        };

        let flag = |column: &str| fields.get(column).and_then(coerce_bool);
        let id = |column: &str| fields.get(column).and_then(coerce_id);

        Ok(Self {
            status,
            is_active: flag(columns::IS_ACTIVE).unwrap_or(false),
            is_latest: flag(columns::IS_LATEST).unwrap_or(false),
            created_user: id(columns::CREATED_USER).map(UserId),
            language_id: id(columns::LANGUAGE_ID).map(LanguageId),
            is_origin: flag(columns::IS_ORIGIN),
            is_translation: flag(columns::IS_TRANSLATION),
        })
    }

    /// 평평한 JSON Row로 변환
    ///
    /// 값이 없는 선택 필드는 키 자체를 생략합니다.
    pub fn to_row(&self) -> Map<String, Value> {
        let mut row = Map::new();
        row.insert(columns::STATUS.to_string(), self.status.to_value());
        row.insert(columns::IS_ACTIVE.to_string(), Value::Bool(self.is_active));
        row.insert(columns::IS_LATEST.to_string(), Value::Bool(self.is_latest));
        if let Some(user) = self.created_user {
            row.insert(columns::CREATED_USER.to_string(), user.to_value());
        }
        if let Some(language) = self.language_id {
            row.insert(columns::LANGUAGE_ID.to_string(), language.to_value());
        }
        if let Some(origin) = self.is_origin {
            row.insert(columns::IS_ORIGIN.to_string(), Value::Bool(origin));
        }
        if let Some(translation) = self.is_translation {
            row.insert(columns::IS_TRANSLATION.to_string(), Value::Bool(translation));
        }
        row
    }
}
