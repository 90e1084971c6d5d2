//! 모델별 컬럼 유무 플래그
//!
//! 평가 시점에 "이 모델에 language_id 컬럼이 있는가"를 매번 묻는 대신,
//! 스키마를 만들 때 한 번 결정해 둡니다.

use serde::{Deserialize, Serialize};

/// 워크플로 컬럼 이름
pub mod columns {
    pub const ID: &str = "id";
    pub const IS_ACTIVE: &str = "is_active";
    pub const IS_LATEST: &str = "is_latest";
    pub const STATUS: &str = "status";
    pub const CREATED_USER: &str = "created_user";
    pub const LANGUAGE_ID: &str = "language_id";
    pub const IS_ORIGIN: &str = "is_origin";
    pub const IS_TRANSLATION: &str = "is_translation";
    pub const PARENT_ID: &str = "parent_id";
}

/// 레코드 스키마
///
/// 모델 alias와 다국어 관련 컬럼의 유무를 담습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    /// 모델 alias (예: `ReservationEvent`)
    pub alias: String,

    /// `language_id` 컬럼 유무
    #[serde(default)]
    pub has_language: bool,

    /// `is_origin` 컬럼 유무
    #[serde(default)]
    pub has_origin: bool,

    /// `is_translation` 컬럼 유무
    #[serde(default)]
    pub has_translation: bool,
}

impl RecordSchema {
    /// 다국어 컬럼이 없는 스키마
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            has_language: false,
            has_origin: false,
            has_translation: false,
        }
    }

    /// `language_id` 컬럼 추가
    pub fn with_language(mut self) -> Self {
        self.has_language = true;
        self
    }

    /// `is_origin` 컬럼 추가
    pub fn with_origin(mut self) -> Self {
        self.has_origin = true;
        self
    }

    /// `is_translation` 컬럼 추가
    pub fn with_translation(mut self) -> Self {
        self.has_translation = true;
        self
    }

    /// 컬럼 목록에서 플래그 결정
    pub fn from_columns<'a>(
        alias: impl Into<String>,
        column_names: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut schema = Self::new(alias);
        for name in column_names {
            match name {
                columns::LANGUAGE_ID => schema.has_language = true,
                columns::IS_ORIGIN => schema.has_origin = true,
                columns::IS_TRANSLATION => schema.has_translation = true,
                _ => {}
            }
        }
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_columns() {
        let schema = RecordSchema::from_columns(
            "ReservationEvent",
            ["id", "status", "language_id", "is_translation"],
        );
        assert_eq!(schema.alias, "ReservationEvent");
        assert!(schema.has_language);
        assert!(!schema.has_origin);
        assert!(schema.has_translation);
    }

    #[test]
    fn test_parse_schema_yaml() {
        let yaml = r#"
alias: ReservationLocation
has_language: true
has_origin: true
"#;
        let schema: RecordSchema = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            schema,
            RecordSchema::new("ReservationLocation").with_language().with_origin()
        );
    }
}
