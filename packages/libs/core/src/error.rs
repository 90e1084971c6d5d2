//! 공통 에러 타입
//!
//! 정책 평가 자체는 실패하지 않습니다. 여기의 에러는 설정 파싱과
//! 값 변환(status 코드, capability 이름 등)에서만 발생합니다.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// rsv-core 공통 에러
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────────
    // Permission Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("permission parse error: {message}")]
    PermissionParse { message: String },

    #[error("unknown capability: {name}")]
    InvalidCapability { name: String },

    #[error("unknown role key: {key}")]
    InvalidRoleKey { key: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Workflow Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("invalid workflow status: {value}")]
    InvalidStatus { value: String },

    #[error("invalid condition: {message}")]
    InvalidCondition { message: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // IO/Serialization Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// 에러 코드 (클라이언트용)
    pub fn code(&self) -> &'static str {
        match self {
            Error::PermissionParse { .. } => "PERMISSION_PARSE_ERROR",
            Error::InvalidCapability { .. } => "INVALID_CAPABILITY",
            Error::InvalidRoleKey { .. } => "INVALID_ROLE_KEY",
            Error::InvalidStatus { .. } => "INVALID_STATUS",
            Error::InvalidCondition { .. } => "INVALID_CONDITION",
            Error::Yaml(_) => "YAML_ERROR",
            Error::Json(_) => "JSON_ERROR",
        }
    }
}
