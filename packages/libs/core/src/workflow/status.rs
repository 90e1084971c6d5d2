//! 워크플로 상태 코드

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{Error, Result};

/// 리비전의 워크플로 상태
///
/// DB에는 숫자 코드로 저장됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowStatus {
    /// 공개 (1)
    Published,
    /// 승인 대기 (2)
    ApprovalWaiting,
    /// 임시 저장 (3)
    InDraft,
    /// 반려 (4)
    Disapproved,
}

impl WorkflowStatus {
    /// 숫자 코드
    pub fn code(&self) -> i64 {
        match self {
            WorkflowStatus::Published => 1,
            WorkflowStatus::ApprovalWaiting => 2,
            WorkflowStatus::InDraft => 3,
            WorkflowStatus::Disapproved => 4,
        }
    }

    /// 숫자 코드에서 변환
    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            1 => Ok(WorkflowStatus::Published),
            2 => Ok(WorkflowStatus::ApprovalWaiting),
            3 => Ok(WorkflowStatus::InDraft),
            4 => Ok(WorkflowStatus::Disapproved),
            other => Err(Error::InvalidStatus {
                value: other.to_string(),
            }),
        }
    }

    /// JSON 값에서 변환 (숫자, 숫자 문자열)
    pub fn from_value(value: &Value) -> Result<Self> {
        let code = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        match code {
            Some(code) => Self::from_code(code),
            None => Err(Error::InvalidStatus {
                value: value.to_string(),
            }),
        }
    }

    /// 조건 트리에 넣을 JSON 값
    pub fn to_value(&self) -> Value {
        Value::from(self.code())
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowStatus::Published => "published",
            WorkflowStatus::ApprovalWaiting => "approval_waiting",
            WorkflowStatus::InDraft => "in_draft",
            WorkflowStatus::Disapproved => "disapproved",
        };
        f.write_str(name)
    }
}

impl Serialize for WorkflowStatus {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for WorkflowStatus {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        WorkflowStatus::from_value(&value).map_err(serde::de::Error::custom)
    }
}
