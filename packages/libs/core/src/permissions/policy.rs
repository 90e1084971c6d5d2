//! 룸/롤 권한 설정
//!
//! 블록 롤 권한 편집 화면이 저장하는 값의 구조를 정의합니다.
//! 룸마다 현재 사용자의 롤과 콘텐츠 권한 값을 담습니다.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::context::Capability;
use crate::error::{Error, Result};
use crate::workflow::coerce_bool;

/// 룸 롤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKey {
    RoomAdministrator,
    ChiefEditor,
    Editor,
    GeneralUser,
    Visitor,
}

impl RoleKey {
    /// 문자열로 변환
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleKey::RoomAdministrator => "room_administrator",
            RoleKey::ChiefEditor => "chief_editor",
            RoleKey::Editor => "editor",
            RoleKey::GeneralUser => "general_user",
            RoleKey::Visitor => "visitor",
        }
    }

    /// 값이 지정되지 않았을 때 롤의 기본 콘텐츠 권한
    pub fn default_capabilities(&self) -> &'static [Capability] {
        match self {
            RoleKey::RoomAdministrator | RoleKey::ChiefEditor => &[
                Capability::ContentCreatable,
                Capability::ContentEditable,
                Capability::ContentPublishable,
            ],
            RoleKey::Editor => &[Capability::ContentCreatable, Capability::ContentEditable],
            RoleKey::GeneralUser => &[Capability::ContentCreatable],
            RoleKey::Visitor => &[],
        }
    }

    /// 설정 값과 무관하게 고정된 롤인지
    pub fn is_fixed(&self) -> bool {
        matches!(self, RoleKey::RoomAdministrator)
    }
}

impl FromStr for RoleKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "room_administrator" => Ok(RoleKey::RoomAdministrator),
            "chief_editor" => Ok(RoleKey::ChiefEditor),
            "editor" => Ok(RoleKey::Editor),
            "general_user" => Ok(RoleKey::GeneralUser),
            "visitor" => Ok(RoleKey::Visitor),
            other => Err(Error::InvalidRoleKey {
                key: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for RoleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 룸별 롤 정보
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRoleInfo {
    /// 현재 사용자의 룸 롤
    pub role_key: RoleKey,

    /// 콘텐츠 승인 사용 여부
    #[serde(default, deserialize_with = "loose_bool")]
    pub use_workflow: bool,

    /// 공개 권한 (None = 롤 기본값)
    #[serde(
        default,
        alias = "content_publishable_value",
        deserialize_with = "loose_opt_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub content_publishable: Option<bool>,

    /// 편집 권한 (None = 롤 기본값)
    #[serde(
        default,
        alias = "content_editable_value",
        deserialize_with = "loose_opt_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub content_editable: Option<bool>,

    /// 작성 권한 (None = 롤 기본값)
    #[serde(
        default,
        alias = "content_creatable_value",
        deserialize_with = "loose_opt_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub content_creatable: Option<bool>,
}

impl RoomRoleInfo {
    /// 기본값만 가진 롤 정보
    pub fn new(role_key: RoleKey) -> Self {
        Self {
            role_key,
            use_workflow: false,
            content_publishable: None,
            content_editable: None,
            content_creatable: None,
        }
    }

    /// 이 룸에서의 권한 집합
    pub fn capabilities(&self) -> BTreeSet<Capability> {
        let mut caps = BTreeSet::new();
        caps.insert(Capability::ContentReadable);

        if self.role_key.is_fixed() {
            caps.extend(Capability::ALL);
            return caps;
        }

        let defaults = self.role_key.default_capabilities();
        let resolve = |value: Option<bool>, cap: Capability| value.unwrap_or(defaults.contains(&cap));

        if resolve(self.content_creatable, Capability::ContentCreatable) {
            caps.insert(Capability::ContentCreatable);
            caps.insert(Capability::ContentCommentCreatable);
        }
        if resolve(self.content_editable, Capability::ContentEditable) {
            caps.insert(Capability::ContentEditable);
            caps.insert(Capability::ContentCommentEditable);
        }
        if resolve(self.content_publishable, Capability::ContentPublishable) {
            caps.insert(Capability::ContentPublishable);
            caps.insert(Capability::ContentCommentPublishable);
        }

        // 승인 없이 운영하는 룸에서는 작성자가 곧바로 공개할 수 있다
        if !self.use_workflow && caps.contains(&Capability::ContentCreatable) {
            caps.insert(Capability::ContentPublishable);
        }

        caps
    }
}

/// 시설 예약 권한 설정
///
/// YAML/JSON 파일의 루트 구조입니다.
///
/// ```yaml
/// rooms:
///   "2":
///     role_key: general_user
///     use_workflow: true
///     content_creatable: true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationPermissions {
    /// 룸 ID → 롤 정보
    #[serde(default)]
    pub rooms: HashMap<String, RoomRoleInfo>,
}

impl ReservationPermissions {
    /// YAML에서 파싱
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// JSON에서 파싱
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// 룸 롤 정보 조회
    pub fn room(&self, room_id: &str) -> Option<&RoomRoleInfo> {
        self.rooms.get(room_id)
    }

    /// 룸에서의 권한 집합 (알 수 없는 룸이면 빈 집합)
    pub fn capabilities(&self, room_id: &str) -> BTreeSet<Capability> {
        self.room(room_id)
            .map(RoomRoleInfo::capabilities)
            .unwrap_or_default()
    }

    /// 블록 롤 권한 편집 가능 여부
    ///
    /// 룸 관리자만 편집할 수 있습니다.
    pub fn can_edit_block_role_permissions(&self, room_id: &str) -> bool {
        let allowed = self
            .capabilities(room_id)
            .contains(&Capability::BlockPermissionEditable);
        if !allowed {
            tracing::debug!(room_id, "block role permission editing denied");
        }
        allowed
    }
}

fn loose_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(loose_opt_bool(deserializer)?.unwrap_or(false))
}

fn loose_opt_bool<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    coerce_bool(&value)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("expected boolean flag, got {}", value)))
}
