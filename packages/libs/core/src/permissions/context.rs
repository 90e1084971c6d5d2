//! 호출자 컨텍스트
//!
//! 현재 사용자, 언어, 다국어 사용 여부, 롤에서 파생된 권한을 담습니다.
//! 프레임워크 전역 상태 대신 모든 평가 호출에 명시적으로 전달됩니다.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::policy::ReservationPermissions;
use crate::error::Error;
use crate::workflow::{LanguageId, UserId};

/// 롤에서 파생되는 콘텐츠 권한
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ContentReadable,
    ContentCreatable,
    ContentEditable,
    ContentPublishable,
    ContentCommentCreatable,
    ContentCommentEditable,
    ContentCommentPublishable,
    BlockPermissionEditable,
}

impl Capability {
    /// 모든 권한
    pub const ALL: [Capability; 8] = [
        Capability::ContentReadable,
        Capability::ContentCreatable,
        Capability::ContentEditable,
        Capability::ContentPublishable,
        Capability::ContentCommentCreatable,
        Capability::ContentCommentEditable,
        Capability::ContentCommentPublishable,
        Capability::BlockPermissionEditable,
    ];

    /// 문자열로 변환
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ContentReadable => "content_readable",
            Capability::ContentCreatable => "content_creatable",
            Capability::ContentEditable => "content_editable",
            Capability::ContentPublishable => "content_publishable",
            Capability::ContentCommentCreatable => "content_comment_creatable",
            Capability::ContentCommentEditable => "content_comment_editable",
            Capability::ContentCommentPublishable => "content_comment_publishable",
            Capability::BlockPermissionEditable => "block_permission_editable",
        }
    }
}

impl FromStr for Capability {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::InvalidCapability {
                name: s.to_string(),
            })
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 신원 컨텍스트 (읽기 전용 협력자)
///
/// 세션/인증 계층이 구현합니다. 정책은 이 사실들만 읽습니다.
pub trait IdentityContext {
    /// 현재 사용자 ID (비로그인이면 None)
    fn current_user_id(&self) -> Option<UserId>;

    /// 현재 언어 ID
    fn current_language_id(&self) -> Option<LanguageId>;

    /// 다국어 사용 여부
    fn is_multilingual_enabled(&self) -> bool;

    /// 권한 보유 여부
    fn has_capability(&self, capability: Capability) -> bool;
}

/// 호출자 컨텍스트
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerContext {
    /// 사용자 ID
    #[serde(default)]
    pub user_id: Option<UserId>,

    /// 언어 ID
    #[serde(default)]
    pub language_id: Option<LanguageId>,

    /// 다국어 사용 여부
    #[serde(default)]
    pub multilingual: bool,

    /// 보유 권한
    #[serde(default)]
    pub capabilities: BTreeSet<Capability>,
}

impl CallerContext {
    /// 빈 컨텍스트 (비로그인, 권한 없음)
    pub fn new() -> Self {
        Self::default()
    }

    /// 룸 권한 설정에서 권한을 채운 컨텍스트
    pub fn for_room(room_id: &str, permissions: &ReservationPermissions) -> Self {
        Self {
            capabilities: permissions.capabilities(room_id),
            ..Self::default()
        }
    }

    /// 사용자 설정
    pub fn with_user(mut self, user: impl Into<UserId>) -> Self {
        self.user_id = Some(user.into());
        self
    }

    /// 언어 설정
    pub fn with_language(mut self, language: impl Into<LanguageId>) -> Self {
        self.language_id = Some(language.into());
        self
    }

    /// 다국어 사용 여부 설정
    pub fn with_multilingual(mut self, multilingual: bool) -> Self {
        self.multilingual = multilingual;
        self
    }

    /// 권한 추가
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    /// 콘텐츠 편집 권한 보유 여부
    pub fn has_content_editable_permission(&self) -> bool {
        self.capabilities.contains(&Capability::ContentEditable)
    }
}

impl IdentityContext for CallerContext {
    fn current_user_id(&self) -> Option<UserId> {
        self.user_id
    }

    fn current_language_id(&self) -> Option<LanguageId> {
        self.language_id
    }

    fn is_multilingual_enabled(&self) -> bool {
        self.multilingual
    }

    fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_names() {
        assert_eq!(
            "content_editable".parse::<Capability>().unwrap(),
            Capability::ContentEditable
        );
        assert_eq!(
            Capability::BlockPermissionEditable.to_string(),
            "block_permission_editable"
        );
        assert!("content_deletable".parse::<Capability>().is_err());
    }

    #[test]
    fn test_caller_context_builder() {
        let ctx = CallerContext::new()
            .with_user(42)
            .with_language(2)
            .with_multilingual(true)
            .with_capability(Capability::ContentEditable);

        assert_eq!(ctx.current_user_id(), Some(UserId(42)));
        assert_eq!(ctx.current_language_id(), Some(LanguageId(2)));
        assert!(ctx.is_multilingual_enabled());
        assert!(ctx.has_content_editable_permission());
        assert!(!ctx.has_capability(Capability::ContentPublishable));
    }

    #[test]
    fn test_anonymous_context() {
        let ctx = CallerContext::new();
        assert_eq!(ctx.current_user_id(), None);
        assert!(!ctx.is_multilingual_enabled());
        assert!(ctx.capabilities.is_empty());
    }

    #[test]
    fn test_deserialize_context() {
        let json = r#"{
            "user_id": "5",
            "language_id": 2,
            "capabilities": ["content_creatable"]
        }"#;
        let ctx: CallerContext = serde_json::from_str(json).unwrap();
        assert_eq!(ctx.user_id, Some(UserId(5)));
        assert!(ctx.has_capability(Capability::ContentCreatable));
        assert!(!ctx.multilingual);
    }
}
