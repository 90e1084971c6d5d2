//! 워크플로 콘텐츠 평가기
//!
//! 리비전 레코드에 대해 편집 가능 여부와 공개 범위를 평가합니다.

use serde_json::Value;

use super::context::{Capability, IdentityContext};
use crate::workflow::{
    coerce_id, columns, normalize_row, ContentRecord, RecordSchema, WorkflowStatus,
};

/// 편집 권한 평가 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDecision {
    /// 허용 여부
    pub allowed: bool,

    /// 거부 사유 (allowed=false인 경우)
    pub reason: Option<&'static str>,
}

impl EditDecision {
    /// 허용 결과 생성
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    /// 거부 결과 생성
    pub fn deny(reason: &'static str) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }
}

/// 워크플로 평가기
///
/// 모델 스키마와 호출자 컨텍스트를 기반으로 판단합니다.
/// 상태를 갖지 않으므로 여러 요청에서 동시에 사용해도 됩니다.
pub struct WorkflowEvaluator<'a> {
    schema: &'a RecordSchema,
}

impl<'a> WorkflowEvaluator<'a> {
    /// 새 평가기 생성
    pub fn new(schema: &'a RecordSchema) -> Self {
        Self { schema }
    }

    /// 편집 권한 평가 (First Match Wins)
    ///
    /// 1. `content_editable` 권한이 있으면 허용
    /// 2. Row를 alias 그룹 기준으로 정규화
    /// 3. `created_user`가 없으면 거부
    /// 4. `created_user`가 현재 사용자와 같으면 허용
    ///
    /// 비로그인 호출자는 작성자가 없는 레코드도 편집할 수 없습니다.
    pub fn evaluate_edit(&self, row: &Value, ctx: &dyn IdentityContext) -> EditDecision {
        if ctx.has_capability(Capability::ContentEditable) {
            return EditDecision::allow();
        }

        let Some(fields) = normalize_row(&self.schema.alias, row) else {
            return EditDecision::deny("record is not an object");
        };

        let created_user = match fields.get(columns::CREATED_USER) {
            None | Some(Value::Null) => return EditDecision::deny("record has no created_user"),
            Some(value) => value,
        };

        let Some(owner) = coerce_id(created_user) else {
            return EditDecision::deny("created_user is not an integer id");
        };

        match ctx.current_user_id() {
            Some(user) if user.0 == owner => EditDecision::allow(),
            Some(_) => EditDecision::deny("caller is not the author"),
            None => EditDecision::deny("caller is not logged in"),
        }
    }

    /// 편집 가능 여부
    pub fn can_edit_record(&self, row: &Value, ctx: &dyn IdentityContext) -> bool {
        let decision = self.evaluate_edit(row, ctx);
        if let Some(reason) = decision.reason {
            tracing::debug!(alias = %self.schema.alias, reason, "edit denied");
        }
        decision.allowed
    }

    /// 타입 레코드의 편집 가능 여부
    pub fn can_edit(&self, record: &ContentRecord, ctx: &dyn IdentityContext) -> bool {
        if ctx.has_capability(Capability::ContentEditable) {
            return true;
        }
        match (record.created_user, ctx.current_user_id()) {
            (Some(owner), Some(user)) => owner == user,
            _ => false,
        }
    }

    /// 공개 범위 판정
    ///
    /// `visibility::build_visibility_filter`가 만드는 조건과 같은 결과를 냅니다.
    pub fn is_visible(&self, record: &ContentRecord, ctx: &dyn IdentityContext) -> bool {
        self.language_matches(record, ctx) && Self::revision_visible(record, ctx)
    }

    fn language_matches(&self, record: &ContentRecord, ctx: &dyn IdentityContext) -> bool {
        if !self.schema.has_language {
            return true;
        }
        if !ctx.is_multilingual_enabled() && self.schema.has_origin {
            return record.is_origin == Some(true);
        }
        let same_language = record.language_id == ctx.current_language_id();
        if self.schema.has_translation {
            return same_language || record.is_translation == Some(false);
        }
        same_language
    }

    fn revision_visible(record: &ContentRecord, ctx: &dyn IdentityContext) -> bool {
        if record.is_active {
            return true;
        }
        if !record.is_latest {
            return false;
        }
        if record.status == WorkflowStatus::ApprovalWaiting {
            return true;
        }
        match (record.created_user, ctx.current_user_id()) {
            (Some(owner), Some(user)) => owner == user,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::CallerContext;
    use serde_json::json;

    fn event_schema() -> RecordSchema {
        RecordSchema::new("ReservationEvent")
    }

    #[test]
    fn test_content_editable_allows_any_record() {
        let schema = event_schema();
        let evaluator = WorkflowEvaluator::new(&schema);
        let ctx = CallerContext::new()
            .with_user(7)
            .with_capability(Capability::ContentEditable);

        assert!(evaluator.can_edit_record(&json!({ "created_user": 42 }), &ctx));
        assert!(evaluator.can_edit_record(&json!({}), &ctx));
    }

    #[test]
    fn test_author_can_edit_with_string_id() {
        let schema = event_schema();
        let evaluator = WorkflowEvaluator::new(&schema);
        let ctx = CallerContext::new().with_user(5);

        assert!(evaluator.can_edit_record(&json!({ "created_user": "5" }), &ctx));
        assert!(evaluator.can_edit_record(
            &json!({ "ReservationEvent": { "created_user": 5 } }),
            &ctx
        ));
    }

    #[test]
    fn test_other_user_cannot_edit() {
        let schema = event_schema();
        let evaluator = WorkflowEvaluator::new(&schema);
        let ctx = CallerContext::new().with_user(7);

        let decision = evaluator.evaluate_edit(&json!({ "created_user": 42 }), &ctx);
        assert!(!decision.allowed);
        assert_eq!(decision.reason, Some("caller is not the author"));
    }

    #[test]
    fn test_missing_created_user_denies() {
        let schema = event_schema();
        let evaluator = WorkflowEvaluator::new(&schema);
        let ctx = CallerContext::new().with_user(5);

        assert!(!evaluator.can_edit_record(&json!({ "title": "room A" }), &ctx));
        assert!(!evaluator.can_edit_record(&json!({ "created_user": null }), &ctx));
        assert!(!evaluator.can_edit_record(
            &json!({ "ReservationEvent": { "title": "room A" } }),
            &ctx
        ));
    }

    #[test]
    fn test_anonymous_and_garbage_owner_denied() {
        let schema = event_schema();
        let evaluator = WorkflowEvaluator::new(&schema);

        let anonymous = CallerContext::new();
        let decision = evaluator.evaluate_edit(&json!({ "created_user": 0 }), &anonymous);
        assert_eq!(decision.reason, Some("caller is not logged in"));

        let ctx = CallerContext::new().with_user(0);
        let decision = evaluator.evaluate_edit(&json!({ "created_user": "abc" }), &ctx);
        assert_eq!(decision.reason, Some("created_user is not an integer id"));
    }

    #[test]
    fn test_anonymous_cannot_edit_ownerless_record() {
        let schema = event_schema();
        let evaluator = WorkflowEvaluator::new(&schema);
        let anonymous = CallerContext::new();

        assert!(!evaluator.can_edit_record(&json!({ "created_user": null }), &anonymous));
        assert!(!evaluator.can_edit(&ContentRecord::new(WorkflowStatus::InDraft), &anonymous));
    }

    #[test]
    fn test_typed_can_edit() {
        let schema = event_schema();
        let evaluator = WorkflowEvaluator::new(&schema);
        let record = ContentRecord::new(WorkflowStatus::InDraft).created_by(42);

        assert!(evaluator.can_edit(&record, &CallerContext::new().with_user(42)));
        assert!(!evaluator.can_edit(&record, &CallerContext::new().with_user(7)));
        assert!(evaluator.can_edit(
            &record,
            &CallerContext::new().with_capability(Capability::ContentEditable)
        ));
    }

    #[test]
    fn test_author_exception_for_latest_revision() {
        let schema = event_schema();
        let evaluator = WorkflowEvaluator::new(&schema);
        let record = ContentRecord::new(WorkflowStatus::Published)
            .latest(true)
            .created_by(42);

        assert!(evaluator.is_visible(&record, &CallerContext::new().with_user(42)));
        assert!(!evaluator.is_visible(&record, &CallerContext::new().with_user(7)));
    }

    #[test]
    fn test_pending_approval_visible_to_anyone() {
        let schema = event_schema();
        let evaluator = WorkflowEvaluator::new(&schema);
        let record = ContentRecord::new(WorkflowStatus::ApprovalWaiting)
            .latest(true)
            .created_by(42);

        assert!(evaluator.is_visible(&record, &CallerContext::new()));
    }

    #[test]
    fn test_old_revision_hidden() {
        let schema = event_schema();
        let evaluator = WorkflowEvaluator::new(&schema);
        let record = ContentRecord::new(WorkflowStatus::InDraft).created_by(42);

        assert!(!evaluator.is_visible(&record, &CallerContext::new().with_user(42)));
    }

    #[test]
    fn test_origin_only_when_multilingual_disabled() {
        let schema = event_schema().with_language().with_origin();
        let evaluator = WorkflowEvaluator::new(&schema);
        let ctx = CallerContext::new().with_language(2);

        let origin = ContentRecord::new(WorkflowStatus::Published)
            .active(true)
            .in_language(1)
            .origin(true);
        let copy = ContentRecord::new(WorkflowStatus::Published)
            .active(true)
            .in_language(2)
            .origin(false);

        assert!(evaluator.is_visible(&origin, &ctx));
        assert!(!evaluator.is_visible(&copy, &ctx));
    }
}
