//! 공개 범위 필터 빌더
//!
//! 조회 조건에 덧붙일 공개 범위 조건을 만듭니다.
//!
//! ```text
//! languageClause AND revisionClause AND baseFilter
//! ```
//!
//! 조건을 조립하는 일은 `QueryFilterBuilder`가, 각 절의 규칙은
//! `VisibilityStrategy` 구현체가 담당합니다.

use serde_json::Value;

use super::condition::Condition;
use crate::permissions::IdentityContext;
use crate::workflow::{columns, RecordSchema, WorkflowStatus};

/// 공개 범위 규칙
pub trait VisibilityStrategy {
    /// 언어 조건
    fn language_clause(&self, schema: &RecordSchema, ctx: &dyn IdentityContext) -> Condition;

    /// 리비전 조건
    fn revision_clause(&self, ctx: &dyn IdentityContext) -> Condition;
}

/// 시설 예약 워크플로 규칙
///
/// - 공개 중인 리비전(`is_active`)은 항상 보임
/// - 최신 리비전(`is_latest`)은 승인 대기 중이거나 본인이 작성한 경우 보임
///
/// 승인 대기 리비전은 승인 권한을 확인하지 않고 누구에게나 보입니다.
/// 승인 목록 화면 등 상위 계층에서 추가로 걸러야 합니다.
///
/// 사용자 ID가 없는 호출자에게는 본인 작성 분기를 만들지 않습니다.
/// 작성자가 없는 리비전(`created_user IS NULL`)은 누구의 것으로도 보지 않습니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReservationWorkflow;

impl VisibilityStrategy for ReservationWorkflow {
    fn language_clause(&self, schema: &RecordSchema, ctx: &dyn IdentityContext) -> Condition {
        if !schema.has_language {
            return Condition::always();
        }

        let current_language = || {
            ctx.current_language_id()
                .map(|id| id.to_value())
                .unwrap_or(Value::Null)
        };

        if !ctx.is_multilingual_enabled() && schema.has_origin {
            Condition::eq(columns::IS_ORIGIN, true)
        } else if schema.has_translation {
            Condition::any([
                Condition::eq(columns::LANGUAGE_ID, current_language()),
                Condition::eq(columns::IS_TRANSLATION, false),
            ])
        } else {
            Condition::eq(columns::LANGUAGE_ID, current_language())
        }
    }

    fn revision_clause(&self, ctx: &dyn IdentityContext) -> Condition {
        let active = Condition::eq(columns::IS_ACTIVE, true);

        let mut latest_visible = vec![Condition::eq(
            columns::STATUS,
            WorkflowStatus::ApprovalWaiting.to_value(),
        )];
        // 비로그인이면 작성자 분기를 두지 않는다 (created_user IS NULL 매칭 방지)
        if let Some(user) = ctx.current_user_id() {
            latest_visible.push(Condition::eq(columns::CREATED_USER, user.to_value()));
        }
        let latest = Condition::all([
            Condition::eq(columns::IS_LATEST, true),
            Condition::any(latest_visible),
        ]);

        Condition::any([active, latest])
    }
}

/// 조회 필터 빌더
pub struct QueryFilterBuilder<S = ReservationWorkflow> {
    schema: RecordSchema,
    strategy: S,
}

impl QueryFilterBuilder<ReservationWorkflow> {
    /// 시설 예약 규칙을 쓰는 빌더
    pub fn reservation(schema: RecordSchema) -> Self {
        Self::new(schema, ReservationWorkflow)
    }
}

impl<S: VisibilityStrategy> QueryFilterBuilder<S> {
    /// 새 빌더 생성
    pub fn new(schema: RecordSchema, strategy: S) -> Self {
        Self { schema, strategy }
    }

    /// 대상 스키마
    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    /// 필터 생성
    ///
    /// `base`는 덮어쓰지 않고 마지막 항으로 결합합니다.
    pub fn build(&self, base: Condition, ctx: &dyn IdentityContext) -> Condition {
        let filter = Condition::all([
            self.strategy.language_clause(&self.schema, ctx),
            self.strategy.revision_clause(ctx),
            base,
        ]);
        tracing::trace!(alias = %self.schema.alias, %filter, "built visibility filter");
        filter
    }
}

/// 시설 예약 규칙으로 공개 범위 필터 생성
pub fn build_visibility_filter(
    base: Condition,
    ctx: &dyn IdentityContext,
    schema: &RecordSchema,
) -> Condition {
    QueryFilterBuilder::reservation(schema.clone()).build(base, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::{CallerContext, WorkflowEvaluator};
    use crate::workflow::ContentRecord;

    const STATUSES: [WorkflowStatus; 4] = [
        WorkflowStatus::Published,
        WorkflowStatus::ApprovalWaiting,
        WorkflowStatus::InDraft,
        WorkflowStatus::Disapproved,
    ];

    fn visible(schema: &RecordSchema, record: &ContentRecord, ctx: &CallerContext) -> bool {
        build_visibility_filter(Condition::always(), ctx, schema).matches(&record.to_row())
    }

    fn all_records() -> Vec<ContentRecord> {
        let mut records = Vec::new();
        for status in STATUSES {
            for is_active in [false, true] {
                for is_latest in [false, true] {
                    for owner in [None, Some(42), Some(7)] {
                        for language in [None, Some(1), Some(2)] {
                            for origin in [None, Some(false), Some(true)] {
                                for translation in [None, Some(false), Some(true)] {
                                    let mut record = ContentRecord::new(status)
                                        .active(is_active)
                                        .latest(is_latest);
                                    record.created_user = owner.map(Into::into);
                                    record.language_id = language.map(Into::into);
                                    record.is_origin = origin;
                                    record.is_translation = translation;
                                    records.push(record);
                                }
                            }
                        }
                    }
                }
            }
        }
        records
    }

    fn callers() -> Vec<CallerContext> {
        vec![
            CallerContext::new(),
            CallerContext::new().with_user(42).with_language(1),
            CallerContext::new().with_user(7).with_language(2).with_multilingual(true),
            CallerContext::new().with_user(42).with_language(2).with_multilingual(true),
        ]
    }

    fn schemas() -> Vec<RecordSchema> {
        let base = RecordSchema::new("ReservationEvent");
        vec![
            base.clone(),
            base.clone().with_language(),
            base.clone().with_language().with_origin(),
            base.clone().with_language().with_translation(),
            base.with_language().with_origin().with_translation(),
        ]
    }

    #[test]
    fn test_active_always_visible() {
        let schema = RecordSchema::new("ReservationEvent");
        for ctx in callers() {
            for record in all_records().into_iter().filter(|r| r.is_active) {
                assert!(visible(&schema, &record, &ctx), "{:?}", record);
            }
        }
    }

    #[test]
    fn test_pending_latest_visible_to_any_caller() {
        let schema = RecordSchema::new("ReservationEvent");
        let record = ContentRecord::new(WorkflowStatus::ApprovalWaiting)
            .latest(true)
            .created_by(42);
        for ctx in callers() {
            assert!(visible(&schema, &record, &ctx));
        }
    }

    #[test]
    fn test_unpublished_latest_visible_only_to_author() {
        let schema = RecordSchema::new("ReservationEvent");
        for status in [WorkflowStatus::Published, WorkflowStatus::InDraft, WorkflowStatus::Disapproved] {
            let record = ContentRecord::new(status).latest(true).created_by(42);
            assert!(visible(&schema, &record, &CallerContext::new().with_user(42)));
            assert!(!visible(&schema, &record, &CallerContext::new().with_user(7)));
            assert!(!visible(&schema, &record, &CallerContext::new()));
        }
    }

    #[test]
    fn test_anonymous_does_not_see_ownerless_drafts() {
        let schema = RecordSchema::new("ReservationEvent");
        let record = ContentRecord::new(WorkflowStatus::InDraft).latest(true);
        assert!(!visible(&schema, &record, &CallerContext::new()));
    }

    #[test]
    fn test_old_unpublished_revision_never_visible() {
        let schema = RecordSchema::new("ReservationEvent");
        for status in STATUSES {
            let record = ContentRecord::new(status).created_by(42);
            for ctx in callers() {
                assert!(!visible(&schema, &record, &ctx));
            }
        }
    }

    #[test]
    fn test_origin_clause_when_multilingual_disabled() {
        let schema = RecordSchema::new("ReservationLocation").with_language().with_origin();
        let ctx = CallerContext::new().with_user(42).with_language(2);
        let filter = build_visibility_filter(Condition::always(), &ctx, &schema);

        let first = match &filter {
            Condition::And(parts) => parts[0].clone(),
            other => panic!("unexpected filter {:?}", other),
        };
        assert_eq!(first, Condition::eq("is_origin", true));

        let origin = ContentRecord::new(WorkflowStatus::Published).active(true).in_language(1).origin(true);
        let translated = ContentRecord::new(WorkflowStatus::Published).active(true).in_language(2).origin(false);
        assert!(visible(&schema, &origin, &ctx));
        assert!(!visible(&schema, &translated, &ctx));
    }

    #[test]
    fn test_translation_clause_when_multilingual_enabled() {
        let schema = RecordSchema::new("ReservationLocation")
            .with_language()
            .with_origin()
            .with_translation();
        let ctx = CallerContext::new().with_language(2).with_multilingual(true);

        let same_language = ContentRecord::new(WorkflowStatus::Published).active(true).in_language(2).translation(true);
        let untranslated = ContentRecord::new(WorkflowStatus::Published).active(true).in_language(1).translation(false);
        let other_translation = ContentRecord::new(WorkflowStatus::Published).active(true).in_language(1).translation(true);

        assert!(visible(&schema, &same_language, &ctx));
        assert!(visible(&schema, &untranslated, &ctx));
        assert!(!visible(&schema, &other_translation, &ctx));
    }

    #[test]
    fn test_translation_clause_without_origin_when_multilingual_disabled() {
        let schema = RecordSchema::new("ReservationEvent")
            .with_language()
            .with_translation();
        let ctx = CallerContext::new().with_user(42).with_language(2);
        let filter = build_visibility_filter(Condition::always(), &ctx, &schema);

        match &filter {
            Condition::And(parts) => assert_eq!(
                parts[0],
                Condition::any([
                    Condition::eq("language_id", 2),
                    Condition::eq("is_translation", false),
                ])
            ),
            other => panic!("unexpected filter {:?}", other),
        }

        let same_language = ContentRecord::new(WorkflowStatus::Published).active(true).in_language(2).translation(true);
        let untranslated = ContentRecord::new(WorkflowStatus::Published).active(true).in_language(1).translation(false);
        let other_translation = ContentRecord::new(WorkflowStatus::Published).active(true).in_language(1).translation(true);

        assert!(visible(&schema, &same_language, &ctx));
        assert!(visible(&schema, &untranslated, &ctx));
        assert!(!visible(&schema, &other_translation, &ctx));
    }

    #[test]
    fn test_language_only_clause() {
        let schema = RecordSchema::new("ReservationEvent").with_language();
        let ctx = CallerContext::new().with_language(1);
        let filter = build_visibility_filter(Condition::always(), &ctx, &schema);

        match &filter {
            Condition::And(parts) => assert_eq!(parts[0], Condition::eq("language_id", 1)),
            other => panic!("unexpected filter {:?}", other),
        }
    }

    #[test]
    fn test_no_language_field_has_no_language_clause() {
        let schema = RecordSchema::new("ReservationEvent");
        let filter = build_visibility_filter(Condition::always(), &CallerContext::new(), &schema);
        assert_eq!(filter.columns(), vec!["is_active", "is_latest", "status"]);
    }

    #[test]
    fn test_base_filter_is_intersected() {
        let schema = RecordSchema::new("ReservationEvent");
        let ctx = CallerContext::new().with_user(42);
        let base = Condition::eq("location_key", "room_a");
        let filter = build_visibility_filter(base.clone(), &ctx, &schema);

        match &filter {
            Condition::And(parts) => assert_eq!(parts.last(), Some(&base)),
            other => panic!("unexpected filter {:?}", other),
        }

        let mut row = ContentRecord::new(WorkflowStatus::Published).active(true).to_row();
        row.insert("location_key".to_string(), "room_b".into());
        assert!(!filter.matches(&row));
        row.insert("location_key".to_string(), "room_a".into());
        assert!(filter.matches(&row));
    }

    #[test]
    fn test_typed_evaluation_agrees_with_filter() {
        for schema in schemas() {
            let evaluator = WorkflowEvaluator::new(&schema);
            for ctx in callers() {
                for record in all_records() {
                    assert_eq!(
                        evaluator.is_visible(&record, &ctx),
                        visible(&schema, &record, &ctx),
                        "schema={:?} ctx={:?} record={:?}",
                        schema,
                        ctx,
                        record
                    );
                }
            }
        }
    }

    struct ActiveOnly;

    impl VisibilityStrategy for ActiveOnly {
        fn language_clause(&self, _: &RecordSchema, _: &dyn IdentityContext) -> Condition {
            Condition::always()
        }

        fn revision_clause(&self, _: &dyn IdentityContext) -> Condition {
            Condition::eq(columns::IS_ACTIVE, true)
        }
    }

    #[test]
    fn test_custom_strategy() {
        let builder = QueryFilterBuilder::new(RecordSchema::new("ReservationEvent"), ActiveOnly);
        let filter = builder.build(Condition::always(), &CallerContext::new().with_user(42));
        assert_eq!(filter, Condition::And(vec![Condition::eq("is_active", true)]));
        assert_eq!(builder.schema().alias, "ReservationEvent");
    }
}
