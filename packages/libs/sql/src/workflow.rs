//! 공개 범위 조회
//!
//! 레코드 소스에 조회를 넘기기 전에 공개 범위 필터를 호출자 조건과 결합합니다.

use serde_json::Value;

use rsv_core::permissions::{IdentityContext, WorkflowEvaluator};
use rsv_core::visibility::{QueryFilterBuilder, ReservationWorkflow, VisibilityStrategy};
use rsv_core::workflow::RecordSchema;

use crate::params::{QueryKind, QueryOptions};
use crate::source::{QueryResult, RecordSource};

/// 연관 모델을 로드하지 않음
pub const NO_RECURSION: i32 = -1;

/// 워크플로 콘텐츠 조회기
pub struct WorkflowContents<'a, S, V = ReservationWorkflow> {
    source: &'a S,
    filter: QueryFilterBuilder<V>,
}

impl<'a, S: RecordSource> WorkflowContents<'a, S, ReservationWorkflow> {
    /// 시설 예약 규칙으로 생성
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            filter: QueryFilterBuilder::reservation(source.schema().clone()),
        }
    }
}

impl<'a, S: RecordSource, V: VisibilityStrategy> WorkflowContents<'a, S, V> {
    /// 다른 공개 범위 규칙으로 생성
    pub fn with_strategy(source: &'a S, strategy: V) -> Self {
        Self {
            source,
            filter: QueryFilterBuilder::new(source.schema().clone(), strategy),
        }
    }

    /// 소스에 넘길 옵션 생성
    ///
    /// 호출자 조건은 공개 범위 필터 뒤에 AND로 남고,
    /// `recursive`는 호출자가 지정하지 않았을 때만 -1로 채웁니다.
    pub fn prepare(&self, options: QueryOptions, ctx: &dyn IdentityContext) -> QueryOptions {
        merge_visibility(&self.filter, options, ctx)
    }

    /// 공개 범위 안의 콘텐츠 조회
    pub fn fetch(
        &self,
        kind: QueryKind,
        options: QueryOptions,
        ctx: &dyn IdentityContext,
    ) -> Result<QueryResult, S::Error> {
        let options = self.prepare(options, ctx);
        tracing::debug!(
            alias = %self.filter.schema().alias,
            kind = kind.as_str(),
            conditions = %options.conditions,
            "fetching visible content"
        );
        self.source.query(kind, &options)
    }

    /// 편집 가능 여부
    pub fn can_edit(&self, row: &Value, ctx: &dyn IdentityContext) -> bool {
        WorkflowEvaluator::new(self.filter.schema()).can_edit_record(row, ctx)
    }
}

/// 시설 예약 규칙으로 공개 범위 안의 콘텐츠 조회
pub fn filtered_query<S: RecordSource>(
    source: &S,
    kind: QueryKind,
    options: QueryOptions,
    ctx: &dyn IdentityContext,
) -> Result<QueryResult, S::Error> {
    WorkflowContents::new(source).fetch(kind, options, ctx)
}

/// 소스 없이 조회 옵션만 준비 (SQL 출력 등)
pub fn prepare_visible_query(
    schema: &RecordSchema,
    options: QueryOptions,
    ctx: &dyn IdentityContext,
) -> QueryOptions {
    merge_visibility(&QueryFilterBuilder::reservation(schema.clone()), options, ctx)
}

fn merge_visibility<V: VisibilityStrategy>(
    filter: &QueryFilterBuilder<V>,
    mut options: QueryOptions,
    ctx: &dyn IdentityContext,
) -> QueryOptions {
    let base = std::mem::take(&mut options.conditions);
    options.conditions = filter.build(base, ctx);
    options.recursive.get_or_insert(NO_RECURSION);
    options
}
