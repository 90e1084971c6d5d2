//! 공개 범위 필터
//!
//! # 모듈 구조
//!
//! - `condition`: AND/OR/등호 조건 트리
//! - `filter`: 공개 범위 규칙과 필터 빌더

mod condition;
mod filter;

pub use condition::{loose_eq, Condition};
pub use filter::{build_visibility_filter, QueryFilterBuilder, ReservationWorkflow, VisibilityStrategy};
