//! 호출자 컨텍스트, 룸/롤 권한, 편집 권한 평가
//!
//! # 모듈 구조
//!
//! - `context`: 신원 컨텍스트 트레이트와 기본 구현
//! - `policy`: 룸별 롤 권한 설정
//! - `evaluator`: 편집 권한 / 공개 범위 평가기

mod context;
mod evaluator;
mod policy;

pub use context::{CallerContext, Capability, IdentityContext};
pub use evaluator::{EditDecision, WorkflowEvaluator};
pub use policy::{ReservationPermissions, RoleKey, RoomRoleInfo};
