//! 워크플로 리비전 모델
//!
//! # 개요
//!
//! 예약 콘텐츠는 저장할 때마다 새 리비전이 쌓입니다.
//! 공개 중인 리비전은 `is_active`, 가장 최근 리비전은 `is_latest`로 표시됩니다.
//! 상태 전이는 외부 워크플로 컴포넌트가 담당하며, 이 모듈은 결과 플래그를 읽기만 합니다.
//!
//! # 모듈 구조
//!
//! - `status`: 워크플로 상태 코드
//! - `record`: 타입이 지정된 리비전 레코드
//! - `schema`: 모델별 컬럼 유무 플래그

mod record;
mod schema;
mod status;

pub use record::{coerce_bool, coerce_id, normalize_row, ContentRecord, LanguageId, UserId};
pub use schema::{columns, RecordSchema};
pub use status::WorkflowStatus;
