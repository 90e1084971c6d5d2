//! rsv-core: 시설 예약 콘텐츠의 워크플로 공개 범위 / 편집 권한 정책
//!
//! 이 크레이트는 rsv-sql과 CLI가 공유하는 핵심 타입과 정책 로직을 제공합니다.
//!
//! # 모듈 구조
//!
//! - `workflow`: 리비전 레코드, 워크플로 상태, 레코드 스키마
//! - `permissions`: 호출자 컨텍스트, 룸/롤 권한, 편집 권한 평가
//! - `visibility`: 조건 트리 및 공개 범위 필터 빌더
//! - `error`: 공통 에러 타입

pub mod error;
pub mod permissions;
pub mod visibility;
pub mod workflow;

pub use error::{Error, Result};
