//! rsv-sql: 공개 범위 조회 라이브러리
//!
//! 조회 옵션에 공개 범위 필터를 결합해 레코드 소스에 넘기고,
//! 같은 옵션을 SeaQuery로 PostgreSQL SELECT 문으로 출력합니다.
//!
//! # 모듈 구조
//!
//! - `params`: 조회 종류와 옵션
//! - `source`: 레코드 소스 계약과 메모리 구현
//! - `workflow`: 공개 범위 필터 결합과 조회
//! - `builder`: SELECT SQL 빌더

pub mod builder;
pub mod params;
pub mod source;
pub mod workflow;

pub use builder::SelectBuilder;
pub use params::{Join, JoinKind, OrderBy, QueryKind, QueryOptions, SortOrder};
pub use source::{MemorySource, QueryResult, RecordSource, Row, SourceError, ThreadNode};
pub use workflow::{filtered_query, prepare_visible_query, WorkflowContents, NO_RECURSION};
