//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체들을 정의합니다.
//! - `question`: 객관식 문제와 선택지
//! - `quiz`: 퀴즈 설정과 폼 선택지
//! - `session`: 세션 스냅샷과 채점 결과
//!
//! `pub use X::*;`로 재공개하여 `crate::models::Question`처럼 짧게 쓸 수 있습니다.

pub mod question;
pub mod quiz;
pub mod session;

pub use question::*;
pub use quiz::*;
pub use session::*;
