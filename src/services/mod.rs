//! # 서비스 모듈
//!
//! HTTP 계층과 무관한 핵심 로직을 모아둔 모듈입니다.
//! - `question_source`: 생성형 AI 문제 생성과 폴백 정책
//! - `gemini`: Gemini REST 클라이언트
//! - `session`: 퀴즈 세션 상태 머신
//! - `countdown`: 1초 간격 틱 타이머
//! - `runner`: 세션 하나의 상태 변경을 직렬화하는 태스크
//! - `registry`: 세션 ID → 핸들 저장소

pub mod countdown;
pub mod gemini;
pub mod question_source;
pub mod registry;
pub mod runner;
pub mod session;

pub use question_source::{QuestionSource, TextGenerator};
pub use registry::SessionRegistry;
pub use runner::{SessionClosed, SessionHandle, Transition};
pub use session::{Event, IgnoreReason, Outcome, Session};
