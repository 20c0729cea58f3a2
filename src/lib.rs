//! # Quiz Master 백엔드
//!
//! 주제/문제 수/제한 시간을 받아 생성형 AI로 객관식 문제를 만들고,
//! 시간 제한이 있는 퀴즈를 진행한 뒤 채점하는 웹 서버의 라이브러리 부분입니다.
//! 실행 파일(`main.rs`)과 통합 테스트(`tests/`)가 이 크레이트를 함께 사용합니다.

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::{router, AppState};
