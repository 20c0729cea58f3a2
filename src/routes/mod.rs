//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들을 모아둔 모듈입니다.
//!
//! 각 하위 모듈:
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `quiz`: 홈 화면 폼 선택지
//! - `sessions`: 퀴즈 세션 생성/진행/채점

pub mod health;
pub mod quiz;
pub mod sessions;

pub use health::*;
pub use quiz::*;
pub use sessions::*;

use axum::{
    routing::{get, post, put},
    Router,
};

/// `/api/v1` 아래에 붙일 API 라우터를 만듭니다.
///
/// 경로 파라미터는 axum 0.8 문법(`{id}`)을 사용합니다.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/quiz/options", get(quiz_options))
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(get_session).delete(delete_session))
        .route("/sessions/{id}/configure", post(configure_session))
        .route("/sessions/{id}/start", post(start_quiz))
        .route("/sessions/{id}/answers/{question_id}", put(select_answer))
        .route("/sessions/{id}/next", post(next_question))
        .route("/sessions/{id}/previous", post(previous_question))
        .route("/sessions/{id}/goto/{index}", post(go_to_question))
        .route("/sessions/{id}/submit", post(submit_quiz))
        .route("/sessions/{id}/reset", post(reset_session))
        .route("/sessions/{id}/result", get(get_result))
        .with_state(state)
}

/// API 라우터를 `/api/v1` 아래에 중첩한 라우터
pub fn router(state: AppState) -> Router {
    Router::new().nest("/api/v1", api_router(state))
}
