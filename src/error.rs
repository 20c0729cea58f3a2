//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 에러 타입을 정의합니다.
//!
//! 이 모듈의 핵심:
//! - `AppError`: HTTP 핸들러가 반환하는 에러. `IntoResponse`로 JSON 에러 응답이 됩니다.
//! - `ConfigError`: 퀴즈 설정(주제/문제 수/제한 시간) 검증 실패
//! - `GenerationError`: 생성형 AI 호출 실패. 문제 출처(Question Source) 밖으로는
//!   나가지 않고 폴백 문제로 흡수됩니다.

use crate::services::runner::SessionClosed;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// HTTP 계층의 에러
///
/// 각 에러 variant는 적절한 HTTP 상태 코드와 메시지로 변환됩니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 요청한 세션을 찾을 수 없음 (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    /// 잘못된 요청 (HTTP 400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 현재 세션 상태와 맞지 않는 요청 (HTTP 409)
    #[error("Conflict: {0}")]
    Conflict(String),
}

/// 퀴즈 설정 검증 에러: 세션이 시작되기 전에 걸러집니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("quiz topic must not be empty")]
    EmptyTopic,

    #[error("question count must be positive, got {0}")]
    InvalidQuestionCount(i64),

    #[error("duration must be a positive number of minutes, got {0}")]
    InvalidDuration(i64),
}

/// 생성형 AI 호출 에러
#[derive(Debug, Error)]
pub enum GenerationError {
    /// API 키가 없거나 형식이 올바르지 않음
    #[error("no valid provider credential configured")]
    Unconfigured,

    /// 네트워크/타임아웃/응답 본문 디코딩 실패 (요청 URL은 지운 상태)
    #[error("provider request failed: {0}")]
    Http(reqwest::Error),

    /// 2xx가 아닌 응답
    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// 응답에 텍스트가 없음 (안전 필터 차단 등)
    #[error("provider returned no text")]
    EmptyResponse,
}

// reqwest 에러의 Display에는 요청 URL이 들어가므로 URL을 지운 뒤 보관합니다.
impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Http(err.without_url())
    }
}

// #[from] 대신 직접 From을 구현합니다.
// 설정 에러는 항상 400 Bad Request로 응답합니다.
impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

// 러너 태스크가 이미 끝난 세션은 찾을 수 없는 세션과 같게 취급합니다.
impl From<SessionClosed> for AppError {
    fn from(_: SessionClosed) -> Self {
        AppError::NotFound
    }
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 결과: `{ "error": { "code": "not_found", "message": "Resource not found" } }`
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::BadRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", msg.clone())
            }
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
