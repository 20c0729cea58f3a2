//! # 퀴즈 폼 선택지 핸들러
//!
//! - `GET /api/v1/quiz/options` → 홈 화면 폼의 문제 수/제한 시간 선택지

use crate::models::QuizOptions;
use axum::Json;

/// `GET /quiz/options`: 폼에 표시할 선택지와 기본값을 반환합니다.
///
/// API 자체는 양수라면 어떤 값이든 받습니다. 이 목록은 화면 표시용입니다.
pub async fn quiz_options() -> Json<QuizOptions> {
    Json(QuizOptions::default())
}
