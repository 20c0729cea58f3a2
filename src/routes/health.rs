//! # 헬스체크(Health Check) 핸들러
//!
//! 서버가 정상적으로 동작하는지 확인하는 엔드포인트입니다.
//!
//! ## 엔드포인트
//! - `GET /api/v1/health` → `{ "status": "ok", "sessions": 3 }`
//!
//! 주로 다음 용도로 사용됩니다:
//! - 로드밸런서나 컨테이너 오케스트레이터의 상태 확인
//! - 열려 있는 세션 수 모니터링 (정리 작업이 잘 돌고 있는지 확인)

use crate::routes::sessions::AppState; // 세션 저장소를 담은 공유 상태
use axum::{extract::State, Json};      // State: 공유 상태 추출기, Json: JSON 응답 래퍼
use serde_json::{json, Value};         // JSON 생성 유틸리티

/// `GET /health`: 서버 상태와 현재 열려 있는 세션 수를 반환합니다.
///
/// `State(state)`는 패턴 매칭으로 `State` 래퍼를 벗겨 `AppState`를 바로 꺼냅니다.
///
/// 참고: `Result`를 사용하지 않으므로 이 핸들러는 실패하지 않습니다.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    // 세션 수는 저장소의 읽기 락을 잠깐 잡고 셉니다.
    let sessions = state.registry.count().await;

    // 결과: {"status": "ok", "sessions": 3}
    Json(json!({
        "status": "ok",
        "sessions": sessions
    }))
}
