//! # 퀴즈 세션 API 라우트 핸들러
//!
//! 브라우저 화면이 퀴즈 세션을 만들고 진행하기 위해 호출하는 HTTP 핸들러 함수들입니다.
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | POST | /api/v1/sessions | `create_session` | 빈 세션 생성 |
//! | GET | /api/v1/sessions/{id} | `get_session` | 현재 스냅샷 |
//! | DELETE | /api/v1/sessions/{id} | `delete_session` | 세션 폐기 |
//! | POST | /api/v1/sessions/{id}/configure | `configure_session` | 설정 + 문제 불러오기 |
//! | POST | /api/v1/sessions/{id}/start | `start_quiz` | 타이머 시작 |
//! | PUT | /api/v1/sessions/{id}/answers/{question_id} | `select_answer` | 답 선택 |
//! | POST | /api/v1/sessions/{id}/next | `next_question` | 다음 문제 |
//! | POST | /api/v1/sessions/{id}/previous | `previous_question` | 이전 문제 |
//! | POST | /api/v1/sessions/{id}/goto/{index} | `go_to_question` | 문제 이동 |
//! | POST | /api/v1/sessions/{id}/submit | `submit_quiz` | 제출 및 채점 |
//! | POST | /api/v1/sessions/{id}/reset | `reset_session` | 처음 상태로 |
//! | GET | /api/v1/sessions/{id}/result | `get_result` | 채점 결과 |
//!
//! ## 세션 사용 흐름
//! ```text
//! 1. 홈 화면 진입 → POST /sessions
//! 2. 폼 제출 → POST /sessions/{id}/configure (문제 준비 완료까지 대기)
//! 3. 퀴즈 화면 → POST /start, PUT /answers/..., POST /next ...
//!    (남은 시간은 GET /sessions/{id}로 확인, 0이 되면 서버가 자동 제출)
//! 4. 제출 → POST /submit → GET /result
//! ```
//!
//! 현재 상태에서 허용되지 않는 전이(예: 시작 전 답 선택)는 HTTP 에러가 아니라
//! `{ "applied": false, "reason": "...", "session": {...} }`로 응답합니다.

use crate::{
    error::AppError,
    models::*,
    services::{Event, IgnoreReason, Outcome, SessionHandle, SessionRegistry, Transition},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
#[derive(Clone)]
pub struct AppState {
    /// 세션 ID → 세션 핸들 저장소 (내부적으로 Arc로 공유)
    pub registry: SessionRegistry,
}

/// 상태 전이 요청의 응답 본문
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionResponse {
    /// 전이가 실제로 적용되었는지
    pub applied: bool,
    /// 무시된 경우 그 이유
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub session: SessionSnapshot,
}

impl From<Transition> for TransitionResponse {
    fn from(transition: Transition) -> Self {
        let reason = match transition.outcome {
            Outcome::Applied => None,
            Outcome::Ignored(reason) => Some(reason.to_string()),
        };
        Self {
            applied: reason.is_none(),
            reason,
            session: transition.snapshot,
        }
    }
}

/// 답 선택 요청: `PUT /api/v1/sessions/{id}/answers/{question_id}`의 요청 본문
#[derive(Debug, Deserialize)]
pub struct SelectAnswerRequest {
    /// "A" | "B" | "C" | "D"
    pub answer: ChoiceLabel,
}

/// 경로의 세션 ID로 핸들을 찾습니다. 없으면 404입니다.
async fn session_handle(state: &AppState, id: &Uuid) -> Result<SessionHandle, AppError> {
    state.registry.get(id).await.ok_or(AppError::NotFound)
}

/// 이벤트 하나를 적용하고 응답 본문으로 바꿉니다.
async fn transition(
    state: &AppState,
    id: &Uuid,
    event: Event,
) -> Result<Json<TransitionResponse>, AppError> {
    let handle = session_handle(state, id).await?;
    let transition = handle.apply(event).await?;
    Ok(Json(transition.into()))
}

/// 새 세션을 만듭니다.
///
/// `POST /api/v1/sessions` → `201 { "id": "...", "session": {...} }`
pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let (id, handle) = state.registry.create().await;
    (
        StatusCode::CREATED,
        Json(json!({ "id": id, "session": handle.snapshot() })),
    )
}

/// 세션의 현재 스냅샷을 조회합니다.
///
/// 진행 중에는 남은 시간(`remainingSeconds`)이 매초 줄어든 값으로 보입니다.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let handle = session_handle(&state, &id).await?;
    Ok(Json(handle.snapshot()))
}

/// 세션을 폐기합니다. 카운트다운도 함께 멈춥니다.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.registry.remove(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

/// 퀴즈를 설정하고 문제를 불러옵니다.
///
/// `POST /api/v1/sessions/{id}/configure`
/// + `{ "topic": "History", "questionCount": 5, "durationMinutes": 10 }`
///
/// 문제가 준비될 때까지 기다렸다가 응답합니다.
/// - 주제가 비었거나 숫자가 0 이하이면 400
/// - 이미 불러오는 중이면 409
/// - AI 호출이 실패해도 폴백 문제로 준비되며, `session.lastError`에 안내 문구가 담깁니다.
pub async fn configure_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ConfigureRequest>,
) -> Result<Json<TransitionResponse>, AppError> {
    let config = QuizConfig::new(&req.topic, req.question_count, req.duration_minutes)?;
    let handle = session_handle(&state, &id).await?;

    tracing::info!(
        "Configuring session {}: topic='{}', questions={}, minutes={}",
        id,
        config.topic(),
        config.question_count(),
        config.duration_minutes()
    );

    let transition = handle.configure(config).await?;
    if transition.outcome == Outcome::Ignored(IgnoreReason::LoadInProgress) {
        return Err(AppError::Conflict(IgnoreReason::LoadInProgress.to_string()));
    }
    Ok(Json(transition.into()))
}

/// 퀴즈를 시작합니다. 이미 시작했다면 아무 일도 일어나지 않습니다.
pub async fn start_quiz(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransitionResponse>, AppError> {
    transition(&state, &id, Event::Start).await
}

/// 문제의 답을 선택합니다. 같은 문제에 다시 선택하면 덮어씁니다.
///
/// `PUT /api/v1/sessions/{id}/answers/q3` + `{ "answer": "B" }`
pub async fn select_answer(
    State(state): State<AppState>,
    Path((id, question_id)): Path<(Uuid, String)>,
    Json(req): Json<SelectAnswerRequest>,
) -> Result<Json<TransitionResponse>, AppError> {
    let event = Event::SelectAnswer {
        question_id,
        answer: req.answer,
    };
    transition(&state, &id, event).await
}

pub async fn next_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransitionResponse>, AppError> {
    transition(&state, &id, Event::Next).await
}

pub async fn previous_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransitionResponse>, AppError> {
    transition(&state, &id, Event::Previous).await
}

/// 특정 문제로 이동합니다. 범위를 벗어난 번호는 마지막 문제로 맞춰집니다.
pub async fn go_to_question(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<TransitionResponse>, AppError> {
    transition(&state, &id, Event::GoToQuestion(index)).await
}

/// 퀴즈를 제출하고 채점합니다.
///
/// 진행 중인 퀴즈는 모든 문제에 답해야 제출할 수 있습니다. (아니면 409)
/// 남은 시간은 제출 시점의 값 그대로 남습니다.
pub async fn submit_quiz(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransitionResponse>, AppError> {
    let handle = session_handle(&state, &id).await?;
    let snapshot = handle.snapshot();
    if snapshot.phase == Phase::Active && !snapshot.all_answered {
        return Err(AppError::Conflict(format!(
            "answer every question before submitting ({}/{} answered)",
            snapshot.answered_count,
            snapshot.questions.len()
        )));
    }

    let transition = handle.apply(Event::Submit).await?;
    if transition.outcome.is_applied() {
        tracing::info!(
            "Session {} submitted with score {:.1}",
            id,
            transition.snapshot.score
        );
    }
    Ok(Json(transition.into()))
}

/// 세션을 처음(빈 `Idle`) 상태로 되돌립니다. 불러오는 중인 문제 응답은 버려집니다.
pub async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransitionResponse>, AppError> {
    transition(&state, &id, Event::Reset).await
}

/// 채점 결과를 조회합니다. 아직 끝나지 않았으면 409입니다.
pub async fn get_result(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuizResult>, AppError> {
    let handle = session_handle(&state, &id).await?;
    let result = handle
        .result()
        .await?
        .ok_or_else(|| AppError::Conflict("quiz is not finished yet".to_string()))?;
    Ok(Json(result))
}
