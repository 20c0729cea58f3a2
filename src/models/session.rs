//! # 퀴즈 세션 조회 모델
//!
//! 세션 상태 머신(`services::session`)의 내부 상태를 화면에 내려줄 때 쓰는
//! 읽기 전용 구조체들입니다.
//!
//! ## 세션 흐름
//! ```text
//! Idle ──Configure──▶ Loading ──QuestionsLoaded──▶ Ready ──Start──▶ Active ──Submit/Tick(0)──▶ Finished
//!   ▲                    │
//!   └────LoadFailed──────┘          (Reset: 어느 상태에서든 Idle로)
//! ```

use crate::models::{ChoiceLabel, QuestionOptions, QuestionView, QuizConfig};
use serde::Serialize;
use std::collections::HashMap;

/// 세션의 현재 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// 설정 없음 (초기 상태, 리셋 직후, 문제 불러오기 실패 후)
    Idle,
    /// 문제를 불러오는 중
    Loading,
    /// 문제 준비 완료, 아직 시작 전
    Ready,
    /// 진행 중: 타이머가 흐르는 유일한 단계
    Active,
    /// 채점 완료 (종료 상태)
    Finished,
}

/// 남은 시간에 따른 긴박도: 화면에서 타이머 색을 정할 때 씁니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeUrgency {
    /// 3분 초과
    Normal,
    /// 3분 이하
    Warning,
    /// 1분 이하
    Critical,
}

impl TimeUrgency {
    pub fn from_remaining(seconds: u32) -> Self {
        if seconds <= 60 {
            TimeUrgency::Critical
        } else if seconds <= 180 {
            TimeUrgency::Warning
        } else {
            TimeUrgency::Normal
        }
    }
}

/// 세션 스냅샷: `GET /api/v1/sessions/{id}`의 응답 본문입니다.
///
/// 진행 중에는 `questions`의 정답/해설이 빠져 있고, `Finished`가 되어야 공개됩니다.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub config: Option<QuizConfig>,
    pub questions: Vec<QuestionView>,
    pub current_index: usize,
    /// 문제 ID → 선택한 라벨
    pub answers: HashMap<String, ChoiceLabel>,
    pub remaining_seconds: u32,
    /// "m:ss" 형식의 남은 시간
    pub remaining_display: String,
    pub urgency: TimeUrgency,
    pub answered_count: usize,
    pub all_answered: bool,
    pub started: bool,
    pub finished: bool,
    /// 0.0 ~ 100.0 (종료 전에는 0.0)
    pub score: f64,
    pub loading: bool,
    /// 표시용 에러 메시지 (폴백 문제를 사용한 경우 포함)
    pub last_error: Option<String>,
}

/// 문제별 채점 결과
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionReview {
    /// 1부터 시작하는 문제 번호
    pub number: usize,
    pub id: String,
    pub question: String,
    pub options: QuestionOptions,
    pub user_answer: Option<ChoiceLabel>,
    pub correct_answer: ChoiceLabel,
    pub is_correct: bool,
    pub explanation: Option<String>,
}

/// 퀴즈 결과: `GET /api/v1/sessions/{id}/result`의 응답 본문입니다.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub topic: String,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub incorrect_answers: usize,
    pub unanswered: usize,
    pub score: f64,
    pub time_taken_seconds: u32,
    pub time_taken_display: String,
    pub feedback: &'static str,
    pub review: Vec<QuestionReview>,
}

/// 초를 "m:ss" 형식으로 바꿉니다. (예: 600 → "10:00", 65 → "1:05")
pub fn format_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// 점수 구간별 격려 문구
pub fn feedback_for_score(score: f64) -> &'static str {
    if score >= 90.0 {
        "Excellent! Outstanding performance!"
    } else if score >= 80.0 {
        "Great job! Well done!"
    } else if score >= 70.0 {
        "Good work! Keep it up!"
    } else if score >= 60.0 {
        "Not bad! Room for improvement."
    } else {
        "Keep practicing! You can do better!"
    }
}
