//! # 퀴즈 설정 모델
//!
//! 사용자가 홈 화면 폼에서 입력하는 퀴즈 설정(주제, 문제 수, 제한 시간)과
//! 그 유효성 검사를 정의합니다.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// 폼에서 고를 수 있는 문제 수
pub const QUESTION_COUNT_CHOICES: [u32; 4] = [5, 10, 15, 20];
/// 폼에서 고를 수 있는 제한 시간(분)
pub const DURATION_CHOICES: [u32; 5] = [5, 10, 15, 20, 30];

/// 검증을 통과한 퀴즈 설정: 세션이 시작되면 바뀌지 않습니다.
///
/// 필드가 모두 비공개(private)라서 `QuizConfig::new()`를 거치지 않고는
/// 만들 수 없습니다. 즉, 이 타입의 값이 존재한다면 항상 유효한 설정입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizConfig {
    topic: String,
    question_count: u32,
    duration_minutes: u32,
}

impl QuizConfig {
    /// 입력값을 검증하여 설정을 만듭니다.
    ///
    /// # 에러
    /// - 주제가 비어 있거나 공백뿐이면 `ConfigError::EmptyTopic`
    /// - 문제 수가 0 이하이면 `ConfigError::InvalidQuestionCount`
    /// - 제한 시간이 0 이하이면 `ConfigError::InvalidDuration`
    pub fn new(topic: &str, question_count: i64, duration_minutes: i64) -> Result<Self, ConfigError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(ConfigError::EmptyTopic);
        }
        // u32::try_from: 음수나 너무 큰 값이면 Err를 돌려줍니다.
        let question_count = u32::try_from(question_count)
            .ok()
            .filter(|n| *n > 0)
            .ok_or(ConfigError::InvalidQuestionCount(question_count))?;
        let duration_minutes = u32::try_from(duration_minutes)
            .ok()
            .filter(|n| *n > 0)
            .ok_or(ConfigError::InvalidDuration(duration_minutes))?;

        Ok(Self {
            topic: topic.to_string(),
            question_count,
            duration_minutes,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    /// 제한 시간을 초 단위로 반환합니다.
    pub fn duration_seconds(&self) -> u32 {
        self.duration_minutes.saturating_mul(60)
    }
}

/// 퀴즈 설정 요청: `POST /api/v1/sessions/{id}/configure`의 요청 본문입니다.
///
/// 숫자 필드를 `i64`로 받는 이유는 음수 입력도 역직렬화한 뒤
/// `QuizConfig::new()`에서 설정 에러(400)로 돌려주기 위해서입니다.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureRequest {
    pub topic: String,
    pub question_count: i64,
    pub duration_minutes: i64,
}

/// 홈 화면 폼이 보여주는 선택지: `GET /api/v1/quiz/options`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOptions {
    pub question_counts: Vec<u32>,
    pub durations: Vec<u32>,
    pub default_question_count: u32,
    pub default_duration: u32,
}

impl Default for QuizOptions {
    fn default() -> Self {
        Self {
            question_counts: QUESTION_COUNT_CHOICES.to_vec(),
            durations: DURATION_CHOICES.to_vec(),
            default_question_count: 5,
            default_duration: 10,
        }
    }
}
