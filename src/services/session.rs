//! # 퀴즈 세션 상태 머신
//!
//! 한 번의 퀴즈 응시(설정 → 문제 불러오기 → 시간 제한 응답 → 채점 → 결과 확인)를
//! 표현하는 순수한 상태 머신입니다. I/O나 시계에 접근하지 않으며,
//! 상태는 오직 `Session::apply(Event)`로만 바뀝니다.
//!
//! 현재 상태에서 허용되지 않는 이벤트는 에러가 아니라 `Outcome::Ignored`로 무시됩니다.

use crate::models::{
    feedback_for_score, format_time, ChoiceLabel, Phase, Question, QuestionReview, QuestionView,
    QuizConfig, QuizResult, SessionSnapshot, TimeUrgency,
};
use std::collections::HashMap;
use thiserror::Error;

/// 세션에 적용할 수 있는 이벤트
#[derive(Debug, Clone)]
pub enum Event {
    /// 설정을 저장하고 문제 불러오기를 시작합니다. (`Idle`에서만)
    Configure(QuizConfig),
    /// 문제 불러오기 성공. `attempt`가 현재 시도 번호와 다르면 버립니다.
    QuestionsLoaded {
        attempt: u64,
        questions: Vec<Question>,
        notice: Option<String>,
    },
    /// 문제 불러오기 실패. `attempt`가 현재 시도 번호와 다르면 버립니다.
    LoadFailed { attempt: u64, message: String },
    Start,
    SelectAnswer {
        question_id: String,
        answer: ChoiceLabel,
    },
    GoToQuestion(usize),
    Next,
    Previous,
    /// 1초 경과. 남은 시간이 0이 되면 같은 전이 안에서 채점까지 끝냅니다.
    Tick,
    Submit,
    Reset,
}

/// 이벤트가 무시된 이유
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IgnoreReason {
    #[error("questions are still loading")]
    LoadInProgress,
    #[error("a quiz is already configured; reset first")]
    AlreadyConfigured,
    #[error("response belongs to a previous request")]
    StaleResponse,
    #[error("questions are not loaded yet")]
    NotReady,
    #[error("quiz has already started")]
    AlreadyStarted,
    #[error("quiz is not in progress")]
    NotActive,
    #[error("unknown question id")]
    UnknownQuestion,
    #[error("already at the last question")]
    AtLastQuestion,
    #[error("already at the first question")]
    AtFirstQuestion,
    #[error("time is already up")]
    TimeExhausted,
}

/// 이벤트 적용 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Ignored(IgnoreReason),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

/// 한 번의 퀴즈 응시 기록
#[derive(Debug, Clone)]
pub struct Session {
    phase: Phase,
    config: Option<QuizConfig>,
    questions: Vec<Question>,
    current_index: usize,
    answers: HashMap<String, ChoiceLabel>,
    remaining_seconds: u32,
    score: f64,
    last_error: Option<String>,
    /// 문제 불러오기 시도 번호: 리셋해도 0으로 돌아가지 않습니다.
    attempt: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            config: None,
            questions: Vec::new(),
            current_index: 0,
            answers: HashMap::new(),
            remaining_seconds: 0,
            score: 0.0,
            last_error: None,
            attempt: 0,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> Option<&QuizConfig> {
        self.config.as_ref()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn answer(&self, question_id: &str) -> Option<ChoiceLabel> {
        self.answers.get(question_id).copied()
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn started(&self) -> bool {
        matches!(self.phase, Phase::Active | Phase::Finished)
    }

    pub fn finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// 현재(가장 최근) 문제 불러오기 시도 번호
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    pub fn all_answered(&self) -> bool {
        !self.questions.is_empty() && self.answers.len() == self.questions.len()
    }

    /// 카운트다운이 돌아야 하는 상태인지
    pub fn timer_running(&self) -> bool {
        self.phase == Phase::Active && self.remaining_seconds > 0
    }

    /// 이벤트를 적용합니다. 상태를 바꾸는 유일한 경로입니다.
    pub fn apply(&mut self, event: Event) -> Outcome {
        use IgnoreReason::*;

        match event {
            Event::Configure(config) => match self.phase {
                Phase::Idle => {
                    let attempt = self.attempt + 1;
                    *self = Self {
                        phase: Phase::Loading,
                        remaining_seconds: config.duration_seconds(),
                        config: Some(config),
                        attempt,
                        ..Self::default()
                    };
                    Outcome::Applied
                }
                Phase::Loading => Outcome::Ignored(LoadInProgress),
                _ => Outcome::Ignored(AlreadyConfigured),
            },

            Event::QuestionsLoaded {
                attempt,
                questions,
                notice,
            } => {
                if !self.awaiting(attempt) {
                    return Outcome::Ignored(StaleResponse);
                }
                if questions.is_empty() {
                    self.fail_load("no questions were returned".to_string());
                    return Outcome::Applied;
                }
                self.questions = questions;
                self.current_index = 0;
                self.last_error = notice;
                self.phase = Phase::Ready;
                Outcome::Applied
            }

            Event::LoadFailed { attempt, message } => {
                if !self.awaiting(attempt) {
                    return Outcome::Ignored(StaleResponse);
                }
                self.fail_load(message);
                Outcome::Applied
            }

            Event::Start => match self.phase {
                Phase::Ready => {
                    self.phase = Phase::Active;
                    Outcome::Applied
                }
                Phase::Active | Phase::Finished => Outcome::Ignored(AlreadyStarted),
                Phase::Idle | Phase::Loading => Outcome::Ignored(NotReady),
            },

            Event::SelectAnswer {
                question_id,
                answer,
            } => {
                if self.phase != Phase::Active {
                    return Outcome::Ignored(NotActive);
                }
                if !self.questions.iter().any(|q| q.id == question_id) {
                    return Outcome::Ignored(UnknownQuestion);
                }
                self.answers.insert(question_id, answer);
                Outcome::Applied
            }

            Event::GoToQuestion(index) => {
                if self.phase != Phase::Active {
                    return Outcome::Ignored(NotActive);
                }
                self.current_index = index.min(self.questions.len().saturating_sub(1));
                Outcome::Applied
            }

            Event::Next => {
                if self.phase != Phase::Active {
                    return Outcome::Ignored(NotActive);
                }
                if self.current_index + 1 >= self.questions.len() {
                    return Outcome::Ignored(AtLastQuestion);
                }
                self.current_index += 1;
                Outcome::Applied
            }

            Event::Previous => {
                if self.phase != Phase::Active {
                    return Outcome::Ignored(NotActive);
                }
                if self.current_index == 0 {
                    return Outcome::Ignored(AtFirstQuestion);
                }
                self.current_index -= 1;
                Outcome::Applied
            }

            Event::Tick => {
                if self.phase != Phase::Active {
                    return Outcome::Ignored(NotActive);
                }
                if self.remaining_seconds == 0 {
                    return Outcome::Ignored(TimeExhausted);
                }
                self.remaining_seconds -= 1;
                if self.remaining_seconds == 0 {
                    // 시간 초과 자동 제출
                    self.finish();
                }
                Outcome::Applied
            }

            Event::Submit => {
                if self.phase != Phase::Active {
                    return Outcome::Ignored(NotActive);
                }
                self.finish();
                Outcome::Applied
            }

            Event::Reset => {
                let attempt = self.attempt + 1;
                *self = Self {
                    attempt,
                    ..Self::default()
                };
                Outcome::Applied
            }
        }
    }

    fn awaiting(&self, attempt: u64) -> bool {
        self.phase == Phase::Loading && attempt == self.attempt
    }

    fn fail_load(&mut self, message: String) {
        self.last_error = Some(message);
        self.phase = Phase::Idle;
    }

    fn correct_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| q.is_correct(self.answer(&q.id)))
            .count()
    }

    /// 채점하고 종료 상태로 넘어갑니다. 점수는 이후 다시 계산되지 않습니다.
    fn finish(&mut self) {
        self.score = if self.questions.is_empty() {
            0.0
        } else {
            100.0 * self.correct_count() as f64 / self.questions.len() as f64
        };
        self.phase = Phase::Finished;
    }

    /// 화면에 내려줄 스냅샷을 만듭니다.
    pub fn snapshot(&self) -> SessionSnapshot {
        let reveal = self.finished();
        SessionSnapshot {
            phase: self.phase,
            config: self.config.clone(),
            questions: self
                .questions
                .iter()
                .map(|q| QuestionView::from_question(q, reveal))
                .collect(),
            current_index: self.current_index,
            answers: self.answers.clone(),
            remaining_seconds: self.remaining_seconds,
            remaining_display: format_time(self.remaining_seconds),
            urgency: TimeUrgency::from_remaining(self.remaining_seconds),
            answered_count: self.answers.len(),
            all_answered: self.all_answered(),
            started: self.started(),
            finished: self.finished(),
            score: self.score,
            loading: self.loading(),
            last_error: self.last_error.clone(),
        }
    }

    /// 채점 결과를 만듭니다. 종료되지 않은 세션이면 `None`입니다.
    pub fn result(&self) -> Option<QuizResult> {
        if !self.finished() {
            return None;
        }
        let config = self.config.as_ref()?;

        let review: Vec<QuestionReview> = self
            .questions
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let user_answer = self.answer(&q.id);
                QuestionReview {
                    number: i + 1,
                    id: q.id.clone(),
                    question: q.question.clone(),
                    options: q.options.clone(),
                    user_answer,
                    correct_answer: q.correct_answer,
                    is_correct: q.is_correct(user_answer),
                    explanation: q.explanation.clone(),
                }
            })
            .collect();

        let correct_answers = review.iter().filter(|r| r.is_correct).count();
        let unanswered = review.iter().filter(|r| r.user_answer.is_none()).count();
        let time_taken_seconds = config
            .duration_seconds()
            .saturating_sub(self.remaining_seconds);

        Some(QuizResult {
            topic: config.topic().to_string(),
            total_questions: review.len(),
            correct_answers,
            incorrect_answers: review.len() - correct_answers,
            unanswered,
            score: self.score,
            time_taken_seconds,
            time_taken_display: format_time(time_taken_seconds),
            feedback: feedback_for_score(self.score),
            review,
        })
    }
}
