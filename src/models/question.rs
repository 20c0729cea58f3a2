//! # 퀴즈 문제 모델 정의
//!
//! 생성형 AI가 만들어 주거나 폴백 목록에서 가져온 객관식 문제의 데이터 구조입니다.
//! JSON 필드 이름은 AI에게 요청하는 응답 형식과 그대로 일치합니다:
//!
//! ```text
//! { "id": "q1", "question": "...", "options": { "A": "...", "B": "...", "C": "...", "D": "..." },
//!   "correctAnswer": "A", "explanation": "..." }
//! ```

use serde::{Deserialize, Serialize};

/// 선택지 라벨: 항상 A, B, C, D 네 가지 중 하나입니다.
///
/// serde는 enum variant 이름을 그대로 문자열로 사용하므로
/// JSON에서는 `"A"`, `"B"`처럼 표현됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChoiceLabel {
    A,
    B,
    C,
    D,
}

/// 네 개의 선택지 텍스트
///
/// `#[serde(rename = "A")]`: Rust 필드 이름(`a`)과 JSON 키(`"A"`)를 연결합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOptions {
    #[serde(rename = "A")]
    pub a: String,
    #[serde(rename = "B")]
    pub b: String,
    #[serde(rename = "C")]
    pub c: String,
    #[serde(rename = "D")]
    pub d: String,
}

/// 객관식 문제 한 개: 생성된 뒤에는 변경되지 않습니다.
///
/// 세션은 `Vec<Question>`으로 문제를 보관하며, 벡터 순서가 곧 출제 순서입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// 세션 안에서 유일한 ID ("q1", "q2", ...)
    pub id: String,
    /// 문제 본문
    pub question: String,
    /// A~D 네 개의 선택지
    pub options: QuestionOptions,
    /// 정답 라벨
    pub correct_answer: ChoiceLabel,
    /// 정답 해설 (선택 항목)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    /// 주어진 답이 정답인지 확인합니다. `None`(미응답)은 항상 오답입니다.
    pub fn is_correct(&self, answer: Option<ChoiceLabel>) -> bool {
        answer == Some(self.correct_answer)
    }
}

/// 퀴즈 진행 중 화면에 내려주는 문제: 정답과 해설을 뺀 형태입니다.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: String,
    pub question: String,
    pub options: QuestionOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<ChoiceLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl QuestionView {
    /// `reveal`이 false이면 정답/해설을 숨깁니다.
    pub fn from_question(question: &Question, reveal: bool) -> Self {
        Self {
            id: question.id.clone(),
            question: question.question.clone(),
            options: question.options.clone(),
            correct_answer: reveal.then_some(question.correct_answer),
            explanation: if reveal { question.explanation.clone() } else { None },
        }
    }
}
