//! # 문제 출처(Question Source)
//!
//! 주제와 문제 수를 받아 객관식 문제 목록을 돌려줍니다.
//!
//! 1. 생성형 AI에 JSON 배열 형식의 문제를 요청합니다.
//! 2. 응답 텍스트에서 첫 `[`부터 마지막 `]`까지를 잘라 JSON으로 파싱합니다.
//! 3. 본문, 네 개의 선택지, 정답 라벨이 모두 있는 항목만 남깁니다.
//! 4. 남은 항목에 `q1`, `q2`, ... 순서대로 ID를 다시 붙입니다.
//!
//! AI가 설정되지 않았거나, 호출이 실패했거나, 쓸 수 있는 문제가 하나도 없으면
//! 주제 이름을 끼워 넣은 고정 폴백 문제 목록을 사용합니다.
//! 이 경우에도 에러를 반환하지 않고, 화면 표시용 안내 문구(`fallback_notice`)만 함께 돌려줍니다.

use crate::config::GeminiConfig;
use crate::error::{ConfigError, GenerationError};
use crate::models::{ChoiceLabel, Question, QuestionOptions};
use crate::services::gemini::GeminiClient;
use futures::future::BoxFuture;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// 프롬프트를 받아 텍스트를 생성하는 외부 서비스
///
/// `BoxFuture`를 반환하므로 `Arc<dyn TextGenerator>`처럼 트레이트 객체로 쓸 수 있습니다.
pub trait TextGenerator: Send + Sync {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, GenerationError>>;
}

/// 폴백 문제를 사용할 때 화면에 보여줄 안내 문구
pub const FALLBACK_NOTICE: &str =
    "Could not generate questions with AI; showing built-in questions instead.";

/// 문제 불러오기 결과
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub questions: Vec<Question>,
    /// 폴백 문제를 사용했다면 그 이유 (화면 표시용)
    pub fallback_notice: Option<String>,
}

/// AI 응답 파싱 실패 사유
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("response contained no JSON array")]
    NoArray,
    #[error("response JSON could not be parsed: {0}")]
    InvalidJson(String),
    #[error("response JSON is not an array")]
    NotAnArray,
    #[error("response contained no valid questions")]
    NoValidQuestions,
}

/// AI가 돌려주는 문제 한 개: 모든 필드가 빠질 수 있다고 보고 느슨하게 받습니다.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    question: Option<String>,
    options: Option<RawOptions>,
    correct_answer: Option<String>,
    explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawOptions {
    #[serde(rename = "A")]
    a: Option<String>,
    #[serde(rename = "B")]
    b: Option<String>,
    #[serde(rename = "C")]
    c: Option<String>,
    #[serde(rename = "D")]
    d: Option<String>,
}

/// 비어 있지 않은 문자열만 통과시킵니다.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn parse_label(raw: &str) -> Option<ChoiceLabel> {
    match raw.trim() {
        "A" | "a" => Some(ChoiceLabel::A),
        "B" | "b" => Some(ChoiceLabel::B),
        "C" | "c" => Some(ChoiceLabel::C),
        "D" | "d" => Some(ChoiceLabel::D),
        _ => None,
    }
}

impl RawQuestion {
    /// 필수 항목이 모두 있으면 `Question`으로 바꿉니다. ID는 호출하는 쪽에서 붙입니다.
    fn into_question(self, id: String) -> Option<Question> {
        let question = non_blank(self.question)?;
        let options = self.options?;
        let options = QuestionOptions {
            a: non_blank(options.a)?,
            b: non_blank(options.b)?,
            c: non_blank(options.c)?,
            d: non_blank(options.d)?,
        };
        let correct_answer = parse_label(self.correct_answer.as_deref()?)?;

        Some(Question {
            id,
            question,
            options,
            correct_answer,
            explanation: non_blank(self.explanation),
        })
    }
}

/// AI에게 보낼 프롬프트를 만듭니다.
pub fn build_prompt(topic: &str, count: u32) -> String {
    format!(
        r#"Generate {count} multiple choice questions about "{topic}".

For each question, provide:
1. A clear and concise question
2. Four answer options labeled A, B, C, and D
3. The correct answer (A, B, C, or D)
4. A brief explanation of why the answer is correct

Format the response as a JSON array with the following structure:
[
  {{
    "id": "q1",
    "question": "What is...?",
    "options": {{
      "A": "Option A",
      "B": "Option B",
      "C": "Option C",
      "D": "Option D"
    }},
    "correctAnswer": "A",
    "explanation": "Brief explanation of why A is correct"
  }}
]

Make sure the questions are varied in difficulty and cover different aspects of the topic. Only return valid JSON."#
    )
}

/// 텍스트에서 첫 `[`부터 마지막 `]`까지의 부분 문자열을 찾습니다.
///
/// AI 응답 앞뒤에 붙는 설명 문장이나 코드 블록 표시(```json)를 걸러냅니다.
pub fn extract_json_array(text: &str) -> Option<&str> {
    static ARRAY: OnceLock<Regex> = OnceLock::new();
    // (?s): `.`이 줄바꿈도 포함하도록 합니다. `.*`는 탐욕적이므로 마지막 `]`까지 잡습니다.
    let re = ARRAY.get_or_init(|| Regex::new(r"(?s)\[.*\]").expect("static regex is valid"));
    re.find(text).map(|m| m.as_str())
}

/// AI 응답 텍스트를 문제 목록으로 파싱합니다.
///
/// 필수 항목이 빠진 문제는 조용히 버리고, 남은 문제에 `q1`부터 ID를 새로 붙입니다.
pub fn parse_questions(text: &str) -> Result<Vec<Question>, ParseError> {
    let array = extract_json_array(text).ok_or(ParseError::NoArray)?;
    let value: Value =
        serde_json::from_str(array).map_err(|e| ParseError::InvalidJson(e.to_string()))?;
    let Value::Array(items) = value else {
        return Err(ParseError::NotAnArray);
    };

    let questions: Vec<Question> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<RawQuestion>(item).ok())
        .filter_map(|raw| raw.into_question(String::new()))
        .enumerate()
        .map(|(i, q)| Question {
            id: format!("q{}", i + 1),
            ..q
        })
        .collect();

    if questions.is_empty() {
        return Err(ParseError::NoValidQuestions);
    }
    Ok(questions)
}

/// 주제 이름을 끼워 넣은 고정 폴백 문제 목록
///
/// 템플릿은 다섯 개뿐이며, 요청한 수보다 적으면 있는 만큼만 돌려줍니다. (채워 넣지 않음)
pub fn fallback_questions(topic: &str, count: u32) -> Vec<Question> {
    let templates: [(String, [&str; 4], ChoiceLabel, &str); 5] = [
        (
            format!("What is the primary purpose of {topic}?"),
            [
                "To solve complex problems",
                "To create entertainment",
                "To generate random data",
                "To slow down processes",
            ],
            ChoiceLabel::A,
            "The primary purpose of most technologies is to solve complex problems efficiently.",
        ),
        (
            format!("Which of the following is NOT typically associated with {topic}?"),
            ["Innovation", "Efficiency", "Randomness", "Problem-solving"],
            ChoiceLabel::C,
            "Randomness is not typically a goal in most technological applications.",
        ),
        (
            format!("How does {topic} contribute to modern development?"),
            [
                "By increasing complexity",
                "By improving productivity",
                "By reducing functionality",
                "By limiting options",
            ],
            ChoiceLabel::B,
            "Most technologies aim to improve productivity and efficiency.",
        ),
        (
            format!("What is a key benefit of understanding {topic}?"),
            [
                "Increased confusion",
                "Better decision making",
                "Reduced capabilities",
                "Slower processes",
            ],
            ChoiceLabel::B,
            "Understanding any topic leads to better decision making.",
        ),
        (
            format!("Which approach is most effective when working with {topic}?"),
            [
                "Avoiding it completely",
                "Learning and practicing",
                "Ignoring best practices",
                "Rushing through implementation",
            ],
            ChoiceLabel::B,
            "Learning and practicing is the most effective approach for any skill.",
        ),
    ];

    templates
        .into_iter()
        .take(count as usize)
        .enumerate()
        .map(|(i, (question, [a, b, c, d], correct_answer, explanation))| Question {
            id: format!("q{}", i + 1),
            question,
            options: QuestionOptions {
                a: a.to_string(),
                b: b.to_string(),
                c: c.to_string(),
                d: d.to_string(),
            },
            correct_answer,
            explanation: Some(explanation.to_string()),
        })
        .collect()
}

/// 생성형 AI와 폴백 정책을 묶은 문제 출처
#[derive(Clone)]
pub struct QuestionSource {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl QuestionSource {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator: Some(generator),
        }
    }

    /// AI 없이 항상 폴백 문제만 쓰는 출처
    pub fn offline() -> Self {
        Self { generator: None }
    }

    /// Gemini 설정으로부터 출처를 만듭니다. API 키가 없으면 `offline()`과 같습니다.
    pub fn from_config(config: &GeminiConfig) -> Result<Self, GenerationError> {
        match GeminiClient::new(config) {
            Ok(client) => {
                tracing::info!("Question source: Gemini model '{}'", config.model);
                Ok(Self::new(Arc::new(client)))
            }
            Err(GenerationError::Unconfigured) => {
                tracing::warn!(
                    "Using fallback questions - please configure a valid Gemini API key"
                );
                Ok(Self::offline())
            }
            Err(e) => Err(e),
        }
    }

    /// 문제를 불러옵니다.
    ///
    /// AI 쪽 실패는 모두 폴백 문제로 흡수되며, 에러는 `count`가 0일 때만 반환합니다.
    pub async fn fetch(&self, topic: &str, count: u32) -> Result<FetchOutcome, ConfigError> {
        if count == 0 {
            return Err(ConfigError::InvalidQuestionCount(0));
        }

        let Some(generator) = &self.generator else {
            return Ok(Self::fallback(topic, count, "no valid Gemini API key is configured"));
        };

        let prompt = build_prompt(topic, count);
        let text = match generator.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Error generating quiz questions: {}", e);
                return Ok(Self::fallback(topic, count, &e.to_string()));
            }
        };
        tracing::debug!("Raw API response: {}", text);

        match parse_questions(&text) {
            Ok(mut questions) => {
                questions.truncate(count as usize);
                tracing::info!(
                    "Generated {} questions about '{}'",
                    questions.len(),
                    topic
                );
                Ok(FetchOutcome {
                    questions,
                    fallback_notice: None,
                })
            }
            Err(e) => Ok(Self::fallback(topic, count, &e.to_string())),
        }
    }

    /// 실패 사유는 서버 로그에만 남기고, 화면에는 고정 안내 문구만 내려보냅니다.
    fn fallback(topic: &str, count: u32, reason: &str) -> FetchOutcome {
        tracing::warn!("Using fallback questions: {}", reason);
        FetchOutcome {
            questions: fallback_questions(topic, count),
            fallback_notice: Some(FALLBACK_NOTICE.to_string()),
        }
    }
}
