//! # Gemini 생성형 AI 클라이언트
//!
//! `generateContent` REST API를 호출하여 프롬프트에 대한 텍스트를 받아옵니다.
//!
//! ```text
//! POST {base_url}/v1beta/models/{model}:generateContent
//! x-goog-api-key: {api_key}
//! { "contents": [ { "parts": [ { "text": "<prompt>" } ] } ] }
//! ```

use crate::config::GeminiConfig;
use crate::error::GenerationError;
use crate::services::question_source::TextGenerator;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;

/// API 키는 쿼리 문자열 대신 이 헤더로 보냅니다.
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// 첫 번째 후보의 텍스트 조각들을 이어 붙입니다.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Gemini REST 클라이언트
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl GeminiClient {
    /// 설정으로부터 클라이언트를 만듭니다.
    ///
    /// # 에러
    /// - API 키가 없으면 `GenerationError::Unconfigured`
    /// - HTTP 클라이언트 생성 실패 시 `GenerationError::Http`
    pub fn new(config: &GeminiConfig) -> Result<Self, GenerationError> {
        let api_key = config.api_key.clone().ok_or(GenerationError::Unconfigured)?;
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );

        Ok(Self {
            http,
            api_key,
            endpoint,
        })
    }

    async fn generate_content(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<GenerateResponse>()
            .await?
            .into_text()
            .ok_or(GenerationError::EmptyResponse)
    }
}

impl TextGenerator for GeminiClient {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, GenerationError>> {
        Box::pin(self.generate_content(prompt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn gemini_config(api_key: Option<&str>) -> GeminiConfig {
        GeminiConfig {
            api_key: api_key.map(str::to_string),
            model: "gemini-pro".to_string(),
            base_url: "https://example.test/".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn missing_key_is_unconfigured() {
        let err = GeminiClient::new(&gemini_config(None)).unwrap_err();
        assert!(matches!(err, GenerationError::Unconfigured));
    }

    #[test]
    fn builds_generate_content_endpoint() {
        let client = GeminiClient::new(&gemini_config(Some("abcdefghijklmnopqrstuvwxyz"))).unwrap();
        assert_eq!(
            client.endpoint,
            "https://example.test/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[tokio::test]
    async fn transport_error_does_not_expose_key() {
        let secret = "SECRETKEY0123456789abcdef";
        let config = GeminiConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            ..gemini_config(Some(secret))
        };
        let client = GeminiClient::new(&config).unwrap();

        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(err, GenerationError::Http(_)));
        assert!(!err.to_string().contains(secret));
        assert!(!format!("{err:?}").contains(secret));
    }

    #[test]
    fn joins_text_parts_of_first_candidate() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"[1,"},{"text":"2]"}]}},
                      {"content":{"parts":[{"text":"ignored"}]}}]}"#;
        let response: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.into_text().as_deref(), Some("[1,2]"));
    }

    #[test]
    fn blocked_response_has_no_text() {
        let response: GenerateResponse = serde_json::from_str(r#"{"candidates":[{}]}"#).unwrap();
        assert!(response.into_text().is_none());

        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(response.into_text().is_none());
    }
}
