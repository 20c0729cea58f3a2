#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use futures::future::BoxFuture;
use quizmaster::{
    error::GenerationError,
    router,
    services::{QuestionSource, SessionRegistry, TextGenerator},
    AppState,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// 정해 둔 텍스트를 (선택적으로 지연 후) 돌려주는 가짜 생성기
pub struct StubGenerator {
    pub response: String,
    pub delay: Duration,
}

impl TextGenerator for StubGenerator {
    fn generate<'a>(&'a self, _prompt: &'a str) -> BoxFuture<'a, Result<String, GenerationError>> {
        Box::pin(async move {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(self.response.clone())
        })
    }
}

/// 정답이 모두 B인 문제 `n`개를 설명 문장으로 감싼 AI 응답
pub fn provider_response(n: usize) -> String {
    let items: Vec<String> = (1..=n)
        .map(|i| {
            format!(
                r#"{{"id": "dup", "question": "Question {i}?",
                    "options": {{"A": "a{i}", "B": "b{i}", "C": "c{i}", "D": "d{i}"}},
                    "correctAnswer": "B", "explanation": "B is right"}}"#
            )
        })
        .collect();
    format!("Here you go:\n```json\n[{}]\n```\nEnjoy!", items.join(","))
}

pub fn stub_source(response: String, delay: Duration) -> QuestionSource {
    QuestionSource::new(Arc::new(StubGenerator { response, delay }))
}

pub fn app(source: QuestionSource) -> Router {
    router(AppState {
        registry: SessionRegistry::new(source, Duration::from_secs(1), Duration::from_secs(1800)),
    })
}

/// 요청을 보내고 상태 코드와 JSON 본문(없으면 Null)을 돌려줍니다.
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            req = req.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let resp = app
        .clone()
        .oneshot(req.body(body).expect("request build should succeed"))
        .await
        .expect("router should respond");

    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be JSON")
    };
    (status, json)
}

/// 새 세션을 만들고 ID를 돌려줍니다.
pub async fn create_session(app: &Router) -> String {
    let (status, body) = send(app, Method::POST, "/api/v1/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().expect("id should be a string").to_string()
}
