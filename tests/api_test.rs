mod common;

use axum::http::{Method, StatusCode};
use common::{app, create_session, provider_response, send, stub_source};
use quizmaster::services::QuestionSource;
use serde_json::json;
use std::time::Duration;

fn configure_body(topic: &str, count: i64, minutes: i64) -> serde_json::Value {
    json!({ "topic": topic, "questionCount": count, "durationMinutes": minutes })
}

#[tokio::test]
async fn health_and_options() {
    let app = app(QuestionSource::offline());

    let (status, body) = send(&app, Method::GET, "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, Method::GET, "/api/v1/quiz/options", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["questionCounts"], json!([5, 10, 15, 20]));
    assert_eq!(body["defaultDuration"], 10);
}

#[tokio::test]
async fn full_quiz_flow_with_generated_questions() {
    let app = app(stub_source(provider_response(3), Duration::ZERO));
    let id = create_session(&app).await;
    let base = format!("/api/v1/sessions/{id}");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("{base}/configure"),
        Some(configure_body("Physics", 3, 5)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], true);
    let session = &body["session"];
    assert_eq!(session["phase"], "ready");
    assert_eq!(session["remainingSeconds"], 300);
    assert_eq!(session["remainingDisplay"], "5:00");
    assert_eq!(session["currentIndex"], 0);
    assert_eq!(session["lastError"], serde_json::Value::Null);
    assert_eq!(session["questions"][0]["id"], "q1");
    assert_eq!(session["questions"][2]["id"], "q3");
    assert!(session["questions"][0].get("correctAnswer").is_none());

    let (_, body) = send(&app, Method::POST, &format!("{base}/start"), None).await;
    assert_eq!(body["applied"], true);
    assert_eq!(body["session"]["phase"], "active");

    send(&app, Method::PUT, &format!("{base}/answers/q1"), Some(json!({ "answer": "B" }))).await;
    send(&app, Method::PUT, &format!("{base}/answers/q2"), Some(json!({ "answer": "B" }))).await;

    // 모든 문제에 답하기 전에는 제출할 수 없습니다.
    let (status, body) = send(&app, Method::POST, &format!("{base}/submit"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");

    let (_, body) = send(&app, Method::PUT, &format!("{base}/answers/q3"), Some(json!({ "answer": "D" }))).await;
    assert_eq!(body["session"]["allAnswered"], true);

    let (status, body) = send(&app, Method::POST, &format!("{base}/submit"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["phase"], "finished");
    let score = body["session"]["score"].as_f64().unwrap();
    assert!((score - 200.0 / 3.0).abs() < 1e-9);
    assert_eq!(body["session"]["questions"][0]["correctAnswer"], "B");

    let (status, body) = send(&app, Method::GET, &format!("{base}/result"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalQuestions"], 3);
    assert_eq!(body["correctAnswers"], 2);
    assert_eq!(body["incorrectAnswers"], 1);
    assert_eq!(body["review"][2]["userAnswer"], "D");
    assert_eq!(body["review"][2]["isCorrect"], false);
    assert_eq!(body["review"][2]["explanation"], "B is right");
    assert_eq!(body["feedback"], "Not bad! Room for improvement.");
}

#[tokio::test]
async fn offline_source_uses_fallback_and_reports_it() {
    let app = app(QuestionSource::offline());
    let id = create_session(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/sessions/{id}/configure"),
        Some(configure_body("History", 20, 10)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let session = &body["session"];
    assert_eq!(session["phase"], "ready");
    assert_eq!(session["questions"].as_array().unwrap().len(), 5);
    assert!(session["lastError"].as_str().is_some());
    assert_eq!(
        session["questions"][0]["question"],
        "What is the primary purpose of History?"
    );
}

#[tokio::test(start_paused = true)]
async fn configure_while_loading_is_a_conflict() {
    let app = app(stub_source(provider_response(2), Duration::from_secs(10)));
    let id = create_session(&app).await;
    let uri = format!("/api/v1/sessions/{id}/configure");

    let first = {
        let app = app.clone();
        let uri = uri.clone();
        tokio::spawn(async move {
            send(&app, Method::POST, &uri, Some(configure_body("Physics", 2, 5))).await
        })
    };

    // 첫 요청이 Loading에 들어갈 때까지 기다립니다.
    let session_uri = format!("/api/v1/sessions/{id}");
    let mut loading = false;
    for _ in 0..50 {
        let (_, snapshot) = send(&app, Method::GET, &session_uri, None).await;
        if snapshot["phase"] == "loading" {
            loading = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(loading);

    let (status, body) = send(&app, Method::POST, &uri, Some(configure_body("Biology", 2, 5))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");
    assert_eq!(body["error"]["message"], "questions are still loading");

    let (status, body) = first.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["phase"], "ready");
    assert_eq!(body["session"]["config"]["topic"], "Physics");
}

#[tokio::test]
async fn invalid_configuration_is_rejected() {
    let app = app(QuestionSource::offline());
    let id = create_session(&app).await;
    let uri = format!("/api/v1/sessions/{id}/configure");

    for body in [
        configure_body("   ", 5, 10),
        configure_body("Rust", 0, 10),
        configure_body("Rust", 5, -1),
    ] {
        let (status, resp) = send(&app, Method::POST, &uri, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp["error"]["code"], "bad_request");
    }

    let (_, snapshot) = send(&app, Method::GET, &format!("/api/v1/sessions/{id}"), None).await;
    assert_eq!(snapshot["phase"], "idle");
}

#[tokio::test]
async fn transitions_outside_their_phase_are_ignored() {
    let app = app(QuestionSource::offline());
    let id = create_session(&app).await;
    let base = format!("/api/v1/sessions/{id}");

    let (status, body) = send(&app, Method::POST, &format!("{base}/next"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], false);
    assert_eq!(body["reason"], "quiz is not in progress");

    send(&app, Method::POST, &format!("{base}/configure"), Some(configure_body("Rust", 2, 5))).await;

    let (_, body) = send(&app, Method::PUT, &format!("{base}/answers/q1"), Some(json!({ "answer": "A" }))).await;
    assert_eq!(body["applied"], false);

    send(&app, Method::POST, &format!("{base}/start"), None).await;
    let (_, body) = send(&app, Method::POST, &format!("{base}/previous"), None).await;
    assert_eq!(body["applied"], false);
    assert_eq!(body["session"]["currentIndex"], 0);

    let (_, body) = send(&app, Method::POST, &format!("{base}/goto/7"), None).await;
    assert_eq!(body["applied"], true);
    assert_eq!(body["session"]["currentIndex"], 1);

    let (status, _) = send(&app, Method::GET, &format!("{base}/result"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn reset_and_delete() {
    let app = app(QuestionSource::offline());
    let id = create_session(&app).await;
    let base = format!("/api/v1/sessions/{id}");

    send(&app, Method::POST, &format!("{base}/configure"), Some(configure_body("Rust", 3, 5))).await;
    send(&app, Method::POST, &format!("{base}/start"), None).await;

    let (_, body) = send(&app, Method::POST, &format!("{base}/reset"), None).await;
    assert_eq!(body["applied"], true);
    assert_eq!(body["session"]["phase"], "idle");
    assert_eq!(body["session"]["config"], serde_json::Value::Null);
    assert_eq!(body["session"]["questions"], json!([]));

    let (status, _) = send(&app, Method::DELETE, &base, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, &base, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");

    let (status, _) = send(&app, Method::DELETE, &base, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
