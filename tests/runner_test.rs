mod common;

use common::{provider_response, stub_source};
use quizmaster::{
    models::{ChoiceLabel, Phase, QuizConfig, TimeUrgency},
    services::{Event, IgnoreReason, Outcome, QuestionSource, SessionHandle},
};
use std::time::Duration;
use tokio::time::sleep;

const TICK: Duration = Duration::from_secs(1);

async fn active_handle(source: QuestionSource, count: i64, minutes: i64) -> SessionHandle {
    let handle = SessionHandle::spawn(source, TICK);
    let config = QuizConfig::new("History", count, minutes).unwrap();
    let transition = handle.configure(config).await.unwrap();
    assert_eq!(transition.snapshot.phase, Phase::Ready);

    let transition = handle.apply(Event::Start).await.unwrap();
    assert_eq!(transition.outcome, Outcome::Applied);
    handle
}

#[tokio::test(start_paused = true)]
async fn countdown_auto_submits_when_time_runs_out() {
    let handle = active_handle(QuestionSource::offline(), 5, 1).await;
    assert_eq!(handle.snapshot().remaining_seconds, 60);

    sleep(Duration::from_millis(59_500)).await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.phase, Phase::Active);
    assert_eq!(snapshot.remaining_seconds, 1);
    assert_eq!(snapshot.urgency, TimeUrgency::Critical);

    sleep(TICK).await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.phase, Phase::Finished);
    assert!(snapshot.finished);
    assert_eq!(snapshot.remaining_seconds, 0);
    assert_eq!(snapshot.score, 0.0);

    let result = handle.result().await.unwrap().expect("finished quiz has a result");
    assert_eq!(result.unanswered, 5);
    assert_eq!(result.time_taken_seconds, 60);
}

#[tokio::test(start_paused = true)]
async fn manual_submit_stops_the_countdown() {
    let handle = active_handle(stub_source(provider_response(2), Duration::ZERO), 2, 5).await;

    sleep(Duration::from_millis(10_500)).await;
    for id in ["q1", "q2"] {
        handle
            .apply(Event::SelectAnswer {
                question_id: id.to_string(),
                answer: ChoiceLabel::B,
            })
            .await
            .unwrap();
    }
    let transition = handle.apply(Event::Submit).await.unwrap();
    assert_eq!(transition.snapshot.score, 100.0);
    assert_eq!(transition.snapshot.remaining_seconds, 290);

    sleep(Duration::from_secs(30)).await;
    assert_eq!(handle.snapshot().remaining_seconds, 290);
}

#[tokio::test(start_paused = true)]
async fn reset_during_loading_discards_the_late_response() {
    let slow = stub_source(provider_response(3), Duration::from_secs(10));
    let handle = SessionHandle::spawn(slow, TICK);

    let configuring = {
        let handle = handle.clone();
        tokio::spawn(async move {
            let config = QuizConfig::new("Chemistry", 3, 5).unwrap();
            handle.configure(config).await
        })
    };

    let mut snapshots = handle.subscribe();
    snapshots
        .wait_for(|s| s.phase == Phase::Loading)
        .await
        .unwrap();

    // 불러오는 중에는 다시 설정할 수 없습니다.
    let again = handle
        .configure(QuizConfig::new("Biology", 3, 5).unwrap())
        .await
        .unwrap();
    assert_eq!(again.outcome, Outcome::Ignored(IgnoreReason::LoadInProgress));

    let reset = handle.apply(Event::Reset).await.unwrap();
    assert_eq!(reset.snapshot.phase, Phase::Idle);

    let late = configuring.await.unwrap().unwrap();
    assert_eq!(late.outcome, Outcome::Ignored(IgnoreReason::StaleResponse));
    assert_eq!(late.snapshot.phase, Phase::Idle);
    assert!(late.snapshot.questions.is_empty());
    assert!(late.snapshot.config.is_none());
}

#[tokio::test(start_paused = true)]
async fn shutdown_closes_the_session() {
    let handle = active_handle(QuestionSource::offline(), 3, 5).await;
    handle.shutdown().await;

    // 러너가 명령 채널을 닫을 때까지 한 번 양보합니다.
    sleep(Duration::from_millis(10)).await;
    assert!(handle.apply(Event::Next).await.is_err());
    assert!(handle.result().await.is_err());
}

#[tokio::test(start_paused = true)]
async fn abandoned_configure_call_still_loads_questions() {
    let slow = stub_source(provider_response(3), Duration::from_secs(5));
    let handle = SessionHandle::spawn(slow, TICK);

    // 클라이언트 연결이 끊긴 것처럼 한 번만 poll하고 버립니다.
    let mut configuring = Box::pin(handle.configure(QuizConfig::new("Chemistry", 3, 5).unwrap()));
    assert!(futures::poll!(&mut configuring).is_pending());
    drop(configuring);

    let mut snapshots = handle.subscribe();
    let ready = tokio::time::timeout(
        Duration::from_secs(60),
        snapshots.wait_for(|s| s.phase == Phase::Ready),
    )
    .await;
    assert!(ready.is_ok(), "session should leave Loading on its own");

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.questions.len(), 3);
    assert!(!snapshot.loading);

    // 다시 설정하려 하면 LoadInProgress가 아니라 AlreadyConfigured입니다.
    let again = handle
        .configure(QuizConfig::new("Biology", 3, 5).unwrap())
        .await
        .unwrap();
    assert_eq!(again.outcome, Outcome::Ignored(IgnoreReason::AlreadyConfigured));
}
