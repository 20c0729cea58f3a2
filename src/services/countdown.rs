//! # 카운트다운 드라이버
//!
//! 일정 간격(기본 1초)마다 틱 메시지를 채널로 보내는 tokio 태스크입니다.
//! 틱은 사용자 이벤트와 같은 채널을 타고 세션 러너에 도착하므로,
//! 상태 변경은 항상 한 줄로 직렬화됩니다.

use std::time::Duration;
use tokio::sync::mpsc::WeakSender;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// 주기적으로 틱을 보내는 타이머
///
/// - 이미 돌고 있을 때 `start()`는 아무것도 하지 않습니다.
/// - 멈춰 있을 때 `stop()`도 아무것도 하지 않습니다.
/// - 값이 drop되면 태스크도 함께 중단됩니다.
#[derive(Debug)]
pub struct Countdown {
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl Countdown {
    pub fn new(period: Duration) -> Self {
        Self { period, task: None }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// 틱 전송을 시작합니다.
    ///
    /// `sink`는 약한 참조(WeakSender)라서 타이머가 채널을 붙잡아 두지 않습니다.
    /// 받는 쪽이 모두 사라지면 타이머도 스스로 끝납니다.
    pub fn start<T, F>(&mut self, sink: WeakSender<T>, make_tick: F)
    where
        T: Send + 'static,
        F: Fn() -> T + Send + 'static,
    {
        if self.is_running() {
            return;
        }

        let period = self.period;
        self.task = Some(tokio::spawn(async move {
            // 첫 틱은 한 주기 뒤에 울립니다.
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let Some(sender) = sink.upgrade() else {
                    break;
                };
                if sender.send(make_tick()).await.is_err() {
                    break;
                }
            }
        }));
        tracing::debug!("Countdown started ({:?} period)", period);
    }

    /// 틱 전송을 멈춥니다.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("Countdown stopped");
        }
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
