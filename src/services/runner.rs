//! # 세션 러너
//!
//! 세션 하나당 tokio 태스크 하나가 `Session`을 소유하고, 모든 상태 변경을
//! 채널(mpsc)로 받아 도착 순서대로 적용합니다.
//!
//! ```text
//! HTTP 핸들러 ──Apply(Event)──┐
//! 문제 불러오기 ─Apply(Loaded)─┼──▶ mpsc ──▶ [러너 태스크: Session::apply] ──▶ watch(스냅샷)
//! Countdown   ──Tick──────────┘
//! ```
//!
//! 쓰는 쪽은 러너 태스크 하나뿐이므로 락이 필요 없고,
//! 읽는 쪽은 `watch` 채널로 최신 스냅샷을 얼마든지 가져갈 수 있습니다.

use crate::models::{QuizConfig, QuizResult, SessionSnapshot};
use crate::services::countdown::Countdown;
use crate::services::question_source::QuestionSource;
use crate::services::session::{Event, Outcome, Session};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};

const COMMAND_BUFFER: usize = 64;

/// 러너 태스크가 이미 종료된 경우
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("session has been closed")]
pub struct SessionClosed;

/// 이벤트 적용 결과와 적용 직후의 스냅샷
#[derive(Debug, Clone)]
pub struct Transition {
    pub outcome: Outcome,
    pub snapshot: SessionSnapshot,
}

enum Command {
    Apply {
        event: Event,
        reply: oneshot::Sender<Transition>,
    },
    /// 설정을 적용하고, 적용되면 러너가 직접 문제 불러오기를 시작합니다.
    /// `reply`에는 불러오기까지 끝난 뒤의 결과가 갑니다.
    Configure {
        config: QuizConfig,
        reply: oneshot::Sender<Transition>,
    },
    Tick,
    Result {
        reply: oneshot::Sender<Option<QuizResult>>,
    },
    Shutdown,
}

/// 러너 태스크에 이벤트를 보내는 핸들 (복제 가능)
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    /// 빈 세션(`Idle`)을 만들고 러너 태스크를 띄웁니다.
    pub fn spawn(source: QuestionSource, tick_interval: Duration) -> Self {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let runner = Runner::new(source, tick_interval, command_tx.downgrade());
        let snapshots = runner.snapshots.subscribe();
        tokio::spawn(runner.run(command_rx));

        Self {
            commands: command_tx,
            snapshots,
        }
    }

    /// 가장 최근에 적용된 상태의 스냅샷
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// 스냅샷 변경을 구독합니다.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// 이벤트 하나를 적용하고 결과를 기다립니다.
    pub async fn apply(&self, event: Event) -> Result<Transition, SessionClosed> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Apply { event, reply }).await?;
        response.await.map_err(|_| SessionClosed)
    }

    /// 채점 결과. 아직 끝나지 않았으면 `None`입니다.
    pub async fn result(&self) -> Result<Option<QuizResult>, SessionClosed> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Result { reply }).await?;
        response.await.map_err(|_| SessionClosed)
    }

    /// 퀴즈를 설정하고 문제를 불러옵니다.
    ///
    /// `Configure`가 무시되면 그 결과를 바로 돌려줍니다.
    /// 적용되면 `QuestionsLoaded`(또는 `LoadFailed`)까지 적용한 뒤의 결과를 돌려줍니다.
    /// 불러오는 도중 `Reset`이 들어왔다면 늦게 도착한 응답은 버려지고, 그때의 스냅샷이 반환됩니다.
    ///
    /// 불러오기는 러너 쪽에서 진행되므로, 이 future를 중간에 버려도 세션은 `Ready`까지 갑니다.
    pub async fn configure(&self, config: QuizConfig) -> Result<Transition, SessionClosed> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Configure { config, reply }).await?;
        response.await.map_err(|_| SessionClosed)
    }

    /// 러너 태스크를 종료합니다. 카운트다운도 함께 멈춥니다.
    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
    }

    async fn send(&self, command: Command) -> Result<(), SessionClosed> {
        self.commands.send(command).await.map_err(|_| SessionClosed)
    }
}

struct Runner {
    session: Session,
    countdown: Countdown,
    source: QuestionSource,
    /// 자기 자신에게 명령을 보내는 약한 송신자 (틱, 불러오기 결과)
    commands: mpsc::WeakSender<Command>,
    snapshots: watch::Sender<SessionSnapshot>,
}

impl Runner {
    fn new(
        source: QuestionSource,
        tick_interval: Duration,
        commands: mpsc::WeakSender<Command>,
    ) -> Self {
        let session = Session::new();
        let snapshots = watch::Sender::new(session.snapshot());
        Self {
            session,
            countdown: Countdown::new(tick_interval),
            source,
            commands,
            snapshots,
        }
    }

    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        while let Some(command) = commands.recv().await {
            match command {
                Command::Apply { event, reply } => {
                    let transition = self.apply(event);
                    let _ = reply.send(transition);
                }
                Command::Configure { config, reply } => {
                    let transition = self.apply(Event::Configure(config.clone()));
                    if transition.outcome.is_applied() {
                        self.spawn_fetch(config, reply);
                    } else {
                        let _ = reply.send(transition);
                    }
                }
                Command::Tick => {
                    self.apply(Event::Tick);
                }
                Command::Result { reply } => {
                    let _ = reply.send(self.session.result());
                }
                Command::Shutdown => break,
            }
        }
        self.countdown.stop();
        tracing::debug!("Session runner stopped");
    }

    fn apply(&mut self, event: Event) -> Transition {
        let name = event_name(&event);
        let outcome = self.session.apply(event);
        match outcome {
            Outcome::Applied => {
                // Tick은 매초 들어오므로 trace 레벨로만 남깁니다.
                if name != "Tick" {
                    tracing::debug!(phase = ?self.session.phase(), "{} applied", name);
                } else if self.session.finished() {
                    tracing::info!(score = self.session.score(), "Time is up, quiz auto-submitted");
                } else {
                    tracing::trace!(remaining = self.session.remaining_seconds(), "Tick");
                }
                self.sync_countdown();
                self.snapshots.send_replace(self.session.snapshot());
            }
            Outcome::Ignored(reason) => {
                tracing::debug!("{} ignored: {}", name, reason);
            }
        }

        Transition {
            outcome,
            snapshot: self.snapshots.borrow().clone(),
        }
    }

    /// 현재 시도 번호로 문제를 불러오는 태스크를 띄웁니다.
    ///
    /// 결과는 명령 채널로 되돌아와 다른 이벤트와 같은 순서 규칙을 따릅니다.
    fn spawn_fetch(&self, config: QuizConfig, reply: oneshot::Sender<Transition>) {
        let attempt = self.session.attempt();
        let source = self.source.clone();
        let commands = self.commands.clone();

        tokio::spawn(async move {
            // 패닉도 LoadFailed로 바꿉니다.
            let fetched = tokio::spawn(async move {
                source
                    .fetch(config.topic(), config.question_count())
                    .await
            })
            .await;

            let event = match fetched {
                Ok(Ok(outcome)) => Event::QuestionsLoaded {
                    attempt,
                    questions: outcome.questions,
                    notice: outcome.fallback_notice,
                },
                Ok(Err(e)) => Event::LoadFailed {
                    attempt,
                    message: e.to_string(),
                },
                Err(e) => {
                    tracing::error!("question fetch task failed: {}", e);
                    Event::LoadFailed {
                        attempt,
                        message: "failed to load questions".to_string(),
                    }
                }
            };

            // 그사이 세션이 닫혔다면 결과는 버립니다.
            let Some(commands) = commands.upgrade() else {
                return;
            };
            let (loaded, response) = oneshot::channel();
            if commands
                .send(Command::Apply {
                    event,
                    reply: loaded,
                })
                .await
                .is_err()
            {
                return;
            }
            drop(commands);

            if let Ok(transition) = response.await {
                let _ = reply.send(transition);
            }
        });
    }

    /// 세션 상태에 맞춰 카운트다운을 켜거나 끕니다.
    fn sync_countdown(&mut self) {
        if self.session.timer_running() {
            self.countdown.start(self.commands.clone(), || Command::Tick);
        } else {
            self.countdown.stop();
        }
    }
}

fn event_name(event: &Event) -> &'static str {
    match event {
        Event::Configure(_) => "Configure",
        Event::QuestionsLoaded { .. } => "QuestionsLoaded",
        Event::LoadFailed { .. } => "LoadFailed",
        Event::Start => "Start",
        Event::SelectAnswer { .. } => "SelectAnswer",
        Event::GoToQuestion(_) => "GoToQuestion",
        Event::Next => "Next",
        Event::Previous => "Previous",
        Event::Tick => "Tick",
        Event::Submit => "Submit",
        Event::Reset => "Reset",
    }
}
