//! # 세션 저장소
//!
//! 브라우저마다 하나씩 만들어지는 세션 핸들을 UUID로 찾아 쓰기 위한 메모리 저장소입니다.
//! 세션 상태는 프로세스가 재시작되면 사라집니다.
//!
//! 일정 시간 동안 요청이 없는 세션은 `sweep_idle()`이 정리합니다.
//! 진행 중(`Active`)인 퀴즈는 시간이 다 되어 자동 제출된 뒤에야 정리 대상이 됩니다.

use crate::models::Phase;
use crate::services::question_source::QuestionSource;
use crate::services::runner::SessionHandle;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use uuid::Uuid;

/// 정리 작업을 돌리는 최대 간격
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct Entry {
    handle: SessionHandle,
    /// 마지막으로 요청이 들어온 시각
    last_seen: Instant,
}

#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, Entry>>>,
    source: QuestionSource,
    tick_interval: Duration,
    idle_timeout: Duration,
}

impl SessionRegistry {
    pub fn new(source: QuestionSource, tick_interval: Duration, idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            source,
            tick_interval,
            idle_timeout,
        }
    }

    /// 새 세션을 만들고 ID와 핸들을 반환합니다.
    pub async fn create(&self) -> (Uuid, SessionHandle) {
        let id = Uuid::now_v7();
        let handle = SessionHandle::spawn(self.source.clone(), self.tick_interval);
        let entry = Entry {
            handle: handle.clone(),
            last_seen: Instant::now(),
        };
        self.sessions.write().await.insert(id, entry);
        tracing::info!("Created quiz session {}", id);
        (id, handle)
    }

    /// 세션 핸들을 찾고, 마지막 사용 시각을 갱신합니다.
    pub async fn get(&self, id: &Uuid) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(id)?;
        entry.last_seen = Instant::now();
        Some(entry.handle.clone())
    }

    /// 세션을 목록에서 빼고 러너 태스크를 종료합니다.
    pub async fn remove(&self, id: &Uuid) -> bool {
        let removed = self.sessions.write().await.remove(id);
        match removed {
            Some(entry) => {
                entry.handle.shutdown().await;
                tracing::info!("Removed quiz session {}", id);
                true
            }
            None => false,
        }
    }

    /// 현재 열려 있는 세션 수
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// `idle_timeout` 이상 요청이 없던 세션을 닫고, 닫은 개수를 반환합니다.
    pub async fn sweep_idle(&self) -> usize {
        let now = Instant::now();
        let expired: Vec<(Uuid, SessionHandle)> = {
            let mut sessions = self.sessions.write().await;
            let ids: Vec<Uuid> = sessions
                .iter()
                .filter(|(_, entry)| {
                    now.duration_since(entry.last_seen) >= self.idle_timeout
                        && entry.handle.snapshot().phase != Phase::Active
                })
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter()
                .filter_map(|id| sessions.remove(&id).map(|entry| (id, entry.handle)))
                .collect()
        };

        // 락을 놓은 뒤에 러너를 종료합니다.
        for (id, handle) in &expired {
            handle.shutdown().await;
            tracing::info!("Expired idle quiz session {}", id);
        }
        expired.len()
    }

    /// 주기적으로 `sweep_idle()`을 호출하는 백그라운드 태스크를 띄웁니다.
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        let registry = self.clone();
        let period = self.idle_timeout.min(SWEEP_INTERVAL);
        tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                registry.sweep_idle().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuizConfig;
    use crate::services::session::Event;

    const TICK: Duration = Duration::from_secs(1);
    const IDLE: Duration = Duration::from_secs(600);

    fn registry() -> SessionRegistry {
        SessionRegistry::new(QuestionSource::offline(), TICK, IDLE)
    }

    #[tokio::test]
    async fn session_ids_are_v7() {
        let registry = registry();
        let (first, _) = registry.create().await;
        let (second, _) = registry.create().await;
        assert_eq!(first.get_version_num(), 7);
        assert_ne!(first, second);
        assert_eq!(registry.count().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn sweeps_only_sessions_without_recent_requests() {
        let registry = registry();
        let (stale, _) = registry.create().await;
        let (fresh, _) = registry.create().await;

        time::sleep(Duration::from_secs(400)).await;
        assert!(registry.get(&fresh).await.is_some());

        time::sleep(Duration::from_secs(250)).await;
        assert_eq!(registry.sweep_idle().await, 1);
        assert!(registry.get(&stale).await.is_none());
        assert!(registry.get(&fresh).await.is_some());
        assert_eq!(registry.count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn active_quiz_is_kept_until_it_finishes() {
        let registry = registry();
        let (id, handle) = registry.create().await;
        handle
            .configure(QuizConfig::new("History", 3, 15).unwrap())
            .await
            .unwrap();
        handle.apply(Event::Start).await.unwrap();

        time::sleep(Duration::from_secs(700)).await;
        assert_eq!(registry.sweep_idle().await, 0);

        // 15분이 지나 자동 제출되면 정리 대상이 됩니다.
        time::sleep(Duration::from_secs(300)).await;
        assert_eq!(registry.sweep_idle().await, 1);
        assert!(registry.get(&id).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_closes_abandoned_sessions() {
        let registry = registry();
        let _sweeper = registry.spawn_sweeper();
        let (id, handle) = registry.create().await;

        time::sleep(Duration::from_secs(700)).await;
        assert_eq!(registry.count().await, 0);
        assert!(registry.get(&id).await.is_none());
        assert!(handle.apply(Event::Next).await.is_err());
    }
}
