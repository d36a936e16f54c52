use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, mpsc};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;

use crate::api::{QuizBackend, ServerHealth};
use crate::events::AppEvent;

/// Polls once, mapping any failure to [`ServerHealth::error`].
pub async fn poll_once<B: QuizBackend>(backend: &B) -> ServerHealth {
    match backend.health().await {
        Ok(health) => health,
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            ServerHealth::error()
        }
    }
}

/// Handle to the background health poller
pub struct HealthMonitor {
    task: JoinHandle<()>,
    wake: Arc<Notify>,
}

impl HealthMonitor {
    /// Spawns the poller. The first poll runs immediately, then every
    /// `period`, until the receiver side of `events` is dropped.
    ///
    /// Each poll runs as its own task, so a request that never completes does
    /// not hold back the ones after it. In-flight polls are cancelled with
    /// the monitor.
    pub fn spawn<B: QuizBackend>(
        backend: B,
        period: Duration,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        let wake = Arc::new(Notify::new());
        let notified = wake.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let mut polls = JoinSet::new();

            loop {
                let due = tokio::select! {
                    _ = ticker.tick() => true,
                    _ = notified.notified() => {
                        tracing::debug!("out-of-band health poll requested");
                        true
                    }
                    Some(_) = polls.join_next(), if !polls.is_empty() => false,
                };

                if !due {
                    continue;
                }
                if events.is_closed() {
                    break;
                }

                let backend = backend.clone();
                let events = events.clone();
                polls.spawn(async move {
                    let health = poll_once(&backend).await;
                    let _ = events.send(AppEvent::HealthUpdated(health));
                });
            }
        });

        Self { task, wake }
    }

    /// Requests a poll now without disturbing the periodic schedule.
    pub fn poll_now(&self) {
        self.wake.notify_one();
    }

    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}
