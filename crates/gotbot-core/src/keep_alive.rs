//! Repeating "still working" indicator for long-running actions.
//!
//! A [`KeepAlive`] is created, started exactly once into a [`KeepAliveGuard`],
//! and stopped when the guard is consumed by [`KeepAliveGuard::stop`] or dropped.
//! The repeating task also ends when the context it was started with is cancelled.
//!
//! ```ignore
//! let typing = KeepAlive::new(sink, chat_id).start(ctx, ChatAction::Typing).await;
//! let answer = provider.complete(prompt).await?;
//! typing.stop();
//! ```

use crate::context::Context;
use crate::transport::ChatSink;
use gotbot_telegram::ChatAction;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

pub const DEFAULT_KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(4);

pub struct KeepAlive {
    sink: Arc<dyn ChatSink>,
    chat_id: i64,
    interval: Duration,
}

impl KeepAlive {
    pub fn new(sink: Arc<dyn ChatSink>, chat_id: i64) -> Self {
        Self {
            sink,
            chat_id,
            interval: DEFAULT_KEEP_ALIVE_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sends the first indicator, then repeats it every interval until stopped.
    pub async fn start(self, ctx: &Context, action: ChatAction) -> KeepAliveGuard {
        signal(self.sink.as_ref(), self.chat_id, action).await;

        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let ctx = ctx.clone();
        let Self {
            sink,
            chat_id,
            interval,
        } = self;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    _ = ctx.cancelled() => break,
                    _ = ticker.tick() => signal(sink.as_ref(), chat_id, action).await,
                }
            }
        });

        KeepAliveGuard {
            stop: Some(stop_tx),
            task,
        }
    }
}

/// Builds sessions that share a sink and the configured repeat interval.
#[derive(Clone)]
pub struct KeepAliveFactory {
    sink: Arc<dyn ChatSink>,
    interval: Duration,
}

impl KeepAliveFactory {
    pub fn new(sink: Arc<dyn ChatSink>, interval: Duration) -> Self {
        Self { sink, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn for_chat(&self, chat_id: i64) -> KeepAlive {
        KeepAlive::new(Arc::clone(&self.sink), chat_id).with_interval(self.interval)
    }
}

/// Running keep-alive session. Stops on [`stop`](Self::stop) or drop.
pub struct KeepAliveGuard {
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl KeepAliveGuard {
    pub fn stop(mut self) {
        self.halt();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    fn halt(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

impl Drop for KeepAliveGuard {
    fn drop(&mut self) {
        self.halt();
    }
}

async fn signal(sink: &dyn ChatSink, chat_id: i64, action: ChatAction) {
    if let Err(err) = sink.send_chat_action(chat_id, action).await {
        debug!(chat_id = chat_id, action = %action, error = %err, "Keep-alive signal failed");
    }
}
