//! The poll loop. Owns the update cursor and fans each update out to its own task.
//!
//! The cursor moves at fetch time: once a batch is returned, every update in
//! it is acknowledged on the next fetch whether or not its task succeeds.
//! Tasks are detached; cancelling the context stops polling but neither
//! waits for nor aborts updates already in flight.

use crate::context::Context;
use crate::handler::Handler;
use crate::transport::UpdateSource;
use anyhow::Result;
use gotbot_telegram::Update;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{error, info, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// How many updates may be handled at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DispatchMode {
    /// One task per update, no cap.
    #[default]
    Unbounded,
    /// One task per update, at most `n` of them past the permit at a time.
    /// Tasks waiting for a permit are still spawned, so polling never stalls.
    Bounded(usize),
}

impl From<Option<usize>> for DispatchMode {
    fn from(limit: Option<usize>) -> Self {
        match limit {
            Some(n) => Self::Bounded(n),
            None => Self::Unbounded,
        }
    }
}

pub struct Bot {
    source: Arc<dyn UpdateSource>,
    handler: Arc<dyn Handler>,
    offset: i64,
    interval: Duration,
    limiter: Option<Arc<Semaphore>>,
}

impl Bot {
    pub fn new(source: Arc<dyn UpdateSource>, handler: Arc<dyn Handler>) -> Self {
        Self {
            source,
            handler,
            offset: 0,
            interval: DEFAULT_POLL_INTERVAL,
            limiter: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_mode(mut self, mode: DispatchMode) -> Self {
        self.limiter = match mode {
            DispatchMode::Unbounded => None,
            DispatchMode::Bounded(n) => Some(Arc::new(Semaphore::new(n.max(1)))),
        };
        self
    }

    /// Smallest update id not yet acknowledged.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Polls every interval until `ctx` is cancelled. A fetch in progress is
    /// abandoned on cancellation, leaving the cursor where it was.
    pub async fn start(&mut self, ctx: &Context) {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(offset = self.offset, "Polling started");

        loop {
            tokio::select! {
                _ = ctx.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let result = tokio::select! {
                _ = ctx.cancelled() => break,
                result = self.poll_updates(ctx) => result,
            };
            if let Err(err) = result {
                warn!(offset = self.offset, error = %err, "Failed to fetch updates");
            }
        }

        info!(offset = self.offset, "Polling stopped");
    }

    /// Runs one fetch: advances the cursor past the batch, then spawns one
    /// task per update. On error nothing is consumed and the cursor stays put.
    pub async fn poll_updates(&mut self, ctx: &Context) -> Result<Vec<JoinHandle<()>>> {
        let updates = self.source.fetch_updates(self.offset).await?;

        for update in &updates {
            if update.update_id >= self.offset {
                self.offset = update.update_id + 1;
            }
        }

        Ok(updates
            .into_iter()
            .map(|update| self.spawn_dispatch(ctx, update))
            .collect())
    }

    fn spawn_dispatch(&self, ctx: &Context, update: Update) -> JoinHandle<()> {
        let handler = Arc::clone(&self.handler);
        let limiter = self.limiter.clone();
        let ctx = ctx.clone();

        tokio::spawn(async move {
            let _permit = match limiter {
                Some(semaphore) => match semaphore.acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(err) => {
                        error!(update_id = update.update_id, error = %err, "Dispatch semaphore closed");
                        return;
                    }
                },
                None => None,
            };

            if let Err(err) = handler.handle(&ctx, &update).await {
                error!(update_id = update.update_id, error = %err, "Failed to process update");
            }
        })
    }
}
