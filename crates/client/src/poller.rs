//! # Adaptive Poller
//!
//! Periodically fetches a resource and hands each result to a callback. The
//! delay between fetches shrinks by `success_factor` after every success and
//! grows by `failure_factor` after every failure, always staying inside
//! `[min, max]`.
//!
//! A subscription fetches once immediately, then again after each delay. A
//! fetch never starts before the previous one has finished. After
//! [`Subscription::unsubscribe`] returns no new callback starts, even if a
//! fetch was in flight; dropping the [`Subscription`] has the same effect.
//!
//! The active check and the callback run under a per-subscription gate that
//! `unsubscribe` also takes, so on a multi-thread runtime `unsubscribe` waits
//! for a callback already running on another worker to return.

use std::{
    future::Future,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

use eyre::{Result, bail};
use serde::Deserialize;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PollOptions {
    pub initial: Duration,
    pub min: Duration,
    pub max: Duration,
    pub success_factor: f64,
    pub failure_factor: f64,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(5_000),
            min: Duration::from_millis(3_000),
            max: Duration::from_millis(30_000),
            success_factor: 0.8,
            failure_factor: 2.0,
        }
    }
}

impl PollOptions {
    pub fn validate(&self) -> Result<()> {
        if self.min.is_zero() {
            bail!("Minimum poll interval must be greater than zero");
        }
        if self.min > self.max {
            bail!(
                "Minimum poll interval {:?} exceeds maximum {:?}",
                self.min,
                self.max
            );
        }
        if !(self.success_factor > 0.0 && self.success_factor <= 1.0) {
            bail!("success_factor must be in (0, 1], got {}", self.success_factor);
        }
        if !(self.failure_factor >= 1.0 && self.failure_factor.is_finite()) {
            bail!("failure_factor must be at least 1, got {}", self.failure_factor);
        }
        Ok(())
    }
}

/// Delay state machine shared by every subscription.
#[derive(Debug, Clone)]
pub struct Backoff {
    interval_ms: u64,
    min_ms: u64,
    max_ms: u64,
    success_factor: f64,
    failure_factor: f64,
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Backoff {
    /// Starts at `options.initial`, clamped into `[min, max]`.
    pub fn new(options: &PollOptions) -> Self {
        let min_ms = millis(options.min);
        let max_ms = millis(options.max).max(min_ms);
        Self {
            interval_ms: millis(options.initial).clamp(min_ms, max_ms),
            min_ms,
            max_ms,
            success_factor: options.success_factor,
            failure_factor: options.failure_factor,
        }
    }

    pub fn current(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    fn scale(&self, factor: f64) -> u64 {
        (self.interval_ms as f64 * factor).floor() as u64
    }

    /// Shrinks the delay, never below `min`.
    pub fn on_success(&mut self) -> Duration {
        self.interval_ms = self.scale(self.success_factor).clamp(self.min_ms, self.max_ms);
        self.current()
    }

    /// Grows the delay, never above `max`.
    pub fn on_failure(&mut self) -> Duration {
        self.interval_ms = self.scale(self.failure_factor).clamp(self.min_ms, self.max_ms);
        self.current()
    }
}

// The gate guards no data, so a poisoned lock is still usable
fn enter(gate: &Mutex<()>) -> MutexGuard<'_, ()> {
    gate.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to a running poll loop.
#[derive(Debug)]
pub struct Subscription {
    active: Arc<AtomicBool>,
    gate: Arc<Mutex<()>>,
    interval_ms: Arc<AtomicU64>,
    task: JoinHandle<()>,
}

impl Subscription {
    /// Stops polling. Safe to call more than once, including from inside one
    /// of this subscription's own callbacks.
    ///
    /// Waits for a callback running on another thread to return.
    pub fn unsubscribe(&self) {
        // Inside our own callback the gate is already held by this task
        let own_callback = tokio::task::try_id() == Some(self.task.id());
        let _gate = (!own_callback).then(|| enter(&self.gate));

        if self.active.swap(false, Ordering::SeqCst) {
            debug!("Poll subscription cancelled");
        }
        self.task.abort();
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Delay before the next fetch.
    pub fn current_interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.load(Ordering::SeqCst))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Starts polling `fetch` on the current tokio runtime.
///
/// Successful results go to `on_data`, failures to `on_error`; neither ever
/// stops the loop. Only [`Subscription::unsubscribe`] (or dropping the
/// subscription) does.
pub fn subscribe<T, E, F, Fut, D, R>(
    mut fetch: F,
    mut on_data: D,
    mut on_error: R,
    options: PollOptions,
) -> Subscription
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
    D: FnMut(T) + Send + 'static,
    R: FnMut(E) + Send + 'static,
{
    let mut backoff = Backoff::new(&options);
    let active = Arc::new(AtomicBool::new(true));
    let gate = Arc::new(Mutex::new(()));
    let interval_ms = Arc::new(AtomicU64::new(millis(backoff.current())));

    let task = tokio::spawn({
        let active = Arc::clone(&active);
        let gate = Arc::clone(&gate);
        let interval_ms = Arc::clone(&interval_ms);
        async move {
            loop {
                let result = fetch().await;

                let next = {
                    let _gate = enter(&gate);
                    if !active.load(Ordering::SeqCst) {
                        break;
                    }
                    match result {
                        Ok(data) => {
                            on_data(data);
                            backoff.on_success()
                        }
                        Err(err) => {
                            on_error(err);
                            backoff.on_failure()
                        }
                    }
                };
                interval_ms.store(millis(next), Ordering::SeqCst);
                trace!(next_ms = millis(next), "Next poll scheduled");

                if !active.load(Ordering::SeqCst) {
                    break;
                }
                tokio::time::sleep(next).await;
                if !active.load(Ordering::SeqCst) {
                    break;
                }
            }
        }
    });

    Subscription {
        active,
        gate,
        interval_ms,
        task,
    }
}
