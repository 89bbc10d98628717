// Event-emitting backoff controller with a single pending timer
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::error::{BackoffError, BackoffResult};
use super::events::{BackoffEvent, BackoffEventKind};
use super::strategy::{BackoffOptions, ExponentialBackoffStrategy};
use crate::error::CommonError;

/// Type alias for listener callbacks (clippy::type_complexity)
type Listener<E> = Arc<dyn Fn(&BackoffEvent<E>) + Send + Sync>;

/// Result of asking the controller for another attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffOutcome {
    /// A timer was armed and will emit `Ready` after `delay`.
    Scheduled { delay: Duration },
    /// The retry budget is spent; `Fail` was emitted and the controller reset.
    Exhausted,
}

/// Shared backoff controller
///
/// Cloning is cheap and every clone drives the same state, so one controller
/// can be shared by all requests of a client. At most one timer is pending at
/// any time; [`Backoff::settlements`] lets callers wait for that timer to
/// resolve without arming their own.
pub struct Backoff<E> {
    inner: Arc<Inner<E>>,
}

impl<E> Clone for Backoff<E> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<E> std::fmt::Debug for Backoff<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Backoff")
            .field("retry_count", &state.retry_count)
            .field("max_retries", &self.inner.max_retries)
            .field("pending", &state.timer.is_some())
            .finish()
    }
}

struct Inner<E> {
    state: Mutex<State>,
    listeners: RwLock<Vec<(BackoffEventKind, Listener<E>)>>,
    max_retries: Option<u32>,
    settled: watch::Sender<u64>,
}

struct State {
    strategy: ExponentialBackoffStrategy,
    retry_count: u32,
    timer: Option<PendingTimer>,
    next_timer_id: u64,
}

struct PendingTimer {
    id: u64,
    handle: JoinHandle<()>,
}

impl<E> Drop for Inner<E> {
    fn drop(&mut self) {
        if let Some(timer) = self.state.get_mut().timer.take() {
            timer.handle.abort();
        }
    }
}

impl<E> Backoff<E>
where
    E: Clone + Send + Sync + 'static,
{
    /// Create a controller around `strategy`. `None` retries without limit.
    pub fn new(strategy: ExponentialBackoffStrategy, max_retries: Option<u32>) -> Self {
        let (settled, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    strategy,
                    retry_count: 0,
                    timer: None,
                    next_timer_id: 0,
                }),
                listeners: RwLock::new(Vec::new()),
                max_retries,
                settled,
            }),
        }
    }

    /// Create an unlimited controller with an exponential strategy.
    pub fn exponential(options: BackoffOptions) -> BackoffResult<Self> {
        Ok(Self::new(ExponentialBackoffStrategy::new(options)?, None))
    }

    /// Next delay of the underlying strategy, without arming a timer.
    pub fn next(&self) -> Duration {
        self.inner.state.lock().strategy.next()
    }

    /// Schedule the next attempt.
    ///
    /// Emits `Backoff` synchronously and `Ready` from a Tokio task once the
    /// delay elapses. Fails with [`BackoffError::InvalidState`] while a timer
    /// is already pending.
    pub fn backoff(&self, error: Option<E>) -> BackoffResult<BackoffOutcome> {
        let runtime = Handle::try_current().map_err(|_| {
            CommonError::internal_with_context("no Tokio runtime available to arm timer", "backoff")
        })?;

        let mut state = self.inner.state.lock();
        if state.timer.is_some() {
            return Err(BackoffError::InvalidState("Backoff in progress.".into()));
        }

        if let Some(max) = self.inner.max_retries {
            if state.retry_count >= max {
                let attempts = state.retry_count;
                drop(state);
                warn!(attempts, max_retries = max, "backoff retries exhausted");
                self.emit(&BackoffEvent::Fail { error });
                self.reset();
                return Ok(BackoffOutcome::Exhausted);
            }
        }

        let delay = state.strategy.next();
        let attempt = state.retry_count;
        let id = state.next_timer_id;
        state.next_timer_id = state.next_timer_id.wrapping_add(1);

        let weak = Arc::downgrade(&self.inner);
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            fire(weak, id);
        });
        state.timer = Some(PendingTimer { id, handle });
        drop(state);

        debug!(attempt, delay_ms = delay.as_millis() as u64, "backoff scheduled");
        self.emit(&BackoffEvent::Backoff { attempt, delay, error });
        Ok(BackoffOutcome::Scheduled { delay })
    }

    /// Zero the retry count, restart the strategy and cancel any pending timer.
    pub fn reset(&self) {
        let timer = {
            let mut state = self.inner.state.lock();
            state.retry_count = 0;
            state.strategy.reset();
            state.timer.take()
        };
        if let Some(timer) = timer {
            timer.handle.abort();
        }
        self.inner.settled.send_modify(|generation| *generation = generation.wrapping_add(1));
    }

    /// Register a listener. Listeners run synchronously in registration order.
    pub fn on<F>(&self, kind: BackoffEventKind, listener: F)
    where
        F: Fn(&BackoffEvent<E>) + Send + Sync + 'static,
    {
        self.inner.listeners.write().push((kind, Arc::new(listener)));
    }

    /// Register a listener by event name (`"ready"`, `"backoff"` or `"fail"`).
    pub fn on_named<F>(&self, name: &str, listener: F) -> BackoffResult<()>
    where
        F: Fn(&BackoffEvent<E>) + Send + Sync + 'static,
    {
        let kind = name.parse::<BackoffEventKind>()?;
        self.on(kind, listener);
        Ok(())
    }

    /// Dispatch `event` to every listener registered for its kind.
    pub fn emit(&self, event: &BackoffEvent<E>) {
        emit_to(&self.inner, event);
    }

    /// Receiver that changes whenever the pending timer resolves.
    pub fn settlements(&self) -> watch::Receiver<u64> {
        self.inner.settled.subscribe()
    }

    pub fn retry_count(&self) -> u32 {
        self.inner.state.lock().retry_count
    }

    pub fn max_retries(&self) -> Option<u32> {
        self.inner.max_retries
    }

    /// Whether a timer is currently armed.
    pub fn is_pending(&self) -> bool {
        self.inner.state.lock().timer.is_some()
    }
}

fn emit_to<E>(inner: &Inner<E>, event: &BackoffEvent<E>) {
    let kind = event.kind();
    // Snapshot so listeners may register further listeners or drive the controller.
    let listeners: Vec<Listener<E>> = inner
        .listeners
        .read()
        .iter()
        .filter(|(registered, _)| *registered == kind)
        .map(|(_, listener)| Arc::clone(listener))
        .collect();
    for listener in listeners {
        listener(event);
    }
}

fn fire<E>(weak: Weak<Inner<E>>, id: u64) {
    let Some(inner) = weak.upgrade() else {
        return;
    };

    let attempt = {
        let mut state = inner.state.lock();
        match &state.timer {
            Some(timer) if timer.id == id => {}
            // Cancelled by reset() after the sleep completed.
            _ => return,
        }
        state.timer = None;
        state.retry_count
    };

    debug!(attempt, "backoff ready");
    emit_to(&inner, &BackoffEvent::Ready { attempt });

    inner.state.lock().retry_count = attempt.saturating_add(1);
    inner.settled.send_modify(|generation| *generation = generation.wrapping_add(1));
}
