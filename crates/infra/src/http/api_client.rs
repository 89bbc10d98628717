//! Authenticated API client with shared backoff
//!
//! Every request goes through [`ApiClient::perform`]. Connection failures are
//! retried through one [`Backoff`] controller shared by all requests of the
//! client, so concurrent failures wait out the same window instead of each
//! arming a timer. Credential rejections move the session to
//! `Reauthenticating`; the controller's `Ready` event then triggers a refresh
//! and waiting requests resend once the session settles.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gifscout_common::{
    Backoff, BackoffEvent, BackoffEventKind, BackoffOptions, BackoffOutcome, ErrorClassification,
    ExponentialBackoffStrategy,
};
use gifscout_core::RequestExecutor;
use gifscout_domain::{
    AuthState, BackoffConfig, Config, ConnectionError, GifScoutError, HttpRequest, Result,
    Session, SessionToken,
};
use parking_lot::RwLock;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::auth::SessionRefresher;
use super::client::HttpClient;
use super::session::SessionContext;

/// Settings for [`ApiClient`]
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub device_id: String,
    pub backoff: BackoffOptions,
    /// `None` retries connection failures without limit.
    pub max_retries: Option<u32>,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(gifscout_domain::constants::DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: format!(
                "{}/{} ({})",
                gifscout_domain::constants::DEFAULT_APP_NAME,
                env!("CARGO_PKG_VERSION"),
                gifscout_domain::constants::DEFAULT_DEVICE
            ),
            device_id: String::new(),
            backoff: BackoffOptions::default(),
            max_retries: None,
        }
    }
}

impl ApiClientConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: Duration::from_secs(config.api.timeout_secs),
            user_agent: config.api.user_agent(),
            device_id: config.api.device_id.clone(),
            backoff: backoff_options(&config.backoff),
            max_retries: config.backoff.max_retries,
        }
    }

    pub fn with_backoff(mut self, backoff: BackoffOptions) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_max_retries(mut self, max_retries: Option<u32>) -> Self {
        self.max_retries = max_retries;
        self
    }
}

fn backoff_options(config: &BackoffConfig) -> BackoffOptions {
    BackoffOptions::default()
        .with_factor(config.factor)
        .with_initial_delay(Duration::from_millis(config.initial_delay_ms))
        .with_max_delay(Duration::from_millis(config.max_delay_ms))
}

/// Request executor that owns the session and retries connection failures
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    session: SessionContext,
    backoff: Backoff<ConnectionError>,
    refresher: RwLock<Option<Arc<dyn SessionRefresher>>>,
    refresh_in_flight: AtomicBool,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("auth_state", &self.inner.session.auth_state())
            .field("backoff", &self.inner.backoff)
            .finish()
    }
}

impl ApiClient {
    pub fn new(config: ApiClientConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .device_id(config.device_id)
            .build()?;

        let strategy = ExponentialBackoffStrategy::new(config.backoff)
            .map_err(|e| GifScoutError::Config(e.to_string()))?;

        let inner = Arc::new(ClientInner {
            http,
            session: SessionContext::default(),
            backoff: Backoff::new(strategy, config.max_retries),
            refresher: RwLock::new(None),
            refresh_in_flight: AtomicBool::new(false),
        });
        register_listeners(&inner);

        Ok(Self { inner })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(ApiClientConfig::from_config(config))
    }

    pub fn with_refresher(self, refresher: Arc<dyn SessionRefresher>) -> Self {
        self.set_refresher(Some(refresher));
        self
    }

    pub fn set_refresher(&self, refresher: Option<Arc<dyn SessionRefresher>>) {
        *self.inner.refresher.write() = refresher;
    }

    /// Shared controller; exposed so callers can observe retry events.
    pub fn backoff(&self) -> &Backoff<ConnectionError> {
        &self.inner.backoff
    }

    pub fn session(&self) -> Session {
        self.inner.session.snapshot()
    }

    pub fn auth_state(&self) -> AuthState {
        self.inner.session.auth_state()
    }

    /// Store `token` and mark the session authenticated.
    pub fn set_session(&self, token: SessionToken) {
        self.inner.session.authenticate(token);
        self.inner.backoff.reset();
    }

    /// Drop the token and mark the session unauthenticated.
    pub fn reset_session(&self) {
        self.inner.session.clear();
        self.inner.backoff.reset();
    }

    /// Replace the token without changing the auth state.
    pub fn set_token(&self, id_token: Option<String>) {
        self.inner.session.set_token(id_token);
    }

    /// Send `request`, retrying connection failures until success,
    /// cancellation, or an exhausted retry budget.
    #[instrument(skip_all, fields(method = %request.method, url = %request.url))]
    pub async fn perform(&self, request: &HttpRequest, cancel: &CancellationToken) -> Result<Value> {
        loop {
            if cancel.is_cancelled() {
                return Err(GifScoutError::Cancelled);
            }

            let id_token = self.inner.session.id_token();
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(GifScoutError::Cancelled),
                result = self.inner.http.execute(request, id_token.as_deref()) => result,
            };

            match result {
                Ok(value) => {
                    self.settle_success();
                    return Ok(value);
                }
                Err(GifScoutError::Connection(error)) => {
                    if error.kind().requires_reauthentication() {
                        self.inner.session.begin_reauthentication();
                    }
                    self.wait_for_retry(error, cancel).await?;
                }
                Err(other) => return Err(other),
            }
        }
    }

    fn settle_success(&self) {
        let backoff = &self.inner.backoff;
        if backoff.retry_count() > 0 && !backoff.is_pending() {
            backoff.reset();
        }
    }

    /// Arm (or join) the shared backoff window and wait for it to end.
    async fn wait_for_retry(&self, error: ConnectionError, cancel: &CancellationToken) -> Result<()> {
        // Subscribe before arming so a window that ends immediately is not missed.
        let mut settled = self.inner.backoff.settlements();

        match self.inner.backoff.backoff(Some(error.clone())) {
            Ok(BackoffOutcome::Scheduled { delay }) => {
                debug!(delay_ms = delay.as_millis() as u64, error = %error, "retrying after backoff");
            }
            Ok(BackoffOutcome::Exhausted) => {
                warn!(error = %error, "retry budget exhausted");
                return Err(error.into());
            }
            // An armed window is joined and retried once it settles.
            Err(e) if e.is_retryable() => {
                debug!(error = %error, "joining pending backoff window");
            }
            Err(e) => {
                warn!(error = %e, severity = %e.severity(), "backoff could not be armed");
                return Err(GifScoutError::Internal(format!("backoff failed: {e}")));
            }
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(GifScoutError::Cancelled),
            changed = settled.changed() => {
                changed.map_err(|_| GifScoutError::Internal("backoff controller dropped".into()))?;
            }
        }

        if self.inner.session.auth_state() == AuthState::Reauthenticating {
            debug!("waiting for session refresh");
            self.inner.session.settled(cancel).await?;
        }
        Ok(())
    }

    /// Ask the configured refresher for a new token.
    ///
    /// A connection-kind failure ends the session. Any other failure re-arms
    /// the backoff so the next `Ready` tries again, and is returned.
    pub async fn refresh_session(&self) -> Result<()> {
        let Some(in_flight) = InFlight::acquire(&self.inner.refresh_in_flight) else {
            debug!("session refresh already in flight");
            return Ok(());
        };

        self.inner.session.force_reauthentication();

        let refresher = self.inner.refresher.read().clone();
        let Some(refresher) = refresher else {
            info!("no session refresher configured, ending session");
            self.reset_session();
            return Ok(());
        };

        match refresher.refresh().await {
            Ok(token) => {
                self.set_session(token);
                Ok(())
            }
            Err(error) if error.is_connection() => {
                warn!(error = %error, "session refresh rejected, ending session");
                self.reset_session();
                Ok(())
            }
            Err(error) => {
                warn!(error = %error, "session refresh failed, will try again");
                drop(in_flight);
                match self.inner.backoff.backoff(None) {
                    Ok(BackoffOutcome::Scheduled { .. }) => {}
                    Ok(BackoffOutcome::Exhausted) => {
                        warn!("refresh retries exhausted, ending session");
                        self.inner.session.clear();
                    }
                    Err(e) if e.is_retryable() => {}
                    Err(e) => warn!(error = %e, "failed to re-arm backoff"),
                }
                Err(error)
            }
        }
    }

    pub async fn get(&self, url: impl Into<String>) -> Result<Value> {
        self.perform(&HttpRequest::get(url), &CancellationToken::new()).await
    }

    pub async fn post(&self, url: impl Into<String>, body: Value) -> Result<Value> {
        self.perform(&HttpRequest::post(url).with_body(body), &CancellationToken::new()).await
    }

    pub async fn put(&self, url: impl Into<String>, body: Value) -> Result<Value> {
        self.perform(&HttpRequest::put(url).with_body(body), &CancellationToken::new()).await
    }

    pub async fn delete(&self, url: impl Into<String>) -> Result<Value> {
        self.perform(&HttpRequest::delete(url), &CancellationToken::new()).await
    }
}

#[async_trait]
impl RequestExecutor for ApiClient {
    async fn perform(&self, request: &HttpRequest, cancel: &CancellationToken) -> Result<Value> {
        ApiClient::perform(self, request, cancel).await
    }
}

fn register_listeners(inner: &Arc<ClientInner>) {
    let weak = Arc::downgrade(inner);
    inner.backoff.on(BackoffEventKind::Backoff, move |event| {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        if let BackoffEvent::Backoff { attempt, delay, .. } = event {
            if inner.session.auth_state() == AuthState::Reauthenticating {
                debug!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "will attempt to refresh the session"
                );
            }
        }
    });

    let weak = Arc::downgrade(inner);
    inner.backoff.on(BackoffEventKind::Ready, move |event| {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        if inner.session.auth_state() != AuthState::Reauthenticating
            || inner.refresh_in_flight.load(Ordering::Acquire)
        {
            return;
        }
        let Ok(runtime) = Handle::try_current() else {
            warn!("no runtime available to refresh the session");
            return;
        };
        if let BackoffEvent::Ready { attempt } = event {
            debug!(attempt, "attempting to refresh the session");
        }

        let client = ApiClient { inner };
        runtime.spawn(async move {
            if let Err(error) = client.refresh_session().await {
                warn!(error = %error, "session refresh attempt failed");
            }
        });
    });
}

/// Holds the refresh-in-flight flag for its lifetime.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).ok().map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
