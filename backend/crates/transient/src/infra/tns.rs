//! TNS Registry Client
//!
//! Looks transients up on the Transient Name Server `object` endpoint while
//! honoring the rate limit it reports through response headers.
//!
//! A [`TnsClient`] is cheap to clone and shares one [`RateLimitTracker`]
//! with every other client in the process. Each fetch opens a
//! [`TnsSession`] that owns its HTTP connection pool and the attempt logs
//! produced during that fetch; the session is dropped when the fetch ends.

use std::sync::{Arc, Mutex, PoisonError};

use platform::rate_limit::{RateLimitSnapshot, RateLimitTracker, Sleeper, TokioSleeper};
use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio::task::JoinSet;

use crate::application::config::TnsConfig;
use crate::domain::entities::{QueryLogEntry, Transient};
use crate::domain::repository::{RegistryFetch, TransientRegistry};
use crate::domain::services::{ObjectReply, normalize_reply};
use crate::error::{TransientError, TransientResult};

/// Registry client bound to the shared rate limit tracker
pub struct TnsClient<S = TokioSleeper> {
    config: Arc<TnsConfig>,
    tracker: Arc<RateLimitTracker<S>>,
}

impl<S> Clone for TnsClient<S> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            tracker: Arc::clone(&self.tracker),
        }
    }
}

impl<S> TnsClient<S> {
    pub fn new(config: Arc<TnsConfig>, tracker: Arc<RateLimitTracker<S>>) -> Self {
        Self { config, tracker }
    }

    pub fn tracker(&self) -> &RateLimitTracker<S> {
        &self.tracker
    }

    /// Open a session with its own connection pool
    pub fn session(&self) -> TransientResult<TnsSession<S>> {
        let http = reqwest::Client::builder()
            .user_agent(self.config.bot.user_agent())
            .timeout(self.config.request_timeout)
            .build()?;

        Ok(TnsSession {
            http,
            config: Arc::clone(&self.config),
            tracker: Arc::clone(&self.tracker),
            logs: Mutex::new(Vec::new()),
        })
    }
}

impl<S> TnsClient<S>
where
    S: Sleeper + Send + Sync + 'static,
{
    /// Fetch every name concurrently, one task per name.
    ///
    /// Results come back in completion order. The first failure cancels the
    /// remaining tasks and becomes the result of the whole batch; the logs
    /// of every attempt made so far are returned either way.
    pub async fn fetch_transients(&self, names: &[String]) -> RegistryFetch<Vec<Transient>> {
        let session = match self.session() {
            Ok(session) => Arc::new(session),
            Err(e) => {
                return RegistryFetch {
                    result: Err(e),
                    logs: Vec::new(),
                };
            }
        };

        let mut tasks = JoinSet::new();
        for name in names {
            let session = Arc::clone(&session);
            let name = name.clone();
            tasks.spawn(async move { session.make_transient(&name).await });
        }

        let mut transients = Vec::with_capacity(names.len());
        let mut failure = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(transient)) => transients.push(transient),
                Ok(Err(e)) => {
                    failure = Some(e);
                    break;
                }
                Err(e) => {
                    failure = Some(TransientError::Internal(format!("fetch task failed: {e}")));
                    break;
                }
            }
        }
        tasks.shutdown().await;

        let logs = session.take_logs();
        let result = match failure {
            Some(e) => {
                tracing::warn!(
                    error = %e,
                    requested = names.len(),
                    attempts = logs.len(),
                    "Registry batch aborted"
                );
                Err(e)
            }
            None => Ok(transients),
        };
        RegistryFetch { result, logs }
    }

    /// Single-name form of [`TnsClient::fetch_transients`]
    pub async fn fetch_transient(&self, name: &str) -> RegistryFetch<Transient> {
        let RegistryFetch { result, logs } = self.fetch_transients(&[name.to_string()]).await;
        let result = result.and_then(|transients| {
            transients
                .into_iter()
                .next()
                .ok_or_else(|| TransientError::NotFound(name.to_string()))
        });
        RegistryFetch { result, logs }
    }
}

impl<S> TransientRegistry for TnsClient<S>
where
    S: Sleeper + Send + Sync + 'static,
{
    async fn fetch_transient(&self, name: &str) -> RegistryFetch<Transient> {
        TnsClient::fetch_transient(self, name).await
    }

    async fn fetch_transients(&self, names: &[String]) -> RegistryFetch<Vec<Transient>> {
        TnsClient::fetch_transients(self, names).await
    }

    fn rate_limit_snapshot(&self) -> RateLimitSnapshot {
        self.tracker.snapshot()
    }
}

/// One fetch operation against the registry
pub struct TnsSession<S = TokioSleeper> {
    http: reqwest::Client,
    config: Arc<TnsConfig>,
    tracker: Arc<RateLimitTracker<S>>,
    logs: Mutex<Vec<QueryLogEntry>>,
}

impl<S> TnsSession<S> {
    /// Hand over the attempts recorded so far
    pub fn take_logs(&self) -> Vec<QueryLogEntry> {
        std::mem::take(&mut *self.logs.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn record(&self, entry: QueryLogEntry) {
        self.logs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}

impl<S: Sleeper> TnsSession<S> {
    /// Look one name up, retrying while the registry reports a rate limit.
    ///
    /// Every attempt is logged. The tracker is waited on only between
    /// attempts; after the last limited attempt the lookup fails with
    /// [`TransientError::UpstreamTimeout`].
    pub async fn get_obj(&self, name: &str) -> TransientResult<Option<ObjectReply>> {
        let url = self.config.object_url();
        let payload = json!({ "objname": name, "photometry": "0", "spectra": "0" }).to_string();
        let query = format!("POST {url} data={payload}");
        let max_attempts = self.config.max_attempts;

        for attempt in 1..=max_attempts {
            let response = self
                .http
                .post(&url)
                .form(&[
                    ("api_key", self.config.bot.api_key.as_str()),
                    ("data", payload.as_str()),
                ])
                .send()
                .await?;

            let status = response.status();
            let headers = response.headers().clone();
            let body = response.text().await?;

            self.record(QueryLogEntry {
                name: name.to_string(),
                query: query.clone(),
                response: response_message(&body),
                code: status.as_u16(),
            });

            if !self.tracker.determine_if_limited(status, &headers) {
                tracing::debug!(name, attempt, status = status.as_u16(), "Registry answered");
                return validate_response(status, &body);
            }

            tracing::warn!(name, attempt, max_attempts, "Registry rate limited the lookup");
            if attempt < max_attempts {
                self.tracker.wait_remaining_time().await;
            }
        }

        Err(TransientError::UpstreamTimeout {
            name: name.to_string(),
            attempts: max_attempts,
        })
    }

    /// Look one name up and map it into a [`Transient`]
    pub async fn make_transient(&self, name: &str) -> TransientResult<Transient> {
        match self.get_obj(name).await? {
            Some(reply) => Ok(reply.into_transient()),
            None => {
                tracing::info!(name, "Transient unknown to the registry");
                Err(TransientError::NotFound(name.to_string()))
            }
        }
    }
}

/// Turn an unlimited registry response into an object reply.
///
/// Non-2xx statuses are errors. A 2xx body without a usable reply is
/// `None`, which callers report as not found.
pub fn validate_response(status: StatusCode, body: &str) -> TransientResult<Option<ObjectReply>> {
    if !status.is_success() {
        return Err(TransientError::UpstreamStatus {
            status: status.as_u16(),
            message: response_message(body),
        });
    }

    let body: Value = serde_json::from_str(body).map_err(|e| TransientError::UpstreamStatus {
        status: status.as_u16(),
        message: format!("response is not JSON: {e}"),
    })?;
    Ok(normalize_reply(&body))
}

/// Upstream `id_message` when present, else the raw body
fn response_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("id_message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
