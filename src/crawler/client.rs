//! Bounded-concurrency HTTP client with session-cookie propagation
//!
//! All network I/O in the crate goes through [`FetchClient`]:
//! - a fixed-size admission gate bounds total in-flight requests
//! - server-issued cookies accumulate in a shared jar and are replayed on
//!   every subsequent request, whichever logical caller issues it
//! - a transport-level failure discards the session (connection pool and
//!   cookie jar) so the next call starts from a clean slate

use crate::config::FetchConfig;
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, Semaphore};
use url::Url;

/// Fixed desktop-browser identity presented to the origin
const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Errors surfaced by the fetch layer
///
/// Only transport-level failures are errors here; non-2xx responses are
/// ordinary [`FetchResponse`] values because status policy belongs to callers.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timeout for {url}")]
    Timeout { url: String },

    #[error("transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),
}

/// A fetched page
#[derive(Debug)]
pub struct FetchResponse {
    /// Final URL after redirects
    pub final_url: Url,

    /// HTTP status code
    pub status: StatusCode,

    /// Response body as text
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// The client's session: a connection pool plus the cookie jar feeding it.
///
/// The jar is written only by response processing inside `reqwest`; no other
/// code touches it, which keeps cookie merging behind a single writer.
struct Session {
    client: Client,
}

/// Bounded-concurrency fetch client owning the HTTP session
pub struct FetchClient {
    gate: Semaphore,
    session: Mutex<Option<Session>>,
    config: FetchConfig,
}

impl FetchClient {
    /// Creates a client; the underlying session is built lazily on first use
    pub fn new(config: FetchConfig) -> Self {
        Self {
            gate: Semaphore::new(config.max_concurrent_requests as usize),
            session: Mutex::new(None),
            config,
        }
    }

    /// Fetches a URL, blocking on the admission gate until a slot is free
    ///
    /// Non-2xx responses are returned as values. A timeout or connection
    /// failure resets the session and surfaces as an error; there is no
    /// retry at this layer.
    pub async fn get(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        let _permit = self.gate.acquire().await.expect("admission gate closed");

        let client = self.session_client().await?;

        match client.get(url.clone()).send().await {
            Ok(response) => {
                let status = response.status();
                let final_url = response.url().clone();
                match response.text().await {
                    Ok(body) => Ok(FetchResponse {
                        final_url,
                        status,
                        body,
                    }),
                    Err(e) => {
                        self.reset_session().await;
                        Err(self.classify_error(url, e))
                    }
                }
            }
            Err(e) => {
                self.reset_session().await;
                Err(self.classify_error(url, e))
            }
        }
    }

    /// Returns the current session's client, building one if needed
    ///
    /// The clone is cheap (`reqwest::Client` is reference-counted) and the
    /// lock is released before any network I/O; the semaphore alone paces
    /// concurrent requests.
    async fn session_client(&self) -> Result<Client, FetchError> {
        let mut guard = self.session.lock().await;
        if guard.is_none() {
            tracing::debug!("building new HTTP session");
            *guard = Some(build_session(&self.config).map_err(FetchError::Client)?);
        }
        Ok(guard.as_ref().map(|s| s.client.clone()).expect("session just built"))
    }

    /// Discards the session so the next request starts fresh
    ///
    /// Accumulated cookies are lost along with the connection pool.
    async fn reset_session(&self) {
        let mut guard = self.session.lock().await;
        if guard.take().is_some() {
            tracing::warn!("transport failure, discarding HTTP session");
        }
    }

    fn classify_error(&self, url: &Url, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                source: e,
            }
        }
    }
}

/// Builds a session with desktop-browser defaults and a fresh cookie jar
fn build_session(config: &FetchConfig) -> Result<Session, reqwest::Error> {
    let jar = Arc::new(Jar::default());

    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("ru-RU,ru;q=0.9,en-US;q=0.8"),
    );

    let client = Client::builder()
        .user_agent(DESKTOP_USER_AGENT)
        .default_headers(headers)
        .cookie_provider(jar)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(Session { client })
}
