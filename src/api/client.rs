//! HTTP client for the Lichess API
//!
//! Every request carries the bearer token and runs under the configured
//! [`RetryStack`], so retries are invisible to the scheduler.

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT},
    Client, Response, Url,
};
use std::time::Duration;

use super::LichessApi;
use crate::config::Config;
use crate::models::{Challenge, User};
use crate::utils::error::ApiError;
use crate::utils::retry::RetryStack;

/// Authenticated Lichess client
pub struct LichessClient {
    /// HTTP client with default auth headers
    client: Client,

    /// API base URL
    base_url: Url,

    /// Retry policies applied to each call
    retry: RetryStack,
}

impl LichessClient {
    /// Create a client from the loaded configuration
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidConfig` when the token is missing or cannot
    /// be used as a header, or `ApiError::Http` if the client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let token = config
            .token()
            .ok_or_else(|| ApiError::InvalidConfig("missing API token".to_string()))?;

        Self::with_options(
            &config.lichess.base_url,
            token,
            &config.lichess.user_agent,
            config.request_timeout(),
            config.retry.clone(),
        )
    }

    /// Create a client pointing at `base_url`, with default timeout and user agent
    pub fn new(base_url: &str, token: &str, retry: RetryStack) -> Result<Self, ApiError> {
        Self::with_options(
            base_url,
            token,
            concat!("lichess-challenger/", env!("CARGO_PKG_VERSION")),
            Duration::from_secs(30),
            retry,
        )
    }

    /// Create a client with every option spelled out
    pub fn with_options(
        base_url: &str,
        token: &str,
        user_agent: &str,
        timeout: Duration,
        retry: RetryStack,
    ) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidConfig(format!("invalid base URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidConfig(format!(
                "'{base_url}' cannot be used as a base URL"
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .default_headers(Self::build_headers(token, user_agent)?)
            .build()?;

        Ok(Self {
            client,
            base_url,
            retry,
        })
    }

    /// The configured base URL
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Base URL extended by `segments`, each percent-encoded as one segment
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Build the headers sent with every request
    fn build_headers(token: &str, user_agent: &str) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();

        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ApiError::InvalidConfig("token is not a valid header value".into()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let agent = HeaderValue::from_str(user_agent)
            .map_err(|_| ApiError::InvalidConfig("user agent is not a valid header".into()))?;
        headers.insert(USER_AGENT, agent);

        Ok(headers)
    }

    /// Single status query, no retries
    async fn fetch_status(&self, username: &str) -> Result<Option<User>, ApiError> {
        let url = self.endpoint(&["api", "users", "status"]);

        let response = self
            .client
            .get(url)
            .query(&[("ids", username)])
            .send()
            .await
            .map_err(map_transport_error)?;

        let users: Vec<User> = check_status(response)?
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        Ok(users.into_iter().find(|user| user.is(username)))
    }

    /// Single challenge request, no retries
    async fn post_challenge(&self, username: &str, challenge: &Challenge) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "challenge", username]);

        let response = self
            .client
            .post(url)
            .json(challenge)
            .send()
            .await
            .map_err(map_transport_error)?;

        check_status(response).map(|_| ())
    }
}

#[async_trait]
impl LichessApi for LichessClient {
    async fn user_status(&self, username: &str) -> Result<Option<User>, ApiError> {
        self.retry.run(move || self.fetch_status(username)).await
    }

    async fn create_challenge(
        &self,
        username: &str,
        challenge: &Challenge,
    ) -> Result<(), ApiError> {
        self.retry
            .run(move || self.post_challenge(username, challenge))
            .await
    }
}

/// Turn a non-success status into the matching error
fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::from_status(status.as_u16()))
    }
}

fn map_transport_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Http(e)
    }
}
