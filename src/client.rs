// Reqwest-backed client for the remote game user API.
//
// Every call is a single attempt: no retries, no backoff. Failures are
// reduced to `ApiError` and rendered inline by the pages.

use std::time::{Duration, Instant};

use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::metrics;
use crate::models::{
    ErrorBody, ForceScoreRequest, RegisterUserRequest, RegisterUserResponse, UserResponse,
};

const USER_AGENT: &str = concat!("game-admin/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
    #[error("request to game API failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("game API returned status {status}")]
    Status { status: u16, message: Option<String> },
    #[error("invalid game API response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Reduce the error to the text shown next to the form: the server's
    /// message when it sent one, otherwise the page default.
    pub fn display_message(&self, default: &str) -> String {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } if !message.is_empty() => message.clone(),
            _ => default.to_string(),
        }
    }

    fn outcome(&self) -> &'static str {
        match self {
            ApiError::InvalidUrl(_) => "invalid_url",
            ApiError::Transport(_) => "transport",
            ApiError::Status { .. } => "status",
            ApiError::Decode(_) => "decode",
        }
    }
}

/// Connection settings for the remote API.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub token: String,
    pub register_path: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: String,
    register_path: Vec<String>,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", settings.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(settings.base_url.clone()));
        }
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        let register_path = settings
            .register_path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            client,
            base_url,
            token: settings.token.clone(),
            register_path,
        })
    }

    /// `POST /api/users/register` (or the configured variant).
    pub async fn register_user(
        &self,
        req: &RegisterUserRequest,
    ) -> Result<RegisterUserResponse, ApiError> {
        let url = self.endpoint(self.register_path.iter().map(String::as_str))?;
        let body = self.send("register", Method::POST, url, Some(req)).await?;
        decode(&body)
    }

    /// `GET /api/users/{code}`.
    pub async fn find_user(&self, code: &str) -> Result<UserResponse, ApiError> {
        let url = self.endpoint(["api", "users", code])?;
        let body = self
            .send::<()>("find_user", Method::GET, url, None)
            .await?;
        decode(&body)
    }

    /// `POST /api/scores/force`. The success body carries nothing of interest.
    pub async fn force_score(&self, req: &ForceScoreRequest) -> Result<(), ApiError> {
        let url = self.endpoint(["api", "scores", "force"])?;
        self.send("force_score", Method::POST, url, Some(req))
            .await
            .map(|_| ())
    }

    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        endpoint: &'static str,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Vec<u8>, ApiError> {
        let request_id = uuid::Uuid::new_v4();
        let started = Instant::now();
        tracing::debug!(%request_id, endpoint, %method, %url, "calling game API");

        let result = self.execute(method, url, body).await;

        metrics::UPSTREAM_REQUEST_DURATION_SECONDS
            .with_label_values(&[endpoint])
            .observe(started.elapsed().as_secs_f64());
        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.outcome(),
        };
        metrics::UPSTREAM_REQUESTS_TOTAL
            .with_label_values(&[endpoint, outcome])
            .inc();

        if let Err(e) = &result {
            tracing::warn!(%request_id, endpoint, error = %e, "game API call failed");
        }
        result
    }

    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Vec<u8>, ApiError> {
        let mut request = self
            .client
            .request(method, url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(|body| body.message);
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(bytes.to_vec())
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    Ok(serde_json::from_slice(bytes)?)
}
