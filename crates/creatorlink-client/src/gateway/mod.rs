//! Single entry point for every HTTP call made against the marketplace API.
//!
//! [`RequestGateway`] attaches the resolved credential, executes the call,
//! normalizes the response and converts every failure (transport errors,
//! malformed bodies, non-2xx payloads) into one [`ApiError`]. A 401 clears
//! all stored credentials and navigates to the login location before the
//! error is returned, unless the caller opted out.

mod normalize;

use std::sync::Arc;
use std::time::Duration;

use creatorlink_core::AppConfig;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::token::TokenResolver;

use normalize::{normalize, Normalized};

const DEFAULT_LOGIN_PATH: &str = "/login";

/// Reaction to an expired session: send the user to sign in again.
pub trait Navigator: Send + Sync {
    fn navigate(&self, location: &str);
}

/// Navigator for headless front ends: records the redirect in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, location: &str) {
        tracing::warn!(location, "session expired; sign in again");
    }
}

#[derive(Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Text(String),
    /// Raw bytes; the caller is responsible for the content type.
    Binary(Vec<u8>),
    Multipart(reqwest::multipart::Form),
}

impl RequestBody {
    fn wants_json_content_type(&self) -> bool {
        matches!(
            self,
            RequestBody::Empty | RequestBody::Json(_) | RequestBody::Text(_)
        )
    }
}

/// Per-call options. `Default` is an authenticated `GET` with no body.
#[derive(Debug, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub body: RequestBody,
    pub headers: HeaderMap,
    /// Do not attach any credential.
    pub skip_auth: bool,
    /// Return a 401 as-is without clearing credentials or navigating.
    pub skip_auth_error_handling: bool,
    /// Overrides the gateway's base URL for this call.
    pub base_url: Option<String>,
    pub cancel: Option<CancellationToken>,
}

impl RequestOptions {
    #[must_use]
    pub fn get() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn post_json(body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            body: RequestBody::Json(body),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn patch_json(body: serde_json::Value) -> Self {
        Self {
            method: Method::PATCH,
            body: RequestBody::Json(body),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: Option<CancellationToken>) -> Self {
        self.cancel = cancel;
        self
    }
}

pub struct RequestGateway {
    client: Client,
    base_url: String,
    login_path: String,
    tokens: TokenResolver,
    navigator: Arc<dyn Navigator>,
}

impl RequestGateway {
    /// Creates a gateway for `base_url` with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns the `reqwest` error if the HTTP client cannot be constructed.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        tokens: TokenResolver,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("creatorlink/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            tokens,
            navigator,
        })
    }

    /// Creates a gateway from the resolved application config.
    ///
    /// # Errors
    ///
    /// Returns the `reqwest` error if the HTTP client cannot be constructed.
    pub fn from_config(
        config: &AppConfig,
        tokens: TokenResolver,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(&config.api_base_url, config.request_timeout_secs, tokens, navigator)?
            .with_login_path(&config.login_path))
    }

    #[must_use]
    pub fn with_login_path(mut self, login_path: &str) -> Self {
        login_path.clone_into(&mut self.login_path);
        self
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenResolver {
        &self.tokens
    }

    /// Executes one call and decodes a successful body into `T`.
    ///
    /// `Ok(None)` means success without data: a 204, a non-JSON body, or a
    /// JSON body that could not be decoded.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for every failure. A 401 has already cleared the
    /// credential store and triggered navigation when it is returned, unless
    /// `skip_auth_error_handling` was set.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Option<T>, ApiError> {
        let skip_recovery = options.skip_auth_error_handling;
        let outcome = match options.cancel.clone() {
            Some(cancel) => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => Err(ApiError::cancelled()),
                    result = self.execute(endpoint, options) => result,
                }
            }
            None => self.execute(endpoint, options).await,
        };

        match outcome {
            Ok(value) => Ok(value.and_then(|v| decode::<T>(endpoint, v))),
            Err(err) => {
                if err.status_code == 401 && !skip_recovery {
                    self.recover_from_auth_failure(endpoint);
                }
                Err(err)
            }
        }
    }

    /// Same as [`Self::request`] but returns the response envelope instead of
    /// a `Result`.
    pub async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> ApiResponse<T> {
        self.request(endpoint, options).await.into()
    }

    async fn execute(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Option<serde_json::Value>, ApiError> {
        let RequestOptions {
            method,
            body,
            mut headers,
            skip_auth,
            base_url,
            ..
        } = options;

        if !skip_auth && !headers.contains_key(AUTHORIZATION) {
            if let Some(credential) = self.tokens.resolve().await {
                let value = HeaderValue::from_str(&format!("Bearer {}", credential.value))
                    .map_err(|e| ApiError::transport(format!("invalid credential: {e}")))?;
                headers.insert(AUTHORIZATION, value);
            }
        }

        if body.wants_json_content_type() && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        let base = base_url.as_deref().unwrap_or(&self.base_url);
        let url = format!("{}{endpoint}", base.trim_end_matches('/'));
        tracing::debug!(%method, %url, "sending API request");

        let mut builder = self.client.request(method, &url).headers(headers);
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.body(
                serde_json::to_vec(&value)
                    .map_err(|e| ApiError::transport(format!("could not encode body: {e}")))?,
            ),
            RequestBody::Text(text) => builder.body(text),
            RequestBody::Binary(bytes) => builder.body(bytes),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;

        tracing::debug!(%url, status = status.as_u16(), "API response received");

        match normalize(status, content_type.as_deref(), &bytes) {
            Normalized::Success(value) => Ok(value),
            Normalized::Failure(err) => Err(err),
        }
    }

    fn recover_from_auth_failure(&self, endpoint: &str) {
        tracing::warn!(endpoint, "request rejected as unauthenticated; clearing credentials");
        if let Err(e) = self.tokens.clear_all() {
            tracing::warn!(error = %e, "could not clear credential store");
        }
        self.navigator.navigate(&self.login_path);
    }
}

fn decode<T: DeserializeOwned>(endpoint: &str, value: serde_json::Value) -> Option<T> {
    serde_json::from_value(value)
        .map_err(|e| {
            tracing::warn!(endpoint, error = %e, "response body did not match expected shape");
        })
        .ok()
}
