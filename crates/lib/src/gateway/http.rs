//! HTTP implementation of [`RemoteProfileGateway`].
//!
//! Talks JSON to four endpoints under a base URL:
//!
//! | Operation  | Request                    |
//! |------------|----------------------------|
//! | profile    | `GET  {base}/profile`       |
//! | login      | `POST {base}/auth/login`    |
//! | register   | `POST {base}/auth/register` |
//! | logout     | `POST {base}/auth/logout`   |
//!
//! Session tokens travel as bearer credentials. 401/403 map to
//! [`GatewayError::Rejected`]; any other failure maps to a transport error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use super::{
    AuthPayload, Credentials, GatewayError, ProfilePayload, Registration, RemoteProfileGateway,
};
use crate::Result;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP gateway using reqwest.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base: Url,
}

impl HttpGateway {
    /// Create a gateway for `base_url` with the default timeout.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a gateway for `base_url` whose requests give up after `timeout`.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(base_url).map_err(|e| GatewayError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(GatewayError::InvalidUrl {
                url: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            }
            .into());
        }
        // Relative joins replace the last path segment unless it ends in '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Unreachable {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { client, base })
    }

    /// The normalized base URL.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base.join(path).map_err(|e| {
            GatewayError::InvalidUrl {
                url: format!("{}{path}", self.base),
                reason: e.to_string(),
            }
            .into()
        })
    }

    async fn send(&self, request: RequestBuilder, token: Option<&str>) -> Result<Response> {
        let request = match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await.map_err(|e| GatewayError::Unreachable {
            reason: e.to_string(),
        })?;
        trace!(status = %response.status(), url = %response.url(), "Remote responded");
        Ok(response)
    }
}

/// Turn a non-success response into the matching [`GatewayError`].
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let reason = error_reason(response).await;
    let err = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::Rejected {
            status: status.as_u16(),
            reason,
        },
        // Other client errors are refusals too (duplicate username, bad input)
        s if s.is_client_error()
            && s != StatusCode::REQUEST_TIMEOUT
            && s != StatusCode::TOO_MANY_REQUESTS =>
        {
            GatewayError::Rejected {
                status: s.as_u16(),
                reason,
            }
        }
        s => GatewayError::Unreachable {
            reason: format!("server returned {s}: {reason}"),
        },
    };
    Err(err.into())
}

/// Best-effort extraction of a human readable message from an error body.
async fn error_reason(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .or_else(|| v.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string())
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    response.json::<T>().await.map_err(|e| {
        GatewayError::InvalidResponse {
            reason: e.to_string(),
        }
        .into()
    })
}

#[async_trait]
impl RemoteProfileGateway for HttpGateway {
    async fn fetch_profile(&self, token: Option<&str>) -> Result<ProfilePayload> {
        let url = self.endpoint("profile")?;
        let response = self.send(self.client.get(url), token).await?;

        // Without a credential an unauthorized answer just means "nobody"
        if token.is_none() && response.status() == StatusCode::UNAUTHORIZED {
            debug!("Anonymous profile fetch; remote reports no user");
            return Ok(ProfilePayload::default());
        }

        decode(check_status(response).await?).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthPayload> {
        let url = self.endpoint("auth/login")?;
        let response = self.send(self.client.post(url).json(credentials), None).await?;
        decode(check_status(response).await?).await
    }

    async fn register(&self, registration: &Registration) -> Result<AuthPayload> {
        let url = self.endpoint("auth/register")?;
        let response = self
            .send(self.client.post(url).json(registration), None)
            .await?;
        decode(check_status(response).await?).await
    }

    async fn logout(&self, token: Option<&str>) -> Result<()> {
        let url = self.endpoint("auth/logout")?;
        let response = self.send(self.client.post(url), token).await?;
        check_status(response).await?;
        Ok(())
    }
}
