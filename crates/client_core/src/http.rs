use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::error::ErrorBody;
use tracing::debug;
use url::Url;

use crate::error::ClientError;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Base URL plus a shared HTTP client for the storefront API.
#[derive(Debug, Clone)]
pub struct ApiEndpoint {
    http: Client,
    base_url: Url,
}

impl ApiEndpoint {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url.trim())?;
        // Url::join drops the last segment unless the base ends with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    pub fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    pub fn get(&self, path: &str) -> Result<RequestBuilder, ClientError> {
        Ok(self.http.get(self.url(path)?))
    }

    pub fn post(&self, path: &str) -> Result<RequestBuilder, ClientError> {
        Ok(self.http.post(self.url(path)?))
    }
}

/// Decodes a 2xx body as `T`, or maps the response onto [`ClientError::Api`]
/// carrying the server's `error` string when the body has one.
pub async fn read_json<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res.json::<T>().await?);
    }

    let raw = res.bytes().await.unwrap_or_default();
    let message = serde_json::from_slice::<ErrorBody>(&raw)
        .ok()
        .map(|body| body.error)
        .filter(|error| !error.trim().is_empty());
    debug!(status = status.as_u16(), ?message, "api request rejected");

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
