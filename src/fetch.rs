use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::error::RequestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// Thin JSON-over-HTTP wrapper around a base URL.
///
/// Every call is a single attempt: no retries and no caching. Callers decide
/// what to do with a [`RequestError`].
#[derive(Clone)]
pub struct FetchClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl FetchClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RequestError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RequestError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Resolve `path` against the base URL. For GET requests, `params` are
    /// percent-encoded into the query string; other methods ignore them.
    fn build_url(&self, path: &str, method: Method, params: Option<&[(&str, String)]>) -> String {
        let mut url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));

        if method == Method::Get {
            if let Some(params) = params.filter(|p| !p.is_empty()) {
                let query = params
                    .iter()
                    .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                    .collect::<Vec<_>>()
                    .join("&");
                url.push(if url.contains('?') { '&' } else { '?' });
                url.push_str(&query);
            }
        }

        url
    }

    pub async fn request<T, B>(
        &self,
        path: &str,
        method: Method,
        params: Option<&[(&str, String)]>,
        body: Option<&B>,
    ) -> Result<T, RequestError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.build_url(path, method, params);
        debug!(%method, %url, "sending request");

        let mut builder = self.client.request(method.as_reqwest(), &url);
        if method != Method::Get {
            if let Some(body) = body {
                builder = builder.json(body);
            }
        }

        let response = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            warn!(%method, %url, status = status.as_u16(), "request failed");
            debug!(body = %text, "error response body");
            return Err(RequestError::Status {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("Unknown status")
                    .to_string(),
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            warn!(%method, %url, error = %e, "undecodable response body");
            RequestError::Decode(e.to_string())
        })
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Option<&[(&str, String)]>,
    ) -> Result<T, RequestError> {
        self.request::<T, ()>(path, Method::Get, params, None).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, RequestError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(path, Method::Post, None, Some(body)).await
    }

    fn transport_error(&self, err: reqwest::Error) -> RequestError {
        if err.is_timeout() {
            RequestError::Timeout(self.timeout)
        } else if err.is_decode() {
            RequestError::Decode(err.to_string())
        } else {
            RequestError::Network(err.to_string())
        }
    }
}
