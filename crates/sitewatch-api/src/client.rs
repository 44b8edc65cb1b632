// Backend HTTP client
//
// Wraps `reqwest::Client` with backend URL construction and status
// checking. Endpoint groups (sites, intervals, statuses) are implemented
// as inherent methods in separate files to keep this module focused on
// transport mechanics.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Raw HTTP client for the monitoring backend.
///
/// Every request negotiates JSON. Any non-success HTTP status is an
/// [`Error::Http`], whatever the body says.
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Option<Duration>,
}

impl BackendClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the backend root (e.g. `http://127.0.0.1:8000`); a
    /// path prefix is kept if present.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_json_client()?;
        Ok(Self {
            http,
            base_url,
            timeout: Some(transport.timeout),
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            timeout: None,
        }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for a backend path: `{base}/{path}`.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// Build a URL with a single query parameter.
    pub(crate) fn url_with_query(&self, path: &str, key: &str, value: &str) -> Result<Url, Error> {
        let mut url = self.url(path)?;
        url.query_pairs_mut().append_pair(key, value);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);
        let body = self.execute(self.http.get(url)).await?;
        decode(&body)
    }

    /// Send a POST request with a JSON body and return the raw response body.
    pub(crate) async fn post(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<String, Error> {
        debug!("POST {}", url);
        self.execute(self.http.post(url).json(body)).await
    }

    /// Send a PATCH request with a JSON body and decode the response.
    pub(crate) async fn patch<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("PATCH {}", url);
        let body = self.execute(self.http.patch(url).json(body)).await?;
        decode(&body)
    }

    /// Send a DELETE request. The response body is ignored.
    pub(crate) async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {}", url);
        self.execute(self.http.delete(url)).await.map(|_| ())
    }

    /// Send the request, fail on any non-success status, return the body.
    async fn execute(&self, builder: reqwest::RequestBuilder) -> Result<String, Error> {
        let resp = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "backend returned an error status");
            return Err(Error::Http {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        let body = resp.text().await.map_err(|e| self.transport_error(e))?;
        trace!(bytes = body.len(), "response body received");
        Ok(body)
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        match self.timeout {
            Some(timeout) if err.is_timeout() => Error::Timeout {
                timeout_secs: timeout.as_secs(),
            },
            _ => Error::Transport(err),
        }
    }
}

/// Decode a JSON body, keeping a preview of the body on failure.
pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.to_owned(),
        }
    })
}

/// Pull a human-readable message out of an error body.
///
/// The backend reports failures as `{"detail": "..."}`; anything else is
/// truncated and passed through.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct Detail {
        detail: serde_json::Value,
    }

    if let Ok(Detail { detail }) = serde_json::from_str::<Detail>(body) {
        return match detail {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_owned()
    } else {
        trimmed.chars().take(200).collect()
    }
}
