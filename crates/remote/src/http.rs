//! HTTP transport for the provisioning service.
//!
//! Carries a single capability attempt over JSON/HTTP and classifies every
//! failure into the `RemoteError` taxonomy the retry loop understands.
//! No resilience lives here — the call manager owns retries, pooling, and
//! the breaker.

use async_trait::async_trait;
use tripweaver_core::{
    ProvisionTransport, ProvisionedItem, RankRequest, Ranking, RemoteError, SearchRequest,
};

const DEFAULT_ATTEMPT_TIMEOUT_SECS: u64 = 8;

/// JSON/HTTP client for the provisioning service.
pub struct HttpProvisionTransport {
    name: String,
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpProvisionTransport {
    /// Create a transport against the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_ATTEMPT_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: "provisions-http".into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            client,
        }
    }

    /// Attach a bearer token for the provisioning service.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, RemoteError>
    where
        B: serde::Serialize + Sync,
        R: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(classify_transport_error)?;
        let status = response.status().as_u16();
        if let Some(err) = classify_http_status(status, retry_after_secs(&response)) {
            let detail = response.text().await.unwrap_or_default();
            return Err(attach_detail(err, &detail));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| RemoteError::Parse(e.to_string()))
    }
}

#[async_trait]
impl ProvisionTransport for HttpProvisionTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, request: SearchRequest) -> Result<Vec<ProvisionedItem>, RemoteError> {
        self.post("/v1/provisions/search", &request).await
    }

    async fn rank(&self, request: RankRequest) -> Result<Ranking, RemoteError> {
        self.post("/v1/provisions/rank", &request).await
    }
}

/// Map a reqwest-level failure (no HTTP status) onto the taxonomy.
fn classify_transport_error(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Timeout(err.to_string())
    } else if err.is_connect() {
        RemoteError::Connection(err.to_string())
    } else if err.is_decode() {
        RemoteError::Parse(err.to_string())
    } else {
        RemoteError::Unknown(err.to_string())
    }
}

/// Map a non-success HTTP status onto the taxonomy. `None` for success.
fn classify_http_status(status: u16, retry_after_secs: Option<u64>) -> Option<RemoteError> {
    match status {
        200..=299 => None,
        401 | 403 => Some(RemoteError::Authorization(format!("status {status}"))),
        429 => Some(RemoteError::RateLimited {
            retry_after_secs: retry_after_secs.unwrap_or(5),
        }),
        500..=599 => Some(RemoteError::RemoteTool {
            status,
            message: String::new(),
        }),
        _ => Some(RemoteError::Unknown(format!("unexpected status {status}"))),
    }
}

fn retry_after_secs(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Fold the response body into the classified error's message.
fn attach_detail(err: RemoteError, detail: &str) -> RemoteError {
    let detail = detail.trim();
    if detail.is_empty() {
        return err;
    }
    // Cap the detail so one failing call cannot flood the logs.
    let detail: String = detail.chars().take(200).collect();
    match err {
        RemoteError::RemoteTool { status, .. } => RemoteError::RemoteTool {
            status,
            message: detail,
        },
        RemoteError::Authorization(prefix) => {
            RemoteError::Authorization(format!("{prefix}: {detail}"))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_statuses_pass_through() {
        assert!(classify_http_status(200, None).is_none());
        assert!(classify_http_status(204, None).is_none());
    }

    #[test]
    fn auth_statuses_are_permanent() {
        for status in [401, 403] {
            let err = classify_http_status(status, None).unwrap();
            assert!(matches!(err, RemoteError::Authorization(_)));
            assert!(!err.retryable());
        }
    }

    #[test]
    fn rate_limit_uses_retry_after_header() {
        let err = classify_http_status(429, Some(17)).unwrap();
        assert!(matches!(
            err,
            RemoteError::RateLimited {
                retry_after_secs: 17
            }
        ));
        assert!(err.retryable());

        let err = classify_http_status(429, None).unwrap();
        assert!(matches!(
            err,
            RemoteError::RateLimited { retry_after_secs: 5 }
        ));
    }

    #[test]
    fn server_errors_are_transient() {
        for status in [500, 502, 503] {
            let err = classify_http_status(status, None).unwrap();
            assert!(matches!(err, RemoteError::RemoteTool { .. }));
            assert!(err.retryable());
        }
    }

    #[test]
    fn other_client_errors_are_not_retried() {
        let err = classify_http_status(400, None).unwrap();
        assert!(matches!(err, RemoteError::Unknown(_)));
        assert!(!err.retryable());
    }

    #[test]
    fn detail_is_attached_and_capped() {
        let err = classify_http_status(502, None).unwrap();
        let long_body = "x".repeat(1000);
        match attach_detail(err, &long_body) {
            RemoteError::RemoteTool { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message.len(), 200);
            }
            other => panic!("Expected RemoteTool, got: {other:?}"),
        }
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let transport = HttpProvisionTransport::new("https://provisions.example.com/");
        assert_eq!(transport.base_url, "https://provisions.example.com");
    }
}
