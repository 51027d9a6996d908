//! Shared HTTP plumbing for the upstream clients
//! One client per upstream: bounded timeout, credential header built once,
//! retry with backoff for transient failures only

use reqwest::{header, Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

use super::AdapterError;
use crate::config::{ConfigError, UpstreamConfig};
use crate::security::{basic_auth_header, bearer_auth_header, SecureString};

/// Credential-bearing JSON client for one upstream base URL
pub struct HttpClient {
    client: Client,
    base_url: String,
    auth_header: SecureString,
    max_retries: u32,
    retry_delay_ms: u64,
}

impl HttpClient {
    /// Validates the upstream config at construction; a missing base URL or
    /// credential fails here, at startup, never per-request.
    pub fn new(service: &'static str, config: &UpstreamConfig) -> Result<Self, ConfigError> {
        config.validate(service)?;

        let auth_header = if config.auth_user.is_empty() {
            bearer_auth_header(&config.api_token)
        } else {
            basic_auth_header(&config.auth_user, &config.api_token)
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_header,
            max_retries: config.max_retries,
            retry_delay_ms: config.retry_delay_ms,
        })
    }

    /// GET a lookup endpoint where 404 means "not found" rather than failure
    pub async fn get_optional(&self, path_and_query: &str) -> Result<Option<Value>, AdapterError> {
        let resp = self.get(path_and_query).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode_json(resp).await.map(Some)
    }

    /// GET a required endpoint; any non-2xx status is an error
    pub async fn get_required(&self, path_and_query: &str) -> Result<Value, AdapterError> {
        let resp = self.get(path_and_query).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(AdapterError::Api { status: 404 });
        }
        decode_json(resp).await
    }

    async fn get(&self, path_and_query: &str) -> Result<reqwest::Response, AdapterError> {
        let url = format!("{}{}", self.base_url, path_and_query);
        self.execute_with_retry(|| async {
            self.client
                .get(&url)
                .header(header::AUTHORIZATION, self.auth_header.as_str())
                .header(header::ACCEPT, "application/json")
                .send()
                .await
        })
        .await
    }

    /// Execute a request with retry logic for transient errors.
    /// Does NOT retry on auth errors (401/403); 404 passes through so
    /// lookup endpoints can map it to not-found.
    async fn execute_with_retry<F, Fut>(&self, request_fn: F) -> Result<reqwest::Response, AdapterError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            match request_fn().await {
                Ok(response) => {
                    let status = response.status();

                    // Auth errors: fail immediately, no retry
                    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                        return Err(AdapterError::AuthFailed);
                    }

                    // Rate limited: fail immediately with specific error
                    if status == StatusCode::TOO_MANY_REQUESTS {
                        return Err(AdapterError::RateLimited);
                    }

                    if status.is_success() || status == StatusCode::NOT_FOUND {
                        return Ok(response);
                    }

                    // Server errors (5xx): retry
                    if status.is_server_error() {
                        tracing::debug!("upstream returned {}, attempt {}", status, attempt + 1);
                        last_error = Some(AdapterError::Api {
                            status: status.as_u16(),
                        });
                        if attempt < self.max_retries {
                            tokio::time::sleep(Duration::from_millis(
                                self.retry_delay_ms * (attempt as u64 + 1),
                            ))
                            .await;
                            continue;
                        }
                    } else {
                        // Other client errors: fail immediately
                        return Err(AdapterError::Api {
                            status: status.as_u16(),
                        });
                    }
                }
                Err(e) => {
                    if e.is_timeout() {
                        last_error = Some(AdapterError::Timeout);
                    } else if e.is_connect() || e.is_request() {
                        // Connection errors: retry
                        last_error = Some(AdapterError::Request(e));
                    } else {
                        return Err(AdapterError::Request(e));
                    }

                    if attempt < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(
                            self.retry_delay_ms * (attempt as u64 + 1),
                        ))
                        .await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or(AdapterError::Timeout))
    }
}

async fn decode_json(resp: reqwest::Response) -> Result<Value, AdapterError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(AdapterError::Api {
            status: status.as_u16(),
        });
    }
    resp.json::<Value>()
        .await
        .map_err(|e| AdapterError::Decode(e.to_string()))
}

/// Percent-encode one query value
pub fn encode_query(pairs: &[(&str, &str)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}
