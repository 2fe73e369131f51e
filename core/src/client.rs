//! Request lifecycle for the taskboard API.
//!
//! # Design
//! `ApiClient` splits every call into three steps: `build_request` produces an
//! `HttpRequest`, the `Transport` executes it, and `parse_response` turns the
//! `HttpResponse` into JSON or an `ApiError`. Only the middle step does I/O.
//!
//! Without a caller token, waiting for the response headers runs under the
//! configured deadline (30 s by default). The timer is dropped the moment the
//! headers arrive, so it never fires afterwards and never cuts off a slow
//! body. With a caller token only the token can stop the request, during
//! either stage.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::time::Instant;

use crate::cancel::CancelToken;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestOptions, APPLICATION_JSON, CONTENT_TYPE};
use crate::transport::{ReqwestTransport, ResponseBody, ResponseHead, Transport, TransportError};

#[derive(Debug, Clone)]
pub struct ApiClient<T> {
    config: ClientConfig,
    transport: T,
}

impl ApiClient<ReqwestTransport> {
    /// Client for the environment-configured base URL over reqwest.
    pub fn from_env() -> Self {
        Self::new(ClientConfig::default(), ReqwestTransport::new())
    }
}

impl<T> ApiClient<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn build_request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<String>,
        options: &RequestOptions,
    ) -> HttpRequest {
        let mut headers = vec![(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())];
        for (name, value) in &options.headers {
            let name = name.to_ascii_lowercase();
            headers.retain(|(existing, _)| *existing != name);
            headers.push((name, value.clone()));
        }

        HttpRequest {
            method,
            url: self.config.resolve(endpoint),
            headers,
            body,
        }
    }

    /// Interpret status and body. Empty successes parse to `{}`.
    pub fn parse_response(&self, response: &HttpResponse) -> Result<Value, ApiError> {
        if !response.is_success() {
            return Err(ApiError::http(response.status, error_detail(response)));
        }
        if response.is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        Ok(serde_json::from_str(&response.body)?)
    }
}

impl<T: Transport> ApiClient<T> {
    pub async fn request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<String>,
        options: RequestOptions,
    ) -> Result<Value, ApiError> {
        let request = self.build_request(method, endpoint, body, &options);
        let url = request.url.clone();
        tracing::debug!(target: "http", %method, %url, "request started");

        let started = Instant::now();
        let response = self.execute(request, options.cancel).await?;
        tracing::debug!(
            target: "http",
            %method,
            %url,
            status = response.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "response received"
        );

        let parsed = self.parse_response(&response);
        if let Err(ApiError::Http { message, status }) = &parsed {
            tracing::warn!(target: "http", %method, %url, status, %message, "error response");
        }
        parsed
    }

    async fn execute(
        &self,
        request: HttpRequest,
        cancel: Option<CancelToken>,
    ) -> Result<HttpResponse, ApiError> {
        let method = request.method;
        let url = request.url.clone();
        let exchange = self.transport.send(request);

        let head = match &cancel {
            Some(token) => tokio::select! {
                head = exchange => head,
                _ = token.cancelled() => {
                    tracing::debug!(target: "http", %method, %url, "request cancelled by caller");
                    return Err(ApiError::Cancelled);
                }
            },
            None => match tokio::time::timeout(self.config.timeout, exchange).await {
                Ok(head) => head,
                Err(_) => {
                    tracing::error!(
                        target: "http",
                        %method,
                        %url,
                        timeout_secs = self.config.timeout.as_secs(),
                        "request timed out"
                    );
                    return Err(ApiError::Timeout);
                }
            },
        };
        let ResponseHead { status, headers, body } =
            head.map_err(|err| transport_failure(method, &url, err))?;

        let body = match &cancel {
            Some(token) => tokio::select! {
                body = body.text() => body,
                _ = token.cancelled() => {
                    tracing::debug!(target: "http", %method, %url, status, "body read cancelled by caller");
                    return Err(ApiError::Cancelled);
                }
            },
            None => body.text().await,
        }
        .map_err(|err| transport_failure(method, &url, err))?;

        Ok(HttpResponse { status, headers, body })
    }

    pub async fn get<V: DeserializeOwned>(&self, endpoint: &str) -> Result<V, ApiError> {
        let value = self
            .request(HttpMethod::Get, endpoint, None, RequestOptions::default())
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// POST `body` as JSON; `None` sends no body.
    pub async fn post<B, V>(&self, endpoint: &str, body: Option<&B>) -> Result<V, ApiError>
    where
        B: Serialize + ?Sized,
        V: DeserializeOwned,
    {
        let body = body.map(encode).transpose()?;
        let value = self
            .request(HttpMethod::Post, endpoint, body, RequestOptions::default())
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// PUT `body` as JSON; `None` sends no body, for endpoints driven by the query string.
    pub async fn put<B, V>(&self, endpoint: &str, body: Option<&B>) -> Result<V, ApiError>
    where
        B: Serialize + ?Sized,
        V: DeserializeOwned,
    {
        let body = body.map(encode).transpose()?;
        let value = self
            .request(HttpMethod::Put, endpoint, body, RequestOptions::default())
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn delete(&self, endpoint: &str) -> Result<Value, ApiError> {
        self.request(HttpMethod::Delete, endpoint, None, RequestOptions::default())
            .await
    }
}

fn transport_failure(method: HttpMethod, url: &str, err: TransportError) -> ApiError {
    tracing::error!(target: "http", %method, %url, error = %err, "network failure");
    match err {
        TransportError::Connect(_) => ApiError::Network,
        TransportError::Other(detail) => ApiError::Transport(detail),
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<String, ApiError> {
    serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))
}

/// Best-effort message from an error body: `detail`, then `message`.
fn error_detail(response: &HttpResponse) -> String {
    let fallback = || format!("HTTP error! status: {}", response.status);
    let Ok(Value::Object(body)) = serde_json::from_str::<Value>(&response.body) else {
        return fallback();
    };
    ["detail", "message"]
        .iter()
        .find_map(|key| body.get(*key).and_then(message_text))
        .unwrap_or_else(fallback)
}

fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
