//! Executing `HttpRequest`s over the network.
//!
//! # Design
//! `ApiClient` only depends on the `Transport` trait, so tests can script
//! responses in-process while production code uses `ReqwestTransport`.
//! Implementations report every HTTP status as data; interpreting the status
//! is the client's job.
//!
//! A response arrives in two stages. `Transport::send` resolves as soon as
//! the status line and headers are in, handing back a `ResponseHead` whose
//! body has not been read yet. `ResponseBody::text` then reads the rest. The
//! client's deadline only covers the first stage.

use std::future::Future;

use thiserror::Error;

use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The server could not be reached at all.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other failure while sending or reading the response.
    #[error("transport failed: {0}")]
    Other(String),
}

/// Status and headers of a response whose body is still pending.
#[derive(Debug)]
pub struct ResponseHead<B> {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: B,
}

impl ResponseHead<String> {
    /// A head whose body is already in memory.
    pub fn complete(response: HttpResponse) -> Self {
        Self {
            status: response.status,
            headers: response.headers,
            body: response.body,
        }
    }
}

/// The unread remainder of a response.
pub trait ResponseBody: Send {
    fn text(self) -> impl Future<Output = Result<String, TransportError>> + Send;
}

impl ResponseBody for String {
    async fn text(self) -> Result<String, TransportError> {
        Ok(self)
    }
}

pub trait Transport: Send + Sync {
    type Body: ResponseBody;

    /// Resolves once the status line and headers have arrived.
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<ResponseHead<Self::Body>, TransportError>> + Send;
}

/// `Transport` backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// Body of a reqwest response, read on demand.
#[derive(Debug)]
pub struct ReqwestBody(reqwest::Response);

impl ResponseBody for ReqwestBody {
    async fn text(self) -> Result<String, TransportError> {
        self.0.text().await.map_err(classify)
    }
}

impl Transport for ReqwestTransport {
    type Body = ReqwestBody;

    async fn send(&self, request: HttpRequest) -> Result<ResponseHead<ReqwestBody>, TransportError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        // reqwest resolves `send` once headers are parsed; the body streams later.
        let response = builder.send().await.map_err(classify)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        Ok(ResponseHead {
            status,
            headers,
            body: ReqwestBody(response),
        })
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn complete_head_reads_back_its_body() {
        let head = ResponseHead::complete(HttpResponse::new(201, r#"{"id":3}"#));
        assert_eq!(head.status, 201);
        assert_eq!(head.body.text().await.unwrap(), r#"{"id":3}"#);
    }
}
