//! The narrow HTTP seam everything network-facing goes through.
//!
//! Production uses [`HttpTransport`] (reqwest); tests script responses via
//! the `stagekit-testing` transport.

use futures::future::BoxFuture;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: String,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Request {
            method: Method::Get,
            url: url.into(),
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Request {
            method: Method::Post,
            url: url.into(),
        }
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Request {
            method: Method::Delete,
            url: url.into(),
        }
    }
}

/// A response that arrived, whatever its status.
///
/// Transport-level failures (no response at all) are the `Err` side of
/// [`Transport::execute`]; status-code handling stays with the callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
    /// The admin API's `x-error` header, its failure detail channel.
    pub error_header: Option<String>,
}

impl Response {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait Transport: Send + Sync {
    fn execute(&self, request: Request) -> BoxFuture<'_, Result<Response>>;
}

/// reqwest-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("stagekit")
            .build()
            .map_err(|err| Error::Config(format!("build http client: {}", err)))?;
        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: Request) -> BoxFuture<'_, Result<Response>> {
        Box::pin(async move {
            let builder = match request.method {
                Method::Get => self.client.get(&request.url),
                Method::Post => self.client.post(&request.url),
                Method::Delete => self.client.delete(&request.url),
            };
            let response = builder
                .send()
                .await
                .map_err(|err| Error::Transport(err.to_string()))?;

            let status = response.status().as_u16();
            let error_header = response
                .headers()
                .get("x-error")
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            let body = response.text().await.unwrap_or_default();

            Ok(Response {
                status,
                body,
                error_header,
            })
        })
    }
}
