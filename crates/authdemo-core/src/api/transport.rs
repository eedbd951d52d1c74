//! HTTP transport seam.
//!
//! `ApiClient` builds `HttpRequest`s and hands them to an `HttpTransport`.
//! Production code uses `ReqwestTransport`; tests swap in a scripted fake.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode};

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>, body: String) -> Self {
        let mut request = Self::new(Method::POST, url);
        request.body = Some(body);
        request
    }

    /// Add a header, failing if the value is not a legal header value
    pub fn header(mut self, name: HeaderName, value: &str) -> Result<Self> {
        let value = HeaderValue::from_str(value)
            .with_context(|| format!("Invalid value for header {}", name))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Header value as a string, if present and printable
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Sends one request and returns the raw response.
///
/// Any HTTP status is a successful send. An `Err` means the exchange itself
/// failed: DNS, refused connection, broken body stream.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Transport backed by a shared `reqwest::Client`.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// No timeout is configured: a hung request stays pending until the
    /// server or the OS gives up.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.client.request(method.clone(), &url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .with_context(|| format!("Failed to send {} request to {}", method, url))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;

        Ok(HttpResponse { status, body })
    }
}


#[cfg(test)]
mod tests {
    use reqwest::header::{ACCEPT, AUTHORIZATION};

    use super::*;

    #[test]
    fn test_request_builders() {
        let request = HttpRequest::get("http://localhost/api/demo/user")
            .header(ACCEPT, "application/json")
            .unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.header_str("accept"), Some("application/json"));
        assert!(request.body.is_none());

        let request = HttpRequest::post("http://localhost/api/auth/login", "{}".to_string());
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.body.as_deref(), Some("{}"));
    }

    #[test]
    fn test_invalid_header_value_is_an_error() {
        let result = HttpRequest::get("http://localhost").header(AUTHORIZATION, "Bearer bad\ntoken");
        assert!(result.is_err());
    }
}
