//! HTTP transport seam for the API client.
//!
//! `ApiClient` never talks to `reqwest` directly. It builds plain
//! `HttpRequest` values and hands them to a `Transport`, which lets the
//! token lifecycle be exercised against a scripted transport in tests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Method, StatusCode};
use tracing::debug;

use super::error::ApiError;

/// Request body variants needed by the auth encodings and reads
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(serde_json::Value),
    /// Form pairs, encoded by the transport
    Form(Vec<(String, String)>),
    /// Pre-encoded body sent verbatim
    Raw {
        content_type: &'static str,
        data: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: Body::Empty,
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query = pairs;
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    /// Look up a header value by case-insensitive name
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
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

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request. Only transport-level failures are errors;
    /// every HTTP status comes back as an `HttpResponse`.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Production transport on top of `reqwest`.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut builder = self.client.request(request.method.clone(), &request.url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(&value),
            Body::Form(pairs) => builder.form(&pairs),
            Body::Raw { content_type, data } => builder
                .header(header::CONTENT_TYPE, content_type)
                .body(data),
        };

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(url = %request.url, %status, "Response received");
        Ok(HttpResponse { status, body })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = HttpRequest::new(Method::GET, "http://example.test/api/v53a/")
            .header("Authorization", "Token abc")
            .query(vec![("page".into(), "2".into())]);

        assert_eq!(request.header_value("authorization"), Some("Token abc"));
        assert_eq!(request.header_value("X-Missing"), None);
        assert_eq!(request.query, vec![("page".to_string(), "2".to_string())]);
        assert_eq!(request.body, Body::Empty);
    }

    #[test]
    fn test_reqwest_transport_builds() {
        assert!(ReqwestTransport::new(Duration::from_secs(5)).is_ok());
    }
}
