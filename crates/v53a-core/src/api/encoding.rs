//! Wire encodings for the credential pair sent to the auth endpoint.
//!
//! The auth endpoint has accepted different encodings across server
//! revisions, so the client tries them in a fixed order and keeps the
//! first one that answers with a success status.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{header, Method};
use serde_json::json;

use super::transport::{Body, HttpRequest};
use crate::auth::Credentials;

/// Characters left unescaped in form values (matches `application/x-www-form-urlencoded`)
const FORM_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEncoding {
    Json,
    Form,
    PercentEncodedForm,
    Basic,
}

impl AuthEncoding {
    /// Order in which encodings are attempted
    pub const ORDER: [AuthEncoding; 4] = [
        AuthEncoding::Json,
        AuthEncoding::Form,
        AuthEncoding::PercentEncodedForm,
        AuthEncoding::Basic,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AuthEncoding::Json => "JSON data",
            AuthEncoding::Form => "Form data",
            AuthEncoding::PercentEncodedForm => "URL encoded form",
            AuthEncoding::Basic => "Basic Auth",
        }
    }

    /// Build the auth request for this encoding
    pub fn build_request(&self, url: &str, credentials: &Credentials) -> HttpRequest {
        let request = HttpRequest::new(Method::POST, url);
        match self {
            AuthEncoding::Json => request
                .header(header::CONTENT_TYPE.as_str(), "application/json")
                .body(Body::Json(json!({
                    "username": credentials.username(),
                    "password": credentials.password(),
                }))),
            AuthEncoding::Form => request.body(Body::Form(vec![
                ("username".to_string(), credentials.username().to_string()),
                ("password".to_string(), credentials.password().to_string()),
            ])),
            AuthEncoding::PercentEncodedForm => request.body(Body::Raw {
                content_type: FORM_CONTENT_TYPE,
                data: format!(
                    "username={}&password={}",
                    utf8_percent_encode(credentials.username(), FORM_VALUE),
                    utf8_percent_encode(credentials.password(), FORM_VALUE),
                ),
            }),
            AuthEncoding::Basic => {
                let pair = format!("{}:{}", credentials.username(), credentials.password());
                request.header(
                    header::AUTHORIZATION.as_str(),
                    format!("Basic {}", STANDARD.encode(pair)),
                )
            }
        }
    }
}

impl fmt::Display for AuthEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
