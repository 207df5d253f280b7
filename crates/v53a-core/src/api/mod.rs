//! REST API client module for the V53a records service.
//!
//! This module provides the `ApiClient` session manager for fetching
//! V53a records, record details and last-element snapshots.
//!
//! The API uses token authentication: a token is obtained from the
//! `api-token-auth/` endpoint and presented as `Authorization: Token ...`
//! on every read request.

pub mod client;
pub mod encoding;
pub mod error;
pub mod request;
pub mod transport;

pub use client::ApiClient;
pub use encoding::AuthEncoding;
pub use error::ApiError;
pub use request::{ListQuery, Resource};
pub use transport::{Body, HttpRequest, HttpResponse, ReqwestTransport, Transport};
