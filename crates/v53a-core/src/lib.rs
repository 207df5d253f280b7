//! Core library for the V53a records API.
//!
//! This crate provides:
//! - `api`: the session-managing `ApiClient`, its error type, the
//!   `Transport` seam and the request descriptors
//! - `auth`: token session state and credential handling
//! - `config`: client and persisted user configuration
//! - `models`: typed views over list and last-elements responses

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, ListQuery, Resource};
pub use auth::{Credentials, Session, SessionData};
pub use config::ClientConfig;
