//! Authentication module for managing the token session and credentials.
//!
//! This module provides:
//! - `Session`: in-memory token state with expiry and refresh buffer
//! - `Credentials`: the username/password pair used to obtain tokens
//! - `CredentialStore`: OS-level credential storage via keyring
//!
//! Tokens live in memory only and default to a 24 hour lifetime when the
//! server does not report one.

pub mod credentials;
pub mod session;

pub use credentials::{CredentialStore, Credentials};
pub use session::{Session, SessionData};
