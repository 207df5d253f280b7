use std::fmt;

use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "v53a-client";

/// Username/password pair used to obtain tokens. Held in memory only.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Both halves must be non-empty to be usable
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

pub struct CredentialStore;

impl CredentialStore {
    /// Store username and password in the OS keychain
    pub fn store(credentials: &Credentials) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, credentials.username())
            .context("Failed to create keyring entry")?;
        entry
            .set_password(credentials.password())
            .context("Failed to store password in keychain")?;
        Ok(())
    }

    /// Retrieve password for a username from the OS keychain
    pub fn get_password(username: &str) -> Result<String> {
        let entry = Entry::new(SERVICE_NAME, username)
            .context("Failed to create keyring entry")?;
        entry
            .get_password()
            .context("Failed to retrieve password from keychain")
    }

    /// Look up stored credentials for a username, if any
    pub fn load(username: &str) -> Option<Credentials> {
        Self::get_password(username)
            .ok()
            .map(|password| Credentials::new(username, password))
    }
}
