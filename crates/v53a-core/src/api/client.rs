//! API client for the V53a records REST API.
//!
//! `ApiClient` owns one base URL, one credential pair and at most one
//! token. Every read makes sure a valid token is held first, and a read
//! rejected with 401 is retried exactly once after re-authenticating.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use reqwest::{header, Method, StatusCode};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::encoding::AuthEncoding;
use super::error::{truncate_body, ApiError};
use super::request::{ListQuery, Resource};
use super::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
use crate::auth::{Credentials, Session, SessionData};
use crate::config::ClientConfig;

#[derive(Default)]
struct State {
    credentials: Option<Credentials>,
    session: Session,
}

/// Session manager for the V53a API.
///
/// Token state sits behind a short-lived lock that is never held across
/// an await. Refreshes are serialized by `refresh`, so concurrent callers
/// that find the token invalid wait for one refresh and reuse its token.
pub struct ApiClient<T: Transport = ReqwestTransport> {
    transport: T,
    config: ClientConfig,
    state: Mutex<State>,
    refresh: tokio::sync::Mutex<()>,
}

impl ApiClient<ReqwestTransport> {
    /// Create a client on the production HTTP transport
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            transport,
            config,
            state: Mutex::new(State::default()),
            refresh: tokio::sync::Mutex::new(()),
        }
    }

    /// Store credentials to use for the first and later authentications
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .credentials = Some(credentials);
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current session, if a token is held
    pub fn session_data(&self) -> Option<SessionData> {
        self.state().session.data().cloned()
    }

    pub fn token(&self) -> Option<String> {
        self.state().session.token().map(str::to_string)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.state().session.expires_at()
    }

    /// True only if a token is held and it is outside the refresh buffer.
    /// Never touches the network.
    pub fn is_token_valid(&self) -> bool {
        self.state().session.is_valid()
    }

    fn valid_token(&self) -> Option<String> {
        let state = self.state();
        if state.session.is_valid() {
            state.session.token().map(str::to_string)
        } else {
            None
        }
    }

    // ===== Authentication =====

    /// Obtain a new token.
    ///
    /// `username`/`password` override the stored credential field by field.
    /// On success the session and credential are replaced; on failure
    /// nothing is changed.
    pub async fn authenticate(
        &self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<SessionData, ApiError> {
        let _guard = self.refresh.lock().await;
        self.authenticate_locked(username, password).await
    }

    /// Return a valid token, authenticating only if the held one is
    /// missing or inside the refresh buffer.
    pub async fn ensure_authenticated(&self) -> Result<String, ApiError> {
        if let Some(token) = self.valid_token() {
            return Ok(token);
        }

        let _guard = self.refresh.lock().await;
        // Another caller may have refreshed while we waited
        if let Some(token) = self.valid_token() {
            return Ok(token);
        }

        info!("Token expired or invalid. Refreshing...");
        let data = self.authenticate_locked(None, None).await?;
        Ok(data.token)
    }

    /// Replace a token the server rejected. If another caller already
    /// replaced `rejected`, its token is reused instead.
    async fn reauthenticate(&self, rejected: &str) -> Result<String, ApiError> {
        let _guard = self.refresh.lock().await;
        if let Some(current) = self.token() {
            if current != rejected {
                debug!("Token already refreshed by another request");
                return Ok(current);
            }
        }
        let data = self.authenticate_locked(None, None).await?;
        Ok(data.token)
    }

    /// Caller must hold `refresh`
    async fn authenticate_locked(
        &self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<SessionData, ApiError> {
        let credentials = {
            let state = self.state();
            let stored = state.credentials.as_ref();
            let username = username
                .filter(|u| !u.is_empty())
                .or(stored.map(Credentials::username))
                .unwrap_or_default();
            let password = password
                .filter(|p| !p.is_empty())
                .or(stored.map(Credentials::password))
                .unwrap_or_default();
            Credentials::new(username, password)
        };

        if !credentials.is_complete() {
            error!("No credentials provided for authentication");
            return Err(ApiError::MissingCredentials);
        }

        let data = self.request_token(&credentials).await?;

        let mut state = self.state();
        state.credentials = Some(credentials);
        state.session.update(data.clone());
        Ok(data)
    }

    /// Try each auth encoding in order until one answers with success
    async fn request_token(&self, credentials: &Credentials) -> Result<SessionData, ApiError> {
        let url = self.config.auth_url();
        info!(url = %url, username = credentials.username(), "Authenticating");

        let mut rejected: Option<ApiError> = None;
        let mut network_failure: Option<ApiError> = None;

        for encoding in AuthEncoding::ORDER {
            debug!(%encoding, "Trying authentication method");
            let issued_at = Utc::now();

            match self.transport.send(encoding.build_request(&url, credentials)).await {
                Ok(response) if response.status == StatusCode::OK => {
                    info!(%encoding, "Authentication succeeded");
                    let data = SessionData::from_auth_body(&response.body, issued_at)?;
                    info!(
                        token = %data.token_preview(),
                        expires_at = %data.expires_at,
                        "Token issued"
                    );
                    return Ok(data);
                }
                Ok(HttpResponse { status, body }) => {
                    debug!(%encoding, %status, body = %truncate_body(&body), "Authentication method rejected");
                    rejected = Some(ApiError::AuthenticationFailed { status, body });
                }
                Err(err) => {
                    warn!(%encoding, error = %err, "Authentication request failed");
                    network_failure = Some(err);
                }
            }
        }

        error!("All authentication methods failed");
        Err(rejected.or(network_failure).unwrap_or_else(|| {
            ApiError::Network("no authentication method was attempted".into())
        }))
    }

    // ===== Data Fetching Methods =====

    /// Fetch one resource, authenticating as needed.
    ///
    /// A 401 triggers exactly one re-authentication and one retry; the
    /// retry's outcome is final.
    pub async fn fetch(&self, resource: &Resource) -> Result<Value, ApiError> {
        let token = self.ensure_authenticated().await?;
        let mut response = self.send_read(resource, &token).await?;

        if response.status == StatusCode::UNAUTHORIZED {
            warn!(%resource, "Token rejected, re-authenticating and retrying once");
            let token = self.reauthenticate(&token).await?;
            response = self.send_read(resource, &token).await?;
        }

        Self::read_result(resource, response)
    }

    /// Fetch a page of V53a records with optional equality filters
    pub async fn list(&self, query: ListQuery) -> Result<Value, ApiError> {
        self.fetch(&Resource::List(query)).await
    }

    /// Fetch a single V53a record by id
    pub async fn detail(&self, id: i64) -> Result<Value, ApiError> {
        self.fetch(&Resource::Detail { id }).await
    }

    /// Fetch the last elements of a V53a record by DID
    pub async fn last_elements(&self, did: i64) -> Result<Value, ApiError> {
        self.fetch(&Resource::LastElements { did }).await
    }

    async fn send_read(&self, resource: &Resource, token: &str) -> Result<HttpResponse, ApiError> {
        let url = self.config.url_for(&resource.path());
        let query = resource.query();
        debug!(url = %url, ?query, "Requesting");

        let request = HttpRequest::new(Method::GET, url)
            .query(query)
            .header(header::AUTHORIZATION.as_str(), format!("Token {}", token))
            .header(header::CONTENT_TYPE.as_str(), "application/json");

        let response = self.transport.send(request).await?;
        debug!(status = %response.status, body = %truncate_body(&response.body), "Read response");
        Ok(response)
    }

    fn read_result(resource: &Resource, response: HttpResponse) -> Result<Value, ApiError> {
        if response.status.is_success() {
            return serde_json::from_str(&response.body).map_err(|e| {
                ApiError::UnparseableResponse(format!("invalid JSON for {}: {}", resource, e))
            });
        }

        if response.status == StatusCode::NOT_FOUND {
            warn!(%resource, "Record not found");
        } else {
            error!(%resource, status = %response.status, "Request failed");
        }
        Err(ApiError::from_status(
            response.status,
            &response.body,
            &resource.identifier(),
        ))
    }
}
