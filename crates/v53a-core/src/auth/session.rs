use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::ApiError;

/// Token lifetime assumed when the auth response carries no `expires_at`.
/// The server does not reliably report expiry.
const DEFAULT_TOKEN_LIFETIME_HOURS: i64 = 24;

/// Buffer time before expiry to trigger refresh (5 minutes)
const TOKEN_REFRESH_BUFFER_MINUTES: i64 = 5;

/// A bare-text auth body is taken as the token only if longer than this
const MIN_BARE_TOKEN_LEN: usize = 10;

/// One issued token. Token and expiry always travel together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(token: String, issued_at: DateTime<Utc>, expires_at: Option<DateTime<Utc>>) -> Self {
        let expires_at =
            expires_at.unwrap_or(issued_at + Duration::hours(DEFAULT_TOKEN_LIFETIME_HOURS));
        Self {
            token,
            issued_at,
            expires_at,
        }
    }

    /// Build session data from a successful auth response body.
    ///
    /// Accepts a JSON object with a `token` field (and optional
    /// `expires_at`), or a bare token as the whole body.
    pub fn from_auth_body(body: &str, issued_at: DateTime<Utc>) -> Result<Self, ApiError> {
        let text = body.trim();

        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => {
                let token = map
                    .get("token")
                    .and_then(Value::as_str)
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| {
                        ApiError::UnparseableResponse("token not found in response".to_string())
                    })?;

                let expires_at = match map.get("expires_at").and_then(Value::as_str) {
                    Some(raw) => {
                        let parsed = parse_expiry(raw);
                        if parsed.is_none() {
                            warn!(expires_at = raw, "Unrecognised expires_at, using default lifetime");
                        }
                        parsed
                    }
                    None => None,
                };

                Ok(Self::new(token.to_string(), issued_at, expires_at))
            }
            Ok(Value::String(token)) => Self::from_bare_token(&token, issued_at),
            _ => {
                debug!("Auth response is not a JSON object, trying bare token");
                Self::from_bare_token(text, issued_at)
            }
        }
    }

    // TODO: the server's plain-text token contract is undocumented; revisit the
    //  length/whitespace heuristic if short or spaced tokens ever show up.
    fn from_bare_token(text: &str, issued_at: DateTime<Utc>) -> Result<Self, ApiError> {
        let text = text.trim();
        if text.chars().count() > MIN_BARE_TOKEN_LEN && !text.chars().any(char::is_whitespace) {
            debug!("Response looks like a plain token string");
            Ok(Self::new(text.to_string(), issued_at, None))
        } else {
            Err(ApiError::UnparseableResponse(format!(
                "unable to parse authentication response: {}",
                crate::api::error::truncate_body(text)
            )))
        }
    }

    /// Valid only while `now` plus the refresh buffer is strictly before expiry
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now + Duration::minutes(TOKEN_REFRESH_BUFFER_MINUTES) < self.expires_at
    }

    pub fn time_until_expiry(&self) -> Duration {
        self.expires_at - Utc::now()
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self) -> i64 {
        self.time_until_expiry().num_minutes().max(0)
    }

    /// Token prefix that is safe to put in logs
    pub fn token_preview(&self) -> String {
        let prefix: String = self.token.chars().take(6).collect();
        format!("{}...", prefix)
    }
}

/// Parse an ISO-8601 `expires_at`. A trailing `Z` means UTC; timestamps
/// without an offset are taken as UTC.
pub fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// In-memory session: empty until the first successful authentication,
/// then replaced wholesale by each later one.
#[derive(Debug, Default)]
pub struct Session {
    data: Option<SessionData>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the session with freshly issued data
    pub fn update(&mut self, data: SessionData) {
        self.data = Some(data);
    }

    pub fn data(&self) -> Option<&SessionData> {
        self.data.as_ref()
    }

    /// Get the bearer token if one is held
    pub fn token(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.token.as_str())
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.data.as_ref().map(|d| d.expires_at)
    }

    /// Check if a token is held and outside the refresh buffer
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.data.as_ref().map(|d| d.is_valid_at(now)).unwrap_or(false)
    }
}
