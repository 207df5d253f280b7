use reqwest::StatusCode;
use thiserror::Error;

/// Boxed cause carried by transport-level failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("No credentials available for authentication")]
    MissingCredentials,

    #[error("Authentication failed ({status}): {}", truncate_body(.body))]
    AuthenticationFailed { status: StatusCode, body: String },

    #[error("Unparseable response: {0}")]
    UnparseableResponse(String),

    #[error("Network error: {0}")]
    Network(#[source] BoxError),

    #[error("Record not found: {identifier}")]
    NotFound { identifier: String },

    #[error("Request failed ({status}): {}", truncate_body(.body))]
    RequestFailed { status: StatusCode, body: String },
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(Box::new(err))
    }
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Truncate a response body to avoid logging excessive data
pub(crate) fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
}

impl ApiError {
    /// Map a non-success read response to its terminal error.
    /// `identifier` names what was requested, for not-found reporting.
    pub fn from_status(status: StatusCode, body: &str, identifier: &str) -> Self {
        match status {
            StatusCode::NOT_FOUND => ApiError::NotFound {
                identifier: identifier.to_string(),
            },
            _ => ApiError::RequestFailed {
                status,
                body: body.to_string(),
            },
        }
    }

    /// Whether a login failure points at credentials, URL or endpoint
    /// rather than at a specific record
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ApiError::MissingCredentials
                | ApiError::AuthenticationFailed { .. }
                | ApiError::UnparseableResponse(_)
                | ApiError::Network(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("short"), "short");

        let long = "x".repeat(600);
        let truncated = truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(500)));
        assert!(truncated.ends_with("(truncated, 600 total bytes)"));

        // Multi-byte chars straddling the cut must not panic
        let wide = "é".repeat(400);
        let truncated = truncate_body(&wide);
        assert!(truncated.contains("truncated, 800 total bytes"));
    }

    #[test]
    fn test_from_status() {
        match ApiError::from_status(StatusCode::NOT_FOUND, "nope", "250520") {
            ApiError::NotFound { identifier } => assert_eq!(identifier, "250520"),
            other => panic!("unexpected error: {other:?}"),
        }

        match ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom", "1") {
            ApiError::RequestFailed { status, body } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_display_keeps_full_body_on_variant() {
        let body = "y".repeat(700);
        let err = ApiError::RequestFailed {
            status: StatusCode::BAD_GATEWAY,
            body: body.clone(),
        };
        assert!(err.to_string().contains("truncated, 700 total bytes"));
        if let ApiError::RequestFailed { body: kept, .. } = err {
            assert_eq!(kept, body);
        }
    }

    #[test]
    fn test_is_auth_failure() {
        assert!(ApiError::MissingCredentials.is_auth_failure());
        assert!(ApiError::AuthenticationFailed {
            status: StatusCode::BAD_REQUEST,
            body: String::new(),
        }
        .is_auth_failure());
        assert!(ApiError::UnparseableResponse("x".into()).is_auth_failure());
        assert!(ApiError::Network("refused".into()).is_auth_failure());
        assert!(!ApiError::NotFound {
            identifier: "1".into()
        }
        .is_auth_failure());
        assert!(!ApiError::RequestFailed {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: String::new(),
        }
        .is_auth_failure());
    }
}
