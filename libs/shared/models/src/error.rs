use thiserror::Error;

/// Failure talking to the hospital backend.
///
/// Carries strings rather than transport errors so it can be cloned into
/// view state and sent across task boundaries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Authentication error: {0}")]
    Unauthorized(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("API error ({status}): {body}")]
    Server { status: u16, body: String },

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to encode request body: {0}")]
    Encode(String),
}

impl ApiError {
    /// Maps a non-success status and its body to the matching variant.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => ApiError::Unauthorized(body),
            404 => ApiError::NotFound(body),
            _ => ApiError::Server { status, body },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_variants() {
        assert_eq!(
            ApiError::from_status(401, "nope".into()),
            ApiError::Unauthorized("nope".into())
        );
        assert_eq!(
            ApiError::from_status(403, "nope".into()),
            ApiError::Unauthorized("nope".into())
        );
        assert_eq!(
            ApiError::from_status(404, "gone".into()),
            ApiError::NotFound("gone".into())
        );
        assert_eq!(
            ApiError::from_status(409, "taken".into()),
            ApiError::Server { status: 409, body: "taken".into() }
        );
    }
}
