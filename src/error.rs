//! Error handling

use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::info;

/// Errors raised by the studio workflow and its web front end.
#[derive(Debug)]
pub enum StudioError {
    /// Required credentials were not supplied
    ConfigurationMissing(Vec<&'static str>),
    /// The prompt was blank
    EmptyPrompt,
    /// A form value was out of range or unparseable
    InvalidInput(String),
    /// The chat-completion call failed, the image call never happened
    EnhancementFailed(String),
    /// The image service answered with something other than HTTP 200
    GenerationFailed {
        /// upstream status code
        status: u16,
        /// upstream response body
        body: String,
    },
    /// The request never got an HTTP response
    Transport(String),
    /// Bytes returned by the image service could not be decoded
    ImageDecode(String),
    /// When a requested history entry or file is not found
    NotFound(String),
    /// Missing or invalid CSRF token
    Unauthorized,
    /// When an internal server error occurs
    InternalServerError(String),
}

impl std::fmt::Display for StudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigurationMissing(keys) => {
                write!(f, "Missing configuration: {}", keys.join(", "))
            }
            Self::EmptyPrompt => write!(f, "Please enter a prompt."),
            Self::InvalidInput(message) => write!(f, "Invalid input: {message}"),
            Self::EnhancementFailed(message) => write!(f, "Prompt enhancement failed: {message}"),
            Self::GenerationFailed { status, body } => {
                write!(f, "Image generation failed: {status} - {body}")
            }
            Self::Transport(message) => write!(f, "Request failed: {message}"),
            Self::ImageDecode(message) => write!(f, "Failed to decode image: {message}"),
            Self::NotFound(what) => write!(f, "Not found: {what}"),
            Self::Unauthorized => write!(f, "Unauthorized: invalid or missing session."),
            Self::InternalServerError(message) => write!(f, "Internal server error: {message}"),
        }
    }
}

impl std::error::Error for StudioError {}

impl StudioError {
    /// HTTP status used when this error reaches the browser.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ConfigurationMissing(_) | Self::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::EmptyPrompt | Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::EnhancementFailed(_)
            | Self::GenerationFailed { .. }
            | Self::Transport(_)
            | Self::ImageDecode(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl From<std::io::Error> for StudioError {
    fn from(err: std::io::Error) -> Self {
        StudioError::InternalServerError(err.to_string())
    }
}

impl From<axum::http::Error> for StudioError {
    fn from(err: axum::http::Error) -> Self {
        StudioError::InternalServerError(err.to_string())
    }
}

impl From<tower_sessions::session::Error> for StudioError {
    fn from(err: tower_sessions::session::Error) -> Self {
        StudioError::InternalServerError(err.to_string())
    }
}

impl From<image::ImageError> for StudioError {
    fn from(err: image::ImageError) -> Self {
        StudioError::ImageDecode(err.to_string())
    }
}

impl IntoResponse for StudioError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        match &self {
            StudioError::EmptyPrompt | StudioError::InvalidInput(_) => {
                info!("Bad request received: {}", self);
            }
            StudioError::Unauthorized => {
                info!("Unauthorized request received");
            }
            StudioError::NotFound(what) => {
                tracing::error!("404 {what}");
            }
            _ => {
                tracing::error!("{}", self);
            }
        }
        let mut response = axum::response::Response::new(axum::body::Body::from(self.to_string()));
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_failed_carries_status_and_body() {
        let err = StudioError::GenerationFailed {
            status: 429,
            body: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "Image generation failed: 429 - rate limited");
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn missing_configuration_lists_keys() {
        let err = StudioError::ConfigurationMissing(vec!["OPENAI_API_KEY", "STABILITY_API_KEY"]);
        assert_eq!(
            err.to_string(),
            "Missing configuration: OPENAI_API_KEY, STABILITY_API_KEY"
        );
    }

    #[test]
    fn bad_input_maps_to_400() {
        let response = StudioError::EmptyPrompt.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
