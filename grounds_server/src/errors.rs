use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use grounds_engine::MarketError;
use log::error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("Requests from this address are not accepted")]
    ForbiddenPeer,
    #[error("{0}")]
    Market(#[from] MarketError),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ServerError {
    /// The error category reported alongside the message in error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Market(e) => e.kind(),
            Self::InvalidRequestBody(_) => "ValidationError",
            Self::AuthenticationError(_) => "AuthenticationError",
            Self::ForbiddenPeer => "AuthorizationError",
            Self::InitializeError(_) | Self::ConfigurationError(_) | Self::IOError(_) | Self::Unspecified(_) => {
                "ServerError"
            },
        }
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Market(e) => match e {
                MarketError::Validation(_) => StatusCode::BAD_REQUEST,
                MarketError::Authorization(_) => StatusCode::FORBIDDEN,
                MarketError::NotFound(_) => StatusCode::NOT_FOUND,
                MarketError::StateConflict { .. } => StatusCode::CONFLICT,
                MarketError::Concurrency(_) => StatusCode::CONFLICT,
                MarketError::ExternalService(_) => StatusCode::BAD_GATEWAY,
                MarketError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            Self::ForbiddenPeer => StatusCode::FORBIDDEN,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("💻️ {self}");
        }
        HttpResponse::build(status)
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string(), "kind": self.kind() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No access token was provided.")]
    MissingToken,
    #[error("Access token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("Access token is invalid. {0}")]
    ValidationError(String),
    #[error("Access token has expired.")]
    Expired,
}
