use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("{0}")]
    NotImplemented(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AgentError {
    fn error_code(&self) -> &'static str {
        match self {
            AgentError::ValidationError(_) => "VALIDATION_ERROR",
            AgentError::NotImplemented(_) => "NOT_IMPLEMENTED",
            AgentError::ConfigurationError(_) => "CONFIGURATION_ERROR",
            AgentError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AgentError {
    fn status_code(&self) -> StatusCode {
        match self {
            AgentError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AgentError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            AgentError::ConfigurationError(_) | AgentError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.error_code(),
            "message": self.to_string()
        }))
    }
}

impl From<validator::ValidationErrors> for AgentError {
    fn from(err: validator::ValidationErrors) -> Self {
        AgentError::ValidationError(err.to_string())
    }
}

impl From<credit_engine::Error> for AgentError {
    fn from(err: credit_engine::Error) -> Self {
        AgentError::ConfigurationError(err.to_string())
    }
}

impl From<quote_events::Error> for AgentError {
    fn from(err: quote_events::Error) -> Self {
        AgentError::InternalError(err.to_string())
    }
}
