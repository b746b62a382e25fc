use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::routes::helpers::error_chain_fmt;

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::AuthorizationError => StatusCode::UNAUTHORIZED,
            ApiError::WeakPassword => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            Self::UnexpectedError(_) => "Something went wrong.".to_string(),
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": message }))
    }
}

#[derive(thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Unauthorized")]
    AuthorizationError,
    #[error("The new password is too weak.")]
    WeakPassword,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
