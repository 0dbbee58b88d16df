// Application error taxonomy and the terminal error renderer.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use once_cell::sync::OnceCell;
use serde_json::{json, Value};

use crate::config::Environment;
use crate::store::StoreError;

/// How errors are rendered, set once at startup from the injected config.
/// Defaults to production rendering if never initialized.
static RENDER_MODE: OnceCell<Environment> = OnceCell::new();

pub fn init_error_rendering(environment: Environment) {
    let _ = RENDER_MODE.set(environment);
}

fn render_mode() -> Environment {
    RENDER_MODE.get().copied().unwrap_or(Environment::Production)
}

const GENERIC_MESSAGE: &str = "Something went very wrong!";

/// Every handler and middleware error funnels into this type; its
/// `IntoResponse` impl is the single place error bodies are produced.
///
/// All variants except `Internal` are operational: anticipated, user-facing
/// failures whose message is always safe to surface. `Internal` wraps an
/// unexpected cause and never leaks it outside development mode.
#[derive(Debug)]
pub enum ApiError {
    // 400
    BadRequest(String),
    Validation(String),
    // 401
    Unauthorized(String),
    // 403
    Forbidden(String),
    // 404
    NotFound(String),
    // 500, non-operational
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal(cause: impl Into<anyhow::Error>) -> Self {
        ApiError::Internal(cause.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Operational errors carry a message intended for the client.
    pub fn is_operational(&self) -> bool {
        !matches!(self, ApiError::Internal(_))
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Validation(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg) => msg,
            ApiError::Internal(_) => GENERIC_MESSAGE,
        }
    }

    /// `fail` for 4xx, `error` for 5xx.
    fn status_label(&self) -> &'static str {
        if self.status_code().is_client_error() {
            "fail"
        } else {
            "error"
        }
    }

    fn body(&self, mode: Environment) -> Value {
        match mode {
            Environment::Development => {
                // Full detail for local debugging, including the raw cause.
                let message = match self {
                    ApiError::Internal(cause) => cause.to_string(),
                    _ => self.message().to_string(),
                };
                json!({
                    "status": self.status_label(),
                    "message": message,
                    "error": format!("{:?}", self),
                })
            }
            Environment::Production => {
                if self.is_operational() {
                    json!({
                        "status": self.status_label(),
                        "message": self.message(),
                    })
                } else {
                    json!({
                        "status": "error",
                        "message": GENERIC_MESSAGE,
                    })
                }
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Internal(cause) => write!(f, "{}", cause),
            _ => write!(f, "{}", self.message()),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<anyhow::Error> for ApiError {
    fn from(cause: anyhow::Error) -> Self {
        ApiError::Internal(cause)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(msg) => ApiError::Validation(msg),
            StoreError::Duplicate(field) => ApiError::Validation(format!(
                "Duplicate field value: {}. Please use another value!",
                field
            )),
            StoreError::NotFound => ApiError::NotFound("Record not found".to_string()),
            StoreError::Database(cause) => {
                ApiError::Internal(anyhow::Error::new(cause).context("database error"))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if !self.is_operational() {
            if let ApiError::Internal(cause) = &self {
                tracing::error!("unexpected error: {:#}", cause);
            }
        }
        let body = self.body(render_mode());
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operational_classification() {
        assert!(ApiError::not_found("x").is_operational());
        assert!(ApiError::unauthorized("x").is_operational());
        assert!(!ApiError::internal(anyhow::anyhow!("boom")).is_operational());
    }

    #[test]
    fn status_labels_follow_status_class() {
        assert_eq!(ApiError::bad_request("x").status_label(), "fail");
        assert_eq!(ApiError::forbidden("x").status_label(), "fail");
        assert_eq!(
            ApiError::internal(anyhow::anyhow!("boom")).status_label(),
            "error"
        );
    }

    #[test]
    fn duplicate_store_error_becomes_validation() {
        let err = ApiError::from(StoreError::Duplicate("email"));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.message().contains("email"));
    }

    #[test]
    fn production_body_redacts_internal_causes() {
        let err = ApiError::internal(anyhow::anyhow!("connection refused to 10.0.0.5"));
        let body = err.body(Environment::Production);
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], GENERIC_MESSAGE);
        assert!(!body.to_string().contains("10.0.0.5"));
    }

    #[test]
    fn development_body_carries_full_detail() {
        let err = ApiError::internal(anyhow::anyhow!("connection refused to 10.0.0.5"));
        let body = err.body(Environment::Development);
        assert_eq!(body["status"], "error");
        assert!(body["message"].as_str().unwrap().contains("10.0.0.5"));
        assert!(body["error"].as_str().unwrap().contains("Internal"));

        let err = ApiError::not_found("No tour found with that ID");
        let body = err.body(Environment::Development);
        assert_eq!(body["status"], "fail");
        assert_eq!(body["message"], "No tour found with that ID");
        assert!(body["error"].as_str().unwrap().contains("NotFound"));
    }
}
