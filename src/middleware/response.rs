use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::ApiError;

/// Success envelope: `{status: "success", token?, results?, data?}`.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    data: Option<T>,
    token: Option<String>,
    results: Option<usize>,
    status_code: StatusCode,
}

/// Handler return type: the `?` operator funnels every error into the
/// central error renderer instead of dropping it.
pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            token: None,
            results: None,
            status_code: StatusCode::OK,
        }
    }

    pub fn created(data: T) -> Self {
        Self {
            status_code: StatusCode::CREATED,
            ..Self::success(data)
        }
    }

    pub fn with_token(token: String, data: T) -> Self {
        Self {
            token: Some(token),
            ..Self::success(data)
        }
    }

    /// List response carrying the result count alongside the data.
    pub fn listing(results: usize, data: T) -> Self {
        Self {
            results: Some(results),
            ..Self::success(data)
        }
    }
}

impl ApiResponse<()> {
    pub fn token_only(token: String) -> Self {
        Self {
            data: None,
            token: Some(token),
            results: None,
            status_code: StatusCode::OK,
        }
    }

    pub fn no_content() -> Self {
        Self {
            data: None,
            token: None,
            results: None,
            status_code: StatusCode::NO_CONTENT,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        if self.status_code == StatusCode::NO_CONTENT {
            return self.status_code.into_response();
        }

        let data = match self.data.map(|d| serde_json::to_value(&d)).transpose() {
            Ok(value) => value,
            Err(e) => {
                return ApiError::internal(
                    anyhow::Error::new(e).context("failed to serialize response data"),
                )
                .into_response();
            }
        };

        let mut body = Map::new();
        body.insert("status".to_string(), json!("success"));
        if let Some(token) = self.token {
            body.insert("token".to_string(), json!(token));
        }
        if let Some(results) = self.results {
            body.insert("results".to_string(), json!(results));
        }
        if let Some(data) = data {
            body.insert("data".to_string(), data);
        }

        (self.status_code, Json(Value::Object(body))).into_response()
    }
}
