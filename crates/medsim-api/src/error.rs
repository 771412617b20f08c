use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use medsim_core::CoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wire shape of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub message: String,
}

impl From<ErrorBody> for serde_json::Value {
    fn from(body: ErrorBody) -> Self {
        let mut object = serde_json::Map::with_capacity(1);
        object.insert("message".to_string(), Self::String(body.message));
        Self::Object(object)
    }
}

/// High-level API errors to be mapped to HTTP responses
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    MethodNotAllowed(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
    pub fn method_not_allowed(msg: impl Into<String>) -> Self {
        Self::MethodNotAllowed(msg.into())
    }
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            message: self.to_string(),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::EntityNotFound { kind, .. } => {
                ApiError::not_found(format!("{} not found", kind.label()))
            }
            CoreError::UnknownCollection(name) => {
                ApiError::not_found(format!("Unknown collection: {name}"))
            }
            CoreError::InvalidDateTime(_) | CoreError::InvalidEntity { .. } => {
                ApiError::bad_request(err.to_string())
            }
            CoreError::Configuration(_) | CoreError::JsonError(_) => {
                ApiError::internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;
    use medsim_core::EntityKind;

    #[test]
    fn into_response_sets_status_and_content_type() {
        let resp = ApiError::bad_request("Invalid parameter").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let content_type = resp.headers().get(header::CONTENT_TYPE).unwrap();
        assert_eq!(content_type, "application/json");
    }

    #[test]
    fn entity_not_found_uses_label() {
        let cases = [
            (EntityKind::Patient, "Patient not found"),
            (EntityKind::Appointment, "Appointment not found"),
            (EntityKind::Record, "Record not found"),
        ];
        for (kind, message) in cases {
            let err = ApiError::from(CoreError::entity_not_found(kind, "9"));
            assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
            assert_eq!(err.to_body().message, message);
        }
    }

    #[test]
    fn api_error_variants_map_to_status() {
        let cases = vec![
            (ApiError::bad_request("x"), StatusCode::BAD_REQUEST),
            (ApiError::not_found("x"), StatusCode::NOT_FOUND),
            (ApiError::method_not_allowed("x"), StatusCode::METHOD_NOT_ALLOWED),
            (ApiError::internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases.into_iter() {
            assert_eq!(err.status_code(), status);
            assert_eq!(err.to_string(), "x");
        }
    }

    #[test]
    fn core_errors_classified() {
        let bad = ApiError::from(CoreError::invalid_date_time("soon"));
        assert_eq!(bad.status_code(), StatusCode::BAD_REQUEST);

        let unknown = ApiError::from(CoreError::unknown_collection("invoices"));
        assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);

        let config = ApiError::from(CoreError::configuration("bad"));
        assert_eq!(config.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_body_converts_to_message_object() {
        let value = serde_json::Value::from(ApiError::method_not_allowed("nope").to_body());
        assert_eq!(value, serde_json::json!({"message": "nope"}));
    }
}
