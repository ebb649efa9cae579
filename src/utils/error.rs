use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;

/// One entry of the `errors` array returned on validation failure
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct FieldError {
    pub location: String,
    pub param: String,
    pub msg: String,
}

impl FieldError {
    pub fn body(param: &str, msg: &str) -> Self {
        FieldError {
            location: "body".to_string(),
            param: param.to_string(),
            msg: msg.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    DatabaseError(String),
    ExternalError(String),
    NotFound(String),
    InvalidRequest(String),
    Unauthorized(String),
    Validation(Vec<FieldError>),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::ExternalError(msg) => write!(f, "External service error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Validation(errors) => {
                let params: Vec<&str> = errors.iter().map(|e| e.param.as_str()).collect();
                write!(f, "Validation failed: {}", params.join(", "))
            }
        }
    }
}

impl std::error::Error for AppError {}

impl From<mongodb::error::Error> for AppError {
    fn from(e: mongodb::error::Error) -> Self {
        AppError::DatabaseError(e.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for AppError {
    fn from(e: mongodb::bson::ser::Error) -> Self {
        AppError::DatabaseError(e.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) | AppError::InvalidRequest(_) | AppError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::DatabaseError(_) | AppError::ExternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Validation(errors) => HttpResponse::build(self.status_code())
                .json(serde_json::json!({ "errors": errors })),
            AppError::NotFound(msg) | AppError::InvalidRequest(msg) | AppError::Unauthorized(msg) => {
                HttpResponse::build(self.status_code()).json(serde_json::json!({ "msg": msg }))
            }
            AppError::DatabaseError(_) | AppError::ExternalError(_) => {
                // Details stay in the server log
                log::error!("❌ {}", self);
                HttpResponse::InternalServerError()
                    .content_type("text/plain; charset=utf-8")
                    .body("Server Error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_rt::test]
    async fn test_not_found_is_bad_request_with_msg() {
        let response = AppError::NotFound("Profile not found".into()).error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["msg"], "Profile not found");
    }

    #[actix_rt::test]
    async fn test_database_error_hides_details() {
        let response = AppError::DatabaseError("connection refused".into()).error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body()).await.unwrap();
        assert_eq!(&body[..], b"Server Error");
    }

    #[actix_rt::test]
    async fn test_validation_lists_field_errors() {
        let error = AppError::Validation(vec![FieldError::body("status", "Status is required")]);
        assert_eq!(error.to_string(), "Validation failed: status");

        let body = to_bytes(error.error_response().into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["errors"][0]["param"], "status");
        assert_eq!(json["errors"][0]["msg"], "Status is required");
        assert_eq!(json["errors"][0]["location"], "body");
    }
}
