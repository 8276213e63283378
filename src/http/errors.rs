use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

use crate::domain::order::OrderError;

/// Error body returned by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: &'static str,
    /// Human-readable error message
    pub message: String,
    /// Input field the error refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

impl ResponseError for OrderError {
    fn status_code(&self) -> StatusCode {
        match self {
            OrderError::NotFound(_) => StatusCode::NOT_FOUND,
            OrderError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            OrderError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            OrderError::MalformedLine { .. }
            | OrderError::InvalidPrice { .. }
            | OrderError::TotalTooLarge
            | OrderError::EmptyItems
            | OrderError::EmptyItemName
            | OrderError::InvalidTableNumber(_)
            | OrderError::InvalidStatus(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Store details stay in the logs
        let message = match self {
            OrderError::Storage(_) => "Order storage is unavailable".to_string(),
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            code: self.code(),
            message,
            field: self.field(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn test_status_codes() {
        assert_eq!(OrderError::EmptyItems.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(OrderError::TotalTooLarge.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(OrderError::MalformedBody("eof".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(OrderError::NotFound(1).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            OrderError::Storage(StoreError::Poisoned("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn test_storage_error_body_hides_details() {
        let response = OrderError::Storage(StoreError::Poisoned("secret".into())).error_response();
        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["code"], "storage_error");
        assert!(!json["message"].as_str().unwrap().contains("secret"));
        assert!(json.get("field").is_none());
    }
}
