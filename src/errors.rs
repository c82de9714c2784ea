use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidPayment(String),

    #[error("{0}")]
    InvalidQuery(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    InvalidTransition(String),

    #[error("Order was modified concurrently, reload and retry")]
    Conflict,

    #[error("Delivery code does not match")]
    OtpMismatch,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code sent alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InvalidPayment(_) => "INVALID_PAYMENT",
            AppError::InvalidQuery(_) => "INVALID_QUERY",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidTransition(_) => "INVALID_TRANSITION",
            AppError::Conflict => "CONFLICT",
            AppError::OtpMismatch => "OTP_MISMATCH",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(msg) => AppError::Validation(msg),
            DomainError::InvalidPayment(msg) => AppError::InvalidPayment(msg),
            DomainError::InvalidQuery(msg) => AppError::InvalidQuery(msg),
            DomainError::NotFound(what) => AppError::NotFound(what),
            e @ DomainError::InvalidTransition { .. } => AppError::InvalidTransition(e.to_string()),
            DomainError::Conflict => AppError::Conflict,
            DomainError::OtpMismatch => AppError::OtpMismatch,
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidPayment(_) | AppError::InvalidQuery(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidTransition(_) | AppError::Conflict => StatusCode::CONFLICT,
            AppError::OtpMismatch => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Internal(detail) => {
                log::error!("request failed: {}", detail);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": message,
            "code": self.code(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderStatus;
    use actix_web::body::to_bytes;
    use actix_web::ResponseError;

    async fn body_of(err: AppError) -> serde_json::Value {
        let bytes = to_bytes(err.error_response().into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn statuses_follow_error_kind() {
        let cases = [
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AppError::InvalidPayment("x".into()), StatusCode::BAD_REQUEST),
            (AppError::InvalidQuery("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (AppError::NotFound("Order"), StatusCode::NOT_FOUND),
            (AppError::InvalidTransition("x".into()), StatusCode::CONFLICT),
            (AppError::Conflict, StatusCode::CONFLICT),
            (AppError::OtpMismatch, StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.error_response().status(), status, "{:?}", err);
        }
    }

    #[actix_web::test]
    async fn not_found_body_names_the_entity() {
        let body = body_of(AppError::NotFound("Order")).await;
        assert_eq!(body["error"], "Order not found");
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[actix_web::test]
    async fn internal_error_hides_details() {
        let body = body_of(AppError::Internal("connection refused".to_string())).await;
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(body["code"], "INTERNAL_ERROR");
    }

    #[test]
    fn domain_transition_keeps_message() {
        let app_err: AppError = DomainError::InvalidTransition {
            from: OrderStatus::Delivered,
            action: "advance",
        }
        .into();
        assert_eq!(app_err.code(), "INVALID_TRANSITION");
        assert_eq!(
            app_err.to_string(),
            "Cannot advance an order in status DELIVERED"
        );
    }

    #[test]
    fn domain_conflict_and_otp_map_directly() {
        assert!(matches!(AppError::from(DomainError::Conflict), AppError::Conflict));
        assert!(matches!(
            AppError::from(DomainError::OtpMismatch),
            AppError::OtpMismatch
        ));
    }

    #[test]
    fn domain_validation_maps_to_bad_request() {
        let app_err: AppError = DomainError::Validation("phone is required".to_string()).into();
        assert_eq!(app_err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(app_err.to_string(), "phone is required");
    }
}
