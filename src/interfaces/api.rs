use crate::application::service::PaymentService;
use crate::domain::payment::{Payment, PaymentId, PaymentStatus};
use crate::error::{PaymentError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::idempotency::IdempotencyGuard;

/// HTTP-style status codes used at the transport boundary.
pub mod status {
    pub const OK: u16 = 200;
    pub const CREATED: u16 = 201;
    pub const BAD_REQUEST: u16 = 400;
    pub const PAYMENT_REQUIRED: u16 = 402;
    pub const NOT_FOUND: u16 = 404;
    pub const CONFLICT: u16 = 409;
    pub const INTERNAL_ERROR: u16 = 500;
}

/// A finished response: status code plus serialized JSON body.
///
/// This is the unit the idempotency cache stores and replays, so it must be
/// cheap to clone and byte-stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn json(status: u16, value: &impl Serialize) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self { status, body },
            Err(err) => Self::error(
                status::INTERNAL_ERROR,
                format!("response serialization failed: {err}"),
            ),
        }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        #[derive(Serialize)]
        struct ErrorBody {
            error: String,
        }
        let body = serde_json::to_string(&ErrorBody {
            error: message.into(),
        })
        .unwrap_or_else(|_| r#"{"error":"internal error"}"#.to_string());
        Self { status, body }
    }

    fn from_error(err: PaymentError) -> Self {
        let status = match &err {
            PaymentError::InvalidArguments(_) => status::BAD_REQUEST,
            PaymentError::NotFound(_) => status::NOT_FOUND,
            PaymentError::InvalidTransition { .. } => status::CONFLICT,
            _ => status::INTERNAL_ERROR,
        };
        Self::error(status, err.to_string())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CreatePaymentRequest {
    pub amount: Decimal,
    pub currency: String,
}

/// Read-only projection of a payment record handed to callers.
#[derive(Debug, Serialize)]
pub struct PaymentView {
    pub id: PaymentId,
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    pub gateway_transaction_id: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl From<&Payment> for PaymentView {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.id(),
            amount: payment.amount().value(),
            currency: payment.currency().to_string(),
            status: payment.status().to_string(),
            gateway_transaction_id: payment.gateway_transaction_id().map(str::to_string),
            failure_reason: payment.failure_reason().map(str::to_string),
            created_at: payment.created_at(),
            processed_at: payment.processed_at(),
        }
    }
}

/// Transport-neutral payment endpoints.
///
/// Write routes pass through the idempotency guard; the read route does not.
/// Each handler maps service outcomes onto HTTP-style codes: 201 for a
/// created record, 200 for a captured one, 402 for a declined charge, 404
/// for an unknown id and 409 for a confirm in a non-confirmable state.
pub struct PaymentEndpoints {
    service: PaymentService,
    guard: IdempotencyGuard,
}

impl PaymentEndpoints {
    pub fn new(service: PaymentService, guard: IdempotencyGuard) -> Self {
        Self { service, guard }
    }

    pub async fn create(
        &self,
        request: CreatePaymentRequest,
        idempotency_token: Option<&str>,
    ) -> ApiResponse {
        self.guard
            .execute(idempotency_token, || async {
                match self.service.initiate(request.amount, &request.currency).await {
                    Ok(payment) => {
                        ApiResponse::json(status::CREATED, &PaymentView::from(&payment))
                    }
                    Err(err) => ApiResponse::from_error(err),
                }
            })
            .await
    }

    pub async fn confirm(&self, id: &str, idempotency_token: Option<&str>) -> ApiResponse {
        let id: PaymentId = match id.parse() {
            Ok(id) => id,
            Err(err) => return ApiResponse::from_error(err),
        };

        self.guard
            .execute(idempotency_token, || async {
                match self.service.confirm(id).await {
                    Ok(payment) if payment.status() == PaymentStatus::Failed => {
                        ApiResponse::json(status::PAYMENT_REQUIRED, &PaymentView::from(&payment))
                    }
                    Ok(payment) => ApiResponse::json(status::OK, &PaymentView::from(&payment)),
                    Err(err) => ApiResponse::from_error(err),
                }
            })
            .await
    }

    pub async fn get(&self, id: &str) -> ApiResponse {
        let id: PaymentId = match id.parse() {
            Ok(id) => id,
            Err(err) => return ApiResponse::from_error(err),
        };

        match self.service.get(id).await {
            Ok(Some(payment)) => ApiResponse::json(status::OK, &PaymentView::from(&payment)),
            Ok(None) => ApiResponse::from_error(PaymentError::NotFound(id)),
            Err(err) => ApiResponse::from_error(err),
        }
    }

    /// Consumes the endpoints and returns every stored payment record.
    pub async fn into_records(self) -> Result<Vec<Payment>> {
        self.service.into_records().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            ApiResponse::from_error(PaymentError::InvalidArguments("bad".into())).status,
            status::BAD_REQUEST
        );
        assert_eq!(
            ApiResponse::from_error(PaymentError::NotFound(PaymentId::new())).status,
            status::NOT_FOUND
        );
        assert_eq!(
            ApiResponse::from_error(PaymentError::InvalidTransition {
                operation: "confirm",
                state: PaymentStatus::Failed,
            })
            .status,
            status::CONFLICT
        );
        assert_eq!(
            ApiResponse::from_error(PaymentError::Storage("down".into())).status,
            status::INTERNAL_ERROR
        );
    }

    #[test]
    fn test_error_body_is_json() {
        let response = ApiResponse::from_error(PaymentError::InvalidArguments("bad".into()));
        let value: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert!(value["error"].as_str().unwrap().contains("bad"));
    }
}
