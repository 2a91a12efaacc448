use async_trait::async_trait;
use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::value_objects::invoices::{CreateInvoiceParams, XenditInvoice};

/// Failure classes from the provider API. Callers map these onto the HTTP
/// status they return to their own caller.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("xendit authentication failed")]
    Auth,

    #[error("xendit request forbidden")]
    Forbidden,

    #[error("xendit rate limit exceeded")]
    RateLimited,

    #[error("xendit unavailable (status {0})")]
    Upstream(u16),

    #[error("xendit transport error: {0}")]
    Transport(String),

    #[error("invoice not found")]
    NotFound,

    #[error("xendit request failed (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            GatewayError::Auth => StatusCode::UNAUTHORIZED,
            GatewayError::Forbidden => StatusCode::FORBIDDEN,
            GatewayError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::Upstream(_) | GatewayError::Transport(_) => StatusCode::BAD_GATEWAY,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::Api { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

/// Thin seam over the Xendit invoice API. Credentials come from the active
/// provider record on every call, so the auth header is recomputed per
/// request and nothing is cached between rotations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait XenditGateway: Send + Sync {
    async fn create_invoice(
        &self,
        secret_key: &str,
        base_url: &str,
        params: CreateInvoiceParams,
    ) -> Result<XenditInvoice, GatewayError>;

    /// Exactly one of `invoice_id` / `external_id` must be supplied.
    async fn get_invoice(
        &self,
        secret_key: &str,
        base_url: &str,
        invoice_id: Option<String>,
        external_id: Option<String>,
    ) -> Result<XenditInvoice, GatewayError>;
}
