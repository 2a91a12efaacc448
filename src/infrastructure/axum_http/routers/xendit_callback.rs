use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;
use tracing::{error, info};

use crate::{
    application::usecases::webhook::{BookingLocks, WebhookError, XenditWebhookUseCase},
    domain::{
        repositories::{
            booking_logs::BookingLogRepository, bookings::BookingRepository,
            installments::InstallmentRepository, payment_gateway::XenditGateway,
            payment_providers::PaymentProviderRepository, transactions::TransactionRepository,
        },
        value_objects::webhook::XenditCallbackPayload,
    },
    infrastructure::{
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{
                booking_logs::BookingLogPostgres, bookings::BookingPostgres,
                installments::InstallmentPostgres, payment_providers::PaymentProviderPostgres,
                transactions::TransactionPostgres,
            },
        },
        xendit::xendit_client::XenditClient,
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>, xendit_client: Arc<XenditClient>) -> Router {
    let webhook_usecase = XenditWebhookUseCase::new(
        Arc::new(BookingPostgres::new(Arc::clone(&db_pool))),
        Arc::new(InstallmentPostgres::new(Arc::clone(&db_pool))),
        Arc::new(TransactionPostgres::new(Arc::clone(&db_pool))),
        Arc::new(BookingLogPostgres::new(Arc::clone(&db_pool))),
        Arc::new(PaymentProviderPostgres::new(Arc::clone(&db_pool))),
        xendit_client,
        Arc::new(BookingLocks::new()),
    );
    let webhook_usecase = Arc::new(webhook_usecase);

    // Older provider configurations still point at the alias paths.
    Router::new()
        .route("/v1/callback", post(callback))
        .route("/webhook/xendit", post(callback))
        .route("/api/webhook/xendit", post(callback))
        .with_state(webhook_usecase)
}

pub async fn callback<B, I, T, L, P, G>(
    State(webhook_usecase): State<Arc<XenditWebhookUseCase<B, I, T, L, P, G>>>,
    Json(payload): Json<XenditCallbackPayload>,
) -> Response
where
    B: BookingRepository + Send + Sync + 'static,
    I: InstallmentRepository + Send + Sync + 'static,
    T: TransactionRepository + Send + Sync + 'static,
    L: BookingLogRepository + Send + Sync + 'static,
    P: PaymentProviderRepository + Send + Sync + 'static,
    G: XenditGateway + Send + Sync + 'static,
{
    info!(
        invoice_id = ?payload.id,
        external_id = ?payload.external_id,
        claimed_status = ?payload.status,
        "xendit_callback: callback received"
    );

    match webhook_usecase.handle_callback(payload).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": outcome.message,
                "verifiedStatus": outcome.verified_status,
            })),
        )
            .into_response(),
        Err(err) => map_error(err),
    }
}

fn map_error(err: WebhookError) -> Response {
    let status = err.status_code();
    error!(
        status = status.as_u16(),
        error = %err,
        "xendit_callback: callback failed"
    );
    (
        status,
        Json(json!({
            "success": false,
            "error": err.to_string(),
            "errorCode": err.error_code(),
        })),
    )
        .into_response()
}
