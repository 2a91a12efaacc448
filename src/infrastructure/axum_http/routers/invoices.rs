use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;
use tracing::info;

use crate::{
    application::usecases::invoice::{InvoiceError, InvoiceUseCase},
    domain::{
        repositories::{
            payment_gateway::XenditGateway, payment_providers::PaymentProviderRepository,
            users::UserRepository,
        },
        value_objects::invoices::{CreateInvoiceRequest, GetInvoiceRequest},
    },
    infrastructure::{
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{payment_providers::PaymentProviderPostgres, users::UserPostgres},
        },
        xendit::xendit_client::XenditClient,
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>, xendit_client: Arc<XenditClient>) -> Router {
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let provider_repository = PaymentProviderPostgres::new(Arc::clone(&db_pool));
    let invoice_usecase = InvoiceUseCase::new(
        Arc::new(user_repository),
        Arc::new(provider_repository),
        xendit_client,
    );

    Router::new()
        .route("/v1/create/invoice", post(create_invoice))
        .route("/v1/get/invoice", post(get_invoice))
        .with_state(Arc::new(invoice_usecase))
}

pub async fn create_invoice<U, P, G>(
    State(invoice_usecase): State<Arc<InvoiceUseCase<U, P, G>>>,
    Json(request): Json<CreateInvoiceRequest>,
) -> Response
where
    U: UserRepository + Send + Sync + 'static,
    P: PaymentProviderRepository + Send + Sync + 'static,
    G: XenditGateway + Send + Sync + 'static,
{
    info!(
        external_id = ?request.external_id,
        amount = ?request.amount,
        "invoices: create_invoice received"
    );
    match invoice_usecase.create_invoice(request).await {
        Ok(result) => success_response(json!(result)),
        Err(err) => error_response(err),
    }
}

pub async fn get_invoice<U, P, G>(
    State(invoice_usecase): State<Arc<InvoiceUseCase<U, P, G>>>,
    Json(request): Json<GetInvoiceRequest>,
) -> Response
where
    U: UserRepository + Send + Sync + 'static,
    P: PaymentProviderRepository + Send + Sync + 'static,
    G: XenditGateway + Send + Sync + 'static,
{
    info!(
        invoice_id = ?request.invoice_id,
        external_id = ?request.external_id,
        "invoices: get_invoice received"
    );
    match invoice_usecase.get_invoice(request).await {
        Ok(invoice) => success_response(json!(invoice)),
        Err(err) => error_response(err),
    }
}

fn success_response(data: serde_json::Value) -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": data,
        })),
    )
        .into_response()
}

fn error_response(err: InvoiceError) -> Response {
    (
        err.status_code(),
        Json(json!({
            "success": false,
            "error": err.to_string(),
            "errorCode": err.error_code(),
        })),
    )
        .into_response()
}
