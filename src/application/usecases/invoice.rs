use std::sync::Arc;

use axum::http::StatusCode;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::domain::{
    entities::payment_providers::PaymentProviderEntity,
    repositories::{
        payment_gateway::{GatewayError, XenditGateway},
        payment_providers::PaymentProviderRepository,
        users::UserRepository,
    },
    value_objects::invoices::{
        ActorProfile, CreateInvoiceParams, CreateInvoiceRequest, CreateInvoiceResult,
        DEFAULT_CURRENCY, DEFAULT_INVOICE_DURATION_SECS, GetInvoiceRequest, ProviderIdentity,
        XenditInvoice,
    },
};

#[derive(Debug, Error)]
pub enum InvoiceError {
    #[error("performed_by is required")]
    MissingPerformedBy,

    #[error("user not found")]
    UserNotFound,

    #[error("payment provider not found")]
    ProviderNotFound,

    #[error("payment provider has no secret key")]
    MissingSecretKey,

    #[error("external_id and amount are required")]
    MissingRequiredFields,

    #[error("amount must be a positive number")]
    InvalidAmount,

    #[error("payment gateway error: {0}")]
    Gateway(GatewayError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl InvoiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            InvoiceError::MissingPerformedBy
            | InvoiceError::MissingSecretKey
            | InvoiceError::MissingRequiredFields
            | InvoiceError::InvalidAmount => StatusCode::BAD_REQUEST,
            InvoiceError::UserNotFound => StatusCode::FORBIDDEN,
            InvoiceError::ProviderNotFound => StatusCode::NOT_FOUND,
            InvoiceError::Gateway(err) => err.status_code(),
            InvoiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            InvoiceError::MissingPerformedBy => "MISSING_PERFORMED_BY",
            InvoiceError::UserNotFound => "USER_NOT_FOUND",
            InvoiceError::ProviderNotFound => "PAYMENT_PROVIDER_NOT_FOUND",
            InvoiceError::MissingSecretKey => "MISSING_SECRET_KEY",
            InvoiceError::MissingRequiredFields => "MISSING_REQUIRED_FIELDS",
            InvoiceError::InvalidAmount => "INVALID_AMOUNT",
            InvoiceError::Gateway(_) => "XENDIT_ERROR",
            InvoiceError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, InvoiceError>;

/// Validates and enriches invoice requests before delegating to the gateway.
pub struct InvoiceUseCase<U, P, G>
where
    U: UserRepository + Send + Sync + 'static,
    P: PaymentProviderRepository + Send + Sync + 'static,
    G: XenditGateway + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    provider_repo: Arc<P>,
    gateway: Arc<G>,
}

impl<U, P, G> InvoiceUseCase<U, P, G>
where
    U: UserRepository + Send + Sync + 'static,
    P: PaymentProviderRepository + Send + Sync + 'static,
    G: XenditGateway + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, provider_repo: Arc<P>, gateway: Arc<G>) -> Self {
        Self {
            user_repo,
            provider_repo,
            gateway,
        }
    }

    pub async fn create_invoice(
        &self,
        request: CreateInvoiceRequest,
    ) -> UseCaseResult<CreateInvoiceResult> {
        let performed_by = request.performed_by.ok_or_else(|| {
            let err = InvoiceError::MissingPerformedBy;
            warn!(
                status = err.status_code().as_u16(),
                "invoices: create invoice without performed_by"
            );
            err
        })?;

        let user = self
            .user_repo
            .find_by_id(performed_by)
            .await
            .map_err(|err| {
                error!(
                    %performed_by,
                    db_error = ?err,
                    "invoices: failed to load performing user"
                );
                InvoiceError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = InvoiceError::UserNotFound;
                warn!(
                    %performed_by,
                    status = err.status_code().as_u16(),
                    "invoices: performing user not found"
                );
                err
            })?;

        let (provider, secret_key) = self.resolve_provider().await?;

        let external_id = request
            .external_id
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                let err = InvoiceError::MissingRequiredFields;
                warn!(
                    %performed_by,
                    status = err.status_code().as_u16(),
                    "invoices: external_id is required"
                );
                err
            })?;
        let amount = request.amount.ok_or_else(|| {
            let err = InvoiceError::MissingRequiredFields;
            warn!(
                %performed_by,
                external_id,
                status = err.status_code().as_u16(),
                "invoices: amount is required"
            );
            err
        })?;
        if amount <= 0 {
            let err = InvoiceError::InvalidAmount;
            warn!(
                %performed_by,
                external_id,
                amount,
                status = err.status_code().as_u16(),
                "invoices: amount must be positive"
            );
            return Err(err);
        }

        let params = CreateInvoiceParams {
            external_id: external_id.clone(),
            amount,
            description: request.description,
            customer: request.customer,
            currency: request
                .currency
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            invoice_duration: request
                .invoice_duration
                .unwrap_or(DEFAULT_INVOICE_DURATION_SECS),
        };

        info!(
            %performed_by,
            external_id,
            amount,
            provider_id = %provider.id,
            "invoices: creating invoice at provider"
        );

        let invoice = self
            .gateway
            .create_invoice(&secret_key, &provider.base_url, params)
            .await
            .map_err(|err| {
                error!(
                    %performed_by,
                    external_id,
                    status = err.status_code().as_u16(),
                    error = %err,
                    "invoices: provider rejected invoice creation"
                );
                InvoiceError::Gateway(err)
            })?;

        info!(
            %performed_by,
            external_id,
            invoice_id = %invoice.id,
            "invoices: invoice created"
        );

        Ok(CreateInvoiceResult {
            invoice,
            performed_by: ActorProfile {
                id: user.id,
                name: user.name,
                email: user.email,
            },
            provider: ProviderIdentity {
                id: provider.id,
                name: provider.name,
                environment: provider.environment,
            },
        })
    }

    pub async fn get_invoice(&self, request: GetInvoiceRequest) -> UseCaseResult<XenditInvoice> {
        let (provider, secret_key) = self.resolve_provider().await?;

        let invoice_id = request.invoice_id.filter(|value| !value.trim().is_empty());
        let external_id = request.external_id.filter(|value| !value.trim().is_empty());

        // external_id is always the booking id in this system, so it wins
        // when both identifiers are present.
        let (invoice_id, external_id) = match (invoice_id, external_id) {
            (_, Some(external_id)) => (None, Some(external_id)),
            (Some(invoice_id), None) => (Some(invoice_id), None),
            (None, None) => {
                let err = InvoiceError::MissingRequiredFields;
                warn!(
                    status = err.status_code().as_u16(),
                    "invoices: get invoice without any identifier"
                );
                return Err(err);
            }
        };

        self.gateway
            .get_invoice(&secret_key, &provider.base_url, invoice_id, external_id)
            .await
            .map_err(|err| {
                error!(
                    status = err.status_code().as_u16(),
                    error = %err,
                    "invoices: provider invoice lookup failed"
                );
                InvoiceError::Gateway(err)
            })
    }

    async fn resolve_provider(&self) -> UseCaseResult<(PaymentProviderEntity, String)> {
        let provider = self
            .provider_repo
            .find_active_production()
            .await
            .map_err(|err| {
                error!(
                    db_error = ?err,
                    "invoices: failed to load active payment provider"
                );
                InvoiceError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = InvoiceError::ProviderNotFound;
                warn!(
                    status = err.status_code().as_u16(),
                    "invoices: no active production payment provider"
                );
                err
            })?;

        let secret_key = provider
            .secret_key
            .clone()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                let err = InvoiceError::MissingSecretKey;
                warn!(
                    provider_id = %provider.id,
                    status = err.status_code().as_u16(),
                    "invoices: active payment provider has no secret key"
                );
                err
            })?;

        Ok((provider, secret_key))
    }
}
