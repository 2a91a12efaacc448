use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    entities::{
        booking_logs::InsertBookingLogEntity, bookings::BookingEntity,
        installments::InsertInstallmentEntity, payment_providers::PaymentProviderEntity,
        transactions::InsertTransactionEntity,
    },
    repositories::{
        booking_logs::BookingLogRepository,
        bookings::BookingRepository,
        installments::InstallmentRepository,
        payment_gateway::{GatewayError, XenditGateway},
        payment_providers::PaymentProviderRepository,
        transactions::TransactionRepository,
    },
    value_objects::{
        enums::{
            booking_log_actions::BookingLogAction, booking_statuses::BookingStatus,
            invoice_statuses::InvoiceStatus,
        },
        invoices::XenditInvoice,
        webhook::XenditCallbackPayload,
    },
};

#[cfg(test)]
mod tests;

const FALLBACK_PAYMENT_METHOD: &str = "Xendit";

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("invalid callback payload: {0}")]
    InvalidPayload(String),

    #[error("booking not found")]
    BookingNotFound,

    #[error("no usable payment provider configured")]
    ProviderNotConfigured,

    #[error("invoice verification failed: {0}")]
    Verification(GatewayError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl WebhookError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            WebhookError::BookingNotFound => StatusCode::NOT_FOUND,
            WebhookError::ProviderNotConfigured
            | WebhookError::Verification(_)
            | WebhookError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            WebhookError::InvalidPayload(_) => "INVALID_PAYLOAD",
            WebhookError::BookingNotFound => "BOOKING_NOT_FOUND",
            WebhookError::ProviderNotConfigured => "PROVIDER_NOT_CONFIGURED",
            WebhookError::Verification(_) => "VERIFICATION_FAILED",
            WebhookError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WebhookOutcome {
    pub message: String,
    pub verified_status: Option<InvoiceStatus>,
}

/// Per-booking serialization points. Two webhook deliveries for the same
/// booking never run their verify-decide-write sequence concurrently;
/// deliveries for different bookings proceed in parallel.
#[derive(Default)]
pub struct BookingLocks {
    inner: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl BookingLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, booking_id: Uuid) -> Arc<AsyncMutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(map.entry(booking_id).or_default())
    }
}

/// Reconciles Xendit invoice callbacks against the booking ledger. The
/// callback body is never trusted for state changes; the invoice is always
/// re-fetched from the provider first.
pub struct XenditWebhookUseCase<B, I, T, L, P, G>
where
    B: BookingRepository + Send + Sync + 'static,
    I: InstallmentRepository + Send + Sync + 'static,
    T: TransactionRepository + Send + Sync + 'static,
    L: BookingLogRepository + Send + Sync + 'static,
    P: PaymentProviderRepository + Send + Sync + 'static,
    G: XenditGateway + Send + Sync + 'static,
{
    booking_repo: Arc<B>,
    installment_repo: Arc<I>,
    transaction_repo: Arc<T>,
    booking_log_repo: Arc<L>,
    provider_repo: Arc<P>,
    gateway: Arc<G>,
    locks: Arc<BookingLocks>,
}

impl<B, I, T, L, P, G> XenditWebhookUseCase<B, I, T, L, P, G>
where
    B: BookingRepository + Send + Sync + 'static,
    I: InstallmentRepository + Send + Sync + 'static,
    T: TransactionRepository + Send + Sync + 'static,
    L: BookingLogRepository + Send + Sync + 'static,
    P: PaymentProviderRepository + Send + Sync + 'static,
    G: XenditGateway + Send + Sync + 'static,
{
    pub fn new(
        booking_repo: Arc<B>,
        installment_repo: Arc<I>,
        transaction_repo: Arc<T>,
        booking_log_repo: Arc<L>,
        provider_repo: Arc<P>,
        gateway: Arc<G>,
        locks: Arc<BookingLocks>,
    ) -> Self {
        Self {
            booking_repo,
            installment_repo,
            transaction_repo,
            booking_log_repo,
            provider_repo,
            gateway,
            locks,
        }
    }

    pub async fn handle_callback(
        &self,
        payload: XenditCallbackPayload,
    ) -> Result<WebhookOutcome, WebhookError> {
        let invoice_id = payload
            .id
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| WebhookError::InvalidPayload("missing invoice id".to_string()))?
            .to_string();
        let external_id = payload
            .external_id
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| WebhookError::InvalidPayload("missing external_id".to_string()))?;

        // external_id carries the booking id; an unparseable one can never
        // match a booking.
        let booking_id = Uuid::parse_str(external_id).map_err(|_| {
            warn!(
                external_id,
                invoice_id, "xendit callback: external_id is not a booking id"
            );
            WebhookError::BookingNotFound
        })?;

        let booking_lock = self.locks.lock_for(booking_id);
        let _guard = booking_lock.lock().await;

        let booking = self
            .booking_repo
            .find_by_id(booking_id)
            .await
            .map_err(WebhookError::Internal)?
            .ok_or_else(|| {
                warn!(%booking_id, invoice_id, "xendit callback: booking not found");
                WebhookError::BookingNotFound
            })?;

        let (provider, secret_key) = self.resolve_provider().await?;

        let invoice = self
            .gateway
            .get_invoice(
                &secret_key,
                &provider.base_url,
                Some(invoice_id.clone()),
                None,
            )
            .await
            .map_err(|err| {
                error!(
                    %booking_id,
                    invoice_id,
                    error = %err,
                    "xendit callback: invoice verification failed, no state changed"
                );
                WebhookError::Verification(err)
            })?;

        if let Some(claimed) = payload.status {
            if claimed != invoice.status {
                warn!(
                    %booking_id,
                    invoice_id,
                    claimed_status = %claimed,
                    verified_status = %invoice.status,
                    "xendit callback: payload status differs from verified invoice"
                );
            }
        }

        let outcome = match invoice.status {
            InvoiceStatus::Paid | InvoiceStatus::Settled => {
                self.apply_settle(&booking, &invoice).await?
            }
            InvoiceStatus::Expired => self.apply_expire(&booking, &invoice).await,
            InvoiceStatus::Pending => {
                info!(
                    %booking_id,
                    invoice_id,
                    "xendit callback: invoice still pending, nothing to reconcile"
                );
                WebhookOutcome {
                    message: "invoice is not in an actionable state".to_string(),
                    verified_status: Some(invoice.status),
                }
            }
        };

        Ok(outcome)
    }

    async fn resolve_provider(&self) -> Result<(PaymentProviderEntity, String), WebhookError> {
        let provider = self
            .provider_repo
            .find_active_production()
            .await
            .map_err(WebhookError::Internal)?
            .ok_or_else(|| {
                error!("xendit callback: no active production payment provider");
                WebhookError::ProviderNotConfigured
            })?;

        let secret_key = provider
            .secret_key
            .clone()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                error!(
                    provider_id = %provider.id,
                    "xendit callback: active payment provider has no secret key"
                );
                WebhookError::ProviderNotConfigured
            })?;

        Ok((provider, secret_key))
    }

    /// Applies a verified settlement. Writes are best effort: once the
    /// invoice is verified paid, a failed ledger write is logged and the
    /// remaining writes still run, so the provider does not retry a payment
    /// that already went through.
    async fn apply_settle(
        &self,
        booking: &BookingEntity,
        invoice: &XenditInvoice,
    ) -> Result<WebhookOutcome, WebhookError> {
        if booking.status == BookingStatus::Paid.as_str() {
            info!(
                booking_id = %booking.id,
                invoice_id = %invoice.id,
                "xendit callback: booking already paid, settle is a no-op"
            );
            return Ok(WebhookOutcome {
                message: "booking already settled".to_string(),
                verified_status: Some(invoice.status),
            });
        }

        match self.transaction_repo.find_by_reference(&invoice.id).await {
            Ok(Some(existing)) => {
                info!(
                    booking_id = %booking.id,
                    invoice_id = %invoice.id,
                    transaction_id = %existing.id,
                    "xendit callback: invoice already recorded, settle is a no-op"
                );
                return Ok(WebhookOutcome {
                    message: "payment already recorded".to_string(),
                    verified_status: Some(invoice.status),
                });
            }
            Ok(None) => {}
            Err(err) => return Err(WebhookError::Internal(err)),
        }

        let paid_amount = invoice.paid_amount.unwrap_or(invoice.amount);
        let invoice_amount = booking.total_amount;

        // Read before any write so a failed read cannot leave a half-applied
        // settlement behind.
        let installments = self
            .installment_repo
            .list_by_booking(booking.id)
            .await
            .map_err(WebhookError::Internal)?;

        let new_status = if !installments.is_empty() {
            let prior_total: i64 = installments.iter().map(|row| row.amount).sum();
            if prior_total + paid_amount < invoice_amount {
                BookingStatus::Installment
            } else {
                BookingStatus::Paid
            }
        } else if paid_amount < invoice_amount {
            BookingStatus::Installment
        } else {
            BookingStatus::Paid
        };

        let payment_method = invoice
            .payment_method
            .clone()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_PAYMENT_METHOD.to_string());

        info!(
            booking_id = %booking.id,
            invoice_id = %invoice.id,
            paid_amount,
            invoice_amount,
            prior_installments = installments.len(),
            new_status = %new_status,
            "xendit callback: applying verified settlement"
        );

        if new_status == BookingStatus::Installment {
            if let Err(err) = self
                .installment_repo
                .insert(InsertInstallmentEntity {
                    booking_id: booking.id,
                    amount: paid_amount,
                    payment_method: payment_method.clone(),
                    note: Some(format!("Xendit invoice {}", invoice.id)),
                    performed_by: None,
                })
                .await
            {
                error!(
                    booking_id = %booking.id,
                    invoice_id = %invoice.id,
                    db_error = ?err,
                    "xendit callback: failed to record installment"
                );
            }
        }

        if let Err(err) = self.booking_repo.update_status(booking.id, new_status).await {
            error!(
                booking_id = %booking.id,
                invoice_id = %invoice.id,
                new_status = %new_status,
                db_error = ?err,
                "xendit callback: failed to update booking status"
            );
        }

        let payment_type = if new_status == BookingStatus::Installment {
            "installment"
        } else {
            "online"
        };
        if let Err(err) = self
            .transaction_repo
            .insert(InsertTransactionEntity {
                booking_id: booking.id,
                user_id: booking.user_id,
                amount: paid_amount,
                type_: "online".to_string(),
                payment_type: payment_type.to_string(),
                status: "paid".to_string(),
                description: Some(format!(
                    "Payment via {} for invoice {}",
                    payment_method, invoice.id
                )),
                reference: Some(invoice.id.clone()),
            })
            .await
        {
            error!(
                booking_id = %booking.id,
                invoice_id = %invoice.id,
                db_error = ?err,
                "xendit callback: failed to record transaction"
            );
        }

        if let Err(err) = self
            .booking_log_repo
            .insert(InsertBookingLogEntity {
                booking_id: booking.id,
                action_type: BookingLogAction::PaymentReceived.to_string(),
                performed_by: None,
                note: Some(format!(
                    "Received {} via {} for invoice {}",
                    paid_amount, payment_method, invoice.id
                )),
                new_data: serde_json::to_value(invoice).ok(),
            })
            .await
        {
            error!(
                booking_id = %booking.id,
                invoice_id = %invoice.id,
                db_error = ?err,
                "xendit callback: failed to append booking log"
            );
        }

        Ok(WebhookOutcome {
            message: format!("payment reconciled, booking is {new_status}"),
            verified_status: Some(invoice.status),
        })
    }

    /// Applies a verified expiry. A booking in any terminal status is left
    /// untouched.
    async fn apply_expire(
        &self,
        booking: &BookingEntity,
        invoice: &XenditInvoice,
    ) -> WebhookOutcome {
        let terminal = BookingStatus::from_str(&booking.status)
            .map(|status| status.is_terminal())
            .unwrap_or(false);
        if terminal {
            info!(
                booking_id = %booking.id,
                invoice_id = %invoice.id,
                booking_status = %booking.status,
                "xendit callback: booking already terminal, expiry is a no-op"
            );
            return WebhookOutcome {
                message: "booking already finalized".to_string(),
                verified_status: Some(invoice.status),
            };
        }

        info!(
            booking_id = %booking.id,
            invoice_id = %invoice.id,
            "xendit callback: marking booking expired"
        );

        if let Err(err) = self
            .booking_repo
            .update_status(booking.id, BookingStatus::Expired)
            .await
        {
            error!(
                booking_id = %booking.id,
                invoice_id = %invoice.id,
                db_error = ?err,
                "xendit callback: failed to expire booking"
            );
            return WebhookOutcome {
                message: "expiry acknowledged, booking update failed".to_string(),
                verified_status: Some(invoice.status),
            };
        }

        if let Err(err) = self
            .booking_log_repo
            .insert(InsertBookingLogEntity {
                booking_id: booking.id,
                action_type: BookingLogAction::PaymentExpired.to_string(),
                performed_by: None,
                note: Some(format!("Invoice {} expired unpaid", invoice.id)),
                new_data: serde_json::to_value(invoice).ok(),
            })
            .await
        {
            error!(
                booking_id = %booking.id,
                invoice_id = %invoice.id,
                db_error = ?err,
                "xendit callback: failed to append booking log"
            );
        }

        WebhookOutcome {
            message: "booking expired".to_string(),
            verified_status: Some(invoice.status),
        }
    }
}
