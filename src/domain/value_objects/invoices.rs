use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::enums::invoice_statuses::InvoiceStatus;

pub const DEFAULT_CURRENCY: &str = "IDR";
pub const DEFAULT_INVOICE_DURATION_SECS: i64 = 86400;

/// Xendit's own view of a payment request, fetched fresh on every webhook.
/// Never persisted verbatim except inside a booking-log payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XenditInvoice {
    pub id: String,
    pub external_id: String,
    pub status: InvoiceStatus,
    pub amount: i64,
    pub paid_amount: Option<i64>,
    pub payment_method: Option<String>,
    pub invoice_url: Option<String>,
    pub currency: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoiceCustomer {
    pub given_names: Option<String>,
    pub email: Option<String>,
    pub mobile_number: Option<String>,
}

/// Incoming create-invoice request body, before validation and defaulting.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoiceRequest {
    pub performed_by: Option<Uuid>,
    pub external_id: Option<String>,
    pub amount: Option<i64>,
    pub description: Option<String>,
    pub customer: Option<InvoiceCustomer>,
    pub currency: Option<String>,
    pub invoice_duration: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetInvoiceRequest {
    pub performed_by: Option<Uuid>,
    pub invoice_id: Option<String>,
    pub external_id: Option<String>,
}

/// Gateway-level parameters after the service merged the request over the
/// defaults.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreateInvoiceParams {
    pub external_id: String,
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<InvoiceCustomer>,
    pub currency: String,
    pub invoice_duration: i64,
}

/// Public slice of the resolved actor. Never carries credentials.
#[derive(Debug, Clone, Serialize)]
pub struct ActorProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Public identity of the provider record used for the call. The secret key
/// is deliberately absent.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderIdentity {
    pub id: Uuid,
    pub name: String,
    pub environment: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateInvoiceResult {
    pub invoice: XenditInvoice,
    pub performed_by: ActorProfile,
    pub provider: ProviderIdentity,
}
