use serde::Deserialize;
use serde_json::Value;

use crate::domain::value_objects::enums::invoice_statuses::InvoiceStatus;

/// Raw invoice callback body from Xendit.
///
/// The claimed `status` is only ever compared against the re-fetched invoice;
/// it is never acted on directly.
#[derive(Debug, Clone, Deserialize)]
pub struct XenditCallbackPayload {
    pub id: Option<String>,
    pub external_id: Option<String>,
    pub status: Option<InvoiceStatus>,
    pub amount: Option<i64>,
    pub paid_amount: Option<i64>,
    pub payment_method: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}
