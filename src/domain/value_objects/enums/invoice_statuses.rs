use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Lifecycle states reported by Xendit for an invoice.
///
/// Unknown statuses are rejected at deserialization instead of falling
/// through to a catch-all branch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Settled,
    Expired,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "PENDING",
            InvoiceStatus::Paid => "PAID",
            InvoiceStatus::Settled => "SETTLED",
            InvoiceStatus::Expired => "EXPIRED",
        }
    }

    /// PAID and SETTLED both confirm money movement on the provider side.
    pub fn is_settled(&self) -> bool {
        matches!(self, InvoiceStatus::Paid | InvoiceStatus::Settled)
    }
}

impl Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
