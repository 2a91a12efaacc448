use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BookingLogAction {
    PaymentReceived,
    PaymentExpired,
}

impl BookingLogAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingLogAction::PaymentReceived => "payment_received",
            BookingLogAction::PaymentExpired => "payment_expired",
        }
    }
}

impl Display for BookingLogAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
