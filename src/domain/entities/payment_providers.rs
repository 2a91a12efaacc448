use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::payment_providers;

/// Credential record for the payment provider. Read-only from the
/// reconciler's perspective; the most recently updated active production row
/// wins when several are active.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = payment_providers)]
pub struct PaymentProviderEntity {
    pub id: Uuid,
    pub name: String,
    pub secret_key: Option<String>,
    pub base_url: String,
    pub environment: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
