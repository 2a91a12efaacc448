use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::transactions;

/// Financial-ledger row mirroring one settled payment event. Never mutated.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = transactions)]
pub struct TransactionEntity {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub type_: String,
    pub payment_type: String,
    pub status: String,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = transactions)]
pub struct InsertTransactionEntity {
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub type_: String,
    pub payment_type: String,
    pub status: String,
    pub description: Option<String>,
    // Provider invoice id; unique in the table so a re-delivered settle
    // webhook cannot double-insert.
    pub reference: Option<String>,
}
