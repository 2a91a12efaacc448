use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::installments;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = installments)]
pub struct InstallmentEntity {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub amount: i64,
    pub payment_method: String,
    pub note: Option<String>,
    pub performed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = installments)]
pub struct InsertInstallmentEntity {
    pub booking_id: Uuid,
    pub amount: i64,
    pub payment_method: String,
    pub note: Option<String>,
    pub performed_by: Option<Uuid>,
}
