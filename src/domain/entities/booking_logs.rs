use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::booking_logs;

/// Append-only audit entry. `new_data` keeps the raw provider payload.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = booking_logs)]
pub struct BookingLogEntity {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub action_type: String,
    pub performed_by: Option<Uuid>,
    pub note: Option<String>,
    pub new_data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = booking_logs)]
pub struct InsertBookingLogEntity {
    pub booking_id: Uuid,
    pub action_type: String,
    pub performed_by: Option<Uuid>,
    pub note: Option<String>,
    pub new_data: Option<serde_json::Value>,
}
