use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::booking_logs::InsertBookingLogEntity;

#[automock]
#[async_trait]
pub trait BookingLogRepository {
    async fn insert(&self, log: InsertBookingLogEntity) -> Result<Uuid>;
}
