use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::bookings::BookingEntity, value_objects::enums::booking_statuses::BookingStatus,
};

#[automock]
#[async_trait]
pub trait BookingRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<BookingEntity>>;
    async fn update_status(&self, id: Uuid, status: BookingStatus) -> Result<Uuid>;
}
