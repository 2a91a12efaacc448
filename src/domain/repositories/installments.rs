use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::installments::{InsertInstallmentEntity, InstallmentEntity};

#[automock]
#[async_trait]
pub trait InstallmentRepository {
    async fn list_by_booking(&self, booking_id: Uuid) -> Result<Vec<InstallmentEntity>>;
    async fn insert(&self, installment: InsertInstallmentEntity) -> Result<Uuid>;
}
