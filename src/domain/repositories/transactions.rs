use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::transactions::{InsertTransactionEntity, TransactionEntity};

#[automock]
#[async_trait]
pub trait TransactionRepository {
    async fn insert(&self, transaction: InsertTransactionEntity) -> Result<Uuid>;
    /// Looks a transaction up by its provider invoice reference.
    async fn find_by_reference(&self, reference: &str) -> Result<Option<TransactionEntity>>;
}
