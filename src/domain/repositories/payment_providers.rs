use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::payment_providers::PaymentProviderEntity;

#[automock]
#[async_trait]
pub trait PaymentProviderRepository {
    /// Selects the active production credential record, most recently updated
    /// first. Always preferring the latest-configured credentials is the
    /// deliberate tie-break when several rows are active.
    async fn find_active_production(&self) -> Result<Option<PaymentProviderEntity>>;
}
