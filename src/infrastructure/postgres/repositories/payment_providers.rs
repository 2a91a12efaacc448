use anyhow::Result;
use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;

use crate::{
    domain::{
        entities::payment_providers::PaymentProviderEntity,
        repositories::payment_providers::PaymentProviderRepository,
        value_objects::enums::{
            provider_environments::ProviderEnvironment, provider_statuses::ProviderStatus,
        },
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::payment_providers},
};

pub struct PaymentProviderPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaymentProviderPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PaymentProviderRepository for PaymentProviderPostgres {
    async fn find_active_production(&self) -> Result<Option<PaymentProviderEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let provider = payment_providers::table
            .filter(payment_providers::status.eq(ProviderStatus::Active.as_str()))
            .filter(payment_providers::environment.eq(ProviderEnvironment::Production.as_str()))
            .order(payment_providers::updated_at.desc())
            .select(PaymentProviderEntity::as_select())
            .first::<PaymentProviderEntity>(&mut conn)
            .optional()?;

        Ok(provider)
    }
}
