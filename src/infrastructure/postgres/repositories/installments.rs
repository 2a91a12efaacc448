use anyhow::Result;
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::insert_into;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::installments::{InsertInstallmentEntity, InstallmentEntity},
        repositories::installments::InstallmentRepository,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::installments},
};

pub struct InstallmentPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl InstallmentPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl InstallmentRepository for InstallmentPostgres {
    async fn list_by_booking(&self, booking_id: Uuid) -> Result<Vec<InstallmentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = installments::table
            .filter(installments::booking_id.eq(booking_id))
            .order(installments::created_at.asc())
            .select(InstallmentEntity::as_select())
            .load::<InstallmentEntity>(&mut conn)?;

        Ok(rows)
    }

    async fn insert(&self, installment: InsertInstallmentEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let installment_id = insert_into(installments::table)
            .values(&installment)
            .returning(installments::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(installment_id)
    }
}
