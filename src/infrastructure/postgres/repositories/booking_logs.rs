use anyhow::Result;
use async_trait::async_trait;
use diesel::insert_into;
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::booking_logs::InsertBookingLogEntity,
        repositories::booking_logs::BookingLogRepository,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::booking_logs},
};

pub struct BookingLogPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl BookingLogPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl BookingLogRepository for BookingLogPostgres {
    async fn insert(&self, log: InsertBookingLogEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let log_id = insert_into(booking_logs::table)
            .values(&log)
            .returning(booking_logs::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(log_id)
    }
}
