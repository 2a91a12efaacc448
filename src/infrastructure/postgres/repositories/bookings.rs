use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::bookings::BookingEntity,
        repositories::bookings::BookingRepository,
        value_objects::enums::booking_statuses::BookingStatus,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::bookings},
};

pub struct BookingPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl BookingPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl BookingRepository for BookingPostgres {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<BookingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let booking = bookings::table
            .filter(bookings::id.eq(id))
            .select(BookingEntity::as_select())
            .first::<BookingEntity>(&mut conn)
            .optional()?;

        Ok(booking)
    }

    async fn update_status(&self, id: Uuid, status: BookingStatus) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let booking_id = diesel::update(bookings::table.filter(bookings::id.eq(id)))
            .set((
                bookings::status.eq(status.as_str()),
                bookings::updated_at.eq(Utc::now()),
            ))
            .returning(bookings::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(booking_id)
    }
}
