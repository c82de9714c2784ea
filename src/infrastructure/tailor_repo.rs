use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::geo::{self, BoundingBox, GeoPoint};
use crate::domain::ports::{GeoIndex, TailorDirectory};
use crate::domain::tailor::{AccountStatus, NearbyTailor, Tailor};
use crate::schema::tailors;

use super::models::{NewTailorRow, TailorRow};

/// Tailor directory backed by the `tailors` table. Nearby queries prefilter
/// on the partial `(latitude, longitude)` index and rank the survivors by
/// great-circle distance.
pub struct DieselTailorRepository {
    pool: DbPool,
}

impl DieselTailorRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Inserts or replaces a tailor profile as published by the identity
    /// provider.
    pub fn upsert(&self, tailor: &Tailor) -> Result<(), DomainError> {
        let row = NewTailorRow::from(tailor);
        let mut conn = self.pool.get()?;

        diesel::insert_into(tailors::table)
            .values(&row)
            .on_conflict(tailors::id)
            .do_update()
            .set((&row, tailors::updated_at.eq(Utc::now())))
            .execute(&mut conn)?;
        Ok(())
    }
}

impl GeoIndex for DieselTailorRepository {
    fn nearby(
        &self,
        center: GeoPoint,
        radius_km: f64,
        limit: usize,
    ) -> Result<Vec<NearbyTailor>, DomainError> {
        let radius_km = geo::clamp_radius(radius_km)?;
        let bbox = BoundingBox::around(center, radius_km);
        let mut conn = self.pool.get()?;

        let mut rows: Vec<TailorRow> = Vec::new();
        for (west, east) in bbox.longitude_ranges() {
            let mut batch = tailors::table
                .filter(tailors::status.eq(AccountStatus::Active.as_str()))
                .filter(tailors::is_available.eq(true))
                .filter(tailors::latitude.between(bbox.min_lat, bbox.max_lat))
                .filter(tailors::longitude.between(west, east))
                .select(TailorRow::as_select())
                .load::<TailorRow>(&mut conn)?;
            rows.append(&mut batch);
        }
        // Both antimeridian ranges include +/-180.
        rows.sort_by_key(|row| row.id);
        rows.dedup_by_key(|row| row.id);

        let candidates = rows
            .into_iter()
            .map(Tailor::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(geo::rank_within(candidates, center, radius_km, limit))
    }
}

impl TailorDirectory for DieselTailorRepository {
    fn get(&self, id: Uuid) -> Result<Option<Tailor>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = tailors::table
            .filter(tailors::id.eq(id))
            .select(TailorRow::as_select())
            .first::<TailorRow>(&mut conn)
            .optional()?;

        row.map(Tailor::try_from).transpose()
    }

    fn set_availability(&self, id: Uuid, available: bool) -> Result<Tailor, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::update(tailors::table.filter(tailors::id.eq(id)))
            .set((
                tailors::is_available.eq(available),
                tailors::updated_at.eq(Utc::now()),
            ))
            .returning(TailorRow::as_returning())
            .get_result::<TailorRow>(&mut conn)
            .optional()?
            .ok_or(DomainError::NotFound("Tailor"))?;

        Tailor::try_from(row)
    }
}
