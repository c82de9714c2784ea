use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::FabricCatalog;
use crate::domain::tailor::FabricListing;
use crate::schema::fabrics;

use super::models::FabricRow;

pub struct DieselFabricCatalog {
    pool: DbPool,
}

impl DieselFabricCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl FabricCatalog for DieselFabricCatalog {
    fn find(&self, fabric_id: Uuid) -> Result<Option<FabricListing>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = fabrics::table
            .filter(fabrics::id.eq(fabric_id))
            .select(FabricRow::as_select())
            .first::<FabricRow>(&mut conn)
            .optional()?;

        Ok(row.map(FabricListing::from))
    }
}
