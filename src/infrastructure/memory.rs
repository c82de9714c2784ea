//! Process-local stores. Used by tests and by deployments without Postgres.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, RwLock};

use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::geo::{self, BoundingBox, GeoPoint};
use crate::domain::order::{Order, StatusFilter};
use crate::domain::ports::{FabricCatalog, GeoIndex, OrderRepository, TailorDirectory};
use crate::domain::tailor::{FabricListing, NearbyTailor, Tailor};

fn poisoned(what: &str) -> DomainError {
    DomainError::Internal(format!("{} lock poisoned", what))
}

// ── Orders ───────────────────────────────────────────────────────────────────

struct StoredOrder {
    order: Order,
    created_seq: u64,
    updated_seq: u64,
}

#[derive(Default)]
struct OrderTable {
    rows: HashMap<Uuid, StoredOrder>,
    seq: u64,
}

impl OrderTable {
    fn tick(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }
}

/// A single mutex guards the whole table, which makes `update` an atomic
/// compare-and-swap on the order version.
#[derive(Default)]
pub struct InMemoryOrderRepository {
    table: Mutex<OrderTable>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn create(&self, order: &Order) -> Result<Uuid, DomainError> {
        let mut table = self.table.lock().map_err(|_| poisoned("order table"))?;
        if table.rows.contains_key(&order.id) {
            return Err(DomainError::Internal(format!(
                "order {} already exists",
                order.id
            )));
        }
        let seq = table.tick();
        table.rows.insert(
            order.id,
            StoredOrder {
                order: order.clone(),
                created_seq: seq,
                updated_seq: seq,
            },
        );
        Ok(order.id)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let table = self.table.lock().map_err(|_| poisoned("order table"))?;
        Ok(table.rows.get(&id).map(|row| row.order.clone()))
    }

    fn list_by_customer(&self, phone: &str) -> Result<Vec<Order>, DomainError> {
        let table = self.table.lock().map_err(|_| poisoned("order table"))?;
        let mut rows: Vec<&StoredOrder> = table
            .rows
            .values()
            .filter(|row| row.order.customer.phone == phone)
            .collect();
        rows.sort_by(|a, b| b.created_seq.cmp(&a.created_seq));
        Ok(rows.into_iter().map(|row| row.order.clone()).collect())
    }

    fn list_by_tailor(
        &self,
        tailor_id: Uuid,
        filter: Option<StatusFilter>,
    ) -> Result<Vec<Order>, DomainError> {
        let table = self.table.lock().map_err(|_| poisoned("order table"))?;
        let mut rows: Vec<&StoredOrder> = table
            .rows
            .values()
            .filter(|row| row.order.tailor_id == tailor_id)
            .filter(|row| filter.map_or(true, |f| f.matches(row.order.status)))
            .collect();
        rows.sort_by(|a, b| b.updated_seq.cmp(&a.updated_seq));
        Ok(rows.into_iter().map(|row| row.order.clone()).collect())
    }

    fn update(&self, order: &Order) -> Result<Order, DomainError> {
        let mut table = self.table.lock().map_err(|_| poisoned("order table"))?;
        let seq = table.tick();
        let row = table
            .rows
            .get_mut(&order.id)
            .ok_or(DomainError::NotFound("Order"))?;
        if row.order.version != order.version {
            return Err(DomainError::Conflict);
        }

        row.order.status = order.status;
        row.order.payment = order.payment.clone();
        row.order.version += 1;
        row.order.updated_at = Utc::now();
        row.updated_seq = seq;
        Ok(row.order.clone())
    }
}

// ── Tailors ──────────────────────────────────────────────────────────────────

const CELL_DEGREES: f64 = 0.05;
const LONGITUDE_CELLS: i64 = 7200; // 360 / CELL_DEGREES

type Cell = (i64, i64);

fn row_of(latitude: f64) -> i64 {
    ((latitude + 90.0) / CELL_DEGREES).floor() as i64
}

fn column_of(longitude: f64) -> i64 {
    ((longitude + 180.0) / CELL_DEGREES).floor() as i64
}

fn cell_of(point: GeoPoint) -> Cell {
    (
        row_of(point.latitude),
        column_of(point.longitude).rem_euclid(LONGITUDE_CELLS),
    )
}

#[derive(Default)]
struct Grid {
    tailors: HashMap<Uuid, Tailor>,
    cells: HashMap<Cell, Vec<Uuid>>,
}

impl Grid {
    fn unlink(&mut self, tailor: &Tailor) {
        let cell = cell_of(tailor.location);
        if let Some(ids) = self.cells.get_mut(&cell) {
            ids.retain(|id| *id != tailor.id);
            if ids.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }

    /// Ids of every tailor in a cell intersecting `bbox`.
    fn candidates(&self, bbox: &BoundingBox) -> BTreeSet<Uuid> {
        let rows = row_of(bbox.min_lat)..=row_of(bbox.max_lat);
        let mut ids = BTreeSet::new();
        for (west, east) in bbox.longitude_ranges() {
            let columns = column_of(west)..=column_of(east);
            for row in rows.clone() {
                for column in columns.clone() {
                    let cell = (row, column.rem_euclid(LONGITUDE_CELLS));
                    if let Some(found) = self.cells.get(&cell) {
                        ids.extend(found.iter().copied());
                    }
                }
            }
        }
        ids
    }
}

/// Tailor directory bucketed into fixed lat/lon cells so a nearby query only
/// scans cells overlapping the search area.
#[derive(Default)]
pub struct InMemoryGeoIndex {
    grid: RwLock<Grid>,
}

impl InMemoryGeoIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a tailor, re-bucketing it if it moved.
    pub fn upsert(&self, tailor: Tailor) -> Result<(), DomainError> {
        let mut grid = self.grid.write().map_err(|_| poisoned("tailor grid"))?;
        if let Some(previous) = grid.tailors.remove(&tailor.id) {
            grid.unlink(&previous);
        }
        grid.cells
            .entry(cell_of(tailor.location))
            .or_default()
            .push(tailor.id);
        grid.tailors.insert(tailor.id, tailor);
        Ok(())
    }
}

impl GeoIndex for InMemoryGeoIndex {
    fn nearby(
        &self,
        center: GeoPoint,
        radius_km: f64,
        limit: usize,
    ) -> Result<Vec<NearbyTailor>, DomainError> {
        let radius_km = geo::clamp_radius(radius_km)?;
        let bbox = BoundingBox::around(center, radius_km);
        let grid = self.grid.read().map_err(|_| poisoned("tailor grid"))?;

        let candidates: Vec<Tailor> = grid
            .candidates(&bbox)
            .into_iter()
            .filter_map(|id| grid.tailors.get(&id))
            .filter(|tailor| tailor.is_discoverable())
            .cloned()
            .collect();
        Ok(geo::rank_within(candidates, center, radius_km, limit))
    }
}

impl TailorDirectory for InMemoryGeoIndex {
    fn get(&self, id: Uuid) -> Result<Option<Tailor>, DomainError> {
        let grid = self.grid.read().map_err(|_| poisoned("tailor grid"))?;
        Ok(grid.tailors.get(&id).cloned())
    }

    fn set_availability(&self, id: Uuid, available: bool) -> Result<Tailor, DomainError> {
        let mut grid = self.grid.write().map_err(|_| poisoned("tailor grid"))?;
        let tailor = grid
            .tailors
            .get_mut(&id)
            .ok_or(DomainError::NotFound("Tailor"))?;
        tailor.available = available;
        Ok(tailor.clone())
    }
}

// ── Fabrics ──────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryFabricCatalog {
    fabrics: RwLock<HashMap<Uuid, FabricListing>>,
}

impl InMemoryFabricCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, listing: FabricListing) -> Result<(), DomainError> {
        let mut fabrics = self.fabrics.write().map_err(|_| poisoned("fabric catalog"))?;
        fabrics.insert(listing.fabric_id, listing);
        Ok(())
    }
}

impl FabricCatalog for InMemoryFabricCatalog {
    fn find(&self, fabric_id: Uuid) -> Result<Option<FabricListing>, DomainError> {
        let fabrics = self.fabrics.read().map_err(|_| poisoned("fabric catalog"))?;
        Ok(fabrics.get(&fabric_id).cloned())
    }
}
