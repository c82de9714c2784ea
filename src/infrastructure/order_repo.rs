use diesel::prelude::*;
use serde_json::json;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{Order, StatusFilter};
use crate::domain::ports::OrderRepository;
use crate::schema::{order_outbox, orders};

use super::models::{NewOrderRow, NewOutboxEventRow, OrderRow, OrderTransitionChangeset};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

/// Outbox row describing the order's current state. Written in the same
/// transaction as the order itself, so CDC consumers see every transition.
fn outbox_event(order: &Order, event_type: &str) -> NewOutboxEventRow {
    NewOutboxEventRow {
        id: Uuid::new_v4(),
        aggregate_type: "Order".to_string(),
        aggregate_id: order.id.to_string(),
        event_type: event_type.to_string(),
        payload: json!({
            "order_id": order.id,
            "tailor_id": order.tailor_id,
            "customer_phone": order.customer.phone,
            "status": order.status.as_str(),
            "deposit_status": order.payment.deposit_status.as_str(),
            "total_amount": order.payment.total_amount.to_string(),
            "version": order.version,
        }),
    }
}

fn into_orders(rows: Vec<OrderRow>) -> Result<Vec<Order>, DomainError> {
    rows.into_iter().map(Order::try_from).collect()
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, order: &Order) -> Result<Uuid, DomainError> {
        let row = NewOrderRow::try_from(order)?;
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            diesel::insert_into(orders::table)
                .values(&row)
                .execute(conn)?;
            diesel::insert_into(order_outbox::table)
                .values(&outbox_event(order, "OrderCreated"))
                .execute(conn)?;
            Ok(order.id)
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = orders::table
            .filter(orders::id.eq(id))
            .select(OrderRow::as_select())
            .first::<OrderRow>(&mut conn)
            .optional()?;

        row.map(Order::try_from).transpose()
    }

    fn list_by_customer(&self, phone: &str) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .filter(orders::customer_phone.eq(phone))
            .order(orders::created_at.desc())
            .select(OrderRow::as_select())
            .load::<OrderRow>(&mut conn)?;

        into_orders(rows)
    }

    fn list_by_tailor(
        &self,
        tailor_id: Uuid,
        filter: Option<StatusFilter>,
    ) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let query = orders::table
            .filter(orders::tailor_id.eq(tailor_id))
            .order(orders::updated_at.desc())
            .select(OrderRow::as_select());
        let rows = match filter {
            Some(filter) => {
                let labels: Vec<&'static str> =
                    filter.statuses().into_iter().map(|s| s.as_str()).collect();
                query
                    .filter(orders::status.eq_any(labels))
                    .load::<OrderRow>(&mut conn)?
            }
            None => query.load::<OrderRow>(&mut conn)?,
        };

        into_orders(rows)
    }

    fn update(&self, order: &Order) -> Result<Order, DomainError> {
        let changes = OrderTransitionChangeset::from(order);
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // Compare-and-swap: only the writer holding the current version wins.
            let updated = diesel::update(
                orders::table
                    .filter(orders::id.eq(order.id))
                    .filter(orders::version.eq(order.version)),
            )
            .set(&changes)
            .returning(OrderRow::as_returning())
            .get_result::<OrderRow>(conn)
            .optional()?;

            let Some(row) = updated else {
                let exists: bool =
                    diesel::select(diesel::dsl::exists(orders::table.find(order.id)))
                        .get_result(conn)?;
                return Err(if exists {
                    DomainError::Conflict
                } else {
                    DomainError::NotFound("Order")
                });
            };

            let saved = Order::try_from(row)?;
            diesel::insert_into(order_outbox::table)
                .values(&outbox_event(&saved, "OrderStatusChanged"))
                .execute(conn)?;
            Ok(saved)
        })
    }
}
