//! Order lifecycle state machine.
//!
//! Every transition is a pure function from the current order to its
//! successor: callers persist the returned order with a version-checked
//! update, so re-reading and re-applying after a `Conflict` is always safe.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

use super::errors::DomainError;
use super::order::{
    CostBreakdown, DepositStatus, Order, OrderDraft, OrderStatus, Payment, PaymentStatus,
};

/// Deterministic successor for `advance`; only production stages have one.
pub fn next_stage(status: OrderStatus) -> Option<OrderStatus> {
    match status {
        OrderStatus::Accepted => Some(OrderStatus::Cutting),
        OrderStatus::Cutting => Some(OrderStatus::Stitching),
        OrderStatus::Stitching => Some(OrderStatus::Finishing),
        OrderStatus::Finishing => Some(OrderStatus::Ready),
        OrderStatus::Ready => Some(OrderStatus::OutForDelivery),
        _ => None,
    }
}

pub fn initial_status(deposit_required: bool) -> OrderStatus {
    if deposit_required {
        OrderStatus::PendingDeposit
    } else {
        OrderStatus::Placed
    }
}

/// Six-digit numeric handoff code. Not a secret, so a thread-local RNG is
/// sufficient.
pub fn generate_delivery_code() -> String {
    let code: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
    code.to_string()
}

/// Computes the payment record for `total` with an upfront `deposit`.
pub fn compute_payment(
    total: &BigDecimal,
    draft: &OrderDraft,
) -> Result<Payment, DomainError> {
    let zero = BigDecimal::from(0);
    let deposit = &draft.deposit_amount;
    if *total < zero {
        return Err(DomainError::InvalidPayment(
            "total amount cannot be negative".to_string(),
        ));
    }
    if *deposit < zero {
        return Err(DomainError::InvalidPayment(
            "deposit amount cannot be negative".to_string(),
        ));
    }
    if deposit > total {
        return Err(DomainError::InvalidPayment(format!(
            "deposit {} exceeds total {}",
            deposit, total
        )));
    }

    let deposit_required = *deposit > zero;
    if deposit_required && draft.deposit_mode.is_none() {
        return Err(DomainError::InvalidPayment(
            "deposit mode is required when a deposit is due".to_string(),
        ));
    }

    Ok(Payment {
        total_amount: total.clone(),
        deposit_amount: deposit.clone(),
        remaining_amount: total - deposit,
        deposit_mode: if deposit_required { draft.deposit_mode } else { None },
        deposit_status: if deposit_required {
            DepositStatus::Pending
        } else {
            DepositStatus::NotRequired
        },
        payment_status: PaymentStatus::Unpaid,
    })
}

/// Opens a new order from a validated draft.
pub fn open(draft: OrderDraft, now: DateTime<Utc>) -> Result<Order, DomainError> {
    if draft.stitching_cost < BigDecimal::from(0) {
        return Err(DomainError::InvalidPayment(
            "stitching cost cannot be negative".to_string(),
        ));
    }
    let fabric_cost = draft.fabric.cost();
    let total = &fabric_cost + &draft.stitching_cost;
    let payment = compute_payment(&total, &draft)?;
    let status = initial_status(payment.deposit_status == DepositStatus::Pending);

    Ok(Order {
        id: Uuid::new_v4(),
        customer_id: draft.customer_id,
        customer: draft.customer,
        tailor_id: draft.tailor_id,
        garment_type: draft.garment_type,
        items: draft.items,
        measurements: draft.measurements,
        fabric: draft.fabric,
        handover: draft.handover,
        costs: CostBreakdown {
            fabric_cost,
            stitching_cost: draft.stitching_cost,
            total,
        },
        payment,
        status,
        delivery_otp: generate_delivery_code(),
        version: 1,
        created_at: now,
        updated_at: now,
    })
}

fn transition(
    order: &Order,
    expected: OrderStatus,
    action: &'static str,
    to: OrderStatus,
) -> Result<Order, DomainError> {
    if order.status != expected {
        return Err(DomainError::transition(order.status, action));
    }
    let mut next = order.clone();
    next.status = to;
    Ok(next)
}

pub fn confirm_deposit(order: &Order) -> Result<Order, DomainError> {
    let mut next = transition(
        order,
        OrderStatus::PendingDeposit,
        "confirm deposit for",
        OrderStatus::Placed,
    )?;
    next.payment.deposit_status = DepositStatus::Paid;
    next.payment.payment_status = PaymentStatus::DepositPaid;
    Ok(next)
}

pub fn accept(order: &Order) -> Result<Order, DomainError> {
    transition(order, OrderStatus::Placed, "accept", OrderStatus::Accepted)
}

pub fn reject(order: &Order) -> Result<Order, DomainError> {
    transition(order, OrderStatus::Placed, "reject", OrderStatus::Rejected)
}

pub fn advance(order: &Order) -> Result<Order, DomainError> {
    let to = next_stage(order.status)
        .ok_or_else(|| DomainError::transition(order.status, "advance"))?;
    transition(order, order.status, "advance", to)
}

/// Completes the handoff. A wrong code leaves the order untouched.
pub fn verify_delivery(order: &Order, candidate: &str) -> Result<Order, DomainError> {
    if order.status != OrderStatus::OutForDelivery {
        return Err(DomainError::transition(order.status, "verify delivery of"));
    }
    if candidate != order.delivery_otp {
        return Err(DomainError::OtpMismatch);
    }
    transition(
        order,
        OrderStatus::OutForDelivery,
        "verify delivery of",
        OrderStatus::Delivered,
    )
}

pub fn cancel(order: &Order) -> Result<Order, DomainError> {
    if order.status.is_terminal() {
        return Err(DomainError::transition(order.status, "cancel"));
    }
    transition(order, order.status, "cancel", OrderStatus::Cancelled)
}
