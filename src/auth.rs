//! Caller identity as asserted by the upstream identity provider.
//!
//! The gateway in front of this service authenticates users and forwards
//! who they are in plain headers. Handlers take a [`Caller`] argument to
//! require an authenticated, verified user.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use uuid::Uuid;

use crate::domain::order::Order;
use crate::errors::AppError;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_ROLE_HEADER: &str = "X-User-Role";
pub const USER_VERIFIED_HEADER: &str = "X-User-Verified";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Customer,
    Tailor,
}

impl Role {
    fn from_header(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "customer" => Some(Role::Customer),
            "tailor" => Some(Role::Tailor),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn require_customer(&self) -> Result<(), AppError> {
        match self.role {
            Role::Customer => Ok(()),
            Role::Tailor => Err(AppError::Forbidden(
                "this action is reserved for customers".to_string(),
            )),
        }
    }

    pub fn require_tailor(&self) -> Result<(), AppError> {
        match self.role {
            Role::Tailor => Ok(()),
            Role::Customer => Err(AppError::Forbidden(
                "this action is reserved for tailors".to_string(),
            )),
        }
    }

    /// Tailor acting on their own profile.
    pub fn require_tailor_self(&self, tailor_id: Uuid) -> Result<(), AppError> {
        self.require_tailor()?;
        if self.user_id != tailor_id {
            return Err(AppError::Forbidden(
                "tailors may only change their own profile".to_string(),
            ));
        }
        Ok(())
    }

    /// The customer who placed `order`.
    pub fn is_customer_of(&self, order: &Order) -> bool {
        self.role == Role::Customer && order.customer_id == self.user_id
    }

    /// The tailor `order` is assigned to.
    pub fn is_tailor_of(&self, order: &Order) -> bool {
        self.role == Role::Tailor && order.tailor_id == self.user_id
    }

    pub fn require_party(&self, order: &Order) -> Result<(), AppError> {
        if self.is_customer_of(order) || self.is_tailor_of(order) {
            return Ok(());
        }
        log::warn!("caller {} is not a party to order {}", self.user_id, order.id);
        Err(AppError::Forbidden(
            "order belongs to another customer and tailor".to_string(),
        ))
    }

    pub fn require_tailor_of(&self, order: &Order) -> Result<(), AppError> {
        self.require_tailor()?;
        if !self.is_tailor_of(order) {
            log::warn!("tailor {} is not assigned to order {}", self.user_id, order.id);
            return Err(AppError::Forbidden(
                "order is assigned to another tailor".to_string(),
            ));
        }
        Ok(())
    }
}

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

fn extract(req: &HttpRequest) -> Result<Caller, AppError> {
    let user_id = header(req, USER_ID_HEADER)
        .ok_or_else(|| AppError::Unauthorized("missing caller identity".to_string()))?;
    let user_id = Uuid::parse_str(user_id.trim())
        .map_err(|_| AppError::Unauthorized("malformed caller identity".to_string()))?;
    let role = header(req, USER_ROLE_HEADER)
        .and_then(Role::from_header)
        .ok_or_else(|| AppError::Unauthorized("missing or unknown caller role".to_string()))?;

    let verified = header(req, USER_VERIFIED_HEADER)
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if !verified {
        log::warn!("rejecting unverified caller {}", user_id);
        return Err(AppError::Forbidden("account is not verified".to_string()));
    }

    Ok(Caller { user_id, role })
}

impl FromRequest for Caller {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract(req))
    }
}
