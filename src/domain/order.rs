use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fulfillment status of an order.
///
/// Forward path is `Pending -> Processing -> Completed`. `Failed` and
/// `Cancelled` can be entered from either non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl OrderStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Completed,
        OrderStatus::Failed,
        OrderStatus::Cancelled,
    ];

    /// Statuses reachable from `self` in one step.
    pub fn successors(&self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Pending => &[Processing, Failed, Cancelled],
            Processing => &[Completed, Failed, Cancelled],
            Completed | Failed | Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        self.successors().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.successors().is_empty()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Failed => "failed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown order status: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl Default for ShippingAddress {
    fn default() -> Self {
        Self {
            street: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            country: "USA".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Represents a customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub customer: Customer,
    pub address: ShippingAddress,
    pub product_id: String,
    pub quantity: u32,
    /// Unit price at acceptance times quantity. Never recomputed.
    pub total_amount: f64,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Parameters the ledger needs to record an accepted order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub customer: Customer,
    pub address: ShippingAddress,
    pub product_id: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub notes: Option<String>,
}

/// Raw intake submitted by a caller, validated before anything is reserved.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: ShippingAddress,
    pub product_id: String,
    pub quantity: u32,
    pub notes: Option<String>,
}

impl OrderRequest {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        product_id: impl Into<String>,
        quantity: u32,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: None,
            address: ShippingAddress::default(),
            product_id: product_id.into(),
            quantity,
            notes: None,
        }
    }

    pub fn with_address(mut self, address: ShippingAddress) -> Self {
        self.address = address;
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// Returned to the caller as soon as the order is on the ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Acceptance {
    pub order_id: String,
    pub status: OrderStatus,
    pub estimated_window: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    pub fn status(status: OrderStatus) -> Self {
        Self { status: Some(status) }
    }

    pub fn matches(&self, order: &Order) -> bool {
        self.status.map_or(true, |status| order.status == status)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusStats {
    pub status: OrderStatus,
    pub count: usize,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderStats {
    pub by_status: Vec<StatusStats>,
    pub total_orders: usize,
    pub last_24h: usize,
}
