use chrono::{DateTime, Utc};
use comercio_core::{CustomerId, DomainError, OrderId, ProductId};
use serde::{Deserialize, Serialize};

/// Delivery status of an order. The wire labels are the Spanish ones
/// the clients already display verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "Pendiente")]
    Pending,
    #[serde(rename = "EnProceso")]
    InProgress,
    #[serde(rename = "Entregado")]
    Delivered,
    #[serde(rename = "Cancelado")]
    Cancelled,
    #[serde(rename = "Devuelto")]
    Returned,
}

impl OrderStatus {
    /// Forward transitions: Pendiente -> EnProceso -> Entregado ->
    /// Devuelto. Cancellation is allowed until the order is delivered.
    pub fn can_transition(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, InProgress)
                | (Pending, Cancelled)
                | (InProgress, Delivered)
                | (InProgress, Cancelled)
                | (Delivered, Returned)
        )
    }

    /// Whether the order still ties up stock and counts as open.
    pub fn is_open(self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::InProgress)
    }

    /// Statuses that hand stock back to the catalog.
    pub fn releases_stock(self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Returned)
    }
}

/// One line of an order. `unit_price_cents` is captured at order time
/// so later price changes do not rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product: ProductId,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

impl OrderLine {
    pub fn subtotal_cents(&self) -> i64 {
        self.unit_price_cents * i64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub code: OrderId,
    /// Walk-in sales have no customer on record.
    pub customer: Option<CustomerId>,
    pub lines: Vec<OrderLine>,
    pub status: OrderStatus,
    pub total_cents: i64,
    pub notes: Option<String>,
    pub placed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Moves the order to `next`, rejecting transitions the status
    /// machine does not allow.
    pub fn transition(&mut self, next: OrderStatus, now: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.status.can_transition(next) {
            return Err(DomainError::conflict(format!(
                "order {} cannot move from {:?} to {:?}",
                self.code, self.status, next
            )));
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }
}

/// One requested line in an incoming order; the unit price is looked
/// up from the catalog when the order is placed.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderLineDraft {
    pub product: ProductId,
    pub quantity: u32,
}

/// Incoming payload for placing an order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderDraft {
    #[serde(default)]
    pub customer: Option<CustomerId>,
    pub lines: Vec<OrderLineDraft>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl OrderDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.lines.is_empty() {
            return Err(DomainError::validation("order must have at least one line"));
        }
        for line in &self.lines {
            if line.quantity == 0 {
                return Err(DomainError::validation(format!(
                    "line for product {} has zero quantity",
                    line.product
                )));
            }
        }
        let mut seen: Vec<ProductId> = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            if seen.contains(&line.product) {
                return Err(DomainError::validation(format!(
                    "product {} appears on more than one line",
                    line.product
                )));
            }
            seen.push(line.product);
        }
        Ok(())
    }

    /// Builds the order once every line has been priced. `priced` must
    /// be parallel to `self.lines`.
    pub fn into_order(
        self,
        code: OrderId,
        priced: Vec<OrderLine>,
        now: DateTime<Utc>,
    ) -> Result<Order, DomainError> {
        if priced.len() != self.lines.len() {
            return Err(DomainError::invariant(
                "priced lines do not match requested lines",
            ));
        }
        let total_cents = priced.iter().map(OrderLine::subtotal_cents).sum();
        Ok(Order {
            code,
            customer: self.customer,
            lines: priced,
            status: OrderStatus::Pending,
            total_cents,
            notes: self.notes,
            placed_at: now,
            updated_at: now,
        })
    }
}
