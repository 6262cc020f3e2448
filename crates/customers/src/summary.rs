use comercio_core::CustomerId;
use serde::Serialize;

/// Aggregated view returned by the customer summary endpoint: how many
/// orders the customer has placed and what they add up to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerSummary {
    pub customer: CustomerId,
    pub order_count: u64,
    pub lifetime_total_cents: i64,
    pub open_orders: u64,
}

impl CustomerSummary {
    pub fn empty(customer: CustomerId) -> Self {
        Self {
            customer,
            order_count: 0,
            lifetime_total_cents: 0,
            open_orders: 0,
        }
    }

    pub fn record_order(&mut self, total_cents: i64, open: bool) {
        self.order_count += 1;
        self.lifetime_total_cents += total_cents;
        if open {
            self.open_orders += 1;
        }
    }
}
