//! Customer records and the aggregated per-customer summary view.

pub mod customer;
pub mod summary;

pub use customer::{Customer, CustomerDraft, CustomerUpdate};
pub use summary::CustomerSummary;
