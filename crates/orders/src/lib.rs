//! Sales orders: line items, the delivery status machine and payments.

pub mod order;
pub mod payment;

pub use order::{Order, OrderDraft, OrderLine, OrderLineDraft, OrderStatus};
pub use payment::{Payment, PaymentMethod};
