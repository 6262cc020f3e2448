//! Product catalog domain: products, categories and the per-product
//! change history that inventory views are built from.

pub mod category;
pub mod history;
pub mod product;

pub use category::{CategoryDraft, ProductCategory};
pub use history::{HistoryKind, ProductHistoryEntry};
pub use product::{Product, ProductDraft, ProductStatus, ProductUpdate};
