//! `comercio-core` — shared domain building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns)
//! plus the small key-value storage boundary used by session and tenant-context
//! persistence.

pub mod error;
pub mod id;
pub mod storage;

pub use error::{DomainError, DomainResult};
pub use id::{
    CategoryId, CustomerId, EmployeeId, OrderId, PositionId, ProductId, TenantId, UserId,
};
pub use storage::{KeyValueStorage, MemoryStorage, StorageError};
