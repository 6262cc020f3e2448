//! Infrastructure layer: tenant-isolated stores, durable key-value
//! storage and the repositories the HTTP layer is wired against.

pub mod repositories;
pub mod sequence;
pub mod storage;
pub mod tenant_store;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use sequence::CodeSequence;
pub use storage::JsonFileStorage;
pub use tenant_store::{InMemoryTenantStore, TenantStore};
