//! `comercio-tenancy` — tenant context propagation and navigation guards.
//!
//! Two pieces make the multi-tenant boundary hold together on the client
//! side:
//!
//! - [`TenantContext`] tracks the single selected company for the lifetime of
//!   a session, persists it durably, and refuses tenant-scoped work when no
//!   company is selected.
//! - [`guards`] gates navigation: identity presence, tenant presence,
//!   identity/context consistency, and role membership, each resolving to an
//!   allow-or-redirect decision, never an error.

pub mod context;
pub mod guards;

pub use context::{TENANT_STORAGE_KEY, TenancyError, TenantContext};
pub use guards::{
    GuardDecision, Route, admin_guard, auth_guard, auth_only_guard, public_guard,
    super_admin_guard, tenant_route_guard,
};
