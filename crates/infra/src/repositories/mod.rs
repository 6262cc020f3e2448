//! Repositories over the tenant-isolated stores. All business
//! validation lives in the domain crates; repositories add code
//! allocation, lookup failures and the cross-entity flows (order
//! placement, stock release).

mod companies;
mod customers;
mod employees;
mod memberships;
mod orders;
mod products;
mod users;

pub use companies::CompanyDirectory;
pub use customers::CustomerRepository;
pub use employees::EmployeeRepository;
pub use memberships::{CompanyMembership, MembershipRegistry};
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::{UserDirectory, UserRecord};
