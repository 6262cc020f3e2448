//! Employees and the positions that carry their access role.

pub mod employee;
pub mod position;

pub use employee::{Employee, EmployeeDraft, EmployeeStatus, EmployeeUpdate};
pub use position::{Position, PositionDraft};
