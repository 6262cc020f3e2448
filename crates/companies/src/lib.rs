//! `comercio-companies` — the company ("empresa") tenant entity.

pub mod company;

pub use company::{Company, CompanyDraft, CompanyUpdate};
