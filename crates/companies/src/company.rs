use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use comercio_core::{DomainError, DomainResult, TenantId};

/// A company is the unit of data isolation: every other record in the system
/// carries its company code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub code: TenantId,
    pub name: String,
    /// Fiscal identifier (RUC). Optional: not every company registers one.
    pub ruc: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub logo: Option<String>,
    pub registered_at: DateTime<Utc>,
}

/// Payload for registering a new company (code is assigned by the store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyDraft {
    pub name: String,
    pub ruc: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub logo: Option<String>,
}

/// Partial update: `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyUpdate {
    pub name: Option<String>,
    pub ruc: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub logo: Option<String>,
}

impl CompanyDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("company name cannot be empty"));
        }
        if let Some(ruc) = &self.ruc {
            validate_ruc(ruc)?;
        }
        Ok(())
    }

    /// Materialize a company from a validated draft.
    pub fn into_company(self, code: TenantId, registered_at: DateTime<Utc>) -> Company {
        Company {
            code,
            name: self.name,
            ruc: self.ruc,
            address: self.address,
            phone: self.phone,
            email: self.email,
            logo: self.logo,
            registered_at,
        }
    }
}

impl Company {
    /// Apply a partial update in place. Registration timestamp and code are
    /// immutable.
    pub fn apply_update(&mut self, update: CompanyUpdate) -> DomainResult<()> {
        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("company name cannot be empty"));
            }
        }
        if let Some(ruc) = &update.ruc {
            validate_ruc(ruc)?;
        }

        if let Some(name) = update.name {
            self.name = name;
        }
        if update.ruc.is_some() {
            self.ruc = update.ruc;
        }
        if update.address.is_some() {
            self.address = update.address;
        }
        if update.phone.is_some() {
            self.phone = update.phone;
        }
        if update.email.is_some() {
            self.email = update.email;
        }
        if update.logo.is_some() {
            self.logo = update.logo;
        }
        Ok(())
    }
}

/// RUC format check: 10 to 13 digits. Registry-level validity is out of scope.
fn validate_ruc(ruc: &str) -> DomainResult<()> {
    let ok = (10..=13).contains(&ruc.len()) && ruc.chars().all(|c| c.is_ascii_digit());
    if ok {
        Ok(())
    } else {
        Err(DomainError::validation("RUC must be 10 to 13 digits"))
    }
}
