use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::Utc;
use comercio_companies::{Company, CompanyDraft, CompanyUpdate};
use comercio_core::{DomainError, TenantId};

use crate::sequence::CodeSequence;

/// Global registry of companies. Companies are the tenants themselves,
/// so this is the one store that is not tenant-scoped.
#[derive(Debug, Default)]
pub struct CompanyDirectory {
    inner: RwLock<BTreeMap<TenantId, Company>>,
    codes: CodeSequence,
}

impl CompanyDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, draft: CompanyDraft) -> Result<Company, DomainError> {
        draft.validate()?;
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::invariant("company directory lock poisoned"))?;
        if let Some(ruc) = &draft.ruc {
            if map.values().any(|c| c.ruc.as_deref() == Some(ruc.as_str())) {
                return Err(DomainError::conflict(format!(
                    "a company with RUC {ruc} already exists"
                )));
            }
        }
        let code: TenantId = self.codes.allocate();
        let company = draft.into_company(code, Utc::now());
        map.insert(code, company.clone());
        tracing::info!(tenant_id = %code, name = %company.name, "company registered");
        Ok(company)
    }

    pub fn get(&self, code: TenantId) -> Result<Company, DomainError> {
        let map = self
            .inner
            .read()
            .map_err(|_| DomainError::invariant("company directory lock poisoned"))?;
        map.get(&code)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("company {code}")))
    }

    pub fn exists(&self, code: TenantId) -> bool {
        self.inner
            .read()
            .map(|map| map.contains_key(&code))
            .unwrap_or(false)
    }

    /// RUC availability check used by the registration form.
    pub fn ruc_exists(&self, ruc: &str) -> bool {
        self.inner
            .read()
            .map(|map| map.values().any(|c| c.ruc.as_deref() == Some(ruc)))
            .unwrap_or(false)
    }

    pub fn list(&self) -> Vec<Company> {
        self.inner
            .read()
            .map(|map| map.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn update(&self, code: TenantId, update: CompanyUpdate) -> Result<Company, DomainError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::invariant("company directory lock poisoned"))?;
        let company = map
            .get_mut(&code)
            .ok_or_else(|| DomainError::not_found(format!("company {code}")))?;
        company.apply_update(update)?;
        Ok(company.clone())
    }

    pub fn delete(&self, code: TenantId) -> Result<(), DomainError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::invariant("company directory lock poisoned"))?;
        map.remove(&code)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found(format!("company {code}")))
    }
}
