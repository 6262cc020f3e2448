use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use comercio_auth::Role;
use comercio_core::{DomainError, EmployeeId, TenantId, UserId};
use serde::{Deserialize, Serialize};

use crate::tenant_store::TenantStore;

/// Link between a login account and a company. Sessions can only be
/// established for (user, company) pairs registered here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyMembership {
    pub user: UserId,
    pub tenant: TenantId,
    pub employee: Option<EmployeeId>,
    pub role: Role,
    pub registered_at: DateTime<Utc>,
}

type MembershipStore = Arc<dyn TenantStore<UserId, CompanyMembership>>;

pub struct MembershipRegistry {
    store: MembershipStore,
    // Reverse index for the company-selection screen: which companies
    // does a user belong to? The store is keyed per tenant and cannot
    // answer that without scanning every tenant.
    by_user: RwLock<HashMap<UserId, Vec<TenantId>>>,
}

impl MembershipRegistry {
    pub fn new(store: MembershipStore) -> Self {
        Self {
            store,
            by_user: RwLock::new(HashMap::new()),
        }
    }

    pub fn register(
        &self,
        user: UserId,
        tenant: TenantId,
        employee: Option<EmployeeId>,
        role: Role,
    ) -> Result<CompanyMembership, DomainError> {
        if self.store.get(tenant, &user).is_some() {
            return Err(DomainError::conflict(format!(
                "user {user} is already registered with company {tenant}"
            )));
        }
        let membership = CompanyMembership {
            user,
            tenant,
            employee,
            role,
            registered_at: Utc::now(),
        };
        self.store.upsert(tenant, user, membership.clone());
        self.by_user
            .write()
            .map_err(|_| DomainError::invariant("membership index lock poisoned"))?
            .entry(user)
            .or_default()
            .push(tenant);
        tracing::info!(tenant_id = %tenant, user = %user, "user registered with company");
        Ok(membership)
    }

    /// The check behind session establishment: does this user belong
    /// to this company?
    pub fn verify(&self, user: UserId, tenant: TenantId) -> Result<CompanyMembership, DomainError> {
        self.store.get(tenant, &user).ok_or_else(|| {
            DomainError::unauthorized(format!("user {user} does not belong to company {tenant}"))
        })
    }

    pub fn list(&self, tenant: TenantId) -> Vec<CompanyMembership> {
        let mut memberships = self.store.list(tenant);
        memberships.sort_by_key(|m| m.user);
        memberships
    }

    /// All memberships held by one user, sorted by company. Feeds the
    /// company-selection screen shown after login.
    pub fn companies_of(&self, user: UserId) -> Result<Vec<CompanyMembership>, DomainError> {
        let mut tenants = self
            .by_user
            .read()
            .map_err(|_| DomainError::invariant("membership index lock poisoned"))?
            .get(&user)
            .cloned()
            .unwrap_or_default();
        tenants.sort();
        Ok(tenants
            .into_iter()
            .filter_map(|tenant| self.store.get(tenant, &user))
            .collect())
    }

    pub fn revoke(&self, user: UserId, tenant: TenantId) -> Result<(), DomainError> {
        self.store.remove(tenant, &user).map(|_| ()).ok_or_else(|| {
            DomainError::not_found(format!("user {user} has no membership in company {tenant}"))
        })?;
        if let Ok(mut index) = self.by_user.write() {
            if let Some(tenants) = index.get_mut(&user) {
                tenants.retain(|t| *t != tenant);
            }
        }
        Ok(())
    }
}
