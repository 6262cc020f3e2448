use std::sync::Arc;

use chrono::Utc;
use comercio_core::{CustomerId, DomainError, TenantId};
use comercio_customers::{Customer, CustomerDraft, CustomerUpdate};

use crate::sequence::CodeSequence;
use crate::tenant_store::TenantStore;

type CustomerStore = Arc<dyn TenantStore<CustomerId, Customer>>;

pub struct CustomerRepository {
    store: CustomerStore,
    codes: CodeSequence,
}

impl CustomerRepository {
    pub fn new(store: CustomerStore) -> Self {
        Self {
            store,
            codes: CodeSequence::default(),
        }
    }

    pub fn create(&self, tenant: TenantId, draft: CustomerDraft) -> Result<Customer, DomainError> {
        draft.validate()?;
        if self
            .store
            .list(tenant)
            .iter()
            .any(|c| c.identification == draft.identification.trim())
        {
            return Err(DomainError::conflict(format!(
                "a customer with identification {} already exists",
                draft.identification.trim()
            )));
        }
        let code: CustomerId = self.codes.allocate();
        let customer = draft.into_customer(code, Utc::now())?;
        self.store.upsert(tenant, code, customer.clone());
        Ok(customer)
    }

    pub fn get(&self, tenant: TenantId, code: CustomerId) -> Result<Customer, DomainError> {
        self.store
            .get(tenant, &code)
            .ok_or_else(|| DomainError::not_found(format!("customer {code}")))
    }

    pub fn list(&self, tenant: TenantId) -> Vec<Customer> {
        let mut customers = self.store.list(tenant);
        customers.sort_by_key(|c| c.code);
        customers
    }

    pub fn update(
        &self,
        tenant: TenantId,
        code: CustomerId,
        update: &CustomerUpdate,
    ) -> Result<Customer, DomainError> {
        let mut customer = self.get(tenant, code)?;
        update.apply(&mut customer)?;
        self.store.upsert(tenant, code, customer.clone());
        Ok(customer)
    }

    pub fn delete(&self, tenant: TenantId, code: CustomerId) -> Result<(), DomainError> {
        self.store
            .remove(tenant, &code)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found(format!("customer {code}")))
    }
}
