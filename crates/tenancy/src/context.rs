//! The tenant context propagator.
//!
//! Holds the currently selected company, mirrors it to durable storage under
//! a fixed key, and hands its code to every tenant-scoped call path. Mutated
//! only by login, explicit company selection, and logout.

use std::sync::{Arc, RwLock};

use thiserror::Error;
use tokio::sync::watch;

use comercio_companies::Company;
use comercio_core::{KeyValueStorage, TenantId};

/// Fixed storage key for the persisted company selection.
pub const TENANT_STORAGE_KEY: &str = "tenantActual";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TenancyError {
    /// A tenant-scoped operation ran with no company selected. Callers must
    /// redirect to company selection; this never crosses a navigation
    /// boundary unresolved.
    #[error("no company selected; a company must be selected to continue")]
    MissingTenantContext,
}

/// Singleton (per session) holder of the selected company.
pub struct TenantContext {
    current: RwLock<Option<Company>>,
    code_tx: watch::Sender<Option<TenantId>>,
    storage: Arc<dyn KeyValueStorage>,
}

impl TenantContext {
    /// Build a context over the given durable storage, rehydrating any
    /// persisted selection. Corrupt persisted data is discarded and logged;
    /// the context starts empty.
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        let initial = Self::load(&*storage);
        let code = initial.as_ref().map(|c| c.code);
        let (code_tx, _rx) = watch::channel(code);
        Self {
            current: RwLock::new(initial),
            code_tx,
            storage,
        }
    }

    /// Select a company. Overwrites any previous selection unconditionally,
    /// persists synchronously, and notifies subscribers.
    pub fn set_current(&self, company: Company) {
        match serde_json::to_string(&company) {
            Ok(raw) => {
                if let Err(e) = self.storage.put(TENANT_STORAGE_KEY, &raw) {
                    tracing::warn!("failed to persist tenant selection: {e}");
                }
            }
            Err(e) => tracing::warn!("failed to serialize tenant selection: {e}"),
        }

        let code = company.code;
        *self.current.write().expect("tenant context poisoned") = Some(company);
        // send_replace stores the value even when nobody is subscribed;
        // send would drop the write once every receiver is gone.
        self.code_tx.send_replace(Some(code));
    }

    /// The selected company, if any.
    pub fn current(&self) -> Option<Company> {
        self.current.read().expect("tenant context poisoned").clone()
    }

    /// The selected company code, if any.
    pub fn current_code(&self) -> Option<TenantId> {
        *self.code_tx.borrow()
    }

    /// True iff a company is selected.
    pub fn has_selection(&self) -> bool {
        self.current_code().is_some()
    }

    /// The selected company code, or `MissingTenantContext`.
    ///
    /// Every tenant-scoped request path resolves its `{tenantId}` through
    /// this, so nothing can silently operate tenant-less.
    pub fn require_selected(&self) -> Result<TenantId, TenancyError> {
        self.current_code().ok_or(TenancyError::MissingTenantContext)
    }

    /// Subscribe to selection changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<TenantId>> {
        self.code_tx.subscribe()
    }

    /// Drop the selection from memory and storage (logout).
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(TENANT_STORAGE_KEY) {
            tracing::warn!("failed to remove persisted tenant selection: {e}");
        }
        *self.current.write().expect("tenant context poisoned") = None;
        self.code_tx.send_replace(None);
    }

    fn load(storage: &dyn KeyValueStorage) -> Option<Company> {
        let raw = match storage.get(TENANT_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("failed to read persisted tenant selection: {e}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(company) => Some(company),
            Err(e) => {
                // Corrupt persisted state resets to empty, never errors.
                tracing::warn!("discarding corrupt persisted tenant selection: {e}");
                let _ = storage.remove(TENANT_STORAGE_KEY);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use comercio_core::MemoryStorage;
    use proptest::prelude::*;

    fn company(code: i64, name: &str) -> Company {
        Company {
            code: TenantId::new(code),
            name: name.to_string(),
            ruc: None,
            address: None,
            phone: None,
            email: None,
            logo: None,
            registered_at: Utc::now(),
        }
    }

    fn fresh_context() -> TenantContext {
        TenantContext::new(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn set_then_read_returns_same_code() {
        let ctx = fresh_context();
        ctx.set_current(company(7, "Comercial Andina"));

        assert_eq!(ctx.current_code(), Some(TenantId::new(7)));
        assert_eq!(ctx.current().unwrap().name, "Comercial Andina");
        assert!(ctx.has_selection());
    }

    #[test]
    fn set_overwrites_previous_selection() {
        let ctx = fresh_context();
        ctx.set_current(company(7, "A"));
        ctx.set_current(company(9, "B"));

        assert_eq!(ctx.current_code(), Some(TenantId::new(9)));
        assert_eq!(ctx.current().unwrap().name, "B");
    }

    #[test]
    fn clear_empties_memory_and_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let ctx = TenantContext::new(storage.clone());
        ctx.set_current(company(7, "A"));

        ctx.clear();
        assert!(!ctx.has_selection());
        assert!(ctx.current().is_none());
        assert_eq!(storage.get(TENANT_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn require_selected_fails_iff_no_selection() {
        let ctx = fresh_context();
        assert_eq!(
            ctx.require_selected(),
            Err(TenancyError::MissingTenantContext)
        );

        ctx.set_current(company(7, "A"));
        assert_eq!(ctx.require_selected(), Ok(TenantId::new(7)));

        ctx.clear();
        assert_eq!(
            ctx.require_selected(),
            Err(TenancyError::MissingTenantContext)
        );
    }

    #[test]
    fn selection_survives_process_restart() {
        let storage = Arc::new(MemoryStorage::new());
        TenantContext::new(storage.clone()).set_current(company(7, "A"));

        // Fresh context over the same storage simulates a cold start.
        let rehydrated = TenantContext::new(storage);
        assert_eq!(rehydrated.current_code(), Some(TenantId::new(7)));
    }

    #[test]
    fn corrupt_persisted_selection_resets_to_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.put(TENANT_STORAGE_KEY, "{broken").unwrap();

        let ctx = TenantContext::new(storage.clone());
        assert!(!ctx.has_selection());
        assert_eq!(storage.get(TENANT_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn selection_applies_after_all_subscribers_are_gone() {
        let ctx = fresh_context();
        drop(ctx.subscribe());

        ctx.set_current(company(7, "A"));
        assert_eq!(ctx.current_code(), Some(TenantId::new(7)));
        assert_eq!(ctx.require_selected(), Ok(TenantId::new(7)));

        ctx.clear();
        assert!(!ctx.has_selection());
    }

    #[test]
    fn subscribers_see_selection_changes() {
        let ctx = fresh_context();
        let rx = ctx.subscribe();

        ctx.set_current(company(7, "A"));
        assert_eq!(*rx.borrow(), Some(TenantId::new(7)));

        ctx.clear();
        assert_eq!(*rx.borrow(), None);
    }

    proptest! {
        // Last-write-wins over any sequence of selections.
        #[test]
        fn last_selection_wins(codes in proptest::collection::vec(1i64..10_000, 1..20)) {
            let ctx = fresh_context();
            for code in &codes {
                ctx.set_current(company(*code, "C"));
            }
            prop_assert_eq!(ctx.current_code(), Some(TenantId::new(*codes.last().unwrap())));
        }

        // require_selected agrees with has_selection at every step.
        #[test]
        fn require_matches_predicate(ops in proptest::collection::vec(proptest::option::of(1i64..100), 1..20)) {
            let ctx = fresh_context();
            for op in ops {
                match op {
                    Some(code) => ctx.set_current(company(code, "C")),
                    None => ctx.clear(),
                }
                prop_assert_eq!(ctx.require_selected().is_ok(), ctx.has_selection());
            }
        }
    }
}
