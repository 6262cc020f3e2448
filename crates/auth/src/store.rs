//! Client-side session container.
//!
//! The session is both an in-memory latest-value stream (so guards can take a
//! one-shot snapshot at navigation time) and a durably persisted record (so a
//! fresh process resumes the last session without re-authenticating).

use std::sync::Arc;

use tokio::sync::watch;

use comercio_core::KeyValueStorage;

use crate::UserSession;

/// Fixed storage key for the persisted session.
pub const SESSION_STORAGE_KEY: &str = "userSession";

/// Holds the current identity, publishes changes, and persists every mutation.
pub struct SessionStore {
    tx: watch::Sender<Option<UserSession>>,
    storage: Arc<dyn KeyValueStorage>,
}

impl SessionStore {
    /// Build a store over the given durable storage, rehydrating any persisted
    /// session. A corrupt persisted entry is discarded (logged, never
    /// surfaced) and the store starts empty.
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        let initial = Self::load(&*storage);
        let (tx, _rx) = watch::channel(initial);
        Self { tx, storage }
    }

    /// One-shot snapshot of the latest session value.
    pub fn snapshot(&self) -> Option<UserSession> {
        self.tx.borrow().clone()
    }

    /// Subscribe to session changes. Guards must not hold this across a
    /// navigation check; it exists for views that track login state.
    pub fn subscribe(&self) -> watch::Receiver<Option<UserSession>> {
        self.tx.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Install a session after a successful login and persist it.
    pub fn establish(&self, session: UserSession) {
        match serde_json::to_string(&session) {
            Ok(raw) => {
                if let Err(e) = self.storage.put(SESSION_STORAGE_KEY, &raw) {
                    tracing::warn!("failed to persist session: {e}");
                }
            }
            Err(e) => tracing::warn!("failed to serialize session: {e}"),
        }
        // send_replace stores the value even when nobody is subscribed;
        // send would drop the write once every receiver is gone.
        self.tx.send_replace(Some(session));
    }

    /// Drop the session from memory and storage (logout).
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(SESSION_STORAGE_KEY) {
            tracing::warn!("failed to remove persisted session: {e}");
        }
        self.tx.send_replace(None);
    }

    fn load(storage: &dyn KeyValueStorage) -> Option<UserSession> {
        let raw = match storage.get(SESSION_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("failed to read persisted session: {e}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                // Corrupt persisted state resets to empty, never errors.
                tracing::warn!("discarding corrupt persisted session: {e}");
                let _ = storage.remove(SESSION_STORAGE_KEY);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use comercio_companies::Company;
    use comercio_core::{MemoryStorage, TenantId, UserId};

    use crate::{Role, SessionUser};

    fn sample_session(tenant: i64) -> UserSession {
        let company = Company {
            code: TenantId::new(tenant),
            name: "Comercial Andina".to_string(),
            ruc: None,
            address: None,
            phone: None,
            email: None,
            logo: None,
            registered_at: Utc::now(),
        };
        UserSession {
            user: SessionUser {
                code: UserId::new(1),
                name: "maria".to_string(),
                tenant_code: company.code,
                employee_code: None,
            },
            company,
            employee: None,
            token: "token".to_string(),
        }
    }

    #[test]
    fn establish_then_snapshot() {
        let store = SessionStore::new(Arc::new(MemoryStorage::new()));
        assert!(store.snapshot().is_none());

        store.establish(sample_session(7));
        assert_eq!(store.snapshot().unwrap().tenant_code(), TenantId::new(7));
        assert!(store.is_authenticated());
    }

    #[test]
    fn clear_removes_memory_and_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(storage.clone());
        store.establish(sample_session(7));

        store.clear();
        assert!(store.snapshot().is_none());
        assert_eq!(storage.get(SESSION_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn establish_applies_after_all_subscribers_are_gone() {
        let store = SessionStore::new(Arc::new(MemoryStorage::new()));
        drop(store.subscribe());

        store.establish(sample_session(7));
        assert!(store.is_authenticated());
        assert_eq!(store.snapshot().unwrap().tenant_code(), TenantId::new(7));

        store.clear();
        assert!(store.snapshot().is_none());
    }

    #[test]
    fn session_survives_process_restart() {
        let storage = Arc::new(MemoryStorage::new());
        SessionStore::new(storage.clone()).establish(sample_session(9));

        // Fresh store over the same storage simulates a cold start.
        let rehydrated = SessionStore::new(storage);
        assert_eq!(
            rehydrated.snapshot().unwrap().tenant_code(),
            TenantId::new(9)
        );
    }

    #[test]
    fn corrupt_persisted_session_resets_to_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.put(SESSION_STORAGE_KEY, "{not json").unwrap();

        let store = SessionStore::new(storage.clone());
        assert!(store.snapshot().is_none());
        // The corrupt entry is gone, not just ignored.
        assert_eq!(storage.get(SESSION_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn subscribers_observe_changes() {
        let store = SessionStore::new(Arc::new(MemoryStorage::new()));
        let rx = store.subscribe();

        store.establish(sample_session(7));
        assert!(rx.borrow().is_some());

        store.clear();
        assert!(rx.borrow().is_none());
    }

    #[test]
    fn role_checks_via_employee_profile() {
        let mut session = sample_session(7);
        session.employee = Some(crate::EmployeeProfile {
            code: comercio_core::EmployeeId::new(2),
            first_name: "Ana".to_string(),
            last_name: "Ruiz".to_string(),
            role: Some(Role::super_admin()),
        });

        let store = SessionStore::new(Arc::new(MemoryStorage::new()));
        store.establish(session);
        assert!(store.snapshot().unwrap().is_super_admin());
    }
}
