//! A session established in one process must survive a restart when the
//! store is backed by file storage.

use std::sync::Arc;

use chrono::Utc;

use comercio_auth::{SessionStore, SessionUser, UserSession};
use comercio_companies::Company;
use comercio_core::{TenantId, UserId};
use comercio_infra::JsonFileStorage;

fn session() -> UserSession {
    let company = Company {
        code: TenantId::new(7),
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
        token: "opaque-token".to_string(),
    }
}

#[test]
fn session_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    {
        let storage = Arc::new(JsonFileStorage::new(&path));
        let store = SessionStore::new(storage);
        assert!(!store.is_authenticated());
        store.establish(session());
    }

    // Fresh process: same file, new store.
    let storage = Arc::new(JsonFileStorage::new(&path));
    let store = SessionStore::new(storage);
    assert!(store.is_authenticated());
    assert_eq!(store.snapshot().unwrap().tenant_code(), TenantId::new(7));
}

#[test]
fn logout_clears_the_persisted_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let storage = Arc::new(JsonFileStorage::new(&path));
    let store = SessionStore::new(storage.clone());
    store.establish(session());
    store.clear();

    let store = SessionStore::new(storage);
    assert!(store.snapshot().is_none());
}
