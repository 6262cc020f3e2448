use std::collections::HashMap;
use std::sync::RwLock;

use comercio_core::{DomainError, UserId};
use serde::{Deserialize, Serialize};

use crate::sequence::CodeSequence;

/// Login account bound to an external identity-provider uid. The
/// provider proves who the caller is; this record only assigns the
/// internal user code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub code: UserId,
    pub uid: String,
    pub name: String,
}

/// Global uid → user mapping. Not tenant-scoped: one account can be a
/// member of several companies.
#[derive(Debug, Default)]
pub struct UserDirectory {
    by_uid: RwLock<HashMap<String, UserRecord>>,
    codes: CodeSequence,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_by_uid(&self, uid: &str) -> Option<UserRecord> {
        self.by_uid.read().ok()?.get(uid).cloned()
    }

    /// Returns the existing record for `uid` or creates one.
    pub fn get_or_create(&self, uid: &str, name: &str) -> Result<UserRecord, DomainError> {
        if uid.trim().is_empty() {
            return Err(DomainError::validation("uid must not be empty"));
        }
        let mut map = self
            .by_uid
            .write()
            .map_err(|_| DomainError::invariant("user directory lock poisoned"))?;
        if let Some(existing) = map.get(uid) {
            return Ok(existing.clone());
        }
        let record = UserRecord {
            code: self.codes.allocate(),
            uid: uid.to_string(),
            name: name.trim().to_string(),
        };
        map.insert(uid.to_string(), record.clone());
        Ok(record)
    }
}
