use comercio_auth::Role;
use comercio_core::{DomainError, PositionId};
use serde::{Deserialize, Serialize};

/// Job position within a company. The attached role is what the access
/// guards check, so changing a position's role changes what everyone
/// holding it can do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub code: PositionId,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PositionDraft {
    pub name: String,
    pub role: Role,
}

impl PositionDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("position name must not be empty"));
        }
        Ok(())
    }

    pub fn into_position(self, code: PositionId) -> Result<Position, DomainError> {
        self.validate()?;
        Ok(Position {
            code,
            name: self.name.trim().to_string(),
            role: self.role,
        })
    }
}
