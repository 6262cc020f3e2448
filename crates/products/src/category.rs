use chrono::{DateTime, Utc};
use comercio_core::{CategoryId, DomainError};
use serde::{Deserialize, Serialize};

/// Grouping bucket for catalog products, scoped per company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCategory {
    pub code: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl CategoryDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("category name must not be empty"));
        }
        if self.name.len() > 100 {
            return Err(DomainError::validation("category name exceeds 100 characters"));
        }
        Ok(())
    }

    pub fn into_category(
        self,
        code: CategoryId,
        now: DateTime<Utc>,
    ) -> Result<ProductCategory, DomainError> {
        self.validate()?;
        Ok(ProductCategory {
            code,
            name: self.name.trim().to_string(),
            description: self.description,
            created_at: now,
        })
    }
}
