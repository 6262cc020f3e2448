use chrono::{DateTime, Utc};
use comercio_core::{CategoryId, DomainError, ProductId};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a catalog product. The wire labels are the
/// Spanish ones the clients already display verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductStatus {
    #[serde(rename = "Disponible")]
    Available,
    #[serde(rename = "Agotado")]
    OutOfStock,
    #[serde(rename = "Descontinuado")]
    Discontinued,
}

/// Catalog product scoped to a single company. Prices are integer
/// cents; stock is a plain unit count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub code: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<CategoryId>,
    pub price_cents: i64,
    pub stock: u32,
    pub photo: Option<String>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// A product with zero stock reads as out of stock unless it has
    /// been explicitly discontinued.
    pub fn effective_status(&self) -> ProductStatus {
        match self.status {
            ProductStatus::Discontinued => ProductStatus::Discontinued,
            _ if self.stock == 0 => ProductStatus::OutOfStock,
            _ => ProductStatus::Available,
        }
    }

    pub fn is_sellable(&self) -> bool {
        self.effective_status() == ProductStatus::Available
    }

    /// Removes `quantity` units from stock, failing when not enough
    /// units remain. Status is re-derived after the decrement.
    pub fn withdraw_stock(&mut self, quantity: u32, now: DateTime<Utc>) -> Result<(), DomainError> {
        if quantity == 0 {
            return Err(DomainError::validation("quantity must be greater than zero"));
        }
        if self.status == ProductStatus::Discontinued {
            return Err(DomainError::conflict(format!(
                "product {} is discontinued",
                self.code
            )));
        }
        if self.stock < quantity {
            return Err(DomainError::conflict(format!(
                "insufficient stock for product {}: requested {quantity}, available {}",
                self.code, self.stock
            )));
        }
        self.stock -= quantity;
        self.status = self.effective_status();
        self.updated_at = now;
        Ok(())
    }

    /// Adds units back to stock (returns, restocks).
    pub fn replenish_stock(&mut self, quantity: u32, now: DateTime<Utc>) -> Result<(), DomainError> {
        if quantity == 0 {
            return Err(DomainError::validation("quantity must be greater than zero"));
        }
        self.stock = self
            .stock
            .checked_add(quantity)
            .ok_or_else(|| DomainError::invariant("stock counter overflow"))?;
        if self.status == ProductStatus::OutOfStock {
            self.status = ProductStatus::Available;
        }
        self.updated_at = now;
        Ok(())
    }
}

/// Incoming payload for creating a product, before a code is assigned.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<CategoryId>,
    pub price_cents: i64,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub photo: Option<String>,
}

impl ProductDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("product name must not be empty"));
        }
        if self.name.len() > 200 {
            return Err(DomainError::validation("product name exceeds 200 characters"));
        }
        if self.price_cents <= 0 {
            return Err(DomainError::validation("price must be greater than zero"));
        }
        Ok(())
    }

    pub fn into_product(self, code: ProductId, now: DateTime<Utc>) -> Result<Product, DomainError> {
        self.validate()?;
        let status = if self.stock == 0 {
            ProductStatus::OutOfStock
        } else {
            ProductStatus::Available
        };
        Ok(Product {
            code,
            name: self.name.trim().to_string(),
            description: self.description,
            category: self.category,
            price_cents: self.price_cents,
            stock: self.stock,
            photo: self.photo,
            status,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<Option<CategoryId>>,
    pub price_cents: Option<i64>,
    pub stock: Option<u32>,
    pub photo: Option<Option<String>>,
    pub status: Option<ProductStatus>,
}

impl ProductUpdate {
    /// Applies the update in place. Validation happens before any
    /// field is mutated so a failed update leaves the product intact.
    pub fn apply(&self, product: &mut Product, now: DateTime<Utc>) -> Result<(), DomainError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("product name must not be empty"));
            }
            if name.len() > 200 {
                return Err(DomainError::validation("product name exceeds 200 characters"));
            }
        }
        if let Some(price) = self.price_cents {
            if price <= 0 {
                return Err(DomainError::validation("price must be greater than zero"));
            }
        }

        if let Some(name) = &self.name {
            product.name = name.trim().to_string();
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(category) = &self.category {
            product.category = *category;
        }
        if let Some(price) = self.price_cents {
            product.price_cents = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(photo) = &self.photo {
            product.photo = photo.clone();
        }
        if let Some(status) = self.status {
            product.status = status;
        }
        product.status = product.effective_status();
        product.updated_at = now;
        Ok(())
    }
}
