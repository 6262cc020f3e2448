use chrono::{DateTime, Utc};
use comercio_core::{EmployeeId, ProductId};
use serde::{Deserialize, Serialize};

/// What kind of change a history entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryKind {
    #[serde(rename = "Creacion")]
    Creation,
    #[serde(rename = "Actualizacion")]
    Update,
}

/// One field-level entry of a product's audit trail. Every product
/// mutation appends one entry per changed field; creation appends a
/// single entry with no old value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductHistoryEntry {
    pub product: ProductId,
    pub kind: HistoryKind,
    pub field: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub employee: Option<EmployeeId>,
    pub recorded_at: DateTime<Utc>,
}

impl ProductHistoryEntry {
    pub fn creation(product: ProductId, stock: u32, now: DateTime<Utc>) -> Self {
        Self {
            product,
            kind: HistoryKind::Creation,
            field: "stock".to_string(),
            old_value: None,
            new_value: Some(stock.to_string()),
            employee: None,
            recorded_at: now,
        }
    }

    pub fn field_change(
        product: ProductId,
        field: impl Into<String>,
        old_value: Option<String>,
        new_value: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            product,
            kind: HistoryKind::Update,
            field: field.into(),
            old_value,
            new_value,
            employee: None,
            recorded_at: now,
        }
    }

    pub fn by(mut self, employee: EmployeeId) -> Self {
        self.employee = Some(employee);
        self
    }

    pub fn is_stock_change(&self) -> bool {
        self.field == "stock"
    }
}
