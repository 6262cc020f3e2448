use chrono::{DateTime, Utc};
use comercio_core::{DomainError, OrderId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "Efectivo")]
    Cash,
    #[serde(rename = "Tarjeta")]
    Card,
    #[serde(rename = "Transferencia")]
    Transfer,
}

/// Payment recorded against an order. Partial payments are allowed;
/// the repository tracks the running balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub order: OrderId,
    pub amount_cents: i64,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        order: OrderId,
        amount_cents: i64,
        method: PaymentMethod,
        reference: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if amount_cents <= 0 {
            return Err(DomainError::validation(
                "payment amount must be greater than zero",
            ));
        }
        Ok(Self {
            order,
            amount_cents,
            method,
            reference,
            received_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_amount_is_rejected() {
        assert!(Payment::new(OrderId::new(1), 0, PaymentMethod::Cash, None, Utc::now()).is_err());
        assert!(Payment::new(OrderId::new(1), -5, PaymentMethod::Card, None, Utc::now()).is_err());
    }

    #[test]
    fn method_labels_serialize_in_spanish() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Transfer).unwrap(),
            "\"Transferencia\""
        );
    }
}
