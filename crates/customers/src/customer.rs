use chrono::{DateTime, Utc};
use comercio_core::{CustomerId, DomainError};
use serde::{Deserialize, Serialize};

/// Customer record scoped to one company. `identification` is the
/// national id (cedula), kept as a string to preserve leading zeros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub code: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub identification: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub registered_at: DateTime<Utc>,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

fn validate_identification(value: &str) -> Result<(), DomainError> {
    let digits = value.trim();
    if digits.is_empty() {
        return Err(DomainError::validation("identification must not be empty"));
    }
    if !(8..=13).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(DomainError::validation(
            "identification must be 8 to 13 digits",
        ));
    }
    Ok(())
}

fn validate_email(value: &str) -> Result<(), DomainError> {
    let at = value.find('@');
    match at {
        Some(pos) if pos > 0 && value[pos + 1..].contains('.') => Ok(()),
        _ => Err(DomainError::validation("email address is malformed")),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerDraft {
    pub first_name: String,
    pub last_name: String,
    pub identification: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl CustomerDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.first_name.trim().is_empty() {
            return Err(DomainError::validation("first name must not be empty"));
        }
        if self.last_name.trim().is_empty() {
            return Err(DomainError::validation("last name must not be empty"));
        }
        validate_identification(&self.identification)?;
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        Ok(())
    }

    pub fn into_customer(
        self,
        code: CustomerId,
        now: DateTime<Utc>,
    ) -> Result<Customer, DomainError> {
        self.validate()?;
        Ok(Customer {
            code,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            identification: self.identification.trim().to_string(),
            phone: self.phone,
            email: self.email,
            address: self.address,
            registered_at: now,
        })
    }
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub identification: Option<String>,
    pub phone: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub address: Option<Option<String>>,
}

impl CustomerUpdate {
    pub fn apply(&self, customer: &mut Customer) -> Result<(), DomainError> {
        if let Some(first) = &self.first_name {
            if first.trim().is_empty() {
                return Err(DomainError::validation("first name must not be empty"));
            }
        }
        if let Some(last) = &self.last_name {
            if last.trim().is_empty() {
                return Err(DomainError::validation("last name must not be empty"));
            }
        }
        if let Some(identification) = &self.identification {
            validate_identification(identification)?;
        }
        if let Some(Some(email)) = &self.email {
            validate_email(email)?;
        }

        if let Some(first) = &self.first_name {
            customer.first_name = first.trim().to_string();
        }
        if let Some(last) = &self.last_name {
            customer.last_name = last.trim().to_string();
        }
        if let Some(identification) = &self.identification {
            customer.identification = identification.trim().to_string();
        }
        if let Some(phone) = &self.phone {
            customer.phone = phone.clone();
        }
        if let Some(email) = &self.email {
            customer.email = email.clone();
        }
        if let Some(address) = &self.address {
            customer.address = address.clone();
        }
        Ok(())
    }
}
