use chrono::{DateTime, Utc};
use comercio_core::{DomainError, EmployeeId, PositionId, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmployeeStatus {
    #[serde(rename = "Activo")]
    Active,
    #[serde(rename = "Inactivo")]
    Inactive,
}

/// Employee record scoped to one company. `user` links the employee to
/// a login account once one exists; access role comes from the position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub code: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub position: PositionId,
    pub user: Option<UserId>,
    pub status: EmployeeStatus,
    pub hired_at: DateTime<Utc>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }

    pub fn deactivate(&mut self) {
        self.status = EmployeeStatus::Inactive;
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmployeeDraft {
    pub first_name: String,
    pub last_name: String,
    pub position: PositionId,
    #[serde(default)]
    pub user: Option<UserId>,
}

impl EmployeeDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.first_name.trim().is_empty() {
            return Err(DomainError::validation("first name must not be empty"));
        }
        if self.last_name.trim().is_empty() {
            return Err(DomainError::validation("last name must not be empty"));
        }
        Ok(())
    }

    pub fn into_employee(
        self,
        code: EmployeeId,
        now: DateTime<Utc>,
    ) -> Result<Employee, DomainError> {
        self.validate()?;
        Ok(Employee {
            code,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            position: self.position,
            user: self.user,
            status: EmployeeStatus::Active,
            hired_at: now,
        })
    }
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub position: Option<PositionId>,
    pub status: Option<EmployeeStatus>,
}

impl EmployeeUpdate {
    pub fn apply(&self, employee: &mut Employee) -> Result<(), DomainError> {
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

        if let Some(first) = &self.first_name {
            employee.first_name = first.trim().to_string();
        }
        if let Some(last) = &self.last_name {
            employee.last_name = last.trim().to_string();
        }
        if let Some(position) = self.position {
            employee.position = position;
        }
        if let Some(status) = self.status {
            employee.status = status;
        }
        Ok(())
    }
}
