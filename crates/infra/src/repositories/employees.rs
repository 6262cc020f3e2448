use std::sync::Arc;

use chrono::Utc;
use comercio_core::{DomainError, EmployeeId, PositionId, TenantId};
use comercio_employees::{Employee, EmployeeDraft, EmployeeUpdate, Position, PositionDraft};

use crate::sequence::CodeSequence;
use crate::tenant_store::TenantStore;

type EmployeeStore = Arc<dyn TenantStore<EmployeeId, Employee>>;
type PositionStore = Arc<dyn TenantStore<PositionId, Position>>;

/// Employees and the positions that grant their access role, per tenant.
pub struct EmployeeRepository {
    employees: EmployeeStore,
    positions: PositionStore,
    employee_codes: CodeSequence,
    position_codes: CodeSequence,
}

impl EmployeeRepository {
    pub fn new(employees: EmployeeStore, positions: PositionStore) -> Self {
        Self {
            employees,
            positions,
            employee_codes: CodeSequence::default(),
            position_codes: CodeSequence::default(),
        }
    }

    pub fn create_position(
        &self,
        tenant: TenantId,
        draft: PositionDraft,
    ) -> Result<Position, DomainError> {
        let code: PositionId = self.position_codes.allocate();
        let position = draft.into_position(code)?;
        self.positions.upsert(tenant, code, position.clone());
        Ok(position)
    }

    pub fn get_position(&self, tenant: TenantId, code: PositionId) -> Result<Position, DomainError> {
        self.positions
            .get(tenant, &code)
            .ok_or_else(|| DomainError::not_found(format!("position {code}")))
    }

    pub fn list_positions(&self, tenant: TenantId) -> Vec<Position> {
        let mut positions = self.positions.list(tenant);
        positions.sort_by_key(|p| p.code);
        positions
    }

    pub fn create(&self, tenant: TenantId, draft: EmployeeDraft) -> Result<Employee, DomainError> {
        // The position must exist in this tenant before anyone holds it.
        self.get_position(tenant, draft.position)?;
        let code: EmployeeId = self.employee_codes.allocate();
        let employee = draft.into_employee(code, Utc::now())?;
        self.employees.upsert(tenant, code, employee.clone());
        Ok(employee)
    }

    pub fn get(&self, tenant: TenantId, code: EmployeeId) -> Result<Employee, DomainError> {
        self.employees
            .get(tenant, &code)
            .ok_or_else(|| DomainError::not_found(format!("employee {code}")))
    }

    pub fn list(&self, tenant: TenantId) -> Vec<Employee> {
        let mut employees = self.employees.list(tenant);
        employees.sort_by_key(|e| e.code);
        employees
    }

    pub fn update(
        &self,
        tenant: TenantId,
        code: EmployeeId,
        update: &EmployeeUpdate,
    ) -> Result<Employee, DomainError> {
        if let Some(position) = update.position {
            self.get_position(tenant, position)?;
        }
        let mut employee = self.get(tenant, code)?;
        update.apply(&mut employee)?;
        self.employees.upsert(tenant, code, employee.clone());
        Ok(employee)
    }

    /// Deactivation instead of deletion: the employee stays on record.
    pub fn deactivate(&self, tenant: TenantId, code: EmployeeId) -> Result<Employee, DomainError> {
        let mut employee = self.get(tenant, code)?;
        employee.deactivate();
        self.employees.upsert(tenant, code, employee.clone());
        Ok(employee)
    }

    /// The role an employee holds, resolved through their position.
    pub fn role_of(&self, tenant: TenantId, code: EmployeeId) -> Result<comercio_auth::Role, DomainError> {
        let employee = self.get(tenant, code)?;
        Ok(self.get_position(tenant, employee.position)?.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenant_store::InMemoryTenantStore;
    use comercio_auth::Role;
    use comercio_employees::EmployeeStatus;

    const TENANT: TenantId = TenantId::new(1);

    fn repo() -> EmployeeRepository {
        EmployeeRepository::new(
            Arc::new(InMemoryTenantStore::new()),
            Arc::new(InMemoryTenantStore::new()),
        )
    }

    fn seeded_position(repo: &EmployeeRepository, role: Role) -> Position {
        repo.create_position(
            TENANT,
            PositionDraft {
                name: "Vendedor".into(),
                role,
            },
        )
        .unwrap()
    }

    #[test]
    fn employee_requires_existing_position() {
        let repo = repo();
        let err = repo
            .create(
                TENANT,
                EmployeeDraft {
                    first_name: "Carlos".into(),
                    last_name: "Vera".into(),
                    position: PositionId::new(404),
                    user: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn role_resolves_through_position() {
        let repo = repo();
        let position = seeded_position(&repo, Role::admin());
        let employee = repo
            .create(
                TENANT,
                EmployeeDraft {
                    first_name: "Carlos".into(),
                    last_name: "Vera".into(),
                    position: position.code,
                    user: None,
                },
            )
            .unwrap();
        assert_eq!(repo.role_of(TENANT, employee.code).unwrap(), Role::admin());
    }

    #[test]
    fn deactivate_keeps_the_record() {
        let repo = repo();
        let position = seeded_position(&repo, Role::employee());
        let employee = repo
            .create(
                TENANT,
                EmployeeDraft {
                    first_name: "Ana".into(),
                    last_name: "Mora".into(),
                    position: position.code,
                    user: None,
                },
            )
            .unwrap();
        let deactivated = repo.deactivate(TENANT, employee.code).unwrap();
        assert_eq!(deactivated.status, EmployeeStatus::Inactive);
        assert!(repo.get(TENANT, employee.code).is_ok());
    }
}
