use serde::{Deserialize, Serialize};

use comercio_companies::Company;
use comercio_core::{EmployeeId, TenantId, UserId};

use crate::Role;

/// The authenticated user record as the identity boundary returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub code: UserId,
    pub name: String,
    pub tenant_code: TenantId,
    pub employee_code: Option<EmployeeId>,
}

/// Employee profile bound to a session, carrying the role label the guards
/// check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    pub code: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub role: Option<Role>,
}

/// Client-held snapshot of a logged-in principal.
///
/// Embeds the full company record so tenant-scoped views can render without a
/// second lookup. Invariant: `user.tenant_code == company.code`; the
/// consistency guard treats any divergence from the selected tenant context as
/// corruption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub user: SessionUser,
    pub company: Company,
    pub employee: Option<EmployeeProfile>,
    pub token: String,
}

impl UserSession {
    pub fn tenant_code(&self) -> TenantId {
        self.user.tenant_code
    }

    pub fn role(&self) -> Option<&Role> {
        self.employee.as_ref().and_then(|e| e.role.as_ref())
    }

    pub fn is_admin(&self) -> bool {
        self.role().is_some_and(Role::satisfies_admin)
    }

    pub fn is_super_admin(&self) -> bool {
        self.role().is_some_and(Role::is_super_admin)
    }
}
