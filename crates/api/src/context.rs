use comercio_auth::Role;
use comercio_core::{TenantId, UserId};

/// Tenant scope for a request, taken from the validated token.
///
/// This is immutable and must be present for all tenant-scoped routes;
/// the path tenant is checked against it on every request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TenantScope {
    tenant_id: TenantId,
}

impl TenantScope {
    pub fn new(tenant_id: TenantId) -> Self {
        Self { tenant_id }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

/// Principal context for a request (authenticated identity + role label).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user_id: UserId,
    role: Option<Role>,
}

impl PrincipalContext {
    pub fn new(user_id: UserId, role: Option<Role>) -> Self {
        Self { user_id, role }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn role(&self) -> Option<&Role> {
        self.role.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.role.as_ref().is_some_and(Role::satisfies_admin)
    }

    pub fn is_super_admin(&self) -> bool {
        self.role.as_ref().is_some_and(Role::is_super_admin)
    }
}
