use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role label carried on an employee profile.
///
/// Roles are opaque strings compared by equality; there is no permission
/// lattice. The only ordering the guards care about is that a super
/// administrator also satisfies administrator-gated checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const EMPLOYEE: &'static str = "Empleado";
    pub const ADMIN: &'static str = "Administrador";
    pub const SUPER_ADMIN: &'static str = "SuperAdministrador";

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn employee() -> Self {
        Self::new(Self::EMPLOYEE)
    }

    pub fn admin() -> Self {
        Self::new(Self::ADMIN)
    }

    pub fn super_admin() -> Self {
        Self::new(Self::SUPER_ADMIN)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_super_admin(&self) -> bool {
        self.as_str() == Self::SUPER_ADMIN
    }

    /// True for administrator-gated routes: "Administrador" or higher.
    pub fn satisfies_admin(&self) -> bool {
        self.as_str() == Self::ADMIN || self.is_super_admin()
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
