//! Strongly-typed identifiers used across the domain.
//!
//! Every table in the commercial schema is keyed by a stable integer code
//! (`EmpresaCodigo`, `ProductoCodigo`, ...). Codes are assigned by the
//! storage layer; the newtypes here only guarantee the codes cannot be mixed
//! up across resources.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Common surface of the integer code newtypes, for generic code over
/// identifiers (sequence allocators, path extraction helpers).
pub trait Code: Copy + Send + Sync + 'static {
    fn new(code: i64) -> Self;
    fn value(&self) -> i64;
}

macro_rules! impl_code_newtype {
    ($t:ident, $name:literal) => {
        /// Stable integer code identifying one record within its table.
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(i64);

        impl $t {
            pub const fn new(code: i64) -> Self {
                Self(code)
            }

            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl Code for $t {
            fn new(code: i64) -> Self {
                Self(code)
            }

            fn value(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let code = i64::from_str(s)
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(code))
            }
        }
    };
}

impl_code_newtype!(TenantId, "TenantId");
impl_code_newtype!(UserId, "UserId");
impl_code_newtype!(ProductId, "ProductId");
impl_code_newtype!(CategoryId, "CategoryId");
impl_code_newtype!(CustomerId, "CustomerId");
impl_code_newtype!(OrderId, "OrderId");
impl_code_newtype!(EmployeeId, "EmployeeId");
impl_code_newtype!(PositionId, "PositionId");
