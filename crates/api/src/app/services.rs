//! Service wiring: repositories over tenant stores plus the token
//! codec. In-memory stores by default; `USE_PERSISTENT_STORES=true`
//! switches the product store to Postgres when the `postgres` feature
//! is enabled.

use std::sync::Arc;

use chrono::{Duration, Utc};

use comercio_auth::{EmployeeProfile, Hs256Jwt, JwtClaims, SessionUser, UserSession};
use comercio_core::{DomainError, ProductId, TenantId};
use comercio_infra::repositories::{
    CompanyDirectory, CustomerRepository, EmployeeRepository, MembershipRegistry, OrderRepository,
    ProductRepository, UserDirectory,
};
use comercio_infra::{InMemoryTenantStore, TenantStore};
use comercio_products::Product;

/// Hours a minted session token stays valid.
const TOKEN_TTL_HOURS: i64 = 8;

pub struct AppServices {
    pub jwt: Arc<Hs256Jwt>,
    pub companies: CompanyDirectory,
    pub users: UserDirectory,
    pub memberships: MembershipRegistry,
    pub products: ProductRepository,
    pub customers: CustomerRepository,
    pub orders: OrderRepository,
    pub employees: EmployeeRepository,
}

pub async fn build_services(jwt: Arc<Hs256Jwt>) -> AppServices {
    let use_persistent = std::env::var("USE_PERSISTENT_STORES")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    let product_store = product_store(use_persistent).await;

    AppServices {
        jwt,
        companies: CompanyDirectory::new(),
        users: UserDirectory::new(),
        memberships: MembershipRegistry::new(Arc::new(InMemoryTenantStore::new())),
        products: ProductRepository::new(product_store, Arc::new(InMemoryTenantStore::new())),
        customers: CustomerRepository::new(Arc::new(InMemoryTenantStore::new())),
        orders: OrderRepository::new(
            Arc::new(InMemoryTenantStore::new()),
            Arc::new(InMemoryTenantStore::new()),
        ),
        employees: EmployeeRepository::new(
            Arc::new(InMemoryTenantStore::new()),
            Arc::new(InMemoryTenantStore::new()),
        ),
    }
}

#[cfg(feature = "postgres")]
async fn product_store(use_persistent: bool) -> Arc<dyn TenantStore<ProductId, Product>> {
    if !use_persistent {
        return Arc::new(InMemoryTenantStore::new());
    }
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");
    let pool = sqlx::PgPool::connect(&database_url)
        .await
        .expect("failed to connect to Postgres");
    Arc::new(comercio_infra::postgres::PostgresTenantStore::new(pool, "product"))
}

#[cfg(not(feature = "postgres"))]
async fn product_store(use_persistent: bool) -> Arc<dyn TenantStore<ProductId, Product>> {
    if use_persistent {
        tracing::warn!(
            "USE_PERSISTENT_STORES=true but postgres feature not enabled, falling back to in-memory"
        );
    }
    Arc::new(InMemoryTenantStore::new())
}

impl AppServices {
    /// Builds the session snapshot returned by the auth endpoints: the
    /// caller's verified external uid plus the company they selected.
    pub fn session_for(&self, uid: &str, tenant: TenantId) -> Result<UserSession, DomainError> {
        let user = self
            .users
            .find_by_uid(uid)
            .ok_or_else(|| DomainError::not_found(format!("user with uid {uid}")))?;
        let membership = self.memberships.verify(user.code, tenant)?;
        let company = self.companies.get(tenant)?;

        let employee = membership.employee.and_then(|code| {
            self.employees.get(tenant, code).ok().map(|e| EmployeeProfile {
                code: e.code,
                first_name: e.first_name,
                last_name: e.last_name,
                role: Some(membership.role.clone()),
            })
        });

        let now = Utc::now();
        let claims = JwtClaims {
            sub: user.code,
            tenant_id: tenant,
            role: Some(membership.role),
            issued_at: now,
            expires_at: now + Duration::hours(TOKEN_TTL_HOURS),
        };
        let token = self
            .jwt
            .encode(&claims)
            .map_err(|e| DomainError::invariant(format!("token encoding failed: {e}")))?;

        Ok(UserSession {
            user: SessionUser {
                code: user.code,
                name: user.name,
                tenant_code: tenant,
                employee_code: membership.employee,
            },
            company,
            employee,
            token,
        })
    }
}
