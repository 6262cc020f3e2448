//! Postgres-backed tenant store.
//!
//! Records are stored one row per (tenant_id, code) with the entity
//! serialized into a JSONB column, so the same table layout serves any
//! of the repositories. Every query carries `tenant_id` in the WHERE
//! clause; cross-tenant access is impossible by construction.

use std::marker::PhantomData;
use std::sync::Arc;

use comercio_core::id::Code;
use comercio_core::TenantId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{PgPool, Row};

use crate::tenant_store::TenantStore;

/// Runs a query future to completion from the synchronous store
/// surface. The callers sit inside axum handlers, so the current worker
/// must be moved off the async executor first: `block_in_place` +
/// `Handle::block_on`. Requires the multi-thread runtime flavor.
/// Returns `None` outside a tokio runtime.
fn run_query<F>(fut: F) -> Option<F::Output>
where
    F: std::future::Future,
{
    let handle = tokio::runtime::Handle::try_current().ok()?;
    Some(tokio::task::block_in_place(|| handle.block_on(fut)))
}

/// Postgres-backed tenant store over a JSONB record table:
///
/// ```sql
/// CREATE TABLE tenant_records (
///     tenant_id   BIGINT      NOT NULL,
///     record_type TEXT        NOT NULL,
///     code        BIGINT      NOT NULL,
///     data        JSONB       NOT NULL,
///     updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (tenant_id, record_type, code)
/// );
/// ```
pub struct PostgresTenantStore<K, V> {
    pool: Arc<PgPool>,
    record_type: &'static str,
    _key: PhantomData<K>,
    _value: PhantomData<V>,
}

impl<K, V> PostgresTenantStore<K, V> {
    /// `record_type` partitions the shared table ("product", "order", ...).
    pub fn new(pool: PgPool, record_type: &'static str) -> Self {
        Self {
            pool: Arc::new(pool),
            record_type,
            _key: PhantomData,
            _value: PhantomData,
        }
    }
}

impl<K, V> TenantStore<K, V> for PostgresTenantStore<K, V>
where
    K: Code + Clone + Send + Sync + 'static,
    V: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    fn get(&self, tenant_id: TenantId, key: &K) -> Option<V> {
        let pool = self.pool.clone();
        let record_type = self.record_type;
        let code = key.value();

        run_query(async move {
            let row = sqlx::query(
                "SELECT data FROM tenant_records \
                 WHERE tenant_id = $1 AND record_type = $2 AND code = $3",
            )
            .bind(tenant_id.as_i64())
            .bind(record_type)
            .bind(code)
            .fetch_optional(&*pool)
            .await
            .ok()??;

            let data: serde_json::Value = row.try_get("data").ok()?;
            serde_json::from_value(data).ok()
        })?
    }

    fn upsert(&self, tenant_id: TenantId, key: K, value: V) {
        let data = match serde_json::to_value(&value) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "tenant record serialization failed");
                return;
            }
        };
        let pool = self.pool.clone();
        let record_type = self.record_type;
        let code = key.value();

        let _ = run_query(async move {
            let _ = sqlx::query(
                "INSERT INTO tenant_records (tenant_id, record_type, code, data) \
                 VALUES ($1, $2, $3, $4) \
                 ON CONFLICT (tenant_id, record_type, code) \
                 DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()",
            )
            .bind(tenant_id.as_i64())
            .bind(record_type)
            .bind(code)
            .bind(data)
            .execute(&*pool)
            .await;
        });
    }

    fn remove(&self, tenant_id: TenantId, key: &K) -> Option<V> {
        let previous = self.get(tenant_id, key);
        let pool = self.pool.clone();
        let record_type = self.record_type;
        let code = key.value();

        run_query(async move {
            let _ = sqlx::query(
                "DELETE FROM tenant_records \
                 WHERE tenant_id = $1 AND record_type = $2 AND code = $3",
            )
            .bind(tenant_id.as_i64())
            .bind(record_type)
            .bind(code)
            .execute(&*pool)
            .await;
        })?;
        previous
    }

    fn list(&self, tenant_id: TenantId) -> Vec<V> {
        let pool = self.pool.clone();
        let record_type = self.record_type;

        run_query(async move {
            let rows = match sqlx::query(
                "SELECT data FROM tenant_records \
                 WHERE tenant_id = $1 AND record_type = $2 ORDER BY code",
            )
            .bind(tenant_id.as_i64())
            .bind(record_type)
            .fetch_all(&*pool)
            .await
            {
                Ok(rows) => rows,
                Err(_) => return vec![],
            };

            rows.into_iter()
                .filter_map(|r| {
                    let data: serde_json::Value = r.try_get("data").ok()?;
                    serde_json::from_value(data).ok()
                })
                .collect()
        })
        .unwrap_or_default()
    }

    fn clear_tenant(&self, tenant_id: TenantId) {
        let pool = self.pool.clone();
        let record_type = self.record_type;

        let _ = run_query(async move {
            let _ = sqlx::query(
                "DELETE FROM tenant_records WHERE tenant_id = $1 AND record_type = $2",
            )
            .bind(tenant_id.as_i64())
            .bind(record_type)
            .execute(&*pool)
            .await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comercio_core::ProductId;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Record {
        n: i32,
    }

    fn unreachable_store() -> PostgresTenantStore<ProductId, Record> {
        // Lazy pool: no I/O until a query runs; acquisition fails fast
        // instead of waiting out the default timeout.
        let pool = sqlx::postgres::PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(100))
            .connect_lazy("postgres://127.0.0.1:1/nowhere")
            .unwrap();
        PostgresTenantStore::new(pool, "record")
    }

    // The store is called from inside async handlers; driving a query
    // there must degrade to a miss, never take down the runtime.
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn queries_inside_the_runtime_do_not_panic() {
        let store = unreachable_store();
        let tenant = TenantId::new(1);
        let key = ProductId::new(7);

        assert_eq!(store.get(tenant, &key), None);
        store.upsert(tenant, key, Record { n: 1 });
        assert_eq!(store.remove(tenant, &key), None);
        assert!(store.list(tenant).is_empty());
        store.clear_tenant(tenant);
    }
}
