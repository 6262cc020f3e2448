use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use comercio_core::{DomainError, ProductId, TenantId};
use comercio_products::{Product, ProductDraft, ProductHistoryEntry, ProductUpdate};

use crate::sequence::CodeSequence;
use crate::tenant_store::TenantStore;

type ProductStore = Arc<dyn TenantStore<ProductId, Product>>;
type HistoryStore = Arc<dyn TenantStore<ProductId, Vec<ProductHistoryEntry>>>;

/// Catalog repository. Every mutation appends to the product's history
/// so the inventory views can show the full audit trail.
///
/// Stock writes go through the catalog lock: order placement, stock
/// release and the inventory adjustments all read-modify-write product
/// rows, and interleaving them loses updates.
pub struct ProductRepository {
    store: ProductStore,
    history: HistoryStore,
    codes: CodeSequence,
    catalog: Mutex<()>,
}

impl ProductRepository {
    pub fn new(store: ProductStore, history: HistoryStore) -> Self {
        Self {
            store,
            history,
            codes: CodeSequence::default(),
            catalog: Mutex::new(()),
        }
    }

    /// Serializes stock mutations across the catalog. Order placement
    /// holds this guard while it withdraws stock for every line.
    pub(crate) fn lock_catalog(&self) -> Result<MutexGuard<'_, ()>, DomainError> {
        self.catalog
            .lock()
            .map_err(|_| DomainError::invariant("catalog lock poisoned"))
    }

    pub fn create(&self, tenant: TenantId, draft: ProductDraft) -> Result<Product, DomainError> {
        let code: ProductId = self.codes.allocate();
        let product = draft.into_product(code, Utc::now())?;
        self.store.upsert(tenant, code, product.clone());
        self.append_history(
            tenant,
            code,
            ProductHistoryEntry::creation(code, product.stock, product.created_at),
        );
        tracing::debug!(tenant_id = %tenant, product = %code, "product created");
        Ok(product)
    }

    pub fn get(&self, tenant: TenantId, code: ProductId) -> Result<Product, DomainError> {
        self.store
            .get(tenant, &code)
            .ok_or_else(|| DomainError::not_found(format!("product {code}")))
    }

    pub fn list(&self, tenant: TenantId) -> Vec<Product> {
        let mut products = self.store.list(tenant);
        products.sort_by_key(|p| p.code);
        products
    }

    pub fn update(
        &self,
        tenant: TenantId,
        code: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, DomainError> {
        let before = self.get(tenant, code)?;
        let mut product = before.clone();
        update.apply(&mut product, Utc::now())?;
        self.store.upsert(tenant, code, product.clone());
        for entry in diff_fields(&before, &product) {
            self.append_history(tenant, code, entry);
        }
        Ok(product)
    }

    pub fn delete(&self, tenant: TenantId, code: ProductId) -> Result<(), DomainError> {
        self.store
            .remove(tenant, &code)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found(format!("product {code}")))
    }

    /// Signed stock adjustment from the inventory endpoints. Positive
    /// deltas restock, negative deltas withdraw.
    pub fn adjust_stock(
        &self,
        tenant: TenantId,
        code: ProductId,
        delta: i64,
    ) -> Result<Product, DomainError> {
        let _guard = self.lock_catalog()?;
        self.apply_stock_delta(tenant, code, delta)
    }

    /// Sets the stock to an absolute value, resolving the delta under
    /// the catalog lock so a concurrent placement cannot slip between
    /// the read and the write.
    pub fn set_stock(
        &self,
        tenant: TenantId,
        code: ProductId,
        target: u32,
    ) -> Result<Product, DomainError> {
        let _guard = self.lock_catalog()?;
        let current = self.get(tenant, code)?;
        let delta = i64::from(target) - i64::from(current.stock);
        if delta == 0 {
            return Ok(current);
        }
        self.apply_stock_delta(tenant, code, delta)
    }

    /// Caller must hold the catalog lock.
    fn apply_stock_delta(
        &self,
        tenant: TenantId,
        code: ProductId,
        delta: i64,
    ) -> Result<Product, DomainError> {
        let mut product = self.get(tenant, code)?;
        let stock_before = product.stock;
        let now = Utc::now();
        if delta >= 0 {
            let quantity = u32::try_from(delta)
                .map_err(|_| DomainError::validation("stock adjustment out of range"))?;
            product.replenish_stock(quantity, now)?;
        } else {
            let quantity = u32::try_from(-delta)
                .map_err(|_| DomainError::validation("stock adjustment out of range"))?;
            product.withdraw_stock(quantity, now)?;
        }
        self.store.upsert(tenant, code, product.clone());
        self.append_history(
            tenant,
            code,
            ProductHistoryEntry::field_change(
                code,
                "stock",
                Some(stock_before.to_string()),
                Some(product.stock.to_string()),
                now,
            ),
        );
        Ok(product)
    }

    pub fn history(
        &self,
        tenant: TenantId,
        code: ProductId,
    ) -> Result<Vec<ProductHistoryEntry>, DomainError> {
        // A product must exist (or have existed) to have history.
        if self.store.get(tenant, &code).is_none() && self.history.get(tenant, &code).is_none() {
            return Err(DomainError::not_found(format!("product {code}")));
        }
        Ok(self.history.get(tenant, &code).unwrap_or_default())
    }

    /// Persists a product whose stock was mutated elsewhere (order
    /// placement, stock release) and records the change. Caller must
    /// hold the catalog lock.
    pub(crate) fn save_with_stock_change(
        &self,
        tenant: TenantId,
        stock_before: u32,
        product: Product,
    ) {
        self.append_history(
            tenant,
            product.code,
            ProductHistoryEntry::field_change(
                product.code,
                "stock",
                Some(stock_before.to_string()),
                Some(product.stock.to_string()),
                Utc::now(),
            ),
        );
        self.store.upsert(tenant, product.code, product);
    }

    /// Tenant-wide audit trail for the inventory history view, newest
    /// entries last.
    pub fn full_history(&self, tenant: TenantId) -> Vec<ProductHistoryEntry> {
        let mut entries: Vec<ProductHistoryEntry> =
            self.history.list(tenant).into_iter().flatten().collect();
        entries.sort_by_key(|e| e.recorded_at);
        entries
    }

    fn append_history(&self, tenant: TenantId, code: ProductId, entry: ProductHistoryEntry) {
        let mut entries = self.history.get(tenant, &code).unwrap_or_default();
        entries.push(entry);
        self.history.upsert(tenant, code, entries);
    }
}

/// One history entry per field whose value changed between the two
/// snapshots.
fn diff_fields(before: &Product, after: &Product) -> Vec<ProductHistoryEntry> {
    fn changed(
        out: &mut Vec<ProductHistoryEntry>,
        code: ProductId,
        field: &str,
        old: Option<String>,
        new: Option<String>,
        at: chrono::DateTime<Utc>,
    ) {
        if old != new {
            out.push(ProductHistoryEntry::field_change(code, field, old, new, at));
        }
    }

    let mut entries = Vec::new();
    let at = after.updated_at;
    let code = after.code;
    changed(
        &mut entries,
        code,
        "name",
        Some(before.name.clone()),
        Some(after.name.clone()),
        at,
    );
    changed(
        &mut entries,
        code,
        "description",
        before.description.clone(),
        after.description.clone(),
        at,
    );
    changed(
        &mut entries,
        code,
        "category",
        before.category.map(|c| c.to_string()),
        after.category.map(|c| c.to_string()),
        at,
    );
    changed(
        &mut entries,
        code,
        "price_cents",
        Some(before.price_cents.to_string()),
        Some(after.price_cents.to_string()),
        at,
    );
    changed(
        &mut entries,
        code,
        "stock",
        Some(before.stock.to_string()),
        Some(after.stock.to_string()),
        at,
    );
    changed(
        &mut entries,
        code,
        "photo",
        before.photo.clone(),
        after.photo.clone(),
        at,
    );
    if before.status != after.status {
        entries.push(ProductHistoryEntry::field_change(
            code,
            "status",
            serde_json::to_value(before.status)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string)),
            serde_json::to_value(after.status)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string)),
            at,
        ));
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenant_store::InMemoryTenantStore;
    use comercio_products::{HistoryKind, ProductStatus};

    fn repo() -> ProductRepository {
        ProductRepository::new(
            Arc::new(InMemoryTenantStore::new()),
            Arc::new(InMemoryTenantStore::new()),
        )
    }

    fn draft(name: &str, stock: u32) -> ProductDraft {
        ProductDraft {
            name: name.into(),
            description: None,
            category: None,
            price_cents: 990,
            stock,
            photo: None,
        }
    }

    const TENANT: TenantId = TenantId::new(1);
    const OTHER: TenantId = TenantId::new(2);

    #[test]
    fn created_product_is_listed_only_for_its_tenant() {
        let repo = repo();
        let product = repo.create(TENANT, draft("Cafe", 5)).unwrap();
        assert_eq!(repo.list(TENANT), vec![product]);
        assert!(repo.list(OTHER).is_empty());
    }

    #[test]
    fn creation_is_recorded_in_history() {
        let repo = repo();
        let product = repo.create(TENANT, draft("Cafe", 5)).unwrap();
        let history = repo.history(TENANT, product.code).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, HistoryKind::Creation);
        assert_eq!(history[0].new_value.as_deref(), Some("5"));
    }

    #[test]
    fn adjust_stock_appends_a_stock_entry() {
        let repo = repo();
        let product = repo.create(TENANT, draft("Cafe", 5)).unwrap();
        let adjusted = repo.adjust_stock(TENANT, product.code, -3).unwrap();
        assert_eq!(adjusted.stock, 2);

        let last = repo.history(TENANT, product.code).unwrap().pop().unwrap();
        assert!(last.is_stock_change());
        assert_eq!(last.old_value.as_deref(), Some("5"));
        assert_eq!(last.new_value.as_deref(), Some("2"));
    }

    #[test]
    fn update_appends_one_entry_per_changed_field() {
        let repo = repo();
        let product = repo.create(TENANT, draft("Cafe", 5)).unwrap();
        repo.update(
            TENANT,
            product.code,
            &comercio_products::ProductUpdate {
                name: Some("Cafe tostado".into()),
                price_cents: Some(1500),
                ..Default::default()
            },
        )
        .unwrap();

        let history = repo.history(TENANT, product.code).unwrap();
        let fields: Vec<&str> = history[1..].iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "price_cents"]);
    }

    #[test]
    fn set_stock_records_the_jump_and_ignores_no_ops() {
        let repo = repo();
        let product = repo.create(TENANT, draft("Cafe", 5)).unwrap();

        let updated = repo.set_stock(TENANT, product.code, 12).unwrap();
        assert_eq!(updated.stock, 12);
        let last = repo.history(TENANT, product.code).unwrap().pop().unwrap();
        assert_eq!(last.old_value.as_deref(), Some("5"));
        assert_eq!(last.new_value.as_deref(), Some("12"));

        // Setting the current value changes nothing and leaves no trace.
        repo.set_stock(TENANT, product.code, 12).unwrap();
        assert_eq!(repo.history(TENANT, product.code).unwrap().len(), 2);
    }

    #[test]
    fn concurrent_adjustments_do_not_lose_updates() {
        let repo = repo();
        let workers: u32 = 16;
        let product = repo.create(TENANT, draft("Cafe", workers)).unwrap();

        std::thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| repo.adjust_stock(TENANT, product.code, -1).unwrap());
            }
        });

        assert_eq!(repo.get(TENANT, product.code).unwrap().stock, 0);
        // One creation entry plus one per withdrawal.
        let history = repo.history(TENANT, product.code).unwrap();
        assert_eq!(history.len(), 1 + workers as usize);
    }

    #[test]
    fn withdrawing_to_zero_marks_product_agotado() {
        let repo = repo();
        let product = repo.create(TENANT, draft("Cafe", 2)).unwrap();
        let adjusted = repo.adjust_stock(TENANT, product.code, -2).unwrap();
        assert_eq!(adjusted.status, ProductStatus::OutOfStock);
    }

    #[test]
    fn history_of_deleted_product_remains_readable() {
        let repo = repo();
        let product = repo.create(TENANT, draft("Cafe", 2)).unwrap();
        repo.delete(TENANT, product.code).unwrap();
        assert!(repo.get(TENANT, product.code).is_err());
        assert_eq!(repo.history(TENANT, product.code).unwrap().len(), 1);
    }

    #[test]
    fn unknown_product_history_is_not_found() {
        let repo = repo();
        assert!(matches!(
            repo.history(TENANT, ProductId::new(404)).unwrap_err(),
            DomainError::NotFound(_)
        ));
    }
}
