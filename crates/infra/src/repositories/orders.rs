use std::sync::Arc;

use chrono::Utc;
use comercio_core::{CustomerId, DomainError, OrderId, TenantId};
use comercio_customers::CustomerSummary;
use comercio_orders::{Order, OrderDraft, OrderLine, OrderStatus, Payment};

use crate::repositories::products::ProductRepository;
use crate::sequence::CodeSequence;
use crate::tenant_store::TenantStore;

type OrderStore = Arc<dyn TenantStore<OrderId, Order>>;
type PaymentStore = Arc<dyn TenantStore<OrderId, Vec<Payment>>>;

/// Order repository. Placement and status changes touch the catalog
/// (stock withdrawal and release), so those flows run under the
/// catalog lock shared with the inventory adjustments.
pub struct OrderRepository {
    store: OrderStore,
    payments: PaymentStore,
    codes: CodeSequence,
}

impl OrderRepository {
    pub fn new(store: OrderStore, payments: PaymentStore) -> Self {
        Self {
            store,
            payments,
            codes: CodeSequence::default(),
        }
    }

    /// Places an order: prices every line from the catalog, withdraws
    /// stock and persists the order as Pendiente. Any failure leaves
    /// the catalog untouched.
    pub fn place(
        &self,
        tenant: TenantId,
        draft: OrderDraft,
        products: &ProductRepository,
    ) -> Result<Order, DomainError> {
        draft.validate()?;
        let _guard = products.lock_catalog()?;

        // First pass checks every line so nothing is withdrawn when a
        // later line would fail.
        let now = Utc::now();
        let mut updated = Vec::with_capacity(draft.lines.len());
        let mut priced = Vec::with_capacity(draft.lines.len());
        for line in &draft.lines {
            let mut product = products.get(tenant, line.product)?;
            let stock_before = product.stock;
            product.withdraw_stock(line.quantity, now)?;
            priced.push(OrderLine {
                product: line.product,
                quantity: line.quantity,
                unit_price_cents: product.price_cents,
            });
            updated.push((stock_before, product));
        }

        let code: OrderId = self.codes.allocate();
        let order = draft.into_order(code, priced, now)?;
        for (stock_before, product) in updated {
            products.save_with_stock_change(tenant, stock_before, product);
        }
        self.store.upsert(tenant, code, order.clone());
        tracing::info!(
            tenant_id = %tenant,
            order = %code,
            total_cents = order.total_cents,
            "order placed"
        );
        Ok(order)
    }

    pub fn get(&self, tenant: TenantId, code: OrderId) -> Result<Order, DomainError> {
        self.store
            .get(tenant, &code)
            .ok_or_else(|| DomainError::not_found(format!("order {code}")))
    }

    pub fn list(&self, tenant: TenantId) -> Vec<Order> {
        let mut orders = self.store.list(tenant);
        orders.sort_by_key(|o| o.code);
        orders
    }

    /// Moves an order through the status machine. Cancelling or
    /// returning hands the line quantities back to the catalog.
    pub fn set_status(
        &self,
        tenant: TenantId,
        code: OrderId,
        next: OrderStatus,
        products: &ProductRepository,
    ) -> Result<Order, DomainError> {
        let _guard = products.lock_catalog()?;
        let mut order = self.get(tenant, code)?;
        order.transition(next, Utc::now())?;

        if next.releases_stock() {
            for line in &order.lines {
                // The product may have been deleted since the order
                // was placed; released stock is dropped then.
                if let Ok(mut product) = products.get(tenant, line.product) {
                    let stock_before = product.stock;
                    if product.replenish_stock(line.quantity, order.updated_at).is_ok() {
                        products.save_with_stock_change(tenant, stock_before, product);
                    }
                }
            }
        }

        self.store.upsert(tenant, code, order.clone());
        tracing::info!(tenant_id = %tenant, order = %code, status = ?next, "order status changed");
        Ok(order)
    }

    pub fn record_payment(
        &self,
        tenant: TenantId,
        payment: Payment,
    ) -> Result<Vec<Payment>, DomainError> {
        let order = self.get(tenant, payment.order)?;
        let mut payments = self.payments.get(tenant, &order.code).unwrap_or_default();
        let paid: i64 = payments.iter().map(|p| p.amount_cents).sum();
        if paid + payment.amount_cents > order.total_cents {
            return Err(DomainError::conflict(format!(
                "payment exceeds outstanding balance of order {}",
                order.code
            )));
        }
        payments.push(payment);
        self.payments.upsert(tenant, order.code, payments.clone());
        Ok(payments)
    }

    pub fn payments(&self, tenant: TenantId, code: OrderId) -> Result<Vec<Payment>, DomainError> {
        self.get(tenant, code)?;
        Ok(self.payments.get(tenant, &code).unwrap_or_default())
    }

    pub fn for_customer(&self, tenant: TenantId, customer: CustomerId) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .store
            .list(tenant)
            .into_iter()
            .filter(|o| o.customer == Some(customer))
            .collect();
        orders.sort_by_key(|o| o.code);
        orders
    }

    pub fn summary_for(&self, tenant: TenantId, customer: CustomerId) -> CustomerSummary {
        let mut summary = CustomerSummary::empty(customer);
        for order in self.for_customer(tenant, customer) {
            summary.record_order(order.total_cents, order.status.is_open());
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenant_store::InMemoryTenantStore;
    use comercio_orders::{OrderLineDraft, PaymentMethod};
    use comercio_products::ProductDraft;

    const TENANT: TenantId = TenantId::new(1);

    fn products() -> ProductRepository {
        ProductRepository::new(
            Arc::new(InMemoryTenantStore::new()),
            Arc::new(InMemoryTenantStore::new()),
        )
    }

    fn orders() -> OrderRepository {
        OrderRepository::new(
            Arc::new(InMemoryTenantStore::new()),
            Arc::new(InMemoryTenantStore::new()),
        )
    }

    fn seeded_product(repo: &ProductRepository, stock: u32, price: i64) -> comercio_products::Product {
        repo.create(
            TENANT,
            ProductDraft {
                name: "Cafe molido".into(),
                description: None,
                category: None,
                price_cents: price,
                stock,
                photo: None,
            },
        )
        .unwrap()
    }

    fn draft_for(product: comercio_core::ProductId, quantity: u32) -> OrderDraft {
        OrderDraft {
            customer: Some(CustomerId::new(7)),
            lines: vec![OrderLineDraft { product, quantity }],
            notes: None,
        }
    }

    #[test]
    fn placing_an_order_decrements_stock_and_prices_lines() {
        let products = products();
        let orders = orders();
        let product = seeded_product(&products, 10, 500);

        let order = orders.place(TENANT, draft_for(product.code, 4), &products).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_cents, 2000);
        assert_eq!(products.get(TENANT, product.code).unwrap().stock, 6);
    }

    #[test]
    fn insufficient_stock_rejects_the_whole_order() {
        let products = products();
        let orders = orders();
        let product = seeded_product(&products, 3, 500);

        let draft = OrderDraft {
            customer: Some(CustomerId::new(7)),
            lines: vec![
                OrderLineDraft {
                    product: product.code,
                    quantity: 2,
                },
                OrderLineDraft {
                    product: comercio_core::ProductId::new(999),
                    quantity: 1,
                },
            ],
            notes: None,
        };
        assert!(orders.place(TENANT, draft, &products).is_err());
        // Nothing was withdrawn for the line that did exist.
        assert_eq!(products.get(TENANT, product.code).unwrap().stock, 3);

        let err = orders
            .place(TENANT, draft_for(product.code, 4), &products)
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(products.get(TENANT, product.code).unwrap().stock, 3);
    }

    #[test]
    fn placement_and_inventory_adjustments_interleave_safely() {
        let products = products();
        let orders = orders();
        let product = seeded_product(&products, 100, 100);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    orders
                        .place(TENANT, draft_for(product.code, 1), &products)
                        .unwrap()
                });
                scope.spawn(|| products.adjust_stock(TENANT, product.code, -1).unwrap());
            }
        });

        // Every one of the sixteen single-unit withdrawals must land.
        assert_eq!(products.get(TENANT, product.code).unwrap().stock, 84);
        assert_eq!(orders.list(TENANT).len(), 8);
    }

    #[test]
    fn cancelling_returns_stock_to_the_catalog() {
        let products = products();
        let orders = orders();
        let product = seeded_product(&products, 5, 100);

        let order = orders.place(TENANT, draft_for(product.code, 5), &products).unwrap();
        assert_eq!(products.get(TENANT, product.code).unwrap().stock, 0);

        orders
            .set_status(TENANT, order.code, OrderStatus::Cancelled, &products)
            .unwrap();
        assert_eq!(products.get(TENANT, product.code).unwrap().stock, 5);
    }

    #[test]
    fn returned_order_follows_delivery() {
        let products = products();
        let orders = orders();
        let product = seeded_product(&products, 5, 100);
        let order = orders.place(TENANT, draft_for(product.code, 2), &products).unwrap();

        orders.set_status(TENANT, order.code, OrderStatus::InProgress, &products).unwrap();
        orders.set_status(TENANT, order.code, OrderStatus::Delivered, &products).unwrap();
        let returned = orders
            .set_status(TENANT, order.code, OrderStatus::Returned, &products)
            .unwrap();
        assert_eq!(returned.status, OrderStatus::Returned);
        assert_eq!(products.get(TENANT, product.code).unwrap().stock, 5);
    }

    #[test]
    fn overpayment_is_rejected() {
        let products = products();
        let orders = orders();
        let product = seeded_product(&products, 5, 100);
        let order = orders.place(TENANT, draft_for(product.code, 2), &products).unwrap();

        let pay = |amount| {
            Payment::new(order.code, amount, PaymentMethod::Cash, None, Utc::now()).unwrap()
        };
        orders.record_payment(TENANT, pay(150)).unwrap();
        let err = orders.record_payment(TENANT, pay(100)).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn summary_counts_open_and_total() {
        let products = products();
        let orders = orders();
        let product = seeded_product(&products, 10, 100);

        let first = orders.place(TENANT, draft_for(product.code, 2), &products).unwrap();
        orders.place(TENANT, draft_for(product.code, 3), &products).unwrap();
        orders
            .set_status(TENANT, first.code, OrderStatus::Cancelled, &products)
            .unwrap();

        let summary = orders.summary_for(TENANT, CustomerId::new(7));
        assert_eq!(summary.order_count, 2);
        assert_eq!(summary.lifetime_total_cents, 500);
        assert_eq!(summary.open_orders, 1);
    }
}
