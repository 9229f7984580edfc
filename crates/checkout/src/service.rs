use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use cart::{Cart, CartService};
use catalog::{Catalog, CatalogError, Product, StockLine};
use chrono::Utc;
use common::{ProductId, UserId};

use crate::{CheckoutError, LineFailure, Receipt, ReceiptLine, Result, validate};

/// Orchestrates checkout: validate every line, then commit all stock
/// decrements at once and clear the cart.
#[derive(Clone)]
pub struct CheckoutService {
    catalog: Arc<dyn Catalog>,
    carts: CartService,
}

impl CheckoutService {
    /// Creates a new checkout service.
    pub fn new(catalog: Arc<dyn Catalog>, carts: CartService) -> Self {
        Self { catalog, carts }
    }

    /// Checks out the user's cart.
    ///
    /// On any failure no inventory is touched and the cart is left as it
    /// was. Every failing line is reported, not just the first.
    #[tracing::instrument(skip(self))]
    pub async fn checkout(&self, user_id: UserId) -> Result<Receipt> {
        metrics::counter!("checkout_attempts_total").increment(1);
        let start = Instant::now();

        let result = self.run(user_id).await;

        metrics::histogram!("checkout_duration_seconds").record(start.elapsed().as_secs_f64());
        match &result {
            Ok(receipt) => {
                metrics::counter!("checkout_completed_total").increment(1);
                tracing::info!(
                    %user_id,
                    total_items = receipt.total_items,
                    total_price = %receipt.total_price,
                    "checkout completed"
                );
            }
            Err(e) => {
                metrics::counter!("checkout_rejected_total", "reason" => e.reason()).increment(1);
                match e {
                    CheckoutError::InventoryConflict(failures) => tracing::warn!(
                        %user_id,
                        failures = failures.len(),
                        "checkout rejected"
                    ),
                    CheckoutError::EmptyCart => tracing::info!(%user_id, "checkout on empty cart"),
                    other => tracing::error!(%user_id, error = %other, "checkout failed"),
                }
            }
        }
        result
    }

    async fn run(&self, user_id: UserId) -> Result<Receipt> {
        let cart = self.carts.get_or_create(user_id).await?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        // Validation phase
        let products = self.load_products(&cart).await?;
        let failures = validate(&cart, &products);
        if !failures.is_empty() {
            return Err(CheckoutError::InventoryConflict(failures));
        }

        // Commit phase
        let lines: Vec<StockLine> = cart
            .items()
            .iter()
            .map(|item| StockLine::new(item.product_id, item.quantity))
            .collect();

        match self.catalog.commit_stock(&lines).await {
            Ok(()) => {}
            Err(CatalogError::StockConflict(shortfalls)) => {
                // Another checkout took the stock after validation.
                let failures = shortfalls
                    .iter()
                    .map(|s| {
                        let name = products.get(&s.product_id).map(|p| p.name.as_str());
                        LineFailure::from_shortfall(s, name)
                    })
                    .collect();
                return Err(CheckoutError::InventoryConflict(failures));
            }
            Err(e) => return Err(e.into()),
        }

        let receipt = build_receipt(&cart, &products);

        if let Err(e) = self.carts.store().clear(user_id).await {
            tracing::error!(%user_id, error = %e, "stock committed but cart could not be cleared");
        }

        Ok(receipt)
    }

    async fn load_products(&self, cart: &Cart) -> Result<HashMap<ProductId, Product>> {
        let mut products = HashMap::with_capacity(cart.line_count());
        for item in cart.items() {
            if let Some(product) = self.catalog.find(item.product_id).await? {
                products.insert(product.id, product);
            }
        }
        Ok(products)
    }
}

/// Prices a validated cart. Every line's product must be in `products`.
fn build_receipt(cart: &Cart, products: &HashMap<ProductId, Product>) -> Receipt {
    let lines: Vec<ReceiptLine> = cart
        .items()
        .iter()
        .filter_map(|item| {
            products.get(&item.product_id).map(|product| ReceiptLine {
                product_id: product.id,
                product_name: product.name.clone(),
                quantity: item.quantity,
                unit_price: product.price,
                line_total: product.price.multiply(item.quantity),
            })
        })
        .collect();

    Receipt {
        user_id: cart.user_id(),
        total_items: lines.iter().map(|l| u64::from(l.quantity)).sum(),
        total_price: lines.iter().map(|l| l.line_total).sum(),
        lines,
        placed_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use cart::{CartError, InMemoryCartStore};
    use catalog::{Category, InMemoryCatalog, Money, NewProduct};

    use super::*;
    use crate::FailureReason;

    fn setup() -> (CheckoutService, CartService, InMemoryCatalog) {
        let catalog = InMemoryCatalog::new();
        let shared: Arc<dyn Catalog> = Arc::new(catalog.clone());
        let carts = CartService::new(shared.clone(), Arc::new(InMemoryCartStore::new()));
        (CheckoutService::new(shared, carts.clone()), carts, catalog)
    }

    async fn product(catalog: &InMemoryCatalog, name: &str, cents: i64, inventory: u32) -> Product {
        catalog
            .create(NewProduct::new(
                name,
                Money::from_cents(cents),
                Category::Monitor,
                inventory,
            ))
            .await
            .unwrap()
    }

    async fn inventory(catalog: &InMemoryCatalog, id: ProductId) -> u32 {
        catalog.find(id).await.unwrap().unwrap().inventory
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected() {
        let (checkout, _, _) = setup();
        let result = checkout.checkout(UserId::new()).await;
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    }

    #[tokio::test]
    async fn test_commit_decrements_and_clears() {
        let (checkout, carts, catalog) = setup();
        let p1 = product(&catalog, "P1", 1_000, 5).await;
        let p2 = product(&catalog, "P2", 2_500, 1).await;
        let user = UserId::new();
        carts.add_item(user, p1.id, 2).await.unwrap();
        carts.add_item(user, p2.id, 1).await.unwrap();

        let receipt = checkout.checkout(user).await.unwrap();

        assert_eq!(inventory(&catalog, p1.id).await, 3);
        assert_eq!(inventory(&catalog, p2.id).await, 0);
        assert!(carts.get_or_create(user).await.unwrap().is_empty());
        assert_eq!(receipt.total_items, 3);
        assert_eq!(receipt.total_price, Money::from_cents(2 * 1_000 + 2_500));
        assert_eq!(receipt.lines[0].line_total, Money::from_cents(2_000));
    }

    #[tokio::test]
    async fn test_receipt_counts_lines_at_max_inventory() {
        let (checkout, carts, catalog) = setup();
        let a = product(&catalog, "A", 1, u32::MAX).await;
        let b = product(&catalog, "B", 1, u32::MAX).await;
        let user = UserId::new();
        carts.add_item(user, a.id, i64::from(u32::MAX)).await.unwrap();
        carts.add_item(user, b.id, i64::from(u32::MAX)).await.unwrap();

        let receipt = checkout.checkout(user).await.unwrap();

        assert_eq!(receipt.total_items, 2 * u64::from(u32::MAX));
        assert_eq!(receipt.total_price, Money::from_cents(2 * i64::from(u32::MAX)));
        assert_eq!(inventory(&catalog, a.id).await, 0);
        assert_eq!(inventory(&catalog, b.id).await, 0);
    }

    #[tokio::test]
    async fn test_any_failure_commits_nothing() {
        let (checkout, carts, catalog) = setup();
        let a = product(&catalog, "A", 1_000, 5).await;
        let b = product(&catalog, "B", 1_000, 5).await;
        let c = product(&catalog, "C", 1_000, 5).await;
        let user = UserId::new();
        for p in [&a, &b, &c] {
            carts.add_item(user, p.id, 3).await.unwrap();
        }
        // Stock for B drops after it went into the cart.
        catalog.update_stock(b.id, -4).await.unwrap();

        let result = checkout.checkout(user).await;

        let Err(CheckoutError::InventoryConflict(failures)) = result else {
            panic!("expected inventory conflict");
        };
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].product_id, b.id);
        assert_eq!(
            failures[0].reason,
            FailureReason::Insufficient {
                requested: 3,
                available: 1
            }
        );
        assert_eq!(inventory(&catalog, a.id).await, 5);
        assert_eq!(inventory(&catalog, b.id).await, 1);
        assert_eq!(inventory(&catalog, c.id).await, 5);
        assert_eq!(carts.get_or_create(user).await.unwrap().line_count(), 3);
    }

    #[tokio::test]
    async fn test_deleted_product_is_reported() {
        let (checkout, carts, catalog) = setup();
        let p = product(&catalog, "P", 1_000, 5).await;
        let user = UserId::new();
        carts.add_item(user, p.id, 1).await.unwrap();
        catalog.delete(p.id).await.unwrap();

        let Err(CheckoutError::InventoryConflict(failures)) = checkout.checkout(user).await else {
            panic!("expected inventory conflict");
        };
        assert_eq!(failures[0].reason, FailureReason::Missing);
    }

    #[test]
    fn test_rejection_reason_labels() {
        assert_eq!(CheckoutError::EmptyCart.reason(), "empty_cart");
        assert_eq!(
            CheckoutError::InventoryConflict(Vec::new()).reason(),
            "inventory_conflict"
        );
        assert_eq!(
            CheckoutError::Cart(CartError::InvalidQuantity("x".into())).reason(),
            "error"
        );
    }
}
