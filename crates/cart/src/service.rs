//! Cart service: mutations and reads against live catalog data.

use std::collections::HashMap;
use std::sync::Arc;

use catalog::{Catalog, Money, Product};
use chrono::Utc;

use crate::{
    AddOutcome, Cart, CartError, CartItemId, CartLine, CartStatus, CartStore, CartTotals,
    CartView, Mutation, ProductId, QuantityOutcome, Result, UserId,
    quantity::{QuantityChange, clamp_merge, clamp_request, clamp_update},
};

/// Applies cart mutations and computes totals.
///
/// Product prices and inventory are read from the catalog on every call;
/// nothing about a product is cached in the cart.
#[derive(Clone)]
pub struct CartService {
    catalog: Arc<dyn Catalog>,
    store: Arc<dyn CartStore>,
}

impl CartService {
    /// Creates a new cart service.
    pub fn new(catalog: Arc<dyn Catalog>, store: Arc<dyn CartStore>) -> Self {
        Self { catalog, store }
    }

    pub fn catalog(&self) -> &Arc<dyn Catalog> {
        &self.catalog
    }

    pub fn store(&self) -> &Arc<dyn CartStore> {
        &self.store
    }

    /// Returns the user's cart, creating an empty one on first access.
    pub async fn get_or_create(&self, user_id: UserId) -> Result<Cart> {
        self.store.get_or_create(user_id).await
    }

    /// Computes totals for a cart from current catalog prices.
    pub async fn totals(&self, cart: &Cart) -> Result<CartTotals> {
        let products = self.products_for(cart).await?;
        Ok(totals_with(cart, &products))
    }

    /// Returns the cart with every line joined to its product.
    ///
    /// Lines whose product has been deleted are left out.
    #[tracing::instrument(skip(self))]
    pub async fn view(&self, user_id: UserId) -> Result<CartView> {
        let cart = self.store.get_or_create(user_id).await?;
        let products = self.products_for(&cart).await?;

        let lines = cart
            .items()
            .iter()
            .filter_map(|item| {
                products.get(&item.product_id).map(|product| CartLine {
                    item_id: item.id,
                    product_id: item.product_id,
                    product_name: product.name.clone(),
                    unit_price: product.price,
                    quantity: item.quantity,
                    line_cost: product.price.multiply(item.quantity),
                    inventory: product.inventory,
                    added_at: item.added_at,
                })
            })
            .collect();

        Ok(CartView {
            user_id,
            lines,
            totals: totals_with(&cart, &products),
            created_at: cart.created_at(),
            updated_at: cart.updated_at(),
        })
    }

    /// Returns totals and `(product, quantity)` pairs.
    #[tracing::instrument(skip(self))]
    pub async fn status(&self, user_id: UserId) -> Result<CartStatus> {
        let cart = self.store.get_or_create(user_id).await?;
        let totals = self.totals(&cart).await?;
        Ok(CartStatus {
            totals,
            items: cart
                .items()
                .iter()
                .map(|item| (item.product_id, item.quantity))
                .collect(),
        })
    }

    /// Adds a product to the user's cart.
    ///
    /// Requests of zero or less count as one unit. Requests above inventory
    /// are lowered to inventory. Adding a product already in the cart
    /// increases that line instead of creating a second one. Out-of-stock
    /// products are reported as [`AddOutcome::Unavailable`] and leave the
    /// cart untouched.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        requested: i64,
    ) -> Result<Mutation<AddOutcome>> {
        let product = self
            .catalog
            .find(product_id)
            .await?
            .ok_or(CartError::ProductNotFound(product_id))?;
        let mut cart = self.store.get_or_create(user_id).await?;

        if !product.is_available() {
            return Ok(Mutation {
                outcome: AddOutcome::Unavailable,
                notice: format!("{} is out of stock.", product.name),
                totals: self.totals(&cart).await?,
            });
        }

        let available = product.inventory;
        let request = clamp_request(requested, available);
        let now = Utc::now();

        let (outcome, notice) = match cart.item_for_product(product_id).map(|i| i.quantity) {
            Some(existing) => {
                let merged = clamp_merge(existing, request.quantity, available);
                let item_id = cart
                    .put(product_id, merged.quantity, now)
                    .ok_or_else(|| CartError::InvalidQuantity(requested.to_string()))?;
                if request.adjusted || merged.adjusted {
                    (
                        AddOutcome::AdjustedAndUpdated {
                            item_id,
                            quantity: merged.quantity,
                            available,
                        },
                        format!("Cart adjusted to maximum available quantity ({available})."),
                    )
                } else {
                    (
                        AddOutcome::Updated {
                            item_id,
                            quantity: merged.quantity,
                        },
                        format!("Updated {} quantity in your cart.", product.name),
                    )
                }
            }
            None => {
                let item_id = cart
                    .put(product_id, request.quantity, now)
                    .ok_or_else(|| CartError::InvalidQuantity(requested.to_string()))?;
                if request.adjusted {
                    (
                        AddOutcome::AdjustedAndCreated {
                            item_id,
                            quantity: request.quantity,
                            available,
                        },
                        format!(
                            "Only {available} units of {} available. Adjusted quantity.",
                            product.name
                        ),
                    )
                } else {
                    (
                        AddOutcome::Created {
                            item_id,
                            quantity: request.quantity,
                        },
                        format!("Added {} to your cart.", product.name),
                    )
                }
            }
        };

        self.store.save(&cart).await?;

        metrics::counter!("cart_items_added_total").increment(1);
        if outcome.is_adjusted() {
            metrics::counter!("cart_quantity_adjusted_total").increment(1);
            tracing::info!(%user_id, %product_id, requested, available, "quantity adjusted");
        }

        Ok(Mutation {
            outcome,
            notice,
            totals: self.totals(&cart).await?,
        })
    }

    /// Sets the quantity of a line in the user's cart.
    ///
    /// Zero or less removes the line. Above inventory is lowered to
    /// inventory; if nothing is left in stock the line is removed.
    #[tracing::instrument(skip(self))]
    pub async fn set_item_quantity(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        requested: i64,
    ) -> Result<Mutation<QuantityOutcome>> {
        let mut cart = self.owned_cart(user_id, item_id).await?;
        let product_id = cart
            .item(item_id)
            .map(|item| item.product_id)
            .ok_or(CartError::ItemNotFound(item_id))?;
        let product = self
            .catalog
            .find(product_id)
            .await?
            .ok_or(CartError::ProductNotFound(product_id))?;
        let now = Utc::now();

        let (outcome, notice) = match clamp_update(requested, product.inventory) {
            QuantityChange::Remove { sold_out } => {
                cart.remove(item_id, now)?;
                let notice = if sold_out {
                    format!("{} is out of stock.", product.name)
                } else {
                    format!("Removed {} from your cart.", product.name)
                };
                (QuantityOutcome::Removed { item_id }, notice)
            }
            QuantityChange::Set(clamped) => {
                cart.set_quantity(item_id, clamped.quantity, now)?;
                let line_cost = product.price.multiply(clamped.quantity);
                if clamped.adjusted {
                    metrics::counter!("cart_quantity_adjusted_total").increment(1);
                    tracing::info!(
                        %user_id,
                        %product_id,
                        requested,
                        available = product.inventory,
                        "quantity adjusted"
                    );
                    (
                        QuantityOutcome::Adjusted {
                            item_id,
                            quantity: clamped.quantity,
                            available: product.inventory,
                            line_cost,
                        },
                        format!(
                            "Only {} units available. Adjusted quantity.",
                            product.inventory
                        ),
                    )
                } else {
                    (
                        QuantityOutcome::Updated {
                            item_id,
                            quantity: clamped.quantity,
                            line_cost,
                        },
                        format!("Updated {} quantity.", product.name),
                    )
                }
            }
        };

        self.store.save(&cart).await?;

        Ok(Mutation {
            outcome,
            notice,
            totals: self.totals(&cart).await?,
        })
    }

    /// Removes a line from the user's cart.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(&self, user_id: UserId, item_id: CartItemId) -> Result<Mutation<()>> {
        let mut cart = self.owned_cart(user_id, item_id).await?;
        let removed = cart.remove(item_id, Utc::now())?;
        self.store.save(&cart).await?;

        let notice = match self.catalog.find(removed.product_id).await? {
            Some(product) => format!("Removed {} from your cart.", product.name),
            None => "Removed item from your cart.".to_string(),
        };

        Ok(Mutation {
            outcome: (),
            notice,
            totals: self.totals(&cart).await?,
        })
    }

    /// Removes every line from the user's cart. The outcome is the number of
    /// lines removed.
    #[tracing::instrument(skip(self))]
    pub async fn clear(&self, user_id: UserId) -> Result<Mutation<usize>> {
        let removed = self.store.clear(user_id).await?;
        Ok(Mutation {
            outcome: removed,
            notice: "Your cart has been cleared.".to_string(),
            totals: CartTotals::default(),
        })
    }

    /// Drops a deleted product from every cart.
    #[tracing::instrument(skip(self))]
    pub async fn forget_product(&self, product_id: ProductId) -> Result<u64> {
        let removed = self.store.remove_product(product_id).await?;
        if removed > 0 {
            tracing::info!(%product_id, removed, "removed deleted product from carts");
        }
        Ok(removed)
    }

    /// Loads the user's cart and checks that it holds `item_id`.
    async fn owned_cart(&self, user_id: UserId, item_id: CartItemId) -> Result<Cart> {
        let cart = self.store.get_or_create(user_id).await?;
        if cart.item(item_id).is_some() {
            return Ok(cart);
        }

        match self.store.owner_of(item_id).await? {
            Some(owner) => {
                tracing::warn!(%user_id, %owner, %item_id, "ownership violation");
                Err(CartError::Forbidden { item_id })
            }
            None => Err(CartError::ItemNotFound(item_id)),
        }
    }

    async fn products_for(&self, cart: &Cart) -> Result<HashMap<ProductId, Product>> {
        let mut products = HashMap::with_capacity(cart.line_count());
        for item in cart.items() {
            if let Some(product) = self.catalog.find(item.product_id).await? {
                products.insert(product.id, product);
            }
        }
        Ok(products)
    }
}

fn totals_with(cart: &Cart, products: &HashMap<ProductId, Product>) -> CartTotals {
    let total_items = cart
        .items()
        .iter()
        .filter(|item| products.contains_key(&item.product_id))
        .map(|item| u64::from(item.quantity))
        .sum();
    let total_price: Money = cart.total_price(|id| products.get(&id).map(|p| p.price));
    CartTotals {
        total_items,
        total_price,
    }
}
