use std::collections::HashMap;
use std::sync::Arc;

use cart::{Cart, CartService, InMemoryCartStore, UserId};
use catalog::{Catalog, Category, InMemoryCatalog, Money, NewProduct, Product, ProductId};
use checkout::{CheckoutService, validate};
use chrono::Utc;
use criterion::{Criterion, criterion_group, criterion_main};

fn bench_validate(c: &mut Criterion) {
    let mut cart = Cart::new(UserId::new(), Utc::now());
    let mut products = HashMap::new();
    for i in 0..50 {
        let product = Product::from_new(
            ProductId::new(),
            NewProduct::new(
                format!("Product {i}"),
                Money::from_cents(1_000),
                Category::Laptop,
                i % 7,
            ),
            Utc::now(),
        );
        cart.put(product.id, 3, Utc::now());
        products.insert(product.id, product);
    }

    c.bench_function("checkout/validate_50_lines", |b| {
        b.iter(|| std::hint::black_box(validate(&cart, &products)));
    });
}

fn bench_checkout(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let catalog: Arc<dyn Catalog> = Arc::new(InMemoryCatalog::new());
    let product = rt.block_on(async {
        catalog
            .create(NewProduct::new(
                "Bench Monitor",
                Money::from_cents(25_000),
                Category::Monitor,
                u32::MAX,
            ))
            .await
            .unwrap()
    });
    let carts = CartService::new(catalog.clone(), Arc::new(InMemoryCartStore::new()));
    let checkout = CheckoutService::new(catalog, carts.clone());

    c.bench_function("checkout/add_and_checkout", |b| {
        b.iter(|| {
            rt.block_on(async {
                let user = UserId::new();
                carts.add_item(user, product.id, 1).await.unwrap();
                checkout.checkout(user).await.unwrap();
            });
        });
    });
}

criterion_group!(benches, bench_validate, bench_checkout);
criterion_main!(benches);
