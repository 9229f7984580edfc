use std::sync::Arc;

use cart::{Cart, CartService, InMemoryCartStore, ProductId, UserId, quantity};
use catalog::{Catalog, Category, InMemoryCatalog, Money, NewProduct};
use chrono::Utc;
use criterion::{Criterion, criterion_group, criterion_main};

fn bench_clamp(c: &mut Criterion) {
    c.bench_function("cart/clamp_request", |b| {
        b.iter(|| {
            for requested in -5..50 {
                std::hint::black_box(quantity::clamp_request(requested, 20));
            }
        });
    });
}

fn bench_total_price(c: &mut Criterion) {
    let mut cart = Cart::new(UserId::new(), Utc::now());
    for _ in 0..50 {
        cart.put(ProductId::new(), 3, Utc::now());
    }
    let price = Money::from_cents(1_999);

    c.bench_function("cart/total_price_50_lines", |b| {
        b.iter(|| std::hint::black_box(cart.total_price(|_| Some(price))));
    });
}

fn bench_add_item(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let catalog = InMemoryCatalog::new();
    let product = rt.block_on(async {
        catalog
            .create(NewProduct::new(
                "Bench Laptop",
                Money::from_cents(99_999),
                Category::Laptop,
                u32::MAX,
            ))
            .await
            .unwrap()
    });
    let service = CartService::new(Arc::new(catalog), Arc::new(InMemoryCartStore::new()));

    c.bench_function("cart/add_item", |b| {
        b.iter(|| {
            rt.block_on(async {
                service.add_item(UserId::new(), product.id, 2).await.unwrap();
            });
        });
    });
}

criterion_group!(benches, bench_clamp, bench_total_price, bench_add_item);
criterion_main!(benches);
