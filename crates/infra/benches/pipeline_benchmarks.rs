use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use depot_auth::{Permission, Token, authorize};
use depot_core::{Association, Fields, RecordId, Resource};
use depot_infra::SchemaValidator;
use depot_service::{Operation, RawInput};
use serde_json::{Value, json};

fn object(v: Value) -> Fields {
    match v {
        Value::Object(m) => m,
        _ => Fields::new(),
    }
}

/// Gate cost against tokens of growing size, required permission last.
fn bench_authorize(c: &mut Criterion) {
    let mut group = c.benchmark_group("authorize");
    let all = depot_service::catalogue::permissions();

    for size in [1usize, 16, all.len()] {
        let granted: Vec<Permission> = all.iter().take(size).cloned().collect();
        let required = granted.last().cloned().unwrap_or_else(|| Permission::new("get orders"));
        group.bench_with_input(BenchmarkId::from_parameter(size), &granted, |b, granted| {
            b.iter(|| authorize(black_box(granted), black_box(&required)))
        });
    }
    group.finish();

    let token = Token::with_permissions(all.clone());
    let required = Operation::UpdateChild(Association::EmployeeSupervisors).permission(Resource::Employee);
    c.bench_function("token_allows_full_catalogue", |b| b.iter(|| token.allows(black_box(&required))));
}

fn bench_validation(c: &mut Criterion) {
    let validator = SchemaValidator::new(Resource::Stock);
    let empty = Fields::new();

    let create_body = json!({ "name": "Hammer", "sku": "H-1", "quantity": 4, "unit_price": 9.5 });
    c.bench_function("validate_create_stock", |b| {
        b.iter(|| {
            validator.check(
                Operation::Create,
                RawInput {
                    query: &empty,
                    params: &empty,
                    body: black_box(&create_body),
                },
            )
        })
    });

    let query = object(json!({ "limit": "50", "offset": "100", "sort": "-sku", "quantity": "3" }));
    c.bench_function("validate_list_stock_query", |b| {
        b.iter(|| {
            validator.check(
                Operation::List,
                RawInput {
                    query: black_box(&query),
                    params: &empty,
                    body: &Value::Null,
                },
            )
        })
    });

    let orders = SchemaValidator::new(Resource::Order);
    let params = object(json!({ "id": RecordId::new().to_string() }));
    let ids: Vec<String> = (0..100).map(|_| RecordId::new().to_string()).collect();
    let add_body = json!({ "ids": ids, "quantity": 1 });
    c.bench_function("validate_add_100_items", |b| {
        b.iter(|| {
            orders.check(
                Operation::AddChildren(Association::OrderItems),
                RawInput {
                    query: &empty,
                    params: &params,
                    body: black_box(&add_body),
                },
            )
        })
    });
}

criterion_group!(benches, bench_authorize, bench_validation);
criterion_main!(benches);
