//! Services wired to the schema validator and the in-memory store.

use std::sync::Arc;

use serde_json::json;

use depot_auth::Token;
use depot_core::{Association, RecordId, Resource};
use depot_infra::{InMemoryDatabase, SchemaValidator};
use depot_service::{Operation, Payload, Request, Service};

fn service(db: &Arc<InMemoryDatabase>, resource: Resource) -> Service {
    let mut builder = Service::builder(resource)
        .repository(Arc::new(db.repository(resource)))
        .validator(Arc::new(SchemaValidator::new(resource)));
    for a in resource.associations() {
        builder = builder.association(a, db.association(a));
    }
    builder.build().unwrap()
}

fn admin() -> Token {
    Token::with_permissions(depot_service::catalogue::permissions())
}

fn created_id(payload: Payload) -> RecordId {
    match payload {
        Payload::Record(r) => r.id,
        other => panic!("unexpected payload {other:?}"),
    }
}

#[tokio::test]
async fn create_then_get_round_trip() {
    let db = Arc::new(InMemoryDatabase::new());
    let customers = service(&db, Resource::Customer);
    let creator = RecordId::new().to_string();

    let created = customers
        .execute(
            Operation::Create,
            &Request::new(admin()).with_body(json!({ "name": "Acme", "created_by": creator })),
        )
        .await;
    let id = created_id(created.into_result().unwrap());

    let fetched = customers
        .execute(Operation::Get, &Request::new(admin()).with_param("id", id.to_string()))
        .await;
    let Payload::Record(record) = fetched.into_result().unwrap() else {
        panic!("expected a record");
    };
    assert_eq!(record.get("name"), Some(&json!("Acme")));
    assert_eq!(record.get("created_by"), Some(&json!(creator)));
}

#[tokio::test]
async fn invalid_body_never_reaches_the_store() {
    let db = Arc::new(InMemoryDatabase::new());
    let stocks = service(&db, Resource::Stock);

    let env = stocks
        .execute(
            Operation::Create,
            &Request::new(admin()).with_body(json!({ "name": "Hammer", "quantity": "four" })),
        )
        .await;

    let err = env.error().unwrap();
    assert_eq!(err.status, 400);
    assert_eq!(err.message, "body.sku is required; body.quantity must be an integer");
    assert_eq!(db.count(Resource::Stock), 0);
}

#[tokio::test]
async fn soft_deleted_rows_are_not_found_by_default() {
    let db = Arc::new(InMemoryDatabase::new());
    let roles = service(&db, Resource::Role);
    let id = created_id(
        roles
            .execute(Operation::Create, &Request::new(admin()).with_body(json!({ "name": "clerk" })))
            .await
            .into_result()
            .unwrap(),
    );

    let by_id = || Request::new(admin()).with_param("id", id.to_string());
    assert!(roles.execute(Operation::Delete, &by_id()).await.success());
    assert_eq!(roles.execute(Operation::Get, &by_id()).await.status(), 404);

    let env = roles
        .execute(Operation::Get, &by_id().with_query("paranoid", "false"))
        .await;
    assert!(env.success());
}

#[tokio::test]
async fn adding_a_missing_child_fails_in_storage() {
    let db = Arc::new(InMemoryDatabase::new());
    let users = service(&db, Resource::User);
    let user_id = created_id(
        users
            .execute(
                Operation::Create,
                &Request::new(admin()).with_body(json!({ "username": "ada", "email": "ada@example.com" })),
            )
            .await
            .into_result()
            .unwrap(),
    );

    let env = users
        .execute(
            Operation::AddChildren(Association::UserRoles),
            &Request::new(admin())
                .with_param("id", user_id.to_string())
                .with_body(json!({ "ids": [RecordId::new().to_string()] })),
        )
        .await;

    let err = env.error().unwrap();
    assert_eq!(err.status, 500);
    assert_eq!(err.code.as_ref().unwrap().as_str(), "C10H07-07");
}

#[tokio::test]
async fn role_permissions_lifecycle() {
    let db = Arc::new(InMemoryDatabase::new());
    let roles = service(&db, Resource::Role);
    let permissions = service(&db, Resource::Permission);

    let role_id = created_id(
        roles
            .execute(Operation::Create, &Request::new(admin()).with_body(json!({ "name": "admin" })))
            .await
            .into_result()
            .unwrap(),
    );
    let perm_id = created_id(
        permissions
            .execute(Operation::Create, &Request::new(admin()).with_body(json!({ "name": "get orders" })))
            .await
            .into_result()
            .unwrap(),
    );
    let assoc = Association::RolePermissions;
    let nested = || {
        Request::new(admin())
            .with_param("id", role_id.to_string())
            .with_param("child_id", perm_id.to_string())
    };

    let added = roles
        .execute(
            Operation::AddChildren(assoc),
            &Request::new(admin())
                .with_param("id", role_id.to_string())
                .with_body(json!({ "ids": [perm_id.to_string()], "extra": "seeded" })),
        )
        .await;
    assert!(added.success());

    let updated = roles
        .execute(Operation::UpdateChild(assoc), &nested().with_body(json!({ "extra": "audited" })))
        .await;
    let Payload::Linked(linked) = updated.into_result().unwrap() else {
        panic!("expected a linked child");
    };
    assert_eq!(linked.link.unwrap().attributes.get("extra"), Some(&json!("audited")));

    assert!(roles.execute(Operation::RemoveChild(assoc), &nested()).await.success());
    assert_eq!(roles.execute(Operation::GetChild(assoc), &nested()).await.status(), 404);
}

#[tokio::test]
async fn whole_number_query_matches_stored_integer() {
    let db = Arc::new(InMemoryDatabase::new());
    let stocks = service(&db, Resource::Stock);
    let created = stocks
        .execute(
            Operation::Create,
            &Request::new(admin()).with_body(json!({ "name": "Hammer", "sku": "H-1", "unit_price": 9 })),
        )
        .await;
    assert!(created.success());

    let env = stocks
        .execute(Operation::List, &Request::new(admin()).with_query("unit_price", "9"))
        .await;
    let Payload::Records(rows) = env.into_result().unwrap() else {
        panic!("expected records");
    };
    assert_eq!(rows.len(), 1);
}
