//! Caller introspection: who am I, what can be granted, why was I denied.

use axum::{
    extract::{Extension, Query},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use depot_auth::{Permission, explain_authorization};

use crate::context::PrincipalContext;

#[derive(Debug, Deserialize)]
pub struct ExplainQuery {
    pub permission: String,
}

pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(whoami))
        .route("/permissions", get(list_permissions))
        .route("/explain", get(explain))
}

/// GET /auth/whoami
pub async fn whoami(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "principal_id": principal.principal_id().to_string(),
        "permissions": principal.permissions(),
    }))
}

/// GET /auth/permissions - every permission an operation can require
pub async fn list_permissions() -> impl IntoResponse {
    Json(serde_json::json!({
        "permissions": depot_service::catalogue::permissions(),
    }))
}

/// GET /auth/explain?permission=... - would the caller be allowed?
pub async fn explain(
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<ExplainQuery>,
) -> impl IntoResponse {
    let required = Permission::new(query.permission);
    Json(explain_authorization(principal.permissions(), &required))
}
