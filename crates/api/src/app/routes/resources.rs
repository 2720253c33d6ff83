//! CRUD and association routes for every resource.
//!
//! ```text
//! GET    /<plural>                        list
//! POST   /<plural>                        create
//! GET    /<plural>/:id                    get
//! PATCH  /<plural>/:id                    update
//! DELETE /<plural>/:id                    delete
//! GET    /<plural>/:id/<children>         list children
//! POST   /<plural>/:id/<children>         add children
//! GET    /<plural>/:id/<children>/:child_id
//! PATCH  /<plural>/:id/<children>/:child_id
//! DELETE /<plural>/:id/<children>/:child_id
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Router, async_trait,
    body::Bytes,
    extract::{Extension, FromRequest, FromRequestParts, Path, Query, Request as HttpRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::Value;

use depot_core::Resource;
use depot_service::{Envelope, ErrorCode, ErrorInfo, ErrorKind, Operation, Request, Step};

use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Resource::ALL
        .into_iter()
        .fold(Router::new(), |router, resource| router.merge(resource_router(resource)))
}

fn resource_router(resource: Resource) -> Router {
    let on = move |operation: Operation| move |call: Call| call.run(resource, operation);

    let base = format!("/{}", resource.plural());
    let mut router = Router::new()
        .route(&base, get(on(Operation::List)).post(on(Operation::Create)))
        .route(
            &format!("{base}/:id"),
            get(on(Operation::Get))
                .patch(on(Operation::Update))
                .delete(on(Operation::Delete)),
        );

    for a in resource.associations() {
        let children = format!("{base}/:id/{}", a.plural());
        router = router
            .route(
                &children,
                get(on(Operation::ListChildren(a))).post(on(Operation::AddChildren(a))),
            )
            .route(
                &format!("{children}/:child_id"),
                get(on(Operation::GetChild(a)))
                    .patch(on(Operation::UpdateChild(a)))
                    .delete(on(Operation::RemoveChild(a))),
            );
    }
    router
}

/// One HTTP call, translated into a service [`Request`].
pub struct Call {
    services: Arc<AppServices>,
    request: Request,
}

impl Call {
    async fn run(self, resource: Resource, operation: Operation) -> Response {
        let Some(service) = self.services.service(resource) else {
            let error = ErrorInfo::new(
                ErrorKind::NotWired,
                format!("{resource} service is not wired"),
                Some(ErrorCode::new(resource, operation, Step::Wiring)),
            );
            return errors::envelope_response(Envelope::err(error), operation, self.services.redact_errors());
        };

        let envelope = service.execute(operation, &self.request).await;
        errors::envelope_response(envelope, operation, self.services.redact_errors())
    }
}

#[async_trait]
impl<S> FromRequest<S> for Call
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: HttpRequest, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();

        let Extension(services) = Extension::<Arc<AppServices>>::from_request_parts(&mut parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let principal = parts
            .extensions
            .get::<PrincipalContext>()
            .cloned()
            .ok_or_else(|| StatusCode::UNAUTHORIZED.into_response())?;

        // Routes without path parameters reject `Path`; treat that as empty.
        let params = Path::<HashMap<String, String>>::from_request_parts(&mut parts, state)
            .await
            .map(|Path(p)| p)
            .unwrap_or_default();

        // A string map accepts any query string.
        let query = Query::<HashMap<String, String>>::from_request_parts(&mut parts, state)
            .await
            .map(|Query(q)| q)
            .unwrap_or_default();

        let bytes = Bytes::from_request(HttpRequest::from_parts(parts, body), state)
            .await
            .map_err(IntoResponse::into_response)?;
        // Undecodable JSON is handed on as raw text: the access gate still
        // runs first and the validator rejects any non-object body.
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::debug!(error = %e, "request body is not valid JSON");
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        let mut request = Request::new(principal.token()).with_body(body);
        for (key, value) in params {
            request = request.with_param(key, value);
        }
        for (key, value) in query {
            request = request.with_query(key, value);
        }

        Ok(Self { services, request })
    }
}
