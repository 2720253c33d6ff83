use axum::Router;

pub mod auth;
pub mod resources;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/auth", auth::router())
        .merge(resources::router())
}
