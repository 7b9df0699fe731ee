pub mod auth;
pub mod bookings;
pub mod museums;
pub mod pages;

use axum::Router;
use std::sync::Arc;

/// JSON API consumed by the chatbot, mounted under /lol/api.
pub fn api_routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(auth::routes())
        .merge(museums::routes())
        .merge(bookings::routes())
}
