pub mod auth;
pub mod config;
pub mod controllers;
pub mod database;
pub mod errors;
pub mod forms;
pub mod middleware;
pub mod models;
pub mod services;
pub mod session;

use axum::Router;
use std::sync::Arc;
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;

// Shared state for the whole application
#[derive(Clone)]
pub struct AppState {
    pub db: database::Database,
    pub sessions: session::SessionStore,
    pub tokens: services::token::TokenServiceClient,
    pub templates: tera::Tera,
    pub config: config::Config,
}

pub fn load_templates() -> tera::Result<tera::Tera> {
    tera::Tera::new(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/**/*"))
}

/// Full route table: HTML pages at the root and under /lol, the JSON API
/// under /lol/api.
pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(controllers::pages::account_routes())
        .nest(
            "/lol",
            controllers::pages::routes().nest("/api", controllers::api_routes()),
        )
        .with_state(state)
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Museum;
    use tera::Context;

    #[test]
    fn templates_load_and_browse_renders() {
        let templates = load_templates().unwrap();

        let museums = vec![Museum {
            id: 1,
            name: "Louvre".into(),
            image: None,
            location: "Paris".into(),
        }];
        let mut ctx = Context::new();
        ctx.insert("museums", &museums);

        let page = templates.render("browse.html", &ctx).unwrap();
        assert!(page.contains("Louvre"));
        assert!(page.contains("Paris"));
    }

    #[test]
    fn booking_form_renders_errors_and_prefill() {
        let templates = load_templates().unwrap();

        let mut ctx = Context::new();
        ctx.insert(
            "museum",
            &Museum {
                id: 2,
                name: "Prado".into(),
                image: None,
                location: "Madrid".into(),
            },
        );
        ctx.insert(
            "tickets",
            &vec![
                serde_json::json!({"id": 1, "label": "Ticket 1 - 10.00", "selected": false}),
                serde_json::json!({"id": 2, "label": "Ticket 2 - 18.00", "selected": true}),
            ],
        );
        ctx.insert("form_name", "Alice");
        ctx.insert("form_email", "alice@example.com");
        ctx.insert("form_phone", "");
        ctx.insert("form_visit_date", "2026-09-01");
        ctx.insert("errors", &["phone: phone must be 1-15 characters"]);

        let page = templates.render("booking_form.html", &ctx).unwrap();
        assert!(page.contains("Prado"));
        assert!(page.contains("Alice"));
        assert!(page.contains("phone must be 1-15 characters"));
        // The submitted date and ticket choice survive the error re-render
        assert!(page.contains(r#"value="2026-09-01""#));
        assert!(page.contains(r#"value="2" selected"#));
    }
}
