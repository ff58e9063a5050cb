//! Axum router configuration
//!
//! ```text
//! /
//! ├── /suppliers                 GET list, POST create
//! ├── /suppliers/:id             GET, PUT (merge), DELETE
//! ├── /products                  GET list, POST create
//! ├── /products/:id              GET (with supplier), PUT (merge), DELETE
//! ├── /products/supplier/:id_sup GET products of one supplier
//! └── /health                    GET liveness
//! ```

use axum::routing::get;
use axum::Router;

use super::handlers::*;
use super::AppState;

/// Build the complete router over a shared inventory
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/suppliers", supplier_router())
        .nest("/products", product_router())
        .route("/health", get(health))
        .with_state(state)
}

fn supplier_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_suppliers).post(create_supplier))
        .route(
            "/:id",
            get(get_supplier).put(update_supplier).delete(delete_supplier),
        )
}

fn product_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/supplier/:id_sup", get(products_by_supplier))
}
