//! Route handlers
//!
//! Each handler decodes its inputs, runs one inventory call on the
//! blocking pool, and maps the outcome to a response.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;

use crate::error::{Result, SupplyError};
use crate::inventory::Inventory;
use crate::model::{
    Product, ProductCreate, ProductPatch, ProductWithSupplier, Supplier, SupplierCreate,
    SupplierPatch,
};
use crate::protocol::{parse_body, ApiError};

use super::AppState;

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Run a store call off the async executor
async fn with_inventory<T, F>(state: &AppState, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&Inventory) -> Result<T> + Send + 'static,
{
    let inventory = Arc::clone(state);
    match tokio::task::spawn_blocking(move || f(&inventory)).await {
        Ok(result) => result,
        Err(e) => Err(SupplyError::Storage(format!("store task failed: {}", e))),
    }
}

// =============================================================================
// Suppliers
// =============================================================================

pub async fn create_supplier(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<Supplier>> {
    let payload: SupplierCreate = parse_body(&body)?;
    let supplier = with_inventory(&state, move |inv| inv.create_supplier(payload)).await?;
    tracing::info!(id = %supplier.id, "supplier created");
    Ok(Json(supplier))
}

pub async fn list_suppliers(State(state): State<AppState>) -> ApiResult<Json<Vec<Supplier>>> {
    Ok(Json(with_inventory(&state, |inv| inv.list_suppliers()).await?))
}

pub async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Supplier>> {
    Ok(Json(with_inventory(&state, move |inv| inv.get_supplier(&id)).await?))
}

pub async fn update_supplier(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Supplier>> {
    let patch: SupplierPatch = parse_body(&body)?;
    let target = id.clone();
    let supplier = with_inventory(&state, move |inv| inv.update_supplier(&target, patch))
        .await
        .map_err(|e| {
            ApiError::missing_as_bad_request(e, || {
                format!("couldn't update a supplier with id={}. Supplier not found", id)
            })
        })?;
    Ok(Json(supplier))
}

pub async fn delete_supplier(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<String> {
    let target = id.clone();
    with_inventory(&state, move |inv| inv.delete_supplier(&target))
        .await
        .map_err(|e| {
            ApiError::missing_as_bad_request(e, || {
                format!("couldn't delete a supplier with id={}. Supplier not found", id)
            })
        })?;
    tracing::info!(%id, "supplier deleted");
    Ok(format!("Supplier id={} successfully deleted", id))
}

// =============================================================================
// Products
// =============================================================================

pub async fn create_product(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<Product>> {
    let payload: ProductCreate = parse_body(&body)?;
    let product = with_inventory(&state, move |inv| inv.create_product(payload)).await?;
    tracing::info!(id = %product.id, supplier_id = %product.supplier_id, "product created");
    Ok(Json(product))
}

pub async fn list_products(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(with_inventory(&state, |inv| inv.list_products()).await?))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProductWithSupplier>> {
    Ok(Json(with_inventory(&state, move |inv| inv.product_with_supplier(&id)).await?))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Product>> {
    // An unknown product is reported before a bad body
    let target = id.clone();
    with_inventory(&state, move |inv| inv.get_product(&target)).await?;

    let patch: ProductPatch = parse_body(&body)?;
    Ok(Json(with_inventory(&state, move |inv| inv.update_product(&id, patch)).await?))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<String> {
    let target = id.clone();
    with_inventory(&state, move |inv| inv.delete_product(&target))
        .await
        .map_err(|e| {
            ApiError::missing_as_bad_request(e, || {
                format!("couldn't delete a product with id={}. Product not found", id)
            })
        })?;
    tracing::info!(%id, "product deleted");
    Ok(format!("Product id={} successfully deleted", id))
}

pub async fn products_by_supplier(
    State(state): State<AppState>,
    Path(id_sup): Path<String>,
) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(with_inventory(&state, move |inv| inv.products_by_supplier(&id_sup)).await?))
}

// =============================================================================
// Health
// =============================================================================

pub async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
