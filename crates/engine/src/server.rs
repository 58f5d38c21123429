//! HTTP surface of the recommendations service

use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use grocery_recs_core::{
    validate_latitude, validate_limit, validate_longitude, validate_radius_km, DatabasePool,
    RecsError,
};

use crate::recommend::HybridRecommender;
use crate::shops::ShopLocator;

/// Default search radius in kilometres
pub const DEFAULT_RADIUS_KM: f64 = 5.0;
/// Default number of recommended products
pub const DEFAULT_LIMIT: i64 = 20;

/// Application state shared across all handlers
pub struct AppState {
    pub db: DatabasePool,
    pub locator: Arc<dyn ShopLocator>,
    pub recommender: HybridRecommender,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

#[derive(Debug, Deserialize)]
pub struct ShopsQuery {
    pub lat: f64,
    pub lon: f64,
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
}

#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub user_id: i64,
    pub lat: f64,
    pub lon: f64,
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_radius_km() -> f64 {
    DEFAULT_RADIUS_KM
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

/// Health check endpoint
async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: "recs-service".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check endpoint, verifies database connectivity
async fn ready(data: web::Data<AppState>) -> impl Responder {
    if data.db.is_healthy().await {
        HttpResponse::Ok().json(serde_json::json!({ "status": "ready" }))
    } else {
        HttpResponse::ServiceUnavailable().json(serde_json::json!({ "status": "unavailable" }))
    }
}

/// List shops within the search radius, closest first
async fn nearby_shops(
    data: web::Data<AppState>,
    query: web::Query<ShopsQuery>,
) -> Result<HttpResponse, RecsError> {
    validate_latitude(query.lat)?;
    validate_longitude(query.lon)?;
    validate_radius_km(query.radius_km)?;

    let shops = data
        .locator
        .nearby_shops(query.lat, query.lon, query.radius_km)
        .await?;

    Ok(HttpResponse::Ok().json(shops))
}

/// Hybrid product recommendations for a user near a coordinate
async fn recommend_products(
    data: web::Data<AppState>,
    query: web::Query<ProductsQuery>,
) -> Result<HttpResponse, RecsError> {
    validate_latitude(query.lat)?;
    validate_longitude(query.lon)?;
    validate_radius_km(query.radius_km)?;
    validate_limit(query.limit)?;

    let response = data
        .recommender
        .recommend_products(
            query.user_id,
            query.lat,
            query.lon,
            query.radius_km,
            query.limit as usize,
        )
        .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Configure application routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/ready", web::get().to(ready))
        .service(
            web::scope("/recommend")
                .route("/shops", web::get().to(nearby_shops))
                .route("/products", web::get().to(recommend_products)),
        );
}
