//! Geographic shop lookup
//!
//! Distance is computed in SQL with the haversine formula over plain
//! latitude/longitude columns. The trait keeps the recommender independent
//! of how shops are resolved.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use sqlx::{PgPool, Row};
use tracing::debug;

/// Hard cap on shops returned by a single lookup
pub const MAX_NEARBY_SHOPS: i64 = 200;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// A shop within the search radius
#[derive(Debug, Clone, Serialize)]
pub struct NearbyShop {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_km: f64,
}

/// Source of shops near a coordinate
#[async_trait]
pub trait ShopLocator: Send + Sync {
    /// Shops within `radius_km` of the coordinate, closest first
    async fn nearby_shops(&self, lat: f64, lon: f64, radius_km: f64) -> Result<Vec<NearbyShop>>;
}

/// Postgres-backed locator using a haversine distance query
pub struct PostgresShopLocator {
    pool: PgPool,
}

impl PostgresShopLocator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShopLocator for PostgresShopLocator {
    async fn nearby_shops(&self, lat: f64, lon: f64, radius_km: f64) -> Result<Vec<NearbyShop>> {
        // least() keeps rounding noise from pushing the asin argument past 1.
        let rows = sqlx::query(
            r#"
            SELECT id, name, address, latitude, longitude, distance_km
            FROM (
                SELECT id, name, address, latitude, longitude,
                       2.0 * $4 * asin(least(1.0, sqrt(
                           pow(sin(radians(latitude - $1) / 2.0), 2)
                           + cos(radians($1)) * cos(radians(latitude))
                             * pow(sin(radians(longitude - $2) / 2.0), 2)
                       ))) AS distance_km
                FROM shops
            ) nearby
            WHERE distance_km <= $3
            ORDER BY distance_km ASC
            LIMIT $5
            "#,
        )
        .bind(lat)
        .bind(lon)
        .bind(radius_km)
        .bind(EARTH_RADIUS_KM)
        .bind(MAX_NEARBY_SHOPS)
        .fetch_all(&self.pool)
        .await
        .context("Failed to query nearby shops")?;

        let mut shops = Vec::with_capacity(rows.len());
        for row in rows {
            shops.push(NearbyShop {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                address: row.try_get("address")?,
                latitude: row.try_get("latitude")?,
                longitude: row.try_get("longitude")?,
                distance_km: round_km(row.try_get("distance_km")?),
            });
        }

        debug!("Found {} shops within {} km", shops.len(), radius_km);
        Ok(shops)
    }
}

/// Round a distance to three decimals (metre precision)
pub(crate) fn round_km(distance_km: f64) -> f64 {
    (distance_km * 1000.0).round() / 1000.0
}
