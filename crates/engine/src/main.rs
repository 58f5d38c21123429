//! Recommendations Service - Nearby Shops and Hybrid Product Recommendations
//!
//! Port: 8083
//! Serves precomputed similarity tables blended with live shop and
//! popularity signals.

use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use tracing::info;

use grocery_recs_core::{load_dotenv, DatabasePool};
use grocery_recs_engine::server::{self, AppState};
use grocery_recs_engine::shops::{PostgresShopLocator, ShopLocator};
use grocery_recs_engine::{EngineConfig, HybridRecommender};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .json()
        .init();

    let config = EngineConfig::load()?;
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    info!("Starting Recommendations Service on {}", bind_addr);

    let db = DatabasePool::new(&config.database_config()).await?;
    let locator: Arc<dyn ShopLocator> = Arc::new(PostgresShopLocator::new(db.pool().clone()));
    let recommender =
        HybridRecommender::new(db.pool().clone(), locator.clone()).with_weights(config.scoring);

    let app_state = web::Data::new(AppState {
        db,
        locator,
        recommender,
    });

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(server::configure_routes)
            .wrap(actix_web::middleware::Logger::default())
    })
    .workers(config.server.workers.unwrap_or_else(num_cpus::get))
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}
