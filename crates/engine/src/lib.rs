//! Grocery recommendations engine
//!
//! Implements both halves of the recommendation pipeline: the offline
//! trainer that turns raw view and purchase events into k-nearest-neighbour
//! similarity tables, and the online hybrid scorer that blends those tables
//! with category affinity, trending popularity and shop proximity.

pub mod affinity;
pub mod config;
pub mod interactions;
pub mod knn;
pub mod matrix;
pub mod recommend;
pub mod scoring;
pub mod server;
pub mod shops;
pub mod store;

// Re-export key types
pub use affinity::category_affinity;
pub use config::EngineConfig;
pub use interactions::{AffinitySignal, EventKind, InteractionEvent, InteractionStore};
pub use knn::{top_k_neighbors, SimilarityEdge, DEFAULT_TOP_K};
pub use matrix::{InteractionMatrix, SparseRows};
pub use recommend::{
    Candidate, HybridRecommender, ProductRecommendation, RecommendationsResponse,
};
pub use scoring::ScoringWeights;
pub use shops::{NearbyShop, PostgresShopLocator, ShopLocator};
pub use store::{SimilarityAxis, SimilarityStore, INSERT_BATCH_SIZE};
