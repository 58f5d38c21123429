//! Hybrid product recommendations
//!
//! Blends four signals for every candidate product found in nearby shops:
//! the user's category affinity, squashed trending popularity, proximity of
//! the owning shop, and the strongest similarity edge from anything the
//! user has interacted with.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};

use crate::affinity::category_affinity;
use crate::interactions::InteractionStore;
use crate::scoring::{proximity_factor, squash, trending_score, ScoringWeights};
use crate::shops::{NearbyShop, ShopLocator};

/// Affinity level above which a product matches recent preferences
const STRONG_AFFINITY: f64 = 0.5;
/// Squashed trending level above which a product counts as trending
const STRONG_TRENDING: f64 = 0.5;

/// A candidate product pulled from nearby shops
#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: i64,
    pub name: String,
    pub category_id: Option<i64>,
    pub shop_id: i64,
    pub daily_views: i64,
    pub weekly_sales: i64,
}

/// One ranked recommendation
#[derive(Debug, Clone, Serialize)]
pub struct ProductRecommendation {
    pub product_id: i64,
    pub product_name: String,
    pub shop_id: i64,
    pub category_id: Option<i64>,
    pub score: f64,
    pub cf_score: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}

/// Response payload of the products endpoint
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationsResponse {
    pub shops: Vec<NearbyShop>,
    pub recommended_products: Vec<ProductRecommendation>,
}

/// Hybrid recommender combining offline similarity with fresh signals
pub struct HybridRecommender {
    pool: PgPool,
    locator: Arc<dyn ShopLocator>,
    weights: ScoringWeights,
}

impl HybridRecommender {
    pub fn new(pool: PgPool, locator: Arc<dyn ShopLocator>) -> Self {
        Self {
            pool,
            locator,
            weights: ScoringWeights::default(),
        }
    }

    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Recommend products for a user near a coordinate
    ///
    /// No shops in range short-circuits to an empty response without
    /// touching the product or similarity tables.
    #[instrument(skip(self))]
    pub async fn recommend_products(
        &self,
        user_id: i64,
        lat: f64,
        lon: f64,
        radius_km: f64,
        limit: usize,
    ) -> Result<RecommendationsResponse> {
        let shops = self.locator.nearby_shops(lat, lon, radius_km).await?;
        if shops.is_empty() {
            return Ok(RecommendationsResponse {
                shops,
                recommended_products: Vec::new(),
            });
        }

        let shop_ids: Vec<i64> = shops.iter().map(|s| s.id).collect();
        let shop_distances: HashMap<i64, f64> =
            shops.iter().map(|s| (s.id, s.distance_km)).collect();

        let candidates = self.candidates_in_shops(&shop_ids).await?;
        if candidates.is_empty() {
            return Ok(RecommendationsResponse {
                shops,
                recommended_products: Vec::new(),
            });
        }

        let interactions = InteractionStore::new(self.pool.clone());
        let signals = interactions.affinity_signals(user_id).await?;
        let affinity = category_affinity(&signals);

        let candidate_ids: Vec<i64> = candidates.iter().map(|c| c.id).collect();
        let cf_scores = self.cf_scores(user_id, &candidate_ids).await?;

        let recommended_products = rank_candidates(
            &self.weights,
            &candidates,
            &affinity,
            &shop_distances,
            &cf_scores,
            radius_km,
            limit,
        );

        debug!(
            "Ranked {} of {} candidates for user {}",
            recommended_products.len(),
            candidates.len(),
            user_id
        );

        Ok(RecommendationsResponse {
            shops,
            recommended_products,
        })
    }

    /// All products sold in the given shops, with fresh popularity counters
    async fn candidates_in_shops(&self, shop_ids: &[i64]) -> Result<Vec<Candidate>> {
        let rows = sqlx::query(
            r#"
            SELECT p.id, p.name, p.category_id, p.shop_id,
                   COALESCE(p.daily_views, 0) AS daily_views,
                   COALESCE(p.weekly_sales, 0) AS weekly_sales
            FROM products p
            WHERE p.shop_id = ANY($1)
            "#,
        )
        .bind(shop_ids)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load candidate products")?;

        let mut candidates = Vec::with_capacity(rows.len());
        for row in rows {
            candidates.push(Candidate {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                category_id: row.try_get("category_id")?,
                shop_id: row.try_get("shop_id")?,
                daily_views: row.try_get("daily_views")?,
                weekly_sales: row.try_get("weekly_sales")?,
            });
        }

        Ok(candidates)
    }

    /// Strongest similarity edge per candidate from anything the user has seen
    async fn cf_scores(
        &self,
        user_id: i64,
        candidate_ids: &[i64],
    ) -> Result<HashMap<i64, f64>> {
        let rows = sqlx::query(
            r#"
            SELECT similar_item_id AS product_id, MAX(score) AS score
            FROM item_similarity
            WHERE similar_item_id = ANY($2)
              AND item_id IN (
                  SELECT product_id FROM product_view_events WHERE user_id = $1
                  UNION
                  SELECT product_id FROM purchase_events WHERE user_id = $1
              )
            GROUP BY similar_item_id
            "#,
        )
        .bind(user_id)
        .bind(candidate_ids)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load collaborative filtering scores")?;

        let mut scores = HashMap::with_capacity(rows.len());
        for row in rows {
            let product_id: i64 = row.try_get("product_id")?;
            let score: f32 = row.try_get("score")?;
            scores.insert(product_id, score as f64);
        }

        Ok(scores)
    }
}

/// Rank candidates by the blended hybrid score
///
/// The ordering is total: score descending, ties broken by ascending
/// product id, so the same inputs always rank the same way. A candidate
/// without a category contributes zero affinity; a candidate whose shop is
/// missing from the distance map falls back to the search radius.
pub fn rank_candidates(
    weights: &ScoringWeights,
    candidates: &[Candidate],
    affinity: &HashMap<i64, f64>,
    shop_distances: &HashMap<i64, f64>,
    cf_scores: &HashMap<i64, f64>,
    radius_km: f64,
    limit: usize,
) -> Vec<ProductRecommendation> {
    let mut ranked: Vec<ProductRecommendation> = candidates
        .iter()
        .map(|candidate| {
            let category_score = candidate
                .category_id
                .and_then(|category_id| affinity.get(&category_id).copied())
                .unwrap_or(0.0);
            let squashed_trending =
                squash(trending_score(candidate.daily_views, candidate.weekly_sales));
            let distance_km = shop_distances
                .get(&candidate.shop_id)
                .copied()
                .unwrap_or(radius_km);
            let proximity = proximity_factor(distance_km);
            let cf = cf_scores.get(&candidate.id).copied().unwrap_or(0.0);

            let score = weights.blend(category_score, squashed_trending, proximity, cf);

            let mut reasons = Vec::new();
            if category_score >= STRONG_AFFINITY {
                reasons.push("matches_recent_preferences".to_string());
            }
            if squashed_trending >= STRONG_TRENDING {
                reasons.push("trending_nearby".to_string());
            }
            if cf > 0.0 {
                reasons.push("similar_to_past_purchases".to_string());
            }

            ProductRecommendation {
                product_id: candidate.id,
                product_name: candidate.name.clone(),
                shop_id: candidate.shop_id,
                category_id: candidate.category_id,
                score,
                cf_score: cf,
                reasons,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: i64, category_id: Option<i64>, shop_id: i64) -> Candidate {
        Candidate {
            id,
            name: format!("product-{}", id),
            category_id,
            shop_id,
            daily_views: 0,
            weekly_sales: 0,
        }
    }

    #[test]
    fn test_closer_shop_ranks_first() {
        let candidates = vec![candidate(1, None, 10), candidate(2, None, 20)];
        let distances = HashMap::from([(10, 4.5), (20, 0.2)]);

        let ranked = rank_candidates(
            &ScoringWeights::default(),
            &candidates,
            &HashMap::new(),
            &distances,
            &HashMap::new(),
            5.0,
            10,
        );

        assert_eq!(ranked[0].product_id, 2);
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn test_ranking_is_input_order_independent() {
        let mut candidates = vec![
            candidate(3, Some(1), 10),
            candidate(1, None, 10),
            candidate(2, Some(2), 10),
        ];
        let affinity = HashMap::from([(1, 1.0), (2, 0.4)]);
        let distances = HashMap::from([(10, 1.0)]);

        let forward = rank_candidates(
            &ScoringWeights::default(),
            &candidates,
            &affinity,
            &distances,
            &HashMap::new(),
            5.0,
            10,
        );

        candidates.reverse();
        let backward = rank_candidates(
            &ScoringWeights::default(),
            &candidates,
            &affinity,
            &distances,
            &HashMap::new(),
            5.0,
            10,
        );

        let forward_ids: Vec<i64> = forward.iter().map(|r| r.product_id).collect();
        let backward_ids: Vec<i64> = backward.iter().map(|r| r.product_id).collect();
        assert_eq!(forward_ids, backward_ids);
    }

    #[test]
    fn test_score_ties_break_by_product_id() {
        let candidates = vec![
            candidate(9, None, 10),
            candidate(3, None, 10),
            candidate(6, None, 10),
        ];
        let distances = HashMap::from([(10, 1.0)]);

        let ranked = rank_candidates(
            &ScoringWeights::default(),
            &candidates,
            &HashMap::new(),
            &distances,
            &HashMap::new(),
            5.0,
            10,
        );

        let ids: Vec<i64> = ranked.iter().map(|r| r.product_id).collect();
        assert_eq!(ids, vec![3, 6, 9]);
    }

    #[test]
    fn test_limit_truncates_results() {
        let candidates: Vec<Candidate> =
            (1..=30).map(|id| candidate(id, None, 10)).collect();
        let distances = HashMap::from([(10, 1.0)]);

        let ranked = rank_candidates(
            &ScoringWeights::default(),
            &candidates,
            &HashMap::new(),
            &distances,
            &HashMap::new(),
            5.0,
            20,
        );

        assert_eq!(ranked.len(), 20);
    }

    #[test]
    fn test_unknown_shop_falls_back_to_radius() {
        let candidates = vec![candidate(1, None, 10), candidate(2, None, 99)];
        let distances = HashMap::from([(10, 5.0)]);

        let ranked = rank_candidates(
            &ScoringWeights::default(),
            &candidates,
            &HashMap::new(),
            &distances,
            &HashMap::new(),
            5.0,
            10,
        );

        // Both sit at 5 km, so the tie resolves by product id.
        assert_eq!(ranked[0].product_id, 1);
        assert_eq!(ranked[0].score, ranked[1].score);
    }

    #[test]
    fn test_cf_signal_lifts_score_and_tags_reason() {
        let candidates = vec![candidate(1, None, 10), candidate(2, None, 10)];
        let distances = HashMap::from([(10, 1.0)]);
        let cf = HashMap::from([(2, 0.8)]);

        let ranked = rank_candidates(
            &ScoringWeights::default(),
            &candidates,
            &HashMap::new(),
            &distances,
            &cf,
            5.0,
            10,
        );

        assert_eq!(ranked[0].product_id, 2);
        assert_eq!(ranked[0].cf_score, 0.8);
        assert!(ranked[0]
            .reasons
            .contains(&"similar_to_past_purchases".to_string()));
        assert!(ranked[1].reasons.is_empty());
    }

    #[test]
    fn test_strong_affinity_tags_reason() {
        let candidates = vec![candidate(1, Some(7), 10)];
        let affinity = HashMap::from([(7, 0.9)]);
        let distances = HashMap::from([(10, 1.0)]);

        let ranked = rank_candidates(
            &ScoringWeights::default(),
            &candidates,
            &affinity,
            &distances,
            &HashMap::new(),
            5.0,
            10,
        );

        assert!(ranked[0]
            .reasons
            .contains(&"matches_recent_preferences".to_string()));
    }

    #[test]
    fn test_trending_product_tags_reason() {
        let mut hot = candidate(1, None, 10);
        hot.daily_views = 500;
        hot.weekly_sales = 120;
        let candidates = vec![hot, candidate(2, None, 10)];
        let distances = HashMap::from([(10, 1.0)]);

        let ranked = rank_candidates(
            &ScoringWeights::default(),
            &candidates,
            &HashMap::new(),
            &distances,
            &HashMap::new(),
            5.0,
            10,
        );

        assert_eq!(ranked[0].product_id, 1);
        assert!(ranked[0].reasons.contains(&"trending_nearby".to_string()));
        assert!(!ranked[1].reasons.contains(&"trending_nearby".to_string()));
    }

    #[test]
    fn test_uncategorised_candidate_gets_zero_affinity() {
        let candidates = vec![candidate(1, None, 10), candidate(2, Some(7), 10)];
        let affinity = HashMap::from([(7, 1.0)]);
        let distances = HashMap::from([(10, 1.0)]);

        let ranked = rank_candidates(
            &ScoringWeights::default(),
            &candidates,
            &affinity,
            &distances,
            &HashMap::new(),
            5.0,
            10,
        );

        assert_eq!(ranked[0].product_id, 2);
        let lift = ranked[0].score - ranked[1].score;
        assert!((lift - 0.35).abs() < 1e-12);
    }
}
