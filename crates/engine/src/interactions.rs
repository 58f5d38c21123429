//! Implicit feedback event access and weighting policies
//!
//! Views and purchases feed two consumers with different weighting rules:
//! the training matrix, where a purchase counts three times per unit bought,
//! and category affinity, where a purchase counts double a view and always
//! at least one unit. Both policies live here so nothing else hardcodes
//! event weights.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};

/// Implicit feedback event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    View,
    Purchase,
}

impl EventKind {
    /// Weight of this event in the training matrix
    pub fn training_weight(&self, quantity: i64) -> f32 {
        match self {
            EventKind::View => 1.0,
            EventKind::Purchase => 3.0 * quantity as f32,
        }
    }

    /// Weight of this event in category affinity
    ///
    /// Purchases always count at least one unit, so a zero-quantity row
    /// still registers as a purchase signal.
    pub fn affinity_weight(&self, quantity: i64) -> f64 {
        match self {
            EventKind::View => 1.0,
            EventKind::Purchase => 2.0 * quantity.max(1) as f64,
        }
    }
}

/// One weighted user-product interaction
#[derive(Debug, Clone)]
pub struct InteractionEvent {
    pub user_id: i64,
    pub product_id: i64,
    pub weight: f32,
    pub kind: EventKind,
}

/// One category-tagged event used for affinity scoring
#[derive(Debug, Clone)]
pub struct AffinitySignal {
    pub category_id: i64,
    pub kind: EventKind,
    pub quantity: i64,
}

/// Typed access to the raw event tables
pub struct InteractionStore {
    pool: PgPool,
}

impl InteractionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load every interaction event, weighted for training
    ///
    /// Views and purchases are unioned without deduplication; a product a
    /// user both viewed and bought contributes once per event. Rows come
    /// back ordered by (source, event id) so downstream index assignment
    /// is reproducible across runs.
    pub async fn load_training_events(&self) -> Result<Vec<InteractionEvent>> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, product_id, src, quantity
            FROM (
                SELECT 0 AS src, id, user_id, product_id, 1::bigint AS quantity
                FROM product_view_events
                UNION ALL
                SELECT 1 AS src, id, user_id, product_id, quantity
                FROM purchase_events
            ) events
            ORDER BY src, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to load interaction events")?;

        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            let src: i32 = row.try_get("src")?;
            let quantity: i64 = row.try_get("quantity")?;
            let kind = if src == 0 {
                EventKind::View
            } else {
                EventKind::Purchase
            };

            events.push(InteractionEvent {
                user_id: row.try_get("user_id")?,
                product_id: row.try_get("product_id")?,
                weight: kind.training_weight(quantity),
                kind,
            });
        }

        Ok(events)
    }

    /// Load one user's category-tagged events
    ///
    /// Events on products without a category carry no affinity signal and
    /// are filtered out in SQL.
    pub async fn affinity_signals(&self, user_id: i64) -> Result<Vec<AffinitySignal>> {
        let rows = sqlx::query(
            r#"
            SELECT category_id, src, quantity
            FROM (
                SELECT p.category_id, 0 AS src, 1::bigint AS quantity, e.id
                FROM product_view_events e
                JOIN products p ON p.id = e.product_id
                WHERE e.user_id = $1 AND p.category_id IS NOT NULL
                UNION ALL
                SELECT p.category_id, 1 AS src, e.quantity, e.id
                FROM purchase_events e
                JOIN products p ON p.id = e.product_id
                WHERE e.user_id = $1 AND p.category_id IS NOT NULL
            ) signals
            ORDER BY src, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load affinity signals")?;

        let mut signals = Vec::with_capacity(rows.len());
        for row in rows {
            let src: i32 = row.try_get("src")?;
            signals.push(AffinitySignal {
                category_id: row.try_get("category_id")?,
                kind: if src == 0 {
                    EventKind::View
                } else {
                    EventKind::Purchase
                },
                quantity: row.try_get("quantity")?,
            });
        }

        Ok(signals)
    }

    /// Distinct product ids the user has viewed or purchased
    pub async fn seen_product_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        let rows = sqlx::query(
            r#"
            SELECT product_id FROM product_view_events WHERE user_id = $1
            UNION
            SELECT product_id FROM purchase_events WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load seen products")?;

        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            ids.push(row.try_get("product_id")?);
        }

        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_training_weights() {
        assert_eq!(EventKind::View.training_weight(1), 1.0);
        assert_eq!(EventKind::Purchase.training_weight(1), 3.0);
        assert_eq!(EventKind::Purchase.training_weight(4), 12.0);
    }

    #[test]
    fn test_affinity_weights() {
        assert_eq!(EventKind::View.affinity_weight(1), 1.0);
        assert_eq!(EventKind::Purchase.affinity_weight(1), 2.0);
        assert_eq!(EventKind::Purchase.affinity_weight(3), 6.0);
    }

    #[test]
    fn test_purchase_affinity_counts_at_least_one_unit() {
        assert_eq!(EventKind::Purchase.affinity_weight(0), 2.0);
    }
}
