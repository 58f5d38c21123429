//! Persistence for precomputed similarity edges
//!
//! Each training run fully replaces the table for its axis. Inserts go
//! through UNNEST in batches so a large edge set never builds a single
//! gigantic statement.
//!
//! ## Database Schema
//!
//! ```sql
//! CREATE TABLE item_similarity (
//!     id BIGSERIAL PRIMARY KEY,
//!     item_id BIGINT NOT NULL,
//!     similar_item_id BIGINT NOT NULL,
//!     score REAL NOT NULL
//! );
//!
//! CREATE INDEX idx_item_similarity_item ON item_similarity(item_id);
//! CREATE INDEX idx_item_similarity_similar ON item_similarity(similar_item_id);
//! ```
//!
//! `user_similarity` has the same shape with user_id/similar_user_id
//! columns.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};
use tracing::{info, instrument};

use crate::knn::SimilarityEdge;

/// Edges inserted per committed batch
pub const INSERT_BATCH_SIZE: usize = 500;

/// Which similarity table a training run replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityAxis {
    Items,
    Users,
}

impl SimilarityAxis {
    /// Target table name
    pub fn table(&self) -> &'static str {
        match self {
            SimilarityAxis::Items => "item_similarity",
            SimilarityAxis::Users => "user_similarity",
        }
    }

    fn source_column(&self) -> &'static str {
        match self {
            SimilarityAxis::Items => "item_id",
            SimilarityAxis::Users => "user_id",
        }
    }

    fn target_column(&self) -> &'static str {
        match self {
            SimilarityAxis::Items => "similar_item_id",
            SimilarityAxis::Users => "similar_user_id",
        }
    }
}

/// Writes similarity edges with full-replace semantics
pub struct SimilarityStore {
    pool: PgPool,
}

impl SimilarityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Replace the table contents with the given edges
    ///
    /// Truncates first, then commits one transaction per batch. A failure
    /// mid-run leaves only the committed batches in place; rerunning the
    /// training job restores a complete set.
    #[instrument(skip(self, edges), fields(table = axis.table(), edges = edges.len()))]
    pub async fn replace_all(&self, axis: SimilarityAxis, edges: &[SimilarityEdge]) -> Result<()> {
        self.truncate(axis).await?;

        let total = edges.len();
        let mut written = 0usize;
        for batch in edges.chunks(INSERT_BATCH_SIZE) {
            let mut tx = self
                .pool
                .begin()
                .await
                .context("Failed to begin batch transaction")?;
            Self::insert_batch(&mut tx, axis, batch).await?;
            tx.commit().await.context("Failed to commit batch")?;

            written += batch.len();
            info!("Stored {}/{} edges in {}", written, total, axis.table());
        }

        Ok(())
    }

    /// Replace the table contents in a single transaction
    ///
    /// The truncate and all batches commit or roll back together, so readers
    /// never observe a partially loaded table. The transaction stays open
    /// for the whole load.
    #[instrument(skip(self, edges), fields(table = axis.table(), edges = edges.len()))]
    pub async fn replace_all_atomic(
        &self,
        axis: SimilarityAxis,
        edges: &[SimilarityEdge],
    ) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin replace transaction")?;

        sqlx::query(&format!("TRUNCATE TABLE {} RESTART IDENTITY", axis.table()))
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to truncate {}", axis.table()))?;

        for batch in edges.chunks(INSERT_BATCH_SIZE) {
            Self::insert_batch(&mut tx, axis, batch).await?;
        }

        tx.commit().await.context("Failed to commit replace")?;

        info!("Stored {} edges in {}", edges.len(), axis.table());
        Ok(())
    }

    /// Number of edges currently stored for the axis
    pub async fn edge_count(&self, axis: SimilarityAxis) -> Result<i64> {
        let row = sqlx::query(&format!("SELECT COUNT(*) AS count FROM {}", axis.table()))
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("Failed to count edges in {}", axis.table()))?;

        Ok(row.try_get("count")?)
    }

    async fn truncate(&self, axis: SimilarityAxis) -> Result<()> {
        sqlx::query(&format!("TRUNCATE TABLE {} RESTART IDENTITY", axis.table()))
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to truncate {}", axis.table()))?;

        Ok(())
    }

    async fn insert_batch(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        axis: SimilarityAxis,
        batch: &[SimilarityEdge],
    ) -> Result<()> {
        let sources: Vec<i64> = batch.iter().map(|e| e.source_id).collect();
        let targets: Vec<i64> = batch.iter().map(|e| e.target_id).collect();
        let scores: Vec<f32> = batch.iter().map(|e| e.score).collect();

        sqlx::query(&format!(
            "INSERT INTO {} ({}, {}, score) \
             SELECT * FROM UNNEST($1::bigint[], $2::bigint[], $3::real[])",
            axis.table(),
            axis.source_column(),
            axis.target_column(),
        ))
        .bind(&sources)
        .bind(&targets)
        .bind(&scores)
        .execute(&mut **tx)
        .await
        .with_context(|| format!("Failed to insert batch into {}", axis.table()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_table_mapping() {
        assert_eq!(SimilarityAxis::Items.table(), "item_similarity");
        assert_eq!(SimilarityAxis::Users.table(), "user_similarity");
    }

    #[test]
    fn test_axis_column_mapping() {
        assert_eq!(SimilarityAxis::Items.source_column(), "item_id");
        assert_eq!(SimilarityAxis::Items.target_column(), "similar_item_id");
        assert_eq!(SimilarityAxis::Users.source_column(), "user_id");
        assert_eq!(SimilarityAxis::Users.target_column(), "similar_user_id");
    }
}
