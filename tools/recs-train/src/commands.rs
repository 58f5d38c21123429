use anyhow::{Context, Result};
use colored::Colorize;
use sqlx::{postgres::PgPoolOptions, Executor, PgPool, Row};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use grocery_recs_engine::interactions::InteractionStore;
use grocery_recs_engine::knn::top_k_neighbors;
use grocery_recs_engine::matrix::InteractionMatrix;
use grocery_recs_engine::store::{SimilarityAxis, SimilarityStore};

const SCHEMA_SQL: &str = include_str!("../sql/schema.sql");
const SEED_SQL: &str = include_str!("../sql/seed.sql");

/// Which similarity tables a training run refreshes
#[derive(Debug, Clone, Copy)]
pub enum TrainTarget {
    Items,
    Users,
    All,
}

impl TrainTarget {
    fn axes(&self) -> Vec<SimilarityAxis> {
        match self {
            TrainTarget::Items => vec![SimilarityAxis::Items],
            TrainTarget::Users => vec![SimilarityAxis::Users],
            TrainTarget::All => vec![SimilarityAxis::Items, SimilarityAxis::Users],
        }
    }
}

pub async fn init(database_url: &str, seed: bool, dry_run: bool) -> Result<()> {
    println!("{}", "Initialising schema...".cyan().bold());

    if dry_run {
        println!("\n{}", "DRY RUN - No changes applied".yellow().bold());
        return Ok(());
    }

    let pool = create_pool(database_url).await?;

    pool.execute(SCHEMA_SQL)
        .await
        .context("Failed to apply schema")?;
    println!("{}", "Schema applied.".green());

    if seed {
        pool.execute(SEED_SQL)
            .await
            .context("Failed to load demo data")?;
        println!("{}", "Demo data loaded.".green());
    }

    Ok(())
}

pub async fn train(
    database_url: &str,
    target: TrainTarget,
    top_k: usize,
    atomic: bool,
    dry_run: bool,
) -> Result<()> {
    println!("{}", "Loading interaction events...".cyan().bold());

    let pool = create_pool(database_url).await?;
    let interactions = InteractionStore::new(pool.clone());

    let events = interactions.load_training_events().await?;
    if events.is_empty() {
        println!("{}", "No interaction data found. Nothing to train.".yellow());
        return Ok(());
    }

    let matrix = InteractionMatrix::from_events(&events);
    println!(
        "  {} {} events, {} users, {} items",
        "→".cyan(),
        events.len(),
        matrix.num_users(),
        matrix.num_items()
    );

    let store = SimilarityStore::new(pool);

    for axis in target.axes() {
        let started = Instant::now();
        let rows = match axis {
            SimilarityAxis::Items => matrix.item_rows(),
            SimilarityAxis::Users => matrix.user_rows(),
        };

        let edges = top_k_neighbors(&rows, top_k);
        println!(
            "  {} {} edges for {} in {:.2?}",
            "→".cyan(),
            edges.len(),
            axis.table(),
            started.elapsed()
        );

        if dry_run {
            continue;
        }

        if atomic {
            store.replace_all_atomic(axis, &edges).await?;
        } else {
            store.replace_all(axis, &edges).await?;
        }
    }

    if dry_run {
        println!("\n{}", "DRY RUN - No changes applied".yellow().bold());
    } else {
        println!("\n{}", "Training complete!".green().bold());
    }

    Ok(())
}

pub async fn preview(database_url: &str, user_id: i64, limit: usize) -> Result<()> {
    let pool = create_pool(database_url).await?;
    let interactions = InteractionStore::new(pool.clone());

    let seen = interactions.seen_product_ids(user_id).await?;

    let picks = if seen.is_empty() {
        Vec::new()
    } else {
        let rows = sqlx::query(
            "SELECT similar_item_id, score FROM item_similarity WHERE item_id = ANY($1)",
        )
        .bind(&seen)
        .fetch_all(&pool)
        .await
        .context("Failed to load similarity edges")?;

        let mut edges = Vec::with_capacity(rows.len());
        for row in rows {
            let similar_id: i64 = row.try_get("similar_item_id")?;
            let score: f32 = row.try_get("score")?;
            edges.push((similar_id, score));
        }

        aggregate_neighbors(&edges, &seen, limit)
    };

    if picks.is_empty() {
        println!(
            "{}",
            "No similarity data for this user, falling back to trending.".yellow()
        );
        return print_trending(&pool, limit).await;
    }

    println!(
        "{}",
        format!("Top {} recommendations for user {}:", picks.len(), user_id)
            .cyan()
            .bold()
    );

    let ids: Vec<i64> = picks.iter().map(|&(id, _)| id).collect();
    let rows = sqlx::query("SELECT id, name FROM products WHERE id = ANY($1)")
        .bind(&ids)
        .fetch_all(&pool)
        .await
        .context("Failed to resolve product names")?;

    let mut names: HashMap<i64, String> = HashMap::with_capacity(rows.len());
    for row in rows {
        names.insert(row.try_get("id")?, row.try_get("name")?);
    }

    for (rank, &(product_id, score)) in picks.iter().enumerate() {
        let name = names
            .get(&product_id)
            .cloned()
            .unwrap_or_else(|| format!("product {}", product_id));
        println!(
            "  {}. {} {}",
            rank + 1,
            name.white(),
            format!("(score {:.3})", score).dimmed()
        );
    }

    Ok(())
}

async fn print_trending(pool: &PgPool, limit: usize) -> Result<()> {
    let rows = sqlx::query(
        "SELECT name FROM products ORDER BY weekly_sales DESC, daily_views DESC, id ASC LIMIT $1",
    )
    .bind(limit as i64)
    .fetch_all(pool)
    .await
    .context("Failed to load trending products")?;

    if rows.is_empty() {
        println!("{}", "No products available.".yellow());
        return Ok(());
    }

    println!("{}", "Trending products:".cyan().bold());
    for (rank, row) in rows.iter().enumerate() {
        let name: String = row.try_get("name")?;
        println!("  {}. {}", rank + 1, name.white());
    }

    Ok(())
}

async fn create_pool(database_url: &str) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
        .context("Failed to connect to database")
}

/// Sum similarity mass per unseen neighbour and keep the strongest
fn aggregate_neighbors(edges: &[(i64, f32)], seen: &[i64], limit: usize) -> Vec<(i64, f32)> {
    let seen: HashSet<i64> = seen.iter().copied().collect();

    let mut scores: HashMap<i64, f32> = HashMap::new();
    for &(similar_id, score) in edges {
        if seen.contains(&similar_id) {
            continue;
        }
        *scores.entry(similar_id).or_insert(0.0) += score;
    }

    let mut ranked: Vec<(i64, f32)> = scores.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_neighbors_excludes_seen() {
        let edges = vec![(1, 0.9), (2, 0.8), (3, 0.7)];
        let picks = aggregate_neighbors(&edges, &[2], 10);

        let ids: Vec<i64> = picks.iter().map(|&(id, _)| id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_aggregate_neighbors_sums_repeated_targets() {
        // Product 5 is similar to two different seen products.
        let edges = vec![(5, 0.4), (5, 0.5), (6, 0.6)];
        let picks = aggregate_neighbors(&edges, &[], 10);

        assert_eq!(picks[0].0, 5);
        assert!((picks[0].1 - 0.9).abs() < 1e-6);
        assert_eq!(picks[1].0, 6);
    }

    #[test]
    fn test_aggregate_neighbors_truncates_and_breaks_ties_by_id() {
        let edges = vec![(3, 0.5), (1, 0.5), (2, 0.5)];
        let picks = aggregate_neighbors(&edges, &[], 2);

        let ids: Vec<i64> = picks.iter().map(|&(id, _)| id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
