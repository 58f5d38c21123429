//! Sparse user-item interaction matrix
//!
//! Builds dense indices over raw ids in first-seen order and exposes both
//! axes of the same cells: user rows for user-user similarity and item rows
//! (the transpose) for item-item similarity.

use std::collections::HashMap;

use crate::interactions::InteractionEvent;

/// Sparse interaction matrix with id mappings on both axes
#[derive(Debug, Clone, Default)]
pub struct InteractionMatrix {
    /// (user index, item index) -> accumulated weight
    cells: HashMap<(usize, usize), f32>,
    user_index: HashMap<i64, usize>,
    item_index: HashMap<i64, usize>,
    user_ids: Vec<i64>,
    item_ids: Vec<i64>,
}

impl InteractionMatrix {
    /// Build the matrix from an ordered event sequence
    ///
    /// Indices are assigned in first-seen order, so the same event sequence
    /// always produces the same matrix. Repeated (user, product) pairs
    /// accumulate their weights.
    pub fn from_events(events: &[InteractionEvent]) -> Self {
        let mut matrix = InteractionMatrix::default();

        for event in events {
            let user_idx = *matrix.user_index.entry(event.user_id).or_insert_with(|| {
                let idx = matrix.user_ids.len();
                matrix.user_ids.push(event.user_id);
                idx
            });
            let item_idx = *matrix.item_index.entry(event.product_id).or_insert_with(|| {
                let idx = matrix.item_ids.len();
                matrix.item_ids.push(event.product_id);
                idx
            });

            *matrix.cells.entry((user_idx, item_idx)).or_insert(0.0) += event.weight;
        }

        matrix
    }

    pub fn num_users(&self) -> usize {
        self.user_ids.len()
    }

    pub fn num_items(&self) -> usize {
        self.item_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// User axis: one row per user, columns are item indices
    pub fn user_rows(&self) -> SparseRows {
        let mut rows = vec![Vec::new(); self.user_ids.len()];
        for (&(user_idx, item_idx), &weight) in &self.cells {
            rows[user_idx].push((item_idx as u32, weight));
        }
        SparseRows::new(rows, self.user_ids.clone())
    }

    /// Item axis: the transpose, one row per item, columns are user indices
    pub fn item_rows(&self) -> SparseRows {
        let mut rows = vec![Vec::new(); self.item_ids.len()];
        for (&(user_idx, item_idx), &weight) in &self.cells {
            rows[item_idx].push((user_idx as u32, weight));
        }
        SparseRows::new(rows, self.item_ids.clone())
    }
}

/// One similarity axis: sparse rows sorted by column, plus the raw id of
/// each row
#[derive(Debug, Clone)]
pub struct SparseRows {
    rows: Vec<Vec<(u32, f32)>>,
    ids: Vec<i64>,
}

impl SparseRows {
    fn new(mut rows: Vec<Vec<(u32, f32)>>, ids: Vec<i64>) -> Self {
        for row in &mut rows {
            row.sort_unstable_by_key(|&(col, _)| col);
        }
        Self { rows, ids }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<(u32, f32)>] {
        &self.rows
    }

    pub fn ids(&self) -> &[i64] {
        &self.ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(user_id: i64, product_id: i64, weight: f32) -> InteractionEvent {
        InteractionEvent {
            user_id,
            product_id,
            weight,
            kind: crate::interactions::EventKind::View,
        }
    }

    #[test]
    fn test_first_seen_index_order() {
        let matrix = InteractionMatrix::from_events(&[
            event(50, 7, 1.0),
            event(10, 9, 1.0),
            event(50, 9, 1.0),
        ]);

        assert_eq!(matrix.user_rows().ids(), &[50, 10]);
        assert_eq!(matrix.item_rows().ids(), &[7, 9]);
    }

    #[test]
    fn test_repeated_pairs_accumulate() {
        let matrix = InteractionMatrix::from_events(&[
            event(1, 100, 1.0),
            event(1, 100, 3.0),
        ]);

        let rows = matrix.user_rows();
        assert_eq!(rows.rows()[0], vec![(0, 4.0)]);
    }

    #[test]
    fn test_transpose_carries_same_weights() {
        let matrix = InteractionMatrix::from_events(&[
            event(1, 100, 2.0),
            event(2, 100, 5.0),
            event(1, 200, 1.0),
        ]);

        let items = matrix.item_rows();
        // Item 100 is row 0 and sees users 0 and 1.
        assert_eq!(items.rows()[0], vec![(0, 2.0), (1, 5.0)]);
        // Item 200 is row 1 and sees only user 0.
        assert_eq!(items.rows()[1], vec![(0, 1.0)]);
    }

    #[test]
    fn test_columns_are_sorted() {
        let matrix = InteractionMatrix::from_events(&[
            event(1, 100, 1.0),
            event(2, 200, 1.0),
            event(2, 100, 1.0),
            event(1, 200, 1.0),
        ]);

        for row in matrix.item_rows().rows() {
            let cols: Vec<u32> = row.iter().map(|&(col, _)| col).collect();
            let mut sorted = cols.clone();
            sorted.sort_unstable();
            assert_eq!(cols, sorted);
        }
    }

    #[test]
    fn test_empty_events() {
        let matrix = InteractionMatrix::from_events(&[]);
        assert!(matrix.is_empty());
        assert_eq!(matrix.num_users(), 0);
        assert_eq!(matrix.num_items(), 0);
    }
}
