//! Similarity scoring and ranking over the in-memory category list.

use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use semcat_embeddings::dot_product;

use crate::error::{CategoryError, Result};
use crate::model::{Category, SearchResult};

/// Default number of results returned by a search.
pub const DEFAULT_TOP_K: usize = 20;

/// Default minimum score for a category to be returned.
pub const DEFAULT_THRESHOLD: f32 = 0.75;

/// Per-search knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Maximum number of results.
    pub top_k: usize,

    /// Minimum similarity score (inclusive).
    pub threshold: f32,
}

impl SearchOptions {
    /// Set the result limit.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the score threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Brute-force similarity engine.
///
/// Every category is rescanned per query; the store is expected to hold at
/// most a few thousand entries.
#[derive(Debug, Clone, Default)]
pub struct SimilarityEngine;

impl SimilarityEngine {
    pub fn new() -> Self {
        Self
    }

    /// Score every category against `query`.
    ///
    /// Output order matches `categories`. Any embedding whose length differs
    /// from the query's fails the whole call.
    pub fn score<'a>(
        &self,
        query: &[f32],
        categories: &'a [Category],
    ) -> Result<Vec<(&'a Category, f32)>> {
        categories
            .iter()
            .map(|category| {
                let score = dot_product(query, &category.embedding).map_err(|_| {
                    warn!(
                        "Category {} has a {}-dimensional embedding, query has {}",
                        category.id,
                        category.embedding.len(),
                        query.len()
                    );
                    CategoryError::DimensionMismatch {
                        expected: query.len(),
                        actual: category.embedding.len(),
                    }
                })?;
                Ok((category, score))
            })
            .collect()
    }

    /// Filter, sort and truncate scored categories.
    ///
    /// Entries below `threshold` are dropped, the rest are ordered by
    /// descending score with ties kept in input order, cut to `top_k`, and
    /// numbered from 1.
    pub fn rank(
        &self,
        scored: Vec<(&Category, f32)>,
        options: &SearchOptions,
    ) -> Vec<SearchResult> {
        let total = scored.len();
        let mut kept: Vec<(&Category, f32)> = scored
            .into_iter()
            .filter(|(_, score)| *score >= options.threshold)
            .collect();

        // sort_by_key is stable, which keeps insertion order among ties.
        kept.sort_by_key(|(_, score)| Reverse(OrderedFloat(*score)));
        kept.truncate(options.top_k);

        debug!(
            "Ranked {} of {total} categories (threshold {}, top_k {})",
            kept.len(),
            options.threshold,
            options.top_k
        );

        kept.into_iter()
            .enumerate()
            .map(|(i, (category, score))| SearchResult {
                id: category.id.clone(),
                name: category.name.clone(),
                score,
                rank: i + 1,
            })
            .collect()
    }

    /// Score then rank.
    pub fn search(
        &self,
        query: &[f32],
        categories: &[Category],
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>> {
        let scored = self.score(query, categories)?;
        Ok(self.rank(scored, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn category(name: &str, embedding: Vec<f32>) -> Category {
        Category {
            id: format!("id-{name}"),
            name: name.to_string(),
            embedding,
        }
    }

    fn names(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_score_keeps_input_order() {
        let categories = vec![
            category("x", vec![1.0, 0.0]),
            category("y", vec![0.0, 1.0]),
        ];
        let scored = SimilarityEngine::new()
            .score(&[1.0, 2.0], &categories)
            .unwrap();

        let scores: Vec<f32> = scored.iter().map(|(_, s)| *s).collect();
        assert_eq!(scores, vec![1.0, 2.0]);
        assert_eq!(scored[0].0.name, "x");
    }

    #[test]
    fn test_score_dimension_mismatch() {
        let categories = vec![
            category("ok", vec![1.0, 0.0]),
            category("bad", vec![1.0, 0.0, 0.0]),
        ];
        let err = SimilarityEngine::new()
            .score(&[1.0, 0.0], &categories)
            .unwrap_err();
        assert!(matches!(
            err,
            CategoryError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_rank_threshold_scenario() {
        let a = category("A", vec![]);
        let b = category("B", vec![]);
        let c = category("C", vec![]);
        let scored = vec![(&c, 0.5), (&b, 0.8), (&a, 0.9)];

        let results = SimilarityEngine::new().rank(scored, &SearchOptions::default());

        assert_eq!(names(&results), vec!["A", "B"]);
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[1].rank, 2);
        assert_eq!(results[0].score, 0.9);
    }

    #[test]
    fn test_rank_threshold_is_inclusive() {
        let a = category("A", vec![]);
        let results = SimilarityEngine::new().rank(vec![(&a, 0.75)], &SearchOptions::default());
        assert_eq!(names(&results), vec!["A"]);
    }

    #[test]
    fn test_rank_ties_keep_insertion_order() {
        let first = category("first", vec![]);
        let second = category("second", vec![]);
        let third = category("third", vec![]);
        let scored = vec![(&first, 0.8), (&second, 0.9), (&third, 0.8)];

        let results = SimilarityEngine::new().rank(scored, &SearchOptions::default());
        assert_eq!(names(&results), vec!["second", "first", "third"]);
    }

    #[test]
    fn test_rank_truncates_to_top_k() {
        let categories: Vec<Category> = (0..10)
            .map(|i| category(&format!("c{i}"), vec![]))
            .collect();
        let scored: Vec<(&Category, f32)> = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c, 0.9 + i as f32 * 0.001))
            .collect();

        let options = SearchOptions::default().with_top_k(3);
        let results = SimilarityEngine::new().rank(scored, &options);

        assert_eq!(names(&results), vec!["c9", "c8", "c7"]);
        let ranks: Vec<usize> = results.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_rank_never_returns_below_threshold() {
        let categories: Vec<Category> = (0..20)
            .map(|i| category(&format!("c{i}"), vec![]))
            .collect();
        let scored: Vec<(&Category, f32)> = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c, (i as f32 * 0.37) % 1.0))
            .collect();

        let options = SearchOptions::default().with_threshold(0.5).with_top_k(5);
        let results = SimilarityEngine::new().rank(scored, &options);

        assert!(results.len() <= 5);
        assert!(results.iter().all(|r| r.score >= 0.5));
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
        for (i, r) in results.iter().enumerate() {
            assert_eq!(r.rank, i + 1);
        }
    }

    #[test]
    fn test_search_end_to_end() {
        let categories = vec![
            category("Electronics", vec![1.0, 0.0]),
            category("Books", vec![0.0, 1.0]),
            category("Gadgets", vec![0.8, 0.6]),
        ];

        let results = SimilarityEngine::new()
            .search(&[1.0, 0.0], &categories, &SearchOptions::default())
            .unwrap();

        assert_eq!(names(&results), vec!["Electronics", "Gadgets"]);
    }
}
