//! Aggregate research metrics

use super::Database;
use crate::error::Result;
use rusqlite::params;

/// Number of feedback entries with a given rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct RatingBucket {
    pub rating: i64,
    pub count: usize,
}

/// Dashboard metrics
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ResearchMetrics {
    pub total_queries: usize,
    pub total_runs: usize,
    pub completed_queries: usize,
    pub failed_queries: usize,
    pub total_feedback_count: usize,
    pub avg_confidence: Option<f64>,
    pub avg_duration_ms: Option<f64>,
    pub avg_rating: Option<f64>,
    /// Always five buckets, ratings 1 through 5
    pub rating_distribution: Vec<RatingBucket>,
}

impl Database {
    fn count(&self, sql: &str) -> Result<usize> {
        let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(n as usize)
    }

    /// Compute research metrics
    pub fn research_metrics(&self) -> Result<ResearchMetrics> {
        let total_queries = self.count("SELECT COUNT(*) FROM research_queries")?;
        let total_runs = self.count("SELECT COUNT(*) FROM research_results")?;
        let completed_queries =
            self.count("SELECT COUNT(*) FROM research_queries WHERE status = 'completed'")?;
        let failed_queries =
            self.count("SELECT COUNT(*) FROM research_queries WHERE status = 'failed'")?;
        let total_feedback_count = self.count("SELECT COUNT(*) FROM user_feedback")?;

        let (avg_confidence, avg_duration_ms): (Option<f64>, Option<f64>) = self.conn.query_row(
            "SELECT AVG(confidence), AVG(duration_ms) FROM research_results",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let avg_rating: Option<f64> = self.conn.query_row(
            "SELECT AVG(rating) FROM user_feedback WHERE rating IS NOT NULL",
            [],
            |row| row.get(0),
        )?;

        let mut rating_distribution = Vec::with_capacity(5);
        for rating in 1..=5i64 {
            let count: i64 = self.conn.query_row(
                "SELECT COUNT(*) FROM user_feedback WHERE rating = ?1",
                params![rating],
                |row| row.get(0),
            )?;
            rating_distribution.push(RatingBucket {
                rating,
                count: count as usize,
            });
        }

        Ok(ResearchMetrics {
            total_queries,
            total_runs,
            completed_queries,
            failed_queries,
            total_feedback_count,
            avg_confidence,
            avg_duration_ms,
            avg_rating,
            rating_distribution,
        })
    }
}
