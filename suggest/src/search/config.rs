use crate::errors::{Result, SuggestError};
use crate::metric::Metric;

/// Parameters of a fuzzy search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    query: String,
    top_k: usize,
    metric: Metric,
    similarity: f64,
}

impl SearchConfig {
    /// Creates a validated configuration.
    ///
    /// # Arguments
    ///
    /// * `query` - Text to search for.
    /// * `top_k` - Maximum number of results, greater than zero.
    /// * `metric` - Set-similarity metric.
    /// * `similarity` - Minimum similarity in `(0, 1]`.
    ///
    /// # Errors
    ///
    /// [`SuggestError::InvalidConfig`] is returned when `top_k` or
    /// `similarity` is out of its domain.
    pub fn new<S>(query: S, top_k: usize, metric: Metric, similarity: f64) -> Result<Self>
    where
        S: Into<String>,
    {
        if top_k == 0 {
            return Err(SuggestError::invalid_config(
                "top_k",
                "must be greater than zero",
            ));
        }
        if !(similarity > 0.0 && similarity <= 1.0) {
            return Err(SuggestError::invalid_config(
                "similarity",
                format!("must be in (0, 1], but got {similarity}"),
            ));
        }
        Ok(Self {
            query: query.into(),
            top_k,
            metric,
            similarity,
        })
    }

    /// Gets the query.
    #[inline(always)]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Gets the maximum number of results.
    #[inline(always)]
    pub const fn top_k(&self) -> usize {
        self.top_k
    }

    /// Gets the metric.
    #[inline(always)]
    pub const fn metric(&self) -> Metric {
        self.metric
    }

    /// Gets the minimum similarity.
    #[inline(always)]
    pub const fn similarity(&self) -> f64 {
        self.similarity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation() {
        assert!(SearchConfig::new("a", 1, Metric::Jaccard, 1.0).is_ok());
        for (top_k, similarity) in [(0, 0.5), (5, 0.0), (5, -0.1), (5, 1.01), (5, f64::NAN)] {
            assert!(matches!(
                SearchConfig::new("a", top_k, Metric::Cosine, similarity),
                Err(SuggestError::InvalidConfig(_))
            ));
        }
    }
}
