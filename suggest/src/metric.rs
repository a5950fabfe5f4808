//! Set-similarity metrics.
//!
//! For a query of `a` terms and a threshold `α`, a metric bounds the
//! cardinality `b` of documents worth looking at, gives the minimum overlap a
//! document of cardinality `b` needs, and turns an overlap into a distance.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::MAX_OVERLAP_CARDINALITY;
use crate::errors::SuggestError;
use crate::utils::{ceil_tolerant, floor_tolerant};

/// Similarity between the n-gram sets of a query and a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// `|A∩B| / |A∪B|`.
    Jaccard,

    /// `|A∩B| / √(|A|·|B|)`.
    Cosine,

    /// `2·|A∩B| / (|A|+|B|)`.
    Dice,

    /// `|A∩B| / min(|A|, |B|)`.
    Overlap,

    /// Equal sets.
    Exact,
}

impl Metric {
    /// Minimum cardinality of a document that can satisfy `alpha`.
    pub fn min_y(self, alpha: f64, a: usize) -> usize {
        let a_f = a as f64;
        match self {
            Self::Jaccard => ceil_tolerant(alpha * a_f) as usize,
            Self::Cosine => ceil_tolerant(alpha * alpha * a_f) as usize,
            Self::Dice => ceil_tolerant(alpha * a_f / (2.0 - alpha)) as usize,
            Self::Overlap => 1,
            Self::Exact => a,
        }
    }

    /// Maximum cardinality of a document that can satisfy `alpha`.
    pub fn max_y(self, alpha: f64, a: usize) -> usize {
        let a_f = a as f64;
        let y = match self {
            Self::Jaccard => floor_tolerant(a_f / alpha),
            Self::Cosine => floor_tolerant(a_f / (alpha * alpha)),
            Self::Dice => floor_tolerant((2.0 - alpha) * a_f / alpha),
            Self::Overlap => return MAX_OVERLAP_CARDINALITY,
            Self::Exact => return a,
        };
        if y.is_finite() {
            y as usize
        } else {
            usize::MAX
        }
    }

    /// Minimum overlap for a document of cardinality `b` to satisfy `alpha`.
    pub fn threshold(self, alpha: f64, a: usize, b: usize) -> usize {
        let (a_f, b_f) = (a as f64, b as f64);
        match self {
            Self::Jaccard => ceil_tolerant(alpha * (a_f + b_f) / (1.0 + alpha)) as usize,
            Self::Cosine => ceil_tolerant(alpha * (a_f * b_f).sqrt()) as usize,
            Self::Dice => ceil_tolerant(0.5 * alpha * (a_f + b_f)) as usize,
            Self::Overlap => ceil_tolerant(alpha * a.min(b) as f64) as usize,
            Self::Exact => a,
        }
    }

    /// Gets `1 - similarity`, clamped to `[0, 1]`.
    pub fn distance(self, inter: usize, a: usize, b: usize) -> f64 {
        let (i, a_f, b_f) = (inter as f64, a as f64, b as f64);
        let similarity = match self {
            Self::Jaccard => i / (a_f + b_f - i),
            Self::Cosine => i / (a_f * b_f).sqrt(),
            Self::Dice => 2.0 * i / (a_f + b_f),
            Self::Overlap => i / a.min(b) as f64,
            Self::Exact => return 0.0,
        };
        if similarity.is_nan() {
            return 1.0;
        }
        (1.0 - similarity).clamp(0.0, 1.0)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Jaccard => "jaccard",
            Self::Cosine => "cosine",
            Self::Dice => "dice",
            Self::Overlap => "overlap",
            Self::Exact => "exact",
        };
        f.write_str(name)
    }
}

impl FromStr for Metric {
    type Err = SuggestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jaccard" => Ok(Self::Jaccard),
            "cosine" => Ok(Self::Cosine),
            "dice" => Ok(Self::Dice),
            "overlap" => Ok(Self::Overlap),
            "exact" => Ok(Self::Exact),
            _ => Err(SuggestError::invalid_config(
                "metric",
                format!("unknown metric: {s}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Metric; 5] = [
        Metric::Jaccard,
        Metric::Cosine,
        Metric::Dice,
        Metric::Overlap,
        Metric::Exact,
    ];

    #[test]
    fn test_jaccard() {
        let m = Metric::Jaccard;
        assert_eq!(m.min_y(0.5, 9), 5);
        assert_eq!(m.max_y(0.5, 9), 18);
        assert_eq!(m.threshold(0.5, 9, 12), 7);
        assert_eq!(m.threshold(0.5, 9, 13), 8);
        assert!((m.distance(8, 9, 12) - (1.0 - 8.0 / 13.0)).abs() < 1e-12);
    }

    #[test]
    fn test_cosine() {
        let m = Metric::Cosine;
        assert_eq!(m.min_y(0.5, 7), 2);
        assert_eq!(m.max_y(0.5, 7), 28);
        assert_eq!(m.threshold(0.5, 7, 12), 5);
        assert!((m.distance(5, 7, 13) - (1.0 - 5.0 / 91f64.sqrt())).abs() < 1e-12);
    }

    #[test]
    fn test_dice() {
        let m = Metric::Dice;
        assert_eq!(m.min_y(0.5, 9), 3);
        assert_eq!(m.max_y(0.5, 9), 27);
        assert_eq!(m.threshold(0.5, 9, 13), 6);
        assert!((m.distance(6, 9, 13) - (1.0 - 12.0 / 22.0)).abs() < 1e-12);
    }

    #[test]
    fn test_overlap() {
        let m = Metric::Overlap;
        assert_eq!(m.min_y(0.5, 9), 1);
        assert_eq!(m.max_y(0.5, 9), i16::MAX as usize);
        assert_eq!(m.threshold(0.5, 9, 4), 2);
        assert_eq!(m.distance(4, 9, 4), 0.0);
    }

    #[test]
    fn test_exact() {
        let m = Metric::Exact;
        assert_eq!(m.min_y(0.3, 9), 9);
        assert_eq!(m.max_y(0.3, 9), 9);
        assert_eq!(m.threshold(0.3, 9, 9), 9);
        assert_eq!(m.distance(9, 9, 9), 0.0);
    }

    #[test]
    fn test_distance_bounds() {
        for m in ALL {
            for a in 1..20 {
                for b in 1..20 {
                    for i in 0..=a.min(b) {
                        let d = m.distance(i, a, b);
                        assert!((0.0..=1.0).contains(&d), "{m} {i} {a} {b}");
                    }
                }
                assert_eq!(m.distance(a, a, a), 0.0, "{m} {a}");
            }
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("Cosine".parse::<Metric>().unwrap(), Metric::Cosine);
        assert_eq!(Metric::Dice.to_string(), "dice");
        assert!("levenshtein".parse::<Metric>().is_err());
        let m: Metric = serde_json::from_str("\"jaccard\"").unwrap();
        assert_eq!(m, Metric::Jaccard);
    }
}
