//! Reviewer workload metrics.
//!
//! Summarises how evenly work is spread across reviewers, either from the
//! running ledger or from a single batch mapping.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total | Sum of all counts |
//! | Min / Max | Smallest / largest count |
//! | Spread | Max - Min |
//! | Mean | Total / reviewers |
//! | Least loaded | Reviewers at Min, in input order |

use indexmap::IndexMap;

use crate::models::Mapping;

/// Workload indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadStats {
    /// Number of reviewers considered.
    pub reviewers: usize,
    /// Sum of counts.
    pub total: u64,
    pub min: u64,
    pub max: u64,
    /// Max - Min.
    pub spread: u64,
    pub mean: f64,
    /// Reviewers currently at the minimum, in input order.
    pub least_loaded: Vec<String>,
}

impl LoadStats {
    /// Computes stats from reviewer counts.
    ///
    /// Returns `None` when there are no reviewers.
    pub fn from_counts<'a, I>(counts: I) -> Option<Self>
    where
        I: IntoIterator<Item = (&'a str, u64)>,
    {
        let counts: Vec<(&str, u64)> = counts.into_iter().collect();
        let min = counts.iter().map(|&(_, c)| c).min()?;
        let max = counts.iter().map(|&(_, c)| c).max()?;
        let total: u64 = counts.iter().map(|&(_, c)| c).sum();

        Some(Self {
            reviewers: counts.len(),
            total,
            min,
            max,
            spread: max - min,
            mean: total as f64 / counts.len() as f64,
            least_loaded: counts
                .iter()
                .filter(|&&(_, c)| c == min)
                .map(|&(r, _)| r.to_string())
                .collect(),
        })
    }

    /// Computes stats from a ledger-shaped map.
    pub fn from_ledger(counts: &IndexMap<String, u64>) -> Option<Self> {
        Self::from_counts(counts.iter().map(|(r, &c)| (r.as_str(), c)))
    }

    /// Computes per-reviewer stats for a batch mapping.
    ///
    /// Reviewers in `roster` with no submitters count as zero.
    pub fn from_mapping(mapping: &Mapping, roster: &[String]) -> Option<Self> {
        let mut loads: IndexMap<String, u64> =
            roster.iter().map(|r| (r.clone(), 0)).collect();
        for (reviewer, n) in mapping.reviewer_loads() {
            *loads.entry(reviewer).or_insert(0) += n;
        }
        Self::from_ledger(&loads)
    }
}
