//! Ranker
//!
//! Full scan of the catalog: every entry is scored, the list is sorted by
//! total score and cut to the top K. Catalogs hold a few hundred templates, so
//! there is no index; an ANN prefilter would slot in before `score_all` if the
//! catalog ever grows by orders of magnitude.

use clausematch_core::{Query, Result, TemplateEntry};

use crate::schema::ScoringPolicy;
use crate::scorer::{FieldScorer, ScoredCandidate};

/// Number of templates returned when the caller does not ask for a specific K
pub const DEFAULT_TOP_K: usize = 3;

/// Scores and ranks catalog entries for a query
#[derive(Debug, Clone, Default)]
pub struct Ranker {
    scorer: FieldScorer,
}

impl Ranker {
    /// Create a new ranker with the given policy
    pub fn new(policy: ScoringPolicy) -> Self {
        Self {
            scorer: FieldScorer::new(policy),
        }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        self.scorer.policy()
    }

    pub fn scorer(&self) -> &FieldScorer {
        &self.scorer
    }

    /// Score every entry, in catalog order
    pub fn score_all(&self, query: &Query, entries: &[TemplateEntry]) -> Result<Vec<ScoredCandidate>> {
        entries
            .iter()
            .enumerate()
            .map(|(position, entry)| self.scorer.score(entry, query, position))
            .collect()
    }

    /// Rank entries and keep the best `k`.
    ///
    /// The sort is stable: equal scores keep catalog order. `k` larger than
    /// the catalog returns every entry; an empty catalog returns nothing.
    pub fn rank(&self, query: &Query, entries: &[TemplateEntry], k: usize) -> Result<Vec<ScoredCandidate>> {
        let mut results = self.score_all(query, entries)?;

        results.sort_by(|a, b| sort_key(b.total_score).total_cmp(&sort_key(a.total_score)));
        results.truncate(k);

        Ok(results)
    }
}

/// Total-order key: NaN sorts last, `-0.0` ties with `0.0`
fn sort_key(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else {
        score + 0.0
    }
}

/// Rank with the standard policy
pub fn rank(query: &Query, entries: &[TemplateEntry], k: usize) -> Result<Vec<ScoredCandidate>> {
    Ranker::default().rank(query, entries, k)
}
