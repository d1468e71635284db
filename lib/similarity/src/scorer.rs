//! Field scorer
//!
//! Turns one `(TemplateEntry, Query)` pair into a [`ScoredCandidate`]: a
//! weighted sum of per-field cosine similarities plus category bonuses.

use clausematch_core::{cosine, FieldMap, FieldName, Query, Result, TemplateEntry};
use serde::Serialize;

use crate::normalize::labels_match;
use crate::schema::ScoringPolicy;

/// Bonus points awarded per category level
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct CategoryBonus {
    pub primary: f32,
    pub secondary: f32,
}

impl CategoryBonus {
    #[inline]
    pub fn total(&self) -> f32 {
        self.primary + self.secondary
    }
}

/// Score of one template against one query
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoredCandidate {
    pub template_id: String,
    /// Index of the entry in the catalog scan
    pub position: usize,
    pub total_score: f32,
    /// Cosine similarity x 100 per field; 0 where either side had no vector
    pub per_field_similarity: FieldMap<f32>,
    pub category_bonus: CategoryBonus,
}

impl ScoredCandidate {
    /// Weighted contribution of a single field to `total_score`
    pub fn contribution(&self, field: FieldName, policy: &ScoringPolicy) -> f32 {
        self.per_field_similarity.get(field) / 100.0 * policy.weight(field)
    }
}

/// Scores catalog entries against a query under a [`ScoringPolicy`]
#[derive(Debug, Clone, Default)]
pub struct FieldScorer {
    policy: ScoringPolicy,
}

impl FieldScorer {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Score one entry.
    ///
    /// Fields missing on either side contribute nothing; the entry is still
    /// scored. Negative similarities are kept as is. Fails only when a query
    /// vector and an entry vector differ in length.
    pub fn score(&self, entry: &TemplateEntry, query: &Query, position: usize) -> Result<ScoredCandidate> {
        let mut total_score = 0.0f32;
        let mut per_field_similarity = FieldMap::<f32>::default();

        for field in FieldName::ALL {
            let (Some(q), Some(e)) = (query.vector(field), entry.vector(field)) else {
                continue;
            };
            let sim = cosine(q.as_slice(), e.as_slice())?;
            per_field_similarity.set(field, sim * 100.0);
            total_score += sim * self.policy.weight(field);
        }

        let category_bonus = self.category_bonus(query, entry);
        total_score += category_bonus.total();

        Ok(ScoredCandidate {
            template_id: entry.template_id.clone(),
            position,
            total_score,
            per_field_similarity,
            category_bonus,
        })
    }

    fn category_bonus(&self, query: &Query, entry: &TemplateEntry) -> CategoryBonus {
        let award = |query_label: &str, entry_label: &str| {
            if labels_match(query_label, entry_label) {
                self.policy.category_bonus
            } else {
                0.0
            }
        };

        CategoryBonus {
            primary: award(&query.category_primary, &entry.category_primary),
            secondary: award(&query.category_secondary, &entry.category_secondary),
        }
    }
}
