//! Scoring policy
//!
//! Fixed weights applied to each field's cosine similarity, plus the flat
//! bonus for an exact category match. The weights sum to 92.0; the two
//! category bonuses bring a perfect match to 100.

use clausematch_core::{FieldMap, FieldName};
use serde::{Deserialize, Serialize};

/// Weight of the subject-matter field
pub const SUBJECT_MATTER_WEIGHT: f32 = 27.6;
/// Weight of the parties field
pub const PARTIES_WEIGHT: f32 = 27.6;
/// Weight of the price-and-payment field
pub const PRICE_PAYMENT_WEIGHT: f32 = 18.4;
/// Weight of the performance-terms field
pub const PERFORMANCE_TERMS_WEIGHT: f32 = 18.4;
/// Points added for each matching category level
pub const CATEGORY_BONUS: f32 = 4.0;

/// Field weights and category bonus used by the scorer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringPolicy {
    pub weights: FieldMap<f32>,
    pub category_bonus: f32,
}

impl ScoringPolicy {
    /// The tuned production policy: 27.6 / 27.6 / 18.4 / 18.4, +4 per category
    pub fn standard() -> Self {
        Self {
            weights: FieldMap::from_fn(|field| match field {
                FieldName::SubjectMatter => SUBJECT_MATTER_WEIGHT,
                FieldName::Parties => PARTIES_WEIGHT,
                FieldName::PricePayment => PRICE_PAYMENT_WEIGHT,
                FieldName::PerformanceTerms => PERFORMANCE_TERMS_WEIGHT,
            }),
            category_bonus: CATEGORY_BONUS,
        }
    }

    #[inline]
    pub fn weight(&self, field: FieldName) -> f32 {
        *self.weights.get(field)
    }

    /// Sum of the four field weights
    pub fn field_weight_total(&self) -> f32 {
        self.weights.iter().map(|(_, w)| *w).sum()
    }

    /// Highest score a candidate can reach under this policy
    pub fn max_score(&self) -> f32 {
        self.field_weight_total() + 2.0 * self.category_bonus
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self::standard()
    }
}
