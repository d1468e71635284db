//! # ClauseMatch Similarity
//!
//! The matching and scoring engine for contract templates.
//!
//! A query carries up to four field embeddings (subject matter, parties,
//! price and payment, performance terms) and two optional category labels.
//! Every catalog entry is scored as a weighted sum of per-field cosine
//! similarities plus a flat bonus for each matching category, then the
//! catalog is ranked and cut to the top K.
//!
//! ## Example
//!
//! ```rust
//! use clausematch_core::{FieldName, Query, TemplateEntry, Vector};
//! use clausematch_similarity::{Ranker, DEFAULT_TOP_K};
//!
//! let entries = vec![
//!     TemplateEntry::new("建设工程施工合同")
//!         .with_categories("建筑工程", "")
//!         .with_field(FieldName::SubjectMatter, Vector::new(vec![1.0, 0.0])),
//!     TemplateEntry::new("家具买卖合同")
//!         .with_field(FieldName::SubjectMatter, Vector::new(vec![0.0, 1.0])),
//! ];
//!
//! let query = Query::default()
//!     .with_categories("（建筑工程）", "")
//!     .with_field(FieldName::SubjectMatter, Vector::new(vec![1.0, 0.1]));
//!
//! let ranked = Ranker::default().rank(&query, &entries, DEFAULT_TOP_K).unwrap();
//! assert_eq!(ranked[0].template_id, "建设工程施工合同");
//! assert_eq!(ranked[0].category_bonus.primary, 4.0);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Query     │────>│ FieldScorer │<────│   Catalog   │
//! │ (4 vectors) │     │ (per entry) │     │  snapshot   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │
//!                     ┌─────────────┐
//!                     │   Ranker    │
//!                     │ (top K)     │
//!                     └─────────────┘
//!                            │
//!                     ┌─────────────┐
//!                     │  Explain    │
//!                     │  (results)  │
//!                     └─────────────┘
//! ```

pub mod explain;
pub mod normalize;
pub mod rank;
pub mod schema;
pub mod scorer;

pub use explain::{
    render_summary, ExplainedCandidate, LegacyCategoryScore, LegacySimilarities, MatchResponse,
    RankingStats, TemplateResponse,
};
pub use normalize::{labels_match, normalize_label, strip_brackets, BRACKET_PAIRS};
pub use rank::{rank, Ranker, DEFAULT_TOP_K};
pub use schema::{
    ScoringPolicy, CATEGORY_BONUS, PARTIES_WEIGHT, PERFORMANCE_TERMS_WEIGHT, PRICE_PAYMENT_WEIGHT,
    SUBJECT_MATTER_WEIGHT,
};
pub use scorer::{CategoryBonus, FieldScorer, ScoredCandidate};
