//! # ClauseMatch
//!
//! Recommends contract templates for a user's contract description.
//!
//! Every template in the catalog carries up to four field embeddings
//! (subject matter, parties, price and payment, performance terms) and two
//! category labels. A request is turned into the same four embeddings; each
//! template is scored as a weighted sum of per-field cosine similarities plus
//! a bonus for every matching category, and the best K are returned.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! clausematch --catalog ./data/template_vectors.json --http-port 8031 \
//!     --embedding-url http://127.0.0.1:8101/text2vector/
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use clausematch::prelude::*;
//!
//! let entries = vec![
//!     TemplateEntry::new("家具买卖合同")
//!         .with_categories("买卖合同", "家具")
//!         .with_field(FieldName::SubjectMatter, Vector::new(vec![1.0, 0.0])),
//!     TemplateEntry::new("房屋租赁合同")
//!         .with_categories("租赁合同", "房屋")
//!         .with_field(FieldName::SubjectMatter, Vector::new(vec![0.0, 1.0])),
//! ];
//! let (catalog, _) = Catalog::build(entries, None, 0, false);
//!
//! let query = Query::default()
//!     .with_categories("买卖合同", "")
//!     .with_field(FieldName::SubjectMatter, Vector::new(vec![0.9, 0.1]));
//!
//! let ranked = Ranker::default().rank(&query, catalog.all_entries(), DEFAULT_TOP_K).unwrap();
//! assert_eq!(ranked[0].template_id, "家具买卖合同");
//! ```
//!
//! ## Crate Structure
//!
//! - [`clausematch-core`](https://docs.rs/clausematch-core) - Vectors, fields, template entries, catalog snapshots
//! - [`clausematch-similarity`](https://docs.rs/clausematch-similarity) - Field scorer, ranker, explanations
//! - [`clausematch-storage`](https://docs.rs/clausematch-storage) - Catalog loading and recovery, snapshot manager
//! - [`clausematch-assembler`](https://docs.rs/clausematch-assembler) - Field extraction, embedding providers
//! - [`clausematch-api`](https://docs.rs/clausematch-api) - REST API

// Re-export core types
pub use clausematch_core::{
    cosine, Catalog, Error, FieldMap, FieldName, FieldTexts, FieldVectors, LoadReport, Query,
    Result, TemplateEntry, Vector,
};

// Re-export scoring
pub use clausematch_similarity::{
    ExplainedCandidate, FieldScorer, MatchResponse, Ranker, ScoredCandidate, ScoringPolicy,
    TemplateResponse, CATEGORY_BONUS, DEFAULT_TOP_K,
};

// Re-export storage
pub use clausematch_storage::{CatalogManager, CatalogOptions, CatalogSource, FileCatalogSource};

// Re-export assembly
pub use clausematch_assembler::{
    EmbeddingConfig, EmbeddingProvider, FieldExtractor, HashEmbeddingProvider, HeadingExtractor,
    HttpEmbeddingProvider, QueryAssembler, RawQuery, SplitQuery,
};

// Re-export API
pub use clausematch_api::{AppState, RestApi, ServerConfig};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Catalog, CatalogManager, CatalogOptions, Error, FieldName, Query, QueryAssembler, Ranker,
        Result, ScoredCandidate, ScoringPolicy, TemplateEntry, Vector, DEFAULT_TOP_K,
    };
}
