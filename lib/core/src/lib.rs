//! # ClauseMatch Core
//!
//! Core data structures for the ClauseMatch template matcher.
//!
//! - [`Vector`] and [`cosine`] - dense embeddings and the similarity primitive
//! - [`FieldName`] / [`FieldMap`] - the four canonical contract fields
//! - [`TemplateEntry`] - one catalog row
//! - [`Query`] - one vectorized request
//! - [`Catalog`] - immutable snapshot of all template entries
//!
//! ## Example
//!
//! ```rust
//! use clausematch_core::{Catalog, FieldName, TemplateEntry, Vector};
//!
//! let entry = TemplateEntry::new("家具买卖合同")
//!     .with_categories("买卖合同", "家具")
//!     .with_field(FieldName::SubjectMatter, Vector::new(vec![1.0, 0.0, 0.0]));
//!
//! let (catalog, _discarded) = Catalog::build(vec![entry], None, 0, false);
//! assert_eq!(catalog.len(), 1);
//! assert_eq!(catalog.dimension(), Some(3));
//! ```

pub mod catalog;
pub mod error;
pub mod field;
pub mod query;
pub mod template;
pub mod vector;

pub use catalog::{Catalog, DiscardReason, LoadReport, VectorDiscard};
pub use error::{Error, Result};
pub use field::{FieldMap, FieldName, FieldTexts, FieldVectors};
pub use query::Query;
pub use template::TemplateEntry;
pub use vector::{cosine, Vector};
