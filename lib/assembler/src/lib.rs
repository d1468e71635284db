//! # ClauseMatch Assembler
//!
//! Turns user requests into vectorized queries.
//!
//! A request is either free text (a generated contract description, or a chat
//! transcript holding one) or four field texts. Free text is split by a
//! [`FieldExtractor`]; each non-empty field is then embedded through an
//! [`EmbeddingProvider`]. Category hints are normalized on the way in.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use clausematch_assembler::{HashEmbeddingProvider, QueryAssembler, RawQuery};
//!
//! let assembler = QueryAssembler::new(Arc::new(HashEmbeddingProvider::default()));
//! let raw = RawQuery::new("标的信息：家具\n主体信息：买卖双方\n价款与支付信息：总价\n履行条款信息：交货")
//!     .with_categories("（买卖合同）", "");
//!
//! let fields = assembler.extract(&raw);
//! assert_eq!(fields.iter().filter(|(_, t)| !t.is_empty()).count(), 4);
//! ```

pub mod assembler;
pub mod extract;
pub mod provider;

pub use assembler::{QueryAssembler, RawQuery, SplitQuery};
pub use extract::{
    last_assistant_reply, non_empty_fields, ExtractedFields, FieldExtractor, HeadingExtractor,
    ASSISTANT_PREFIX,
};
pub use provider::{
    parse_embedding, EmbeddingConfig, EmbeddingProvider, HashEmbeddingProvider,
    HttpEmbeddingProvider, DEFAULT_EMBEDDING_TIMEOUT_SECS, DEFAULT_HASH_DIM,
};
