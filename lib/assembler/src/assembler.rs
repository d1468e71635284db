use std::sync::Arc;

use clausematch_core::{Error, FieldName, FieldTexts, FieldVectors, Query, Result, Vector};
use clausematch_similarity::normalize_label;
use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::extract::{last_assistant_reply, non_empty_fields, ExtractedFields, FieldExtractor, HeadingExtractor};
use crate::provider::EmbeddingProvider;

/// Free-text request: a contract description, or a chat transcript whose
/// last assistant reply holds the description
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawQuery {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub history: Vec<String>,
    #[serde(default)]
    pub category_primary: String,
    #[serde(default)]
    pub category_secondary: String,
}

impl RawQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn from_history(history: Vec<String>) -> Self {
        Self {
            history,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_categories(mut self, primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        self.category_primary = primary.into();
        self.category_secondary = secondary.into();
        self
    }

    /// Description to split: `text` when set, otherwise the last assistant reply
    pub fn description(&self) -> &str {
        if self.text.trim().is_empty() {
            last_assistant_reply(&self.history)
        } else {
            self.text.trim()
        }
    }
}

/// Request that already carries one text per field
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SplitQuery {
    #[serde(default)]
    pub fields: FieldTexts,
    #[serde(default)]
    pub category_primary: String,
    #[serde(default)]
    pub category_secondary: String,
}

impl SplitQuery {
    #[must_use]
    pub fn with_field(mut self, field: FieldName, text: impl Into<String>) -> Self {
        self.fields.set(field, text.into());
        self
    }

    #[must_use]
    pub fn with_categories(mut self, primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        self.category_primary = primary.into();
        self.category_secondary = secondary.into();
        self
    }
}

/// Turns user requests into vectorized [`Query`] values
#[derive(Clone)]
pub struct QueryAssembler {
    provider: Arc<dyn EmbeddingProvider>,
    extractor: Arc<dyn FieldExtractor>,
}

impl QueryAssembler {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            extractor: Arc::new(HeadingExtractor),
        }
    }

    #[must_use]
    pub fn with_extractor(mut self, extractor: Arc<dyn FieldExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn provider(&self) -> &dyn EmbeddingProvider {
        self.provider.as_ref()
    }

    /// Split a free-text request into field texts
    pub fn extract(&self, raw: &RawQuery) -> ExtractedFields {
        self.extractor.extract(raw.description())
    }

    /// Extract, then embed a free-text request
    pub async fn assemble_raw(&self, raw: &RawQuery) -> Result<Query> {
        let fields = self.extract(raw);
        if non_empty_fields(&fields).is_empty() {
            warn!("No field headings found in a {}-char description", raw.description().chars().count());
        }

        let split = SplitQuery {
            fields,
            category_primary: raw.category_primary.clone(),
            category_secondary: raw.category_secondary.clone(),
        };
        self.assemble_split(&split).await
    }

    /// Embed every non-empty field concurrently.
    ///
    /// Any embedding failure fails the whole query; empty fields stay `None`
    /// and score zero.
    pub async fn assemble_split(&self, split: &SplitQuery) -> Result<Query> {
        let present = non_empty_fields(&split.fields);

        let vectors = try_join_all(present.iter().map(|&(field, text)| self.embed_field(field, text))).await?;

        let mut fields = FieldVectors::default();
        for (field, vector) in vectors {
            fields.set(field, Some(vector));
        }

        debug!(
            "Assembled query with {} of 4 fields via {} provider",
            fields.present_count(),
            self.provider.name()
        );

        Ok(Query::new(fields).with_categories(
            normalize_label(&split.category_primary),
            normalize_label(&split.category_secondary),
        ))
    }

    async fn embed_field(&self, field: FieldName, text: &str) -> Result<(FieldName, Vector)> {
        let vector = self.provider.embed(text).await.map_err(|e| match e {
            Error::EmbeddingUnavailable(_) => e,
            other => Error::EmbeddingUnavailable(format!("{}: {}", field, other)),
        })?;

        if vector.is_empty() {
            return Err(Error::EmbeddingUnavailable(format!("{}: empty embedding vector", field)));
        }
        Ok((field, vector))
    }
}

impl std::fmt::Debug for QueryAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryAssembler")
            .field("provider", &self.provider.name())
            .finish()
    }
}
