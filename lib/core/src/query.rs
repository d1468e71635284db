use serde::{Deserialize, Serialize};

use crate::field::{FieldName, FieldVectors};
use crate::Vector;

/// One vectorized user request
///
/// A field left as `None` scores zero similarity against every template.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Query {
    #[serde(default)]
    pub category_primary: String,
    #[serde(default)]
    pub category_secondary: String,
    #[serde(default)]
    pub fields: FieldVectors,
}

impl Query {
    #[must_use]
    pub fn new(fields: FieldVectors) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_categories(mut self, primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        self.category_primary = primary.into();
        self.category_secondary = secondary.into();
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: FieldName, vector: Vector) -> Self {
        self.fields.set(field, Some(vector));
        self
    }

    #[inline]
    pub fn vector(&self, field: FieldName) -> Option<&Vector> {
        self.fields.get(field).as_ref()
    }

    /// Dimension of the first present vector
    pub fn dimension(&self) -> Option<usize> {
        self.fields
            .iter()
            .find_map(|(_, v)| v.as_ref().map(Vector::dim))
    }
}
