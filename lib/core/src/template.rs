use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use crate::field::{FieldMap, FieldName, FieldTexts, FieldVectors};
use crate::Vector;

/// One template row of the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "TemplateRecord")]
pub struct TemplateEntry {
    pub template_id: String,
    pub category_primary: String,
    pub category_secondary: String,
    /// Field embeddings; missing or empty vectors are skipped per field
    pub fields: FieldVectors,
    /// Source text each vector was computed from, when the catalog keeps it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texts: Option<FieldTexts>,
    /// Fields whose value was present but not a numeric array
    #[serde(skip)]
    pub unusable_fields: Vec<FieldName>,
}

/// Catalog record as written on disk
#[derive(Deserialize)]
struct TemplateRecord {
    #[serde(alias = "template")]
    template_id: String,
    #[serde(default, alias = "template1")]
    category_primary: String,
    #[serde(default, alias = "template2")]
    category_secondary: String,
    #[serde(default, alias = "vectors")]
    fields: FieldMap<VectorSlot>,
    #[serde(default, alias = "parts")]
    texts: Option<FieldTexts>,
}

/// Value of one field in a record's vector map
#[derive(Deserialize)]
#[serde(untagged)]
enum VectorSlot {
    Values(Vector),
    Missing(()),
    Unusable(IgnoredAny),
}

impl Default for VectorSlot {
    fn default() -> Self {
        VectorSlot::Missing(())
    }
}

impl From<TemplateRecord> for TemplateEntry {
    fn from(record: TemplateRecord) -> Self {
        let mut fields = FieldVectors::default();
        let mut unusable_fields = Vec::new();
        for (field, slot) in record.fields {
            match slot {
                VectorSlot::Values(v) => fields.set(field, Some(v)),
                VectorSlot::Missing(()) => {}
                VectorSlot::Unusable(_) => unusable_fields.push(field),
            }
        }

        Self {
            template_id: record.template_id,
            category_primary: record.category_primary,
            category_secondary: record.category_secondary,
            fields,
            texts: record.texts,
            unusable_fields,
        }
    }
}

impl TemplateEntry {
    #[must_use]
    pub fn new(template_id: impl Into<String>) -> Self {
        Self {
            template_id: template_id.into(),
            category_primary: String::new(),
            category_secondary: String::new(),
            fields: FieldVectors::default(),
            texts: None,
            unusable_fields: Vec::new(),
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

    /// Source text for a field, if the catalog carried it
    pub fn text(&self, field: FieldName) -> Option<&str> {
        self.texts
            .as_ref()
            .map(|t| t.get(field).as_str())
            .filter(|s| !s.is_empty())
    }

    /// True when no field has a usable vector. Such entries stay in the
    /// catalog; they can still win on category matches.
    pub fn has_no_vectors(&self) -> bool {
        self.fields.present_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_legacy_record() {
        let json = r#"{
            "template": "家具买卖合同_001",
            "template1": "买卖合同",
            "template2": "家具",
            "parts": {"text1": "成品家具", "text2": "买方与卖方"},
            "vectors": {"text1": [0.1, 0.2], "text2": [0.3, 0.4], "text3": []},
            "fulltext": "ignored"
        }"#;
        let entry: TemplateEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.template_id, "家具买卖合同_001");
        assert_eq!(entry.category_primary, "买卖合同");
        assert_eq!(entry.category_secondary, "家具");
        assert!(entry.vector(FieldName::SubjectMatter).is_some());
        assert_eq!(entry.text(FieldName::Parties), Some("买方与卖方"));
        assert_eq!(entry.text(FieldName::PricePayment), None);
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let json = r#"{"template1": "买卖合同", "vectors": {}}"#;
        assert!(serde_json::from_str::<TemplateEntry>(json).is_err());
    }

    #[test]
    fn test_placeholder_values_skip_the_field_only() {
        let json = r#"{
            "template": "a",
            "vectors": {"text1": "", "text2": {}, "text3": [0.5, 0.5], "text4": null}
        }"#;
        let entry: TemplateEntry = serde_json::from_str(json).unwrap();

        assert!(entry.vector(FieldName::SubjectMatter).is_none());
        assert!(entry.vector(FieldName::Parties).is_none());
        assert!(entry.vector(FieldName::PricePayment).is_some());
        assert!(entry.vector(FieldName::PerformanceTerms).is_none());
        assert_eq!(entry.unusable_fields, vec![FieldName::SubjectMatter, FieldName::Parties]);
    }

    #[test]
    fn test_entry_without_vectors_is_kept() {
        let json = r#"{"template": "空模板", "template1": "租赁合同"}"#;
        let entry: TemplateEntry = serde_json::from_str(json).unwrap();
        assert!(entry.has_no_vectors());
    }
}
