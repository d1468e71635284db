use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::field::FieldName;
use crate::TemplateEntry;

/// Summary of how a catalog snapshot was produced
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LoadReport {
    /// Entries available for ranking
    pub loaded: usize,
    /// Records skipped because they could not be parsed
    pub dropped: usize,
    /// Field vectors discarded because their dimension disagreed with the catalog
    pub discarded_vectors: usize,
    /// Field values that were present but not a numeric array
    pub unusable_vectors: usize,
    /// True when the source was not well-formed as a whole and records were
    /// recovered one by one
    pub recovered: bool,
    /// True when records were dropped or recovered individually
    pub degraded: bool,
    pub dimension: Option<usize>,
    pub loaded_at: DateTime<Utc>,
}

/// Why a field vector was left out of a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// Vector length disagreed with the catalog dimension
    Dimension(usize),
    /// Value was a placeholder such as `""` or `{}`
    NotAVector,
}

/// A field vector removed while building a catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorDiscard {
    pub position: usize,
    pub template_id: String,
    pub field: FieldName,
    pub reason: DiscardReason,
}

/// Immutable, in-memory snapshot of the template catalog
///
/// Built once and shared behind an `Arc`; a reload produces a new snapshot
/// instead of mutating this one.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<TemplateEntry>,
    dimension: Option<usize>,
    report: LoadReport,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::build(Vec::new(), None, 0, false).0
    }

    /// Build a snapshot, enforcing a single vector dimension.
    ///
    /// The dimension is `expected_dim` when given, otherwise the most common
    /// vector length (ties go to the length seen first). Vectors of another
    /// length are removed from their field only; the entry itself is kept.
    pub fn build(
        mut entries: Vec<TemplateEntry>,
        expected_dim: Option<usize>,
        dropped: usize,
        recovered: bool,
    ) -> (Self, Vec<VectorDiscard>) {
        let mut discards = Vec::new();

        for (position, entry) in entries.iter_mut().enumerate() {
            entry.fields = std::mem::take(&mut entry.fields).without_empty();
            for field in std::mem::take(&mut entry.unusable_fields) {
                discards.push(VectorDiscard {
                    position,
                    template_id: entry.template_id.clone(),
                    field,
                    reason: DiscardReason::NotAVector,
                });
            }
        }
        let unusable = discards.len();

        let dimension = expected_dim.or_else(|| dominant_dimension(&entries));

        if let Some(expected) = dimension {
            for (position, entry) in entries.iter_mut().enumerate() {
                for field in FieldName::ALL {
                    let Some(dim) = entry.vector(field).map(|v| v.dim()) else {
                        continue;
                    };
                    if dim != expected {
                        entry.fields.set(field, None);
                        discards.push(VectorDiscard {
                            position,
                            template_id: entry.template_id.clone(),
                            field,
                            reason: DiscardReason::Dimension(dim),
                        });
                    }
                }
            }
        }

        let report = LoadReport {
            loaded: entries.len(),
            dropped,
            discarded_vectors: discards.len() - unusable,
            unusable_vectors: unusable,
            recovered,
            degraded: dropped > 0 || recovered,
            dimension,
            loaded_at: Utc::now(),
        };

        (
            Self {
                entries,
                dimension,
                report,
            },
            discards,
        )
    }

    /// Read-only view of every entry, in catalog order
    #[inline]
    pub fn all_entries(&self) -> &[TemplateEntry] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    #[inline]
    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    #[inline]
    pub fn is_degraded(&self) -> bool {
        self.report.degraded
    }
}

/// Most common vector length across all entries, first seen on ties
fn dominant_dimension(entries: &[TemplateEntry]) -> Option<usize> {
    let mut counts: Vec<(usize, usize)> = Vec::new();
    for entry in entries {
        for (_, vector) in entry.fields.iter() {
            let Some(dim) = vector.as_ref().map(|v| v.dim()) else {
                continue;
            };
            match counts.iter_mut().find(|(d, _)| *d == dim) {
                Some((_, n)) => *n += 1,
                None => counts.push((dim, 1)),
            }
        }
    }

    let mut best: Option<(usize, usize)> = None;
    for (dim, n) in counts {
        if best.map_or(true, |(_, top)| n > top) {
            best = Some((dim, n));
        }
    }
    best.map(|(dim, _)| dim)
}

impl Default for Catalog {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vector;

    fn entry(id: &str, dims: &[usize]) -> TemplateEntry {
        let mut e = TemplateEntry::new(id);
        for (field, &dim) in FieldName::ALL.iter().zip(dims) {
            e = e.with_field(*field, Vector::new(vec![1.0; dim]));
        }
        e
    }

    #[test]
    fn test_dimension_from_first_vector() {
        let (catalog, discards) = Catalog::build(vec![entry("a", &[3, 3]), entry("b", &[3])], None, 0, false);
        assert_eq!(catalog.dimension(), Some(3));
        assert!(discards.is_empty());
        assert_eq!(catalog.len(), 2);
        assert!(!catalog.is_degraded());
    }

    #[test]
    fn test_mismatched_vector_dropped_for_field_only() {
        let (catalog, discards) = Catalog::build(vec![entry("a", &[3]), entry("b", &[3, 5])], None, 0, false);
        assert_eq!(catalog.len(), 2);
        assert_eq!(discards.len(), 1);
        assert_eq!(discards[0].template_id, "b");
        assert_eq!(discards[0].field, FieldName::Parties);

        let b = &catalog.all_entries()[1];
        assert!(b.vector(FieldName::SubjectMatter).is_some());
        assert!(b.vector(FieldName::Parties).is_none());
        assert_eq!(catalog.report().discarded_vectors, 1);
    }

    #[test]
    fn test_corrupt_first_vector_does_not_set_dimension() {
        let entries = vec![entry("corrupt", &[1]), entry("a", &[3, 3]), entry("b", &[3, 3])];
        let (catalog, discards) = Catalog::build(entries, None, 0, false);

        assert_eq!(catalog.dimension(), Some(3));
        assert_eq!(discards.len(), 1);
        assert_eq!(discards[0].template_id, "corrupt");
        assert_eq!(discards[0].reason, DiscardReason::Dimension(1));
        assert_eq!(catalog.all_entries()[1].fields.present_count(), 2);
        assert_eq!(catalog.all_entries()[2].fields.present_count(), 2);
    }

    #[test]
    fn test_dimension_tie_goes_to_first_seen() {
        let (catalog, discards) = Catalog::build(vec![entry("a", &[2]), entry("b", &[4])], None, 0, false);
        assert_eq!(catalog.dimension(), Some(2));
        assert_eq!(discards[0].template_id, "b");
    }

    #[test]
    fn test_placeholder_fields_are_reported() {
        let json = r#"{"template": "a", "vectors": {"text1": "", "text2": [1.0, 0.0]}}"#;
        let a: TemplateEntry = serde_json::from_str(json).unwrap();
        let (catalog, discards) = Catalog::build(vec![a], None, 0, false);

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.dimension(), Some(2));
        assert_eq!(discards.len(), 1);
        assert_eq!(discards[0].field, FieldName::SubjectMatter);
        assert_eq!(discards[0].reason, DiscardReason::NotAVector);
        assert_eq!(catalog.report().unusable_vectors, 1);
        assert_eq!(catalog.report().discarded_vectors, 0);
        assert!(catalog.all_entries()[0].unusable_fields.is_empty());
    }

    #[test]
    fn test_expected_dimension_wins() {
        let (catalog, discards) = Catalog::build(vec![entry("a", &[4]), entry("b", &[3])], Some(3), 0, false);
        assert_eq!(catalog.dimension(), Some(3));
        assert_eq!(discards.len(), 1);
        assert!(catalog.all_entries()[0].has_no_vectors());
    }

    #[test]
    fn test_dropped_marks_degraded() {
        let (catalog, _) = Catalog::build(vec![entry("a", &[2])], None, 1, false);
        assert!(catalog.is_degraded());
        assert_eq!(catalog.report().dropped, 1);
        assert_eq!(catalog.report().loaded, 1);
    }

    #[test]
    fn test_recovered_marks_degraded() {
        let (catalog, _) = Catalog::build(vec![entry("a", &[2])], None, 0, true);
        assert!(catalog.is_degraded());
        assert_eq!(catalog.report().dropped, 0);
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::empty();
        assert!(catalog.is_empty());
        assert_eq!(catalog.dimension(), None);
    }
}
