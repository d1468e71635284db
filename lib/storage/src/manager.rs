use clausematch_core::{Catalog, DiscardReason, Error, LoadReport, Result};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::recovery::parse_catalog;
use crate::source::{CatalogSource, FileCatalogSource};

/// Options applied when building a catalog snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogOptions {
    /// Required vector dimension; inferred as the most common vector length when unset
    pub expected_dim: Option<usize>,
}

/// Owns the active catalog snapshot
///
/// Readers take an `Arc<Catalog>` and keep it for the whole request, so a
/// reload never changes a ranking that is already running.
pub struct CatalogManager {
    source: Arc<dyn CatalogSource>,
    options: CatalogOptions,
    current: RwLock<Arc<Catalog>>,
}

impl CatalogManager {
    /// Create a manager serving an empty catalog until the first load
    pub fn new(source: Arc<dyn CatalogSource>, options: CatalogOptions) -> Self {
        Self {
            source,
            options,
            current: RwLock::new(Arc::new(Catalog::empty())),
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P, options: CatalogOptions) -> Self {
        Self::new(Arc::new(FileCatalogSource::new(path)), options)
    }

    /// First load at startup. A failure is logged and the empty catalog
    /// stays active so the service can still answer.
    pub fn load_initial(&self) -> LoadReport {
        match self.reload() {
            Ok(report) => report,
            Err(e) => {
                error!(
                    "Failed to load catalog from {}: {}; serving an empty catalog",
                    self.source.describe(),
                    e
                );
                self.snapshot().report().clone()
            }
        }
    }

    /// Build a new snapshot from the source and swap it in.
    /// On failure the previous snapshot stays active.
    pub fn reload(&self) -> Result<LoadReport> {
        let catalog = self.build()?;
        let report = catalog.report().clone();
        self.replace(catalog);
        Ok(report)
    }

    /// Build a snapshot from the source without installing it
    pub fn build(&self) -> Result<Catalog> {
        let document = self.source.read()?;
        let catalog = build_catalog(&document, self.options)?;

        info!(
            "Loaded catalog from {}: {} entries, {} dropped, dimension {:?}",
            self.source.describe(),
            catalog.report().loaded,
            catalog.report().dropped,
            catalog.dimension()
        );
        Ok(catalog)
    }

    /// Install a prebuilt snapshot
    pub fn replace(&self, catalog: Catalog) {
        *self.current.write() = Arc::new(catalog);
    }

    /// Current snapshot
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.current.read().clone()
    }

    #[inline]
    pub fn options(&self) -> CatalogOptions {
        self.options
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }
}

/// Parse a catalog document and build a snapshot from it
pub fn build_catalog(document: &str, options: CatalogOptions) -> Result<Catalog> {
    let parsed = parse_catalog(document);
    let records = parsed.records();

    if records == 0 {
        if parsed.recovered {
            return Err(Error::CatalogUnavailable(
                "document is not JSON and holds no records".to_string(),
            ));
        }
        warn!("Catalog document holds no records");
    } else if parsed.entries.is_empty() {
        return Err(Error::CatalogUnavailable(format!(
            "none of {} records could be loaded",
            records
        )));
    }

    if parsed.dropped > 0 {
        warn!(
            "Catalog degraded: {} of {} records dropped",
            parsed.dropped, records
        );
    }

    let (catalog, discards) = Catalog::build(
        parsed.entries,
        options.expected_dim,
        parsed.dropped,
        parsed.recovered,
    );

    for d in &discards {
        match d.reason {
            DiscardReason::Dimension(dim) => warn!(
                "Discarded {} vector of '{}' (record {}): dimension {} != {:?}",
                d.field,
                d.template_id,
                d.position,
                dim,
                catalog.dimension()
            ),
            DiscardReason::NotAVector => warn!(
                "Ignored {} of '{}' (record {}): value is not a numeric array",
                d.field, d.template_id, d.position
            ),
        }
    }

    Ok(catalog)
}
