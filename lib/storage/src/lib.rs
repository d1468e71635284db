pub mod manager;
pub mod recovery;
pub mod source;

pub use manager::{build_catalog, CatalogManager, CatalogOptions};
pub use recovery::{parse_catalog, strip_comment_lines, ParsedCatalog};
pub use source::{CatalogSource, FileCatalogSource, InMemoryCatalogSource};
