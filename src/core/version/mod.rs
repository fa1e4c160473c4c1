pub mod catalog;
pub mod merge;
pub mod schema;

pub use catalog::{CatalogEntry, VersionCatalog};
pub use merge::effective_manifest;
pub use schema::VersionManifest;
