//! Static badge catalog and the progress engine that scores a profile against it.

pub mod catalog;
pub mod progress;

pub use catalog::{Catalog, CatalogError, CategoryFilter};
pub use progress::{resolve_tier, ProgressEngine};
