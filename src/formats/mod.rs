//! Catalog file formats supported by csv2po.
//!
//! Only gettext PO is written today; the [`crate::traits::CatalogCodec`] seam lets
//! another format plug into the orchestrator unchanged.

pub mod po;

// Reexporting the formats for easier access
pub use po::PoCodec;
