//! Catalog search entry points.
//!
//! # Responsibility
//! - Expose the lazy equipment catalog search.
//! - Keep match rules (fields, case folding, ordering) inside core.

pub mod catalog;
