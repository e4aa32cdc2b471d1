//! Domain model for the equipment catalog and project lists.
//!
//! # Responsibility
//! - Define the five persisted entities and their closed label sets.
//! - Validate and normalize caller input before it reaches storage.
//!
//! # Invariants
//! - Every entity is identified by a store-generated UUID.
//! - Drafts are validated at the boundary; invalid labels never get stored.

pub mod document;
pub mod equipment;
pub mod project;
pub mod project_equipment;
pub mod quote;
pub mod validation;
