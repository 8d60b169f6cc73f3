//! Reference-genome lookup tables
//!
//! Both tables are built once at startup and shared read-only.

mod genes;
mod normalizer;

pub use genes::{GeneLocator, GeneRecord, StaticGeneTable};
pub use normalizer::{detect_convention, ChromosomeAlias, LocusNormalizer};
