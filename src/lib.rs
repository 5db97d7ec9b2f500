//! `posematch` scores a predicted ligand pose against a reference pose of the
//! same molecule by RMSD and LS-score, choosing among symmetry-equivalent
//! atom mappings the one that optimizes the requested score.
//!
//! The usual entry points are [`evaluate::evaluate_files`] and
//! [`evaluate::evaluate`].

// Element table with van der Waals radii
pub mod element;

// Dense square matrices
pub mod matrix;

// Ligand definition: atoms and bond types
pub mod ligand;

// Data IO
pub mod loader;

// Contact graph and shortest paths
pub mod shortest_path;
pub mod topology;

// Symmetry groups and candidate correspondences
pub mod correspondence;
pub mod equivalence;

// The hard bit: optimal assignment of each joint group
pub mod search;

// Scoring and output
pub mod evaluate;
pub mod report;

pub mod error;

// Python library
#[cfg(feature = "python")]
pub mod python;
