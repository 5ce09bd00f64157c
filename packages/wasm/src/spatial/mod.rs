//! Spatial indexing for O(log n) lattice queries.
//!
//! This module provides an R-tree based spatial index used for hub placement,
//! pointer and click hit testing, and neighbor discovery during lattice builds.

mod rtree;

pub use rtree::SpatialIndex;
