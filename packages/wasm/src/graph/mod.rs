//! Lattice graph data structures and queries.
//!
//! This module provides the constellation graph built on petgraph's
//! undirected StableGraph, with Structure of Arrays (SoA) buffers for
//! positions and hub roles so the renderer can read them in bulk.

mod lattice;
mod node;

pub use lattice::{Lattice, MAX_NODES};
pub use node::{HubRole, NodeId, NodeState};
