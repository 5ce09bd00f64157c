//! R-tree over lattice node positions, backed by the rstar crate.
//!
//! Each entry is a bare `[x, y]` point tagged with its node id, so rstar's
//! own point geometry supplies envelopes and distances.

use rstar::{PointDistance, RTree};
use rstar::primitives::GeomWithData;

use crate::graph::NodeId;

/// A lattice node as stored in the tree.
type Entry = GeomWithData<[f32; 2], NodeId>;

/// Spatial index over lattice nodes.
///
/// Lattice nodes never move, so the tree is bulk loaded once per build and
/// only queried afterwards.
#[derive(Default)]
pub struct SpatialIndex {
    tree: RTree<Entry>,
}

impl SpatialIndex {
    /// An index with no nodes.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk load an index from `(id, x, y)` triples.
    pub fn bulk_load(points: &[(NodeId, f32, f32)]) -> Self {
        let entries = points
            .iter()
            .map(|&(id, x, y)| Entry::new([x, y], id))
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Closest node to a point.
    pub fn nearest(&self, x: f32, y: f32) -> Option<NodeId> {
        self.tree.nearest_neighbor(&[x, y]).map(|entry| entry.data)
    }

    /// Closest node to a point, if it lies within `max_distance` (inclusive).
    pub fn nearest_within(&self, x: f32, y: f32, max_distance: f32) -> Option<NodeId> {
        if !(max_distance >= 0.0) {
            return None;
        }
        self.tree
            .nearest_neighbor(&[x, y])
            .filter(|entry| entry.distance_2(&[x, y]) <= max_distance * max_distance)
            .map(|entry| entry.data)
    }

    /// Closest node accepted by `accept`.
    ///
    /// Nodes are offered in increasing distance, so a rejected node costs one
    /// step of the walk.
    pub fn nearest_matching<F>(&self, x: f32, y: f32, mut accept: F) -> Option<NodeId>
    where
        F: FnMut(NodeId) -> bool,
    {
        self.tree
            .nearest_neighbor_iter(&[x, y])
            .map(|entry| entry.data)
            .find(|&id| accept(id))
    }

    /// Every node within `radius` of a point (inclusive), in no particular
    /// order. A negative radius matches nothing.
    pub fn in_radius(&self, x: f32, y: f32, radius: f32) -> Vec<NodeId> {
        if !(radius >= 0.0) {
            return Vec::new();
        }
        self.tree
            .locate_within_distance([x, y], radius * radius)
            .map(|entry| entry.data)
            .collect()
    }
}
