//! Lattice - the constellation's node graph.
//!
//! The Lattice stores the topology using petgraph's undirected StableGraph,
//! so every link is visible from both endpoints. Positions, boundary flags
//! and hub roles live in SoA (Structure of Arrays) buffers indexed by node
//! slot, which is what the renderer uploads each frame.

use petgraph::Undirected;
use petgraph::algo::astar;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};

use super::node::{HubRole, NodeId, NodeState};
use crate::spatial::SpatialIndex;

/// Largest lattice a build will produce.
///
/// Keeps node ids within `u32` and bounds the allocation a huge viewport or a
/// tiny spacing could request.
pub const MAX_NODES: usize = 1 << 20;

/// The constellation graph.
///
/// This struct manages:
/// - Graph topology via petgraph (edge weight = link length)
/// - Position buffers in SoA layout
/// - Boundary flags and hub role annotations
/// - Spatial index for nearest-node queries
///
/// A lattice is immutable apart from its role annotations. Viewport changes
/// build a new one.
pub struct Lattice {
    /// Nodes store their NodeId, edges store their length.
    graph: StableGraph<NodeId, f32, Undirected>,

    /// X positions (SoA layout)
    pos_x: Vec<f32>,

    /// Y positions (SoA layout)
    pos_y: Vec<f32>,

    /// Boundary flags
    states: Vec<NodeState>,

    /// Hub role per node, `HubRole::None` for plain points
    roles: Vec<HubRole>,

    /// Pairs closer than this are linked
    link_radius: f32,

    /// Spatial index for hit testing and hub placement
    spatial: SpatialIndex,
}

impl Lattice {
    /// Create an empty lattice.
    pub fn new() -> Self {
        Self {
            graph: StableGraph::default(),
            pos_x: Vec::new(),
            pos_y: Vec::new(),
            states: Vec::new(),
            roles: Vec::new(),
            link_radius: 0.0,
            spatial: SpatialIndex::new(),
        }
    }

    /// Build a regular lattice covering a `width` x `height` area.
    ///
    /// Nodes sit at cell centers `(i * spacing + spacing / 2, j * spacing + spacing / 2)`
    /// for `ceil(width / spacing)` columns and `ceil(height / spacing)` rows,
    /// numbered row by row. Nodes closer than `spacing * link_factor` are linked.
    /// A zero, negative or non-finite area yields an empty lattice, as does a
    /// grid that would exceed [`MAX_NODES`].
    pub fn build(width: f32, height: f32, spacing: f32, link_factor: f32) -> Self {
        let Some((cols, rows)) = Self::grid_size(width, height, spacing) else {
            return Self::new();
        };
        let half = spacing / 2.0;

        let mut points = Vec::with_capacity(cols * rows);
        for j in 0..rows {
            for i in 0..cols {
                points.push((i as f32 * spacing + half, j as f32 * spacing + half));
            }
        }

        let mut lattice = Self::from_points(&points, spacing * link_factor);

        for j in 0..rows {
            for i in 0..cols {
                let state = &mut lattice.states[j * cols + i];
                state.set_vertical_edge(i == 0 || i + 1 == cols);
                state.set_horizontal_edge(j == 0 || j + 1 == rows);
            }
        }

        lattice
    }

    /// Columns and rows of a `width` x `height` grid, or None when the grid
    /// would be empty or larger than [`MAX_NODES`].
    pub fn grid_size(width: f32, height: f32, spacing: f32) -> Option<(usize, usize)> {
        if !(width.is_finite() && height.is_finite() && spacing.is_finite()) {
            return None;
        }
        if !(width > 0.0 && height > 0.0 && spacing > 0.0) {
            return None;
        }

        let cols = (f64::from(width) / f64::from(spacing)).ceil();
        let rows = (f64::from(height) / f64::from(spacing)).ceil();
        if cols * rows > MAX_NODES as f64 {
            return None;
        }
        Some((cols as usize, rows as usize))
    }

    /// Build a lattice from arbitrary points, linking every pair closer than
    /// `link_radius`.
    ///
    /// Points past the first [`MAX_NODES`] are ignored.
    pub fn from_points(points: &[(f32, f32)], link_radius: f32) -> Self {
        let points = &points[..points.len().min(MAX_NODES)];
        let count = points.len();
        let mut graph = StableGraph::with_capacity(count, count * 4);
        let mut pos_x = Vec::with_capacity(count);
        let mut pos_y = Vec::with_capacity(count);
        let mut indexed = Vec::with_capacity(count);

        for (slot, &(x, y)) in points.iter().enumerate() {
            let id = NodeId(slot as u32);
            graph.add_node(id);
            pos_x.push(x);
            pos_y.push(y);
            indexed.push((id, x, y));
        }

        let spatial = SpatialIndex::bulk_load(&indexed);

        // Each pair is linked once, from its lower slot
        let radius_sq = link_radius * link_radius;
        for &(id, x, y) in &indexed {
            let mut candidates = spatial.in_radius(x, y, link_radius);
            candidates.sort_unstable();

            for other in candidates.into_iter().filter(|&other| other > id) {
                let dx = pos_x[other.slot()] - x;
                let dy = pos_y[other.slot()] - y;
                let dist_sq = dx * dx + dy * dy;
                if dist_sq < radius_sq {
                    graph.add_edge(
                        NodeIndex::new(id.slot()),
                        NodeIndex::new(other.slot()),
                        dist_sq.sqrt(),
                    );
                }
            }
        }

        Self {
            graph,
            pos_x,
            pos_y,
            states: vec![NodeState::new(); count],
            roles: vec![HubRole::None; count],
            link_radius,
            spatial,
        }
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Check if the lattice has no nodes.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Iterate over all node ids in slot order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.pos_x.len() as u32).map(NodeId)
    }

    /// Check if a node id belongs to this lattice.
    pub fn contains(&self, id: NodeId) -> bool {
        self.index_of(id).is_some()
    }

    /// Get a node's position.
    pub fn position(&self, id: NodeId) -> Option<(f32, f32)> {
        self.index_of(id).map(|index| {
            let i = index.index();
            (self.pos_x[i], self.pos_y[i])
        })
    }

    /// Get a node's boundary flags.
    pub fn state(&self, id: NodeId) -> Option<NodeState> {
        self.index_of(id).map(|index| self.states[index.index()])
    }

    /// Straight-line distance between two nodes.
    pub fn distance(&self, a: NodeId, b: NodeId) -> Option<f32> {
        let (ax, ay) = self.position(a)?;
        let (bx, by) = self.position(b)?;
        Some(((ax - bx) * (ax - bx) + (ay - by) * (ay - by)).sqrt())
    }

    /// The distance below which nodes are linked.
    pub fn link_radius(&self) -> f32 {
        self.link_radius
    }

    // =========================================================================
    // Hub Roles
    // =========================================================================

    /// Get a node's role. Unknown ids read as `HubRole::None`.
    pub fn role(&self, id: NodeId) -> HubRole {
        self.index_of(id)
            .map(|index| self.roles[index.index()])
            .unwrap_or_default()
    }

    /// Set a node's role, replacing any previous one.
    ///
    /// Returns false if the node does not exist.
    pub fn set_role(&mut self, id: NodeId, role: HubRole) -> bool {
        match self.index_of(id) {
            Some(index) => {
                self.roles[index.index()] = role;
                true
            }
            None => false,
        }
    }

    /// Reset every node to `HubRole::None`.
    pub fn clear_roles(&mut self) {
        self.roles.fill(HubRole::None);
    }

    /// All hubs in slot order.
    pub fn hubs(&self) -> Vec<NodeId> {
        self.node_ids().filter(|&id| self.role(id).is_hub()).collect()
    }

    /// All hubs with the given role, in slot order.
    pub fn hubs_with_role(&self, role: HubRole) -> Vec<NodeId> {
        self.node_ids().filter(|&id| self.role(id) == role).collect()
    }

    // =========================================================================
    // Links
    // =========================================================================

    /// Get the number of links.
    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Get neighbors of a node, in slot order.
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        let Some(index) = self.index_of(id) else {
            return Vec::new();
        };
        let mut neighbors: Vec<NodeId> =
            self.graph.neighbors(index).map(|n| self.graph[n]).collect();
        neighbors.sort_unstable();
        neighbors
    }

    /// Check if two nodes are linked.
    pub fn are_neighbors(&self, a: NodeId, b: NodeId) -> bool {
        match (self.index_of(a), self.index_of(b)) {
            (Some(a), Some(b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }

    /// Get links as flat slot pairs [a0, b0, a1, b1, ...].
    pub fn links(&self) -> Vec<u32> {
        let mut pairs = Vec::with_capacity(self.graph.edge_count() * 2);
        for edge in self.graph.edge_references() {
            pairs.push(self.graph[edge.source()].raw());
            pairs.push(self.graph[edge.target()].raw());
        }
        pairs
    }

    // =========================================================================
    // Pathfinding
    // =========================================================================

    /// Shortest path by hop count from `start` to `goal`, both included.
    ///
    /// A* with unit link cost. The heuristic is the straight-line distance to
    /// the goal divided by the link radius: no link is longer than the radius,
    /// so it never overestimates the remaining hops.
    ///
    /// Returns an empty path when the nodes are disconnected or unknown, and
    /// `[start]` when `start == goal`.
    pub fn find_path(&self, start: NodeId, goal: NodeId) -> Vec<NodeId> {
        let (Some(start_index), Some(goal_index)) = (self.index_of(start), self.index_of(goal))
        else {
            return Vec::new();
        };

        let goal_x = self.pos_x[goal_index.index()];
        let goal_y = self.pos_y[goal_index.index()];
        let radius = self.link_radius;

        let result = astar(
            &self.graph,
            start_index,
            |n| n == goal_index,
            |_| 1.0_f32,
            |n| {
                let dx = self.pos_x[n.index()] - goal_x;
                let dy = self.pos_y[n.index()] - goal_y;
                (dx * dx + dy * dy).sqrt() / radius
            },
        );

        result
            .map(|(_, path)| path.into_iter().map(|n| self.graph[n]).collect())
            .unwrap_or_default()
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Find the nearest node to a point.
    pub fn nearest(&self, x: f32, y: f32) -> Option<NodeId> {
        self.spatial.nearest(x, y)
    }

    /// Find the nearest node within a maximum distance.
    pub fn nearest_within(&self, x: f32, y: f32, max_distance: f32) -> Option<NodeId> {
        self.spatial.nearest_within(x, y, max_distance)
    }

    /// Find the nearest node accepted by `accept`.
    pub fn nearest_matching<F>(&self, x: f32, y: f32, accept: F) -> Option<NodeId>
    where
        F: FnMut(NodeId) -> bool,
    {
        self.spatial.nearest_matching(x, y, accept)
    }

    /// Find all nodes within a radius of a point, in slot order.
    pub fn in_radius(&self, x: f32, y: f32, radius: f32) -> Vec<NodeId> {
        let mut found = self.spatial.in_radius(x, y, radius);
        found.sort_unstable();
        found
    }

    // =========================================================================
    // Buffer Access
    // =========================================================================

    /// Get X positions slice.
    pub fn positions_x(&self) -> &[f32] {
        &self.pos_x
    }

    /// Get Y positions slice.
    pub fn positions_y(&self) -> &[f32] {
        &self.pos_y
    }

    /// Get hub roles as raw bytes, one per node slot.
    pub fn roles_raw(&self) -> Vec<u8> {
        self.roles.iter().map(|role| role.raw()).collect()
    }

    fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        let index = NodeIndex::new(id.slot());
        self.graph.contains_node(index).then_some(index)
    }
}

impl Default for Lattice {
    fn default() -> Self {
        Self::new()
    }
}
