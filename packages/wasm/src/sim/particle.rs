//! A single particle travelling along a lattice path.
//!
//! Movement is segment based: `progress` runs from 0 to 1 along the link
//! between `path[segment]` and `path[segment + 1]`, then the particle steps to
//! the next link. A particle is retired by pushing `progress` past 1, which
//! the simulation filters out on the following frame.

use crate::graph::{Lattice, NodeId};

/// Progress value marking a retired particle.
const RETIRED: f32 = 2.0;

/// Outcome of one frame of movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Still between nodes, or just moved onto the next link.
    Traveling,
    /// Reached the last node of the path. The caller must either give the
    /// particle a new route or retire it.
    Arrived(NodeId),
    /// Retired, now or earlier.
    Retired,
}

/// A moving dot.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    path: Vec<NodeId>,
    segment: usize,
    progress: f32,
    speed: f32,
    /// Default hubs not yet visited this trip (visit-list routing only).
    to_visit: Vec<NodeId>,
    /// Hops left before retiring (free roaming only).
    hops_left: Option<u32>,
}

impl Particle {
    /// Create a particle at the start of `path`.
    ///
    /// An empty or single-node path means there is no route; the particle
    /// retires on its first update. A single node counts as no route because
    /// the particle would have no link to travel.
    pub fn new(path: Vec<NodeId>, speed: f32) -> Self {
        Self {
            path,
            segment: 0,
            progress: 0.0,
            speed,
            to_visit: Vec::new(),
            hops_left: None,
        }
    }

    /// Attach the default hubs this particle should tour.
    pub fn with_visit_list(mut self, to_visit: Vec<NodeId>) -> Self {
        self.to_visit = to_visit;
        self
    }

    /// Limit the particle to `hops` arrivals.
    pub fn with_hop_budget(mut self, hops: u32) -> Self {
        self.hops_left = Some(hops);
        self
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn path(&self) -> &[NodeId] {
        &self.path
    }

    pub fn segment(&self) -> usize {
        self.segment
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn to_visit(&self) -> &[NodeId] {
        &self.to_visit
    }

    pub fn hops_left(&self) -> Option<u32> {
        self.hops_left
    }

    /// Final node of the current path.
    pub fn destination(&self) -> Option<NodeId> {
        self.path.last().copied()
    }

    /// Far end of the link currently being travelled.
    pub fn waypoint(&self) -> Option<NodeId> {
        self.path.get(self.segment + 1).copied()
    }

    pub fn is_retired(&self) -> bool {
        self.progress > 1.0
    }

    pub fn retire(&mut self) {
        self.progress = RETIRED;
    }

    // =========================================================================
    // Movement
    // =========================================================================

    /// Advance one frame.
    pub fn advance(&mut self) -> Step {
        if self.is_retired() {
            return Step::Retired;
        }
        if self.path.len() < 2 {
            self.retire();
            return Step::Retired;
        }

        self.progress += self.speed;
        if self.progress >= 1.0 {
            self.progress = 0.0;
            self.segment += 1;

            let last = self.path.len() - 1;
            if self.segment >= last {
                self.segment = last;
                if let Some(hops) = self.hops_left.as_mut() {
                    *hops = hops.saturating_sub(1);
                }
                return Step::Arrived(self.path[last]);
            }
        }

        Step::Traveling
    }

    /// Replace the path after an arrival and start from its first link.
    pub fn set_route(&mut self, path: Vec<NodeId>) {
        self.path = path;
        self.segment = 0;
        self.progress = 0.0;
        if self.path.len() < 2 {
            self.retire();
        }
    }

    /// Swap the rest of the route while in flight.
    ///
    /// `tail` must start at the current waypoint. The current link is kept so
    /// the particle does not jump; an empty tail retires it.
    pub fn reroute(&mut self, tail: Vec<NodeId>) {
        match (self.waypoint(), tail.first()) {
            (Some(waypoint), Some(&first)) if waypoint == first => {
                self.path.truncate(self.segment + 2);
                self.path.extend_from_slice(&tail[1..]);
            }
            _ => self.retire(),
        }
    }

    // =========================================================================
    // Visit List
    // =========================================================================

    /// Drop `id` from the visit list after arriving there.
    pub fn mark_visited(&mut self, id: NodeId) {
        self.to_visit.retain(|&other| other != id);
    }

    /// Drop `id` from the visit list because it stopped being a hub.
    ///
    /// Returns true if it was listed.
    pub fn forget(&mut self, id: NodeId) -> bool {
        let before = self.to_visit.len();
        self.to_visit.retain(|&other| other != id);
        self.to_visit.len() != before
    }

    /// Add a newly created hub to the visit list.
    pub fn remember(&mut self, id: NodeId) {
        if !self.to_visit.contains(&id) {
            self.to_visit.push(id);
        }
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Interpolated canvas position, or None if the particle has no route or
    /// is retired.
    pub fn position(&self, lattice: &Lattice) -> Option<(f32, f32)> {
        if self.is_retired() {
            return None;
        }
        let from = *self.path.get(self.segment)?;
        let (x0, y0) = lattice.position(from)?;
        let Some(to) = self.waypoint() else {
            return (self.path.len() > 1).then_some((x0, y0));
        };
        let (x1, y1) = lattice.position(to)?;
        let t = self.progress;
        Some((x0 + (x1 - x0) * t, y0 + (y1 - y0) * t))
    }
}
