//! Hub selection: which lattice nodes become points of interest, and what
//! role each one plays.
//!
//! Selection runs once per lattice build. Roles are annotations on the
//! lattice itself, so a node is a hub exactly when its role is not
//! `HubRole::None`.

pub mod placement;
pub mod roles;

pub use placement::{place_farthest, place_fixed};
pub use roles::assign_roles;

use rand::Rng;

use crate::config::{HubStrategy, RoleQuota};
use crate::graph::{Lattice, NodeId};

/// Clear existing roles, place hubs with `strategy` and assign roles.
///
/// `width` and `height` are the viewport the lattice was built for. Returns
/// the hubs in placement order.
pub fn select_hubs<R: Rng + ?Sized>(
    lattice: &mut Lattice,
    strategy: &HubStrategy,
    quota: &RoleQuota,
    width: f32,
    height: f32,
    rng: &mut R,
) -> Vec<NodeId> {
    lattice.clear_roles();

    let hubs = match strategy {
        HubStrategy::Fixed {
            targets,
            jitter_radius,
        } => place_fixed(lattice, targets, *jitter_radius, width, height, rng),
        HubStrategy::FarthestPoint { count } => place_farthest(lattice, *count, rng),
        HubStrategy::NoHubs => Vec::new(),
    };

    assign_roles(lattice, &hubs, quota, rng);
    hubs
}
