//! Node identifiers, hub roles and boundary flags.
//!
//! Nodes are the lattice points of the constellation. Each node has:
//! - A stable identifier (its slot in the lattice buffers)
//! - Position (x, y) in canvas space
//! - Boundary flags (first/last column or row)
//! - A hub role annotation, `HubRole::None` for plain lattice points

use std::fmt;

/// Stable node identifier.
///
/// Valid for the lifetime of one lattice build. A rebuild replaces every node,
/// so ids from a previous build must not be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new NodeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) fn slot(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Role of a node when a particle arrives at it.
///
/// The discriminants are what the renderer receives in `getNodeRoles()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum HubRole {
    /// Plain lattice point, not a hub.
    #[default]
    None = 0,
    /// Hub without special behavior. Visit-list particles tour these.
    Default = 1,
    /// Particles are spawned here.
    Generator = 2,
    /// Particles retire on arrival.
    Terminator = 3,
    /// Arrival may spawn an additional particle.
    Amplifier = 4,
    /// Arrival may retire the particle.
    Dampener = 5,
}

impl HubRole {
    /// Whether this role marks the node as a hub.
    #[inline]
    pub fn is_hub(self) -> bool {
        self != HubRole::None
    }

    /// Get the raw u8 value.
    #[inline]
    pub fn raw(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for HubRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HubRole::None => "none",
            HubRole::Default => "default",
            HubRole::Generator => "generator",
            HubRole::Terminator => "terminator",
            HubRole::Amplifier => "amplifier",
            HubRole::Dampener => "dampener",
        };
        f.write_str(name)
    }
}

/// Node boundary flags packed into a single byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeState {
    flags: u8,
}

impl NodeState {
    const VERTICAL_EDGE: u8 = 0b0000_0001;
    const HORIZONTAL_EDGE: u8 = 0b0000_0010;

    /// Create a new default node state.
    #[inline]
    pub fn new() -> Self {
        Self { flags: 0 }
    }

    /// Check if the node sits in the first or last lattice column.
    #[inline]
    pub fn is_vertical_edge(self) -> bool {
        self.flags & Self::VERTICAL_EDGE != 0
    }

    /// Set the vertical edge flag.
    #[inline]
    pub fn set_vertical_edge(&mut self, on_edge: bool) {
        if on_edge {
            self.flags |= Self::VERTICAL_EDGE;
        } else {
            self.flags &= !Self::VERTICAL_EDGE;
        }
    }

    /// Check if the node sits in the first or last lattice row.
    #[inline]
    pub fn is_horizontal_edge(self) -> bool {
        self.flags & Self::HORIZONTAL_EDGE != 0
    }

    /// Set the horizontal edge flag.
    #[inline]
    pub fn set_horizontal_edge(&mut self, on_edge: bool) {
        if on_edge {
            self.flags |= Self::HORIZONTAL_EDGE;
        } else {
            self.flags &= !Self::HORIZONTAL_EDGE;
        }
    }
}
