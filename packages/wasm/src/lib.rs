//! Constellation - WASM Module
//!
//! Lattice, hub and particle simulation behind an animated canvas
//! background. The page owns drawing and the animation loop; this module
//! owns every piece of state and exposes it through a JavaScript-friendly API
//! via wasm-bindgen.
//!
//! # Architecture
//!
//! - `graph`: The node lattice, built on petgraph's StableGraph, with A* routing
//! - `spatial`: R-tree spatial indexing for nearest-node and radius queries
//! - `hubs`: Hub placement and role assignment
//! - `sim`: Particles, the arrival policy and the per-frame driver
//! - `config`: Page-supplied settings, deserialized from a JS object

#[macro_use]
mod log;

pub mod config;
pub mod error;
pub mod graph;
pub mod hubs;
pub mod sim;
pub mod spatial;

use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

use config::ConstellationConfig;
use graph::NodeId;
use sim::Simulation;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Main entry point for the constellation.
///
/// This struct wraps the internal Simulation and provides the public API
/// exposed to JavaScript.
#[wasm_bindgen]
pub struct ConstellationWasm {
    sim: Simulation,
}

#[wasm_bindgen]
impl ConstellationWasm {
    /// Create a constellation from a config object.
    ///
    /// `config` may be `undefined`, `null` or a partial object; missing fields
    /// take their defaults. Without a `seed` one is drawn from `Math.random`.
    /// Call `resize` before the first `tick`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, seed: Option<u32>) -> Result<ConstellationWasm, JsValue> {
        let config: ConstellationConfig = if config.is_undefined() || config.is_null() {
            ConstellationConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(|err| {
                console_warn!("constellation: unreadable config: {}", err);
                JsValue::from(err)
            })?
        };

        let seed = seed.unwrap_or_else(|| (js_sys::Math::random() * f64::from(u32::MAX)) as u32);

        let sim = Simulation::new(config, u64::from(seed)).map_err(|err| {
            console_warn!("constellation: rejected config: {}", err);
            JsValue::from_str(&err.to_string())
        })?;

        Ok(Self { sim })
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Rebuild the lattice and hubs for a new canvas size.
    ///
    /// Every particle is dropped.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.sim.resize(width, height);
    }

    /// Advance one animation frame.
    pub fn tick(&mut self) {
        self.sim.tick();
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Track the pointer; generators near it emit particles.
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.sim.pointer_move(x, y);
    }

    /// The pointer left the canvas.
    #[wasm_bindgen(js_name = pointerLeave)]
    pub fn pointer_leave(&mut self) {
        self.sim.pointer_leave();
    }

    /// Toggle a default hub at the node nearest the click.
    ///
    /// Returns true if a hub was added or removed.
    pub fn click(&mut self, x: f32, y: f32) -> bool {
        self.sim.click(x, y).is_some()
    }

    // =========================================================================
    // Counts
    // =========================================================================

    /// Get the number of lattice nodes.
    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.sim.lattice().node_count() as u32
    }

    /// Get the number of links between nodes.
    #[wasm_bindgen(js_name = linkCount)]
    pub fn link_count(&self) -> u32 {
        self.sim.lattice().link_count() as u32
    }

    /// Get the number of live particles.
    #[wasm_bindgen(js_name = particleCount)]
    pub fn particle_count(&self) -> u32 {
        self.sim.live_count() as u32
    }

    // =========================================================================
    // Buffer Access
    // =========================================================================

    /// Get node X positions, indexed by node ID.
    #[wasm_bindgen(js_name = getNodePositionsX)]
    pub fn get_node_positions_x(&self) -> Float32Array {
        Float32Array::from(self.sim.lattice().positions_x())
    }

    /// Get node Y positions, indexed by node ID.
    #[wasm_bindgen(js_name = getNodePositionsY)]
    pub fn get_node_positions_y(&self) -> Float32Array {
        Float32Array::from(self.sim.lattice().positions_y())
    }

    /// Get node roles as a Uint8Array, indexed by node ID.
    ///
    /// 0 = none, 1 = default, 2 = generator, 3 = terminator, 4 = amplifier,
    /// 5 = dampener.
    #[wasm_bindgen(js_name = getNodeRoles)]
    pub fn get_node_roles(&self) -> Vec<u8> {
        self.sim.lattice().roles_raw()
    }

    /// Get every link once as [a0, b0, a1, b1, ...] with a < b.
    #[wasm_bindgen(js_name = getLinks)]
    pub fn get_links(&self) -> Vec<u32> {
        self.sim.lattice().links()
    }

    /// Get drawable particle positions as [x0, y0, x1, y1, ...].
    #[wasm_bindgen(js_name = getParticlePositions)]
    pub fn get_particle_positions(&self) -> Float32Array {
        Float32Array::from(&self.sim.particle_positions()[..])
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Find the nearest node to a point.
    ///
    /// Returns the node ID, or None if the lattice is empty.
    #[wasm_bindgen(js_name = findNearestNode)]
    pub fn find_nearest_node(&self, x: f32, y: f32) -> Option<u32> {
        self.sim.lattice().nearest(x, y).map(NodeId::raw)
    }
}
