//! Simulation - the single owner of lattice, hubs and particles.
//!
//! The page's animation loop holds one Simulation and calls [`Simulation::tick`]
//! once per frame. Pointer and click handlers call into the same instance
//! between frames. All randomness comes from one seeded generator, so a run
//! is reproducible from its seed and the sequence of calls.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::arrival::{Arrival, next_destination, resolve_arrival, trip_visit_list};
use super::particle::{Particle, Step};
use crate::config::{ConstellationConfig, RoutingMode};
use crate::error::ConfigError;
use crate::graph::{HubRole, Lattice, MAX_NODES, NodeId};
use crate::hubs::select_hubs;

/// What a click did to the hub layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubToggle {
    /// A plain node became a default hub.
    Added(NodeId),
    /// A default hub went back to being a plain node.
    Removed(NodeId),
}

/// Frame-driven constellation state.
pub struct Simulation {
    config: ConstellationConfig,
    seed: u64,
    rng: ChaCha8Rng,
    lattice: Lattice,
    particles: Vec<Particle>,
    pointer: Option<(f32, f32)>,
}

impl Simulation {
    /// Create a simulation with an empty viewport. Call [`resize`](Self::resize)
    /// before the first frame.
    pub fn new(config: ConstellationConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            lattice: Lattice::new(),
            particles: Vec::new(),
            pointer: None,
        })
    }

    /// Rebuild lattice and hubs for a new viewport and drop every particle.
    ///
    /// The random source restarts from the seed, so the same size always
    /// produces the same lattice and hub layout.
    pub fn resize(&mut self, width: f32, height: f32) {
        let width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        let height = if height.is_finite() { height.max(0.0) } else { 0.0 };

        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.particles.clear();

        let spacing = self.config.grid_spacing;
        self.lattice = Lattice::build(width, height, spacing, self.config.link_factor);
        if self.lattice.is_empty() && width > 0.0 && height > 0.0 {
            console_warn!(
                "constellation: {}x{} at spacing {} exceeds {} nodes, lattice left empty",
                width,
                height,
                spacing,
                MAX_NODES
            );
        }
        let hubs = select_hubs(
            &mut self.lattice,
            &self.config.hubs,
            &self.config.roles,
            width,
            height,
            &mut self.rng,
        );

        console_log!(
            "constellation: {}x{} -> {} nodes, {} links, {} hubs",
            width,
            height,
            self.lattice.node_count(),
            self.lattice.link_count(),
            hubs.len()
        );
    }

    /// Advance one animation frame.
    ///
    /// Order: drop particles retired last frame, top up the population, emit
    /// from generators near the pointer, then move every particle. Extras
    /// spawned by amplifiers during the move start on the next frame.
    pub fn tick(&mut self) {
        self.particles.retain(|particle| !particle.is_retired());

        if self.has_room() && self.rng.gen_bool(f64::from(self.config.spawn_chance)) {
            self.spawn();
        }
        self.emit_near_pointer();

        let moving = self.particles.len();
        for index in 0..moving {
            if let Step::Arrived(at) = self.particles[index].advance() {
                self.arrive(index, at);
            }
        }
    }

    // =========================================================================
    // Spawning
    // =========================================================================

    /// Spawn one particle from the routing mode's origin policy.
    ///
    /// Returns false when the population is full or there is no origin or
    /// destination to use.
    pub fn spawn(&mut self) -> bool {
        match self.pick_origin() {
            Some(origin) => self.spawn_from(origin),
            None => false,
        }
    }

    /// Spawn one particle at `origin` toward a destination picked by the
    /// routing mode.
    pub fn spawn_from(&mut self, origin: NodeId) -> bool {
        if !self.has_room() || !self.lattice.contains(origin) {
            return false;
        }
        let to_visit = trip_visit_list(origin, &self.lattice, self.config.routing);
        let Some(destination) =
            next_destination(origin, &to_visit, &self.lattice, self.config.routing, &mut self.rng)
        else {
            return false;
        };
        self.push_particle(origin, destination, to_visit);
        true
    }

    /// Spawn one particle from `origin` to `destination`.
    ///
    /// The particle is added even when no route exists; it retires on its
    /// first update. A trip to the node it starts on is refused.
    pub fn spawn_toward(&mut self, origin: NodeId, destination: NodeId) -> bool {
        if origin == destination || !self.has_room() || !self.lattice.contains(origin) {
            return false;
        }
        let to_visit = trip_visit_list(origin, &self.lattice, self.config.routing);
        self.push_particle(origin, destination, to_visit);
        true
    }

    fn push_particle(&mut self, origin: NodeId, destination: NodeId, to_visit: Vec<NodeId>) {
        let path = self.lattice.find_path(origin, destination);
        let speed = self.rng.gen_range(self.config.speed_min..self.config.speed_max);

        let mut particle = Particle::new(path, speed).with_visit_list(to_visit);
        if self.config.routing == RoutingMode::FreeRoam {
            let hops = self
                .rng
                .gen_range(self.config.roam_hops_min..=self.config.roam_hops_max);
            particle = particle.with_hop_budget(hops);
        }
        self.particles.push(particle);
    }

    fn pick_origin(&mut self) -> Option<NodeId> {
        let candidates = if self.config.routing == RoutingMode::FreeRoam {
            let edges: Vec<NodeId> = self
                .lattice
                .node_ids()
                .filter(|&id| self.lattice.state(id).is_some_and(|s| s.is_vertical_edge()))
                .collect();
            if edges.is_empty() {
                self.lattice.node_ids().collect()
            } else {
                edges
            }
        } else {
            let generators = self.lattice.hubs_with_role(HubRole::Generator);
            if generators.is_empty() {
                self.lattice.hubs()
            } else {
                generators
            }
        };
        candidates.choose(&mut self.rng).copied()
    }

    fn emit_near_pointer(&mut self) {
        let Some((x, y)) = self.pointer else {
            return;
        };
        let radius = self.config.pointer_radius;
        let chance = f64::from(self.config.pointer_spawn_chance);

        for generator in self.lattice.in_radius(x, y, radius) {
            if self.lattice.role(generator) != HubRole::Generator {
                continue;
            }
            if self.has_room() && self.rng.gen_bool(chance) {
                self.spawn_from(generator);
            }
        }
    }

    fn has_room(&self) -> bool {
        self.live_count() < self.config.max_particles
    }

    // =========================================================================
    // Arrival
    // =========================================================================

    fn arrive(&mut self, index: usize, at: NodeId) {
        let role = self.lattice.role(at);
        let action = resolve_arrival(
            role,
            at,
            &self.particles[index],
            &self.lattice,
            &self.config,
            &mut self.rng,
        );

        match action {
            Arrival::ContinueTo(next) => self.route(index, at, next),
            Arrival::SpawnExtra {
                origin,
                extra_to,
                next,
            } => {
                self.route(index, at, next);
                self.spawn_toward(origin, extra_to);
            }
            Arrival::Retire => self.particles[index].retire(),
        }
    }

    fn route(&mut self, index: usize, from: NodeId, to: NodeId) {
        let path = self.lattice.find_path(from, to);
        let particle = &mut self.particles[index];
        particle.mark_visited(from);
        particle.set_route(path);
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Track the pointer for generator emission.
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.pointer = Some((x, y));
    }

    /// Forget the pointer.
    pub fn pointer_leave(&mut self) {
        self.pointer = None;
    }

    /// Toggle a default hub at the node nearest a click.
    ///
    /// Plain nodes become default hubs and join every live visit list. Default
    /// hubs lose their role; particles that listed them forget them, and
    /// particles heading there are rerouted before this returns. Clicks far from
    /// any node, or on hubs with other roles, change nothing.
    pub fn click(&mut self, x: f32, y: f32) -> Option<HubToggle> {
        let node = self.lattice.nearest_within(x, y, self.config.click_radius)?;

        match self.lattice.role(node) {
            HubRole::None => {
                self.lattice.set_role(node, HubRole::Default);
                if self.config.routing == RoutingMode::VisitList {
                    for particle in self.particles.iter_mut().filter(|p| !p.is_retired()) {
                        particle.remember(node);
                    }
                }
                console_log!("constellation: hub added at {}", node);
                Some(HubToggle::Added(node))
            }
            HubRole::Default => {
                self.lattice.set_role(node, HubRole::None);
                let rerouted = self.reroute_around(node);
                console_log!("constellation: hub removed at {}, {} rerouted", node, rerouted);
                Some(HubToggle::Removed(node))
            }
            _ => None,
        }
    }

    /// Reroute particles away from a hub that no longer exists.
    fn reroute_around(&mut self, removed: NodeId) -> usize {
        let routing = self.config.routing;
        let lattice = &self.lattice;
        let rng = &mut self.rng;
        let mut rerouted = 0;

        for particle in self.particles.iter_mut().filter(|p| !p.is_retired()) {
            particle.forget(removed);
            if routing == RoutingMode::FreeRoam || particle.destination() != Some(removed) {
                continue;
            }
            let Some(from) = particle.waypoint() else {
                continue;
            };

            match next_destination(from, particle.to_visit(), lattice, routing, rng) {
                Some(destination) => particle.reroute(lattice.find_path(from, destination)),
                None => particle.retire(),
            }
            rerouted += 1;
        }

        rerouted
    }

    // =========================================================================
    // Read Access
    // =========================================================================

    pub fn config(&self) -> &ConstellationConfig {
        &self.config
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Every particle, including ones retired this frame.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of particles not yet retired.
    pub fn live_count(&self) -> usize {
        self.particles.iter().filter(|p| !p.is_retired()).count()
    }

    /// Positions of drawable particles as [x0, y0, x1, y1, ...].
    pub fn particle_positions(&self) -> Vec<f32> {
        let mut positions = Vec::with_capacity(self.particles.len() * 2);
        for (x, y) in self.particles.iter().filter_map(|p| p.position(&self.lattice)) {
            positions.push(x);
            positions.push(y);
        }
        positions
    }

    pub fn pointer(&self) -> Option<(f32, f32)> {
        self.pointer
    }
}
