//! Simulation configuration.
//!
//! The page passes a plain JS object; every field has a default so a partial
//! object (or `undefined`) is enough. Field names are camelCase on the JS side.

use serde::Deserialize;

use crate::error::ConfigError;

/// Normalized hub targets used when the page does not supply its own.
const DEFAULT_TARGETS: [(f32, f32); 8] = [
    (0.15, 0.2),
    (0.5, 0.12),
    (0.85, 0.25),
    (0.3, 0.55),
    (0.7, 0.6),
    (0.12, 0.85),
    (0.5, 0.88),
    (0.88, 0.82),
];

/// How hubs are placed on a freshly built lattice.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum HubStrategy {
    /// Hubs at fixed fractions of the viewport.
    #[serde(rename_all = "camelCase")]
    Fixed {
        /// `(fx, fy)` pairs in the unit square.
        targets: Vec<(f32, f32)>,
        /// When positive, each hub is picked at random among the unclaimed
        /// nodes within this distance of the nearest node.
        #[serde(default)]
        jitter_radius: f32,
    },
    /// Spread hubs by farthest-point sampling.
    FarthestPoint {
        /// Number of hubs to place.
        count: usize,
    },
    /// No hubs; only meaningful with [`RoutingMode::FreeRoam`].
    #[serde(rename = "none")]
    NoHubs,
}

impl Default for HubStrategy {
    fn default() -> Self {
        HubStrategy::Fixed {
            targets: DEFAULT_TARGETS.to_vec(),
            jitter_radius: 0.0,
        }
    }
}

/// Group sizes for role assignment after the hub list is shuffled.
///
/// Groups are sliced off in field order; hubs left over become default hubs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoleQuota {
    pub generators: usize,
    pub terminators: usize,
    pub amplifiers: usize,
    pub dampeners: usize,
}

impl Default for RoleQuota {
    fn default() -> Self {
        Self {
            generators: 2,
            terminators: 2,
            amplifiers: 1,
            dampeners: 1,
        }
    }
}

/// How particles choose where to go next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoutingMode {
    /// Any other hub, uniformly.
    #[default]
    RandomHub,
    /// The terminator closest in straight-line distance.
    NearestTerminator,
    /// Tour the default hubs in random order, then head for a terminator.
    VisitList,
    /// Wander between neighboring nodes until the hop budget runs out.
    FreeRoam,
}

/// Complete configuration for a [`Simulation`](crate::sim::Simulation).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConstellationConfig {
    /// Lattice spacing in pixels (default: 50.0).
    pub grid_spacing: f32,
    /// Link threshold as a multiple of the spacing (default: 1.5).
    pub link_factor: f32,
    /// Hub placement strategy (default: eight fixed targets).
    pub hubs: HubStrategy,
    /// Role group sizes (default: 2 generators, 2 terminators, 1 amplifier, 1 dampener).
    pub roles: RoleQuota,
    /// Destination policy (default: random hub).
    pub routing: RoutingMode,
    /// Slowest particle, in segments per frame (default: 0.01).
    pub speed_min: f32,
    /// Fastest particle, exclusive (default: 0.03).
    pub speed_max: f32,
    /// Live particle ceiling (default: 40).
    pub max_particles: usize,
    /// Chance per frame of topping up the population by one (default: 0.05).
    pub spawn_chance: f32,
    /// Chance an amplifier spawns an extra particle (default: 0.3).
    pub amplifier_chance: f32,
    /// Chance a dampener retires an arriving particle (default: 0.3).
    pub dampener_chance: f32,
    /// Pointer distance at which generators start emitting (default: 100.0).
    pub pointer_radius: f32,
    /// Chance per frame and generator of a pointer spawn (default: 0.1).
    pub pointer_spawn_chance: f32,
    /// Maximum distance from a click to the toggled node (default: 30.0).
    pub click_radius: f32,
    /// Fewest hops a free-roaming particle makes (default: 6).
    pub roam_hops_min: u32,
    /// Most hops a free-roaming particle makes (default: 18).
    pub roam_hops_max: u32,
}

impl Default for ConstellationConfig {
    fn default() -> Self {
        Self {
            grid_spacing: 50.0,
            link_factor: 1.5,
            hubs: HubStrategy::default(),
            roles: RoleQuota::default(),
            routing: RoutingMode::default(),
            speed_min: 0.01,
            speed_max: 0.03,
            max_particles: 40,
            spawn_chance: 0.05,
            amplifier_chance: 0.3,
            dampener_chance: 0.3,
            pointer_radius: 100.0,
            pointer_spawn_chance: 0.1,
            click_radius: 30.0,
            roam_hops_min: 6,
            roam_hops_max: 18,
        }
    }
}

impl ConstellationConfig {
    /// Check that the configuration can drive a simulation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.grid_spacing.is_finite() && self.grid_spacing > 0.0) {
            return Err(ConfigError::NonPositiveSpacing(self.grid_spacing));
        }
        if !(self.link_factor.is_finite() && self.link_factor > 1.0) {
            return Err(ConfigError::LinkFactorTooSmall(self.link_factor));
        }
        let speeds_ok = self.speed_min > 0.0
            && self.speed_min < self.speed_max
            && self.speed_max.is_finite();
        if !speeds_ok {
            return Err(ConfigError::InvalidSpeedRange {
                min: self.speed_min,
                max: self.speed_max,
            });
        }

        let probabilities = [
            ("spawnChance", self.spawn_chance),
            ("amplifierChance", self.amplifier_chance),
            ("dampenerChance", self.dampener_chance),
            ("pointerSpawnChance", self.pointer_spawn_chance),
        ];
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ProbabilityOutOfRange { field, value });
            }
        }

        let mut radii = vec![
            ("pointerRadius", self.pointer_radius),
            ("clickRadius", self.click_radius),
        ];
        if let HubStrategy::Fixed { jitter_radius, .. } = &self.hubs {
            radii.push(("jitterRadius", *jitter_radius));
        }
        for (field, value) in radii {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidRadius { field, value });
            }
        }

        if let HubStrategy::Fixed { targets, .. } = &self.hubs {
            let unit = 0.0..=1.0;
            for (index, &(x, y)) in targets.iter().enumerate() {
                if !(unit.contains(&x) && unit.contains(&y)) {
                    return Err(ConfigError::TargetOutOfRange { index, x, y });
                }
            }
        }

        if self.roam_hops_min == 0 || self.roam_hops_min > self.roam_hops_max {
            return Err(ConfigError::InvalidHopRange {
                min: self.roam_hops_min,
                max: self.roam_hops_max,
            });
        }

        Ok(())
    }
}
