//! What a particle does when it reaches the end of its path.
//!
//! The policy is a pure function of the arrival node's role, the particle,
//! the lattice and the random source. It never mutates the particle; the
//! simulation applies the returned [`Arrival`].
//!
//! | role       | behavior                                                   |
//! |------------|------------------------------------------------------------|
//! | terminator | retire                                                     |
//! | dampener   | retire with `dampener_chance`, otherwise continue          |
//! | amplifier  | continue, and with `amplifier_chance` spawn one more       |
//! | other      | continue to the next destination of the routing mode       |
//!
//! "Continue" retires instead when the routing mode has nowhere left to go.

use rand::Rng;
use rand::seq::SliceRandom;

use super::particle::Particle;
use crate::config::{ConstellationConfig, RoutingMode};
use crate::graph::{HubRole, Lattice, NodeId};

/// Next action for an arrived particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrival {
    /// Route on to this node.
    ContinueTo(NodeId),
    /// Route on to `next`, and start an independent particle from `origin`
    /// toward `extra_to`.
    SpawnExtra {
        origin: NodeId,
        extra_to: NodeId,
        next: NodeId,
    },
    /// Remove the particle.
    Retire,
}

/// Decide what a particle arriving at `at` (with role `role`) does next.
pub fn resolve_arrival<R: Rng + ?Sized>(
    role: HubRole,
    at: NodeId,
    particle: &Particle,
    lattice: &Lattice,
    config: &ConstellationConfig,
    rng: &mut R,
) -> Arrival {
    match role {
        HubRole::Terminator => return Arrival::Retire,
        HubRole::Dampener if rng.gen_bool(f64::from(config.dampener_chance)) => {
            return Arrival::Retire;
        }
        _ => {}
    }

    if particle.hops_left() == Some(0) {
        return Arrival::Retire;
    }

    let Some(next) = next_destination(at, particle.to_visit(), lattice, config.routing, rng) else {
        return Arrival::Retire;
    };

    if role == HubRole::Amplifier && rng.gen_bool(f64::from(config.amplifier_chance)) {
        let fresh = trip_visit_list(at, lattice, config.routing);
        if let Some(extra_to) = next_destination(at, &fresh, lattice, config.routing, rng) {
            return Arrival::SpawnExtra {
                origin: at,
                extra_to,
                next,
            };
        }
    }

    Arrival::ContinueTo(next)
}

/// Pick where a particle standing on `from` heads next.
///
/// `to_visit` is only consulted in visit-list routing. Returns None when the
/// mode has no candidate, which callers treat as retirement.
pub fn next_destination<R: Rng + ?Sized>(
    from: NodeId,
    to_visit: &[NodeId],
    lattice: &Lattice,
    routing: RoutingMode,
    rng: &mut R,
) -> Option<NodeId> {
    match routing {
        RoutingMode::RandomHub => random_other(from, lattice.hubs(), rng),
        RoutingMode::NearestTerminator => {
            let from_pos = lattice.position(from)?;
            let nearest = lattice
                .hubs_with_role(HubRole::Terminator)
                .into_iter()
                .filter(|&id| id != from)
                .filter_map(|id| lattice.position(id).map(|pos| (id, dist_sq(from_pos, pos))))
                .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
                .map(|(id, _)| id);
            nearest.or_else(|| random_other(from, lattice.hubs(), rng))
        }
        RoutingMode::VisitList => random_other(from, to_visit.to_vec(), rng).or_else(|| {
            random_other(from, lattice.hubs_with_role(HubRole::Terminator), rng)
        }),
        RoutingMode::FreeRoam => lattice.neighbors(from).choose(rng).copied(),
    }
}

/// Default hubs a new trip starting at `origin` should tour.
///
/// Empty outside visit-list routing.
pub fn trip_visit_list(origin: NodeId, lattice: &Lattice, routing: RoutingMode) -> Vec<NodeId> {
    if routing != RoutingMode::VisitList {
        return Vec::new();
    }
    lattice
        .hubs_with_role(HubRole::Default)
        .into_iter()
        .filter(|&id| id != origin)
        .collect()
}

fn random_other<R: Rng + ?Sized>(
    from: NodeId,
    mut candidates: Vec<NodeId>,
    rng: &mut R,
) -> Option<NodeId> {
    candidates.retain(|&id| id != from);
    candidates.choose(rng).copied()
}

fn dist_sq(a: (f32, f32), b: (f32, f32)) -> f32 {
    (a.0 - b.0) * (a.0 - b.0) + (a.1 - b.1) * (a.1 - b.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// 5 x 5 lattice, slot = row * 5 + col.
    fn lattice() -> Lattice {
        Lattice::build(125.0, 125.0, 25.0, 1.5)
    }

    fn config(routing: RoutingMode) -> ConstellationConfig {
        ConstellationConfig {
            routing,
            amplifier_chance: 1.0,
            dampener_chance: 1.0,
            ..Default::default()
        }
    }

    fn arrived_at(id: u32) -> Particle {
        Particle::new(vec![NodeId(id)], 0.1)
    }

    #[test]
    fn test_terminator_retires() {
        let lattice = lattice();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let action = resolve_arrival(
            HubRole::Terminator,
            NodeId(0),
            &arrived_at(0),
            &lattice,
            &config(RoutingMode::RandomHub),
            &mut rng,
        );
        assert_eq!(action, Arrival::Retire);
    }

    #[test]
    fn test_dampener_by_chance() {
        let mut lattice = lattice();
        lattice.set_role(NodeId(0), HubRole::Dampener);
        lattice.set_role(NodeId(24), HubRole::Default);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let always = config(RoutingMode::RandomHub);
        let action = resolve_arrival(
            HubRole::Dampener,
            NodeId(0),
            &arrived_at(0),
            &lattice,
            &always,
            &mut rng,
        );
        assert_eq!(action, Arrival::Retire);

        let never = ConstellationConfig {
            dampener_chance: 0.0,
            ..always
        };
        let action = resolve_arrival(
            HubRole::Dampener,
            NodeId(0),
            &arrived_at(0),
            &lattice,
            &never,
            &mut rng,
        );
        assert_eq!(action, Arrival::ContinueTo(NodeId(24)));
    }

    #[test]
    fn test_amplifier_spawns_extra() {
        let mut lattice = lattice();
        lattice.set_role(NodeId(12), HubRole::Amplifier);
        lattice.set_role(NodeId(4), HubRole::Default);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let action = resolve_arrival(
            HubRole::Amplifier,
            NodeId(12),
            &arrived_at(12),
            &lattice,
            &config(RoutingMode::RandomHub),
            &mut rng,
        );
        assert_eq!(
            action,
            Arrival::SpawnExtra {
                origin: NodeId(12),
                extra_to: NodeId(4),
                next: NodeId(4),
            }
        );
    }

    #[test]
    fn test_amplifier_without_chance_continues() {
        let mut lattice = lattice();
        lattice.set_role(NodeId(12), HubRole::Amplifier);
        lattice.set_role(NodeId(4), HubRole::Default);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let quiet = ConstellationConfig {
            amplifier_chance: 0.0,
            ..config(RoutingMode::RandomHub)
        };

        let action = resolve_arrival(
            HubRole::Amplifier,
            NodeId(12),
            &arrived_at(12),
            &lattice,
            &quiet,
            &mut rng,
        );
        assert_eq!(action, Arrival::ContinueTo(NodeId(4)));
    }

    #[test]
    fn test_lone_hub_has_nowhere_to_go() {
        let mut lattice = lattice();
        lattice.set_role(NodeId(7), HubRole::Default);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let action = resolve_arrival(
            HubRole::Default,
            NodeId(7),
            &arrived_at(7),
            &lattice,
            &config(RoutingMode::RandomHub),
            &mut rng,
        );
        assert_eq!(action, Arrival::Retire);
    }

    #[test]
    fn test_random_hub_never_picks_current() {
        let mut lattice = lattice();
        for id in [0, 4, 20, 24] {
            lattice.set_role(NodeId(id), HubRole::Default);
        }
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut seen = Vec::new();
        for _ in 0..200 {
            let next = next_destination(
                NodeId(0),
                &[],
                &lattice,
                RoutingMode::RandomHub,
                &mut rng,
            )
            .unwrap();
            assert_ne!(next, NodeId(0));
            if !seen.contains(&next) {
                seen.push(next);
            }
        }
        seen.sort_unstable();
        assert_eq!(seen, vec![NodeId(4), NodeId(20), NodeId(24)]);
    }

    #[test]
    fn test_nearest_terminator() {
        let mut lattice = lattice();
        lattice.set_role(NodeId(0), HubRole::Generator);
        lattice.set_role(NodeId(2), HubRole::Terminator);
        lattice.set_role(NodeId(24), HubRole::Terminator);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let next = next_destination(
            NodeId(0),
            &[],
            &lattice,
            RoutingMode::NearestTerminator,
            &mut rng,
        );
        assert_eq!(next, Some(NodeId(2)));

        let next = next_destination(
            NodeId(19),
            &[],
            &lattice,
            RoutingMode::NearestTerminator,
            &mut rng,
        );
        assert_eq!(next, Some(NodeId(24)));
    }

    #[test]
    fn test_nearest_terminator_falls_back_to_any_hub() {
        let mut lattice = lattice();
        lattice.set_role(NodeId(0), HubRole::Generator);
        lattice.set_role(NodeId(9), HubRole::Default);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let next = next_destination(
            NodeId(0),
            &[],
            &lattice,
            RoutingMode::NearestTerminator,
            &mut rng,
        );
        assert_eq!(next, Some(NodeId(9)));
    }

    #[test]
    fn test_visit_list_then_terminator_then_nothing() {
        let mut lattice = lattice();
        lattice.set_role(NodeId(6), HubRole::Default);
        lattice.set_role(NodeId(18), HubRole::Terminator);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let next = next_destination(
            NodeId(0),
            &[NodeId(6)],
            &lattice,
            RoutingMode::VisitList,
            &mut rng,
        );
        assert_eq!(next, Some(NodeId(6)));

        // Standing on the only listed hub means it has been visited
        let next = next_destination(
            NodeId(6),
            &[NodeId(6)],
            &lattice,
            RoutingMode::VisitList,
            &mut rng,
        );
        assert_eq!(next, Some(NodeId(18)));

        lattice.set_role(NodeId(18), HubRole::None);
        let next = next_destination(NodeId(6), &[], &lattice, RoutingMode::VisitList, &mut rng);
        assert_eq!(next, None);
    }

    #[test]
    fn test_free_roam_moves_to_neighbor() {
        let lattice = lattice();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..50 {
            let next = next_destination(
                NodeId(12),
                &[],
                &lattice,
                RoutingMode::FreeRoam,
                &mut rng,
            )
            .unwrap();
            assert!(lattice.are_neighbors(NodeId(12), next));
        }
    }

    #[test]
    fn test_spent_hop_budget_retires() {
        let lattice = lattice();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let spent = Particle::new(vec![NodeId(11), NodeId(12)], 1.0).with_hop_budget(0);
        let action = resolve_arrival(
            HubRole::None,
            NodeId(12),
            &spent,
            &lattice,
            &config(RoutingMode::FreeRoam),
            &mut rng,
        );
        assert_eq!(action, Arrival::Retire);
    }

    #[test]
    fn test_trip_visit_list() {
        let mut lattice = lattice();
        lattice.set_role(NodeId(1), HubRole::Default);
        lattice.set_role(NodeId(2), HubRole::Default);
        lattice.set_role(NodeId(3), HubRole::Generator);

        assert_eq!(
            trip_visit_list(NodeId(1), &lattice, RoutingMode::VisitList),
            vec![NodeId(2)]
        );
        assert!(trip_visit_list(NodeId(1), &lattice, RoutingMode::RandomHub).is_empty());
    }
}
