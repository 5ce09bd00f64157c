//! Hub placement strategies.
//!
//! Both strategies return hubs in claim order and never claim a node twice.
//!
//! - **Fixed targets**: each normalized `(fx, fy)` target is scaled to the
//!   viewport and claims the nearest unclaimed node, optionally jittered to a
//!   random unclaimed node near it.
//! - **Farthest-point sampling**: a random first hub, then repeatedly the
//!   unclaimed node whose distance to the closest chosen hub is largest.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::graph::{Lattice, NodeId};

/// Claim one hub per target, nearest unclaimed node first.
///
/// Targets are fractions of `width` and `height`. Targets left over once
/// every node is claimed are dropped.
pub fn place_fixed<R: Rng + ?Sized>(
    lattice: &Lattice,
    targets: &[(f32, f32)],
    jitter_radius: f32,
    width: f32,
    height: f32,
    rng: &mut R,
) -> Vec<NodeId> {
    let mut claimed = vec![false; lattice.node_count()];
    let mut hubs = Vec::with_capacity(targets.len());

    for &(fx, fy) in targets {
        let x = fx * width;
        let y = fy * height;

        let Some(nearest) = lattice.nearest_matching(x, y, |id| !claimed[id.slot()]) else {
            break;
        };

        let chosen = match lattice.position(nearest) {
            Some((nx, ny)) if jitter_radius > 0.0 => {
                let candidates: Vec<NodeId> = lattice
                    .in_radius(nx, ny, jitter_radius)
                    .into_iter()
                    .filter(|id| !claimed[id.slot()])
                    .collect();
                candidates.choose(rng).copied().unwrap_or(nearest)
            }
            _ => nearest,
        };

        claimed[chosen.slot()] = true;
        hubs.push(chosen);
    }

    hubs
}

/// Spread `count` hubs by farthest-point sampling.
///
/// Ties go to the lowest slot, so the result depends only on the first
/// random pick.
pub fn place_farthest<R: Rng + ?Sized>(
    lattice: &Lattice,
    count: usize,
    rng: &mut R,
) -> Vec<NodeId> {
    let node_count = lattice.node_count();
    if node_count == 0 || count == 0 {
        return Vec::new();
    }

    let xs = lattice.positions_x();
    let ys = lattice.positions_y();
    let dist_sq = |a: usize, b: usize| {
        let dx = xs[a] - xs[b];
        let dy = ys[a] - ys[b];
        dx * dx + dy * dy
    };

    let first = rng.gen_range(0..node_count);
    let mut hubs = Vec::with_capacity(count.min(node_count));
    hubs.push(NodeId(first as u32));

    let mut claimed = vec![false; node_count];
    claimed[first] = true;

    // Squared distance from each node to its closest hub so far
    let mut closest: Vec<f32> = (0..node_count).map(|i| dist_sq(i, first)).collect();

    while hubs.len() < count {
        let mut best: Option<usize> = None;
        for i in 0..node_count {
            if claimed[i] {
                continue;
            }
            if best.is_none_or(|b| closest[i] > closest[b]) {
                best = Some(i);
            }
        }

        let Some(best) = best else {
            break;
        };

        claimed[best] = true;
        hubs.push(NodeId(best as u32));
        for i in 0..node_count {
            closest[i] = closest[i].min(dist_sq(i, best));
        }
    }

    hubs
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn grid() -> Lattice {
        // 4 x 4 nodes, slot = row * 4 + col
        Lattice::build(200.0, 200.0, 50.0, 1.5)
    }

    #[test]
    fn test_fixed_claims_nearest() {
        let lattice = grid();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let hubs = place_fixed(
            &lattice,
            &[(0.0, 0.0), (1.0, 1.0), (0.6, 0.1)],
            0.0,
            200.0,
            200.0,
            &mut rng,
        );
        assert_eq!(hubs, vec![NodeId(0), NodeId(15), NodeId(2)]);
    }

    #[test]
    fn test_fixed_duplicate_target_falls_back() {
        let lattice = grid();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let hubs = place_fixed(&lattice, &[(0.1, 0.1), (0.1, 0.1)], 0.0, 200.0, 200.0, &mut rng);
        assert_eq!(hubs.len(), 2);
        assert_eq!(hubs[0], NodeId(0));
        assert_ne!(hubs[1], hubs[0]);
        // Next closest to (20, 20) is one of the two orthogonal neighbors
        assert!(lattice.are_neighbors(hubs[0], hubs[1]));
    }

    #[test]
    fn test_fixed_runs_out_of_nodes() {
        let lattice = Lattice::build(50.0, 50.0, 50.0, 1.5);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let hubs = place_fixed(
            &lattice,
            &[(0.1, 0.1), (0.5, 0.5), (0.9, 0.9)],
            0.0,
            50.0,
            50.0,
            &mut rng,
        );
        assert_eq!(hubs, vec![NodeId(0)]);
    }

    #[test]
    fn test_fixed_jitter_stays_near_target() {
        let lattice = Lattice::build(500.0, 500.0, 25.0, 1.5);
        let targets = [(0.2, 0.2), (0.5, 0.5), (0.8, 0.8), (0.5, 0.5)];
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let hubs = place_fixed(&lattice, &targets, 60.0, 500.0, 500.0, &mut rng);
            assert_eq!(hubs.len(), targets.len());

            let mut unique = hubs.clone();
            unique.sort_unstable();
            unique.dedup();
            assert_eq!(unique.len(), hubs.len());

            for (hub, &(fx, fy)) in hubs.iter().zip(&targets) {
                let (x, y) = lattice.position(*hub).unwrap();
                let dist = ((x - fx * 500.0).powi(2) + (y - fy * 500.0).powi(2)).sqrt();
                // Nearest node is at most half a diagonal away, plus the jitter
                assert!(dist <= 60.0 + 25.0, "seed {} hub {} too far: {}", seed, hub, dist);
            }
        }
    }

    #[test]
    fn test_fixed_on_empty_lattice() {
        let lattice = Lattice::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(place_fixed(&lattice, &[(0.5, 0.5)], 10.0, 0.0, 0.0, &mut rng).is_empty());
    }

    #[test]
    fn test_farthest_spreads_out() {
        let lattice = grid();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let hubs = place_farthest(&lattice, 4, &mut rng);
        assert_eq!(hubs.len(), 4);

        // The second hub is as far from the first as any node can be
        let first = hubs[0];
        let farthest = lattice
            .node_ids()
            .map(|id| lattice.distance(first, id).unwrap())
            .fold(0.0_f32, f32::max);
        assert_eq!(lattice.distance(first, hubs[1]).unwrap(), farthest);

        let mut unique = hubs.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn test_farthest_from_corner_picks_corners() {
        // Pick the first hub until it lands on node 0, then the rest follow
        let lattice = grid();
        for seed in 0..200 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let hubs = place_farthest(&lattice, 4, &mut rng);
            if hubs[0] == NodeId(0) {
                assert_eq!(hubs[1], NodeId(15));
                // Corners 3 and 12 tie; the lower slot wins
                assert_eq!(hubs[2], NodeId(3));
                assert_eq!(hubs[3], NodeId(12));
                return;
            }
        }
        panic!("no seed started at node 0");
    }

    #[test]
    fn test_farthest_exhausts_candidates() {
        let lattice = Lattice::build(100.0, 50.0, 50.0, 1.5);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let hubs = place_farthest(&lattice, 10, &mut rng);
        assert_eq!(hubs.len(), 2);
    }

    #[test]
    fn test_farthest_is_reproducible() {
        let lattice = Lattice::build(640.0, 360.0, 40.0, 1.5);
        let a = place_farthest(&lattice, 8, &mut ChaCha8Rng::seed_from_u64(77));
        let b = place_farthest(&lattice, 8, &mut ChaCha8Rng::seed_from_u64(77));
        assert_eq!(a, b);
    }

    #[test]
    fn test_farthest_on_empty_lattice() {
        let lattice = Lattice::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(place_farthest(&lattice, 5, &mut rng).is_empty());
    }
}
