//! Role assignment for placed hubs.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::RoleQuota;
use crate::graph::{HubRole, Lattice, NodeId};

/// Shuffle `hubs` and hand out roles in contiguous groups.
///
/// Groups follow the quota's field order: generators, terminators,
/// amplifiers, dampeners. Whatever is left becomes a default hub. Returns the
/// assignment in shuffled order.
pub fn assign_roles<R: Rng + ?Sized>(
    lattice: &mut Lattice,
    hubs: &[NodeId],
    quota: &RoleQuota,
    rng: &mut R,
) -> Vec<(NodeId, HubRole)> {
    let mut shuffled = hubs.to_vec();
    shuffled.shuffle(rng);

    let groups = [
        (HubRole::Generator, quota.generators),
        (HubRole::Terminator, quota.terminators),
        (HubRole::Amplifier, quota.amplifiers),
        (HubRole::Dampener, quota.dampeners),
    ];

    let mut assignment = Vec::with_capacity(shuffled.len());
    let mut rest = shuffled.as_slice();
    for (role, size) in groups {
        let (group, tail) = rest.split_at(size.min(rest.len()));
        assignment.extend(group.iter().map(|&id| (id, role)));
        rest = tail;
    }
    assignment.extend(rest.iter().map(|&id| (id, HubRole::Default)));

    for &(id, role) in &assignment {
        lattice.set_role(id, role);
    }

    assignment
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_groups_then_default() {
        let mut lattice = Lattice::build(300.0, 300.0, 50.0, 1.5);
        let hubs: Vec<NodeId> = (0..10).map(NodeId).collect();
        let quota = RoleQuota {
            generators: 2,
            terminators: 3,
            amplifiers: 1,
            dampeners: 1,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let assignment = assign_roles(&mut lattice, &hubs, &quota, &mut rng);

        assert_eq!(assignment.len(), 10);
        assert_eq!(lattice.hubs_with_role(HubRole::Generator).len(), 2);
        assert_eq!(lattice.hubs_with_role(HubRole::Terminator).len(), 3);
        assert_eq!(lattice.hubs_with_role(HubRole::Amplifier).len(), 1);
        assert_eq!(lattice.hubs_with_role(HubRole::Dampener).len(), 1);
        assert_eq!(lattice.hubs_with_role(HubRole::Default).len(), 3);
        assert_eq!(lattice.hubs().len(), 10);
    }

    #[test]
    fn test_short_hub_list_fills_early_groups() {
        let mut lattice = Lattice::build(300.0, 300.0, 50.0, 1.5);
        let hubs = [NodeId(4), NodeId(9), NodeId(20)];
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assign_roles(&mut lattice, &hubs, &RoleQuota::default(), &mut rng);

        assert_eq!(lattice.hubs_with_role(HubRole::Generator).len(), 2);
        assert_eq!(lattice.hubs_with_role(HubRole::Terminator).len(), 1);
        assert!(lattice.hubs_with_role(HubRole::Default).is_empty());
    }

    #[test]
    fn test_no_hubs() {
        let mut lattice = Lattice::new();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let assignment = assign_roles(&mut lattice, &[], &RoleQuota::default(), &mut rng);
        assert!(assignment.is_empty());
    }

    #[test]
    fn test_every_hub_equally_likely_to_generate() {
        let hubs = [NodeId(0), NodeId(1), NodeId(2)];
        let quota = RoleQuota {
            generators: 1,
            terminators: 0,
            amplifiers: 0,
            dampeners: 0,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let mut counts = [0usize; 3];
        for _ in 0..3000 {
            let mut lattice = Lattice::build(150.0, 50.0, 50.0, 1.5);
            let assignment = assign_roles(&mut lattice, &hubs, &quota, &mut rng);
            counts[assignment[0].0.slot()] += 1;
        }
        for count in counts {
            assert!((850..=1150).contains(&count), "skewed shuffle: {:?}", counts);
        }
    }
}
