//! Random room layout on a 2D lattice.
//!
//! `generate_plan` grows a tree of room nodes one node at a time: each new
//! node shares one coordinate with an already-placed frontier node and steps
//! away from it along the perpendicular axis. The result is abstract - node
//! positions and corridor connectivity, no tiles yet.

use std::collections::{BTreeMap, HashSet};

use rand::Rng;

pub type NodeId = usize;

/// Axis 0 is x, axis 1 is y
pub const AXES: usize = 2;

/// One directed corridor slot of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEdge {
    pub to: NodeId,
    /// Ids of nodes whose incoming corridor crosses this one, sorted. A
    /// corridor is identified by the larger of its endpoint ids.
    pub crossings: Vec<NodeId>,
}

impl PlanEdge {
    fn to(to: NodeId) -> Self {
        Self {
            to,
            crossings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanNode {
    pub id: NodeId,
    /// Lattice position, indexed by axis
    pub pos: [i32; AXES],
    /// Corridor slots indexed by [axis][direction], direction 0 is negative
    /// and 1 is positive. A node has at most one edge per slot.
    pub edges: [[Option<PlanEdge>; 2]; AXES],
}

impl PlanNode {
    pub fn new(id: NodeId, pos: [i32; AXES]) -> Self {
        Self {
            id,
            pos,
            edges: Default::default(),
        }
    }

    /// The edge leading back toward the root, if this is not the root.
    /// Parents always carry smaller ids than their children.
    pub fn incoming(&self) -> Option<(usize, usize, &PlanEdge)> {
        for axis in 0..AXES {
            for dir in 0..2 {
                if let Some(edge) = &self.edges[axis][dir] {
                    if edge.to < self.id {
                        return Some((axis, dir, edge));
                    }
                }
            }
        }
        None
    }
}

/// Abstract level layout: a tree of room nodes with crossing corridors
/// resolved. Node 0 is the root at the lattice origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub nodes: Vec<PlanNode>,
}

impl Plan {
    /// Number of undirected corridors; always `nodes.len() - 1`
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.incoming().is_some()).count()
    }
}

/// Build a random plan with exactly `n` nodes and `n - 1` corridors.
///
/// Randomized, but fully reproducible for a seeded rng.
pub fn generate_plan(n: usize, rng: &mut impl Rng) -> Plan {
    assert!(n >= 1, "a plan needs at least one node");

    let mut nodes = vec![PlanNode::new(0, [0, 0])];
    // Extremal coordinate reached so far, per [axis][direction].
    let mut extent = [[0i32; 2]; AXES];
    // Per step axis and direction: cross-coordinate -> the node nearest to
    // the boundary in that direction. A BTreeMap keeps column selection
    // deterministic for a seeded rng.
    let mut frontier: [[BTreeMap<i32, NodeId>; 2]; AXES] = Default::default();
    for axis in 0..AXES {
        for dir in 0..2 {
            frontier[axis][dir].insert(0, 0);
        }
    }
    // Lattice points already taken by a node or a corridor interior. A new
    // node must not land on any of them, or its room would sit inside an
    // existing corridor.
    let mut taken: HashSet<[i32; AXES]> = HashSet::from([[0, 0]]);

    for id in 1..n {
        // Rejection-sample a placement. A step past the boundary of the
        // explored extent is always free, so this terminates.
        let (parent, step_axis, dir, pos) = loop {
            let shared_axis = rng.gen_range(0..AXES);
            let step_axis = 1 - shared_axis;
            let dir = rng.gen_range(0..2usize);

            let columns: Vec<i32> = frontier[step_axis][dir].keys().copied().collect();
            let column = columns[rng.gen_range(0..columns.len())];
            let parent = frontier[step_axis][dir][&column];
            let base = nodes[parent].pos[step_axis];

            // Cap the step at the explored extent. The frontier node may sit
            // on the boundary itself, in which case a single step extends it.
            let headroom = match dir {
                0 => base - extent[step_axis][0],
                _ => extent[step_axis][1] - base,
            };
            let step = sample_step(headroom.max(1), rng);

            let mut pos = nodes[parent].pos;
            pos[step_axis] += if dir == 0 { -step } else { step };
            if !taken.contains(&pos) {
                break (parent, step_axis, dir, pos);
            }
        };

        let mut node = PlanNode::new(id, pos);
        node.edges[step_axis][1 - dir] = Some(PlanEdge::to(parent));
        debug_assert!(nodes[parent].edges[step_axis][dir].is_none());
        nodes[parent].edges[step_axis][dir] = Some(PlanEdge::to(id));

        // Mark the new corridor's interior points.
        let from = nodes[parent].pos[step_axis];
        let (lo, hi) = (from.min(pos[step_axis]), from.max(pos[step_axis]));
        for c in lo + 1..hi {
            let mut p = pos;
            p[step_axis] = c;
            taken.insert(p);
        }
        taken.insert(pos);

        nodes.push(node);
        note_node(&mut frontier, &mut extent, &nodes, id);
    }

    resolve_crossings(&mut nodes);
    Plan { nodes }
}

/// Capped geometric step length: every extra tile of corridor halves the
/// probability, so short corridors dominate.
fn sample_step(cap: i32, rng: &mut impl Rng) -> i32 {
    let mut step = 1;
    while step < cap && rng.gen_bool(0.5) {
        step += 1;
    }
    step
}

/// Record a freshly placed node in the frontier maps and the global extent.
fn note_node(
    frontier: &mut [[BTreeMap<i32, NodeId>; 2]; AXES],
    extent: &mut [[i32; 2]; AXES],
    nodes: &[PlanNode],
    id: NodeId,
) {
    let pos = nodes[id].pos;
    for axis in 0..AXES {
        extent[axis][0] = extent[axis][0].min(pos[axis]);
        extent[axis][1] = extent[axis][1].max(pos[axis]);

        let column = pos[1 - axis];
        for dir in 0..2 {
            let slot = frontier[axis][dir].entry(column).or_insert(id);
            let held = nodes[*slot].pos[axis];
            let better = match dir {
                0 => pos[axis] < held,
                _ => pos[axis] > held,
            };
            if better {
                *slot = id;
            }
        }
    }
}

/// Find every pair of perpendicular corridors whose spans strictly overlap
/// at right angles and record each on the other's edge, so the materializer
/// can interrupt the walls where the corridors pass through each other.
fn resolve_crossings(nodes: &mut [PlanNode]) {
    struct Corridor {
        node: NodeId,
        parent: NodeId,
        /// Axis the corridor runs along
        axis: usize,
        /// Coordinate on the perpendicular axis, shared by both endpoints
        fixed: i32,
        lo: i32,
        hi: i32,
    }

    let corridors: Vec<Corridor> = nodes
        .iter()
        .skip(1)
        .map(|node| {
            let (axis, _, edge) = node
                .incoming()
                .expect("non-root node has an incoming edge");
            let parent = edge.to;
            let a = nodes[parent].pos[axis];
            let b = node.pos[axis];
            Corridor {
                node: node.id,
                parent,
                axis,
                fixed: node.pos[1 - axis],
                lo: a.min(b),
                hi: a.max(b),
            }
        })
        .collect();

    for (i, a) in corridors.iter().enumerate() {
        for b in corridors.iter().skip(i + 1) {
            if a.axis == b.axis {
                continue;
            }
            // Strict interior overlap on both spans.
            if b.fixed > a.lo && b.fixed < a.hi && a.fixed > b.lo && a.fixed < b.hi {
                push_crossing(nodes, a.node, a.parent, a.axis, b.node);
                push_crossing(nodes, b.node, b.parent, b.axis, a.node);
            }
        }
    }

    for node in nodes.iter_mut() {
        for slots in &mut node.edges {
            for slot in slots.iter_mut().flatten() {
                slot.crossings.sort_unstable();
            }
        }
    }
}

/// Record `other` as crossing the corridor between `parent` and `node`, on
/// both directed edges so the reverse slot agrees.
fn push_crossing(nodes: &mut [PlanNode], node: NodeId, parent: NodeId, axis: usize, other: NodeId) {
    let dir = (nodes[node].pos[axis] > nodes[parent].pos[axis]) as usize;
    nodes[parent].edges[axis][dir]
        .as_mut()
        .expect("corridor endpoint lost its edge")
        .crossings
        .push(other);
    nodes[node].edges[axis][1 - dir]
        .as_mut()
        .expect("corridor endpoint lost its edge")
        .crossings
        .push(other);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn assert_well_formed(plan: &Plan) {
        let n = plan.nodes.len();
        assert_eq!(plan.edge_count(), n - 1);

        for node in &plan.nodes {
            for axis in 0..AXES {
                for dir in 0..2 {
                    let Some(edge) = &node.edges[axis][dir] else {
                        continue;
                    };
                    let peer = &plan.nodes[edge.to];
                    // Endpoints share the perpendicular coordinate.
                    assert_eq!(node.pos[1 - axis], peer.pos[1 - axis]);
                    // The reverse slot agrees in destination and crossings.
                    let reverse = peer.edges[axis][1 - dir]
                        .as_ref()
                        .expect("reverse edge missing");
                    assert_eq!(reverse.to, node.id);
                    assert_eq!(reverse.crossings, edge.crossings);
                    assert!(edge.crossings.windows(2).all(|w| w[0] < w[1]));
                }
            }
        }

        // Every node reachable from the root.
        let mut seen = vec![false; n];
        let mut stack = vec![0];
        seen[0] = true;
        while let Some(at) = stack.pop() {
            for slots in &plan.nodes[at].edges {
                for edge in slots.iter().flatten() {
                    if !seen[edge.to] {
                        seen[edge.to] = true;
                        stack.push(edge.to);
                    }
                }
            }
        }
        assert!(seen.iter().all(|&s| s));

        // No two nodes share a lattice position.
        let positions: HashSet<[i32; AXES]> = plan.nodes.iter().map(|n| n.pos).collect();
        assert_eq!(positions.len(), n);
    }

    #[test]
    fn test_single_node_plan() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let plan = generate_plan(1, &mut rng);
        assert_eq!(plan.nodes.len(), 1);
        assert_eq!(plan.nodes[0].pos, [0, 0]);
        assert_eq!(plan.edge_count(), 0);
    }

    #[test]
    fn test_plan_is_a_tree() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let plan = generate_plan(40, &mut rng);
        assert_well_formed(&plan);
    }

    #[test]
    fn test_same_seed_reproduces_the_plan() {
        let a = generate_plan(5, &mut ChaCha8Rng::seed_from_u64(7));
        let b = generate_plan(5, &mut ChaCha8Rng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_nodes_never_land_on_corridors() {
        for seed in 0..16 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let plan = generate_plan(30, &mut rng);

            let mut interiors = HashSet::new();
            for node in plan.nodes.iter().skip(1) {
                let (axis, _, edge) = node.incoming().unwrap();
                let parent = &plan.nodes[edge.to];
                let (lo, hi) = (
                    parent.pos[axis].min(node.pos[axis]),
                    parent.pos[axis].max(node.pos[axis]),
                );
                for c in lo + 1..hi {
                    let mut p = node.pos;
                    p[axis] = c;
                    interiors.insert(p);
                }
            }
            for node in &plan.nodes {
                assert!(!interiors.contains(&node.pos));
            }
        }
    }

    #[test]
    fn test_step_lengths_respect_the_cap() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..200 {
            let step = sample_step(4, &mut rng);
            assert!((1..=4).contains(&step));
        }
        assert_eq!(sample_step(1, &mut rng), 1);
    }

    proptest! {
        #[test]
        fn prop_generated_plans_are_well_formed(n in 1usize..48, seed in any::<u64>()) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let plan = generate_plan(n, &mut rng);
            prop_assert_eq!(plan.nodes.len(), n);
            assert_well_formed(&plan);
        }
    }
}
