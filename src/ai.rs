//! Decision-tree AI for autonomous mobs.
//!
//! Each mob carries a `Brain` holding a small tree of decision nodes.
//! Once per turn the interpreter walks the tree from the root: condition
//! nodes pick a branch, terminal nodes (walk, step, attack, wait) perform
//! one action and stop. Species differ only in how the tree is wired at
//! spawn time - there is no per-species movement code.

use hecs::Entity;
use rand::Rng;

use crate::components::{Health, MobStats, Position};
use crate::events::{EventQueue, GameEvent};
use crate::level::Level;

/// Index of a node inside its `DecisionTree`
pub type NodeId = usize;

/// Predicates evaluated by condition nodes
#[derive(Debug, Clone)]
pub enum Predicate {
    /// True with probability 1-in-`one_in`
    Chance { one_in: u32 },
    /// Player within `radius` (Manhattan)
    PlayerWithin { radius: i32 },
    /// Attack opportunity: always true strictly inside `radius`, true with
    /// probability 1-in-`hesitation` at exactly `radius`
    StrikeChance { radius: i32, hesitation: u32 },
}

/// Whether a step node prefers shrinking or growing the distance to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOrder {
    Closer,
    Farther,
}

#[derive(Debug, Clone)]
pub enum DecisionNode {
    /// First predicate that holds wins; none -> fallback. Order matters.
    Condition {
        arms: Vec<(Predicate, NodeId)>,
        fallback: NodeId,
    },
    /// Terminal: move to a uniformly chosen unoccupied neighbor (or stay).
    /// `spawn` and `max_range` are kept for a return-to-spawn bias that is
    /// not implemented; past `max_range` the walk still roams freely.
    RandomWalk { spawn: Position, max_range: i32 },
    /// Terminal: step to the candidate ranked best by distance to the player
    Step { order: StepOrder },
    /// Terminal: apply the mob's damage to the player
    Attack,
    /// Terminal: do nothing
    Wait,
}

/// Per-actor decision tree. Every path from the root ends in a terminal
/// node, so interpretation always halts.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<DecisionNode>,
    root: NodeId,
}

impl DecisionTree {
    pub fn new(nodes: Vec<DecisionNode>, root: NodeId) -> Self {
        assert!(root < nodes.len(), "root node out of bounds");
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &DecisionNode {
        &self.nodes[id]
    }
}

/// Brain component attached to every mob
#[derive(Debug, Clone)]
pub struct Brain {
    pub tree: DecisionTree,
}

/// Candidate moves: stay plus the four orthogonal neighbors
const CANDIDATES: [(i32, i32); 5] = [(0, 0), (0, 1), (0, -1), (1, 0), (-1, 0)];

/// Run one full interpretation pass for a mob: start at the root and follow
/// `decide` results until a terminal returns `None`.
pub fn run_turn(
    ecs: &mut hecs::World,
    level: &mut Level,
    mob: Entity,
    player: Entity,
    rng: &mut impl Rng,
    events: &mut EventQueue,
) {
    let tree = match ecs.get::<&Brain>(mob) {
        Ok(brain) => brain.tree.clone(),
        Err(_) => return,
    };

    let mut cursor = Some(tree.root());
    while let Some(id) = cursor {
        cursor = decide(&tree, id, ecs, level, mob, player, rng, events);
    }
}

/// Evaluate one node; `Some(next)` continues the walk, `None` ends the turn.
#[allow(clippy::too_many_arguments)]
fn decide(
    tree: &DecisionTree,
    id: NodeId,
    ecs: &mut hecs::World,
    level: &mut Level,
    mob: Entity,
    player: Entity,
    rng: &mut impl Rng,
    events: &mut EventQueue,
) -> Option<NodeId> {
    match tree.node(id) {
        DecisionNode::Condition { arms, fallback } => {
            for (predicate, next) in arms {
                if eval_predicate(predicate, ecs, mob, player, rng) {
                    return Some(*next);
                }
            }
            Some(*fallback)
        }
        DecisionNode::RandomWalk { .. } => {
            let candidates = unoccupied_candidates(ecs, level, mob);
            if let Some(&pos) = pick_uniform(&candidates, rng) {
                level.move_object(ecs, mob, pos);
            }
            None
        }
        DecisionNode::Step { order } => {
            let player_pos = position_of(ecs, player);
            let candidates = unoccupied_candidates(ecs, level, mob);
            let best: Vec<Position> = match best_by_distance(&candidates, player_pos, *order) {
                Some(best_dist) => candidates
                    .into_iter()
                    .filter(|c| c.manhattan(player_pos) == best_dist)
                    .collect(),
                None => Vec::new(),
            };
            if let Some(&pos) = pick_uniform(&best, rng) {
                level.move_object(ecs, mob, pos);
            }
            None
        }
        DecisionNode::Attack => {
            let damage = ecs
                .get::<&MobStats>(mob)
                .map(|stats| stats.damage)
                .unwrap_or(0);
            if let Ok(mut health) = ecs.get::<&mut Health>(player) {
                health.damage(damage);
                events.push(GameEvent::MobAttacked { mob, damage });
            }
            None
        }
        DecisionNode::Wait => None,
    }
}

fn eval_predicate(
    predicate: &Predicate,
    ecs: &hecs::World,
    mob: Entity,
    player: Entity,
    rng: &mut impl Rng,
) -> bool {
    match predicate {
        Predicate::Chance { one_in } => rng.gen_range(0..*one_in) == 0,
        Predicate::PlayerWithin { radius } => {
            let dist = position_of(ecs, mob).manhattan(position_of(ecs, player));
            dist <= *radius
        }
        Predicate::StrikeChance { radius, hesitation } => {
            let dist = position_of(ecs, mob).manhattan(position_of(ecs, player));
            if dist < *radius {
                // Close enough that the player could strike first next turn
                true
            } else if dist == *radius {
                rng.gen_range(0..*hesitation) == 0
            } else {
                false
            }
        }
    }
}

fn position_of(ecs: &hecs::World, entity: Entity) -> Position {
    *ecs.get::<&Position>(entity)
        .expect("actor has no Position")
}

/// Candidate positions (stay + neighbors) not occupied by another object
fn unoccupied_candidates(ecs: &hecs::World, level: &Level, mob: Entity) -> Vec<Position> {
    let pos = position_of(ecs, mob);
    CANDIDATES
        .iter()
        .map(|&(dx, dy)| Position::new(pos.x + dx, pos.y + dy))
        .filter(|&candidate| !level.obstacles.is_occupied_excluding(candidate, mob))
        .collect()
}

fn best_by_distance(candidates: &[Position], target: Position, order: StepOrder) -> Option<i32> {
    let distances = candidates.iter().map(|c| c.manhattan(target));
    match order {
        StepOrder::Closer => distances.min(),
        StepOrder::Farther => distances.max(),
    }
}

fn pick_uniform<'a>(candidates: &'a [Position], rng: &mut impl Rng) -> Option<&'a Position> {
    if candidates.is_empty() {
        None
    } else {
        Some(&candidates[rng.gen_range(0..candidates.len())])
    }
}
