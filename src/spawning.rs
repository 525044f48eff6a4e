//! Data-driven tile object spawning.
//!
//! Mob species are plain data: stats plus a function that wires the species
//! decision tree for a given spawn point. Adding a species means adding a
//! `MobDef`, not new movement code.

use hecs::{Entity, World};

use crate::ai::{Brain, DecisionNode, DecisionTree, Predicate, StepOrder};
use crate::components::{
    Experience, Health, Item, ItemSpec, Label, MobStats, Portal, Position, TileKind,
};
use crate::constants::*;
use crate::inventory::Inventory;

/// Definition of a mob species - all the data needed to spawn one
#[derive(Clone)]
pub struct MobDef {
    /// Display name (for logs and UI)
    pub name: &'static str,
    pub kind: TileKind,
    pub max_health: i32,
    pub damage: i32,
    pub attack_radius: i32,
    pub exp_reward: u32,
    /// Builds the species decision tree for a mob spawned at the given point
    pub brain: fn(Position) -> DecisionTree,
}

impl MobDef {
    /// Spawn one mob of this species at the given position
    pub fn spawn(&self, ecs: &mut World, pos: Position) -> Entity {
        ecs.spawn((
            pos,
            self.kind,
            Health::new(self.max_health),
            MobStats {
                damage: self.damage,
                attack_radius: self.attack_radius,
                exp_reward: self.exp_reward,
            },
            Brain {
                tree: (self.brain)(pos),
            },
        ))
    }
}

/// Predefined mob species
pub mod mobs {
    use super::*;

    pub const ORC: MobDef = MobDef {
        name: "Orc",
        kind: TileKind::Orc,
        max_health: ORC_HEALTH,
        damage: ORC_DAMAGE,
        attack_radius: ORC_ATTACK_RADIUS,
        exp_reward: ORC_EXP_REWARD,
        brain: orc_brain,
    };

    pub const BAT: MobDef = MobDef {
        name: "Bat",
        kind: TileKind::Bat,
        max_health: BAT_HEALTH,
        damage: BAT_DAMAGE,
        attack_radius: BAT_ATTACK_RADIUS,
        exp_reward: BAT_EXP_REWARD,
        brain: bat_brain,
    };

    /// Strike when the player is in reach, close in while they are in sight,
    /// otherwise wander.
    fn orc_brain(spawn: Position) -> DecisionTree {
        DecisionTree::new(
            vec![
                DecisionNode::Condition {
                    arms: vec![
                        (
                            Predicate::StrikeChance {
                                radius: ORC_ATTACK_RADIUS,
                                hesitation: ORC_STRIKE_HESITATION,
                            },
                            1,
                        ),
                        (
                            Predicate::PlayerWithin {
                                radius: ORC_SIGHT_RADIUS,
                            },
                            2,
                        ),
                    ],
                    fallback: 3,
                },
                DecisionNode::Attack,
                DecisionNode::Step {
                    order: StepOrder::Closer,
                },
                DecisionNode::RandomWalk {
                    spawn,
                    max_range: MOB_WALK_RANGE,
                },
            ],
            0,
        )
    }

    /// Sometimes sleep, flee while the player is close, otherwise wander.
    fn bat_brain(spawn: Position) -> DecisionTree {
        DecisionTree::new(
            vec![
                DecisionNode::Condition {
                    arms: vec![
                        (
                            Predicate::Chance {
                                one_in: BAT_SLEEP_ONE_IN,
                            },
                            1,
                        ),
                        (
                            Predicate::PlayerWithin {
                                radius: BAT_FLEE_RADIUS,
                            },
                            2,
                        ),
                    ],
                    fallback: 3,
                },
                DecisionNode::Wait,
                DecisionNode::Step {
                    order: StepOrder::Farther,
                },
                DecisionNode::RandomWalk {
                    spawn,
                    max_range: MOB_WALK_RANGE,
                },
            ],
            0,
        )
    }
}

pub fn spawn_player(ecs: &mut World, pos: Position) -> Entity {
    ecs.spawn((
        pos,
        TileKind::Player,
        Health::new(PLAYER_MAX_HEALTH),
        Experience::default(),
        Inventory::new(STASH_CAPACITY),
    ))
}

pub fn spawn_wall(ecs: &mut World, pos: Position) -> Entity {
    ecs.spawn((pos, TileKind::Wall))
}

/// Border segment of a room: `VerticalBorder`, `HorizontalBorder` or `Corner`
pub fn spawn_border(ecs: &mut World, pos: Position, kind: TileKind) -> Entity {
    debug_assert!(matches!(
        kind,
        TileKind::VerticalBorder | TileKind::HorizontalBorder | TileKind::Corner
    ));
    ecs.spawn((pos, kind))
}

pub fn spawn_stone(ecs: &mut World, pos: Position, label: &str) -> Entity {
    ecs.spawn((pos, TileKind::Stone, Label(label.to_string())))
}

pub fn spawn_chest(ecs: &mut World, pos: Position) -> Entity {
    ecs.spawn((pos, TileKind::Chest))
}

pub fn spawn_exit(ecs: &mut World, pos: Position) -> Entity {
    ecs.spawn((pos, TileKind::Exit))
}

/// Enter portal. The label names the target level; the handle to it stays
/// unresolved until that level is loaded or lazily generated.
pub fn spawn_enter(ecs: &mut World, pos: Position, label: impl Into<String>) -> Entity {
    let label = label.into();
    ecs.spawn((
        pos,
        TileKind::Enter,
        Label(label.clone()),
        Portal::unresolved(label),
    ))
}

pub fn spawn_item(ecs: &mut World, pos: Position, spec: ItemSpec) -> Entity {
    ecs.spawn((pos, TileKind::Item, Item { spec }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mob_def_attaches_stats_and_brain() {
        let mut ecs = World::new();
        let orc = mobs::ORC.spawn(&mut ecs, Position::new(3, 4));

        assert_eq!(*ecs.get::<&TileKind>(orc).unwrap(), TileKind::Orc);
        let stats = ecs.get::<&MobStats>(orc).unwrap();
        assert_eq!(stats.damage, ORC_DAMAGE);
        assert_eq!(stats.exp_reward, ORC_EXP_REWARD);
        assert!(ecs.get::<&Brain>(orc).is_ok());
    }

    #[test]
    fn test_player_starts_with_empty_inventory() {
        let mut ecs = World::new();
        let player = spawn_player(&mut ecs, Position::new(0, 0));

        let inventory = ecs.get::<&Inventory>(player).unwrap();
        assert!(inventory.stash().is_empty());
        assert!(inventory.hand.is_none());
        let health = ecs.get::<&Health>(player).unwrap();
        assert_eq!(health.current, PLAYER_MAX_HEALTH);
    }

    #[test]
    fn test_enter_portal_starts_unresolved() {
        let mut ecs = World::new();
        let enter = spawn_enter(&mut ecs, Position::new(1, 1), "B");

        let portal = ecs.get::<&Portal>(enter).unwrap();
        assert_eq!(portal.label, "B");
        assert!(portal.target.is_none());
    }
}
