//! Read-only helpers over levels and actors.

use std::collections::{HashSet, VecDeque};

use hecs::Entity;

use crate::components::{MobStats, Position};
use crate::inventory::Inventory;
use crate::level::Level;

/// Interaction reach: portals, exits and ground items respond to an apply
/// from at most one tile away.
pub fn adjacent(a: Position, b: Position) -> bool {
    a.manhattan(b) <= 1
}

/// Coordinates threatened from `origin` within Manhattan radius `radius`.
/// A breadth-first flood around obstacles, so a wall shields the tiles
/// behind it.
pub fn attack_area(level: &Level, origin: Position, radius: i32) -> HashSet<Position> {
    let mut area = HashSet::from([origin]);
    let mut queue = VecDeque::from([origin]);
    while let Some(at) = queue.pop_front() {
        for (dx, dy) in [(0, -1), (0, 1), (1, 0), (-1, 0)] {
            let next = Position::new(at.x + dx, at.y + dy);
            if next.manhattan(origin) <= radius
                && !level.obstacles.is_occupied(next)
                && area.insert(next)
            {
                queue.push_back(next);
            }
        }
    }
    area
}

/// The player's threatened area: the reach of the hand item, or just their
/// own tile when the hand is empty.
pub fn player_attack_area(
    ecs: &hecs::World,
    level: &Level,
    player: Entity,
) -> HashSet<Position> {
    let origin = *ecs.get::<&Position>(player).expect("player has no Position");
    let radius = ecs
        .get::<&Inventory>(player)
        .ok()
        .and_then(|inv| inv.hand.map(|hand| hand.radius))
        .unwrap_or(0);
    attack_area(level, origin, radius)
}

/// A mob's threatened area, from its attack radius.
pub fn mob_attack_area(ecs: &hecs::World, level: &Level, mob: Entity) -> HashSet<Position> {
    let origin = *ecs.get::<&Position>(mob).expect("mob has no Position");
    let radius = ecs
        .get::<&MobStats>(mob)
        .map(|stats| stats.attack_radius)
        .unwrap_or(0);
    attack_area(level, origin, radius)
}
