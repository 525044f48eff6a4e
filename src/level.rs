//! A single dungeon level and its tile objects.
//!
//! Levels don't own entity storage directly - all components live in the
//! shared `hecs::World`. A level owns the *membership*: per-kind entity
//! lists, the flat object list the renderer iterates, the occupancy index,
//! and the designated exit that incoming navigation lands on.

use hecs::Entity;

use crate::components::{Position, TileKind};
use crate::obstacles::ObstacleIndex;

/// Stable handle into the world's level arena. Portals store this instead of
/// an owning reference, which keeps the portal -> level -> portal cycle
/// ownership-free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LevelId(pub usize);

#[derive(Debug)]
pub struct Level {
    pub name: String,

    // Per-kind collections
    pub enters: Vec<Entity>,
    pub mobs: Vec<Entity>,
    pub items: Vec<Entity>,
    pub chests: Vec<Entity>,
    pub walls: Vec<Entity>,
    pub borders: Vec<Entity>,
    pub stones: Vec<Entity>,

    /// Flat lookup list of everything on the level, including the player
    /// once registered. Kept in sync with the typed collections.
    pub objects: Vec<Entity>,

    /// Occupied-coordinate index for movement legality checks
    pub obstacles: ObstacleIndex,

    exit: Option<Entity>,
    exit_pos: Option<Position>,
}

impl Level {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enters: Vec::new(),
            mobs: Vec::new(),
            items: Vec::new(),
            chests: Vec::new(),
            walls: Vec::new(),
            borders: Vec::new(),
            stones: Vec::new(),
            objects: Vec::new(),
            obstacles: ObstacleIndex::new(),
            exit: None,
            exit_pos: None,
        }
    }

    /// Add a freshly spawned tile object to this level, routing it into the
    /// right typed collection by its `TileKind`.
    pub fn push_object(&mut self, ecs: &hecs::World, entity: Entity) {
        let kind = *ecs
            .get::<&TileKind>(entity)
            .expect("tile object has no TileKind");
        let pos = *ecs
            .get::<&Position>(entity)
            .expect("tile object has no Position");

        match kind {
            TileKind::Enter => self.enters.push(entity),
            TileKind::Orc | TileKind::Bat => self.mobs.push(entity),
            TileKind::Item => self.items.push(entity),
            TileKind::Chest => self.chests.push(entity),
            TileKind::Wall => self.walls.push(entity),
            TileKind::VerticalBorder | TileKind::HorizontalBorder | TileKind::Corner => {
                self.borders.push(entity)
            }
            TileKind::Stone => self.stones.push(entity),
            TileKind::Exit => {
                assert!(self.exit.is_none(), "level already has an exit");
                self.exit = Some(entity);
                self.exit_pos = Some(pos);
            }
            TileKind::Player => {
                panic!("player joins a level via register_player, not push_object")
            }
        }
        self.objects.push(entity);
        self.obstacles.insert(entity, pos);
    }

    /// Register the player as a member of this level. Idempotent for the
    /// object list; the obstacle entry is re-created on every visit.
    pub fn register_player(&mut self, ecs: &hecs::World, player: Entity) {
        let pos = *ecs
            .get::<&Position>(player)
            .expect("player has no Position");
        if !self.objects.contains(&player) {
            self.objects.push(player);
        }
        self.obstacles.insert(player, pos);
    }

    /// Drop the player's occupancy when they leave for another level. The
    /// player stays in the flat object list of every level they have visited.
    pub fn unregister_player(&mut self, player: Entity) {
        self.obstacles.remove(player);
    }

    /// Move a tracked object one or more tiles, keeping the position
    /// component and the occupancy index in sync.
    pub fn move_object(&mut self, ecs: &mut hecs::World, entity: Entity, to: Position) {
        {
            let mut pos = ecs
                .get::<&mut Position>(entity)
                .expect("moved entity has no Position");
            *pos = to;
        }
        self.obstacles.move_to(entity, to);
    }

    /// Remove a defeated/consumed object from the level and despawn it.
    /// The typed collection, the flat list, and the obstacle index must all
    /// contain it; a miss in any of them is a defect.
    pub fn remove_object(&mut self, ecs: &mut hecs::World, entity: Entity) {
        let kind = *ecs
            .get::<&TileKind>(entity)
            .expect("removed entity has no TileKind");

        let typed: &mut Vec<Entity> = match kind {
            TileKind::Enter => &mut self.enters,
            TileKind::Orc | TileKind::Bat => &mut self.mobs,
            TileKind::Item => &mut self.items,
            TileKind::Chest => &mut self.chests,
            TileKind::Wall => &mut self.walls,
            TileKind::VerticalBorder | TileKind::HorizontalBorder | TileKind::Corner => {
                &mut self.borders
            }
            TileKind::Stone => &mut self.stones,
            TileKind::Exit | TileKind::Player => {
                panic!("the exit and the player are never removed from a level")
            }
        };

        let idx = typed
            .iter()
            .position(|&e| e == entity)
            .expect("removed entity missing from its typed collection");
        typed.remove(idx);

        let flat_idx = self
            .objects
            .iter()
            .position(|&e| e == entity)
            .expect("removed entity missing from the flat object list");
        self.objects.remove(flat_idx);

        self.obstacles.remove(entity);
        ecs.despawn(entity).expect("removed entity already despawned");
    }

    /// The level's entry point for incoming navigation.
    pub fn start_pos(&self) -> Position {
        self.exit_pos.expect("level has no exit")
    }

    pub fn exit(&self) -> Entity {
        self.exit.expect("level has no exit")
    }

    pub fn has_exit(&self) -> bool {
        self.exit.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spawning;

    #[test]
    fn test_push_object_routes_by_kind() {
        let mut ecs = hecs::World::new();
        let mut level = Level::new("test");

        let wall = spawning::spawn_wall(&mut ecs, Position::new(0, 0));
        let orc = spawning::mobs::ORC.spawn(&mut ecs, Position::new(1, 0));
        level.push_object(&ecs, wall);
        level.push_object(&ecs, orc);

        assert_eq!(level.walls, vec![wall]);
        assert_eq!(level.mobs, vec![orc]);
        assert_eq!(level.objects, vec![wall, orc]);
        assert!(level.obstacles.is_occupied(Position::new(0, 0)));
        assert!(level.obstacles.is_occupied(Position::new(1, 0)));
    }

    #[test]
    fn test_remove_object_keeps_collections_in_sync() {
        let mut ecs = hecs::World::new();
        let mut level = Level::new("test");
        let orc = spawning::mobs::ORC.spawn(&mut ecs, Position::new(1, 0));
        level.push_object(&ecs, orc);

        level.remove_object(&mut ecs, orc);
        assert!(level.mobs.is_empty());
        assert!(level.objects.is_empty());
        assert!(!level.obstacles.is_occupied(Position::new(1, 0)));
        assert!(!ecs.contains(orc));
    }

    #[test]
    #[should_panic]
    fn test_second_exit_is_a_defect() {
        let mut ecs = hecs::World::new();
        let mut level = Level::new("test");
        let a = spawning::spawn_exit(&mut ecs, Position::new(0, 0));
        let b = spawning::spawn_exit(&mut ecs, Position::new(1, 1));
        level.push_object(&ecs, a);
        level.push_object(&ecs, b);
    }

    #[test]
    fn test_player_registration_is_idempotent_for_objects() {
        let mut ecs = hecs::World::new();
        let mut level = Level::new("test");
        let player = spawning::spawn_player(&mut ecs, Position::new(2, 2));

        level.register_player(&ecs, player);
        level.unregister_player(player);
        level.register_player(&ecs, player);
        assert_eq!(level.objects.iter().filter(|&&e| e == player).count(), 1);
        assert!(level.obstacles.is_occupied(Position::new(2, 2)));
    }
}
