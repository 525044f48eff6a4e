//! ECS components for tile objects.
//!
//! Every placed element of a level is an entity carrying a `Position` and a
//! `TileKind`. Optional capabilities (health, label, portal target, mob
//! stats) are extra components queried through `hecs::World::get` — most
//! objects don't have them.

use crate::constants::*;
use crate::events::Direction;

/// Position component - world coordinates (grid-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another position
    pub fn manhattan(&self, other: Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// The neighboring position one tile in the given direction
    pub fn step(&self, dir: Direction) -> Position {
        let (dx, dy) = dir.delta();
        Position::new(self.x + dx, self.y + dy)
    }
}

/// Descriptor component - what kind of tile object an entity is.
/// The rendering collaborator maps these to glyphs/colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileKind {
    Player,
    Wall,
    VerticalBorder,
    HorizontalBorder,
    Corner,
    /// Solid dungeon block, usually labeled
    Stone,
    Chest,
    /// Enter portal leading down into another level
    Enter,
    /// The level's designated exit, also the entry point for incoming navigation
    Exit,
    Orc,
    Bat,
    /// Item lying on the ground
    Item,
}

/// Health component
#[derive(Debug, Clone, Copy)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    pub fn damage(&mut self, amount: i32) {
        self.current = (self.current - amount).max(0);
    }

    pub fn heal(&mut self, amount: i32) {
        self.current = (self.current + amount).min(self.max);
    }

    pub fn is_dead(&self) -> bool {
        self.current == 0
    }
}

/// Label component - named region, e.g. a wall or block labeled "dungeon"
#[derive(Debug, Clone)]
pub struct Label(pub String);

/// Combat stats for autonomous mobs
#[derive(Debug, Clone, Copy)]
pub struct MobStats {
    pub damage: i32,
    pub attack_radius: i32,
    pub exp_reward: u32,
}

/// Enter-portal component. The target level is resolved at most once: either
/// linked by name when a loaded world is assembled, or set when the level is
/// lazily generated on first traversal.
#[derive(Debug, Clone)]
pub struct Portal {
    pub label: String,
    pub target: Option<crate::level::LevelId>,
}

impl Portal {
    pub fn unresolved(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: None,
        }
    }
}

/// Stats of a carriable item. All current items are hand weapons that damage
/// every enemy within `radius` of the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemSpec {
    pub damage: i32,
    pub radius: i32,
}

impl ItemSpec {
    /// The basic weapon: stick, sword, whatever the renderer calls it
    pub fn stick() -> Self {
        Self {
            damage: STICK_DAMAGE,
            radius: STICK_RADIUS,
        }
    }
}

/// Ground-item component carried by `TileKind::Item` entities
#[derive(Debug, Clone, Copy)]
pub struct Item {
    pub spec: ItemSpec,
}

/// Experience component - player level progression
#[derive(Debug, Clone, Copy)]
pub struct Experience {
    pub level: u32,
    pub current: u32,
}

impl Default for Experience {
    fn default() -> Self {
        Self { level: 0, current: 0 }
    }
}

/// XP needed to advance past the given level
pub fn exp_for_level(level: u32) -> u32 {
    let mut threshold = BASE_LEVEL_EXP;
    for _ in 0..level {
        threshold = threshold * 3 / 2;
    }
    threshold
}

impl Experience {
    /// Limit for the current level
    pub fn level_exp(&self) -> u32 {
        exp_for_level(self.level)
    }

    /// Add experience, handling level ups. Returns true if a level was gained.
    pub fn grant(&mut self, amount: u32) -> bool {
        self.current += amount;
        let mut leveled_up = false;
        while self.current >= exp_for_level(self.level) {
            self.current -= exp_for_level(self.level);
            self.level += 1;
            leveled_up = true;
        }
        leveled_up
    }
}
