//! Player actions and game events.
//!
//! The input collaborator produces one `Action` per turn; the core applies it
//! and emits `GameEvent`s that the presentation layer (UI, log, audio) can
//! consume without tight coupling to the simulation.

use hecs::Entity;

use crate::components::Position;
use crate::level::LevelId;

/// One of the four orthogonal movement directions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// One player input per turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move(Direction),
    /// Interact with a targeted tile object (portal, mob, ground item, ...)
    Apply { target: Entity },
    /// Swap the stash item in `slot` into the hand
    ApplyItem { slot: usize },
    Wait,
}

/// Events the core emits for the presentation layer
#[derive(Debug, Clone)]
pub enum GameEvent {
    /// A mob struck the player
    MobAttacked { mob: Entity, damage: i32 },
    /// A mob died and was removed from its level
    MobDied {
        mob: Entity,
        position: Position,
        exp_reward: u32,
    },
    /// Player leveled up
    LevelUp { new_level: u32 },
    /// Player picked an item off the ground
    ItemPickedUp { item: Entity },
    /// Player descended through an enter portal
    PortalEntered { level: LevelId },
    /// Player returned through an exit
    PortalExited { level: LevelId },
    /// A level was generated on demand
    LevelGenerated { level: LevelId },
}

/// Simple event queue - events are pushed during turn processing,
/// drained by the presentation layer afterwards
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Push an event to be processed later
    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drain all events for processing
    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }

    /// Check if there are pending events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
