//! Per-level occupancy index for movement legality checks.
//!
//! Maintains persistent maps of occupied coordinates that are updated
//! incrementally as objects spawn, move, and die, rather than rebuilt by
//! scanning the object list on every query.

use std::collections::HashMap;

use hecs::Entity;

use crate::components::Position;

/// Set of coordinates occupied by tile objects of one level.
///
/// Several objects may intentionally share a coordinate (corner tiles at
/// crossing corridors, the player standing on the exit), so each position
/// maps to the list of entities on it.
#[derive(Debug, Clone, Default)]
pub struct ObstacleIndex {
    /// Position -> entities occupying it
    occupied: HashMap<Position, Vec<Entity>>,

    /// Entity -> position mapping for fast lookup during moves and removal
    positions: HashMap<Entity, Position>,
}

impl ObstacleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object at a position. A second insert for the same entity
    /// is a defect.
    pub fn insert(&mut self, entity: Entity, pos: Position) {
        let previous = self.positions.insert(entity, pos);
        assert!(previous.is_none(), "entity registered twice in obstacle index");
        self.occupied.entry(pos).or_default().push(entity);
    }

    /// Move a tracked object to a new position.
    pub fn move_to(&mut self, entity: Entity, new_pos: Position) {
        let old_pos = self
            .positions
            .insert(entity, new_pos)
            .expect("moved entity is not tracked by obstacle index");
        self.detach(entity, old_pos);
        self.occupied.entry(new_pos).or_default().push(entity);
    }

    /// Remove a tracked object. Removing an unknown entity is a defect.
    pub fn remove(&mut self, entity: Entity) {
        let pos = self
            .positions
            .remove(&entity)
            .expect("removed entity is not tracked by obstacle index");
        self.detach(entity, pos);
    }

    fn detach(&mut self, entity: Entity, pos: Position) {
        let slot = self
            .occupied
            .get_mut(&pos)
            .expect("obstacle index out of sync with entity positions");
        let idx = slot
            .iter()
            .position(|&e| e == entity)
            .expect("obstacle index out of sync with entity positions");
        slot.swap_remove(idx);
        if slot.is_empty() {
            self.occupied.remove(&pos);
        }
    }

    /// Point-occupancy query.
    #[inline]
    pub fn is_occupied(&self, pos: Position) -> bool {
        self.occupied.contains_key(&pos)
    }

    /// Point-occupancy query ignoring one entity (usually the mover itself).
    pub fn is_occupied_excluding(&self, pos: Position, exclude: Entity) -> bool {
        self.occupied
            .get(&pos)
            .map(|slot| slot.iter().any(|&e| e != exclude))
            .unwrap_or(false)
    }

    /// Whether this index tracks the entity at all.
    pub fn contains(&self, entity: Entity) -> bool {
        self.positions.contains_key(&entity)
    }

    /// Position of a tracked entity, if any.
    pub fn position_of(&self, entity: Entity) -> Option<Position> {
        self.positions.get(&entity).copied()
    }
}
