//! Game constants organized by category.
//!
//! Centralizing magic numbers makes tuning easier and documents intent.

// =============================================================================
// DUNGEON GENERATION
// =============================================================================

/// Number of plan nodes (rooms) in a lazily generated level
pub const GENERATED_PLAN_NODES: usize = 15;
/// Half-width of a room box; the box is a hollow square of side `2 * BOX_WIDTH + 1`
pub const BOX_WIDTH: i32 = 3;
/// Corridor half-width; the walkable passage between corridor walls is
/// `2 * TUNNEL_WIDTH - 1` wide. Must be strictly less than `BOX_WIDTH`.
pub const TUNNEL_WIDTH: i32 = 2;
/// Minimum open span between two adjacent room borders
pub const MIN_TUNNEL_LEN: i32 = 3;
/// Region label carried by dungeon blocks
pub const DUNGEON_LABEL: &str = "dungeon";

// =============================================================================
// PLAYER
// =============================================================================

pub const PLAYER_MAX_HEALTH: i32 = 20;
/// Player level at which the game is won
pub const MAX_LEVEL: u32 = 5;
/// Experience required to leave level 0; each later level costs 1.5x more (integer)
pub const BASE_LEVEL_EXP: u32 = 15;
/// Inventory stash slots (the hand slot is separate)
pub const STASH_CAPACITY: usize = 5;

// =============================================================================
// MOBS
// =============================================================================

pub const ORC_HEALTH: i32 = 15;
pub const ORC_DAMAGE: i32 = 2;
pub const ORC_ATTACK_RADIUS: i32 = 3;
pub const ORC_SIGHT_RADIUS: i32 = 6;
pub const ORC_EXP_REWARD: u32 = 4;
/// At exactly attack radius the orc still strikes with probability 1-in-this
pub const ORC_STRIKE_HESITATION: u32 = 3;

pub const BAT_HEALTH: i32 = 7;
pub const BAT_DAMAGE: i32 = 0;
pub const BAT_ATTACK_RADIUS: i32 = 0;
pub const BAT_EXP_REWARD: u32 = 2;
/// Within this Manhattan distance of the player the bat flees
pub const BAT_FLEE_RADIUS: i32 = 5;
/// The bat sleeps through a turn with probability 1-in-this
pub const BAT_SLEEP_ONE_IN: u32 = 4;

/// Random-walk range from spawn, shared by all mobs
pub const MOB_WALK_RANGE: i32 = 8;

// =============================================================================
// ITEMS
// =============================================================================

pub const STICK_DAMAGE: i32 = 2;
pub const STICK_RADIUS: i32 = 2;
