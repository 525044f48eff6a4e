//! Simulation core of a tile-based dungeon crawler.
//!
//! Three coupled pieces: a procedural layout generator (`dungeon_gen`), a
//! world model with stacked navigation between lazily generated levels
//! (`game_state`, `level`), and a decision-tree interpreter driving mobs
//! each turn (`ai`). Rendering, input decoding and file IO live outside
//! this crate; they talk to the core through `events::Action`, the level
//! object lists and `events::GameEvent`.

pub mod ai;
pub mod components;
pub mod constants;
pub mod dungeon_gen;
pub mod events;
pub mod game_state;
pub mod inventory;
pub mod level;
pub mod loader;
pub mod obstacles;
pub mod queries;
pub mod spawning;

pub use events::{Action, Direction, GameEvent};
pub use game_state::GameState;
pub use level::{Level, LevelId};
