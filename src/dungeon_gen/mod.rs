//! Procedural level generation: an abstract layout pass and a concrete
//! materialization pass.
//!
//! `layout::generate_plan` grows a random tree of room nodes on a lattice;
//! `materialize::materialize` scales it up and emits the actual border,
//! wall, portal and actor tiles into a fresh `Level`.

pub mod layout;
pub mod materialize;

pub use layout::{generate_plan, Plan, PlanEdge, PlanNode};
pub use materialize::materialize;
