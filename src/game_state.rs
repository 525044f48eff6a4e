//! World state and turn processing.
//!
//! `GameState` owns the ECS world, the arena of levels, the player and the
//! navigation stack of (return coordinate, level) frames; the top frame is
//! the current level. Each player input produces exactly one state
//! transition followed by one decision pass for every mob on the current
//! level, then control returns to the caller.

use hecs::Entity;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::ai;
use crate::components::{
    Experience, Health, Item, MobStats, Portal, Position, TileKind,
};
use crate::constants::*;
use crate::dungeon_gen::{generate_plan, materialize};
use crate::events::{Action, Direction, EventQueue, GameEvent};
use crate::inventory::Inventory;
use crate::level::{Level, LevelId};
use crate::loader::{self, LoadError};
use crate::queries;
use crate::spawning;

/// One step of the player's descent: the level entered and the coordinate
/// to return to on the level left behind.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub return_pos: Position,
    pub level: LevelId,
}

pub struct GameState {
    pub ecs: hecs::World,
    /// Arena of every loaded or generated level; portals hold `LevelId`
    /// handles into it. Levels live for the rest of the session.
    levels: Vec<Level>,
    /// Never shrinks below depth 1.
    stack: Vec<Frame>,
    pub player: Entity,
    pub events: EventQueue,
    rng: ChaCha8Rng,
}

impl std::fmt::Debug for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameState")
            .field("levels", &self.levels)
            .field("stack", &self.stack)
            .field("player", &self.player)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl GameState {
    /// Session rooted in a single procedurally generated level.
    pub fn generated(seed: u64) -> Self {
        let mut ecs = hecs::World::new();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let plan = generate_plan(GENERATED_PLAN_NODES, &mut rng);
        let mut level = materialize(&plan, "depths", BOX_WIDTH, TUNNEL_WIDTH, &mut ecs, &mut rng);

        let start = level.start_pos();
        let player = spawning::spawn_player(&mut ecs, start);
        level.register_player(&ecs, player);

        Self {
            ecs,
            levels: vec![level],
            stack: vec![Frame {
                return_pos: start,
                level: LevelId(0),
            }],
            player,
            events: EventQueue::new(),
            rng,
        }
    }

    /// Session assembled from named character grids. Portals whose label
    /// matches a loaded level are linked to it; the rest stay unresolved
    /// and lead to lazily generated levels. The player starts on the exit
    /// of the `start` level.
    pub fn from_grids(grids: &[(&str, &str)], start: &str, seed: u64) -> Result<Self, LoadError> {
        let mut ecs = hecs::World::new();
        let mut levels = Vec::with_capacity(grids.len());
        for (name, grid) in grids {
            levels.push(loader::parse_level(name, grid, &mut ecs)?);
        }

        for idx in 0..levels.len() {
            for enter in levels[idx].enters.clone() {
                let mut portal = ecs
                    .get::<&mut Portal>(enter)
                    .expect("enter tile has no Portal");
                if let Some(target) = levels.iter().position(|l| l.name == portal.label) {
                    portal.target = Some(LevelId(target));
                }
            }
        }

        let start_idx = levels
            .iter()
            .position(|l| l.name == start)
            .ok_or_else(|| LoadError::UnknownStartLevel {
                name: start.to_string(),
            })?;
        let start_pos = levels[start_idx].start_pos();
        let player = spawning::spawn_player(&mut ecs, start_pos);
        levels[start_idx].register_player(&ecs, player);

        Ok(Self {
            ecs,
            levels,
            stack: vec![Frame {
                return_pos: start_pos,
                level: LevelId(start_idx),
            }],
            player,
            events: EventQueue::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn current_id(&self) -> LevelId {
        self.stack
            .last()
            .expect("navigation stack is never empty")
            .level
    }

    pub fn current(&self) -> &Level {
        &self.levels[self.current_id().0]
    }

    pub fn level(&self, id: LevelId) -> &Level {
        &self.levels[id.0]
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn player_pos(&self) -> Position {
        *self
            .ecs
            .get::<&Position>(self.player)
            .expect("player has no Position")
    }

    /// Pure state query for the presentation layer; not a transition.
    pub fn is_won(&self) -> bool {
        self.ecs
            .get::<&Experience>(self.player)
            .map(|exp| exp.level >= MAX_LEVEL)
            .unwrap_or(false)
    }

    /// Pure state query for the presentation layer; not a transition.
    pub fn is_lost(&self) -> bool {
        self.ecs
            .get::<&Health>(self.player)
            .map(|health| health.is_dead())
            .unwrap_or(true)
    }

    /// Apply one player input, then run one decision pass for every mob on
    /// the current level, in spawn order.
    pub fn apply_action(&mut self, action: Action) {
        match action {
            Action::Move(dir) => self.player_move(dir),
            Action::Apply { target } => self.apply_to(target),
            Action::ApplyItem { slot } => self.apply_item(slot),
            Action::Wait => {}
        }
        self.mob_sweep();
    }

    /// Single-tile move, rejected when the destination is occupied.
    fn player_move(&mut self, dir: Direction) {
        let to = self.player_pos().step(dir);
        let id = self.current_id().0;
        let level = &mut self.levels[id];
        if !level.obstacles.is_occupied_excluding(to, self.player) {
            level.move_object(&mut self.ecs, self.player, to);
        }
    }

    /// Dispatch an interaction to the targeted tile object.
    fn apply_to(&mut self, target: Entity) {
        let Ok(kind) = self.ecs.get::<&TileKind>(target).map(|k| *k) else {
            return;
        };
        match kind {
            TileKind::Enter => self.enter_portal(target),
            TileKind::Exit => self.exit_level(target),
            TileKind::Orc | TileKind::Bat => self.melee(target),
            TileKind::Item => self.pick_up(target),
            _ => {}
        }
    }

    /// Swap a stash slot into the hand. An empty slot costs the turn and
    /// does nothing.
    fn apply_item(&mut self, slot: usize) {
        self.ecs
            .get::<&mut Inventory>(self.player)
            .expect("player has no Inventory")
            .swap_into_hand(slot);
    }

    /// Descend through an enter portal the player stands next to,
    /// materializing the target level on first traversal.
    fn enter_portal(&mut self, portal: Entity) {
        let portal_pos = *self
            .ecs
            .get::<&Position>(portal)
            .expect("portal has no Position");
        if !queries::adjacent(self.player_pos(), portal_pos) {
            return;
        }

        let target = self
            .ecs
            .get::<&Portal>(portal)
            .expect("enter tile has no Portal")
            .target;
        let target = match target {
            Some(id) => id,
            None => self.generate_level(portal),
        };

        let from = self.player_pos();
        let left = self.current_id().0;
        self.levels[left].unregister_player(self.player);
        self.stack.push(Frame {
            return_pos: from,
            level: target,
        });

        let start = self.levels[target.0].start_pos();
        self.set_player_pos(start);
        self.levels[target.0].register_player(&self.ecs, self.player);

        debug!(from = left, to = target.0, "descended through portal");
        self.events.push(GameEvent::PortalEntered { level: target });
    }

    /// Build the level behind an unresolved portal and link the portal to it.
    fn generate_level(&mut self, portal: Entity) -> LevelId {
        let name = self
            .ecs
            .get::<&Portal>(portal)
            .expect("enter tile has no Portal")
            .label
            .clone();
        let plan = generate_plan(GENERATED_PLAN_NODES, &mut self.rng);
        let level = materialize(
            &plan,
            &name,
            BOX_WIDTH,
            TUNNEL_WIDTH,
            &mut self.ecs,
            &mut self.rng,
        );

        let id = LevelId(self.levels.len());
        self.levels.push(level);
        self.ecs
            .get::<&mut Portal>(portal)
            .expect("enter tile has no Portal")
            .target = Some(id);

        info!(name = %name, id = id.0, "generated level on first traversal");
        self.events.push(GameEvent::LevelGenerated { level: id });
        id
    }

    /// Return through the level's exit. On the root level there is nowhere
    /// to go back to and the apply is a no-op.
    fn exit_level(&mut self, exit: Entity) {
        let exit_pos = *self
            .ecs
            .get::<&Position>(exit)
            .expect("exit has no Position");
        if !queries::adjacent(self.player_pos(), exit_pos) {
            return;
        }
        if self.stack.len() <= 1 {
            return;
        }

        let frame = self.stack.pop().expect("stack depth checked above");
        self.levels[frame.level.0].unregister_player(self.player);
        self.set_player_pos(frame.return_pos);
        let now = self.current_id();
        self.levels[now.0].register_player(&self.ecs, self.player);

        debug!(from = frame.level.0, to = now.0, "returned through exit");
        self.events.push(GameEvent::PortalExited { level: frame.level });
    }

    /// Strike a mob with the hand item, if any, when it is within the
    /// item's reach. A kill removes the mob and grants experience.
    fn melee(&mut self, mob: Entity) {
        let hand = self
            .ecs
            .get::<&Inventory>(self.player)
            .expect("player has no Inventory")
            .hand;
        let Some(hand) = hand else {
            return;
        };
        let mob_pos = *self.ecs.get::<&Position>(mob).expect("mob has no Position");
        if self.player_pos().manhattan(mob_pos) > hand.radius {
            return;
        }

        let dead = {
            let mut health = self.ecs.get::<&mut Health>(mob).expect("mob has no Health");
            health.damage(hand.damage);
            health.is_dead()
        };
        if !dead {
            return;
        }

        let reward = self
            .ecs
            .get::<&MobStats>(mob)
            .expect("mob has no MobStats")
            .exp_reward;
        let id = self.current_id().0;
        self.levels[id].remove_object(&mut self.ecs, mob);
        debug!(?mob_pos, reward, "mob defeated");
        self.events.push(GameEvent::MobDied {
            mob,
            position: mob_pos,
            exp_reward: reward,
        });

        let leveled_up = self
            .ecs
            .get::<&mut Experience>(self.player)
            .expect("player has no Experience")
            .grant(reward);
        if leveled_up {
            let new_level = self
                .ecs
                .get::<&Experience>(self.player)
                .expect("player has no Experience")
                .level;
            self.events.push(GameEvent::LevelUp { new_level });
        }
    }

    /// Pick a ground item up into the stash, when standing next to it and
    /// there is room.
    fn pick_up(&mut self, item: Entity) {
        let item_pos = *self
            .ecs
            .get::<&Position>(item)
            .expect("item has no Position");
        if !queries::adjacent(self.player_pos(), item_pos) {
            return;
        }
        let spec = self
            .ecs
            .get::<&Item>(item)
            .expect("item tile has no Item")
            .spec;
        let accepted = self
            .ecs
            .get::<&mut Inventory>(self.player)
            .expect("player has no Inventory")
            .put_item(spec);
        if accepted {
            let id = self.current_id().0;
            self.levels[id].remove_object(&mut self.ecs, item);
            self.events.push(GameEvent::ItemPickedUp { item });
        }
    }

    /// One decision pass for every mob on the current level, spawn order.
    fn mob_sweep(&mut self) {
        let id = self.current_id().0;
        let mobs = self.levels[id].mobs.clone();
        for mob in mobs {
            ai::run_turn(
                &mut self.ecs,
                &mut self.levels[id],
                mob,
                self.player,
                &mut self.rng,
                &mut self.events,
            );
        }
    }

    fn set_player_pos(&mut self, to: Position) {
        let mut pos = self
            .ecs
            .get::<&mut Position>(self.player)
            .expect("player has no Position");
        *pos = to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ItemSpec;

    /// Exit and portal side by side, everything in interaction reach.
    const HALL: &str = "\
+----+
| %A |
+----+";

    fn hall() -> GameState {
        GameState::from_grids(&[("hall", HALL)], "hall", 42).unwrap()
    }

    #[test]
    fn test_player_starts_on_the_exit() {
        let state = hall();
        assert_eq!(state.depth(), 1);
        assert_eq!(state.player_pos(), Position::new(2, 1));
        assert!(!state.is_won());
        assert!(!state.is_lost());
    }

    #[test]
    fn test_unknown_start_level_is_fatal() {
        let err = GameState::from_grids(&[("hall", HALL)], "nowhere", 0).unwrap_err();
        assert_eq!(
            err,
            LoadError::UnknownStartLevel {
                name: "nowhere".to_string()
            }
        );
    }

    #[test]
    fn test_move_blocked_by_border() {
        let mut state = hall();
        state.apply_action(Action::Move(Direction::Up));
        assert_eq!(state.player_pos(), Position::new(2, 1));
    }

    #[test]
    fn test_move_into_open_tile() {
        let mut state = hall();
        state.apply_action(Action::Move(Direction::Left));
        assert_eq!(state.player_pos(), Position::new(1, 1));
    }

    #[test]
    fn test_portal_round_trip_restores_position() {
        let mut state = hall();
        let portal = state.current().enters[0];
        let before = state.player_pos();

        state.apply_action(Action::Apply { target: portal });
        assert_eq!(state.depth(), 2);
        assert_eq!(state.level_count(), 2, "level generated on traversal");
        assert_eq!(state.player_pos(), state.current().start_pos());

        let exit = state.current().exit();
        state.apply_action(Action::Apply { target: exit });
        assert_eq!(state.depth(), 1);
        assert_eq!(state.player_pos(), before);
    }

    #[test]
    fn test_second_traversal_reuses_the_generated_level() {
        let mut state = hall();
        let portal = state.current().enters[0];

        state.apply_action(Action::Apply { target: portal });
        let generated = state.current_id();
        let exit = state.current().exit();
        state.apply_action(Action::Apply { target: exit });
        state.apply_action(Action::Apply { target: portal });

        assert_eq!(state.current_id(), generated);
        assert_eq!(state.level_count(), 2);
    }

    #[test]
    fn test_exit_on_root_level_is_a_noop() {
        let mut state = hall();
        let exit = state.current().exit();
        let before = state.player_pos();

        state.apply_action(Action::Apply { target: exit });
        assert_eq!(state.depth(), 1);
        assert_eq!(state.player_pos(), before);
    }

    #[test]
    fn test_portal_out_of_reach_is_ignored() {
        const WIDE: &str = "\
+------+
| %  A |
+------+";
        let mut state = GameState::from_grids(&[("wide", WIDE)], "wide", 0).unwrap();
        let portal = state.current().enters[0];

        // Distance 3 from the exit tile the player starts on.
        state.apply_action(Action::Apply { target: portal });
        assert_eq!(state.depth(), 1);
        assert_eq!(state.level_count(), 1);
    }

    #[test]
    fn test_apply_item_swaps_hand() {
        let mut state = hall();
        {
            let mut inv = state.ecs.get::<&mut Inventory>(state.player).unwrap();
            inv.put_item(ItemSpec { damage: 1, radius: 1 });
            inv.put_item(ItemSpec { damage: 9, radius: 1 });
        }

        state.apply_action(Action::ApplyItem { slot: 1 });
        let inv = state.ecs.get::<&Inventory>(state.player).unwrap();
        assert_eq!(inv.hand, Some(ItemSpec { damage: 9, radius: 1 }));
        assert_eq!(inv.stash(), &[ItemSpec { damage: 1, radius: 1 }]);
    }

    #[test]
    fn test_melee_kill_grants_experience() {
        const DEN: &str = "\
+----+
| %$ |
+----+";
        let mut state = GameState::from_grids(&[("den", DEN)], "den", 3).unwrap();
        let orc = state.current().mobs[0];
        state
            .ecs
            .get::<&mut Inventory>(state.player)
            .unwrap()
            .hand = Some(ItemSpec::stick());

        // 15 health, 2 damage per strike.
        for _ in 0..8 {
            state.apply_action(Action::Apply { target: orc });
        }

        assert!(state.current().mobs.is_empty());
        assert!(!state.ecs.contains(orc));
        let exp = state.ecs.get::<&Experience>(state.player).unwrap();
        assert_eq!(exp.current, ORC_EXP_REWARD);
        let died = state
            .events
            .drain()
            .filter(|e| matches!(e, GameEvent::MobDied { .. }))
            .count();
        assert_eq!(died, 1);
    }

    #[test]
    fn test_adjacent_mob_strikes_back_each_turn() {
        const DEN: &str = "\
+----+
| %$ |
+----+";
        let mut state = GameState::from_grids(&[("den", DEN)], "den", 3).unwrap();

        state.apply_action(Action::Wait);
        let health = state.ecs.get::<&Health>(state.player).unwrap();
        assert_eq!(health.current, PLAYER_MAX_HEALTH - ORC_DAMAGE);
    }

    #[test]
    fn test_pickup_requires_stash_room() {
        const CACHE: &str = "\
+----+
| %/ |
+----+";
        let mut state = GameState::from_grids(&[("cache", CACHE)], "cache", 0).unwrap();
        let item = state.current().items[0];
        for _ in 0..STASH_CAPACITY {
            state
                .ecs
                .get::<&mut Inventory>(state.player)
                .unwrap()
                .put_item(ItemSpec::stick());
        }

        state.apply_action(Action::Apply { target: item });
        assert_eq!(state.current().items.len(), 1, "full stash refuses the item");

        state
            .ecs
            .get::<&mut Inventory>(state.player)
            .unwrap()
            .take_item(0);
        state.apply_action(Action::Apply { target: item });
        assert!(state.current().items.is_empty());
        assert!(!state.ecs.contains(item));
    }

    #[test]
    fn test_loaded_portals_link_by_name() {
        const UPPER: &str = "\
+----+
| %B |
+----+";
        const LOWER: &str = "\
+---+
| % |
+---+";
        let state =
            GameState::from_grids(&[("upper", UPPER), ("B", LOWER)], "upper", 0).unwrap();
        let portal = state.current().enters[0];
        let target = state.ecs.get::<&Portal>(portal).unwrap().target;
        assert_eq!(target, Some(LevelId(1)));
    }

    #[test]
    fn test_generated_session_is_playable() {
        let state = GameState::generated(7);
        assert_eq!(state.depth(), 1);
        assert!(state.current().has_exit());
        assert_eq!(state.player_pos(), state.current().start_pos());
    }

    #[test]
    fn test_win_at_max_level() {
        let mut state = hall();
        state
            .ecs
            .get::<&mut Experience>(state.player)
            .unwrap()
            .level = MAX_LEVEL;
        assert!(state.is_won());
    }
}
