//! Turn a plan into concrete tile objects.
//!
//! Every node becomes a hollow square room, every corridor a pair of
//! parallel walls between two doorways. The exit sits at the root node;
//! other rooms roll an even three-way choice between staying empty,
//! holding a monster, and holding an item.

use rand::Rng;
use tracing::info;

use super::layout::{Plan, PlanNode, AXES};
use crate::components::{ItemSpec, Position, TileKind};
use crate::constants::MIN_TUNNEL_LEN;
use crate::level::Level;
use crate::spawning::{self, mobs};

/// Materialize `plan` into a level named `name`.
///
/// Rooms are hollow squares of side `2 * box_width + 1`; corridor passages
/// are `2 * tunnel_width - 1` wide. `box_width` must exceed `tunnel_width`,
/// otherwise the doorway would be wider than the room side - that is a
/// caller error, not a runtime condition.
pub fn materialize(
    plan: &Plan,
    name: &str,
    box_width: i32,
    tunnel_width: i32,
    ecs: &mut hecs::World,
    rng: &mut impl Rng,
) -> Level {
    assert!(
        tunnel_width >= 1 && box_width > tunnel_width,
        "box_width must exceed tunnel_width"
    );

    // One lattice step leaves at least MIN_TUNNEL_LEN open tiles between
    // the borders of adjacent rooms.
    let scale = 2 * box_width + 1 + MIN_TUNNEL_LEN;

    // Shift so the smallest border coordinate lands at 1.
    let mut offset = [0i32; AXES];
    for axis in 0..AXES {
        let min = plan
            .nodes
            .iter()
            .map(|n| n.pos[axis])
            .min()
            .expect("plan has at least one node");
        offset[axis] = 1 + box_width - min * scale;
    }
    let center =
        |node: &PlanNode| [node.pos[0] * scale + offset[0], node.pos[1] * scale + offset[1]];

    let mut level = Level::new(name);

    for node in &plan.nodes {
        emit_room(ecs, &mut level, node, center(node), box_width, tunnel_width);
    }

    for node in plan.nodes.iter().skip(1) {
        let (axis, _, edge) = node
            .incoming()
            .expect("non-root node has an incoming edge");
        let parent = &plan.nodes[edge.to];
        let crossings: Vec<i32> = edge
            .crossings
            .iter()
            .map(|&other| plan.nodes[other].pos[axis] * scale + offset[axis])
            .collect();
        emit_corridor(
            ecs,
            &mut level,
            axis,
            center(parent),
            center(node),
            &crossings,
            box_width,
            tunnel_width,
        );
    }

    for (i, node) in plan.nodes.iter().enumerate() {
        let c = center(node);
        let pos = Position::new(c[0], c[1]);
        if i == 0 {
            let exit = spawning::spawn_exit(ecs, pos);
            level.push_object(ecs, exit);
            continue;
        }
        match rng.gen_range(0..3) {
            0 => {}
            1 => {
                let def = if rng.gen_range(0..2) == 0 {
                    &mobs::ORC
                } else {
                    &mobs::BAT
                };
                let mob = def.spawn(ecs, pos);
                level.push_object(ecs, mob);
            }
            _ => {
                let item = spawning::spawn_item(ecs, pos, ItemSpec::stick());
                level.push_object(ecs, item);
            }
        }
    }

    info!(
        name = %level.name,
        rooms = plan.nodes.len(),
        objects = level.objects.len(),
        "materialized level"
    );
    level
}

/// Hollow square border around a room center, with a centered doorway gap of
/// width `2 * tunnel_width - 1` on every side that carries a corridor.
fn emit_room(
    ecs: &mut hecs::World,
    level: &mut Level,
    node: &PlanNode,
    center: [i32; AXES],
    box_width: i32,
    tunnel_width: i32,
) {
    for axis in 0..AXES {
        for dir in 0..2 {
            let doorway = node.edges[axis][dir].is_some();
            let side = center[axis] + if dir == 0 { -box_width } else { box_width };
            // A side at fixed x runs along y and draws as a vertical border.
            let kind = if axis == 0 {
                TileKind::VerticalBorder
            } else {
                TileKind::HorizontalBorder
            };
            for off in -(box_width - 1)..=(box_width - 1) {
                if doorway && off.abs() <= tunnel_width - 1 {
                    continue;
                }
                let mut pos = [0; AXES];
                pos[axis] = side;
                pos[1 - axis] = center[1 - axis] + off;
                let tile = spawning::spawn_border(ecs, Position::new(pos[0], pos[1]), kind);
                level.push_object(ecs, tile);
            }
        }
    }
    for sx in [-box_width, box_width] {
        for sy in [-box_width, box_width] {
            let tile = spawning::spawn_border(
                ecs,
                Position::new(center[0] + sx, center[1] + sy),
                TileKind::Corner,
            );
            level.push_object(ecs, tile);
        }
    }
}

/// Two parallel corridor walls between the doorways of two rooms. Where a
/// crossing corridor passes through, the wall is interrupted: a gap the
/// width of the crossing passage, flanked by corner tiles.
#[allow(clippy::too_many_arguments)]
fn emit_corridor(
    ecs: &mut hecs::World,
    level: &mut Level,
    axis: usize,
    from: [i32; AXES],
    to: [i32; AXES],
    crossings: &[i32],
    box_width: i32,
    tunnel_width: i32,
) {
    let fixed = to[1 - axis];
    let lo = from[axis].min(to[axis]) + box_width + 1;
    let hi = from[axis].max(to[axis]) - box_width - 1;

    for side in [-tunnel_width, tunnel_width] {
        'tiles: for along in lo..=hi {
            for &cross in crossings {
                if (along - cross).abs() <= tunnel_width - 1 {
                    continue 'tiles;
                }
            }
            let mut pos = [0; AXES];
            pos[axis] = along;
            pos[1 - axis] = fixed + side;
            let pos = Position::new(pos[0], pos[1]);
            let junction = crossings
                .iter()
                .any(|&cross| (along - cross).abs() == tunnel_width);
            let tile = if junction {
                spawning::spawn_border(ecs, pos, TileKind::Corner)
            } else {
                spawning::spawn_wall(ecs, pos)
            };
            level.push_object(ecs, tile);
        }
    }
}
