//! Character-grid level parsing.
//!
//! The on-disk format and file IO are the caller's concern; this maps an
//! already-read rectangular character grid to tile objects. Letters name
//! enter portals leading to the level of that name.

use thiserror::Error;

use crate::components::{ItemSpec, Position, TileKind};
use crate::constants::DUNGEON_LABEL;
use crate::level::Level;
use crate::spawning::{self, mobs};

/// A corrupt grid is a fatal configuration error, not a runtime condition
/// to route around.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("unexpected symbol {symbol:?} at line {line}, column {column}")]
    UnknownSymbol {
        symbol: char,
        line: usize,
        column: usize,
    },
    #[error("level {level:?} has more than one exit")]
    DuplicateExit { level: String },
    #[error("level {level:?} has no exit")]
    MissingExit { level: String },
    #[error("starting level {name:?} is not among the loaded levels")]
    UnknownStartLevel { name: String },
}

/// Parse one character grid into a level named `name`.
///
/// Columns map to x and lines to y. Recognized symbols:
/// `A`-`Z` enter portal, `|`/`-`/`+` borders, `@` chest, `*` dungeon block,
/// `%` exit, `$` orc, `&` bat, `/` item, space empty.
pub fn parse_level(name: &str, grid: &str, ecs: &mut hecs::World) -> Result<Level, LoadError> {
    let mut level = Level::new(name);

    for (row, text) in grid.lines().enumerate() {
        for (column, symbol) in text.chars().enumerate() {
            let pos = Position::new(column as i32, row as i32);
            let entity = match symbol {
                'A'..='Z' => spawning::spawn_enter(ecs, pos, symbol.to_string()),
                '|' => spawning::spawn_border(ecs, pos, TileKind::VerticalBorder),
                '-' => spawning::spawn_border(ecs, pos, TileKind::HorizontalBorder),
                '+' => spawning::spawn_border(ecs, pos, TileKind::Corner),
                '@' => spawning::spawn_chest(ecs, pos),
                '*' => spawning::spawn_stone(ecs, pos, DUNGEON_LABEL),
                '%' => {
                    if level.has_exit() {
                        return Err(LoadError::DuplicateExit {
                            level: name.to_string(),
                        });
                    }
                    spawning::spawn_exit(ecs, pos)
                }
                '$' => mobs::ORC.spawn(ecs, pos),
                '&' => mobs::BAT.spawn(ecs, pos),
                '/' => spawning::spawn_item(ecs, pos, ItemSpec::stick()),
                ' ' => continue,
                _ => {
                    return Err(LoadError::UnknownSymbol {
                        symbol,
                        line: row + 1,
                        column: column + 1,
                    })
                }
            };
            level.push_object(ecs, entity);
        }
    }

    if !level.has_exit() {
        return Err(LoadError::MissingExit {
            level: name.to_string(),
        });
    }
    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HALL: &str = "\
+------+
| %  A |
| $  / |
+--**--+";

    #[test]
    fn test_parse_routes_symbols_to_kinds() {
        let mut ecs = hecs::World::new();
        let level = parse_level("hall", HALL, &mut ecs).unwrap();

        assert_eq!(level.enters.len(), 1);
        assert_eq!(level.mobs.len(), 1);
        assert_eq!(level.items.len(), 1);
        assert_eq!(level.stones.len(), 2);
        assert!(level.has_exit());
        assert_eq!(level.start_pos(), Position::new(2, 1));

        // 4 corners, 12 horizontal minus the 2 stones, 4 vertical.
        assert_eq!(level.borders.len(), 18);
    }

    #[test]
    fn test_unknown_symbol_is_fatal() {
        let mut ecs = hecs::World::new();
        let err = parse_level("bad", "%?", &mut ecs).unwrap_err();
        assert_eq!(
            err,
            LoadError::UnknownSymbol {
                symbol: '?',
                line: 1,
                column: 2
            }
        );
    }

    #[test]
    fn test_missing_exit_is_fatal() {
        let mut ecs = hecs::World::new();
        let err = parse_level("bad", "+--+", &mut ecs).unwrap_err();
        assert_eq!(
            err,
            LoadError::MissingExit {
                level: "bad".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_exit_is_fatal() {
        let mut ecs = hecs::World::new();
        let err = parse_level("bad", "%%", &mut ecs).unwrap_err();
        assert_eq!(
            err,
            LoadError::DuplicateExit {
                level: "bad".to_string()
            }
        );
    }
}
