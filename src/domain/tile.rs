/// Terrain alphabet and per-symbol properties.
///
/// A level is a grid of plain characters, so properties are queried via the
/// `Terrain` trait on `char` rather than stored as flags. Tile semantics are
/// centralized here.

/// Solid floor.
pub const FLOOR: char = '=';
/// Solid wall. Also the sentinel returned for out-of-bounds lookups.
pub const WALL: char = '|';
/// Collapsible floor: solid until the runner walks off it.
pub const CRUMBLE: char = '-';
pub const LADDER: char = 'H';
pub const TRAMPOLINE: char = '.';
pub const GOAL: char = '$';
pub const SPIKE: char = '^';
pub const STATUE: char = '&';
/// Barrels that come to rest here are recycled.
pub const DRAIN: char = '*';
pub const SPAWNER: char = 'V';
/// Runner start marker in level text.
pub const START: char = 'p';
pub const EMPTY: char = ' ';

// ── Transient symbols (drawn over the grid, never terrain) ──

pub const RUNNER_STOPPED: char = 'g';
pub const RUNNER_RIGHT: char = 'p';
pub const RUNNER_LEFT: char = 'q';
pub const RUNNER_FALLING: char = 'b';
pub const BARREL: char = 'o';

/// Symbols cycled over the runner's cell while it dies.
pub const DEATH_FRAMES: [char; 10] = ['!', '@', '#', '/', '+', '%', '?', '\\', '*', 'b'];

pub trait Terrain: Copy {
    /// Blocks movement into the cell and supports anything standing on it.
    fn is_solid(self) -> bool;
    fn is_ladder(self) -> bool;
    /// A ladder the runner can climb into. A goal may hide a ladder.
    fn is_climbable(self) -> bool;
    fn is_trampoline(self) -> bool;
    fn is_collapsible(self) -> bool;
}

impl Terrain for char {
    #[inline]
    fn is_solid(self) -> bool {
        matches!(self, FLOOR | WALL | CRUMBLE)
    }

    #[inline]
    fn is_ladder(self) -> bool {
        self == LADDER
    }

    #[inline]
    fn is_climbable(self) -> bool {
        matches!(self, LADDER | GOAL)
    }

    #[inline]
    fn is_trampoline(self) -> bool {
        self == TRAMPOLINE
    }

    #[inline]
    fn is_collapsible(self) -> bool {
        self == CRUMBLE
    }
}

/// Characters that count as blank when trimming trailing level lines.
pub fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\x0C')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_set() {
        for c in [FLOOR, WALL, CRUMBLE] {
            assert!(c.is_solid(), "{c:?} should be solid");
        }
        for c in [LADDER, TRAMPOLINE, GOAL, SPIKE, STATUE, DRAIN, SPAWNER, EMPTY] {
            assert!(!c.is_solid(), "{c:?} should not be solid");
        }
    }

    #[test]
    fn goal_hides_a_ladder() {
        assert!(GOAL.is_climbable());
        assert!(LADDER.is_climbable());
        assert!(!GOAL.is_ladder());
    }
}
