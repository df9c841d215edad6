/// Movement rules: truth-table driven.
///
/// Pure functions over a `Neighborhood`. These encode "what is legal"
/// without performing the move; the runner and barrel state machines
/// decide what to attempt.
///
/// ## Movement Truth Table
///
/// ### Any single step (left, right, diagonals, down)
/// ┌────────────────────────┬──────────┬──────────────────┐
/// │ Condition              │ Allow?   │ Notes            │
/// ├────────────────────────┼──────────┼──────────────────┤
/// │ Dest is `=` `|` `-`    │ DENY     │ solid            │
/// │ Dest off the grid      │ DENY     │ reads as `|`     │
/// │ Otherwise              │ ALLOW    │ ladders, air, ...│
/// └────────────────────────┴──────────┴──────────────────┘
///
/// ### Up
/// ┌────────────────────────┬──────────┬──────────────────┐
/// │ Condition              │ Allow?   │ Notes            │
/// ├────────────────────────┼──────────┼──────────────────┤
/// │ Above is solid         │ DENY     │                  │
/// │ Above is `H` or `$`    │ CLIMB    │ `$` hides a ladder │
/// │ Otherwise              │ JUMP only│ needs a jump     │
/// └────────────────────────┴──────────┴──────────────────┘
///
/// ### Support (who stands, who falls)
/// ┌────────────────────────┬──────────┐
/// │ Condition              │ Support? │
/// ├────────────────────────┼──────────┤
/// │ Below is solid         │ YES      │
/// │ Here is `H`            │ YES      │
/// │ Here is `.`            │ bounce   │
/// │ Otherwise              │ NO, fall │
/// └────────────────────────┴──────────┘

use super::entity::{Direction, Neighborhood};
use super::tile::Terrain;

/// Nothing solid in the way of one step toward `dir`.
#[inline]
pub fn can_move(n: &Neighborhood, dir: Direction) -> bool {
    !n.at(dir).is_solid()
}

/// Climbing needs a ladder (or a goal hiding one) above, and room to enter it.
#[inline]
pub fn can_climb_up(n: &Neighborhood) -> bool {
    n.up().is_climbable() && can_move(n, Direction::Up)
}

/// Standing on something solid, or hanging on a ladder.
#[inline]
pub fn can_stay_put(n: &Neighborhood) -> bool {
    n.down().is_solid() || n.center().is_ladder()
}

/// Unsupported and not on a trampoline: gravity takes over.
#[inline]
pub fn should_fall(n: &Neighborhood) -> bool {
    !can_stay_put(n) && !n.center().is_trampoline()
}

/// The five ways off a trampoline, in the order they are counted.
pub const BOUNCE_EXITS: [Direction; 5] = [
    Direction::Left,
    Direction::UpLeft,
    Direction::Up,
    Direction::UpRight,
    Direction::Right,
];

/// Unblocked trampoline exits, in `BOUNCE_EXITS` order.
pub fn open_bounce_exits(n: &Neighborhood) -> impl Iterator<Item = Direction> + '_ {
    BOUNCE_EXITS.into_iter().filter(move |&d| can_move(n, d))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_blocks_every_direction() {
        let n = Neighborhood::from_rows(["=|-", "= -", "|-="]);
        for d in Direction::ALL {
            if d == Direction::Stationary {
                continue;
            }
            assert!(!can_move(&n, d), "{d:?} should be blocked");
        }
    }

    #[test]
    fn climb_needs_ladder_or_goal_above() {
        assert!(can_climb_up(&Neighborhood::from_rows([" H ", " H ", "==="])));
        assert!(can_climb_up(&Neighborhood::from_rows([" $ ", " H ", "==="])));
        assert!(!can_climb_up(&Neighborhood::from_rows(["   ", " H ", "==="])));
        assert!(can_move(&Neighborhood::from_rows(["   ", " H ", "==="]), Direction::Up));
    }

    #[test]
    fn support_table() {
        // floor below
        assert!(can_stay_put(&Neighborhood::from_rows(["   ", "   ", " = "])));
        // hanging on a ladder over a gap
        assert!(can_stay_put(&Neighborhood::from_rows(["   ", " H ", "   "])));
        // ladder below is not support
        assert!(!can_stay_put(&Neighborhood::from_rows(["   ", "   ", " H "])));
        assert!(should_fall(&Neighborhood::from_rows(["   ", "   ", " H "])));
        // trampoline over air bounces instead
        assert!(!should_fall(&Neighborhood::from_rows(["   ", " . ", "   "])));
    }

    #[test]
    fn bounce_exits_skip_blocked() {
        let n = Neighborhood::from_rows(["= =", " . ", "==="]);
        let open: Vec<Direction> = open_bounce_exits(&n).collect();
        assert_eq!(open, vec![Direction::Left, Direction::Up, Direction::Right]);
    }
}
