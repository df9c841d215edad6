/// Barrel: the autonomous rolling hazard.
///
/// No state beyond position and heading. Decision order per tick:
///
/// ┌──────────────────────────────────┬─────────────────────────────┐
/// │ Situation (first match wins)     │ Heading                     │
/// ├──────────────────────────────────┼─────────────────────────────┤
/// │ `H` here and below, heading down │ down                        │
/// │ `H` here and below               │ 1/4 each: stop/down/R/L     │
/// │ nothing solid below              │ down                        │
/// │ `H` here, floor below            │ 1/3 each: stop/R/L          │
/// │ heading left                     │ left, right if wall         │
/// │ heading right                    │ right, left if wall         │
/// │ otherwise                        │ 1/3 each: stop/R/L          │
/// └──────────────────────────────────┴─────────────────────────────┘
///
/// A step into something solid is vetoed, but the heading is still
/// recorded so the barrel bounces back next tick.

use rand::{Rng, RngCore};

use super::entity::{Direction, Entity, Neighborhood, Pos};
use super::rules::can_move;
use super::tile::{Terrain, BARREL};

#[derive(Clone, Debug, Default)]
pub struct Barrel {
    pos: Pos,
    direction: Direction,
}

impl Barrel {
    pub fn new() -> Self {
        Barrel::default()
    }

    /// Put the barrel at `pos` with no heading, ready to roll.
    pub fn place(&mut self, pos: Pos) {
        self.pos = pos;
        self.direction = Direction::Stationary;
    }

    /// Pick where to go this tick. `None` means stay put.
    fn choose(&self, n: &Neighborhood, rng: &mut dyn RngCore) -> Option<Direction> {
        let on_ladder = n.center().is_ladder();
        let ladder_below = n.down().is_ladder();

        if on_ladder && ladder_below && self.direction == Direction::Down {
            return Some(Direction::Down);
        }
        if on_ladder && ladder_below {
            let roll: f64 = rng.random();
            return if roll < 0.25 {
                None
            } else if roll < 0.5 {
                Some(Direction::Down)
            } else if roll < 0.75 {
                Some(Direction::Right)
            } else {
                Some(Direction::Left)
            };
        }
        if !n.down().is_solid() {
            return Some(Direction::Down);
        }
        match self.direction {
            _ if on_ladder => stop_left_or_right(rng),
            Direction::Left if can_move(n, Direction::Left) => Some(Direction::Left),
            Direction::Left => Some(Direction::Right),
            Direction::Right if can_move(n, Direction::Right) => Some(Direction::Right),
            Direction::Right => Some(Direction::Left),
            _ => stop_left_or_right(rng),
        }
    }
}

fn stop_left_or_right(rng: &mut dyn RngCore) -> Option<Direction> {
    let roll: f64 = rng.random();
    if roll < 1.0 / 3.0 {
        None
    } else if roll < 2.0 / 3.0 {
        Some(Direction::Right)
    } else {
        Some(Direction::Left)
    }
}

impl Entity for Barrel {
    fn pos(&self) -> Pos {
        self.pos
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn symbol(&self) -> char {
        BARREL
    }

    fn update(&mut self, n: &Neighborhood, rng: &mut dyn RngCore) {
        let Some(dir) = self.choose(n, rng) else { return };
        self.direction = dir;
        if can_move(n, dir) {
            self.pos = self.pos.offset(dir);
        }
    }
}
