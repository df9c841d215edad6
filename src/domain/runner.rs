/// Runner: the player-controlled entity.
///
/// ## Jump phase
///
///   0     grounded
///   1..=5 airborne; 1-2 rise, 2-3 glide, 4-5 descend
///   6     landed this tick (promoted to 7 before the tick ends)
///   7     settle; back to 0 on the next tick
///
/// Straight-up jumps skip the glide: they hold at the apex for one tick
/// and jump from phase 3 straight to the descent.
///
/// ## Command buffers
///
/// `command` is this tick's request (cleared by the loop every tick).
/// A request that cannot be honoured now is parked in `future_command`
/// and retried on later ticks; a blocked jump is parked in `future_jump`.
/// Any fresh command cancels both buffers.
///
/// Update dispatch, in priority order:
///   1. On a trampoline       → `move_on_trampoline`
///   2. Mid-jump (phase 1-5)  → `move_jump`
///   3. Otherwise             → `move_no_jump`
/// then a pending jump launches, the phase advances, and the resulting
/// command is applied to position / direction / symbol.

use rand::{Rng, RngCore};

use super::entity::{Command, Direction, Entity, Neighborhood, Pos};
use super::rules::{can_climb_up, can_move, can_stay_put, open_bounce_exits, should_fall};
use super::tile::{Terrain, RUNNER_FALLING, RUNNER_LEFT, RUNNER_RIGHT, RUNNER_STOPPED};

#[derive(Clone, Debug)]
pub struct Runner {
    pos: Pos,
    direction: Direction,
    symbol: char,
    command: Command,
    future_command: Command,
    jump_command: bool,
    future_jump: bool,
    jump: u8,
}

impl Runner {
    pub fn new(pos: Pos) -> Self {
        Runner {
            pos,
            direction: Direction::Stationary,
            symbol: RUNNER_STOPPED,
            command: Command::None,
            future_command: Command::None,
            jump_command: false,
            future_jump: false,
            jump: 0,
        }
    }

    /// Back to a standing start at `pos` with every buffer cleared.
    pub fn reset(&mut self, pos: Pos) {
        self.pos = pos;
        self.direction = Direction::Stationary;
        self.symbol = RUNNER_STOPPED;
        self.command = Command::None;
        self.future_command = Command::None;
        self.jump_command = false;
        self.future_jump = false;
        self.jump = 0;
    }

    pub fn set_command(&mut self, command: Command) {
        self.command = command;
    }

    pub fn set_jump(&mut self) {
        self.jump_command = true;
    }

    #[cfg(test)]
    pub fn jump_phase(&self) -> u8 {
        self.jump
    }

    #[cfg(test)]
    pub fn future_command(&self) -> Command {
        self.future_command
    }

    // ── Predicates on own state ──

    fn in_a_jump(&self) -> bool {
        self.jump > 0 && self.jump < 6
    }

    fn jump_just_over(&self) -> bool {
        self.jump > 5
    }

    fn move_scheduled(&self) -> bool {
        self.command != Command::None
            || self.future_command != Command::None
            || self.jump_command
            || self.future_jump
    }

    /// Park a jump request until it can be honoured.
    fn defer_jump(&mut self) {
        if self.jump_command {
            self.jump_command = false;
            self.future_jump = true;
        }
    }

    /// Pull parked requests into the active slots when those are empty.
    fn promote_pending(&mut self) {
        if self.command == Command::None {
            self.command = self.future_command;
            self.future_command = Command::None;
        }
        if !self.jump_command {
            self.jump_command = self.future_jump;
            self.future_jump = false;
        }
    }

    /// Caught by a ladder: clear the buffers and stand still.
    fn grab_ladder(&mut self, command: Command, keep_jump: bool) {
        self.command = command;
        self.future_command = Command::None;
        self.jump_command = keep_jump;
        self.future_jump = false;
        self.direction = Direction::Stationary;
    }
}

// ══════════════════════════════════════════════════════════════
// Momentum: keep going the way we were going
// ══════════════════════════════════════════════════════════════

impl Runner {
    /// Assumes support was checked, there is no command left to try, and
    /// the runner is not mid-jump.
    fn move_momentum(&mut self, n: &Neighborhood) {
        if self.in_a_jump() || n.center().is_trampoline() {
            return;
        }
        match self.direction {
            Direction::Down => {
                self.command = if can_move(n, Direction::Down) && !self.jump_just_over() {
                    Command::Down
                } else {
                    Command::Stop
                };
                self.jump_command = false;
            }
            Direction::Left | Direction::Right => {
                let side = self.direction;
                if self.jump_command {
                    if can_move(n, up_diagonal(side)) {
                        self.command = Command::toward(side);
                        return;
                    }
                    self.defer_jump();
                }
                self.command = if can_move(n, side) { Command::toward(side) } else { Command::Stop };
            }
            Direction::Up => {
                if can_climb_up(n) {
                    self.defer_jump();
                    self.command = Command::Up;
                } else if can_move(n, Direction::Up) && self.jump_command {
                    self.command = Command::Up;
                } else {
                    self.command = Command::Stop;
                    self.jump_command = false;
                }
            }
            _ if self.jump_command => {
                if can_move(n, Direction::Up) {
                    self.command = Command::Up;
                } else {
                    self.defer_jump();
                    self.command = Command::Stop;
                }
            }
            _ => self.command = Command::Stop,
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Grounded movement
// ══════════════════════════════════════════════════════════════

impl Runner {
    /// Returns true when a command (or parked command) was acted on now.
    fn move_no_jump(&mut self, n: &Neighborhood) -> bool {
        if self.command != Command::None {
            self.future_jump = false;
            self.future_command = Command::None;
        }

        if should_fall(n) {
            // remember where we were heading and drop
            if self.future_command != Command::Down {
                if let d @ (Direction::Left | Direction::Right) = self.direction {
                    self.future_command = Command::toward(d);
                }
            }
            if self.command != Command::None {
                self.future_command = self.command;
            }
            self.defer_jump();
            self.command = Command::Fall;
            return false;
        }

        self.promote_pending();

        match self.command {
            Command::Stop => {
                if self.jump_command && !can_move(n, Direction::Up) {
                    self.defer_jump();
                }
                true
            }
            Command::Down => {
                if can_move(n, Direction::Down) {
                    self.jump_command = false;
                    true
                } else {
                    self.future_command = Command::Down;
                    self.move_momentum(n);
                    false
                }
            }
            Command::Up => {
                if can_climb_up(n) {
                    self.defer_jump();
                    true
                } else if can_move(n, Direction::Up) && self.jump_command {
                    true
                } else {
                    self.future_command = Command::Up;
                    self.move_momentum(n);
                    false
                }
            }
            Command::Left | Command::Right => {
                let side = if self.command == Command::Left { Direction::Left } else { Direction::Right };
                if self.jump_command {
                    if can_move(n, up_diagonal(side)) {
                        return true;
                    } else if can_move(n, Direction::Up) {
                        // wall ahead: jump straight up, keep heading for later
                        self.command = Command::Up;
                        self.future_command = Command::toward(side);
                        self.direction = Direction::Stationary;
                        return true;
                    }
                    self.defer_jump();
                }
                if can_move(n, side) {
                    true
                } else {
                    self.future_command = Command::toward(side);
                    self.move_momentum(n);
                    false
                }
            }
            _ => {
                self.move_momentum(n);
                false
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Airborne movement
// ══════════════════════════════════════════════════════════════

impl Runner {
    fn move_jump(&mut self, n: &Neighborhood) -> bool {
        self.promote_pending();

        // Ladder catches the runner: only vertical intent survives.
        if n.center().is_ladder() {
            self.jump = 0;
            if self.jump_command && can_move(n, Direction::Up) {
                self.grab_ladder(Command::Stop, true);
            } else if self.move_scheduled() {
                let keep = match self.command {
                    c @ (Command::Up | Command::Down) => c,
                    _ => Command::Stop,
                };
                self.grab_ladder(keep, false);
            } else {
                self.grab_ladder(Command::Stop, false);
            }
            return self.move_no_jump(n);
        }

        if can_stay_put(n) && self.move_scheduled() && self.move_no_jump(n) {
            // landed somewhere we can act from
            self.jump = 0;
            return true;
        }

        match self.command {
            Command::Left | Command::Right => {
                let side = if self.command == Command::Left { Direction::Left } else { Direction::Right };
                if self.direction == side {
                    self.future_command = self.command;
                } else {
                    self.direction = side;
                }
            }
            Command::Up | Command::Down => self.future_command = self.command,
            Command::Stop => self.direction = Direction::Stationary,
            _ => {}
        }
        self.defer_jump();

        let lateral = lateral(self.direction);

        if self.jump == 1 {
            match lateral {
                Some(side) => {
                    if can_move(n, up_diagonal(side)) {
                        self.command = Command::toward(up_diagonal(side));
                    } else if can_stay_put(n) {
                        self.command = self.step_or_stop(n, side);
                    } else {
                        // hit our head: skip straight to the descent
                        self.jump = 5;
                    }
                }
                None => {
                    self.command = if can_move(n, Direction::Up) {
                        Command::Up
                    } else if can_stay_put(n) {
                        Command::Stop
                    } else {
                        Command::Fall
                    };
                }
            }
        }

        if self.jump == 2 || self.jump == 3 {
            match lateral {
                Some(side) => {
                    if can_move(n, side) {
                        self.command = Command::toward(side);
                    } else if can_stay_put(n) {
                        self.command = Command::Stop;
                    } else {
                        self.fall_keeping(side);
                    }
                }
                None => {
                    // straight up and down jumps don't last as long
                    self.command = Command::Stop;
                    self.jump = 3;
                }
            }
        }

        if self.jump == 4 || self.jump == 5 {
            match lateral {
                Some(side) => {
                    if can_move(n, down_diagonal(side)) {
                        self.command = Command::toward(down_diagonal(side));
                    } else if can_stay_put(n) {
                        self.command = self.step_or_stop(n, side);
                    } else {
                        self.fall_keeping(side);
                    }
                }
                None => {
                    self.command = if can_move(n, Direction::Down) {
                        Command::Down
                    } else if can_stay_put(n) {
                        Command::Stop
                    } else {
                        Command::Fall
                    };
                }
            }
        }

        self.jump += 1;
        true
    }

    fn step_or_stop(&self, n: &Neighborhood, side: Direction) -> Command {
        if can_move(n, side) { Command::toward(side) } else { Command::Stop }
    }

    /// Fall, but resume the sideways heading once we land.
    fn fall_keeping(&mut self, side: Direction) {
        self.command = Command::Fall;
        if self.future_command != Command::Down {
            self.future_command = Command::toward(side);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Trampoline
// ══════════════════════════════════════════════════════════════

impl Runner {
    fn move_on_trampoline(&mut self, n: &Neighborhood, rng: &mut dyn RngCore) -> bool {
        if self.in_a_jump() {
            // continue / reverse and continue / cancel and re-decide
            match rng.random_range(0..4u32) {
                0 => {
                    self.move_jump(n);
                }
                1 => {
                    self.direction = match self.direction {
                        Direction::Left => Direction::Right,
                        Direction::Right => Direction::Left,
                        d => d,
                    };
                    self.move_jump(n);
                }
                _ => {
                    self.jump = 0;
                    self.move_on_trampoline(n, rng);
                }
            }
            return true;
        }

        if self.move_scheduled() && self.move_no_jump(n) {
            return true;
        }

        if matches!(self.direction, Direction::Stationary | Direction::Down) {
            // landed square on it: bounce straight up if there is room
            if can_move(n, Direction::Up) {
                self.jump_command = true;
                self.direction = Direction::Stationary;
                self.command = Command::None;
                return true;
            }
            self.command = Command::Stop;
            return false;
        }

        // Came in sideways: throw the runner out any open way, equally likely.
        let exits: Vec<Direction> = open_bounce_exits(n).collect();
        if exits.is_empty() {
            self.command = Command::Stop;
            return false;
        }
        match exits[rng.random_range(0..exits.len())] {
            Direction::Left => self.command = Command::Left,
            Direction::UpLeft => {
                self.jump_command = true;
                self.command = Command::Left;
            }
            Direction::Up => {
                self.jump_command = true;
                self.direction = Direction::Stationary;
            }
            Direction::UpRight => {
                self.jump_command = true;
                self.command = Command::Right;
            }
            _ => self.command = Command::Right,
        }
        true
    }
}

// ══════════════════════════════════════════════════════════════
// Tick entry point
// ══════════════════════════════════════════════════════════════

impl Runner {
    /// Turn a pending jump into the first airborne step.
    fn launch_jump(&mut self) {
        if !self.jump_command {
            return;
        }
        self.jump = 1;
        self.jump_command = false;
        self.command = match self.command {
            Command::Left => Command::UpLeft,
            Command::Right => Command::UpRight,
            other => {
                self.future_command = other;
                match self.direction {
                    Direction::Left => Command::UpLeft,
                    Direction::Right => Command::UpRight,
                    _ => Command::Up,
                }
            }
        };
    }

    /// Apply the decided command. A step into solid ground is not taken;
    /// facing and symbol still follow the command.
    fn apply_command(&mut self, n: &Neighborhood) {
        let step = match self.command {
            Command::None => return,
            Command::Stop => {
                self.symbol = RUNNER_STOPPED;
                self.direction = Direction::Stationary;
                return;
            }
            Command::Up | Command::Down => {
                if self.symbol == RUNNER_STOPPED && self.jump == 0 {
                    self.symbol = RUNNER_RIGHT;
                }
                let d = if self.command == Command::Up { Direction::Up } else { Direction::Down };
                self.direction = d;
                d
            }
            Command::Right | Command::UpRight | Command::DownRight => {
                self.direction = Direction::Right;
                self.symbol = RUNNER_RIGHT;
                self.command.heading().unwrap_or(Direction::Right)
            }
            Command::Left | Command::UpLeft | Command::DownLeft => {
                self.direction = Direction::Left;
                self.symbol = RUNNER_LEFT;
                self.command.heading().unwrap_or(Direction::Left)
            }
            Command::Fall => {
                self.direction = Direction::Down;
                self.symbol = RUNNER_FALLING;
                Direction::Down
            }
        };
        if can_move(n, step) {
            self.pos = self.pos.offset(step);
        } else {
            log::debug!("runner step {step:?} from {:?} blocked", self.pos);
        }
    }
}

impl Entity for Runner {
    fn pos(&self) -> Pos {
        self.pos
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn symbol(&self) -> char {
        self.symbol
    }

    fn update(&mut self, n: &Neighborhood, rng: &mut dyn RngCore) {
        if n.center().is_trampoline() {
            self.move_on_trampoline(n, rng);
        } else if self.in_a_jump() {
            self.move_jump(n);
        } else {
            self.move_no_jump(n);
        }

        self.launch_jump();

        if self.jump == 6 {
            self.jump = 7;
        } else if self.jump == 7 {
            self.jump = 0;
        }

        self.apply_command(n);
    }
}

/// `Some(dir)` for the two sideways headings.
fn lateral(dir: Direction) -> Option<Direction> {
    matches!(dir, Direction::Left | Direction::Right).then_some(dir)
}

fn up_diagonal(side: Direction) -> Direction {
    if side == Direction::Left { Direction::UpLeft } else { Direction::UpRight }
}

fn down_diagonal(side: Direction) -> Direction {
    if side == Direction::Left { Direction::DownLeft } else { Direction::DownRight }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::Grid;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng(seed: u64) -> Pcg32 {
        Pcg32::seed_from_u64(seed)
    }

    fn grid_from(rows: &[&str]) -> Grid {
        Grid::from_text(&rows.join("\n"))
    }

    /// One tick against a grid, the way the loop feeds the runner.
    fn tick(r: &mut Runner, g: &Grid, command: Command, jump: bool, rng: &mut dyn RngCore) {
        r.set_command(command);
        if jump {
            r.set_jump();
        }
        let n = g.neighborhood(r.pos());
        r.update(&n, rng);
    }

    #[test]
    fn walks_on_floor_and_faces_the_way_it_moves() {
        let g = grid_from(&["     ", "====="]);
        let mut r = Runner::new(Pos::new(0, 2));
        let mut rng = rng(1);

        tick(&mut r, &g, Command::Right, false, &mut rng);
        assert_eq!(r.pos(), Pos::new(0, 3));
        assert_eq!(r.symbol(), RUNNER_RIGHT);
        assert_eq!(r.direction(), Direction::Right);

        tick(&mut r, &g, Command::Left, false, &mut rng);
        assert_eq!(r.pos(), Pos::new(0, 2));
        assert_eq!(r.symbol(), RUNNER_LEFT);

        tick(&mut r, &g, Command::Stop, false, &mut rng);
        assert_eq!(r.pos(), Pos::new(0, 2));
        assert_eq!(r.symbol(), RUNNER_STOPPED);
        assert_eq!(r.direction(), Direction::Stationary);
    }

    #[test]
    fn momentum_carries_until_a_wall() {
        let g = grid_from(&["   |", "===="]);
        let mut r = Runner::new(Pos::new(0, 0));
        let mut rng = rng(2);
        tick(&mut r, &g, Command::Right, false, &mut rng);
        tick(&mut r, &g, Command::None, false, &mut rng);
        assert_eq!(r.pos(), Pos::new(0, 2));
        tick(&mut r, &g, Command::None, false, &mut rng);
        assert_eq!(r.pos(), Pos::new(0, 2), "wall stops momentum");
        assert_eq!(r.symbol(), RUNNER_STOPPED);
    }

    #[test]
    fn unsupported_runner_always_falls() {
        let n = Neighborhood::from_rows(["   ", "   ", "   "]);
        let commands = [
            Command::None, Command::Stop, Command::Left, Command::Right,
            Command::Up, Command::Down,
        ];
        let mut rng = rng(3);
        for &cmd in &commands {
            for jump in [false, true] {
                for start_phase in [0u8, 7] {
                    let mut r = Runner::new(Pos::new(5, 5));
                    r.jump = start_phase;
                    r.future_command = Command::Left;
                    r.set_command(cmd);
                    if jump {
                        r.set_jump();
                    }
                    r.update(&n, &mut rng);
                    assert_eq!(r.pos(), Pos::new(6, 5), "{cmd:?} jump={jump}");
                    assert_eq!(r.jump_phase(), 0, "{cmd:?} jump={jump}");
                    assert_eq!(r.symbol(), RUNNER_FALLING);
                    assert_eq!(r.direction(), Direction::Down);
                }
            }
        }
    }

    #[test]
    fn falling_keeps_the_heading_for_landing() {
        let g = grid_from(&["    ", "=   ", "    ", "===="]);
        let mut r = Runner::new(Pos::new(0, 0));
        let mut rng = rng(4);
        tick(&mut r, &g, Command::Right, false, &mut rng);
        assert_eq!(r.pos(), Pos::new(0, 1));
        // over the gap: drop, remembering "right"
        tick(&mut r, &g, Command::None, false, &mut rng);
        assert_eq!(r.pos(), Pos::new(1, 1));
        assert_eq!(r.future_command(), Command::Right);
        tick(&mut r, &g, Command::None, false, &mut rng);
        assert_eq!(r.pos(), Pos::new(2, 1));
        // landed: resume running right
        tick(&mut r, &g, Command::None, false, &mut rng);
        assert_eq!(r.pos(), Pos::new(2, 2));
        assert_eq!(r.symbol(), RUNNER_RIGHT);
    }

    #[test]
    fn climbs_ladders_and_hangs_on_them() {
        let g = grid_from(&[" H ", " H ", " H ", "==="]);
        let mut r = Runner::new(Pos::new(2, 1));
        let mut rng = rng(5);
        tick(&mut r, &g, Command::Up, false, &mut rng);
        assert_eq!(r.pos(), Pos::new(1, 1));
        tick(&mut r, &g, Command::Stop, false, &mut rng);
        tick(&mut r, &g, Command::None, false, &mut rng);
        assert_eq!(r.pos(), Pos::new(1, 1), "hanging on the ladder without floor");
        tick(&mut r, &g, Command::Down, false, &mut rng);
        assert_eq!(r.pos(), Pos::new(2, 1));
    }

    #[test]
    fn blocked_climb_is_retried_when_possible() {
        let mut g = grid_from(&["   ", "   ", "==="]);
        let mut r = Runner::new(Pos::new(1, 1));
        let mut rng = rng(6);
        tick(&mut r, &g, Command::Up, false, &mut rng);
        assert_eq!(r.pos(), Pos::new(1, 1));
        assert_eq!(r.future_command(), Command::Up);

        g.set(Pos::new(0, 1), 'H');
        tick(&mut r, &g, Command::None, false, &mut rng);
        assert_eq!(r.pos(), Pos::new(0, 1));
    }

    #[test]
    fn running_jump_arc() {
        let g = grid_from(&["          ", "          ", "          ", "=========="]);
        let mut r = Runner::new(Pos::new(2, 1));
        let mut rng = rng(7);

        tick(&mut r, &g, Command::Right, true, &mut rng);
        assert_eq!(r.pos(), Pos::new(1, 2));
        assert_eq!(r.jump_phase(), 1);

        let expected = [Pos::new(0, 3), Pos::new(0, 4), Pos::new(0, 5), Pos::new(1, 6), Pos::new(2, 7)];
        for want in expected {
            tick(&mut r, &g, Command::None, false, &mut rng);
            assert_eq!(r.pos(), want);
        }
        assert_eq!(r.jump_phase(), 7);

        // momentum resumes after the settle tick
        tick(&mut r, &g, Command::None, false, &mut rng);
        assert_eq!(r.pos(), Pos::new(2, 8));
        assert_eq!(r.jump_phase(), 0);
    }

    #[test]
    fn standing_jump_is_short() {
        let g = grid_from(&["   ", "   ", "   ", "==="]);
        let mut r = Runner::new(Pos::new(2, 1));
        let mut rng = rng(8);

        tick(&mut r, &g, Command::None, true, &mut rng);
        assert_eq!(r.pos(), Pos::new(1, 1));
        assert_eq!(r.symbol(), RUNNER_STOPPED, "vertical airborne moves keep the symbol");

        let rows = [0, 0, 1, 2];
        for want in rows {
            tick(&mut r, &g, Command::None, false, &mut rng);
            assert_eq!(r.pos().row, want);
            assert_eq!(r.pos().col, 1);
        }
    }

    #[test]
    fn jump_into_wall_goes_straight_up() {
        let g = grid_from(&["  =", "  |", "==="]);
        let mut r = Runner::new(Pos::new(1, 1));
        let mut rng = rng(9);
        tick(&mut r, &g, Command::Right, true, &mut rng);
        assert_eq!(r.pos(), Pos::new(0, 1));
        assert_eq!(r.jump_phase(), 1);
    }

    #[test]
    fn blocked_jump_waits_for_headroom() {
        let mut g = grid_from(&["===", "   ", "==="]);
        let mut r = Runner::new(Pos::new(1, 1));
        let mut rng = rng(10);
        tick(&mut r, &g, Command::None, true, &mut rng);
        assert_eq!(r.pos(), Pos::new(1, 1));
        assert_eq!(r.jump_phase(), 0);

        g.set(Pos::new(0, 1), ' ');
        tick(&mut r, &g, Command::None, false, &mut rng);
        assert_eq!(r.pos(), Pos::new(0, 1));
        assert_eq!(r.jump_phase(), 1);
    }

    #[test]
    fn ladder_catches_a_jump() {
        let n = Neighborhood::from_rows(["   ", " H ", "   "]);
        let mut r = Runner::new(Pos::new(3, 3));
        r.jump = 2;
        r.direction = Direction::Right;
        r.future_command = Command::Right;
        let mut rng = rng(11);
        r.update(&n, &mut rng);
        assert_eq!(r.pos(), Pos::new(3, 3));
        assert_eq!(r.direction(), Direction::Stationary);
        assert_eq!(r.jump_phase(), 0);
        assert_eq!(r.future_command(), Command::None);
        assert_eq!(r.symbol(), RUNNER_STOPPED);
    }

    #[test]
    fn trampoline_under_open_sky_bounces_up() {
        let n = Neighborhood::from_rows(["   ", " . ", "==="]);
        let mut r = Runner::new(Pos::new(4, 4));
        let mut rng = rng(12);
        r.update(&n, &mut rng);
        assert_eq!(r.pos(), Pos::new(3, 4));
        assert_eq!(r.jump_phase(), 1);
    }

    #[test]
    fn trampoline_under_ceiling_stays_put() {
        let g = grid_from(&["====", ".  .", "===="]);
        let mut r = Runner::new(Pos::new(1, 0));
        let mut rng = rng(13);
        tick(&mut r, &g, Command::None, false, &mut rng);
        assert_eq!(r.pos(), Pos::new(1, 0));
        assert_eq!(r.symbol(), RUNNER_STOPPED);
    }

    #[test]
    fn trampoline_throws_only_through_open_exits() {
        let n = Neighborhood::from_rows(["= =", " . ", "==="]);
        let mut seen = [false; 3];
        for seed in 0..300 {
            let mut r = Runner::new(Pos::new(5, 5));
            r.direction = Direction::Right;
            let mut rng = rng(seed);
            r.update(&n, &mut rng);
            let p = r.pos();
            match (p.row - 5, p.col - 5) {
                (0, -1) => seen[0] = true,
                (-1, 0) => seen[1] = true,
                (0, 1) => seen[2] = true,
                other => panic!("thrown through a blocked exit: {other:?}"),
            }
        }
        assert!(seen.iter().all(|&s| s), "every open exit is reachable: {seen:?}");
    }

    #[test]
    fn trampoline_mid_jump_outcomes() {
        // gliding right (phase 2) across a trampoline under open sky
        let n = Neighborhood::from_rows(["   ", " . ", "==="]);
        let mut seen = [false; 4];
        for seed in 0..64 {
            let mut r = Runner::new(Pos::new(5, 5));
            r.direction = Direction::Right;
            r.symbol = RUNNER_RIGHT;
            r.jump = 2;

            let mut rng = rng(seed);
            let mut after_roll = rng.clone();
            let outcome = after_roll.random_range(0..4u32);
            seen[outcome as usize] = true;

            let mut grounded = r.clone();
            grounded.jump = 0;
            r.update(&n, &mut rng);

            match outcome {
                0 => {
                    assert_eq!(r.pos(), Pos::new(5, 6), "seed {seed}");
                    assert_eq!(r.direction(), Direction::Right);
                    assert_eq!(r.jump_phase(), 3);
                }
                1 => {
                    assert_eq!(r.pos(), Pos::new(5, 4), "seed {seed}");
                    assert_eq!(r.direction(), Direction::Left);
                    assert_eq!(r.symbol(), RUNNER_LEFT);
                    assert_eq!(r.jump_phase(), 3);
                }
                _ => {
                    // arc dropped, then decided afresh from the ground
                    grounded.update(&n, &mut after_roll);
                    assert_eq!(r.pos(), grounded.pos(), "seed {seed}");
                    assert_eq!(r.direction(), grounded.direction());
                    assert_eq!(r.jump_phase(), grounded.jump_phase());
                    assert!(r.jump_phase() <= 1);
                }
            }
        }
        assert_eq!(seen, [true; 4]);
    }

    #[test]
    fn trampoline_trials_stay_inside_the_grid() {
        let g = grid_from(&["====", ".  .", "===="]);
        let commands = [
            Command::None, Command::Stop, Command::Left,
            Command::Right, Command::Up, Command::Down,
        ];
        for seed in 0..10_000u64 {
            let mut rng = rng(seed);
            let start = if seed % 2 == 0 { Pos::new(1, 0) } else { Pos::new(1, 3) };
            let mut r = Runner::new(start);
            for _ in 0..8 {
                let cmd = commands[rng.random_range(0..commands.len())];
                let jump = rng.random_bool(0.3);
                tick(&mut r, &g, cmd, jump, &mut rng);
                let p = r.pos();
                assert!(p.col >= 0 && p.col < 4, "seed {seed}: left the grid at {p:?}");
                assert_eq!(p.row, 1, "seed {seed}: left the corridor at {p:?}");
            }
        }
    }
}
