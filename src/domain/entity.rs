/// Entities and the vocabulary they share: positions, keypad directions,
/// commands, and the 3x3 neighborhood each entity sees per tick.

use rand::RngCore;

/// Grid position, 0-based. Signed so lookups next to the edge can go
/// out of range and resolve to the wall sentinel.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Pos {
    pub row: i32,
    pub col: i32,
}

impl Pos {
    pub const fn new(row: i32, col: i32) -> Self {
        Pos { row, col }
    }

    pub fn offset(self, dir: Direction) -> Pos {
        let (dr, dc) = dir.delta();
        Pos { row: self.row + dr, col: self.col + dc }
    }
}

/// Facing / heading, numbered like a numeric keypad.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Direction {
    DownLeft = 1,
    Down = 2,
    DownRight = 3,
    Left = 4,
    #[default]
    Stationary = 5,
    Right = 6,
    UpLeft = 7,
    Up = 8,
    UpRight = 9,
}

impl Direction {
    pub const ALL: [Direction; 9] = [
        Direction::DownLeft,
        Direction::Down,
        Direction::DownRight,
        Direction::Left,
        Direction::Stationary,
        Direction::Right,
        Direction::UpLeft,
        Direction::Up,
        Direction::UpRight,
    ];

    /// Keypad digit (1-9) for this direction.
    pub fn keypad(self) -> u8 {
        self as u8
    }

    #[cfg(test)]
    pub fn from_keypad(digit: u8) -> Option<Direction> {
        Direction::ALL.get(usize::from(digit).checked_sub(1)?).copied()
    }

    /// (row delta, column delta). Rows grow downward.
    pub fn delta(self) -> (i32, i32) {
        let k = self as i32 - 1;
        let dc = k % 3 - 1;
        let dr = 1 - k / 3;
        (dr, dc)
    }
}

/// What the runner is told to do this tick. `None` means "no new input".
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Command {
    #[default]
    None,
    Stop,
    Left,
    Right,
    Up,
    Down,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
    /// Forced downward move while unsupported.
    Fall,
}

impl Command {
    /// The command that steps toward `dir`. `Stationary` maps to `Stop`.
    pub fn toward(dir: Direction) -> Command {
        match dir {
            Direction::DownLeft => Command::DownLeft,
            Direction::Down => Command::Down,
            Direction::DownRight => Command::DownRight,
            Direction::Left => Command::Left,
            Direction::Stationary => Command::Stop,
            Direction::Right => Command::Right,
            Direction::UpLeft => Command::UpLeft,
            Direction::Up => Command::Up,
            Direction::UpRight => Command::UpRight,
        }
    }

    /// The displacement this command produces when executed.
    pub fn heading(self) -> Option<Direction> {
        match self {
            Command::None | Command::Stop => None,
            Command::Left => Some(Direction::Left),
            Command::Right => Some(Direction::Right),
            Command::Up => Some(Direction::Up),
            Command::Down | Command::Fall => Some(Direction::Down),
            Command::UpLeft => Some(Direction::UpLeft),
            Command::UpRight => Some(Direction::UpRight),
            Command::DownLeft => Some(Direction::DownLeft),
            Command::DownRight => Some(Direction::DownRight),
        }
    }
}

/// Player intent for one tick, as delivered by the input collaborator.
/// `command` is one of up/down/left/right/stop/none; `jump` is a latch.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Intent {
    pub command: Command,
    pub jump: bool,
}

impl Intent {
    /// Fold a later intent into this one: the newest command wins,
    /// jump requests accumulate.
    pub fn merge(&mut self, later: Intent) {
        if later.command != Command::None {
            self.command = later.command;
        }
        self.jump |= later.jump;
    }
}

/// The 3x3 block of terrain around an entity, keypad-indexed:
///
/// ```text
///   7 8 9
///   4 5 6
///   1 2 3
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Neighborhood {
    cells: [char; 9],
}

impl Neighborhood {
    /// Build from cells in keypad order 1..=9.
    pub fn from_keypad(cells: [char; 9]) -> Self {
        Neighborhood { cells }
    }

    #[inline]
    pub fn at(&self, dir: Direction) -> char {
        self.cells[dir as usize - 1]
    }

    #[inline] pub fn down_left(&self) -> char { self.cells[0] }
    #[inline] pub fn down(&self) -> char { self.cells[1] }
    #[inline] pub fn down_right(&self) -> char { self.cells[2] }
    #[inline] pub fn left(&self) -> char { self.cells[3] }
    #[inline] pub fn center(&self) -> char { self.cells[4] }
    #[inline] pub fn right(&self) -> char { self.cells[5] }
    #[inline] pub fn up_left(&self) -> char { self.cells[6] }
    #[inline] pub fn up(&self) -> char { self.cells[7] }
    #[inline] pub fn up_right(&self) -> char { self.cells[8] }

    /// Test helper: three 3-char rows, top to bottom, as drawn on screen.
    #[cfg(test)]
    pub fn from_rows(rows: [&str; 3]) -> Self {
        let r: Vec<Vec<char>> = rows.iter().map(|s| s.chars().collect()).collect();
        Neighborhood::from_keypad([
            r[2][0], r[2][1], r[2][2],
            r[1][0], r[1][1], r[1][2],
            r[0][0], r[0][1], r[0][2],
        ])
    }
}

/// Anything that occupies a cell and moves once per tick.
pub trait Entity {
    fn pos(&self) -> Pos;
    fn direction(&self) -> Direction;
    /// Character drawn over the grid for this entity.
    fn symbol(&self) -> char;
    /// Advance one tick given the surrounding terrain.
    fn update(&mut self, hood: &Neighborhood, rng: &mut dyn RngCore);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keypad_deltas() {
        assert_eq!(Direction::DownLeft.delta(), (1, -1));
        assert_eq!(Direction::Down.delta(), (1, 0));
        assert_eq!(Direction::DownRight.delta(), (1, 1));
        assert_eq!(Direction::Left.delta(), (0, -1));
        assert_eq!(Direction::Stationary.delta(), (0, 0));
        assert_eq!(Direction::Right.delta(), (0, 1));
        assert_eq!(Direction::UpLeft.delta(), (-1, -1));
        assert_eq!(Direction::Up.delta(), (-1, 0));
        assert_eq!(Direction::UpRight.delta(), (-1, 1));
    }

    #[test]
    fn keypad_round_trip() {
        for d in Direction::ALL {
            assert_eq!(Direction::from_keypad(d.keypad()), Some(d));
        }
        assert_eq!(Direction::from_keypad(0), None);
        assert_eq!(Direction::from_keypad(10), None);
    }

    #[test]
    fn neighborhood_rows_map_to_keypad() {
        let n = Neighborhood::from_rows(["789", "456", "123"]);
        for d in Direction::ALL {
            let expected = char::from(b'0' + d.keypad());
            assert_eq!(n.at(d), expected);
        }
        assert_eq!(n.center(), '5');
        assert_eq!(n.up_right(), '9');
        assert_eq!(n.down_left(), '1');
    }

    #[test]
    fn intent_merge_keeps_latest_command_and_latches_jump() {
        let mut i = Intent { command: Command::Left, jump: true };
        i.merge(Intent { command: Command::None, jump: false });
        assert_eq!(i, Intent { command: Command::Left, jump: true });
        i.merge(Intent { command: Command::Right, jump: false });
        assert_eq!(i.command, Command::Right);
        assert!(i.jump);
    }
}
