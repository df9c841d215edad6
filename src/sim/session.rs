/// Session: everything one game carries between ticks.
///
/// ## Two grids
///
///   - `real`: authoritative terrain. Entities read neighborhoods from
///     it; only collapses and statue pickups mutate it.
///   - `display`: `real` with live entity symbols drawn over it.
///
/// They are independently owned values. `display` is rebuilt from `real`
/// by clone on every reset and kept in step cell by cell during a tick.
///
/// ## Lifecycle
///
///   new game   → score 0, configured lives, level 1
///   load level → `real` from the pristine level, spawners rebuilt
///   reset      → runner to start, barrels back to the pool, timer refilled
///
/// Terrain damage (collapsed floors, taken statues) survives a reset and
/// is repaired only by loading a level.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::config::{Difficulty, GameSettings};
use crate::domain::entity::{Command, Entity, Intent, Pos};
use crate::domain::grid::Grid;
use crate::domain::runner::Runner;
use crate::domain::tile::{EMPTY, SPAWNER, START};
use super::event::GameEvent;
use super::level::LevelSet;
use super::pool::{BarrelPool, Spawner};

/// Score needed for each extra life.
pub const EXTRA_LIFE_EVERY: u64 = 10_000;

/// Why play stopped for the current life or level.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum GameOverCause {
    BarrelHit,
    TimeOut,
    Spike,
    GoalReached,
    Quit,
}

impl GameOverCause {
    /// Causes that cost a life.
    pub fn is_death(self) -> bool {
        matches!(self, GameOverCause::BarrelHit | GameOverCause::TimeOut | GameOverCause::Spike)
    }

    pub fn label(self) -> &'static str {
        match self {
            GameOverCause::BarrelHit => "hit by a barrel",
            GameOverCause::TimeOut => "out of time",
            GameOverCause::Spike => "fell on a spike",
            GameOverCause::GoalReached => "reached the goal",
            GameOverCause::Quit => "quit",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    /// Death sequence; `frame` indexes `DEATH_FRAMES`.
    Dying { frame: usize },
    /// Converting leftover bonus time into score.
    Tally,
    GameOver,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scoreboard {
    pub score: u64,
    /// Spare lives.
    pub lives: u32,
    next_extra_life: u64,
}

impl Scoreboard {
    pub fn new(lives: u32) -> Self {
        Scoreboard { score: 0, lives, next_extra_life: EXTRA_LIFE_EVERY }
    }

    /// Add points, granting a life for every threshold passed.
    pub fn add(&mut self, points: u64, events: &mut Vec<GameEvent>) {
        self.score += points;
        while self.score > self.next_extra_life {
            self.lives += 1;
            self.next_extra_life += EXTRA_LIFE_EVERY;
            log::info!("extra life at {} points", self.score);
            events.push(GameEvent::ExtraLife { lives: self.lives });
        }
    }
}

/// What the renderer gets after every tick.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub grid: Grid,
    pub score: u64,
    pub lives: u32,
    pub bonus_time: i32,
    pub cause: Option<GameOverCause>,
    pub phase: Phase,
    pub level_number: u32,
    pub level_name: String,
    pub difficulty: Difficulty,
    pub events: Vec<GameEvent>,
}

pub struct Session {
    pub real: Grid,
    pub display: Grid,
    pub level_number: u32,
    pub level_name: String,
    pub runner: Runner,
    pub start: Pos,
    pub spawners: Vec<Spawner>,
    pub pool: BarrelPool,
    pub board: Scoreboard,
    pub bonus_time: i32,
    pub cause: Option<GameOverCause>,
    pub phase: Phase,
    pub difficulty: Difficulty,
    /// Input gathered since the last tick.
    pub intent: Intent,
    pub rng: Pcg32,
    levels: LevelSet,
    settings: GameSettings,
}

impl Session {
    pub fn new(levels: LevelSet, settings: GameSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => Pcg32::seed_from_u64(seed),
            None => Pcg32::from_os_rng(),
        };
        let mut session = Session {
            real: Grid::from_text(""),
            display: Grid::from_text(""),
            level_number: 1,
            level_name: String::new(),
            runner: Runner::new(Pos::default()),
            start: Pos::default(),
            spawners: Vec::new(),
            pool: BarrelPool::new(),
            board: Scoreboard::new(settings.lives),
            bonus_time: settings.bonus_time,
            cause: None,
            phase: Phase::Playing,
            difficulty: settings.difficulty,
            intent: Intent::default(),
            rng,
            levels,
            settings,
        };
        session.new_game();
        session
    }

    /// Score 0, configured lives, back to level 1.
    pub fn new_game(&mut self) {
        self.board = Scoreboard::new(self.settings.lives);
        self.level_number = 1;
        self.load_level();
    }

    /// Load the level for `level_number` from its pristine copy and reset.
    pub fn load_level(&mut self) {
        let def = self.levels.for_level(self.level_number);
        self.level_name = def.name.clone();
        self.real = def.grid.clone();

        self.start = self.real.first_position_of(START).unwrap_or_default();
        if self.real.get(self.start) == START {
            self.real.set(self.start, EMPTY);
        }

        for sp in &mut self.spawners {
            sp.clear(&mut self.pool);
        }
        self.spawners = self.real.positions_of(SPAWNER).map(Spawner::new).collect();
        self.pool.reserve(self.spawners.len() * self.difficulty.min_barrels());

        log::info!(
            "level {} \"{}\": {} spawners, start at {:?}",
            self.level_number,
            self.level_name,
            self.spawners.len(),
            self.start
        );
        self.reset();
    }

    /// Start a fresh life on the current terrain.
    pub fn reset(&mut self) {
        for sp in &mut self.spawners {
            sp.clear(&mut self.pool);
        }
        self.runner.reset(self.start);
        self.display = self.real.clone();
        self.display.set(self.start, self.runner.symbol());
        self.bonus_time = self.settings.bonus_time;
        self.cause = None;
        self.phase = Phase::Playing;
        self.intent = Intent { command: Command::Stop, jump: false };
    }

    pub fn queue_intent(&mut self, intent: Intent) {
        self.intent.merge(intent);
    }

    pub fn quit(&mut self) {
        if self.phase != Phase::GameOver {
            log::info!("game quit at {} points", self.board.score);
        }
        self.cause = Some(GameOverCause::Quit);
        self.phase = Phase::GameOver;
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        if self.difficulty != difficulty {
            log::info!("difficulty set to {}", difficulty.label());
        }
        self.difficulty = difficulty;
    }

    #[cfg(test)]
    pub fn active_barrels(&self) -> usize {
        self.spawners.iter().map(Spawner::active_count).sum()
    }

    pub fn snapshot(&self, events: Vec<GameEvent>) -> Snapshot {
        Snapshot {
            grid: self.display.clone(),
            score: self.board.score,
            lives: self.board.lives,
            bonus_time: self.bonus_time,
            cause: self.cause,
            phase: self.phase,
            level_number: self.level_number,
            level_name: self.level_name.clone(),
            difficulty: self.difficulty,
            events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::RUNNER_STOPPED;
    use crate::sim::level::LevelDef;

    fn settings() -> GameSettings {
        GameSettings { difficulty: Difficulty::Medium, lives: 3, bonus_time: 2000, seed: Some(1) }
    }

    fn session_from(rows: &[&str]) -> Session {
        let grid = Grid::from_text(&rows.join("\n"));
        let levels = LevelSet::from_defs(vec![LevelDef { name: "test".into(), grid }]);
        Session::new(levels, settings())
    }

    #[test]
    fn start_marker_moves_into_the_display() {
        let s = session_from(&["V     ", "  p   ", "======"]);
        assert_eq!(s.start, Pos::new(1, 2));
        assert_eq!(s.real.get(s.start), EMPTY);
        assert_eq!(s.display.get(s.start), RUNNER_STOPPED);
        assert_eq!(s.runner.pos(), s.start);
        assert_eq!(s.spawners.len(), 1);
        assert_eq!(s.spawners[0].origin(), Pos::new(0, 0));
    }

    #[test]
    fn missing_start_defaults_to_origin() {
        let s = session_from(&["   $", "===="]);
        assert_eq!(s.start, Pos::new(0, 0));
        assert_eq!(s.real.get(Pos::new(0, 0)), EMPTY);
    }

    #[test]
    fn scoreboard_grants_a_life_per_ten_thousand() {
        let mut board = Scoreboard::new(3);
        let mut events = Vec::new();
        board.add(10_000, &mut events);
        assert_eq!(board.lives, 3);
        board.add(1, &mut events);
        assert_eq!(board.lives, 4);
        board.add(25_000, &mut events);
        assert_eq!(board.lives, 6);
        assert_eq!(
            events,
            vec![
                GameEvent::ExtraLife { lives: 4 },
                GameEvent::ExtraLife { lives: 5 },
                GameEvent::ExtraLife { lives: 6 },
            ]
        );
    }

    #[test]
    fn reset_keeps_terrain_damage_but_load_repairs_it() {
        let mut s = session_from(&["p &", "---"]);
        s.real.set(Pos::new(1, 0), EMPTY);
        s.real.set(Pos::new(0, 2), EMPTY);
        s.reset();
        assert_eq!(s.display.get(Pos::new(1, 0)), EMPTY);
        assert_eq!(s.display.get(Pos::new(0, 2)), EMPTY);
        s.load_level();
        assert_eq!(s.real.get(Pos::new(1, 0)), '-');
        assert_eq!(s.real.get(Pos::new(0, 2)), '&');
    }

    #[test]
    fn reset_returns_barrels_to_the_pool() {
        let mut s = session_from(&["V  p", "===="]);
        while s.active_barrels() < 4 {
            s.spawners[0].update(&mut s.pool, &mut s.rng);
        }
        assert_eq!(s.active_barrels(), 4);
        s.reset();
        assert_eq!(s.active_barrels(), 0);
        assert_eq!(s.pool.idle_count(), s.pool.constructed());
    }

    #[test]
    fn intents_merge_until_consumed() {
        let mut s = session_from(&["p", "="]);
        s.queue_intent(Intent { command: Command::Left, jump: true });
        s.queue_intent(Intent { command: Command::None, jump: false });
        assert_eq!(s.intent, Intent { command: Command::Left, jump: true });
    }

    #[test]
    fn quit_is_terminal() {
        let mut s = session_from(&["p", "="]);
        s.quit();
        assert_eq!(s.cause, Some(GameOverCause::Quit));
        assert_eq!(s.phase, Phase::GameOver);
        let snap = s.snapshot(Vec::new());
        assert_eq!(snap.cause, Some(GameOverCause::Quit));
        assert_eq!(snap.lives, 3);
    }
}
