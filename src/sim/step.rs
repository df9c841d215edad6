/// The step function: advances the session by one tick.
///
/// Processing order while playing:
///   1. Bonus-time countdown (time-out at zero)
///   2. Runner: consume intent, update from the real grid, redraw
///   3. Runner's cell: goal / spike / statue
///   4. Floor collapse behind the runner
///   5. Spawners, then each of their barrels:
///        hit check → update → redraw → hit check → jump score → recycle
///
/// The first terminal cause ends the tick on the spot: nothing after it
/// moves. The cause then drives the phase machine:
///
/// ┌───────────────────────────┬──────────────────────────────────────┐
/// │ Cause                     │ Next                                 │
/// ├───────────────────────────┼──────────────────────────────────────┤
/// │ barrel hit/time-out/spike │ Dying → life lost + reset, or over   │
/// │ goal reached              │ Tally → next level                   │
/// │ quit                      │ GameOver                             │
/// └───────────────────────────┴──────────────────────────────────────┘

use std::time::Duration;

use crate::domain::entity::{Direction, Entity, Pos};
use crate::domain::grid::Grid;
use crate::domain::tile::{Terrain, BARREL, DEATH_FRAMES, DRAIN, EMPTY, GOAL, SPIKE, STATUE};
use super::event::GameEvent;
use super::session::{GameOverCause, Phase, Session};

pub const BARREL_JUMP_POINTS: u64 = 200;
/// Score per tally step; each step also drains this much bonus time.
pub const TALLY_POINTS: u64 = 10;
pub const DEATH_FRAME_INTERVAL: Duration = Duration::from_millis(50);
pub const TALLY_INTERVAL: Duration = Duration::from_millis(10);

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(session: &mut Session) -> Vec<GameEvent> {
    let mut events = Vec::new();
    match session.phase {
        Phase::Playing => {
            if let Some(cause) = tick(session, &mut events) {
                end_play(session, cause, &mut events);
            }
        }
        Phase::Dying { frame } => resolve_death(session, frame, &mut events),
        Phase::Tally => resolve_tally(session, &mut events),
        Phase::GameOver => {}
    }
    events
}

/// How long to wait before the next `step`.
pub fn interval(session: &Session) -> Duration {
    match session.phase {
        Phase::Dying { .. } => DEATH_FRAME_INTERVAL,
        Phase::Tally => TALLY_INTERVAL,
        Phase::Playing | Phase::GameOver => session.difficulty.tick_interval(),
    }
}

/// One playing tick. Returns the cause if play stopped.
pub fn tick(s: &mut Session, events: &mut Vec<GameEvent>) -> Option<GameOverCause> {
    s.bonus_time -= 1;
    if s.bonus_time <= 0 {
        s.bonus_time = 0;
        return Some(GameOverCause::TimeOut);
    }
    let from = s.runner.pos();
    if let Some(cause) = resolve_runner(s, events) {
        return Some(cause);
    }
    resolve_collapse(s, from, events);
    resolve_barrels(s, events)
}

// ══════════════════════════════════════════════════════════════
// Runner
// ══════════════════════════════════════════════════════════════

fn resolve_runner(s: &mut Session, events: &mut Vec<GameEvent>) -> Option<GameOverCause> {
    let from = s.runner.pos();
    s.display.set(from, s.real.get(from));

    let intent = std::mem::take(&mut s.intent);
    s.runner.set_command(intent.command);
    if intent.jump {
        s.runner.set_jump();
    }
    let n = s.real.neighborhood(from);
    s.runner.update(&n, &mut s.rng);

    let at = s.runner.pos();
    s.display.set(at, s.runner.symbol());

    match s.real.get(at) {
        GOAL => return Some(GameOverCause::GoalReached),
        SPIKE => return Some(GameOverCause::Spike),
        STATUE => {
            let points = s.bonus_time.max(0) as u64;
            s.real.set(at, EMPTY);
            s.board.add(points, events);
            events.push(GameEvent::StatueCollected { pos: at, points });
        }
        _ => {}
    }
    None
}

/// A collapsible floor gives way once the runner steps off it sideways
/// or downward. Rising off it (a jump) leaves it intact.
fn resolve_collapse(s: &mut Session, from: Pos, events: &mut Vec<GameEvent>) {
    let to = s.runner.pos();
    if to.col == from.col || to.row < from.row {
        return;
    }
    let below = from.offset(Direction::Down);
    if s.real.get(below).is_collapsible() {
        s.real.set(below, EMPTY);
        s.display.set(below, EMPTY);
        log::debug!("floor collapsed at {below:?}");
        events.push(GameEvent::FloorCollapsed { pos: below });
    }
}

// ══════════════════════════════════════════════════════════════
// Barrels
// ══════════════════════════════════════════════════════════════

fn resolve_barrels(s: &mut Session, events: &mut Vec<GameEvent>) -> Option<GameOverCause> {
    let runner = s.runner.pos();
    let heading = s.runner.direction();

    for k in 0..s.spawners.len() {
        if s.spawners[k].update(&mut s.pool, &mut s.rng) {
            events.push(GameEvent::BarrelSpawned { pos: s.spawners[k].origin() });
        }

        let mut j = 0;
        while j < s.spawners[k].active_count() {
            let before = s.spawners[k].barrels()[j].pos();
            if before == runner {
                return Some(GameOverCause::BarrelHit);
            }

            s.display.set(before, s.real.get(before));
            let n = s.real.neighborhood(before);
            let barrel = s.spawners[k].barrel_mut(j);
            barrel.update(&n, &mut s.rng);
            let after = barrel.pos();
            s.display.set(after, BARREL);

            if after == runner {
                return Some(GameOverCause::BarrelHit);
            }
            if jumped_over(&s.real, runner, heading, after) {
                s.board.add(BARREL_JUMP_POINTS, events);
                events.push(GameEvent::BarrelJumped { pos: after });
            }
            if s.real.get(after) == DRAIN {
                s.display.set(after, DRAIN);
                s.spawners[k].recycle(j, &mut s.pool);
                events.push(GameEvent::BarrelRecycled { pos: after });
                continue;
            }
            j += 1;
        }
    }
    None
}

/// Does a barrel at `barrel` count as jumped by a runner at `runner`?
///
/// Checked once per barrel, after the barrel moves. The runner must be
/// off ladders and not moving straight up or down, with the barrel right
/// under it, or two under it with open space between.
pub fn jumped_over(real: &Grid, runner: Pos, heading: Direction, barrel: Pos) -> bool {
    if real.get(runner).is_ladder() {
        return false;
    }
    if matches!(heading, Direction::Up | Direction::Down) {
        return false;
    }
    if barrel.col != runner.col {
        return false;
    }
    match barrel.row - runner.row {
        1 => true,
        2 => !real.get(runner.offset(Direction::Down)).is_solid(),
        _ => false,
    }
}

// ══════════════════════════════════════════════════════════════
// Terminal handling
// ══════════════════════════════════════════════════════════════

fn end_play(s: &mut Session, cause: GameOverCause, events: &mut Vec<GameEvent>) {
    s.cause = Some(cause);
    if cause.is_death() {
        log::info!("runner died: {} ({} spare lives)", cause.label(), s.board.lives);
        events.push(GameEvent::RunnerKilled { cause });
        s.phase = Phase::Dying { frame: 0 };
    } else if cause == GameOverCause::GoalReached {
        log::info!("level {} complete with {} bonus left", s.level_number, s.bonus_time);
        events.push(GameEvent::GoalReached);
        s.phase = Phase::Tally;
    } else {
        s.phase = Phase::GameOver;
    }
}

fn resolve_death(s: &mut Session, frame: usize, events: &mut Vec<GameEvent>) {
    if let Some(&symbol) = DEATH_FRAMES.get(frame) {
        s.display.set(s.runner.pos(), symbol);
        events.push(GameEvent::DeathFrame);
        s.phase = Phase::Dying { frame: frame + 1 };
        return;
    }

    if s.board.lives > 0 {
        s.board.lives -= 1;
        s.reset();
        events.push(GameEvent::LifeLost { lives: s.board.lives });
    } else {
        s.phase = Phase::GameOver;
        log::info!("game over: {} points", s.board.score);
        events.push(GameEvent::GameOver { score: s.board.score });
    }
}

fn resolve_tally(s: &mut Session, events: &mut Vec<GameEvent>) {
    if s.bonus_time > 0 {
        s.board.add(TALLY_POINTS, events);
        s.bonus_time -= TALLY_POINTS as i32;
        events.push(GameEvent::BonusTallied { points: TALLY_POINTS });
    }
    if s.bonus_time > 0 {
        return;
    }

    s.bonus_time = 0;
    s.level_number += 1;
    s.load_level();
    events.push(GameEvent::LevelStarted {
        level: s.level_number,
        name: s.level_name.clone(),
    });
}
