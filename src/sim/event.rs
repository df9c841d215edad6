/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound and the HUD.

use crate::domain::entity::Pos;
use super::session::GameOverCause;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    LevelStarted { level: u32, name: String },
    StatueCollected { pos: Pos, points: u64 },
    BarrelJumped { pos: Pos },
    FloorCollapsed { pos: Pos },
    BarrelSpawned { pos: Pos },
    BarrelRecycled { pos: Pos },
    RunnerKilled { cause: GameOverCause },
    DeathFrame,
    GoalReached,
    BonusTallied { points: u64 },
    ExtraLife { lives: u32 },
    LifeLost { lives: u32 },
    GameOver { score: u64 },
}

impl GameEvent {
    /// Events that score points (the classic rate-limited beep).
    pub fn is_scoring(&self) -> bool {
        matches!(
            self,
            GameEvent::StatueCollected { .. }
                | GameEvent::BarrelJumped { .. }
                | GameEvent::BonusTallied { .. }
        )
    }
}
