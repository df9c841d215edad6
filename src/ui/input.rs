/// Keyboard input.
///
/// Ladder is press-driven: a key press sets the runner's command and the
/// runner keeps going until told otherwise. So there is no held-key state,
/// just a per-frame fold of presses into one `Intent` plus UI actions.
///
/// Key map:
///   Arrows / WASD       →  command (up/down/left/right)
///   Space               →  jump
///   any other printable →  stop
///   Esc / P             →  pause toggle
///   1..5                →  difficulty
///   Enter               →  new game
///   Q / Ctrl+C          →  quit

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::config::Difficulty;
use crate::domain::entity::{Command, Intent};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UiAction {
    TogglePause,
    Difficulty(Difficulty),
    NewGame,
    Quit,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KeyMapping {
    Intent(Intent),
    Action(UiAction),
    Ignore,
}

pub fn map_key(key: KeyEvent) -> KeyMapping {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => KeyMapping::Action(UiAction::Quit),
            _ => KeyMapping::Ignore,
        };
    }

    let command = |command| KeyMapping::Intent(Intent { command, jump: false });
    match key.code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => command(Command::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => command(Command::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => command(Command::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => command(Command::Right),
        KeyCode::Char(' ') => KeyMapping::Intent(Intent { command: Command::None, jump: true }),
        KeyCode::Esc | KeyCode::Char('p') | KeyCode::Char('P') => KeyMapping::Action(UiAction::TogglePause),
        KeyCode::Enter => KeyMapping::Action(UiAction::NewGame),
        KeyCode::Char('q') | KeyCode::Char('Q') => KeyMapping::Action(UiAction::Quit),
        KeyCode::Char(c) => match c.to_digit(10).and_then(Difficulty::from_slot) {
            Some(d) => KeyMapping::Action(UiAction::Difficulty(d)),
            None => command(Command::Stop),
        },
        _ => KeyMapping::Ignore,
    }
}

#[derive(Default)]
pub struct InputState {
    intent: Option<Intent>,
    actions: Vec<UiAction>,
}

impl InputState {
    pub fn new() -> Self {
        InputState::default()
    }

    /// Drain all pending terminal events without blocking.
    pub fn drain_events(&mut self) {
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                if key.kind != KeyEventKind::Release {
                    self.handle_key(key);
                }
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match map_key(key) {
            KeyMapping::Intent(i) => self.push_intent(i),
            KeyMapping::Action(a) => self.actions.push(a),
            KeyMapping::Ignore => {}
        }
    }

    /// Fold an intent from any source into this frame's intent.
    pub fn push_intent(&mut self, intent: Intent) {
        self.intent.get_or_insert_with(Intent::default).merge(intent);
    }

    pub fn push_action(&mut self, action: UiAction) {
        self.actions.push(action);
    }

    pub fn take_intent(&mut self) -> Option<Intent> {
        self.intent.take()
    }

    pub fn take_actions(&mut self) -> Vec<UiAction> {
        std::mem::take(&mut self.actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_and_wasd_agree() {
        assert_eq!(map_key(press(KeyCode::Left)), map_key(press(KeyCode::Char('a'))));
        assert_eq!(map_key(press(KeyCode::Up)), map_key(press(KeyCode::Char('W'))));
        assert_eq!(
            map_key(press(KeyCode::Right)),
            KeyMapping::Intent(Intent { command: Command::Right, jump: false })
        );
    }

    #[test]
    fn stray_printable_keys_stop() {
        assert_eq!(
            map_key(press(KeyCode::Char('x'))),
            KeyMapping::Intent(Intent { command: Command::Stop, jump: false })
        );
        assert_eq!(map_key(press(KeyCode::Char('0'))), map_key(press(KeyCode::Char('x'))));
        assert_eq!(map_key(press(KeyCode::F(5))), KeyMapping::Ignore);
    }

    #[test]
    fn digits_pick_difficulty() {
        assert_eq!(
            map_key(press(KeyCode::Char('4'))),
            KeyMapping::Action(UiAction::Difficulty(Difficulty::VeryHard))
        );
    }

    #[test]
    fn ctrl_c_quits() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(key), KeyMapping::Action(UiAction::Quit));
    }

    #[test]
    fn a_frame_of_presses_folds_into_one_intent() {
        let mut input = InputState::new();
        assert_eq!(input.take_intent(), None);
        input.handle_key(press(KeyCode::Left));
        input.handle_key(press(KeyCode::Char(' ')));
        input.handle_key(press(KeyCode::Up));
        input.handle_key(press(KeyCode::Esc));
        assert_eq!(input.take_intent(), Some(Intent { command: Command::Up, jump: true }));
        assert_eq!(input.take_actions(), vec![UiAction::TogglePause]);
        assert_eq!(input.take_intent(), None);
        assert!(input.take_actions().is_empty());
    }
}
