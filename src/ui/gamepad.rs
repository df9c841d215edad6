/// Gamepad input via gilrs.
///
/// Like the keyboard, the pad is press-driven: a fresh D-pad or stick push
/// is one command, held directions do not repeat. Buttons are looked up by
/// name from the `[gamepad]` config section.
///
/// Defaults:
///   D-pad / left stick  →  up/down/left/right
///   A, B                →  jump
///   Start               →  pause, or new game after game over
///   Select              →  quit

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::entity::{Command, Intent};

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,
    B,
    X,
    Y,
    L1,
    R1,
    L2,
    R2,
    Start,
    Select,
}

const BTN_COUNT: usize = 10;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        let btn = match s.to_ascii_uppercase().as_str() {
            "A" | "SOUTH" => Btn::A,
            "B" | "EAST" => Btn::B,
            "X" | "WEST" => Btn::X,
            "Y" | "NORTH" => Btn::Y,
            "L1" | "LB" => Btn::L1,
            "R1" | "RB" => Btn::R1,
            "L2" | "LT" => Btn::L2,
            "R2" | "RT" => Btn::R2,
            "START" => Btn::Start,
            "SELECT" | "BACK" => Btn::Select,
            _ => return None,
        };
        Some(btn)
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        let btn = match btn {
            Button::South => Btn::A,
            Button::East => Btn::B,
            Button::West => Btn::X,
            Button::North => Btn::Y,
            Button::LeftTrigger => Btn::L1,
            Button::RightTrigger => Btn::R1,
            Button::LeftTrigger2 => Btn::L2,
            Button::RightTrigger2 => Btn::R2,
            Button::Start => Btn::Start,
            Button::Select => Btn::Select,
            _ => return None,
        };
        Some(btn)
    }
}

/// The four directions, shared by D-pad and stick. Order is priority order
/// when several are pushed in the same frame.
const DIRS: [Command; 4] = [Command::Up, Command::Down, Command::Left, Command::Right];

#[derive(Clone, Copy, Debug, Default)]
struct Edge {
    held: bool,
    pressed: bool,
}

impl Edge {
    fn set(&mut self, held: bool) {
        if held && !self.held {
            self.pressed = true;
        }
        self.held = held;
    }
}

/// Which buttons trigger which action.
#[derive(Debug)]
struct Bindings {
    jump: Vec<Btn>,
    pause: Vec<Btn>,
    confirm: Vec<Btn>,
    quit: Vec<Btn>,
}

impl Default for Bindings {
    fn default() -> Self {
        Bindings {
            jump: vec![Btn::A, Btn::B],
            pause: vec![Btn::Start],
            confirm: vec![Btn::Start],
            quit: vec![Btn::Select],
        }
    }
}

/// Replace `slot` with the parsed names, unless none of them parse.
fn rebind(slot: &mut Vec<Btn>, names: &[String]) {
    let parsed: Vec<Btn> = names.iter().filter_map(|n| Btn::from_name(n)).collect();
    if parsed.is_empty() {
        log::warn!("no known gamepad buttons in {names:?}; keeping {slot:?}");
    } else {
        *slot = parsed;
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,
    buttons: [Edge; BTN_COUNT],
    dpad: [Edge; 4],
    stick: [Edge; 4],
    stick_x: f32,
    stick_y: f32,
    bindings: Bindings,
    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs, connected) = match Gilrs::new() {
            Ok(g) => {
                let any = g.gamepads().next().is_some();
                (Some(g), any)
            }
            Err(e) => {
                log::warn!("gamepad support unavailable: {e}");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            buttons: [Edge::default(); BTN_COUNT],
            dpad: [Edge::default(); 4],
            stick: [Edge::default(); 4],
            stick_x: 0.0,
            stick_y: 0.0,
            bindings: Bindings::default(),
            connected,
        }
    }

    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        rebind(&mut self.bindings.jump, &cfg.jump);
        rebind(&mut self.bindings.pause, &cfg.pause);
        rebind(&mut self.bindings.confirm, &cfg.confirm);
        rebind(&mut self.bindings.quit, &cfg.quit);
    }

    /// Call once per frame: forgets last frame's presses, then polls.
    pub fn update(&mut self) {
        for e in self.buttons.iter_mut().chain(&mut self.dpad).chain(&mut self.stick) {
            e.pressed = false;
        }

        #[cfg(feature = "gamepad")]
        self.poll();
    }

    #[cfg(feature = "gamepad")]
    fn poll(&mut self) {
        let Some(gilrs) = self.gilrs.as_mut() else { return };
        let events: Vec<EventType> = std::iter::from_fn(|| gilrs.next_event())
            .map(|ev| ev.event)
            .collect();

        for event in events {
            match event {
                EventType::ButtonPressed(b, _) => self.on_button(b, true),
                EventType::ButtonReleased(b, _) => self.on_button(b, false),
                EventType::AxisChanged(Axis::LeftStickX, v, _) => self.stick_x = v,
                EventType::AxisChanged(Axis::LeftStickY, v, _) => self.stick_y = v,
                EventType::Connected => {
                    log::info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    log::info!("gamepad disconnected");
                    self.connected = false;
                    self.buttons = [Edge::default(); BTN_COUNT];
                    self.dpad = [Edge::default(); 4];
                    self.stick_x = 0.0;
                    self.stick_y = 0.0;
                }
                _ => {}
            }
        }

        // Stick y is positive upward.
        let pushed = [
            self.stick_y > STICK_DEADZONE,
            self.stick_y < -STICK_DEADZONE,
            self.stick_x < -STICK_DEADZONE,
            self.stick_x > STICK_DEADZONE,
        ];
        for (edge, held) in self.stick.iter_mut().zip(pushed) {
            edge.set(held);
        }
    }

    #[cfg(feature = "gamepad")]
    fn on_button(&mut self, button: Button, down: bool) {
        self.connected = true;
        let dpad = match button {
            Button::DPadUp => Some(0),
            Button::DPadDown => Some(1),
            Button::DPadLeft => Some(2),
            Button::DPadRight => Some(3),
            _ => None,
        };
        if let Some(i) = dpad {
            self.dpad[i].set(down);
        } else if let Some(b) = Btn::from_gilrs(button) {
            self.buttons[b as usize].set(down);
        }
    }

    fn any_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].pressed)
    }

    pub fn jump_pressed(&self) -> bool {
        self.any_pressed(&self.bindings.jump)
    }

    pub fn pause_pressed(&self) -> bool {
        self.any_pressed(&self.bindings.pause)
    }

    pub fn confirm_pressed(&self) -> bool {
        self.any_pressed(&self.bindings.confirm)
    }

    pub fn quit_pressed(&self) -> bool {
        self.any_pressed(&self.bindings.quit)
    }

    /// This frame's intent, or `None` if nothing was pushed.
    pub fn intent(&self) -> Option<Intent> {
        let command = DIRS
            .iter()
            .enumerate()
            .find(|&(i, _)| self.dpad[i].pressed || self.stick[i].pressed)
            .map_or(Command::None, |(_, &c)| c);
        let jump = self.jump_pressed();
        (command != Command::None || jump).then_some(Intent { command, jump })
    }
}
