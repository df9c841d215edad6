/// Entry point and UI loop.
///
/// The simulation runs on the driver's loop thread; this thread only turns
/// keyboard/gamepad input into requests, plays sound for published events,
/// and draws the newest snapshot.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::time::Duration;

use config::GameConfig;
use sim::driver::{Driver, Request};
use sim::level::LevelSet;
use sim::session::{Phase, Session, Snapshot};
use ui::gamepad::GamepadState;
use ui::input::{InputState, UiAction};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();

    if let Err(e) = init_logging(&config) {
        eprintln!("Could not open log file: {e}");
    }
    for warning in &config.warnings {
        log::warn!("{warning}");
    }

    let levels = LevelSet::load_or_builtin(&config.levels_dir);
    let mut driver = Driver::new(Session::new(levels, config.game.clone()));

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();
    if sound.is_none() {
        log::info!("no audio device; running silent");
    }

    let result = ui_loop(&mut driver, &mut renderer, sound.as_ref(), &config);
    driver.stop();

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    match result {
        Ok(last) => {
            println!();
            println!("Thanks for playing Ladder!");
            if let Some(snap) = last {
                println!("Final Score: {}  (level {})", snap.score, snap.level_number);
            }
        }
        Err(e) => eprintln!("Game error: {e}"),
    }
}

/// Logs go to `general.log_file` when set; the terminal belongs to the game.
fn init_logging(config: &GameConfig) -> std::io::Result<()> {
    let mut builder = match &config.log_file {
        Some(path) => {
            let file = File::create(path)?;
            let mut b = env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or("info"),
            );
            b.target(env_logger::Target::Pipe(Box::new(file)));
            b
        }
        None => {
            let mut b = env_logger::Builder::new();
            b.filter_level(log::LevelFilter::Off);
            b
        }
    };
    if let Err(e) = builder.try_init() {
        eprintln!("Logger setup failed: {e}");
    }
    Ok(())
}

fn ui_loop(
    driver: &mut Driver,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<Option<Snapshot>, Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        log::info!("gamepad connected");
    }

    let mut paused = false;
    let mut last: Option<Snapshot> = driver.peek();
    driver.start();

    loop {
        kb.drain_events();
        gp.update();

        if let Some(intent) = gp.intent() {
            kb.push_intent(intent);
        }
        if gp.pause_pressed() {
            kb.push_action(UiAction::TogglePause);
        }
        if gp.quit_pressed() {
            kb.push_action(UiAction::Quit);
        }
        let game_over = last.as_ref().is_some_and(|s| s.phase == Phase::GameOver);
        if game_over && gp.confirm_pressed() {
            kb.push_action(UiAction::NewGame);
        }

        for action in kb.take_actions() {
            match action {
                UiAction::Quit => {
                    driver.send(Request::Quit);
                    return Ok(last);
                }
                UiAction::TogglePause if !game_over => {
                    paused = !paused;
                    if paused {
                        driver.stop();
                        log::info!("paused");
                    } else {
                        driver.start();
                        log::info!("resumed");
                    }
                }
                UiAction::TogglePause => {}
                UiAction::Difficulty(d) => driver.send(Request::Difficulty(d)),
                UiAction::NewGame if game_over => {
                    paused = false;
                    driver.send(Request::NewGame);
                    driver.start();
                }
                UiAction::NewGame => {}
            }
        }

        if let Some(intent) = kb.take_intent() {
            if !paused {
                driver.send(Request::Intent(intent));
            }
        }

        for snap in driver.drain_snapshots() {
            if let Some(sfx) = sound {
                sfx.play_events(&snap.events);
            }
            last = Some(snap);
        }
        if !driver.is_running() {
            // Stopped driver: difficulty changes show up through the held session.
            if let Some(snap) = driver.peek() {
                last = Some(snap);
            }
        }

        if let Some(snap) = &last {
            renderer.render(snap, paused)?;
        }
        std::thread::sleep(FRAME_SLEEP);
    }
}
