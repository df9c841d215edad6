/// Game configuration from `config.toml`.
///
/// Every key is optional; a missing file means all defaults. Problems never
/// abort startup: they are collected in `warnings` and logged once the
/// logger exists.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub game: GameSettings,
    pub gamepad: GamepadConfig,
    pub levels_dir: PathBuf,
    pub log_file: Option<PathBuf>,
    /// Non-fatal problems found while loading.
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameSettings {
    pub difficulty: Difficulty,
    /// Spare lives at the start of a game.
    pub lives: u32,
    /// Bonus-time countdown per life, in ticks.
    pub bonus_time: i32,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub pause: Vec<String>,
    pub confirm: Vec<String>,
    pub quit: Vec<String>,
}

/// Speed presets: barrels kept in flight per spawner, and tick interval.
#[derive(Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    VeryHard,
    Impossible,
}

impl Difficulty {
    pub const ALL: [Difficulty; 5] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::VeryHard,
        Difficulty::Impossible,
    ];

    /// Minimum barrels in flight per spawner; the pool holds this many per
    /// spawner ready at level load.
    pub fn min_barrels(self) -> usize {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Medium => 5,
            Difficulty::Hard => 7,
            Difficulty::VeryHard => 10,
            Difficulty::Impossible => 15,
        }
    }

    pub fn tick_interval(self) -> Duration {
        let ms = match self {
            Difficulty::Easy => 130,
            Difficulty::Medium => 100,
            Difficulty::Hard => 80,
            Difficulty::VeryHard => 65,
            Difficulty::Impossible => 55,
        };
        Duration::from_millis(ms)
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::VeryHard => "Very Hard",
            Difficulty::Impossible => "Impossible",
        }
    }

    /// 1-based menu slot (keys `1`..`5`).
    pub fn from_slot(slot: u32) -> Option<Difficulty> {
        Difficulty::ALL.get((slot as usize).checked_sub(1)?).copied()
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    game: TomlGame,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlGame {
    #[serde(default)]
    difficulty: Difficulty,
    #[serde(default = "default_lives")]
    lives: u32,
    #[serde(default = "default_bonus_time")]
    bonus_time: i32,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_jump")]
    jump: Vec<String>,
    #[serde(default = "default_pause")]
    pause: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
    #[serde(default)]
    log_file: Option<String>,
}

// ── Defaults ──

fn default_lives() -> u32 { 3 }
fn default_bonus_time() -> i32 { 2000 }

fn default_jump() -> Vec<String> { vec!["A".into(), "B".into()] }
fn default_pause() -> Vec<String> { vec!["Start".into()] }
fn default_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }
fn default_levels_dir() -> String { "levels".into() }

impl Default for TomlGame {
    fn default() -> Self {
        TomlGame {
            difficulty: Difficulty::default(),
            lives: default_lives(),
            bonus_time: default_bonus_time(),
            seed: None,
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_jump(),
            pause: default_pause(),
            confirm: default_confirm(),
            quit: default_quit(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_dir: default_levels_dir(),
            log_file: None,
        }
    }
}

// ── Loading ──

impl GameConfig {
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let mut warnings = Vec::new();
        let toml_cfg = load_toml(&search_dirs, &mut warnings);
        let mut cfg = GameConfig::resolve(toml_cfg, &search_dirs);
        cfg.warnings = warnings;
        cfg
    }

    #[cfg(test)]
    /// Parse config text directly (no file search).
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(GameConfig::resolve(toml_cfg, &[]))
    }

    fn resolve(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let mut warnings = Vec::new();

        // relative levels_dir: first candidate dir where it exists
        let configured = PathBuf::from(&toml_cfg.general.levels_dir);
        let levels_dir = if configured.is_absolute() {
            configured
        } else {
            search_dirs
                .iter()
                .map(|d| d.join(&configured))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| configured.clone())
        };

        let mut game = GameSettings {
            difficulty: toml_cfg.game.difficulty,
            lives: toml_cfg.game.lives,
            bonus_time: toml_cfg.game.bonus_time,
            seed: toml_cfg.game.seed,
        };
        if game.bonus_time <= 0 {
            warnings.push(format!(
                "game.bonus_time = {} is not positive; using {}",
                game.bonus_time,
                default_bonus_time()
            ));
            game.bonus_time = default_bonus_time();
        }

        GameConfig {
            game,
            gamepad: GamepadConfig {
                jump: toml_cfg.gamepad.jump,
                pause: toml_cfg.gamepad.pause,
                confirm: toml_cfg.gamepad.confirm,
                quit: toml_cfg.gamepad.quit,
            },
            levels_dir,
            log_file: toml_cfg.general.log_file.map(PathBuf::from),
            warnings,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::resolve(TomlConfig::default(), &[])
    }
}

/// Where to look for `config.toml` and relative `levels_dir`: the
/// executable's directory first, then the working directory.
fn candidate_dirs() -> Vec<PathBuf> {
    let exe_dir = std::env::current_exe()
        .ok()
        .map(|exe| exe.canonicalize().unwrap_or(exe))
        .and_then(|exe| exe.parent().map(PathBuf::from));
    let cwd = std::env::current_dir().ok();

    let mut dirs: Vec<PathBuf> = exe_dir.into_iter().collect();
    if let Some(cwd) = cwd {
        if !dirs.contains(&cwd) {
            dirs.push(cwd);
        }
    }
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }
    dirs
}

/// First readable `config.toml` wins. A file that fails to parse yields
/// the defaults plus a warning; it does not fall through to the next dir.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> TomlConfig {
    for path in search_dirs.iter().map(|d| d.join("config.toml")) {
        if !path.is_file() {
            continue;
        }
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                warnings.push(format!("could not read {}: {e}", path.display()));
                continue;
            }
        };
        return toml::from_str(&text).unwrap_or_else(|e| {
            warnings.push(format!("{}: {e}; using default settings", path.display()));
            TomlConfig::default()
        });
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.game.difficulty, Difficulty::Medium);
        assert_eq!(cfg.game.lives, 3);
        assert_eq!(cfg.game.bonus_time, 2000);
        assert_eq!(cfg.game.seed, None);
        assert_eq!(cfg.levels_dir, PathBuf::from("levels"));
        assert!(cfg.log_file.is_none());
        assert_eq!(cfg.gamepad.jump, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            "[game]\ndifficulty = \"very_hard\"\nseed = 99\n\n[general]\nlog_file = \"ladder.log\"\n",
        )
        .unwrap();
        assert_eq!(cfg.game.difficulty, Difficulty::VeryHard);
        assert_eq!(cfg.game.seed, Some(99));
        assert_eq!(cfg.game.lives, 3);
        assert_eq!(cfg.log_file, Some(PathBuf::from("ladder.log")));
    }

    #[test]
    fn bad_difficulty_is_a_parse_error() {
        assert!(GameConfig::from_toml_str("[game]\ndifficulty = \"nightmare\"\n").is_err());
    }

    #[test]
    fn non_positive_bonus_time_is_replaced() {
        let cfg = GameConfig::from_toml_str("[game]\nbonus_time = 0\n").unwrap();
        assert_eq!(cfg.game.bonus_time, 2000);
        assert_eq!(cfg.warnings.len(), 1);
    }

    #[test]
    fn presets_match_the_classic_table() {
        let table: Vec<(usize, u64)> = Difficulty::ALL
            .iter()
            .map(|d| (d.min_barrels(), d.tick_interval().as_millis() as u64))
            .collect();
        assert_eq!(table, vec![(3, 130), (5, 100), (7, 80), (10, 65), (15, 55)]);
        assert_eq!(Difficulty::from_slot(1), Some(Difficulty::Easy));
        assert_eq!(Difficulty::from_slot(5), Some(Difficulty::Impossible));
        assert_eq!(Difficulty::from_slot(0), None);
        assert_eq!(Difficulty::from_slot(6), None);
    }
}
