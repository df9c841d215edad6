/// Level sources and level sequencing.
///
/// ## Sources (priority order):
///   1. `levels_dir` from config: every `*.txt` file, sorted by file name
///   2. Built-in embedded levels
///
/// ## File format:
///   Plain text, one grid row per line (LF or CRLF). Ragged lines are
///   padded and trailing blank lines dropped; see `Grid::from_text`.
///   The level name is the file stem.
///
/// ## Sequence:
///   Level numbers walk the unique levels in widening runs and then wrap:
///   ```text
///   level   1 2 3 4 5 6 7 8 9 ...
///   index   0 1 0 1 2 0 1 2 3 ...
///   ```

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::grid::Grid;

/// One playable level, as loaded (never mutated by play).
#[derive(Clone, Debug)]
pub struct LevelDef {
    pub name: String,
    pub grid: Grid,
}

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("cannot read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no *.txt levels in {}", .0.display())]
    NoLevels(PathBuf),
}

#[derive(Clone, Debug)]
pub struct LevelSet {
    levels: Vec<LevelDef>,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

impl LevelSet {
    pub fn builtin() -> Self {
        LevelSet { levels: embedded_levels() }
    }

    /// Build a set from already-parsed levels. Empty input falls back to
    /// the built-ins.
    #[cfg(test)]
    pub fn from_defs(levels: Vec<LevelDef>) -> Self {
        if levels.is_empty() {
            return LevelSet::builtin();
        }
        LevelSet { levels }
    }

    /// Load every `*.txt` in `dir`, sorted by file name.
    pub fn from_dir(dir: &Path) -> Result<Self, LevelError> {
        let entries = std::fs::read_dir(dir).map_err(|source| LevelError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|e| e == "txt"))
            .collect();
        paths.sort();

        let mut levels = Vec::with_capacity(paths.len());
        for path in paths {
            let text = std::fs::read_to_string(&path).map_err(|source| LevelError::Io {
                path: path.clone(),
                source,
            })?;
            let grid = Grid::from_text(&text);
            if grid.changed() {
                log::info!("{} was normalized on load (padding or trailing blank lines)", path.display());
                log::debug!("{} as played:\n{}", path.display(), grid.to_text());
            }
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            levels.push(LevelDef { name, grid });
        }

        if levels.is_empty() {
            return Err(LevelError::NoLevels(dir.to_path_buf()));
        }
        Ok(LevelSet { levels })
    }

    /// Levels from `dir` when it holds any, else the built-ins.
    pub fn load_or_builtin(dir: &Path) -> Self {
        if !dir.is_dir() {
            return LevelSet::builtin();
        }
        match LevelSet::from_dir(dir) {
            Ok(set) => {
                log::info!("loaded {} levels from {}", set.len(), dir.display());
                set
            }
            Err(e) => {
                log::warn!("{e}; using built-in levels");
                LevelSet::builtin()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[cfg(test)]
    pub fn get(&self, index: usize) -> Option<&LevelDef> {
        self.levels.get(index)
    }

    /// The level played as 1-based `level_number`.
    pub fn for_level(&self, level_number: u32) -> &LevelDef {
        &self.levels[sequence_index(level_number, self.levels.len())]
    }
}

/// Index into `unique` levels for 1-based `level_number`: runs of 2, 3, ...
/// up to `unique` levels, then the whole pattern repeats.
pub fn sequence_index(level_number: u32, unique: usize) -> usize {
    if unique <= 1 {
        return 0;
    }
    let total: usize = (2..=unique).sum();
    let mut n = (level_number.max(1) as usize - 1) % total;
    let mut run = 2;
    while n >= run {
        n -= run;
        run += 1;
    }
    n
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

fn embedded_levels() -> Vec<LevelDef> {
    vec![
        make_embedded("Easy Street", &[
            "                                       V                 $                     ",
            "                                                         H                     ",
            "                H                                        H                     ",
            "       =========H==================================================            ",
            "                H                                                              ",
            "                H                                                              ",
            "                H          H                             H                     ",
            "================H==========H==================   ========H=====================",
            "                &          H                             H          |       |  ",
            "                                                         H         Easy Street ",
            "                H                                        H                     ",
            "       =========H==========H=========  =======================                 ",
            "                H                                                              ",
            "                H                                                              ",
            "                H                                        H                     ",
            "======================== ====================== =========H==============       ",
            "                                                         H                     ",
            "                                                         H                     ",
            "*    p                                                   H                    *",
            "===============================================================================",
        ]),
        make_embedded("Long Island", &[
            "                                                                          $    ",
            "                                                                   &      H    ",
            "    H       |V                                                     V|     H    ",
            "====H======================= ========================= ======================  ",
            "    H                                                                          ",
            "    H                                                                          ",
            "    H                    & |                         . .                  H    ",
            "========================== ======  =================== ===================H==  ",
            "                                                                          H    ",
            "                                  |                                       H    ",
            "    H                             |                 .  .                  H    ",
            "====H=====================   ======  ================  ======================  ",
            "    H                                                                          ",
            "    H                      |                                                   ",
            "    H                      |                        .   .                 H    ",
            "=========================  ========    ==============   ==================H==  ",
            "                                                                          H    ",
            "==============                      |                                     H    ",
            " Long Island |   p         *        |                 *                   H    ",
            "===============================================================================",
        ]),
        make_embedded("Ghost Town", &[
            "                            V               V           V               $      ",
            "                                                                       $$$     ",
            "     p    H                                                    H      $$$$$   H",
            "==========H===                                                =H==============H",
            "          H                                                    H              H",
            "          H                              &                     H              H",
            "     ==============   ====     =    ======    =   ====    =====H=====         H",
            "    G              ^^^    ^^^^^ ^^^^      ^^^^ ^^^    ^^^                     $",
            "    h                                                                 |        ",
            "    o     |                     H                             &       |        ",
            "    s     ======================H============================== ===========    ",
            "    t        &                  H                                              ",
            "                                H                                              ",
            "              |                 H                 H                   H        ",
            "    T         ==================H=================H===================H======= ",
            "    o                                             H                   H        ",
            "    w                                                                 H        ",
            "    n                           ^                                     H        ",
            "*                              ^^^                                    H       *",
            "===============================================================================",
        ]),
        make_embedded("Tunnel Vision", &[
            "                                            V                       V          ",
            "                                                                               ",
            "     H             H                         |                H                ",
            "=====H=====--======H==========================     ===----====H===========     ",
            "     H             H                |&&                       H                ",
            "     H             H                ==================        H                ",
            "     H             H                       tunnel  H          H                ",
            "     H           =======---===----=================H=         H           H    ",
            "     H         |                           vision  H          H           H    ",
            "     H         =========---&      -----============H          H           H    ",
            "     H           H                                 H |        H           H    ",
            "     H           H=========----===----================        H  ==============",
            "                 H                                        &   H                ",
            "                 H                                        |   H                ",
            "====---====      H                                        |   H                ",
            "|         |    ================---===---===================   H                ",
            "|   ===   |                                                   H        H    p  ",
            "|    $    |                                                   H     ===H=======",
            "|*  $$$  *|   *                *       *                     *H       *H       ",
            "===============================================================================",
        ]),
        make_embedded("Point of No Return", &[
            "         $                                                                     ",
            "         H                                                   V                 ",
            "         H                                                                     ",
            "         HHHHHHHHHHHHH     .HHHHHHHHHHHHHH                          H    p     ",
            "         &                   V           H                        ==H==========",
            "                                         H                          H          ",
            "   H                                     H        .                 H          ",
            "===H==============-----------============H====                      H          ",
            "   H                                                      H         H          ",
            "   H                                                 =====H==============      ",
            "   H                                     H                H                    ",
            "   H              &..^^^.....^..^ . ^^   H==---------     H                    ",
            "   H         ============================H    &           H             H      ",
            "   H         ===      ===      ===       H    ---------=================H======",
            "   H                                     H                              H      ",
            "   H                          &          H          &                   H      ",
            "   ==========-------------------------=======----------===================     ",
            "                                                                               ",
            "^^^*         ^^^^^^^^^^^^^^^^^^^^^^^^^*     *^^^^^^^^^^*Point of No Return*^^^^",
            "===============================================================================",
        ]),
    ]
}

fn make_embedded(name: &str, map: &[&str]) -> LevelDef {
    LevelDef {
        name: name.to_string(),
        grid: Grid::from_text(&map.join("\n")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::{SPAWNER, START};

    #[test]
    fn sequence_widens_then_wraps() {
        let got: Vec<usize> = (1..=16).map(|n| sequence_index(n, 5)).collect();
        assert_eq!(got, vec![0, 1, 0, 1, 2, 0, 1, 2, 3, 0, 1, 2, 3, 4, 0, 1]);
    }

    #[test]
    fn sequence_with_one_or_two_levels() {
        assert!((1..10).all(|n| sequence_index(n, 1) == 0));
        let two: Vec<usize> = (1..=5).map(|n| sequence_index(n, 2)).collect();
        assert_eq!(two, vec![0, 1, 0, 1, 0]);
        assert_eq!(sequence_index(0, 3), 0);
    }

    #[test]
    fn builtins_are_well_formed() {
        let set = LevelSet::builtin();
        assert_eq!(set.len(), 5);
        for i in 0..set.len() {
            let def = set.get(i).unwrap();
            assert_eq!((def.grid.rows(), def.grid.cols()), (20, 79), "{}", def.name);
            assert!(!def.grid.changed(), "{} needed normalizing", def.name);
            assert!(def.grid.first_position_of(START).is_some(), "{} has no start", def.name);
            assert!(def.grid.first_position_of(SPAWNER).is_some(), "{} has no spawner", def.name);
        }
        assert_eq!(set.for_level(3).name, "Easy Street");
        assert_eq!(set.for_level(5).name, "Ghost Town");
    }

    #[test]
    fn from_dir_sorts_and_normalizes() {
        let dir = std::env::temp_dir().join(format!("ladder-levels-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("b_second.txt"), "==\n").unwrap();
        std::fs::write(dir.join("a_first.txt"), "p  $\r\n===\r\n\r\n").unwrap();
        std::fs::write(dir.join("notes.md"), "ignored").unwrap();

        let set = LevelSet::from_dir(&dir).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(set.len(), 2);
        let first = set.get(0).unwrap();
        assert_eq!(first.name, "a_first");
        assert!(first.grid.changed());
        assert_eq!(first.grid.to_text(), "p  $\n=== \n");
        assert_eq!(set.get(1).unwrap().name, "b_second");
    }

    #[test]
    fn empty_dir_is_an_error_and_falls_back() {
        let dir = std::env::temp_dir().join(format!("ladder-empty-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let err = LevelSet::from_dir(&dir).unwrap_err();
        assert!(matches!(err, LevelError::NoLevels(_)));
        assert_eq!(LevelSet::load_or_builtin(&dir).len(), 5);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_dir_is_an_io_error() {
        let err = LevelSet::from_dir(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, LevelError::Io { .. }));
    }
}
