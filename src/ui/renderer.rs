/// Terminal renderer for snapshots.
///
/// Frames are composed into a `FrameBuffer` and diffed against the frame
/// already on screen; only changed cells are written, all through `queue!`
/// with a single flush. The display grid already carries entity symbols,
/// so a frame is the HUD, one pass over the grid, and any overlay.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::tile;
use crate::sim::session::{Phase, Snapshot};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so row gaps
    /// match cell colour on terminals that paint them separately.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    #[cfg(test)]
    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }
}

// ── Palette ──

const HUD_FG: Color = Color::Rgb { r: 120, g: 220, b: 255 };
const DIM: Color = Color::Rgb { r: 110, g: 110, b: 130 };
const ALERT: Color = Color::Rgb { r: 255, g: 70, b: 70 };
const GOLD: Color = Color::Rgb { r: 255, g: 215, b: 60 };

/// Foreground colour for a display-grid symbol.
fn style_for(c: char) -> Color {
    match c {
        tile::FLOOR | tile::WALL => Color::Rgb { r: 90, g: 140, b: 255 },
        tile::CRUMBLE => Color::Rgb { r: 160, g: 110, b: 70 },
        tile::LADDER => Color::Rgb { r: 230, g: 230, b: 120 },
        tile::TRAMPOLINE => Color::Rgb { r: 80, g: 255, b: 120 },
        tile::GOAL => GOLD,
        tile::SPIKE => ALERT,
        tile::STATUE => Color::Rgb { r: 230, g: 120, b: 255 },
        tile::DRAIN | tile::SPAWNER => Color::Rgb { r: 80, g: 220, b: 220 },
        tile::BARREL => Color::Rgb { r: 255, g: 150, b: 40 },
        tile::RUNNER_STOPPED | tile::RUNNER_RIGHT | tile::RUNNER_LEFT | tile::RUNNER_FALLING => Color::White,
        c if tile::DEATH_FRAMES.contains(&c) => ALERT,
        _ => DIM,
    }
}

// ── Renderer ──

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        self.fit_terminal();
        Ok(())
    }

    /// Track the terminal size. Returns true (and forces a full repaint)
    /// when it changed.
    fn fit_terminal(&mut self) -> bool {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        let (w, h) = (tw as usize, th as usize);
        if (w, h) == (self.term_w, self.term_h) {
            return false;
        }
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        self.back.cells.fill(Cell::INVALID);
        true
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, snap: &Snapshot, paused: bool) -> io::Result<()> {
        if self.fit_terminal() {
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // back to play (new life, new level): repaint everything
        if snap.phase == Phase::Playing && self.last_phase != Some(Phase::Playing) {
            self.back.cells.fill(Cell::INVALID);
        }
        self.last_phase = Some(snap.phase);

        self.compose(snap, paused);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut pen = (Color::White, Cell::BASE_BG);
        let mut next_at: Option<(usize, usize)> = None;
        queue!(self.writer, SetForegroundColor(pen.0), SetBackgroundColor(pen.1))?;

        let width = self.front.width;
        for (i, (&cell, &old)) in self.front.cells.iter().zip(&self.back.cells).enumerate() {
            if cell == old {
                continue;
            }
            let at = (i % width, i / width);
            if next_at != Some(at) {
                queue!(self.writer, MoveTo(at.0 as u16, at.1 as u16))?;
            }
            if cell.fg != pen.0 {
                queue!(self.writer, SetForegroundColor(cell.fg))?;
            }
            if cell.bg != pen.1 {
                queue!(self.writer, SetBackgroundColor(cell.bg))?;
            }
            pen = (cell.fg, cell.bg);
            queue!(self.writer, Print(cell.ch))?;
            next_at = Some((at.0 + 1, at.1));
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, snap: &Snapshot, paused: bool) {
        self.front.clear();
        self.compose_hud(snap);
        self.compose_grid(snap);

        let help_row = MAP_ROW + snap.grid.rows() + 1;
        self.front.put_str(
            0,
            help_row,
            "arrows/WASD move  space jump  P pause  1-5 speed  Enter new game  Q quit",
            DIM,
            Color::Reset,
        );

        if snap.phase == Phase::GameOver {
            self.compose_game_over(snap);
        } else if paused {
            self.compose_pause_overlay(snap);
        }
    }

    fn compose_hud(&mut self, snap: &Snapshot) {
        let hud = format!(
            "Lads {:<3} Level {:<3} Score {:06}   Bonus time {:<5} {}",
            snap.lives,
            snap.level_number,
            snap.score,
            snap.bonus_time,
            snap.difficulty.label(),
        );
        self.front.put_str(0, HUD_ROW, &hud, HUD_FG, Color::Reset);
        let bonus_fg = if snap.bonus_time < 200 { ALERT } else { DIM };
        self.front.put_str(0, HUD_ROW + 1, &snap.level_name, bonus_fg, Color::Reset);
    }

    fn compose_grid(&mut self, snap: &Snapshot) {
        let grid = &snap.grid;
        for row in 0..grid.rows() {
            for (col, c) in grid.row_text(row).chars().enumerate() {
                self.front.set(col, MAP_ROW + row, Cell::new(c, style_for(c), Color::Reset));
            }
        }
    }

    /// A boxed message centred over the map.
    fn compose_box(&mut self, snap: &Snapshot, lines: &[(&str, Color)]) {
        let bg = Color::Rgb { r: 40, g: 40, b: 55 };
        let inner = lines.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0) + 4;
        let box_h = lines.len() + 2;
        let box_x = snap.grid.cols().saturating_sub(inner) / 2;
        let box_y = MAP_ROW + snap.grid.rows().saturating_sub(box_h) / 2;

        for y in box_y..box_y + box_h {
            for x in box_x..box_x + inner {
                self.front.set(x, y, Cell::new(' ', Color::Reset, bg));
            }
        }
        for (i, (line, fg)) in lines.iter().enumerate() {
            let pad = (inner - line.chars().count()) / 2;
            self.front.put_str(box_x + pad, box_y + 1 + i, line, *fg, bg);
        }
    }

    fn compose_pause_overlay(&mut self, snap: &Snapshot) {
        self.compose_box(snap, &[
            ("PAUSED", GOLD),
            ("", DIM),
            ("P / Esc to resume", Color::White),
        ]);
    }

    fn compose_game_over(&mut self, snap: &Snapshot) {
        let score = format!("Final score {}", snap.score);
        let cause = snap.cause.map(|c| c.label()).unwrap_or("");
        self.compose_box(snap, &[
            ("GAME OVER", ALERT),
            (cause, DIM),
            (score.as_str(), Color::White),
            ("", DIM),
            ("Enter: new game   Q: quit", HUD_FG),
        ]);
    }
}
