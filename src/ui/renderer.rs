/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws.
///
/// World coordinates (800x600, y down) are mapped onto the available cell
/// grid with independent horizontal and vertical scales, after adding the
/// camera's climb offset to every world y.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::actor::{Facing, MoveState, ACTOR_SIZE};
use crate::sim::world::{Phase, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells.
    ///
    /// On VTE-based Linux terminals (GNOME Terminal, etc.), the inter-row gap
    /// pixels use the background color from the last Clear or the terminal's
    /// configured default.  By using the SAME explicit RGB for both
    /// `Clear(ClearType::All)` and every cell's background, the gap color
    /// matches the cell color exactly, eliminating visible horizontal lines.
    const BASE_BG: Color = Color::Rgb { r: 18, g: 20, b: 38 };

    const BLANK: Cell = Cell {
        ch: ' ',
        fg: Color::White,
        bg: Cell::BASE_BG,
    };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell {
        ch: '?',
        fg: Color::Magenta,
        bg: Color::Magenta,
    };

    /// Normalize bg: Color::Reset → BASE_BG so that every cell gets an
    /// explicit background color (never terminal-default).
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        Cell { ch: c, fg, bg: Self::norm_bg(bg) }
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
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
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

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width { break; }
            self.set(cx, y, Cell::from_char(ch, fg, bg));
            cx += 1;
        }
    }
}

// ── Renderer ──

/// Vertical offsets: HUD on top, playfield below a one-row gap.
const HUD_ROW: usize = 0;
const FIELD_ROW: usize = 2;

/// Rows reserved below the playfield: gap + message + gap + help.
const FOOTER_ROWS: usize = 4;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const PLATFORM_FG: Color = Color::Rgb { r: 210, g: 170, b: 60 };
const ACTOR_FG: Color = Color::Rgb { r: 235, g: 235, b: 245 };

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

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
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

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            // Force full repaint after resize.
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Detect phase change → clear for clean transition
        let phase_changed = self.last_phase != Some(world.phase);
        if phase_changed {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        // Build front buffer
        self.front.clear();

        match world.phase {
            Phase::Title => self.compose_title(world),
            Phase::Playing => self.compose_game(world),
            Phase::GameOver => self.compose_game_over(world),
        }

        // Pause overlay (drawn on top of game)
        if world.paused {
            self.compose_pause_overlay(world);
        }

        // Diff and emit
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Set explicit base colors at start of frame.
        // IMPORTANT: Do NOT use ResetColor here — it resets to the terminal's
        // native default, which may differ from BASE_BG and cause line artifacts.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                if cell == prev {
                    need_move = true;
                    continue;
                }

                // Position cursor if needed
                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                // Set colors only if changed
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;

                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── World → cell grid mapping ──

    fn field_rows(&self) -> usize {
        self.term_h
            .saturating_sub(FIELD_ROW + FOOTER_ROWS)
            .max(1)
    }

    /// Map a world point (after camera offset) to a cell position.
    /// Returns None when the point is outside the visible field.
    fn project(&self, world: &WorldState, wx: f32, wy: f32) -> Option<(usize, usize)> {
        let cols = self.term_w as f32;
        let rows = self.field_rows() as f32;

        let sy = wy + world.camera.climb();
        if sy < 0.0 || sy >= world.world.height || wx < 0.0 {
            return None;
        }

        let col = (wx / world.world.width * cols) as usize;
        let row = FIELD_ROW + (sy / world.world.height * rows) as usize;
        if col >= self.term_w {
            return None;
        }
        Some((col, row))
    }

    // ── Compose: build front buffer content ──

    fn compose_game(&mut self, w: &WorldState) {
        let buf_w = self.front.width;

        // ── HUD row ──
        let hud = format!(
            " Altitude: {:>6.0}   Platforms: {:<3}",
            w.camera.climb(),
            w.pool.len(),
        );
        for x in 0..buf_w {
            self.front.set(x, HUD_ROW, Cell::from_char(' ', Color::White, HUD_BG));
        }
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        // ── Platforms ──
        let cols = buf_w as f32;
        for p in w.pool.platforms() {
            let left = p.pos().x;
            let right = left + p.width();
            let Some((c0, row)) = self.project(w, left.max(0.0), p.top_y()) else {
                continue;
            };
            let c1 = ((right.min(w.world.width) / w.world.width) * cols) as usize;
            for col in c0..c1.min(buf_w) {
                self.front.set(col, row, Cell::from_char('▀', PLATFORM_FG, Color::Reset));
            }
        }

        // ── Actor (scaled block) ──
        let pos = w.actor.pos();
        let body = match w.actor.move_state {
            MoveState::Jump => '▲',
            MoveState::Fall => '▼',
            MoveState::Run => match w.actor.facing {
                Facing::Left => '◀',
                Facing::Right => '▶',
            },
            MoveState::Idle => '█',
        };
        let rows = self.field_rows() as f32;
        let h_cells = ((ACTOR_SIZE / w.world.height) * rows).max(1.0) as usize;
        let w_cells = ((ACTOR_SIZE / w.world.width) * cols).max(1.0) as usize;
        for dy in 0..h_cells {
            let wy = pos.y + (dy as f32 + 0.5) / h_cells as f32 * ACTOR_SIZE;
            for dx in 0..w_cells {
                let wx = pos.x + (dx as f32 + 0.5) / w_cells as f32 * ACTOR_SIZE;
                if let Some((col, row)) = self.project(w, wx, wy) {
                    self.front.set(col, row, Cell::from_char(body, ACTOR_FG, Color::Reset));
                }
            }
        }

        // ── Message bar ──
        let msg_row = FIELD_ROW + self.field_rows() + 1;
        if msg_row < self.front.height {
            if let Some(msg) = &w.message {
                let line = format!(" ◈ {} ", msg);
                for x in 0..buf_w {
                    self.front.set(x, msg_row, Cell::from_char(' ', Color::Black, MSG_BG));
                }
                self.front.put_str(0, msg_row, &line, Color::Black, MSG_BG);
            }
        }

        // ── Help bar ──
        let help_row = msg_row + 2;
        if help_row < self.front.height {
            let help = " ←→/A D:Steer  ↑/W/Space:Jump  F1:Pause  R:Restart  ESC:Title";
            self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
        }
    }

    // ── Static screens (title, game over) ──

    fn compose_title(&mut self, w: &WorldState) {
        let title = [
            r"  ___  _            _  _                            ",
            r" / __|| |__ _  _   | || | ___  _ __  _ __  ___  _ _ ",
            r" \__ \| / /| || |  | __ |/ _ \| '_ \| '_ \/ -_)| '_|",
            r" |___/|_\_\ \_, |  |_||_|\___/| .__/| .__/\___||_|  ",
            r"            |__/              |_|   |_|             ",
        ];

        for (i, line) in title.iter().enumerate() {
            self.front.put_str(2, 2 + i, line, Color::Rgb{r:255,g:200,b:50}, Color::Reset);
        }

        let tagline = "━━━ Terminal Edition (Rust) ━━━";
        let tx = 2 + (title[1].len().saturating_sub(tagline.len())) / 2;
        self.front.put_str(tx, 8, tagline, Color::Rgb{r:180,g:140,b:50}, Color::Reset);

        // Menu options
        let menu_base = 11;
        let hi = Color::Rgb{r:80,g:255,b:80};

        let blink = (w.anim_tick / 8) % 2 == 0;
        let start_line = if blink { "ENTER   Start Climbing" } else { "        Start Climbing" };
        self.front.put_str(8, menu_base, start_line, hi, Color::Reset);
        self.front.put_str(8, menu_base + 1, "  Q     Quit", Color::White, Color::Reset);

        let pad_line = if w.pad_connected {
            "  Pad   Connected"
        } else {
            "  Pad   Not detected"
        };
        self.front.put_str(8, menu_base + 2, pad_line, Color::DarkGrey, Color::Reset);

        // Controls reference
        let help = [
            "Controls",
            "  ←→ / A D       Steer",
            "  ↑ / W / Space  Jump",
            "  F1 Pause   R Restart   ESC Title",
            "",
            "The view climbs on its own.",
            "Keep jumping. Don't fall off the bottom.",
        ];

        let help_base = menu_base + 4;
        for (i, line) in help.iter().enumerate() {
            let color = if i == 0 { Color::Rgb{r:255,g:200,b:50} } else { Color::White };
            self.front.put_str(8, help_base + i, line, color, Color::Reset);
        }
    }

    fn compose_game_over(&mut self, w: &WorldState) {
        let box_art = [
            "╔════════════════════════════╗",
            "║      ✕  FELL  OUT  ✕       ║",
            "╚════════════════════════════╝",
        ];
        for (i, l) in box_art.iter().enumerate() {
            self.front.put_str(6, 4 + i, l, Color::Rgb{r:255,g:60,b:60}, Color::Reset);
        }
        let altitude = format!("◈ Altitude reached: {:.0}", w.camera.climb());
        self.front.put_str(8, 9, &altitude, Color::White, Color::Reset);
        self.front.put_str(8, 11, "▸ ENTER: Climb Again", Color::Rgb{r:80,g:255,b:80}, Color::Reset);
        self.front.put_str(8, 12, "▸ ESC:   Back to Title", Color::DarkGrey, Color::Reset);
    }

    fn compose_pause_overlay(&mut self, w: &WorldState) {
        let dim = Color::Rgb{r:40,g:40,b:40};
        let blink = (w.anim_tick / 8) % 2 == 0;

        let box_w = 26_usize.min(self.front.width);
        let box_h = 7_usize;
        let box_x = self.front.width.saturating_sub(box_w) / 2;
        let box_y = FIELD_ROW + self.field_rows().saturating_sub(box_h) / 2;

        // Draw dark background box
        for y in box_y..(box_y + box_h).min(self.front.height) {
            for x in box_x..box_x + box_w {
                self.front.set(x, y, Cell::from_char(' ', Color::Reset, dim));
            }
        }

        let hdr = Color::Rgb{r:255,g:220,b:50};
        let key_c = Color::Rgb{r:100,g:200,b:255};

        let pause_label = if blink { "║  ▶  PAUSED  ◀  ║" } else { "║     PAUSED     ║" };
        self.front.put_str(box_x + 4, box_y, "╔════════════════╗", hdr, dim);
        self.front.put_str(box_x + 4, box_y + 1, pause_label, hdr, dim);
        self.front.put_str(box_x + 4, box_y + 2, "╚════════════════╝", hdr, dim);

        self.front.put_str(box_x + 2, box_y + 4, "F1  Resume", key_c, dim);
        self.front.put_str(box_x + 2, box_y + 5, "R   Restart", key_c, dim);
        self.front.put_str(box_x + 2, box_y + 6, "ESC Back to Title", key_c, dim);
    }
}
