/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Compose the next frame into `front` (a grid of Cell)
///   2. Compare each cell with `back` (the previous frame)
///   3. Emit terminal commands only for changed cells, batched with `queue!`
///   4. Swap front/back
///
/// World pixels map onto terminal cells at PX_W × PX_H pixels per cell.
/// The renderer reads simulation state and never writes to it; sprite
/// choice depends only on the animation label and facing.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::ability::Ability;
use crate::domain::entity::{AnimState, Player, BOSS_MAX_HP, FOCUS_MAX};
use crate::domain::geometry::Rect;
use crate::sim::game::{GameState, Phase, CUTSCENE_FRAMES};
use crate::sim::level::{self, Sublevel, WORLD_COUNT};
use crate::sim::session::LevelSession;

// ── Cell ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BASE_BG: Color = Color::Rgb { r: 18, g: 18, b: 30 };
    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };
    /// Never equal to a composed cell; forces a full repaint.
    const INVALID: Cell = Cell { ch: '\0', fg: Color::Black, bg: Color::Black };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

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
            *self = FrameBuffer::new(w, h);
        }
    }

    fn clear(&mut self, bg: Color) {
        self.cells.fill(Cell { bg, ..Cell::BLANK });
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height { self.cells[y * self.width + x] } else { Cell::BLANK }
    }

    /// Background colour already at (x, y), so text can sit on top of it.
    fn bg_at(&self, x: usize, y: usize) -> Color {
        self.get(x, y).bg
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color) {
        for (i, ch) in s.chars().enumerate() {
            let bg = self.bg_at(x + i, y);
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn put_centered(&mut self, y: usize, s: &str, fg: Color) {
        let x = self.width.saturating_sub(s.chars().count()) / 2;
        self.put_str(x, y, s, fg);
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── World → screen mapping ──

/// World pixels per terminal column / row.
const PX_W: i32 = 8;
const PX_H: i32 = 16;
const HUD_ROWS: usize = 2;

/// Inclusive cell span `(col0, col1, row0, row1)` covered by `rect`, relative
/// to the camera. Rows are world rows; the caller adds the HUD offset.
fn cell_span(rect: &Rect, camera_x: i32) -> (i32, i32, i32, i32) {
    let x0 = rect.x - camera_x;
    let x1 = rect.right() - camera_x - 1;
    (
        x0.div_euclid(PX_W),
        x1.max(x0).div_euclid(PX_W),
        rect.y.div_euclid(PX_H),
        (rect.bottom() - 1).max(rect.y).div_euclid(PX_H),
    )
}

/// Ten cumulative-score-independent palettes, one per world.
fn world_palette(world: usize) -> (Color, Color) {
    // (sky, platform)
    match world {
        1 => (Color::Rgb { r: 20, g: 40, b: 28 }, Color::Rgb { r: 90, g: 160, b: 70 }),
        2 => (Color::Rgb { r: 14, g: 14, b: 40 }, Color::Rgb { r: 140, g: 110, b: 80 }),
        3 => (Color::Rgb { r: 45, g: 14, b: 10 }, Color::Rgb { r: 170, g: 70, b: 40 }),
        4 => (Color::Rgb { r: 30, g: 34, b: 40 }, Color::Rgb { r: 120, g: 120, b: 130 }),
        5 => (Color::Rgb { r: 10, g: 30, b: 44 }, Color::Rgb { r: 70, g: 130, b: 140 }),
        6 => (Color::Rgb { r: 34, g: 30, b: 50 }, Color::Rgb { r: 200, g: 170, b: 110 }),
        7 => (Color::Rgb { r: 24, g: 24, b: 48 }, Color::Rgb { r: 150, g: 150, b: 200 }),
        8 => (Color::Rgb { r: 22, g: 18, b: 14 }, Color::Rgb { r: 110, g: 90, b: 60 }),
        9 => (Color::Rgb { r: 36, g: 28, b: 20 }, Color::Rgb { r: 160, g: 130, b: 90 }),
        _ => (Color::Rgb { r: 8, g: 4, b: 14 }, Color::Rgb { r: 90, g: 40, b: 120 }),
    }
}

fn player_glyph(player: &Player) -> char {
    match player.anim {
        AnimState::Idle => '@',
        AnimState::Run if player.facing_left() => '<',
        AnimState::Run => '>',
        AnimState::Jump => '^',
        AnimState::DoubleJump => '*',
    }
}

fn bar(value: f32, max: f32, width: usize) -> String {
    let filled = ((value / max).clamp(0.0, 1.0) * width as f32).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

// ── Renderer ──

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

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    /// Returns true if the terminal size changed.
    fn fit_terminal(&mut self) -> bool {
        let (tw, th) = terminal::size().unwrap_or((120, 36));
        let (tw, th) = (tw as usize, th as usize);
        if tw == self.term_w && th == self.term_h {
            return false;
        }
        self.term_w = tw;
        self.term_h = th;
        self.front.resize(tw, th);
        self.back.resize(tw, th);
        self.back.cells.fill(Cell::INVALID);
        true
    }

    pub fn render(&mut self, game: &GameState) -> io::Result<()> {
        let resized = self.fit_terminal();
        if resized || self.last_phase != Some(game.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(game.phase);
        }

        match game.phase {
            Phase::Title => self.compose_title(game),
            Phase::WorldMap => self.compose_map(game),
            Phase::Playing | Phase::Paused => {
                if let Some(session) = game.session.as_ref() {
                    self.compose_session(session, game.anim_tick);
                }
                if game.phase == Phase::Paused {
                    self.compose_pause_overlay(game.anim_tick);
                }
            }
            Phase::Cutscene => self.compose_cutscene(game),
        }
        self.compose_message(game);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }
        self.writer.flush()
    }

    // ── Session view ──

    fn paint_rect(&mut self, rect: &Rect, camera_x: i32, ch: char, fg: Color, bg: Option<Color>) {
        let (c0, c1, r0, r1) = cell_span(rect, camera_x);
        for row in r0..=r1 {
            for col in c0..=c1 {
                if col < 0 || row < 0 { continue; }
                let (x, y) = (col as usize, row as usize + HUD_ROWS);
                if y >= self.front.height.saturating_sub(1) { continue; }
                let bg = bg.unwrap_or_else(|| self.front.bg_at(x, y));
                self.front.set(x, y, Cell::new(ch, fg, bg));
            }
        }
    }

    fn compose_session(&mut self, s: &LevelSession, anim_tick: u64) {
        let (mut sky, ground) = world_palette(s.world);
        if s.player.slow_motion {
            sky = Color::Rgb { r: 40, g: 30, b: 70 };
        }
        self.front.clear(sky);
        let cam = s.camera_x;

        for p in &s.platforms {
            self.paint_rect(&p.rect, cam, ' ', Color::White, Some(ground));
        }
        if let Some(flag) = s.exit_marker {
            self.paint_rect(&flag, cam, '|', Color::Rgb { r: 80, g: 255, b: 80 }, None);
            let pennant = Rect::new(flag.right(), flag.y, PX_W * 2, PX_H);
            self.paint_rect(&pennant, cam, '▶', Color::Rgb { r: 220, g: 40, b: 40 }, None);
        }
        for c in &s.coins {
            let ch = if (c.anim_tick / 10) % 2 == 0 { 'o' } else { 'O' };
            self.paint_rect(&c.rect, cam, ch, Color::Rgb { r: 255, g: 210, b: 40 }, None);
        }
        for e in &s.enemies {
            let (ch, fg) = if e.defeated {
                ('x', Color::DarkGrey)
            } else {
                ('E', Color::Rgb { r: 230, g: 60, b: 60 })
            };
            self.paint_rect(&e.body.rect, cam, ch, fg, None);
        }
        if let Some(b) = &s.boss {
            let flash = b.charge_timer > 0 && (anim_tick / 3) % 2 == 0;
            let fg = if flash { Color::White } else { Color::Rgb { r: 200, g: 60, b: 200 } };
            self.paint_rect(&b.body.rect, cam, '█', fg, None);
        }

        let p = &s.player;
        if p.decoy_timer > 0 {
            let ghost = p.rect().translated(-p.facing.sign() * 30, 0);
            self.paint_rect(&ghost, cam, '░', Color::Rgb { r: 120, g: 120, b: 160 }, None);
        }
        if let Some(zone) = p.slam_zone {
            self.paint_rect(&zone, cam, '~', Color::Rgb { r: 255, g: 160, b: 60 }, None);
        }
        let body_fg = if p.abilities.has(Ability::ShadowForm) {
            Color::Rgb { r: 150, g: 90, b: 220 }
        } else if p.invulnerable_frames > 0 && (anim_tick / 2) % 2 == 0 {
            Color::DarkGrey
        } else {
            Color::Rgb { r: 240, g: 240, b: 255 }
        };
        self.paint_rect(&p.rect(), cam, player_glyph(p), body_fg, None);
        for pr in &p.projectiles {
            self.paint_rect(&pr.rect, cam, '✦', Color::White, None);
        }

        self.compose_hud(s);
    }

    fn compose_hud(&mut self, s: &LevelSession) {
        let hud_bg = Color::Rgb { r: 20, g: 20, b: 60 };
        self.front.fill_row(0, hud_bg);
        self.front.fill_row(1, hud_bg);

        let stage = match s.sublevel {
            Sublevel::Stage(n) => format!("{}-{}", s.world, n),
            Sublevel::Boss => format!("{}-B", s.world),
        };
        let tags: Vec<&str> = s.player.abilities.granted().map(Ability::label).collect();
        let line = format!(
            " World {stage}  {}   Score: {:<6} Focus {}  {}",
            level::world_name(s.world).unwrap_or(""),
            s.score,
            bar(s.player.focus, FOCUS_MAX, 10),
            tags.join(" "),
        );
        self.front.put_str(0, 0, &line, Color::White);

        if let Some(b) = &s.boss {
            let line = format!(" {}  {} {}/{}", b.name, bar(b.hp as f32, BOSS_MAX_HP as f32, 20), b.hp, BOSS_MAX_HP);
            self.front.put_str(0, 1, &line, Color::Rgb { r: 255, g: 120, b: 200 });
        } else {
            let help = " ←→ move  ↑ jump  C dash  X shuriken  Z slam  V clone  F slow  Esc pause";
            self.front.put_str(0, 1, help, Color::DarkGrey);
        }
    }

    fn compose_pause_overlay(&mut self, anim_tick: u64) {
        let box_bg = Color::Rgb { r: 40, g: 40, b: 40 };
        let (bw, bh) = (44_usize.min(self.front.width), 7_usize);
        let bx = self.front.width.saturating_sub(bw) / 2;
        let by = self.front.height.saturating_sub(bh) / 2;
        for y in by..by + bh {
            for x in bx..bx + bw {
                self.front.set(x, y, Cell::new(' ', Color::White, box_bg));
            }
        }
        let label = if (anim_tick / 15) % 2 == 0 { "▶  PAUSED  ◀" } else { "   PAUSED   " };
        self.front.put_centered(by + 1, label, Color::Rgb { r: 255, g: 220, b: 50 });
        self.front.put_centered(by + 3, "Esc / P / Enter   resume", Color::Rgb { r: 100, g: 200, b: 255 });
        self.front.put_centered(by + 4, "Q   quit (this world's run is lost)", Color::Rgb { r: 180, g: 180, b: 180 });
    }

    // ── Menus ──

    fn compose_title(&mut self, game: &GameState) {
        self.front.clear(Cell::BASE_BG);
        let gold = Color::Rgb { r: 255, g: 200, b: 50 };
        let banner = [
            "╔══════════════════════════════════╗",
            "║    THE  TEN  NINJA  SCROLLS      ║",
            "╚══════════════════════════════════╝",
        ];
        for (i, line) in banner.iter().enumerate() {
            self.front.put_centered(3 + i, line, gold);
        }
        let scrolls = format!("Scrolls recovered: {}/{}", game.progress.scrolls_cleared, WORLD_COUNT);
        self.front.put_centered(8, &scrolls, Color::Rgb { r: 180, g: 140, b: 50 });
        if (game.anim_tick / 20) % 2 == 0 {
            self.front.put_centered(11, "Press ENTER", Color::Rgb { r: 80, g: 255, b: 80 });
        }
        let help = [
            "←→ / A D   move         ↑ W Space   jump",
            "C K   dash    X J   shuriken    Z   slam",
            "V   clone     F   time slow     ↓   slide",
            "Esc   pause                Q   quit",
        ];
        for (i, line) in help.iter().enumerate() {
            self.front.put_centered(14 + i, line, Color::White);
        }
    }

    fn compose_map(&mut self, game: &GameState) {
        let parchment = Color::Rgb { r: 60, g: 50, b: 32 };
        self.front.clear(parchment);
        let ink = Color::Rgb { r: 240, g: 228, b: 200 };
        self.front.put_centered(1, "─── World Map ───", ink);

        let p = &game.progress;
        for world in 1..=WORLD_COUNT {
            let i = world - 1;
            let (col, row) = (i % 5, i / 5);
            let x = 4 + col * 22;
            let y = 4 + row * 5;
            let selected = i == game.map_cursor;
            let (mark, fg) = if world <= p.scrolls_cleared {
                ("✓", Color::Rgb { r: 120, g: 220, b: 120 })
            } else if p.is_unlocked(world) {
                ("○", ink)
            } else {
                ("✗", Color::DarkGrey)
            };
            let cursor = if selected { "▶" } else { " " };
            self.front.put_str(x, y, &format!("{cursor} {world:>2} {mark}"), fg);
            self.front.put_str(x + 2, y + 1, level::world_name(world).unwrap_or(""), fg);
        }

        let tags: Vec<&str> = p.abilities.granted().map(Ability::title).collect();
        self.front.put_str(4, 16, &format!("Abilities: {}", tags.join(", ")), ink);
        self.front.put_str(4, 17, &format!("Score carried: {}", p.cumulative_score), ink);
        self.front.put_str(4, 19, "←→ choose   Enter play   Esc title   Q quit", Color::Rgb { r: 180, g: 160, b: 120 });
    }

    fn compose_cutscene(&mut self, game: &GameState) {
        self.front.clear(Color::Rgb { r: 10, g: 10, b: 10 });
        let Some(c) = game.cutscene.as_ref() else { return };
        let gold = Color::Rgb { r: 255, g: 215, b: 0 };
        let mid = self.front.height / 2;
        self.front.put_centered(mid.saturating_sub(3), &format!("Scroll {} recovered!", c.world), gold);
        if let Some(ability) = c.ability {
            self.front.put_centered(mid.saturating_sub(1), &format!("New Ability: {}", ability.title()), Color::White);
        }
        if let Some(boss) = level::boss_name(c.world) {
            self.front.put_centered(mid + 1, &format!("{boss} has fallen."), Color::Rgb { r: 200, g: 160, b: 220 });
        }
        let shown = CUTSCENE_FRAMES.saturating_sub(c.timer) as f32;
        self.front.put_centered(mid + 4, &bar(shown, CUTSCENE_FRAMES as f32, 30), Color::DarkGrey);
    }

    fn compose_message(&mut self, game: &GameState) {
        if game.message.is_empty() || self.front.height == 0 {
            return;
        }
        let row = self.front.height - 1;
        let bg = Color::Rgb { r: 200, g: 180, b: 50 };
        self.front.fill_row(row, bg);
        self.front.put_str(0, row, &format!(" ◈ {} ", game.message), Color::Black);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_span_scales_and_follows_camera() {
        let r = Rect::new(100, 380, 40, 46);
        assert_eq!(cell_span(&r, 0), (12, 17, 23, 26));
        assert_eq!(cell_span(&r, 100), (0, 4, 23, 26));
    }

    #[test]
    fn cell_span_floors_negative_coordinates() {
        let r = Rect::new(-200, 480, 16, 16);
        assert_eq!(cell_span(&r, 0), (-25, -24, 30, 30));
    }

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(bar(50.0, 100.0, 10), "[#####-----]");
        assert_eq!(bar(0.0, 100.0, 4), "[----]");
        assert_eq!(bar(200.0, 100.0, 4), "[####]");
    }

    #[test]
    fn put_str_keeps_background() {
        let mut fb = FrameBuffer::new(10, 1);
        fb.fill_row(0, Color::Red);
        fb.put_str(1, 0, "hi", Color::White);
        assert_eq!(fb.get(1, 0).bg, Color::Red);
        assert_eq!(fb.get(2, 0).ch, 'i');
    }
}
