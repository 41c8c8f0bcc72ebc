//! Rendering layer: all terminal I/O lives here.
//!
//! Each function receives a mutable writer and an immutable snapshot of the
//! session. No game logic is performed; this module only maps world pixels
//! onto terminal cells and emits crossterm commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};
use snail_runner::entities::{EntityKind, GameStatus, Rect};
use snail_runner::snapshot::{Snapshot, SpriteView, TextView};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_FOREST: Color = Color::DarkGreen;
const C_GROUND: Color = Color::DarkYellow;
const C_ROAD: Color = Color::Grey;
const C_PINE: Color = Color::Green;
const C_POISON: Color = Color::Magenta;
const C_PLAYER: Color = Color::White;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_BEST: Color = Color::Cyan;
const C_HINT: Color = Color::DarkGrey;

/// Cells between two backdrop trees.
const TREE_SPACING: i32 = 9;

/// Maps world pixels to terminal cells.
struct Viewport {
    cols: u16,
    rows: u16,
    sx: f32,
    sy: f32,
    camera_x: f32,
}

impl Viewport {
    fn new(snap: &Snapshot, cols: u16, rows: u16) -> Self {
        let play_rows = rows.saturating_sub(1).max(1);
        Viewport {
            cols,
            rows: play_rows,
            sx: cols as f32 / snap.view.width.max(1.0),
            sy: play_rows as f32 / snap.view.height.max(1.0),
            camera_x: snap.camera_x,
        }
    }

    /// World rectangle → clipped cell range `(col0, row0, col1, row1)`.
    fn cells(&self, rect: &Rect) -> Option<(u16, u16, u16, u16)> {
        let x0 = ((rect.x - self.camera_x) * self.sx).floor() as i32;
        let y0 = (rect.y * self.sy).floor() as i32;
        let x1 = (((rect.right() - self.camera_x) * self.sx).ceil() as i32).max(x0 + 1);
        let y1 = ((rect.bottom() * self.sy).ceil() as i32).max(y0 + 1);

        let c0 = x0.max(0);
        let r0 = y0.max(0);
        let c1 = x1.min(self.cols as i32);
        let r1 = y1.min(self.rows as i32);
        if c0 >= c1 || r0 >= r1 {
            return None;
        }
        Some((c0 as u16, r0 as u16, c1 as u16, r1 as u16))
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, snap: &Snapshot, cols: u16, rows: u16) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let vp = Viewport::new(snap, cols, rows);

    for sprite in &snap.sprites {
        draw_sprite(out, &vp, sprite)?;
    }
    for text in &snap.texts {
        draw_text(out, &vp, snap, text)?;
    }
    draw_controls_hint(out, rows)?;

    if snap.status == GameStatus::Dead {
        draw_game_over(out, &vp, snap)?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Sprites ───────────────────────────────────────────────────────────────────

fn fill<W: Write>(
    out: &mut W,
    (c0, r0, c1, r1): (u16, u16, u16, u16),
    glyph: &str,
    color: Color,
) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(color))?;
    let line = glyph.repeat((c1 - c0) as usize);
    for row in r0..r1 {
        out.queue(cursor::MoveTo(c0, row))?;
        out.queue(Print(&line))?;
    }
    Ok(())
}

fn draw_sprite<W: Write>(out: &mut W, vp: &Viewport, sprite: &SpriteView) -> std::io::Result<()> {
    match sprite.kind {
        EntityKind::ForestBackground => draw_forest(out, vp, sprite),
        EntityKind::WoodBackground => match vp.cells(&sprite.rect) {
            Some(cells) => fill(out, cells, "▒", C_GROUND),
            None => Ok(()),
        },
        EntityKind::Road => match vp.cells(&sprite.rect) {
            Some(cells) => fill(out, cells, "═", C_ROAD),
            None => Ok(()),
        },
        EntityKind::Pine => match vp.cells(&sprite.rect) {
            Some(cells) => fill(out, cells, "♣", C_PINE),
            None => Ok(()),
        },
        EntityKind::Poison => match vp.cells(&sprite.rect) {
            Some(cells) => fill(out, cells, "☠", C_POISON),
            None => Ok(()),
        },
        EntityKind::Player => draw_player(out, vp, sprite),
        _ => Ok(()),
    }
}

/// Backdrop trees drift at the parallax rate carried in `texture_offset`.
fn draw_forest<W: Write>(out: &mut W, vp: &Viewport, sprite: &SpriteView) -> std::io::Result<()> {
    let Some((c0, r0, c1, r1)) = vp.cells(&sprite.rect) else {
        return Ok(());
    };
    let shift = (sprite.texture_offset * vp.sx) as i32;
    let top = r0.max(r1.saturating_sub(vp.rows / 2));
    out.queue(style::SetForegroundColor(C_FOREST))?;
    for col in c0..c1 {
        if (col as i32 + shift).rem_euclid(TREE_SPACING) != 0 {
            continue;
        }
        out.queue(cursor::MoveTo(col, top))?;
        out.queue(Print("♠"))?;
        for row in top + 1..r1 {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(Print("│"))?;
        }
    }
    Ok(())
}

fn draw_player<W: Write>(out: &mut W, vp: &Viewport, sprite: &SpriteView) -> std::io::Result<()> {
    // Shell in the middle, head in front:
    //   _@
    //  (@)>
    let Some((c0, r0, c1, r1)) = vp.cells(&sprite.rect) else {
        return Ok(());
    };
    out.queue(style::SetForegroundColor(C_PLAYER))?;
    let body_row = r1 - 1;
    out.queue(cursor::MoveTo(c0, body_row))?;
    let width = (c1 - c0).max(1) as usize;
    let body: String = "(@)>".chars().cycle().take(width.max(3)).collect();
    out.queue(Print(body))?;
    if body_row > r0 {
        out.queue(cursor::MoveTo(c0, body_row - 1))?;
        out.queue(Print(" _@"))?;
    }
    Ok(())
}

// ── HUD ───────────────────────────────────────────────────────────────────────

fn draw_text<W: Write>(
    out: &mut W,
    vp: &Viewport,
    snap: &Snapshot,
    text: &TextView,
) -> std::io::Result<()> {
    let row = ((text.pos.y * vp.sy) as u16).min(vp.rows.saturating_sub(1));
    let anchor = (text.pos.x * vp.sx) as u16;
    let len = text.text.chars().count() as u16;
    let (col, color) = match text.kind {
        EntityKind::TutorialText => (anchor.saturating_sub(len / 2), Color::White),
        EntityKind::HighScoreText => (anchor, C_HUD_BEST),
        _ => (anchor, C_HUD_SCORE),
    };
    if snap.status == GameStatus::Dead && text.kind == EntityKind::TutorialText {
        // The game-over box carries its own prompt.
        return Ok(());
    }
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(&text.text))?;
    Ok(())
}

fn draw_controls_hint<W: Write>(out: &mut W, rows: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("↑ / SPACE / click : Jump   Q : Quit"))?;
    Ok(())
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

fn draw_game_over<W: Write>(out: &mut W, vp: &Viewport, snap: &Snapshot) -> std::io::Result<()> {
    let new_best = snap.high_score == Some(snap.score) && snap.score > 0;
    let score_line = format!("Final Score: {:>6}", snap.score);
    let best_line = match (new_best, snap.high_score) {
        (true, _) => format!("★ NEW BEST: {:>6} ★", snap.score),
        (false, Some(best)) => format!("Best Score:  {:>6}", best),
        (false, None) => "Best Score:       -".to_string(),
    };
    let prompt = snap
        .texts
        .iter()
        .find(|t| t.kind == EntityKind::TutorialText)
        .map(|t| t.text.as_str())
        .unwrap_or("Press any key to restart the game");

    let lines: [(&str, Color); 3] = [
        ("╔════════════════════╗", Color::Red),
        ("║    GAME  OVER      ║", Color::Red),
        ("╚════════════════════╝", Color::Red),
    ];
    let best_color = if new_best { Color::Yellow } else { Color::DarkGrey };

    let cx = vp.cols / 2;
    let total_rows = lines.len() as u16 + 3;
    let start_row = (vp.rows / 2).saturating_sub(total_rows / 2);

    let mut row = start_row;
    let mut centered = |out: &mut W, msg: &str, color: Color| -> std::io::Result<()> {
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(msg))?;
        row += 1;
        Ok(())
    };

    for (msg, color) in lines {
        centered(out, msg, color)?;
    }
    centered(out, &score_line, C_HUD_SCORE)?;
    centered(out, &best_line, best_color)?;
    centered(out, prompt, Color::White)?;
    Ok(())
}
