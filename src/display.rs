/// Rendering layer: all terminal I/O lives here.
///
/// `TerminalSurface` translates a `RenderModel` into crossterm commands.
/// No game logic is performed; this module only turns state into cells.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Attribute, Color, Print},
    terminal,
    QueueableCommand,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use alien_invaders::entities::{Alien, AlienKind, Bolt, BoltOwner, Field, Missile};
use alien_invaders::render::{Anchor, Backdrop, Label, Surface, TextStyle};
use alien_invaders::wave::WaveView;

// ── Colour palette ───────────────────────────────────────────────────────────

const C_STAR: Color = Color::DarkGrey;
const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LIVES: Color = Color::Red;
const C_HUD_MISSILES: Color = Color::Magenta;
const C_SHIP: Color = Color::White;
const C_SQUID: Color = Color::Magenta;
const C_CRAB: Color = Color::Cyan;
const C_OCTOPUS: Color = Color::Green;
const C_EXPLOSION: Color = Color::Yellow;
const C_BOLT_SHIP: Color = Color::Cyan;
const C_BOLT_ALIEN: Color = Color::Red;
const C_MISSILE: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;

/// One star per this many cells.
const STAR_DENSITY: u32 = 45;

pub struct TerminalSurface<W: Write> {
    out: W,
    field: Field,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W, field: Field) -> Self {
        TerminalSurface { out, field }
    }

    fn put(&mut self, x: i32, y: i32, color: Color, text: &str) -> std::io::Result<()> {
        if x < 0 || y < 0 || x >= self.field.width as i32 || y >= self.field.height as i32 {
            return Ok(());
        }
        self.out.queue(cursor::MoveTo(x as u16, y as u16))?;
        self.out.queue(style::SetForegroundColor(color))?;
        self.out.queue(Print(text))?;
        Ok(())
    }

    // ── Border ───────────────────────────────────────────────────────────────

    fn draw_border(&mut self) -> std::io::Result<()> {
        let w = self.field.width as usize;
        let h = self.field.height;

        self.out.queue(style::SetForegroundColor(C_BORDER))?;

        // Row 1: top bar
        self.out.queue(cursor::MoveTo(0, 1))?;
        self.out
            .queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

        // Row h-2: bottom bar
        self.out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
        self.out
            .queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

        // Side walls
        for row in 2..h.saturating_sub(2) {
            self.out.queue(cursor::MoveTo(0, row))?;
            self.out.queue(Print("│"))?;
            self.out
                .queue(cursor::MoveTo(self.field.width.saturating_sub(1), row))?;
            self.out.queue(Print("│"))?;
        }
        Ok(())
    }

    // ── Entities ─────────────────────────────────────────────────────────────

    fn draw_alien(&mut self, alien: &Alien, anim_frame: bool) -> std::io::Result<()> {
        if alien.dying.is_some() {
            return self.put(alien.x - 1, alien.y, C_EXPLOSION, "\\*/");
        }
        // Two poses per kind, swapped on every formation step.
        let (color, sprite) = match (alien.kind, anim_frame) {
            (AlienKind::Squid, false) => (C_SQUID, "/o\\"),
            (AlienKind::Squid, true) => (C_SQUID, "\\o/"),
            (AlienKind::Crab, false) => (C_CRAB, "{@}"),
            (AlienKind::Crab, true) => (C_CRAB, "}@{"),
            (AlienKind::Octopus, false) => (C_OCTOPUS, "«▼»"),
            (AlienKind::Octopus, true) => (C_OCTOPUS, "»▼«"),
        };
        self.put(alien.x - 1, alien.y, color, sprite)
    }

    fn draw_bolt(&mut self, bolt: &Bolt) -> std::io::Result<()> {
        let y = bolt.y.round() as i32;
        match bolt.owner {
            BoltOwner::Ship => self.put(bolt.x, y, C_BOLT_SHIP, "║"),
            BoltOwner::Alien => self.put(bolt.x, y, C_BOLT_ALIEN, "↓"),
        }
    }

    fn draw_missile(&mut self, missile: &Missile) -> std::io::Result<()> {
        self.put(missile.x, missile.y.round() as i32, C_MISSILE, "⇑")
    }

    // ── HUD (row 0, right side) ──────────────────────────────────────────────

    fn draw_wave_hud(&mut self, wave: &WaveView) -> std::io::Result<()> {
        let score = format!("Score:{:>6}  ", wave.score);
        let missiles = format!("Missiles:{}  ", "⇑".repeat(wave.missiles_left as usize));
        let lives = format!("Lives:{}", "♥".repeat(wave.lives as usize));
        let len = (score.chars().count() + missiles.chars().count() + lives.chars().count()) as i32;

        let mut x = self.field.width as i32 - len - 1;
        for (text, color) in [(score, C_HUD_SCORE), (missiles, C_HUD_MISSILES), (lives, C_HUD_LIVES)] {
            self.put(x, 0, color, &text)?;
            x += text.chars().count() as i32;
        }
        Ok(())
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    type Error = std::io::Error;

    fn draw_backdrop(&mut self, backdrop: &Backdrop) -> std::io::Result<()> {
        self.out.queue(terminal::Clear(terminal::ClearType::All))?;
        match backdrop {
            Backdrop::Starfield { seed } => {
                let mut rng = StdRng::seed_from_u64(*seed);
                let cells = self.field.width as u32 * self.field.height as u32;
                for _ in 0..cells / STAR_DENSITY {
                    let x = rng.gen_range(1..self.field.width.saturating_sub(1).max(2));
                    let y = rng.gen_range(2..self.field.height.saturating_sub(2).max(3));
                    let star = if rng.gen_bool(0.2) { "+" } else { "." };
                    self.put(x as i32, y as i32, C_STAR, star)?;
                }
            }
        }
        self.draw_border()
    }

    fn draw_label(&mut self, label: &Label) -> std::io::Result<()> {
        let width = label.text.chars().count() as i32;
        let (x, y) = match label.anchor {
            Anchor::Center { dy } => (
                (self.field.width as i32 - width) / 2,
                self.field.height as i32 / 2 + dy as i32,
            ),
            Anchor::TopLeft { x, y } => (x as i32, y as i32),
        };
        let bold = matches!(label.style, TextStyle::Title | TextStyle::Banner);
        if bold {
            self.out.queue(style::SetAttribute(Attribute::Bold))?;
        }
        self.put(x, y, label.color, &label.text)?;
        if bold {
            self.out.queue(style::SetAttribute(Attribute::NormalIntensity))?;
        }
        Ok(())
    }

    fn draw_wave(&mut self, wave: &WaveView) -> std::io::Result<()> {
        for alien in &wave.aliens {
            self.draw_alien(alien, wave.anim_frame)?;
        }
        for bolt in &wave.bolts {
            self.draw_bolt(bolt)?;
        }
        for missile in &wave.missiles {
            self.draw_missile(missile)?;
        }
        // Ship sprite (2 rows, 3 cols):
        //   ▲       ← row y      (tip)
        //  /█\      ← row y+1    (fuselage + wings)
        if let Some(ship) = &wave.ship {
            let x = ship.x.round() as i32;
            self.put(x, ship.y, C_SHIP, "▲")?;
            self.put(x - 1, ship.y + 1, C_SHIP, "/█\\")?;
        }
        self.draw_wave_hud(wave)
    }

    fn present(&mut self) -> std::io::Result<()> {
        // Controls hint (last row)
        let hint_row = self.field.height as i32 - 1;
        self.put(1, hint_row, C_HINT, "←→ Move  SPACE Shoot  ↑ Missile  M Mute  Q Quit")?;

        // Park cursor in a harmless spot and flush
        self.out.queue(style::ResetColor)?;
        self.out
            .queue(cursor::MoveTo(0, self.field.height.saturating_sub(1)))?;
        self.out.flush()
    }
}
