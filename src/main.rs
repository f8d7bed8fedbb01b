mod display;

use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use alien_invaders::audio::TerminalBell;
use alien_invaders::compute::{MIN_HEIGHT, MIN_WIDTH};
use alien_invaders::config::{GameConfig, DEFAULT_FPS};
use alien_invaders::entities::Field;
use alien_invaders::error::GameError;
use alien_invaders::input::Keyboard;
use alien_invaders::render;
use alien_invaders::session::{Controller, GameSession};
use alien_invaders::wave::Wave;

use display::TerminalSurface;

/// Longest frame time fed to the simulation, in seconds.
const MAX_DT: f64 = 0.25;

#[derive(Parser)]
#[command(name = "alien_invaders")]
#[command(about = "Fend off descending waves of aliens in your terminal")]
struct Args {
    /// Frames per second
    #[arg(long, default_value_t = DEFAULT_FPS)]
    fps: u32,

    /// Start with music and sound effects muted
    #[arg(long)]
    muted: bool,

    /// Write logs to this file (the terminal itself is busy drawing)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Fixed RNG seed for reproducible waves
    #[arg(long)]
    seed: Option<u64>,
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::filter::EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

// ── Entry point ──────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let config = GameConfig {
        fps: args.fps,
        start_muted: args.muted,
        seed: args.seed,
        ..GameConfig::default()
    };
    config.validate()?;

    let (width, height) = terminal::size()?;
    if width < MIN_WIDTH || height < MIN_HEIGHT {
        return Err(GameError::TerminalTooSmall {
            width,
            height,
            min_width: MIN_WIDTH,
            min_height: MIN_HEIGHT,
        }
        .into());
    }
    let field = Field { width, height };

    let mut out = BufWriter::new(stdout());
    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Ghostty / kitty-protocol terminals support this; others fall back to
    // a longer hold so a held key survives the OS repeat delay.
    let keyboard_enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false)
        && out
            .execute(PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
            ))
            .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the frame loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    tracing::info!(width, height, fps = config.fps, keyboard_enhanced, "starting");
    let result = run(&mut out, &rx, config, field, keyboard_enhanced);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    if let Err(e) = &result {
        tracing::error!("game loop failed: {e}");
    }
    Ok(result?)
}

fn is_quit(event: &KeyEvent) -> bool {
    event.kind == KeyEventKind::Press
        && match event.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
            KeyCode::Char('c') => event.modifiers.contains(KeyModifiers::CONTROL),
            _ => false,
        }
}

// ── Frame loop ───────────────────────────────────────────────────────────────

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    config: GameConfig,
    field: Field,
    keyboard_enhanced: bool,
) -> Result<(), GameError> {
    let mut master = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let frame = config.frame_duration();
    let mut session = GameSession::new(config, move || {
        Wave::new(field, StdRng::seed_from_u64(master.gen()))
    });

    let mut surface = TerminalSurface::new(out, field);
    let mut bell = TerminalBell::new(stdout());
    let mut keyboard = if keyboard_enhanced {
        Keyboard::new()
    } else {
        Keyboard::without_release_events(frame)
    };
    let mut last = Instant::now();

    loop {
        let frame_start = Instant::now();
        keyboard.begin_frame();

        // ── Drain all pending input events (non-blocking) ────────────────────
        while let Ok(ev) = rx.try_recv() {
            if let Event::Key(key) = ev {
                if is_quit(&key) {
                    tracing::info!(wave = session.wave_count(), "quit requested");
                    return Ok(());
                }
                keyboard.handle(&key);
            }
        }

        // Clamp so a stall (suspended terminal, debugger) doesn't teleport bolts.
        let dt = frame_start.duration_since(last).as_secs_f64().min(MAX_DT);
        last = frame_start;

        let model = session.tick(dt, &keyboard.snapshot());
        session.render(&model, &mut surface)?;
        render::play(&model, &mut bell);
        bell.end_frame()?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame {
            thread::sleep(frame - elapsed);
        }
    }
}
