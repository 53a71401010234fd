//! Terminal runner (default binary).
//!
//! Reads configuration, sets up logging and the terminal, then drives the
//! engine at a fixed timestep with crossterm key events as input.

use std::fs::File;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use log::{debug, info};

use blockfall::config::Config;
use blockfall::core::{ClearWatcher, GameSnapshot, GameState};
use blockfall::frame::{compose, Terminal};
use blockfall::input::{handle_key_event, should_quit};
use blockfall::types::TICK_MS;

fn main() -> Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;
    init_logging(&config)?;

    let mut term = Terminal::new();
    term.enter().context("failed to set up terminal")?;

    let result = run(&mut term, &config);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

/// Silent unless `RUST_LOG` is set.
fn init_logging(config: &Config) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off"));
    if let Some(path) = &config.log_path {
        let file = File::create(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn run(term: &mut Terminal, config: &Config) -> Result<()> {
    let game_config = config.game_config();
    info!(
        "seed {} randomizer {} clear delay {}ms",
        game_config.seed,
        game_config.randomizer.as_str(),
        game_config.clear_delay_ms
    );

    let mut game_state = GameState::new(game_config);
    game_state.start();

    let mut snapshot = GameSnapshot::default();
    let mut drawn: Option<GameSnapshot> = None;
    let mut clears = ClearWatcher::new();

    let mut last_tick = Instant::now();
    let tick_duration = Duration::from_millis(TICK_MS as u64);

    loop {
        // Render only when something visible changed.
        game_state.snapshot_into(&mut snapshot);
        if let Some(rows) = clears.observe_snapshot(&snapshot) {
            debug!("{} rows cleared ({} total)", rows, snapshot.lines_cleared);
        }
        if drawn.as_ref() != Some(&snapshot) {
            term.draw(&compose(&snapshot))?;
            drawn = Some(snapshot.clone());
        }

        // Input with timeout until next tick.
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    if should_quit(key) {
                        info!("quit after {} lines", game_state.lines_cleared());
                        return Ok(());
                    }
                    if let Some(action) = handle_key_event(key) {
                        game_state.apply_action(action);
                    }
                }
                Event::Resize(..) => drawn = None,
                _ => {}
            }
        }

        // Tick.
        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();
            game_state.tick(TICK_MS);
        }
    }
}
