//! Headless BlockRiser runner (default binary).
//!
//! Plays a seeded run with the hint search and prints the final board.
//! Session settings come from `BLOCKRISER_*` variables, then the flags
//! `--mode --policy --seed --moves --level --save <dir>`.

use std::io::Write;

use anyhow::Result;
use log::{LevelFilter, Log, Metadata, Record};

use block_riser::autoplay::{parse_autoplay_args, render_board, run_autoplay};
use block_riser::core::{GameSession, SessionConfig};
use block_riser::save::{load_profile, resume_or_new, FileStore, MemoryStore, SaveStore};

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let _ = writeln!(
                std::io::stderr(),
                "[BlockRiser] {:<5} {}",
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logger() {
    let level = std::env::var("BLOCKRISER_LOG")
        .ok()
        .and_then(|v| v.trim().parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Warn);
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn main() -> Result<()> {
    init_logger();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = parse_autoplay_args(&args, SessionConfig::from_env())?;

    let mut store: Box<dyn SaveStore> = match &config.save_dir {
        Some(dir) => Box::new(FileStore::open(dir)?),
        None => Box::new(MemoryStore::new()),
    };
    let profile = load_profile(store.as_ref());
    let mut session: GameSession = resume_or_new(store.as_ref(), config.session, profile);

    let report = run_autoplay(&mut session, config.moves, Some(store.as_mut()))?;

    println!("{}", render_board(&session.snapshot()));
    match (report.level_cleared, report.game_over) {
        (Some(true), _) => println!("level cleared in {} moves", report.moves),
        (Some(false), _) => println!("level failed after {} moves", report.moves),
        (None, Some(reason)) => println!("{} ({} moves)", reason.message(), report.moves),
        (None, None) => println!("stopped after {} moves", report.moves),
    }
    Ok(())
}
