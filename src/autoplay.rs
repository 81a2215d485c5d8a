//! Headless autoplay: the hint search plays a seeded run to the end

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{anyhow, Result};

use crate::core::{GameSession, GameSnapshot, SessionConfig};
use crate::engine::apply_hint;
use crate::save::{save_profile, save_session, SaveStore};
use crate::types::{GameEvent, GameMode, GameOverReason, Policy};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoplayConfig {
    pub session: SessionConfig,
    /// Placement budget; the run may end sooner
    pub moves: u32,
    /// Directory for a file-backed save; `None` plays without persistence
    pub save_dir: Option<PathBuf>,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            moves: 200,
            save_dir: None,
        }
    }
}

/// Parse `--mode --policy --seed --moves --level --save` on top of `base`
pub fn parse_autoplay_args(args: &[String], base: SessionConfig) -> Result<AutoplayConfig> {
    let mut config = AutoplayConfig {
        session: base,
        ..AutoplayConfig::default()
    };
    let mut i = 0usize;
    while i < args.len() {
        let flag = args[i].as_str();
        i += 1;
        let v = args
            .get(i)
            .ok_or_else(|| anyhow!("autoplay: missing value for {}", flag))?;
        match flag {
            "--mode" => {
                config.session.mode =
                    GameMode::from_str(v).ok_or_else(|| anyhow!("autoplay: unknown mode: {}", v))?;
            }
            "--policy" => {
                config.session.policy =
                    Policy::from_str(v).ok_or_else(|| anyhow!("autoplay: unknown policy: {}", v))?;
            }
            "--seed" => {
                config.session.seed = v
                    .parse::<u32>()
                    .map_err(|_| anyhow!("autoplay: invalid --seed value: {}", v))?;
            }
            "--moves" => {
                config.moves = v
                    .parse::<u32>()
                    .map_err(|_| anyhow!("autoplay: invalid --moves value: {}", v))?;
            }
            "--level" => {
                config.session.adventure_level = v
                    .parse::<u32>()
                    .map_err(|_| anyhow!("autoplay: invalid --level value: {}", v))?;
            }
            "--save" => config.save_dir = Some(PathBuf::from(v)),
            other => return Err(anyhow!("autoplay: unknown argument: {}", other)),
        }
        i += 1;
    }
    Ok(config)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AutoplayReport {
    pub moves: u32,
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    pub game_over: Option<GameOverReason>,
    pub level_cleared: Option<bool>,
}

/// Play up to `moves` hinted placements, resolving every clear before the next one
///
/// `store` (if any) receives the run and profile after every settled action.
pub fn run_autoplay(
    session: &mut GameSession,
    moves: u32,
    mut store: Option<&mut dyn SaveStore>,
) -> Result<AutoplayReport> {
    let mut report = AutoplayReport::default();

    while report.moves < moves && !session.is_finished() {
        match apply_hint(session)? {
            Some(_) => report.moves += 1,
            None => break,
        }
        session.settle_pending();

        for event in session.drain_events() {
            match event {
                GameEvent::LevelCleared { .. } => report.level_cleared = Some(true),
                GameEvent::LevelFailed { .. } => report.level_cleared = Some(false),
                GameEvent::Settled => {
                    if let Some(store) = store.as_deref_mut() {
                        save_session(store, session)?;
                        save_profile(store, session.profile())?;
                    }
                }
                _ => {}
            }
        }
    }

    report.score = session.score();
    report.lines = session.lines();
    report.level = session.level();
    report.game_over = session.game_over();
    Ok(report)
}

/// Board as text, `#` for filled cells and `.` for empty ones, plus a HUD line
pub fn render_board(snap: &GameSnapshot) -> String {
    let mut out = String::new();
    for row in snap.board.iter() {
        for slot in row.iter() {
            out.push(if slot.is_some() { '#' } else { '.' });
        }
        out.push('\n');
    }
    let _ = write!(
        out,
        "score {} | level {} | lines {} | streak {} | {}",
        snap.score,
        snap.level,
        snap.lines,
        snap.streak,
        snap.league.as_str()
    );
    if let Some(goal) = &snap.goal {
        let _ = write!(out, " | goal {}/{} ({} moves)", goal.progress, goal.target, goal.moves_left);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_flags() {
        let config = parse_autoplay_args(
            &args(&["--mode", "bomb", "--seed", "42", "--moves", "10"]),
            SessionConfig::default(),
        )
        .unwrap();
        assert_eq!(config.session.mode, GameMode::Bomb);
        assert_eq!(config.session.seed, 42);
        assert_eq!(config.moves, 10);
        assert_eq!(config.save_dir, None);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        let base = SessionConfig::default();
        assert!(parse_autoplay_args(&args(&["--mode", "arcade"]), base).is_err());
        assert!(parse_autoplay_args(&args(&["--seed"]), base).is_err());
        assert!(parse_autoplay_args(&args(&["--speedy", "1"]), base).is_err());
    }

    #[test]
    fn test_render_board_marks_cells() {
        let mut session = GameSession::new(SessionConfig::default(), Default::default());
        let text = render_board(&session.snapshot());
        assert!(text.starts_with("........\n"));

        crate::engine::apply_hint(&mut session).unwrap();
        session.settle_pending();
        assert!(render_board(&session.snapshot()).contains('#'));
    }
}
