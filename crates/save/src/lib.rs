//! Persistence for runs and profiles
//!
//! Everything is stored as JSON strings under fixed keys in a [`SaveStore`]:
//!
//! - `blockriser-state`: the resumable run ([`SessionBlob`])
//! - `blockriser-global-stats`: lifetime stats, wallet, inventory, upgrades
//! - `blockriser-leaderboard`: top five scores
//! - `blockriser-highscore[-<mode>]`: best score per mode (no suffix for classic)
//!
//! Loading never fails outward: a corrupted run is treated as no save and a
//! corrupted profile key falls back to its default, with a warning logged.

pub mod blob;
pub mod error;
pub mod store;

use rand::Rng;
use serde::de::DeserializeOwned;

use block_riser_core::{GameSession, Profile, RngPosition, SessionConfig, SessionState};

pub use block_riser_core as core;
pub use block_riser_types as types;

pub use blob::{GlobalStatsBlob, LeaderboardEntryBlob, SessionBlob};
pub use error::SaveError;
pub use store::{FileStore, MemoryStore, SaveStore};

use crate::types::GameMode;

pub const STATE_KEY: &str = "blockriser-state";
pub const GLOBAL_STATS_KEY: &str = "blockriser-global-stats";
pub const LEADERBOARD_KEY: &str = "blockriser-leaderboard";
pub const HIGH_SCORE_KEY: &str = "blockriser-highscore";

/// Per-mode high score key; classic keeps the bare base key
pub fn high_score_key(mode: GameMode) -> String {
    match mode {
        GameMode::Classic => HIGH_SCORE_KEY.to_string(),
        other => format!("{}-{}", HIGH_SCORE_KEY, other.as_str()),
    }
}

/// Persist the settled run, or drop the stored one when the run can't be resumed
pub fn save_session<R: Rng + RngPosition>(store: &mut dyn SaveStore, session: &GameSession<R>) -> anyhow::Result<()> {
    if !session.is_saveable() {
        log::debug!("run not resumable, clearing {}", STATE_KEY);
        return store.remove(STATE_KEY);
    }
    let blob = SessionBlob::capture(session.config(), &session.state());
    store.set(STATE_KEY, &serde_json::to_string(&blob)?)
}

fn decode_session(json: &str) -> Result<(SessionConfig, SessionState), SaveError> {
    let blob: SessionBlob = serde_json::from_str(json)?;
    blob.restore()
}

/// Stored run, or `None` when there is none or it can't be decoded
pub fn load_session(store: &dyn SaveStore) -> Option<(SessionConfig, SessionState)> {
    let json = match store.get(STATE_KEY) {
        Ok(Some(json)) => json,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("reading saved run failed: {}", e);
            return None;
        }
    };
    match decode_session(&json) {
        Ok(saved) => Some(saved),
        Err(e) => {
            log::warn!("ignoring corrupted saved run: {}", e);
            None
        }
    }
}

/// Resume the stored run if there is one, otherwise start fresh with `config`
pub fn resume_or_new(store: &dyn SaveStore, config: SessionConfig, profile: Profile) -> GameSession {
    match load_session(store) {
        Some((saved, state)) => GameSession::resume(saved, profile, state),
        None => GameSession::new(config, profile),
    }
}

pub fn save_profile(store: &mut dyn SaveStore, profile: &Profile) -> anyhow::Result<()> {
    let stats = GlobalStatsBlob::capture(profile);
    store.set(GLOBAL_STATS_KEY, &serde_json::to_string(&stats)?)?;
    let board = blob::leaderboard_blob(&profile.leaderboard);
    store.set(LEADERBOARD_KEY, &serde_json::to_string(&board)?)?;
    for mode in GameMode::ALL {
        let score = profile.high_score(mode);
        if score > 0 {
            store.set(&high_score_key(mode), &score.to_string())?;
        }
    }
    Ok(())
}

fn load_key<T: DeserializeOwned>(store: &dyn SaveStore, key: &str) -> Option<T> {
    let json = match store.get(key) {
        Ok(json) => json?,
        Err(e) => {
            log::warn!("reading {} failed: {}", key, e);
            return None;
        }
    };
    match serde_json::from_str(&json) {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("ignoring corrupted {}: {}", key, e);
            None
        }
    }
}

/// Rebuild the profile key by key; missing or corrupted keys keep their defaults
pub fn load_profile(store: &dyn SaveStore) -> Profile {
    let mut profile = Profile::new();
    if let Some(stats) = load_key::<GlobalStatsBlob>(store, GLOBAL_STATS_KEY) {
        stats.apply(&mut profile);
    }
    if let Some(entries) = load_key::<Vec<LeaderboardEntryBlob>>(store, LEADERBOARD_KEY) {
        profile.leaderboard = blob::leaderboard_from_blob(&entries);
    }
    for mode in GameMode::ALL {
        if let Some(score) = load_key::<u32>(store, &high_score_key(mode)) {
            profile.record_score(mode, score);
        }
    }
    profile
}
