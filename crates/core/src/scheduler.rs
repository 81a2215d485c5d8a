//! Scheduler - simulated clock and delayed session steps
//!
//! The session never sleeps. Delayed work (committing a clear, a zen wipe,
//! the end of a market event) is queued here against a millisecond clock that
//! only moves when the host calls `GameSession::tick`, so tests advance time
//! deterministically.

use crate::clear::ClearLines;
use crate::types::MarketEvent;

/// Work the session runs once its deadline passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    CommitClear,
    ZenRefresh,
    MarketEnd(MarketEvent),
}

/// Line-clear phase of the board
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    /// Accepting input
    #[default]
    Idle,
    /// Full lines detected; the board is locked until `CommitClear` runs
    Resolving(ClearLines),
}

impl Phase {
    pub fn is_resolving(&self) -> bool {
        matches!(self, Phase::Resolving(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    due_ms: u64,
    seq: u64,
    step: Step,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scheduler {
    now_ms: u64,
    next_seq: u64,
    pending: Vec<Pending>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Queue `step` to run `delay_ms` from now
    pub fn schedule(&mut self, delay_ms: u32, step: Step) {
        let pending = Pending {
            due_ms: self.now_ms + delay_ms as u64,
            seq: self.next_seq,
            step,
        };
        self.next_seq += 1;
        log::debug!("schedule {:?} at {}ms", step, pending.due_ms);
        self.pending.push(pending);
    }

    /// Move the clock forward
    pub fn advance(&mut self, elapsed_ms: u32) {
        self.now_ms += elapsed_ms as u64;
    }

    /// Earliest step whose deadline has passed; ties run in scheduling order
    pub fn pop_due(&mut self) -> Option<Step> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_ms <= self.now_ms)
            .min_by_key(|(_, p)| (p.due_ms, p.seq))
            .map(|(idx, _)| idx)?;
        Some(self.pending.remove(idx).step)
    }

    /// Milliseconds until `step` fires, if it is queued
    pub fn remaining_ms(&self, step: Step) -> Option<u64> {
        self.pending
            .iter()
            .filter(|p| p.step == step)
            .map(|p| p.due_ms.saturating_sub(self.now_ms))
            .min()
    }

    pub fn is_pending(&self, step: Step) -> bool {
        self.pending.iter().any(|p| p.step == step)
    }

    pub fn cancel(&mut self, step: Step) {
        self.pending.retain(|p| p.step != step);
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop every pending step (new game)
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_waits_for_deadline() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(250, Step::CommitClear);
        scheduler.advance(249);
        assert_eq!(scheduler.pop_due(), None);
        assert_eq!(scheduler.remaining_ms(Step::CommitClear), Some(1));
        scheduler.advance(1);
        assert_eq!(scheduler.pop_due(), Some(Step::CommitClear));
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_due_steps_run_in_deadline_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(1000, Step::ZenRefresh);
        scheduler.schedule(250, Step::CommitClear);
        scheduler.schedule(250, Step::MarketEnd(MarketEvent::BullMarket));
        scheduler.advance(5000);
        assert_eq!(scheduler.pop_due(), Some(Step::CommitClear));
        assert_eq!(
            scheduler.pop_due(),
            Some(Step::MarketEnd(MarketEvent::BullMarket))
        );
        assert_eq!(scheduler.pop_due(), Some(Step::ZenRefresh));
        assert_eq!(scheduler.pop_due(), None);
    }

    #[test]
    fn test_cancel_removes_step() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(10, Step::ZenRefresh);
        assert!(scheduler.is_pending(Step::ZenRefresh));
        scheduler.cancel(Step::ZenRefresh);
        scheduler.advance(10);
        assert_eq!(scheduler.pop_due(), None);
    }
}
