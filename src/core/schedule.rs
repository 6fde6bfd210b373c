/// Logical-time queue for cosmetic timers.
///
/// Every entry is stamped with the generation that was current when it was
/// scheduled. Starting a new generation drops everything pending, and an
/// entry from an older generation never fires.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What a timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cue {
    /// The task reveal finished; the presentation latch may clear.
    RevealComplete,
    /// The escape affordance of the active limbo diversion becomes usable.
    LimboEscapeUnlocked,
}

#[derive(Debug, Clone)]
struct Scheduled {
    due: Duration,
    generation: u64,
    cue: Cue,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now: Duration,
    generation: u64,
    pending: Vec<Scheduled>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Cancel everything pending and start a new generation.
    pub fn next_generation(&mut self) -> u64 {
        self.pending.clear();
        self.generation += 1;
        self.generation
    }

    pub fn schedule(&mut self, after: Duration, cue: Cue) {
        self.pending.push(Scheduled {
            due: self.now + after,
            generation: self.generation,
            cue,
        });
    }

    /// Move logical time forward and return the cues that came due, oldest
    /// first.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<Cue> {
        self.now += elapsed;
        let now = self.now;
        let generation = self.generation;

        let mut due: Vec<Scheduled> = Vec::new();
        self.pending.retain(|entry| {
            if entry.due <= now {
                due.push(entry.clone());
                false
            } else {
                true
            }
        });
        due.sort_by_key(|entry| entry.due);

        due.into_iter()
            .filter(|entry| entry.generation == generation)
            .map(|entry| entry.cue)
            .collect()
    }
}
