/// Session state — the single mutable record of one playthrough.

use serde::{Deserialize, Serialize};

use crate::schema::alignment::Alignment;
use crate::schema::task::PathScore;

/// One playthrough. Owned by the engine and mutated only through its
/// advance protocol; collaborators read it through [`SessionSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub(crate) seed: u64,
    pub(crate) depth: u32,
    pub(crate) history: Vec<u64>,
    pub(crate) path_score: PathScore,
    pub(crate) limbo_count: u32,
    pub(crate) is_transitioning: bool,
}

impl Session {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            depth: 0,
            history: Vec::new(),
            path_score: PathScore::default(),
            limbo_count: 0,
            is_transitioning: false,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Completed tasks. Task `depth + 1` is due next.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Seeds of every completed task, oldest first.
    pub fn history(&self) -> &[u64] {
        &self.history
    }

    pub fn path_score(&self) -> i32 {
        self.path_score.get()
    }

    pub fn limbo_count(&self) -> u32 {
        self.limbo_count
    }

    pub fn is_transitioning(&self) -> bool {
        self.is_transitioning
    }

    /// Recomputed on every call; never cached.
    pub fn current_path(&self) -> Alignment {
        self.path_score.alignment()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            seed: self.seed,
            depth: self.depth,
            path_score: self.path_score.get(),
            limbo_count: self.limbo_count,
            path: self.current_path(),
        }
    }
}

/// Read-only copy of the session handed to render hooks and the
/// presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub seed: u64,
    pub depth: u32,
    pub path_score: i32,
    pub limbo_count: u32,
    pub path: Alignment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_blank() {
        let session = Session::new(1234);
        assert_eq!(session.seed(), 1234);
        assert_eq!(session.depth(), 0);
        assert!(session.history().is_empty());
        assert_eq!(session.path_score(), 0);
        assert_eq!(session.limbo_count(), 0);
        assert!(!session.is_transitioning());
        assert_eq!(session.current_path(), Alignment::Humanity);
    }

    #[test]
    fn path_tracks_score_without_caching() {
        let mut session = Session::new(0);
        session.path_score.add(-3);
        assert_eq!(session.current_path(), Alignment::Power);
        session.path_score.add(6);
        assert_eq!(session.current_path(), Alignment::Bliss);
    }

    #[test]
    fn snapshot_copies_fields() {
        let mut session = Session::new(99);
        session.depth = 4;
        session.limbo_count = 1;
        session.path_score.add(3);
        let snap = session.snapshot();
        assert_eq!(snap.seed, 99);
        assert_eq!(snap.depth, 4);
        assert_eq!(snap.path_score, 3);
        assert_eq!(snap.limbo_count, 1);
        assert_eq!(snap.path, Alignment::Bliss);
    }
}
