/// Limbo diversions — the non-advancing filler loops a runaway score earns.
///
/// A diversion ends only through real manual effort or its escape
/// affordance. Wrong moves re-present the same diversion; there is no retry
/// cap.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::config::EngineConfig;
use crate::core::content::pick_from_pool;
use crate::core::seed::Mulberry32;

/// Score magnitude above which a resolved choice diverts into limbo.
pub const LIMBO_THRESHOLD: u32 = 3;

/// Squares in the captcha grid.
pub const CAPTCHA_SQUARES: usize = 9;

/// The system log shown by the redaction diversion.
pub const REDACTION_LOG: [&str; 10] = [
    "USER_LOGIN: operator - SUCCESS",
    "FILE_ACCESS: quarterly_review.pdf - DENIED",
    "SYSTEM_UPDATE: patch_v2.1 - APPLIED",
    "NETWORK_CONNECTION: 10.0.0.77 - BLOCKED",
    "PROCESS_START: helper.exe - TERMINATED",
    "DATA_BACKUP: core_archive - COMPLETED",
    "AUTHENTICATION: retinal_scan - FAILED",
    "ALERT: unusual_activity - INVESTIGATING",
    "FILE_MODIFICATION: settings.json - WARNING",
    "CONNECTION_ATTEMPT: port_6667 - REJECTED",
];

/// Total redactable words across the log, the most a player can redact.
pub fn redaction_word_count() -> usize {
    REDACTION_LOG
        .iter()
        .map(|line| line.split_whitespace().count())
        .sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LimboKind {
    /// A verification grid that never verifies.
    Captcha,
    /// A progress bar that only rewards waiting.
    WaitingRoom,
    /// A file that cannot be dragged, only compressed.
    FileTransfer,
    /// A log that must be redacted by hand.
    RedactedLog,
}

impl LimboKind {
    pub const ALL: [LimboKind; 4] = [
        Self::Captcha,
        Self::WaitingRoom,
        Self::FileTransfer,
        Self::RedactedLog,
    ];

    pub fn choose(stream: &mut Mulberry32) -> LimboKind {
        pick_from_pool(&Self::ALL, stream)
            .copied()
            .unwrap_or(Self::Captcha)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Captcha => "INFINITE CAPTCHA LOOP",
            Self::WaitingRoom => "WAITING ROOM",
            Self::FileTransfer => "SISYPHEAN FILE TRANSFER",
            Self::RedactedLog => "REDACTED LOG ANALYSIS",
        }
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Captcha => "Select all squares containing existential dread",
            Self::WaitingRoom => "Your request is being processed...",
            Self::FileTransfer => "Transfer the file to the destination folder",
            Self::RedactedLog => "Redact all sensitive information from the system log",
        }
    }
}

/// Something the player can do inside a diversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimboAction {
    ToggleSquare(usize),
    Verify,
    ClaimHuman,
    ContinueWaiting,
    DropFile,
    Compress,
    ToggleRedaction { entry: usize, word: usize },
    AcceptRecommended,
    Submit,
}

/// Per-kind interaction state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LimboState {
    Captcha { selected: [bool; CAPTCHA_SQUARES] },
    WaitingRoom,
    FileTransfer,
    RedactedLog { redacted: FxHashSet<(usize, usize)> },
}

/// Result of one limbo action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimboResponse {
    /// Accepted; nothing else changes.
    Continue,
    /// Refused with a message; the diversion stays as it is.
    Rejected(String),
    /// Failed; the diversion is presented again from scratch.
    Retry(String),
    /// Cleared. The engine nudges the score and advances.
    Complete,
    /// The action does not apply to this diversion.
    Ignored,
}

/// An active limbo diversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimboDiversion {
    pub kind: LimboKind,
    /// The session's limbo count when this diversion was entered.
    pub loop_number: u32,
    /// Failed attempts so far. Informational only.
    pub attempts: u32,
    pub escape_unlocked: bool,
    pub state: LimboState,
}

impl LimboDiversion {
    pub fn new(kind: LimboKind, loop_number: u32) -> Self {
        let state = match kind {
            LimboKind::Captcha => LimboState::Captcha {
                selected: [false; CAPTCHA_SQUARES],
            },
            LimboKind::WaitingRoom => LimboState::WaitingRoom,
            LimboKind::FileTransfer => LimboState::FileTransfer,
            LimboKind::RedactedLog => LimboState::RedactedLog {
                redacted: FxHashSet::default(),
            },
        };
        Self {
            kind,
            loop_number,
            attempts: 0,
            escape_unlocked: !kind.has_escape_gate(),
            state,
        }
    }

    /// How long until the escape affordance unlocks, if it is gated.
    pub fn escape_delay(&self, config: &EngineConfig) -> Option<Duration> {
        self.kind.escape_gate(config)
    }

    pub fn unlock_escape(&mut self) {
        self.escape_unlocked = true;
    }

    /// Manual redactions made so far.
    pub fn redaction_count(&self) -> usize {
        match &self.state {
            LimboState::RedactedLog { redacted } => redacted.len(),
            _ => 0,
        }
    }

    pub fn act(&mut self, action: LimboAction, config: &EngineConfig) -> LimboResponse {
        match (self.kind, action) {
            (LimboKind::Captcha, LimboAction::ToggleSquare(index)) => {
                match self.captcha_squares_mut().and_then(|squares| squares.get_mut(index)) {
                    Some(square) => {
                        *square = !*square;
                        LimboResponse::Continue
                    }
                    None => LimboResponse::Ignored,
                }
            }
            (LimboKind::Captcha, LimboAction::Verify) => {
                let Some(squares) = self.captcha_squares_mut() else {
                    return LimboResponse::Ignored;
                };
                if !squares.iter().any(|s| *s) {
                    return LimboResponse::Rejected("Please select at least one square.".to_string());
                }
                *squares = [false; CAPTCHA_SQUARES];
                self.attempts += 1;
                self.escape_unlocked = false;
                LimboResponse::Retry("Verification failed. Please try again.".to_string())
            }
            (LimboKind::Captcha, LimboAction::ClaimHuman) => {
                if self.escape_unlocked {
                    LimboResponse::Complete
                } else {
                    LimboResponse::Ignored
                }
            }

            (LimboKind::WaitingRoom, LimboAction::ContinueWaiting) => {
                if self.escape_unlocked {
                    LimboResponse::Complete
                } else {
                    LimboResponse::Rejected(
                        "Please wait while the system processes your request...".to_string(),
                    )
                }
            }

            (LimboKind::FileTransfer, LimboAction::DropFile) => {
                self.attempts += 1;
                LimboResponse::Retry(
                    "Transfer failed! File corrupted during transfer. Please try again."
                        .to_string(),
                )
            }
            (LimboKind::FileTransfer, LimboAction::Compress) => LimboResponse::Complete,

            (LimboKind::RedactedLog, LimboAction::ToggleRedaction { entry, word }) => {
                let in_range = REDACTION_LOG
                    .get(entry)
                    .map_or(false, |line| word < line.split_whitespace().count());
                let Some(redacted) = self.redactions_mut().filter(|_| in_range) else {
                    return LimboResponse::Ignored;
                };
                if !redacted.remove(&(entry, word)) {
                    redacted.insert((entry, word));
                }
                LimboResponse::Continue
            }
            (LimboKind::RedactedLog, LimboAction::AcceptRecommended) => LimboResponse::Rejected(
                "Recommended redactions applied, but critical information may have been missed."
                    .to_string(),
            ),
            (LimboKind::RedactedLog, LimboAction::Submit) => {
                if self.redaction_count() >= config.redaction_minimum as usize {
                    LimboResponse::Complete
                } else {
                    LimboResponse::Rejected(
                        "Insufficient manual redactions. Please review each entry carefully."
                            .to_string(),
                    )
                }
            }

            _ => LimboResponse::Ignored,
        }
    }

    fn captcha_squares_mut(&mut self) -> Option<&mut [bool; CAPTCHA_SQUARES]> {
        match &mut self.state {
            LimboState::Captcha { selected } => Some(selected),
            _ => None,
        }
    }

    fn redactions_mut(&mut self) -> Option<&mut FxHashSet<(usize, usize)>> {
        match &mut self.state {
            LimboState::RedactedLog { redacted } => Some(redacted),
            _ => None,
        }
    }
}

impl LimboKind {
    fn has_escape_gate(&self) -> bool {
        matches!(self, Self::Captcha | Self::WaitingRoom)
    }

    fn escape_gate(&self, config: &EngineConfig) -> Option<Duration> {
        match self {
            Self::Captcha => Some(config.captcha_escape_delay()),
            Self::WaitingRoom => Some(config.waiting_room_delay()),
            Self::FileTransfer | Self::RedactedLog => None,
        }
    }
}
