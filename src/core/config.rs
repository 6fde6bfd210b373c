/// Engine configuration — cosmetic timings and limbo effort minimums.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::core::engine::EngineError;
use crate::core::limbo::redaction_word_count;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// When set, the reveal latch clears by itself this long after a task is
    /// presented. When unset the presentation layer must report
    /// `reveal_finished`.
    #[serde(default)]
    pub reveal_ms: Option<u64>,
    /// Delay before the captcha's "I am human" escape appears.
    #[serde(default = "default_captcha_escape_ms")]
    pub captcha_escape_ms: u64,
    /// Delay before the waiting room lets the player continue.
    #[serde(default = "default_waiting_room_ms")]
    pub waiting_room_ms: u64,
    /// Manual redactions needed to clear the redacted log.
    #[serde(default = "default_redaction_minimum")]
    pub redaction_minimum: u32,
}

fn default_captcha_escape_ms() -> u64 {
    3_000
}

fn default_waiting_room_ms() -> u64 {
    8_000
}

fn default_redaction_minimum() -> u32 {
    5
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reveal_ms: None,
            captcha_escape_ms: default_captcha_escape_ms(),
            waiting_room_ms: default_waiting_room_ms(),
            redaction_minimum: default_redaction_minimum(),
        }
    }
}

impl EngineConfig {
    pub fn load_from_ron(path: &Path) -> Result<EngineConfig, EngineError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<EngineConfig, EngineError> {
        let config: EngineConfig = ron::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings no player could satisfy.
    pub fn validate(&self) -> Result<(), EngineError> {
        let available = redaction_word_count();
        if self.redaction_minimum as usize > available {
            return Err(EngineError::InvalidConfig(format!(
                "redaction_minimum {} exceeds the {} words in the log",
                self.redaction_minimum, available
            )));
        }
        Ok(())
    }

    pub fn reveal_delay(&self) -> Option<Duration> {
        self.reveal_ms.map(Duration::from_millis)
    }

    pub fn captcha_escape_delay(&self) -> Duration {
        Duration::from_millis(self.captcha_escape_ms)
    }

    pub fn waiting_room_delay(&self) -> Duration {
        Duration::from_millis(self.waiting_room_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.reveal_delay(), None);
        assert_eq!(config.captcha_escape_delay(), Duration::from_secs(3));
        assert_eq!(config.waiting_room_delay(), Duration::from_secs(8));
        assert_eq!(config.redaction_minimum, 5);
    }

    #[test]
    fn partial_ron_fills_defaults() {
        let config = EngineConfig::parse_ron("(reveal_ms: Some(0), redaction_minimum: 2)").unwrap();
        assert_eq!(config.reveal_delay(), Some(Duration::ZERO));
        assert_eq!(config.redaction_minimum, 2);
        assert_eq!(config.waiting_room_ms, 8_000);
    }

    #[test]
    fn empty_ron_is_default() {
        assert_eq!(EngineConfig::parse_ron("()").unwrap(), EngineConfig::default());
    }

    #[test]
    fn redaction_minimum_bounded_by_log() {
        let most = redaction_word_count();
        let at_limit = format!("(redaction_minimum: {})", most);
        assert!(EngineConfig::parse_ron(&at_limit).is_ok());

        let over = format!("(redaction_minimum: {})", most + 1);
        assert!(matches!(
            EngineConfig::parse_ron(&over),
            Err(EngineError::InvalidConfig(_))
        ));
    }
}
