use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Score at or beyond which the path tips to one of the extremes.
pub const PATH_THRESHOLD: i32 = 3;

/// The three narrative poles. Used both as the kind of a choice and as the
/// path derived from the accumulated score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// Control. Negative score.
    Power,
    /// Compliance. The neutral band around zero.
    Humanity,
    /// Indulgence. Positive score.
    Bliss,
}

impl Alignment {
    pub const ALL: [Alignment; 3] = [Self::Power, Self::Humanity, Self::Bliss];

    /// Derive the current path from a score.
    ///
    /// `score <= -3` is power, `score >= 3` is bliss, everything between is
    /// humanity.
    pub fn from_score(score: i32) -> Self {
        if score <= -PATH_THRESHOLD {
            Self::Power
        } else if score >= PATH_THRESHOLD {
            Self::Bliss
        } else {
            Self::Humanity
        }
    }

    /// Lowercase identifier, also the RON/JSON spelling.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Humanity => "humanity",
            Self::Bliss => "bliss",
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string names no known alignment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown alignment '{0}' (expected power, humanity or bliss)")]
pub struct UnknownAlignment(pub String);

impl FromStr for Alignment {
    type Err = UnknownAlignment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "power" => Ok(Self::Power),
            "humanity" => Ok(Self::Humanity),
            "bliss" => Ok(Self::Bliss),
            other => Err(UnknownAlignment(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_boundaries() {
        assert_eq!(Alignment::from_score(-3), Alignment::Power);
        assert_eq!(Alignment::from_score(-2), Alignment::Humanity);
        assert_eq!(Alignment::from_score(2), Alignment::Humanity);
        assert_eq!(Alignment::from_score(3), Alignment::Bliss);
    }

    #[test]
    fn path_is_total() {
        for score in -50..=50 {
            let path = Alignment::from_score(score);
            let expected = if score <= -3 {
                Alignment::Power
            } else if score >= 3 {
                Alignment::Bliss
            } else {
                Alignment::Humanity
            };
            assert_eq!(path, expected, "score {}", score);
        }
        assert_eq!(Alignment::from_score(i32::MIN), Alignment::Power);
        assert_eq!(Alignment::from_score(i32::MAX), Alignment::Bliss);
    }

    #[test]
    fn parse_names() {
        for alignment in Alignment::ALL {
            assert_eq!(alignment.name().parse::<Alignment>(), Ok(alignment));
        }
        assert!("chaos".parse::<Alignment>().is_err());
        assert!("Power".parse::<Alignment>().is_err());
    }

    #[test]
    fn display_uses_name() {
        assert_eq!(Alignment::Bliss.to_string(), "bliss");
        assert_eq!(Alignment::Power.to_string(), Alignment::Power.name());
    }

    #[test]
    fn ron_spelling() {
        let parsed: Alignment = ron::from_str("humanity").unwrap();
        assert_eq!(parsed, Alignment::Humanity);
    }
}
