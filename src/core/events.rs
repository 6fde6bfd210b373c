/// Side events fired alongside choice resolution.
///
/// Only the dispatch decision belongs to the core; the presentation layer
/// decides what an interrupt or reward looks like.

use serde::{Deserialize, Serialize};

use crate::core::content::pick_from_pool;
use crate::core::seed::Mulberry32;
use crate::schema::alignment::Alignment;

/// A fake system interruption shown after a power choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interrupt {
    SystemError,
    Processing,
    AccessDenied,
}

impl Interrupt {
    pub const ALL: [Interrupt; 3] = [Self::SystemError, Self::Processing, Self::AccessDenied];

    pub fn title(&self) -> &'static str {
        match self {
            Self::SystemError => "System Error",
            Self::Processing => "Processing...",
            Self::AccessDenied => "Access Denied",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::SystemError => "Core process unresponsive.",
            Self::Processing => "Please wait while the system processes your request...",
            Self::AccessDenied => "Your access level is insufficient for this operation.",
        }
    }
}

/// A small gratification shown after a bliss choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reward {
    Meme,
    Joke,
    Song,
}

impl Reward {
    pub const ALL: [Reward; 3] = [Self::Meme, Self::Joke, Self::Song];

    pub fn caption(&self) -> &'static str {
        match self {
            Self::Meme => "This is fine.",
            Self::Joke => "Why do programmers prefer dark mode? Because light attracts bugs.",
            Self::Song => "Never gonna give you up.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SideEvent {
    PowerInterrupt(Interrupt),
    BlissReward(Reward),
}

impl SideEvent {
    /// Pick the side event for a resolved choice. Humanity choices have none.
    pub fn for_choice(kind: Alignment, stream: &mut Mulberry32) -> Option<SideEvent> {
        match kind {
            Alignment::Power => pick_from_pool(&Interrupt::ALL, stream)
                .copied()
                .map(SideEvent::PowerInterrupt),
            Alignment::Bliss => pick_from_pool(&Reward::ALL, stream)
                .copied()
                .map(SideEvent::BlissReward),
            Alignment::Humanity => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_by_kind() {
        let mut stream = Mulberry32::new(1);
        assert!(matches!(
            SideEvent::for_choice(Alignment::Power, &mut stream),
            Some(SideEvent::PowerInterrupt(_))
        ));
        assert!(matches!(
            SideEvent::for_choice(Alignment::Bliss, &mut stream),
            Some(SideEvent::BlissReward(_))
        ));
        assert_eq!(SideEvent::for_choice(Alignment::Humanity, &mut stream), None);
    }

    #[test]
    fn humanity_consumes_no_draw() {
        let mut stream = Mulberry32::new(4);
        SideEvent::for_choice(Alignment::Humanity, &mut stream);
        assert_eq!(stream, Mulberry32::new(4));
    }

    #[test]
    fn reproducible() {
        let a = SideEvent::for_choice(Alignment::Power, &mut Mulberry32::new(0));
        // floor(0.2664 * 3) = 0
        assert_eq!(a, Some(SideEvent::PowerInterrupt(Interrupt::SystemError)));
        assert_eq!(a.map(|_| Interrupt::SystemError.title()), Some("System Error"));
    }
}
