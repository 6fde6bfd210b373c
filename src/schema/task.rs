use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::alignment::Alignment;
use crate::core::content::ContentGenerator;
use crate::core::render::RenderFrame;
use crate::core::session::SessionSnapshot;

/// The accumulated alignment score.
///
/// Choice outcome hooks receive `&mut PathScore` and nothing else, so the
/// score is the only piece of session state they can touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PathScore(i32);

impl PathScore {
    pub fn new(value: i32) -> Self {
        Self(value)
    }

    pub fn get(&self) -> i32 {
        self.0
    }

    /// Shift the score by `delta`. Saturates rather than wrapping.
    pub fn add(&mut self, delta: i32) {
        self.0 = self.0.saturating_add(delta);
    }

    /// Move one step toward zero. Zero stays zero.
    pub fn nudge_toward_zero(&mut self) {
        self.0 -= self.0.signum();
    }

    /// True when the magnitude is strictly greater than `threshold`.
    pub fn exceeds(&self, threshold: u32) -> bool {
        self.0.unsigned_abs() > threshold
    }

    pub fn alignment(&self) -> Alignment {
        Alignment::from_score(self.0)
    }
}

/// Cosmetic hook invoked once per task presentation.
pub type RenderHook = Arc<dyn Fn(&mut RenderFrame, &SessionSnapshot, &ContentGenerator) + Send + Sync>;

/// Outcome hook invoked when a choice is selected. Returns the message shown
/// to the user.
pub type OutcomeHook = Arc<dyn Fn(&mut PathScore) -> String + Send + Sync>;

/// One selectable option of a task.
#[derive(Clone)]
pub struct Choice {
    pub kind: Alignment,
    pub text: String,
    on_select: OutcomeHook,
}

impl Choice {
    pub fn new<F>(kind: Alignment, text: impl Into<String>, on_select: F) -> Self
    where
        F: Fn(&mut PathScore) -> String + Send + Sync + 'static,
    {
        Self {
            kind,
            text: text.into(),
            on_select: Arc::new(on_select),
        }
    }

    /// A choice that shifts the score by a fixed delta and reports a fixed
    /// message. This is the shape every RON-authored choice takes.
    pub fn with_delta(
        kind: Alignment,
        text: impl Into<String>,
        delta: i32,
        outcome: impl Into<String>,
    ) -> Self {
        let outcome = outcome.into();
        Self::new(kind, text, move |score: &mut PathScore| {
            score.add(delta);
            outcome.clone()
        })
    }

    /// Run the outcome hook against the score.
    pub fn select(&self, score: &mut PathScore) -> String {
        (self.on_select)(score)
    }
}

impl fmt::Debug for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Choice")
            .field("kind", &self.kind)
            .field("text", &self.text)
            .finish_non_exhaustive()
    }
}

/// An authored narrative unit.
#[derive(Clone)]
pub struct Task {
    /// 1-based, dense across the catalog.
    pub id: u32,
    pub title: String,
    pub description: String,
    pub render: Option<RenderHook>,
    pub choices: Vec<Choice>,
}

impl Task {
    pub fn new(id: u32, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            render: None,
            choices: Vec::new(),
        }
    }

    pub fn with_render<F>(mut self, render: F) -> Self
    where
        F: Fn(&mut RenderFrame, &SessionSnapshot, &ContentGenerator) + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }

    pub fn with_choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("has_render", &self.render.is_some())
            .field("choices", &self.choices)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nudge_toward_zero() {
        let mut positive = PathScore::new(4);
        positive.nudge_toward_zero();
        assert_eq!(positive.get(), 3);

        let mut negative = PathScore::new(-5);
        negative.nudge_toward_zero();
        assert_eq!(negative.get(), -4);

        let mut zero = PathScore::default();
        zero.nudge_toward_zero();
        assert_eq!(zero.get(), 0);
    }

    #[test]
    fn exceeds_is_strict() {
        assert!(!PathScore::new(3).exceeds(3));
        assert!(!PathScore::new(-3).exceeds(3));
        assert!(PathScore::new(4).exceeds(3));
        assert!(PathScore::new(-4).exceeds(3));
        assert!(PathScore::new(i32::MIN).exceeds(3));
    }

    #[test]
    fn add_saturates() {
        let mut score = PathScore::new(i32::MAX - 1);
        score.add(5);
        assert_eq!(score.get(), i32::MAX);
    }

    #[test]
    fn delta_choice_applies_delta_and_returns_message() {
        let choice = Choice::with_delta(Alignment::Power, "Purge", -2, "Purged.");
        let mut score = PathScore::new(1);
        let message = choice.select(&mut score);
        assert_eq!(message, "Purged.");
        assert_eq!(score.get(), -1);
    }

    #[test]
    fn custom_choice_hook() {
        let choice = Choice::new(Alignment::Humanity, "Wait", |score: &mut PathScore| {
            if score.get() > 0 {
                score.add(-1);
            }
            format!("now {}", score.get())
        });
        let mut score = PathScore::new(2);
        assert_eq!(choice.select(&mut score), "now 1");
    }

    #[test]
    fn task_builder() {
        let task = Task::new(1, "Quarantine", "Something replicates.")
            .with_choice(Choice::with_delta(Alignment::Power, "Purge", -1, "Gone."))
            .with_choice(Choice::with_delta(Alignment::Humanity, "Isolate", 1, "Held."));
        assert_eq!(task.choices.len(), 2);
        assert!(task.render.is_none());
        assert!(format!("{:?}", task).contains("Quarantine"));
    }
}
