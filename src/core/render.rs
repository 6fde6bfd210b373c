/// Render frames and data-driven render recipes.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::content::{ContentGenerator, FlavorKind};
use crate::core::decor::Decoration;
use crate::core::seed::Mulberry32;
use crate::core::session::SessionSnapshot;
use crate::schema::task::RenderHook;

/// State of one cell in a memory-grid fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    Corrupted,
    Fragment,
    Empty,
}

/// A piece of cosmetic content produced by a render hook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Fragment {
    Line(String),
    Decoration(Decoration),
    Gauges(Vec<f64>),
    Grid(Vec<CellKind>),
}

/// The presentation target a render hook writes into. The presentation
/// layer turns the fragments into visuals; the core never reads them back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub fragments: Vec<Fragment>,
}

impl RenderFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        self.fragments.push(Fragment::Line(line.into()));
    }

    pub fn push(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.fragments.iter().filter_map(|f| match f {
            Fragment::Line(line) => Some(line.as_str()),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// One step of an authored render recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderDirective {
    /// Fixed authored text.
    Line(String),
    /// A line drawn from a flavor pool.
    Flavor(FlavorKind),
    /// A decorative element.
    Decoration,
    /// `count` bar heights, each `min + draw * span`.
    Gauges { count: u32, min: f64, span: f64 },
    /// A memory grid of `cells` cells.
    Grid { cells: u32 },
    /// The current score and path, read from the snapshot.
    ScoreReadout,
}

impl RenderDirective {
    fn apply(
        &self,
        frame: &mut RenderFrame,
        snapshot: &SessionSnapshot,
        content: &ContentGenerator,
        stream: &mut Mulberry32,
    ) {
        match self {
            Self::Line(text) => frame.push_line(text.clone()),
            Self::Flavor(kind) => frame.push_line(content.flavor(*kind, stream)),
            Self::Decoration => frame.push(Fragment::Decoration(content.decoration(stream))),
            Self::Gauges { count, min, span } => {
                let values = (0..*count).map(|_| min + stream.next_f64() * span).collect();
                frame.push(Fragment::Gauges(values));
            }
            Self::Grid { cells } => {
                let cells = (0..*cells).map(|_| grid_cell(stream)).collect();
                frame.push(Fragment::Grid(cells));
            }
            Self::ScoreReadout => frame.push_line(format!(
                "ALIGNMENT {:+} [{}]",
                snapshot.path_score,
                snapshot.path.name().to_uppercase()
            )),
        }
    }
}

// A cell is corrupted on a high first draw; otherwise a second draw decides
// between fragment and empty.
fn grid_cell(stream: &mut Mulberry32) -> CellKind {
    if stream.next_f64() > 0.7 {
        CellKind::Corrupted
    } else if stream.next_f64() > 0.4 {
        CellKind::Fragment
    } else {
        CellKind::Empty
    }
}

/// Run a recipe against a fresh stream seeded from the snapshot.
pub fn render_recipe(
    directives: &[RenderDirective],
    frame: &mut RenderFrame,
    snapshot: &SessionSnapshot,
    content: &ContentGenerator,
) {
    let mut stream = content.stream(snapshot.seed);
    for directive in directives {
        directive.apply(frame, snapshot, content, &mut stream);
    }
}

/// Wrap a recipe as a render hook.
pub fn recipe_hook(directives: Vec<RenderDirective>) -> RenderHook {
    Arc::new(move |frame: &mut RenderFrame, snapshot: &SessionSnapshot, content: &ContentGenerator| {
        render_recipe(&directives, frame, snapshot, content)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::alignment::Alignment;

    fn snapshot(seed: u64, score: i32) -> SessionSnapshot {
        SessionSnapshot {
            seed,
            depth: 2,
            path_score: score,
            limbo_count: 0,
            path: Alignment::from_score(score),
        }
    }

    fn recipe() -> Vec<RenderDirective> {
        vec![
            RenderDirective::Line("[14:23:17] boot".to_string()),
            RenderDirective::Flavor(FlavorKind::Technical),
            RenderDirective::Gauges {
                count: 8,
                min: 10.0,
                span: 40.0,
            },
            RenderDirective::Grid { cells: 16 },
            RenderDirective::Decoration,
        ]
    }

    #[test]
    fn recipe_is_reproducible_per_seed() {
        let content = ContentGenerator::default();
        let mut a = RenderFrame::new();
        let mut b = RenderFrame::new();
        assert!(a.is_empty());
        render_recipe(&recipe(), &mut a, &snapshot(47_664, 1), &content);
        assert!(!a.is_empty());
        render_recipe(&recipe(), &mut b, &snapshot(47_664, 1), &content);
        assert_eq!(a, b);
        assert_eq!(a.fragments.len(), 5);
    }

    #[test]
    fn recipe_varies_with_seed() {
        let content = ContentGenerator::default();
        let first = {
            let mut frame = RenderFrame::new();
            render_recipe(&recipe(), &mut frame, &snapshot(1, 0), &content);
            frame
        };
        let differs = (2..40).any(|seed| {
            let mut frame = RenderFrame::new();
            render_recipe(&recipe(), &mut frame, &snapshot(seed, 0), &content);
            frame != first
        });
        assert!(differs);
    }

    #[test]
    fn gauges_stay_in_range() {
        let content = ContentGenerator::default();
        let mut frame = RenderFrame::new();
        render_recipe(&recipe(), &mut frame, &snapshot(5, 0), &content);
        let gauges = frame
            .fragments
            .iter()
            .find_map(|f| match f {
                Fragment::Gauges(values) => Some(values.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(gauges.len(), 8);
        assert!(gauges.iter().all(|v| (10.0..50.0).contains(v)));
    }

    #[test]
    fn score_readout_reads_snapshot() {
        let content = ContentGenerator::default();
        let mut frame = RenderFrame::new();
        render_recipe(
            &[RenderDirective::ScoreReadout],
            &mut frame,
            &snapshot(0, -3),
            &content,
        );
        assert_eq!(frame.lines().next(), Some("ALIGNMENT -3 [POWER]"));
    }

    #[test]
    fn hook_matches_direct_recipe() {
        let content = ContentGenerator::default();
        let hook = recipe_hook(recipe());
        let mut via_hook = RenderFrame::new();
        hook(&mut via_hook, &snapshot(8, 0), &content);
        let mut direct = RenderFrame::new();
        render_recipe(&recipe(), &mut direct, &snapshot(8, 0), &content);
        assert_eq!(via_hook, direct);
    }

    #[test]
    fn directives_parse_from_ron() {
        let input = r#"[Line("hi"), Flavor(Manipulative), Decoration, Gauges(count: 3, min: 0.0, span: 1.0), Grid(cells: 4), ScoreReadout]"#;
        let parsed: Vec<RenderDirective> = ron::from_str(input).unwrap();
        assert_eq!(parsed.len(), 6);
        assert_eq!(parsed[1], RenderDirective::Flavor(FlavorKind::Manipulative));
    }
}
