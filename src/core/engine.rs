/// The narrative state machine: presentation, choice resolution, limbo
/// diversions and the ending.
///
/// The engine owns the session and is the only thing that mutates it. Every
/// entry point is total: calls that do not apply in the current phase are
/// dropped and logged at debug level.

use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::catalog::{CatalogError, TaskCatalog};
use crate::core::config::EngineConfig;
use crate::core::content::{ContentError, ContentGenerator, ContentPools};
use crate::core::events::SideEvent;
use crate::core::limbo::{LimboAction, LimboDiversion, LimboKind, LimboResponse, LIMBO_THRESHOLD};
use crate::core::render::RenderFrame;
use crate::core::schedule::{Cue, Scheduler};
use crate::core::seed::{derive_seed, Mulberry32};
use crate::core::session::{Session, SessionSnapshot};
use crate::schema::alignment::Alignment;
use crate::schema::ending::{Ending, EndingTable};

const BUNDLED_TASKS: &str = include_str!("../../story_data/tasks.ron");
const BUNDLED_ENDINGS: &str = include_str!("../../story_data/endings.ron");

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("content error: {0}")]
    Content(#[from] ContentError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Where the state machine currently is.
#[derive(Debug, Clone)]
pub enum Phase {
    NotStarted,
    /// Task shown, reveal still running. Selections are dropped.
    Presenting(u32),
    /// Reveal finished; the task accepts a choice.
    AwaitingChoice(u32),
    Limbo(LimboDiversion),
    Ended(Ending),
}

/// Everything the presentation layer needs to show one task.
#[derive(Debug, Clone, Serialize)]
pub struct Presentation {
    pub task_id: u32,
    pub title: String,
    pub description: String,
    /// Pass back to [`Engine::reveal_finished`] once the reveal is done.
    pub generation: u64,
    pub frame: RenderFrame,
    pub choices: Vec<(Alignment, String)>,
}

/// What the engine moved to after a transition.
#[derive(Debug, Clone, Serialize)]
pub enum Step {
    Presented(Presentation),
    Limbo(LimboDiversion),
    Ended(Ending),
}

/// The result of an accepted choice.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub message: String,
    pub side_event: Option<SideEvent>,
    pub next: Step,
}

/// The result of an action inside a limbo diversion. `next` is set only when
/// the diversion completed and the narrative moved on.
#[derive(Debug, Clone, Serialize)]
pub struct LimboOutcome {
    pub response: LimboResponse,
    pub next: Option<Step>,
}

pub struct Engine {
    catalog: TaskCatalog,
    endings: EndingTable,
    content: ContentGenerator,
    config: EngineConfig,
    session: Session,
    phase: Phase,
    timers: Scheduler,
}

/// Builder for constructing an `Engine`.
pub struct EngineBuilder {
    seed: Option<u64>,
    catalog_path: Option<String>,
    endings_path: Option<String>,
    pools_path: Option<String>,
    config_path: Option<String>,
    /// Directly provided catalog (for testing without files).
    catalog: Option<TaskCatalog>,
    /// Directly provided endings (for testing without files).
    endings: Option<EndingTable>,
    content: Option<ContentGenerator>,
    config: Option<EngineConfig>,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder {
            seed: None,
            catalog_path: None,
            endings_path: None,
            pools_path: None,
            config_path: None,
            catalog: None,
            endings: None,
            content: None,
            config: None,
        }
    }

    /// Present the first task. Returns `None` if the narrative already
    /// started.
    pub fn start(&mut self) -> Option<Step> {
        if !matches!(self.phase, Phase::NotStarted) {
            debug!("start ignored: narrative already running");
            return None;
        }
        info!(seed = self.session.seed, tasks = self.catalog.len(), "narrative started");
        Some(self.present_task())
    }

    fn present_task(&mut self) -> Step {
        let generation = self.timers.next_generation();
        let task_id = self.session.depth + 1;
        let Some(task) = self.catalog.get(task_id) else {
            return Step::Ended(self.end_narrative());
        };

        self.session.is_transitioning = true;
        let snapshot = self.session.snapshot();
        let mut frame = RenderFrame::new();
        if let Some(render) = &task.render {
            render(&mut frame, &snapshot, &self.content);
        }

        let presentation = Presentation {
            task_id,
            title: task.title.clone(),
            description: task.description.clone(),
            generation,
            frame,
            choices: task
                .choices
                .iter()
                .map(|choice| (choice.kind, choice.text.clone()))
                .collect(),
        };

        if let Some(delay) = self.config.reveal_delay() {
            self.timers.schedule(delay, Cue::RevealComplete);
        }
        self.phase = Phase::Presenting(task_id);
        info!(
            task = task_id,
            seed = snapshot.seed,
            path = %snapshot.path,
            "presenting task"
        );
        Step::Presented(presentation)
    }

    /// Report that the reveal of the presentation stamped `generation` has
    /// finished. Stale generations are ignored.
    pub fn reveal_finished(&mut self, generation: u64) -> bool {
        let Phase::Presenting(task_id) = self.phase else {
            debug!(generation, "reveal ignored: no task is being revealed");
            return false;
        };
        if generation != self.timers.generation() {
            debug!(
                generation,
                current = self.timers.generation(),
                "reveal ignored: stale generation"
            );
            return false;
        }
        self.session.is_transitioning = false;
        self.phase = Phase::AwaitingChoice(task_id);
        true
    }

    /// Resolve the choice at `index` of the current task. Dropped (`None`)
    /// while the latch is set, outside a task, or for an unknown index.
    pub fn select(&mut self, index: usize) -> Option<Resolution> {
        let task_id = match self.phase {
            Phase::AwaitingChoice(id) if !self.session.is_transitioning => id,
            _ => {
                debug!(index, "selection dropped: not awaiting a choice");
                return None;
            }
        };
        let Some(choice) = self
            .catalog
            .get(task_id)
            .and_then(|task| task.choices.get(index))
        else {
            debug!(task = task_id, index, "selection dropped: unknown choice");
            return None;
        };

        self.session.is_transitioning = true;
        let message = choice.select(&mut self.session.path_score);
        let kind = choice.kind;

        let mut stream = Mulberry32::new(derive_seed(
            self.session.seed,
            task_id,
            self.session.path_score.get(),
        ));
        let side_event = SideEvent::for_choice(kind, &mut stream);
        debug!(
            task = task_id,
            kind = %kind,
            score = self.session.path_score.get(),
            "choice resolved"
        );

        let next = if self.session.path_score.exceeds(LIMBO_THRESHOLD) {
            self.enter_limbo()
        } else {
            self.advance()
        };
        Some(Resolution {
            message,
            side_event,
            next,
        })
    }

    fn enter_limbo(&mut self) -> Step {
        self.session.limbo_count += 1;
        self.timers.next_generation();

        let loop_seed = derive_seed(
            self.session.seed,
            self.session.depth,
            i32::try_from(self.session.limbo_count).unwrap_or(i32::MAX),
        );
        let kind = LimboKind::choose(&mut Mulberry32::new(loop_seed));
        let diversion = LimboDiversion::new(kind, self.session.limbo_count);
        if let Some(delay) = diversion.escape_delay(&self.config) {
            self.timers.schedule(delay, Cue::LimboEscapeUnlocked);
        }

        info!(
            kind = ?kind,
            loop_number = self.session.limbo_count,
            score = self.session.path_score.get(),
            "entering limbo"
        );
        self.phase = Phase::Limbo(diversion.clone());
        Step::Limbo(diversion)
    }

    /// Act inside the active limbo diversion. `None` outside limbo.
    pub fn limbo_action(&mut self, action: LimboAction) -> Option<LimboOutcome> {
        let Phase::Limbo(diversion) = &mut self.phase else {
            debug!(?action, "limbo action dropped: not in limbo");
            return None;
        };

        let response = diversion.act(action, &self.config);
        match &response {
            LimboResponse::Retry(_) => {
                self.timers.next_generation();
                if let Some(delay) = diversion.escape_delay(&self.config) {
                    self.timers.schedule(delay, Cue::LimboEscapeUnlocked);
                }
                debug!(attempts = diversion.attempts, "limbo diversion reset");
            }
            LimboResponse::Complete => {
                info!(loop_number = diversion.loop_number, "limbo cleared");
                self.session.path_score.nudge_toward_zero();
                let next = self.advance();
                return Some(LimboOutcome {
                    response,
                    next: Some(next),
                });
            }
            LimboResponse::Continue | LimboResponse::Rejected(_) | LimboResponse::Ignored => {}
        }
        Some(LimboOutcome {
            response,
            next: None,
        })
    }

    fn advance(&mut self) -> Step {
        let previous = self.session.seed;
        self.session.depth += 1;
        self.session.history.push(previous);
        self.session.seed = derive_seed(
            previous,
            self.session.depth,
            self.session.path_score.get(),
        );
        debug!(
            depth = self.session.depth,
            seed = self.session.seed,
            "advanced"
        );

        if self.session.depth as usize >= self.catalog.len() {
            return Step::Ended(self.end_narrative());
        }
        self.present_task()
    }

    fn end_narrative(&mut self) -> Ending {
        if let Phase::Ended(ending) = &self.phase {
            return ending.clone();
        }
        self.timers.next_generation();
        self.session.is_transitioning = true;

        let path = self.session.current_path();
        let ending = Ending {
            path,
            final_score: self.session.path_score.get(),
            depth: self.session.depth,
            limbo_count: self.session.limbo_count,
            content: self.endings.get(path).clone(),
        };
        info!(
            path = %path,
            score = ending.final_score,
            depth = ending.depth,
            limbo_count = ending.limbo_count,
            "narrative ended"
        );
        self.phase = Phase::Ended(ending.clone());
        ending
    }

    /// Advance logical time and apply the cues of the current interaction.
    /// Returns the cues that took effect.
    pub fn tick(&mut self, elapsed: Duration) -> Vec<Cue> {
        let mut applied = Vec::new();
        for cue in self.timers.advance(elapsed) {
            let took_effect = match cue {
                Cue::RevealComplete => {
                    let generation = self.timers.generation();
                    self.reveal_finished(generation)
                }
                Cue::LimboEscapeUnlocked => match &mut self.phase {
                    Phase::Limbo(diversion) if !diversion.escape_unlocked => {
                        diversion.unlock_escape();
                        true
                    }
                    _ => false,
                },
            };
            if took_effect {
                debug!(?cue, "timer fired");
                applied.push(cue);
            }
        }
        applied
    }

    pub fn current_path(&self) -> Alignment {
        self.session.current_path()
    }

    /// Pulse rate for the audio layer, derived from the score.
    pub fn heartbeat_bpm(&self) -> u32 {
        let magnitude = i64::from(self.session.path_score.get().unsigned_abs());
        let bpm = match self.current_path() {
            Alignment::Power => 60 + 20 * magnitude,
            Alignment::Bliss => 60 - 10 * magnitude,
            Alignment::Humanity => 60 + 5 * magnitude,
        };
        u32::try_from(bpm.max(1)).unwrap_or(u32::MAX)
    }

    /// Logical time accumulated through `tick`.
    pub fn elapsed(&self) -> Duration {
        self.timers.now()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn limbo(&self) -> Option<&LimboDiversion> {
        match &self.phase {
            Phase::Limbo(diversion) => Some(diversion),
            _ => None,
        }
    }

    pub fn ending(&self) -> Option<&Ending> {
        match &self.phase {
            Phase::Ended(ending) => Some(ending),
            _ => None,
        }
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.phase, Phase::Ended(_))
    }

    pub fn catalog(&self) -> &TaskCatalog {
        &self.catalog
    }

    pub fn content(&self) -> &ContentGenerator {
        &self.content
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl EngineBuilder {
    /// Fix the session seed. Without one an entropy seed is drawn.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn catalog_path(mut self, path: &str) -> Self {
        self.catalog_path = Some(path.to_string());
        self
    }

    pub fn endings_path(mut self, path: &str) -> Self {
        self.endings_path = Some(path.to_string());
        self
    }

    pub fn pools_path(mut self, path: &str) -> Self {
        self.pools_path = Some(path.to_string());
        self
    }

    pub fn config_path(mut self, path: &str) -> Self {
        self.config_path = Some(path.to_string());
        self
    }

    /// Provide a catalog directly (for testing without files).
    pub fn with_catalog(mut self, catalog: TaskCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Provide endings directly (for testing without files).
    pub fn with_endings(mut self, endings: EndingTable) -> Self {
        self.endings = Some(endings);
        self
    }

    pub fn with_content(mut self, content: ContentGenerator) -> Self {
        self.content = Some(content);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the engine. Values given directly win over paths; with neither,
    /// the bundled story data and built-in pools are used.
    pub fn build(self) -> Result<Engine, EngineError> {
        let catalog = match (self.catalog, self.catalog_path) {
            (Some(catalog), _) => catalog,
            (None, Some(path)) => TaskCatalog::load_from_ron(Path::new(&path))?,
            (None, None) => TaskCatalog::parse_ron(BUNDLED_TASKS)?,
        };

        let endings = match (self.endings, self.endings_path) {
            (Some(endings), _) => endings,
            (None, Some(path)) => EndingTable::load_from_ron(Path::new(&path))?,
            (None, None) => EndingTable::parse_ron(BUNDLED_ENDINGS)?,
        };

        let content = match (self.content, self.pools_path) {
            (Some(content), _) => content,
            (None, Some(path)) => {
                ContentGenerator::new(ContentPools::load_from_ron(Path::new(&path))?)?
            }
            (None, None) => ContentGenerator::default(),
        };

        let config = match (self.config, self.config_path) {
            (Some(config), _) => config,
            (None, Some(path)) => EngineConfig::load_from_ron(Path::new(&path))?,
            (None, None) => EngineConfig::default(),
        };
        config.validate()?;

        let seed = self.seed.unwrap_or_else(rand::random::<u64>);

        Ok(Engine {
            catalog,
            endings,
            content,
            config,
            session: Session::new(seed),
            phase: Phase::NotStarted,
            timers: Scheduler::new(),
        })
    }
}
