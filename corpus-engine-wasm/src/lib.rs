//! WASM bindings for corpus-engine — drives the browser front end.
//!
//! Every value crossing the boundary is a JSON string. The front end owns
//! all visuals and timing; it reports reveals and elapsed time back here.

use std::time::Duration;
use wasm_bindgen::prelude::*;

use corpus_engine::core::config::EngineConfig;
use corpus_engine::core::engine::Engine;
use corpus_engine::core::limbo::{LimboAction, REDACTION_LOG};
use corpus_engine::schema::alignment::Alignment;

// ---------------------------------------------------------------------------
// Embedded story data — compiled into the WASM binary
// ---------------------------------------------------------------------------
mod data {
    pub const TASKS: &str = include_str!("../../story_data/tasks.ron");
    pub const ENDINGS: &str = include_str!("../../story_data/endings.ron");
    pub const CONFIG: &str = include_str!("../../story_data/config.ron");
}

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
struct StatusInfo {
    seed: u64,
    depth: u32,
    total_tasks: usize,
    path_score: i32,
    path: Alignment,
    limbo_count: u32,
    heartbeat_bpm: u32,
    ended: bool,
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&format!("Serialization error: {e}")))
}

fn build_engine(seed: Option<u64>) -> Result<Engine, JsError> {
    let catalog = corpus_engine::core::catalog::TaskCatalog::parse_ron(data::TASKS)
        .map_err(|e| JsError::new(&format!("Catalog parse error: {e}")))?;
    let endings = corpus_engine::schema::ending::EndingTable::parse_ron(data::ENDINGS)
        .map_err(|e| JsError::new(&format!("Endings parse error: {e}")))?;
    let config = EngineConfig::parse_ron(data::CONFIG)
        .map_err(|e| JsError::new(&format!("Config parse error: {e}")))?;

    let mut builder = Engine::builder()
        .with_catalog(catalog)
        .with_endings(endings)
        .with_config(config);
    if let Some(seed) = seed {
        builder = builder.seed(seed);
    }
    builder
        .build()
        .map_err(|e| JsError::new(&format!("Engine build error: {e}")))
}

// ---------------------------------------------------------------------------
// CorpusSession — the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct CorpusSession {
    engine: Engine,
}

#[wasm_bindgen]
impl CorpusSession {
    /// Create a session. Pass a seed to replay a known playthrough, or
    /// nothing for a fresh one.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<u64>) -> Result<CorpusSession, JsError> {
        Ok(CorpusSession {
            engine: build_engine(seed)?,
        })
    }

    /// Present the first task. Returns the step as JSON, or `null` if the
    /// session already started.
    pub fn start(&mut self) -> Result<String, JsError> {
        to_json(&self.engine.start())
    }

    /// Report that the reveal stamped `generation` finished.
    pub fn reveal_finished(&mut self, generation: u64) -> bool {
        self.engine.reveal_finished(generation)
    }

    /// Select a choice. Returns the resolution as JSON, or `null` when the
    /// selection was dropped.
    pub fn select(&mut self, index: usize) -> Result<String, JsError> {
        to_json(&self.engine.select(index))
    }

    /// Act inside limbo. `action_json` is a serialized action such as
    /// `"Verify"` or `{"ToggleSquare":4}`.
    pub fn limbo_action(&mut self, action_json: &str) -> Result<String, JsError> {
        let action: LimboAction = serde_json::from_str(action_json)
            .map_err(|e| JsError::new(&format!("Invalid limbo action JSON: {e}")))?;
        to_json(&self.engine.limbo_action(action))
    }

    /// Advance logical time. Returns the cues that took effect as JSON.
    pub fn tick(&mut self, elapsed_ms: u32) -> Result<String, JsError> {
        let cues = self.engine.tick(Duration::from_millis(u64::from(elapsed_ms)));
        to_json(&cues)
    }

    pub fn current_path(&self) -> String {
        self.engine.current_path().to_string()
    }

    pub fn heartbeat_bpm(&self) -> u32 {
        self.engine.heartbeat_bpm()
    }

    /// Return a JSON summary of the session.
    pub fn status(&self) -> Result<String, JsError> {
        let snapshot = self.engine.snapshot();
        to_json(&StatusInfo {
            seed: snapshot.seed,
            depth: snapshot.depth,
            total_tasks: self.engine.catalog().len(),
            path_score: snapshot.path_score,
            path: snapshot.path,
            limbo_count: snapshot.limbo_count,
            heartbeat_bpm: self.engine.heartbeat_bpm(),
            ended: self.engine.is_ended(),
        })
    }

    /// Return the redaction diversion's log lines as a JSON array.
    pub fn redaction_log() -> String {
        serde_json::to_string(&REDACTION_LOG).unwrap_or_else(|_| "[]".to_string())
    }

    /// Start over with a new seed.
    pub fn reset(&mut self, seed: Option<u64>) -> Result<(), JsError> {
        self.engine = build_engine(seed)?;
        Ok(())
    }
}
