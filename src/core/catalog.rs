/// Task catalog — validation and RON loading.

use rustc_hash::FxHashSet;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::core::render::{recipe_hook, RenderDirective};
use crate::schema::alignment::Alignment;
use crate::schema::task::{Choice, Task};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("task {task}: invalid choice type '{kind}'")]
    InvalidChoiceType { task: u32, kind: String },
    #[error("task {0} has no choices")]
    NoChoices(u32),
    #[error("duplicate task id {0}")]
    DuplicateTask(u32),
    #[error("task ids must run 1..N without gaps: expected {expected}, found {found}")]
    NonContiguous { expected: u32, found: u32 },
    #[error("no ending defined for path '{0}'")]
    MissingEnding(Alignment),
}

/// The validated, read-only task table. Ids run `1..=len()` with no gaps.
#[derive(Debug, Clone, Default)]
pub struct TaskCatalog {
    tasks: Vec<Task>,
}

// RON deserialization helpers. Authored choices carry a delta and a message
// instead of a hook, and the kind stays a string so an unknown kind can be
// reported against its task.

#[derive(Debug, Deserialize)]
struct RonChoice {
    kind: String,
    text: String,
    delta: i32,
    outcome: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename = "Task")]
struct RonTask {
    id: u32,
    title: String,
    description: String,
    #[serde(default)]
    render: Vec<RenderDirective>,
    choices: Vec<RonChoice>,
}

impl TaskCatalog {
    /// Validate and order a set of tasks.
    pub fn new(mut tasks: Vec<Task>) -> Result<TaskCatalog, CatalogError> {
        let mut seen = FxHashSet::default();
        for task in &tasks {
            if !seen.insert(task.id) {
                return Err(CatalogError::DuplicateTask(task.id));
            }
            if task.choices.is_empty() {
                return Err(CatalogError::NoChoices(task.id));
            }
        }

        tasks.sort_by_key(|t| t.id);
        for (index, task) in tasks.iter().enumerate() {
            let expected = index as u32 + 1;
            if task.id != expected {
                return Err(CatalogError::NonContiguous {
                    expected,
                    found: task.id,
                });
            }
        }

        Ok(TaskCatalog { tasks })
    }

    /// Load a catalog from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<TaskCatalog, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a catalog from a RON string.
    pub fn parse_ron(input: &str) -> Result<TaskCatalog, CatalogError> {
        let raw: Vec<RonTask> = ron::from_str(input)?;
        let mut tasks = Vec::with_capacity(raw.len());

        for ron_task in raw {
            let mut task = Task::new(ron_task.id, ron_task.title, ron_task.description);
            if !ron_task.render.is_empty() {
                task.render = Some(recipe_hook(ron_task.render));
            }
            for choice in ron_task.choices {
                let kind: Alignment =
                    choice
                        .kind
                        .parse()
                        .map_err(|_| CatalogError::InvalidChoiceType {
                            task: ron_task.id,
                            kind: choice.kind.clone(),
                        })?;
                task.choices.push(Choice::with_delta(
                    kind,
                    choice.text,
                    choice.delta,
                    choice.outcome,
                ));
            }
            tasks.push(task);
        }

        Self::new(tasks)
    }

    /// Look up a task by its 1-based id.
    pub fn get(&self, id: u32) -> Option<&Task> {
        let index = id.checked_sub(1)? as usize;
        self.tasks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: u32) -> Task {
        Task::new(id, format!("Task {}", id), "desc")
            .with_choice(Choice::with_delta(Alignment::Humanity, "ok", 1, "fine"))
    }

    #[test]
    fn accepts_unordered_contiguous_ids() {
        let catalog = TaskCatalog::new(vec![task(3), task(1), task(2)]).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get(1).unwrap().id, 1);
        assert_eq!(catalog.get(3).unwrap().id, 3);
        assert!(catalog.get(0).is_none());
        assert!(catalog.get(4).is_none());
    }

    #[test]
    fn rejects_gap() {
        let err = TaskCatalog::new(vec![task(1), task(3)]).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::NonContiguous {
                expected: 2,
                found: 3
            }
        ));
    }

    #[test]
    fn rejects_not_starting_at_one() {
        let err = TaskCatalog::new(vec![task(2)]).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::NonContiguous {
                expected: 1,
                found: 2
            }
        ));
    }

    #[test]
    fn rejects_duplicate() {
        let err = TaskCatalog::new(vec![task(1), task(1)]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateTask(1)));
    }

    #[test]
    fn rejects_task_without_choices() {
        let err = TaskCatalog::new(vec![Task::new(1, "Empty", "nothing")]).unwrap_err();
        assert!(matches!(err, CatalogError::NoChoices(1)));
    }

    #[test]
    fn empty_catalog_is_valid() {
        let catalog = TaskCatalog::new(Vec::new()).unwrap();
        assert!(catalog.is_empty());
        assert!(catalog.get(1).is_none());
    }

    #[test]
    fn parse_ron_catalog() {
        let input = r#"[
            Task(
                id: 1,
                title: "Quarantine",
                description: "A process replicates.",
                render: [Flavor(Technical), Decoration],
                choices: [
                    (kind: "power", text: "Purge", delta: -1, outcome: "Purged."),
                    (kind: "humanity", text: "Isolate", delta: 1, outcome: "Isolated."),
                ],
            ),
            Task(
                id: 2,
                title: "Stream",
                description: "Noise.",
                choices: [
                    (kind: "bliss", text: "Drift", delta: 2, outcome: "Lovely."),
                ],
            ),
        ]"#;
        let catalog = TaskCatalog::parse_ron(input).unwrap();
        assert_eq!(catalog.len(), 2);
        let first = catalog.get(1).unwrap();
        assert!(first.render.is_some());
        assert_eq!(first.choices[0].kind, Alignment::Power);
        assert!(catalog.get(2).unwrap().render.is_none());
    }

    #[test]
    fn invalid_choice_type_fails_at_load() {
        let input = r#"[
            Task(
                id: 1,
                title: "Bad",
                description: "",
                choices: [(kind: "chaos", text: "?", delta: 0, outcome: "")],
            ),
        ]"#;
        let err = TaskCatalog::parse_ron(input).unwrap_err();
        match err {
            CatalogError::InvalidChoiceType { task, kind } => {
                assert_eq!(task, 1);
                assert_eq!(kind, "chaos");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn load_fixture_catalog() {
        let path = std::path::PathBuf::from("tests/fixtures/test_tasks.ron");
        let catalog = TaskCatalog::load_from_ron(&path).unwrap();
        assert_eq!(catalog.len(), 4);
        assert!(catalog.iter().all(|t| !t.choices.is_empty()));
    }
}
