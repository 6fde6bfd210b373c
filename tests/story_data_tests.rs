/// Checks over the bundled story data.

use corpus_engine::core::catalog::TaskCatalog;
use corpus_engine::core::config::EngineConfig;
use corpus_engine::schema::alignment::Alignment;
use corpus_engine::schema::ending::EndingTable;
use corpus_engine::schema::task::PathScore;
use std::path::Path;

fn bundled_catalog() -> TaskCatalog {
    TaskCatalog::load_from_ron(Path::new("story_data/tasks.ron")).unwrap()
}

#[test]
fn bundled_catalog_is_contiguous() {
    let catalog = bundled_catalog();
    assert!(catalog.len() >= 10);
    for (index, task) in catalog.iter().enumerate() {
        assert_eq!(task.id as usize, index + 1);
    }
}

#[test]
fn every_task_offers_a_real_choice() {
    for task in bundled_catalog().iter() {
        assert!(
            task.choices.len() >= 2,
            "Task {} '{}' has only {} choice(s)",
            task.id,
            task.title,
            task.choices.len()
        );
        assert!(task.render.is_some(), "Task {} has no render recipe", task.id);
    }
}

#[test]
fn choice_deltas_lean_toward_their_path() {
    for task in bundled_catalog().iter() {
        for choice in &task.choices {
            let mut score = PathScore::default();
            choice.select(&mut score);
            match choice.kind {
                Alignment::Power => assert!(
                    score.get() < 0,
                    "Task {} power choice '{}' does not lower the score",
                    task.id,
                    choice.text
                ),
                Alignment::Bliss => assert!(
                    score.get() > 0,
                    "Task {} bliss choice '{}' does not raise the score",
                    task.id,
                    choice.text
                ),
                Alignment::Humanity => assert!(score.get().abs() <= 1),
            }
        }
    }
}

#[test]
fn bundled_endings_cover_every_path() {
    let endings = EndingTable::load_from_ron(Path::new("story_data/endings.ron")).unwrap();
    for alignment in Alignment::ALL {
        let ending = endings.get(alignment);
        assert!(!ending.title.is_empty());
        assert!(!ending.lines.is_empty(), "{} ending has no lines", alignment);
    }
}

#[test]
fn bundled_config_loads() {
    let config = EngineConfig::load_from_ron(Path::new("story_data/config.ron")).unwrap();
    assert!(config.reveal_ms.is_some());
    assert_eq!(config.redaction_minimum, 5);
}
