/// Catalog Linter — validates a task catalog and its companion files.
///
/// Usage: catalog_linter <tasks.ron> [--endings <path>] [--pools <path>] [--config <path>]

use corpus_engine::core::catalog::TaskCatalog;
use corpus_engine::core::config::EngineConfig;
use corpus_engine::core::content::{ContentGenerator, ContentPools};
use corpus_engine::schema::alignment::{Alignment, PATH_THRESHOLD};
use corpus_engine::schema::ending::EndingTable;
use corpus_engine::schema::task::PathScore;
use rustc_hash::FxHashSet;
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!(
            "Usage: catalog_linter <tasks.ron> [--endings <path>] [--pools <path>] [--config <path>]"
        );
        process::exit(0);
    }

    let catalog_path = &args[1];
    let mut endings_path = None;
    let mut pools_path = None;
    let mut config_path = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--endings" if i + 1 < args.len() => {
                i += 1;
                endings_path = Some(args[i].clone());
            }
            "--pools" if i + 1 < args.len() => {
                i += 1;
                pools_path = Some(args[i].clone());
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    let catalog = match TaskCatalog::load_from_ron(Path::new(catalog_path)) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("ERROR: Failed to load catalog '{}': {}", catalog_path, e);
            process::exit(1);
        }
    };
    println!("Loaded {} tasks", catalog.len());

    let mut errors = Vec::new();

    if let Some(ref path) = endings_path {
        match EndingTable::load_from_ron(Path::new(path)) {
            Ok(_) => println!("  Loaded endings: {}", path),
            Err(e) => errors.push(format!("endings '{}': {}", path, e)),
        }
    }

    if let Some(ref path) = pools_path {
        match ContentPools::load_from_ron(Path::new(path)).and_then(ContentGenerator::new) {
            Ok(content) => println!(
                "  Loaded pools: {} ({} templates)",
                path,
                content.templates().len()
            ),
            Err(e) => errors.push(format!("pools '{}': {}", path, e)),
        }
    }

    if let Some(ref path) = config_path {
        match EngineConfig::load_from_ron(Path::new(path)) {
            Ok(_) => println!("  Loaded config: {}", path),
            Err(e) => errors.push(format!("config '{}': {}", path, e)),
        }
    }

    let warnings = lint_catalog(&catalog);

    println!("\n=== Catalog Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

/// The score change a choice applies when selected from zero.
fn choice_delta(choice: &corpus_engine::schema::task::Choice) -> i32 {
    let mut score = PathScore::default();
    choice.select(&mut score);
    score.get()
}

fn lint_catalog(catalog: &TaskCatalog) -> Vec<String> {
    let mut warnings = Vec::new();

    // Extremes of the score ignoring limbo nudges.
    let mut lowest: i64 = 0;
    let mut highest: i64 = 0;

    for task in catalog.iter() {
        if task.choices.len() < 2 {
            warnings.push(format!(
                "Task {} '{}' has only one choice",
                task.id, task.title
            ));
        }

        if task.render.is_none() {
            warnings.push(format!("Task {} '{}' has no render recipe", task.id, task.title));
        }

        let mut texts = FxHashSet::default();
        let mut deltas = Vec::with_capacity(task.choices.len());
        for choice in &task.choices {
            if !texts.insert(choice.text.as_str()) {
                warnings.push(format!(
                    "Task {} repeats the choice text '{}'",
                    task.id, choice.text
                ));
            }

            let delta = choice_delta(choice);
            let leans_wrong = match choice.kind {
                Alignment::Power => delta > 0,
                Alignment::Bliss => delta < 0,
                Alignment::Humanity => false,
            };
            if leans_wrong {
                warnings.push(format!(
                    "Task {} {} choice '{}' moves the score by {:+}",
                    task.id, choice.kind, choice.text, delta
                ));
            }
            deltas.push(i64::from(delta));
        }

        lowest += deltas.iter().copied().min().unwrap_or(0);
        highest += deltas.iter().copied().max().unwrap_or(0);
    }

    let threshold = i64::from(PATH_THRESHOLD);
    if lowest > -threshold {
        warnings.push(format!(
            "The power ending is unreachable (lowest score {})",
            lowest
        ));
    }
    if highest < threshold {
        warnings.push(format!(
            "The bliss ending is unreachable (highest score {})",
            highest
        ));
    }

    warnings
}
