/// Preview — interactive shell for playing a catalog headlessly.
///
/// Usage: preview [--catalog <path>] [--endings <path>] [--pools <path>]
///                [--config <path>] [--seed <n>]
///
/// Without paths the bundled story is used.
///
/// Commands:
///   pick <n>              — select choice n (1-based)
///   reveal                — finish the current reveal
///   wait <ms>             — advance logical time
///   limbo <action> [args] — act inside a limbo diversion
///   auto <path>           — play to the end favoring power, humanity or bliss
///   status                — show the session
///   seed <n>              — restart with a new seed
///   help                  — list commands
///   quit                  — exit

use corpus_engine::core::engine::{Engine, EngineError, Phase, Step};
use corpus_engine::core::limbo::{LimboAction, LimboDiversion, LimboKind, REDACTION_LOG};
use corpus_engine::core::render::{CellKind, Fragment, RenderFrame};
use corpus_engine::schema::alignment::Alignment;
use corpus_engine::schema::ending::Ending;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Default, Clone)]
struct Paths {
    catalog: Option<String>,
    endings: Option<String>,
    pools: Option<String>,
    config: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return;
    }

    let mut paths = Paths::default();
    let mut seed: Option<u64> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--catalog" if i + 1 < args.len() => {
                i += 1;
                paths.catalog = Some(args[i].clone());
            }
            "--endings" if i + 1 < args.len() => {
                i += 1;
                paths.endings = Some(args[i].clone());
            }
            "--pools" if i + 1 < args.len() => {
                i += 1;
                paths.pools = Some(args[i].clone());
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                paths.config = Some(args[i].clone());
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().ok();
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let mut engine = match build_engine(&paths, seed) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    println!("Loaded {} tasks", engine.catalog().len());
    println!("Seed: {}", engine.session().seed());
    println!("Type 'help' for commands.\n");

    let mut generation = 0;
    if let Some(step) = engine.start() {
        print_step(&step, &mut generation);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("preview> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let cmd = parts[0].to_lowercase();

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => print_help(),
            "reveal" => {
                if engine.reveal_finished(generation) {
                    println!("(choices unlocked)");
                } else {
                    println!("Nothing is being revealed.");
                }
            }
            "pick" => {
                let Some(n) = parts.get(1).and_then(|s| s.parse::<usize>().ok()) else {
                    println!("Usage: pick <n>");
                    continue;
                };
                match n.checked_sub(1).and_then(|index| engine.select(index)) {
                    Some(resolution) => {
                        println!("\n> {}", resolution.message);
                        if let Some(event) = resolution.side_event {
                            println!("  (side event: {:?})", event);
                        }
                        print_step(&resolution.next, &mut generation);
                    }
                    None => println!("Selection ignored. Is the reveal finished?"),
                }
            }
            "wait" => {
                let Some(ms) = parts.get(1).and_then(|s| s.parse::<u64>().ok()) else {
                    println!("Usage: wait <ms>");
                    continue;
                };
                let cues = engine.tick(Duration::from_millis(ms));
                if cues.is_empty() {
                    println!("(nothing happened)");
                }
                for cue in cues {
                    println!("({:?})", cue);
                }
            }
            "limbo" => {
                let Some(action) = parse_limbo_action(&parts[1..]) else {
                    print_limbo_help();
                    continue;
                };
                match engine.limbo_action(action) {
                    Some(outcome) => {
                        println!("{:?}", outcome.response);
                        if let Some(next) = outcome.next {
                            print_step(&next, &mut generation);
                        } else if let Some(diversion) = engine.limbo() {
                            print_limbo(diversion);
                        }
                    }
                    None => println!("Not in limbo."),
                }
            }
            "auto" => {
                let strategy = match parts.get(1).map(|s| s.parse::<Alignment>()) {
                    Some(Ok(alignment)) => alignment,
                    _ => {
                        println!("Usage: auto <power|humanity|bliss>");
                        continue;
                    }
                };
                let steps = autoplay(&mut engine, strategy, generation);
                println!("Played {} steps.", steps);
                if let Some(ending) = engine.ending() {
                    print_ending(ending);
                }
            }
            "status" => {
                let snapshot = engine.snapshot();
                println!("  seed:        {}", snapshot.seed);
                println!("  depth:       {} / {}", snapshot.depth, engine.catalog().len());
                println!("  score:       {:+}", snapshot.path_score);
                println!("  path:        {}", snapshot.path);
                println!("  limbo loops: {}", snapshot.limbo_count);
                println!("  heartbeat:   {} bpm", engine.heartbeat_bpm());
                println!("  elapsed:     {} ms", engine.elapsed().as_millis());
                println!("  phase:       {}", phase_name(engine.phase()));
            }
            "seed" => {
                let Some(new_seed) = parts.get(1).and_then(|s| s.parse::<u64>().ok()) else {
                    println!("Current seed: {}", engine.session().seed());
                    continue;
                };
                match build_engine(&paths, Some(new_seed)) {
                    Ok(fresh) => {
                        engine = fresh;
                        println!("Restarted with seed {}", new_seed);
                        if let Some(step) = engine.start() {
                            print_step(&step, &mut generation);
                        }
                    }
                    Err(e) => println!("ERROR: {}", e),
                }
            }
            _ => println!("Unknown command '{}'. Type 'help'.", cmd),
        }
    }
}

fn build_engine(paths: &Paths, seed: Option<u64>) -> Result<Engine, EngineError> {
    let mut builder = Engine::builder();
    if let Some(seed) = seed {
        builder = builder.seed(seed);
    }
    if let Some(ref path) = paths.catalog {
        builder = builder.catalog_path(path);
    }
    if let Some(ref path) = paths.endings {
        builder = builder.endings_path(path);
    }
    if let Some(ref path) = paths.pools {
        builder = builder.pools_path(path);
    }
    if let Some(ref path) = paths.config {
        builder = builder.config_path(path);
    }
    builder.build()
}

/// Play until the ending, preferring choices of `strategy` and clearing
/// limbo by the cheapest honest route.
fn autoplay(engine: &mut Engine, strategy: Alignment, mut generation: u64) -> usize {
    let mut steps = 0;
    while steps < 10_000 {
        steps += 1;
        match engine.phase().clone() {
            Phase::NotStarted => {
                if let Some(Step::Presented(p)) = engine.start() {
                    generation = p.generation;
                }
            }
            Phase::Presenting(_) => {
                if !engine.reveal_finished(generation) {
                    // Revealed by a timer we have not seen; let it fire.
                    engine.tick(Duration::from_secs(60));
                }
            }
            Phase::AwaitingChoice(task_id) => {
                let index = engine
                    .catalog()
                    .get(task_id)
                    .and_then(|task| task.choices.iter().position(|c| c.kind == strategy))
                    .unwrap_or(0);
                match engine.select(index).map(|r| r.next) {
                    Some(Step::Presented(p)) => generation = p.generation,
                    Some(_) | None => {}
                }
            }
            Phase::Limbo(diversion) => {
                let next = clear_limbo(engine, &diversion);
                if let Some(Step::Presented(p)) = next {
                    generation = p.generation;
                }
            }
            Phase::Ended(_) => break,
        }
    }
    steps
}

fn clear_limbo(engine: &mut Engine, diversion: &LimboDiversion) -> Option<Step> {
    let outcome = match diversion.kind {
        LimboKind::Captcha => {
            engine.tick(engine.config().captcha_escape_delay());
            engine.limbo_action(LimboAction::ClaimHuman)
        }
        LimboKind::WaitingRoom => {
            engine.tick(engine.config().waiting_room_delay());
            engine.limbo_action(LimboAction::ContinueWaiting)
        }
        LimboKind::FileTransfer => engine.limbo_action(LimboAction::Compress),
        LimboKind::RedactedLog => {
            let needed = engine.config().redaction_minimum as usize;
            let words = REDACTION_LOG.iter().enumerate().flat_map(|(entry, line)| {
                (0..line.split_whitespace().count()).map(move |word| (entry, word))
            });
            for (entry, word) in words.take(needed) {
                engine.limbo_action(LimboAction::ToggleRedaction { entry, word });
            }
            engine.limbo_action(LimboAction::Submit)
        }
    };
    outcome.and_then(|o| o.next)
}

fn parse_limbo_action(parts: &[&str]) -> Option<LimboAction> {
    let number = |i: usize| parts.get(i).and_then(|s| s.parse::<usize>().ok());
    match *parts.first()? {
        "toggle" => number(1).map(LimboAction::ToggleSquare),
        "verify" => Some(LimboAction::Verify),
        "human" => Some(LimboAction::ClaimHuman),
        "continue" => Some(LimboAction::ContinueWaiting),
        "drop" => Some(LimboAction::DropFile),
        "compress" => Some(LimboAction::Compress),
        "redact" => Some(LimboAction::ToggleRedaction {
            entry: number(1)?,
            word: number(2)?,
        }),
        "accept" => Some(LimboAction::AcceptRecommended),
        "submit" => Some(LimboAction::Submit),
        _ => None,
    }
}

fn phase_name(phase: &Phase) -> String {
    match phase {
        Phase::NotStarted => "not started".to_string(),
        Phase::Presenting(id) => format!("revealing task {}", id),
        Phase::AwaitingChoice(id) => format!("awaiting choice on task {}", id),
        Phase::Limbo(diversion) => format!("limbo ({})", diversion.kind.title()),
        Phase::Ended(ending) => format!("ended ({})", ending.path),
    }
}

fn print_step(step: &Step, generation: &mut u64) {
    match step {
        Step::Presented(presentation) => {
            *generation = presentation.generation;
            println!("\n=== Task {}: {} ===", presentation.task_id, presentation.title);
            println!("{}", presentation.description);
            print_frame(&presentation.frame);
            for (n, (kind, text)) in presentation.choices.iter().enumerate() {
                println!("  [{}] ({}) {}", n + 1, kind, text);
            }
            println!("(type 'reveal' or 'wait <ms>' before picking)");
        }
        Step::Limbo(diversion) => print_limbo(diversion),
        Step::Ended(ending) => print_ending(ending),
    }
}

fn print_frame(frame: &RenderFrame) {
    if frame.is_empty() {
        println!("  | (no visuals)");
        return;
    }
    for fragment in &frame.fragments {
        match fragment {
            Fragment::Line(line) => println!("  | {}", line),
            Fragment::Decoration(d) => println!(
                "  | <{} {} size={:.0} {} at {:.0}%,{:.0}%>",
                d.shape.class(),
                d.animation.class(),
                d.size,
                d.color(),
                d.left,
                d.top
            ),
            Fragment::Gauges(values) => {
                for value in values {
                    println!("  | {}", "#".repeat((*value / 5.0).round() as usize));
                }
            }
            Fragment::Grid(cells) => {
                for row in cells.chunks(8) {
                    let row: String = row
                        .iter()
                        .map(|cell| match cell {
                            CellKind::Corrupted => 'X',
                            CellKind::Fragment => '?',
                            CellKind::Empty => '.',
                        })
                        .collect();
                    println!("  | {}", row);
                }
            }
        }
    }
}

fn print_limbo(diversion: &LimboDiversion) {
    println!(
        "\n### LIMBO LOOP #{}: {} ###",
        diversion.loop_number,
        diversion.kind.title()
    );
    println!("{}", diversion.kind.prompt());
    if diversion.kind == LimboKind::RedactedLog {
        for (n, entry) in REDACTION_LOG.iter().enumerate() {
            println!("  {:>2}: {}", n, entry);
        }
    }
    if diversion.attempts > 0 {
        println!("  attempts: {}", diversion.attempts);
    }
    if !diversion.escape_unlocked {
        println!("  (something may unlock if you wait)");
    }
}

fn print_ending(ending: &Ending) {
    println!("\n*** {} ***", ending.content.title);
    for line in &ending.content.lines {
        println!("{}", line);
    }
    println!(
        "\nFinal score {:+} on the {} path after {} tasks and {} limbo loops.",
        ending.final_score, ending.path, ending.depth, ending.limbo_count
    );
}

fn print_usage() {
    println!("Usage: preview [--catalog <path>] [--endings <path>] [--pools <path>]");
    println!("               [--config <path>] [--seed <n>]");
}

fn print_help() {
    println!("Commands:");
    println!("  pick <n>              select choice n (1-based)");
    println!("  reveal                finish the current reveal");
    println!("  wait <ms>             advance logical time");
    println!("  limbo <action> [args] act inside a limbo diversion (see 'limbo')");
    println!("  auto <path>           play to the end favoring power, humanity or bliss");
    println!("  status                show the session");
    println!("  seed <n>              restart with a new seed");
    println!("  quit                  exit");
}

fn print_limbo_help() {
    println!("Limbo actions:");
    println!("  toggle <square>       captcha: toggle square 0-8");
    println!("  verify                captcha: verify the selection");
    println!("  human                 captcha: claim to be human");
    println!("  continue              waiting room: continue");
    println!("  drop                  file transfer: drop the file");
    println!("  compress              file transfer: compress instead");
    println!("  redact <entry> <word> redacted log: toggle one word");
    println!("  accept                redacted log: accept recommended redactions");
    println!("  submit                redacted log: submit");
}
