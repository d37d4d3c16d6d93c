//! Cryptic Tutor CLI
//!
//! Usage:
//!   cryptic-tutor [OPTIONS] validate <FILE>...
//!   cryptic-tutor [OPTIONS] play <CLUE>
//!   cryptic-tutor [OPTIONS] show <CLUE> [--reveal]
//!
//! Options:
//!   -t, --templates <FILE>       Custom template catalog (TOML)
//!   -a, --abbreviations <FILE>   Extra abbreviations merged into the built-in table (TOML)
//!   -c, --clue-dir <DIR>         Treat CLUE as a key looked up in this directory
//!       --strict                 Refuse clues with validator warnings
//!       --json                   Print reports and snapshots as JSON
//!   -v, --verbose...             More logging (repeat for more)
//!       --log-format <FORMAT>    pretty, compact or json

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use cryptic_tutor::logging::{init_logging, LogConfig, LogFormat};
use cryptic_tutor::session::{FragmentStatus, StepStatus};
use cryptic_tutor::{
    AbbreviationTable, ClueDefinition, ClueSource, DirectoryClueSource, Outcome, Session, Snapshot,
    Submission, TemplateRegistry, Tutor, TutorConfig, TutorError, UiAction,
};

#[derive(Parser)]
#[command(name = "cryptic-tutor")]
#[command(about = "Step-by-step tutor for cryptic crossword clues")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Custom template catalog (TOML format)
    #[arg(short, long, global = true)]
    templates: Option<PathBuf>,

    /// Extra abbreviations merged into the built-in table (TOML format)
    #[arg(short, long, global = true)]
    abbreviations: Option<PathBuf>,

    /// Treat CLUE arguments as keys looked up in this directory
    #[arg(short, long, global = true)]
    clue_dir: Option<PathBuf>,

    /// Refuse to start sessions on clues with validator warnings
    #[arg(long, global = true)]
    strict: bool,

    /// Print reports and snapshots as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format: pretty, compact or json
    #[arg(long, default_value = "pretty", global = true)]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Command {
    /// Check clue annotations; exits with status 1 if any clue has errors
    Validate {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Work through a clue interactively on stdin
    Play { clue: String },
    /// Print the opening snapshot of a clue
    Show {
        clue: String,
        /// Reveal every step first
        #[arg(long)]
        reveal: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_verbosity(cli.verbose).with_format(cli.log_format));

    let tutor = Tutor::new(load_config(&cli));

    let result = match &cli.command {
        Command::Validate { files } => run_validate(&tutor, files, cli.json),
        Command::Play { clue } => {
            let clue = load_clue(&cli, clue);
            run_play(&tutor, clue, cli.json)
        }
        Command::Show { clue, reveal } => {
            let clue = load_clue(&cli, clue);
            run_show(&tutor, clue, *reveal, cli.json)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            if let TutorError::Data { report, .. } = &e {
                for warning in report.warnings() {
                    eprintln!("  warning: {}", warning);
                }
            }
            std::process::exit(1);
        }
    }
}

fn load_config(cli: &Cli) -> TutorConfig {
    let mut config = TutorConfig::new().with_strict_warnings(cli.strict);

    if let Some(path) = &cli.templates {
        match TemplateRegistry::from_file(path) {
            Ok(templates) => config = config.with_templates(templates),
            Err(e) => {
                eprintln!("Error loading templates '{}':", path.display());
                eprintln!("{}", e.format(&path.display().to_string()));
                std::process::exit(1);
            }
        }
    }

    if let Some(path) = &cli.abbreviations {
        match AbbreviationTable::from_file(path) {
            Ok(extra) => {
                let mut table = AbbreviationTable::default();
                table.extend(extra);
                config = config.with_abbreviations(table);
            }
            Err(e) => {
                eprintln!("Error loading abbreviations '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }

    config
}

fn load_clue(cli: &Cli, clue: &str) -> ClueDefinition {
    let loaded = match &cli.clue_dir {
        Some(dir) => DirectoryClueSource::new(dir).load(clue),
        None => ClueDefinition::from_file(Path::new(clue)),
    };
    match loaded {
        Ok(clue) => clue,
        Err(e) => {
            eprintln!("Error loading clue '{}': {}", clue, e);
            std::process::exit(1);
        }
    }
}

fn run_validate(tutor: &Tutor, files: &[PathBuf], json: bool) -> Result<bool, TutorError> {
    let mut all_ok = true;
    for path in files {
        let clue = match ClueDefinition::from_file(path) {
            Ok(clue) => clue,
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                all_ok = false;
                continue;
            }
        };
        let report = tutor.validate(&clue);
        all_ok &= !report.has_errors();

        if json {
            print_json(&report);
            continue;
        }
        let status = if report.has_errors() { "FAILED" } else { "ok" };
        println!("{}: {}", path.display(), status);
        for error in report.errors() {
            println!("  error: {}", error);
        }
        for warning in report.warnings() {
            println!("  warning: {}", warning);
        }
    }
    Ok(all_ok)
}

fn run_show(tutor: &Tutor, clue: ClueDefinition, reveal: bool, json: bool) -> Result<bool, TutorError> {
    let (mut session, mut snapshot) = tutor.start(clue)?;
    if reveal {
        snapshot = tutor.reveal(&mut session)?;
    }
    emit(&snapshot, json);
    Ok(true)
}

const PLAY_HELP: &str = "Commands:
  <n> [<n>...]        select clue words by index
  <text>              answer a choice step, or the combined answer
  f <n> <letters>     answer assembly fragment n
  hint                toggle the step hint
  hint <n>            toggle the hint for fragment n
  answer <letters>    check the final answer
  reveal              give up and show everything
  quit";

fn run_play(tutor: &Tutor, clue: ClueDefinition, json: bool) -> Result<bool, TutorError> {
    let (mut session, snapshot) = tutor.start(clue)?;
    emit(&snapshot, json);
    println!("{}", PLAY_HELP);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    // A clue without wordplay completes its steps before the answer is confirmed.
    while !(session.is_complete() && session.final_answer.is_some()) {
        print!("> ");
        let _ = io::stdout().flush();
        let Some(Ok(line)) = lines.next() else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" {
            return Ok(true);
        }
        match play_command(tutor, &mut session, line)? {
            Some(outcome) => {
                if !outcome.accepted {
                    println!("Not quite. Try again.");
                }
                emit(&outcome.snapshot, json);
            }
            None => println!("{}", PLAY_HELP),
        }
    }
    Ok(true)
}

/// Apply one line of input; `None` when it was not understood
fn play_command(tutor: &Tutor, session: &mut Session, line: &str) -> Result<Option<Outcome>, TutorError> {
    let mut parts = line.split_whitespace();
    let head = parts.next().unwrap_or_default();
    let rest: Vec<&str> = parts.collect();

    let shown = |snapshot: Snapshot| Outcome {
        accepted: true,
        snapshot,
    };

    let outcome = match (head, rest.as_slice()) {
        ("hint", []) => shown(tutor.update_ui(session, UiAction::ToggleHint)?),
        ("hint", [n]) => match n.parse() {
            Ok(n) => shown(tutor.update_ui(session, UiAction::ToggleFragmentHint(n))?),
            Err(_) => return Ok(None),
        },
        ("reveal", []) => shown(tutor.reveal(session)?),
        ("answer", letters) if !letters.is_empty() => tutor.check_final_answer(session, &letters.join(" "))?,
        ("f", [n, letters @ ..]) if !letters.is_empty() => match n.parse() {
            Ok(n) => tutor.submit_fragment(session, n, &letters.join(" "))?,
            Err(_) => return Ok(None),
        },
        _ => {
            let indices: Result<Vec<usize>, _> = line.split_whitespace().map(str::parse).collect();
            let submission = match indices {
                Ok(indices) => Submission::Indices(indices),
                Err(_) => Submission::Text(line.to_string()),
            };
            tutor.submit(session, submission)?
        }
    };
    Ok(Some(outcome))
}

fn emit(snapshot: &Snapshot, json: bool) {
    if json {
        print_json(snapshot);
    } else {
        print_snapshot(snapshot);
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Error encoding JSON: {}", e),
    }
}

fn print_snapshot(snapshot: &Snapshot) {
    let clue: Vec<String> = snapshot
        .words
        .iter()
        .enumerate()
        .map(|(i, w)| format!("{}:{}", i, w))
        .collect();
    println!();
    println!("{} ({})", clue.join(" "), snapshot.enumeration);

    for step in &snapshot.steps {
        let marker = match step.status {
            StepStatus::Completed => "[x]",
            StepStatus::Active => "[>]",
            StepStatus::Pending => "[ ]",
        };
        match &step.completion {
            Some(done) => println!("{} {} - {}", marker, step.title, done),
            None => println!("{} {}", marker, step.title),
        }
    }

    if let Some(active) = &snapshot.active {
        println!();
        if let Some(intro) = &active.intro {
            println!("{}", intro);
        }
        println!("{}", active.prompt);
        if !active.options.is_empty() {
            println!("Options: {}", active.options.join(" / "));
        }
        if active.hint_visible {
            println!("Hint: {}", active.hint);
        }
        if let Some(assembly) = &active.assembly {
            for fragment in &assembly.fragments {
                let result = match (&fragment.status, &fragment.result) {
                    (FragmentStatus::Solved, Some(letters)) => letters.clone(),
                    _ => "?".repeat(fragment.letter_count),
                };
                println!("  f {}: {} [{}]", fragment.position, fragment.prompt, result);
                if fragment.hint_visible {
                    println!("       hint: {}", fragment.hint);
                }
            }
            println!("  {}", assembly.partial);
        }
    }

    if let Some(answer) = &snapshot.answer {
        println!();
        println!("Answer: {}", answer);
    }
}
