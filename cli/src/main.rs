//! gauntlet — command-line front end for challenge descriptions.
//!
//! Loads a TOML challenge description and either validates it, prints its
//! dependency graph, computes the next steps for a status snapshot, or drives
//! a simulated submission to completion.
//!
//! Usage:
//!   gauntlet validate challenges/two_stage.toml
//!   gauntlet graph challenges/two_stage.toml
//!   gauntlet next challenges/two_stage.toml --status '{"a": "success"}'
//!   gauntlet simulate challenges/two_stage.toml --set build=host-error,success

mod simulate;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gauntlet_challenge::ChallengeDescription;
use gauntlet_contracts::{
    error::{GauntletError, GauntletResult},
    status::JobStatus,
    transition::{AgeMap, RawStatus, START},
};
use gauntlet_core::{sanitize::dropped_entries, NextStepsEngine};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Step-transition engine for submission evaluation pipelines.
#[derive(Parser)]
#[command(
    name = "gauntlet",
    about = "Validate and drive gauntlet challenge descriptions",
    long_about = "Loads a TOML challenge description and decides, for a given\n\
                  status snapshot, which evaluation steps must run next."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a challenge file and report whether it is valid.
    Validate {
        /// Path to the challenge TOML file.
        challenge: PathBuf,
    },
    /// Print every step with the steps it depends on.
    Graph {
        challenge: PathBuf,
    },
    /// Decide the next steps for a status snapshot and print the decision as JSON.
    Next {
        challenge: PathBuf,
        /// Status snapshot: inline JSON object or path to a JSON file.
        /// `START: success` is added when absent.
        #[arg(long, default_value = "{}")]
        status: String,
        /// Optional step ages: inline JSON object or path to a JSON file.
        #[arg(long)]
        ages: Option<String>,
        /// Also list the snapshot entries that were ignored.
        #[arg(long)]
        explain: bool,
    },
    /// Run a submission to completion with scripted step results.
    Simulate {
        challenge: PathBuf,
        /// Scripted results as `step=status[,status...]`. Each activation of
        /// the step consumes the next status; the last one repeats.
        /// Unscripted steps succeed.
        #[arg(long = "set", value_name = "STEP=STATUS")]
        script: Vec<String>,
        /// Give up after this many polling ticks.
        #[arg(long, default_value_t = 50)]
        max_ticks: u32,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Validate { challenge } => run_validate(&challenge),
        Command::Graph { challenge } => run_graph(&challenge),
        Command::Next {
            challenge,
            status,
            ages,
            explain,
        } => run_next(&challenge, &status, ages.as_deref(), explain),
        Command::Simulate {
            challenge,
            script,
            max_ticks,
        } => run_simulate(&challenge, &script, max_ticks),
    };

    if let Err(e) = result {
        eprintln!("gauntlet: {}", e);
        std::process::exit(1);
    }
}

// ── Subcommands ───────────────────────────────────────────────────────────────

fn run_validate(path: &Path) -> GauntletResult<()> {
    let challenge = ChallengeDescription::from_file(path)?;
    println!(
        "{}: ok ({} steps, {} transitions)",
        challenge.name(),
        challenge.steps().len(),
        challenge.transitions().transitions().len()
    );
    Ok(())
}

fn run_graph(path: &Path) -> GauntletResult<()> {
    let challenge = ChallengeDescription::from_file(path)?;
    println!("{}", challenge.name());
    if let Some(description) = challenge.description() {
        println!("  {}", description);
    }
    println!();

    for (from, to) in challenge.transitions().graph().edges() {
        println!("  {} -> {}", from, to);
    }
    println!();

    for step in challenge.steps() {
        let ancestors: Vec<String> = challenge.ancestors_of(step).into_iter().collect();
        println!("  {} <- [{}]", step, ancestors.join(", "));
    }
    Ok(())
}

fn run_next(path: &Path, status: &str, ages: Option<&str>, explain: bool) -> GauntletResult<()> {
    let challenge = ChallengeDescription::from_file(path)?;

    let mut raw: RawStatus = read_json_map(status, "status")?;
    raw.entry(START.to_string())
        .or_insert_with(|| JobStatus::Success.to_string());

    let decision = match ages {
        Some(ages) => {
            let ages: AgeMap = read_json_map(ages, "ages")?;
            challenge.get_next_steps_with_ages(&raw, &ages)?
        }
        None => challenge.get_next_steps(&raw)?,
    };

    if explain {
        for (step, value, reason) in dropped_entries(challenge.transitions(), &raw) {
            eprintln!("ignored {}={} ({:?})", step, value, reason);
        }
    }

    let rendered =
        serde_json::to_string_pretty(&decision).unwrap_or_else(|_| format!("{:?}", decision));
    println!("{}", rendered);
    Ok(())
}

fn run_simulate(path: &Path, script: &[String], max_ticks: u32) -> GauntletResult<()> {
    let challenge = ChallengeDescription::from_file(path)?;
    let script = simulate::Script::parse(script)?;
    let report = simulate::run(&challenge, script, max_ticks)?;

    for line in &report.ticks {
        println!("{}", line);
    }
    match report.outcome {
        Some(outcome) => println!("{}: {}", challenge.name(), outcome),
        None => println!("{}: incomplete ({})", challenge.name(), report.stop_reason),
    }
    Ok(())
}

// ── Input helpers ─────────────────────────────────────────────────────────────

/// Parse `source` as an inline JSON object, or read it as a JSON file.
fn read_json_map<T: serde::de::DeserializeOwned>(source: &str, what: &str) -> GauntletResult<T> {
    let trimmed = source.trim_start();
    let text = if trimmed.starts_with('{') {
        source.to_string()
    } else {
        std::fs::read_to_string(source).map_err(|e| GauntletError::Io {
            reason: format!("failed to read {} file '{}': {}", what, source, e),
        })?
    };
    serde_json::from_str(&text).map_err(|e| GauntletError::InvalidSnapshot {
        reason: format!("failed to parse {} JSON: {}", what, e),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("gauntlet-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn inline_status_is_parsed() {
        let raw: RawStatus = read_json_map(r#" {"a": "success", "b": "queued"}"#, "status").unwrap();
        assert_eq!(raw.get("a").map(String::as_str), Some("success"));
        assert_eq!(raw.len(), 2);
    }

    #[test]
    fn ages_are_read_from_a_file() {
        let path = temp_file("ages.json", r#"{"a": 5, "b": 3}"#);
        let ages: GauntletResult<AgeMap> = read_json_map(path.to_str().unwrap(), "ages");
        std::fs::remove_file(&path).unwrap();

        let ages = ages.unwrap();
        assert_eq!(ages.get("a"), Some(&5));
        assert_eq!(ages.get("b"), Some(&3));
    }

    #[test]
    fn malformed_json_is_invalid_snapshot() {
        match read_json_map::<AgeMap>(r#"{"a": "five"}"#, "ages") {
            Err(GauntletError::InvalidSnapshot { reason }) => {
                assert!(reason.contains("failed to parse ages JSON"), "got: {reason}");
            }
            other => panic!("expected InvalidSnapshot, got {:?}", other),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = read_json_map::<RawStatus>("/nonexistent/status.json", "status");
        match result {
            Err(GauntletError::Io { reason }) => {
                assert!(reason.contains("failed to read status file"), "got: {reason}");
            }
            other => panic!("expected Io error, got {:?}", other),
        }
    }
}
