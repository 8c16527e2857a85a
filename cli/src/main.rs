//! tokre CLI: run token patterns loaded from JSON or YAML files.
//!
//! Subcommands:
//! - `match <pattern> <input> [--words] [--joined] [--max-frontier N] [--trace]`:
//!   print every match of the whole input as JSON
//! - `check <pattern>`: validate that a pattern loads and compiles
//! - `info`: print registered matcher type URLs

use std::path::Path;
use std::process;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tokre::{JoinTrail, Limits, PatternConfig, Program, Registry, RunTrace};

#[derive(Parser)]
#[command(name = "tokre")]
#[command(about = "Regular expressions over token sequences")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every way the input matches the pattern
    Match(MatchArgs),
    /// Validate a pattern file
    Check {
        /// Pattern file (.json, or YAML otherwise)
        pattern: String,
        /// Load the pattern for word tokens instead of characters
        #[arg(long)]
        words: bool,
    },
    /// Print registered matcher type URLs
    Info,
}

#[derive(Args)]
struct MatchArgs {
    /// Pattern file (.json, or YAML otherwise)
    pattern: String,
    /// Input text
    input: String,
    /// Split the input on whitespace instead of into characters
    #[arg(long)]
    words: bool,
    /// Print trails as joined strings instead of token lists
    #[arg(long)]
    joined: bool,
    /// Abort when more than this many partial matches are alive
    #[arg(long)]
    max_frontier: Option<usize>,
    /// Print per-token frontier statistics instead of matches
    #[arg(long)]
    trace: bool,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Match(args) => cmd_match(&args),
        Command::Check { pattern, words } => cmd_check(&pattern, words),
        Command::Info => {
            cmd_info();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_match(args: &MatchArgs) -> Result<(), String> {
    let config = load_config(&args.pattern)?;
    let limits = args
        .max_frontier
        .map_or_else(Limits::default, |max| Limits::default().with_max_frontier(max));

    let output = if args.words {
        let tokens: Vec<String> = args.input.split_whitespace().map(str::to_owned).collect();
        let program = compile(&tokre_test::word_registry(), &config)?.with_limits(limits);
        render(&program, &tokens, args)?
    } else {
        let tokens: Vec<char> = args.input.chars().collect();
        let program = compile(&tokre_test::char_registry(), &config)?.with_limits(limits);
        render(&program, &tokens, args)?
    };

    println!("{output}");
    Ok(())
}

fn cmd_check(path: &str, words: bool) -> Result<(), String> {
    let config = load_config(path)?;
    let nodes = if words {
        compile(&tokre_test::word_registry(), &config)?.graph().node_count()
    } else {
        compile(&tokre_test::char_registry(), &config)?.graph().node_count()
    };

    println!("Pattern valid ({nodes} graph nodes)");
    Ok(())
}

fn cmd_info() {
    println!("Char matchers:");
    for url in tokre_test::char_registry().type_urls() {
        println!("  {url}");
    }

    println!("\nWord matchers:");
    for url in tokre_test::word_registry().type_urls() {
        println!("  {url}");
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Matching
// ═══════════════════════════════════════════════════════════════════════════════

fn compile<Tok: Clone + 'static>(
    registry: &Registry<Tok>,
    config: &PatternConfig,
) -> Result<Program<Tok>, String> {
    let expr = registry
        .load_pattern(config)
        .map_err(|e| format!("pattern invalid: {e}"))?;
    Ok(Program::compile(&expr))
}

fn render<Tok>(program: &Program<Tok>, tokens: &[Tok], args: &MatchArgs) -> Result<String, String>
where
    Tok: JoinTrail + Clone + Serialize,
    Tok::Joined: Serialize,
{
    if args.trace {
        return Ok(format_trace(&program.trace(tokens)));
    }

    let json = if args.joined {
        let found = program.matches_joined(tokens).map_err(|e| e.to_string())?;
        serde_json::to_string_pretty(&found)
    } else {
        let found = program.matches(tokens).map_err(|e| e.to_string())?;
        serde_json::to_string_pretty(&found)
    };
    json.map_err(|e| format!("failed to serialize matches: {e}"))
}

fn format_trace(trace: &RunTrace) -> String {
    let mut lines = vec!["position  before  tried  after".to_owned()];
    for step in &trace.steps {
        lines.push(format!(
            "{:>8}  {:>6}  {:>5}  {:>5}",
            step.position, step.frontier_before, step.edges_tried, step.frontier_after
        ));
    }
    lines.push(format!(
        "accepted {} (peak frontier {})",
        trace.accepted,
        trace.peak_frontier()
    ));
    if let Some(position) = trace.halted_at {
        lines.push(format!("halted after {position} tokens"));
    }
    if let Some(error) = &trace.error {
        lines.push(format!("error: {error}"));
    }
    lines.join("\n")
}

// ═══════════════════════════════════════════════════════════════════════════════
// Config loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_config(path: &str) -> Result<PatternConfig, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{path}\": {e}"))?;
    parse_config(&content, is_json(path))
}

fn is_json(path: &str) -> bool {
    Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn parse_config(content: &str, json: bool) -> Result<PatternConfig, String> {
    if json {
        serde_json::from_str(content).map_err(|e| format!("JSON parse error: {e}"))
    } else {
        // Default to YAML (handles .yaml and .yml)
        serde_yaml::from_str(content).map_err(|e| format!("YAML parse error: {e}"))
    }
}
