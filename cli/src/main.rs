//! rewire CLI — driving adapter for the rewire rule engine.
//!
//! Subcommands:
//! - `eval <config> [--method M] [--target /path?q=v] [--header k=v...] [--param k=v...]`
//!   — evaluate a rule config against a request
//! - `check <config>` — validate that a config loads without errors
//! - `info` — print registered type URLs

use std::path::Path;
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand};
use rewire::{Registry, RuleSet, RuleSetConfig};
use rewire_http::HttpRequest;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "rewire")]
#[command(about = "Evaluate rewrite rule configs against HTTP requests", long_about = None)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Evaluate a config against a request
    Eval(EvalArgs),
    /// Validate that a config loads
    Check {
        /// Rule config file (.yaml, .yml or .json)
        config: String,
    },
    /// Print registered type URLs
    Info,
}

#[derive(Debug, Args)]
struct EvalArgs {
    /// Rule config file (.yaml, .yml or .json)
    config: String,

    /// Request method
    #[arg(short, long, default_value = "GET")]
    method: String,

    /// Request target: path with optional query string
    #[arg(short, long, default_value = "/")]
    target: String,

    /// Request header as name=value (repeatable)
    #[arg(short = 'H', long = "header", value_parser = parse_pair)]
    headers: Vec<(String, String)>,

    /// Request parameter as name=value (repeatable)
    #[arg(short, long = "param", value_parser = parse_pair)]
    params: Vec<(String, String)>,

    /// Report every matching rule instead of the first
    #[arg(long)]
    all: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Eval(args) => cmd_eval(&args),
        Command::Check { config } => cmd_check(&config),
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

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "rewire=debug,rewire_cli=debug",
        _ => "rewire=trace,rewire_cli=trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_eval(args: &EvalArgs) -> Result<(), String> {
    let rules = load_rules(&args.config)?;
    let request = build_request(args);
    tracing::debug!(method = %request.method(), path = %request.path(), "evaluating");

    let mut store = rewire::ParameterStore::new();
    let outcomes = if args.all {
        rules.evaluate_all(&request, &mut store)
    } else {
        rules.evaluate_with(&request, &mut store).into_iter().collect()
    };

    for fault in store.take_faults() {
        eprintln!("warning: {fault}");
    }
    if outcomes.is_empty() {
        println!("(no match)");
    }
    for outcome in outcomes {
        println!("{} -> {}", outcome.rule_id, outcome.action);
        for (name, values) in outcome.bindings.iter() {
            println!("  {name} = {}", values.join(", "));
        }
    }
    Ok(())
}

fn cmd_check(path: &str) -> Result<(), String> {
    let rules = load_rules(path)?;
    println!("Config valid ({} rules)", rules.len());
    Ok(())
}

fn cmd_info() {
    let registry = build_registry();

    println!("Registered inputs:");
    for url in registry.input_type_urls() {
        println!("  {url}");
    }

    println!("\nRegistered sources:");
    for url in registry.source_type_urls() {
        println!("  {url}");
    }

    println!("\nRegistered transposers:");
    for url in registry.transposer_type_urls() {
        println!("  {url}");
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry assembly (composition root)
// ═══════════════════════════════════════════════════════════════════════════════

fn build_registry() -> Registry<HttpRequest> {
    rewire_http::register(rewire::RegistryBuilder::new()).build()
}

fn build_request(args: &EvalArgs) -> HttpRequest {
    let mut builder = HttpRequest::builder()
        .method(&args.method)
        .target(&args.target);
    for (name, value) in &args.headers {
        builder = builder.header(name, value);
    }
    for (name, value) in &args.params {
        builder = builder.parameter(name, value);
    }
    builder.build()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Config loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_config(path: &str) -> Result<RuleSetConfig<String>, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{path}\": {e}"))?;

    let is_json = Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content).map_err(|e| format!("JSON parse error: {e}"))
    } else {
        // Default to YAML (handles .yaml and .yml)
        serde_yaml::from_str(&content).map_err(|e| format!("YAML parse error: {e}"))
    }
}

fn load_rules(path: &str) -> Result<RuleSet<HttpRequest, String>, String> {
    let config = load_config(path)?;
    build_registry()
        .load_rules(config)
        .map_err(|e| format!("config invalid: {e}"))
}

fn parse_pair(pair: &str) -> Result<(String, String), String> {
    let (name, value) = pair
        .split_once('=')
        .ok_or_else(|| format!("invalid pair \"{pair}\", expected name=value"))?;
    Ok((name.to_owned(), value.to_owned()))
}
