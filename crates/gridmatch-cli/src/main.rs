//! GridMatch script runner
//!
//! Runs a script of `invoke` / `query` calls against a fresh in-memory
//! market and prints each query payload on its own line.
//!
//! # Usage
//!
//! ```bash
//! # Run a script with a 10% exchange fee
//! gridmatch --fee-rate 0.1 day.gm
//!
//! # Read the script from stdin, JSON logs, dump the final ledger
//! gridmatch --fee-rate 0.1 --log-format json --dump-state - < day.gm
//!
//! # Market limits from a JSON file
//! gridmatch --fee-rate 0.05 --config market.json day.gm
//! ```

mod script;

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use gridmatch_ledger::MemoryStore;
use gridmatch_market::Market;
use gridmatch_types::{MarketConfig, constants};

use crate::script::{Command, Kind};

// =============================================================================
// CLI Arguments
// =============================================================================

/// GridMatch - peer-to-peer energy market script runner
#[derive(Parser, Debug)]
#[command(name = "gridmatch")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Exchange fee rate passed to `init`
    #[arg(long, env = "GRIDMATCH_FEE_RATE")]
    fee_rate: String,

    /// Path to a JSON market configuration
    #[arg(short, long, env = "GRIDMATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "GRIDMATCH_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log format (json, pretty)
    #[arg(long, env = "GRIDMATCH_LOG_FORMAT", default_value = "pretty")]
    log_format: String,

    /// Print the final store contents as JSON after the script completes
    #[arg(long)]
    dump_state: bool,

    /// Script file, or `-` for stdin
    script: PathBuf,
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, &args.log_format);

    let config = load_config(args.config.as_deref())?;
    let source = read_script(&args.script)?;
    let commands = script::parse(&source)?;

    tracing::info!(
        engine = constants::ENGINE_NAME,
        version = constants::VERSION,
        commands = commands.len(),
        validate_inputs = config.validate_inputs,
        max_accounts = config.max_accounts,
        "Starting script"
    );

    let mut market = Market::new(MemoryStore::new(), config)?;
    market
        .init(&[args.fee_rate.as_str()])
        .context("init failed")?;

    for command in &commands {
        let payload = run(&mut market, command).with_context(|| {
            format!(
                "line {}: {} {} failed",
                command.line,
                verb(command.kind),
                command.function
            )
        })?;
        if !payload.is_empty() {
            println!("{}", String::from_utf8_lossy(&payload));
        }
    }

    if args.dump_state {
        println!("{}", serde_json::to_string_pretty(&market.store().dump())?);
    }

    tracing::info!(commits = market.store().commit_count(), "Script complete");
    Ok(())
}

fn run(market: &mut Market<MemoryStore>, command: &Command) -> gridmatch_types::Result<Vec<u8>> {
    match command.kind {
        Kind::Invoke => market.invoke(&command.function, command.args.as_slice()),
        Kind::Query => market.query(&command.function, command.args.as_slice()),
    }
}

fn verb(kind: Kind) -> &'static str {
    match kind {
        Kind::Invoke => "invoke",
        Kind::Query => "query",
    }
}

// =============================================================================
// Initialization Functions
// =============================================================================

/// Initialize tracing/logging. `RUST_LOG` wins over `--log-level`.
fn init_logging(level: &str, format: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    // Logs go to stderr so stdout carries only query payloads.
    match format {
        "json" => {
            subscriber
                .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            subscriber
                .with(fmt::layer().pretty().with_target(true).with_writer(std::io::stderr))
                .init();
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<MarketConfig> {
    let Some(path) = path else {
        return Ok(MarketConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = MarketConfig::from_json_str(&json)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}

fn read_script(path: &std::path::Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("reading script from stdin")?;
        return Ok(source);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading script {}", path.display()))
}
