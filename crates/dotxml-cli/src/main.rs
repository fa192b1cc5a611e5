use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use dotxml::{Node, Value};

#[derive(Debug, Parser)]
#[command(
    name = "dotxml",
    version,
    about = "Query XML documents with dotted paths"
)]
struct Args {
    /// More log output (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve paths such as `profile.message.point[1].name`
    Get {
        /// Input file (`-` for stdin)
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        /// One or more paths, printed one value per line
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<String>,
        /// Printed instead of missing or null values
        #[arg(short, long)]
        default: Option<String>,
    },
    /// Print the whole tree as JSON
    Dump {
        /// Input file (`-` for stdin)
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        /// Single-line output
        #[arg(long)]
        compact: bool,
    },
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();

    if let Err(e) = run(args.command) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    let mut out = io::stdout().lock();
    match command {
        Command::Get {
            input,
            paths,
            default,
        } => {
            let root = load(&input)?;
            let fallback = default.map(Value::from);
            for path in &paths {
                let value = match &fallback {
                    Some(fallback) => root.resolve_or(path, fallback),
                    None => match root.resolve(path) {
                        Some(value) => value,
                        None => bail!("path not found: {path}"),
                    },
                };
                writeln!(out, "{value}").context("failed to write stdout")?;
            }
        }
        Command::Dump { input, compact } => {
            let root = load(&input)?;
            let json = if compact {
                serde_json::to_string(&root)
            } else {
                serde_json::to_string_pretty(&root)
            }
            .context("failed to serialize tree")?;
            writeln!(out, "{json}").context("failed to write stdout")?;
        }
    }
    Ok(())
}

fn load(input: &Path) -> Result<Node> {
    let data = read_input(input)?;
    debug!(bytes = data.len(), "input read");
    dotxml::from_bytes(&data).with_context(|| format!("failed to parse {}", input.display()))
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .context("failed to read stdin")?;
        return Ok(buffer);
    }
    std::fs::read(path).with_context(|| format!("failed to read input file {}", path.display()))
}
