use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use layer_obfuscator::config::load_config;
use layer_obfuscator::errors::AppError;
use layer_obfuscator::logger;
use layer_obfuscator::metrics::Metrics;
use layer_obfuscator::pipeline::{Direction, Pipeline};
use prometheus::{Registry, TextEncoder};
use tokio::io::{AsyncBufRead, AsyncReadExt, AsyncWrite, BufReader};
use tracing::{debug, error, info};

/// Prefix the result pane used for failures; kept so callers can tell an
/// error apart from output.
const ERROR_PREFIX: &str = "OBFUSCATION ERROR:";

#[derive(Parser)]
#[command(name = "layer-obfuscator", version)]
#[command(about = "Reversible nine-layer text obfuscation")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON, YAML or TOML file overriding the built-in constants
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run text through every layer in order
    Encode(RunArgs),
    /// Undo the layers in reverse order
    Decode(RunArgs),
    /// Print the resolved layer sequence as JSON
    Layers,
    /// Print the effective configuration as YAML
    ShowConfig,
}

#[derive(Args)]
struct RunArgs {
    #[arg(short, long, conflicts_with = "input")]
    text: Option<String>,

    /// Read from a file instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Treat every line as a separate input
    #[arg(long, conflicts_with = "text")]
    lines: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init_logging(cli.json_logs);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("{} {}", ERROR_PREFIX, e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let cfg = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Encode(args) => transform(Pipeline::new(cfg)?, args, Direction::Encode).await,
        Command::Decode(args) => transform(Pipeline::new(cfg)?, args, Direction::Decode).await,
        Command::Layers => {
            let pipeline = Pipeline::new(cfg)?;
            let names: Vec<&str> = pipeline.layers().iter().map(|l| l.name()).collect();
            let rendered = serde_json::to_string_pretty(&names)
                .map_err(|e| AppError::Other(e.to_string()))?;
            println!("{}", rendered);
            Ok(())
        }
        Command::ShowConfig => {
            print!("{}", serde_yaml::to_string(&cfg)?);
            Ok(())
        }
    }
}

async fn transform(pipeline: Pipeline, args: RunArgs, direction: Direction) -> Result<(), AppError> {
    let registry = Registry::new();
    let metrics = Metrics::new(&registry)?;

    let result = if args.lines {
        let reader = open_reader(args.input.as_deref()).await?;
        let writer = open_writer(args.output.as_deref()).await?;
        let result = pipeline.run_stream(reader, writer, direction).await;
        if let Ok(count) = &result {
            info!(lines = count, %direction, "stream processed");
        }
        result.map(|_| ())
    } else {
        let text = match args.text {
            Some(text) => text,
            None => read_input(args.input.as_deref()).await?,
        };
        let result = pipeline.run(&text, direction);
        if let Ok(out) = &result {
            write_output(args.output.as_deref(), out).await?;
        }
        result.map(|_| ())
    };

    metrics.record(direction, &result);
    if let Ok(dump) = TextEncoder::new().encode_to_string(&registry.gather()) {
        debug!(metrics = %dump, "run metrics");
    }
    Ok(result?)
}

async fn read_input(path: Option<&Path>) -> Result<String, AppError> {
    let mut raw = String::new();
    match path {
        Some(path) => {
            info!("Reading input from {}", path.display());
            raw = tokio::fs::read_to_string(path).await?;
        }
        None => {
            tokio::io::stdin().read_to_string(&mut raw).await?;
        }
    }
    // a single trailing newline comes from the shell or editor, not the payload
    if raw.ends_with('\n') {
        raw.pop();
        if raw.ends_with('\r') {
            raw.pop();
        }
    }
    Ok(raw)
}

async fn write_output(path: Option<&Path>, out: &str) -> Result<(), AppError> {
    match path {
        Some(path) => {
            tokio::fs::write(path, format!("{}\n", out)).await?;
            info!("Wrote result to {}", path.display());
        }
        None => println!("{}", out),
    }
    Ok(())
}

async fn open_reader(path: Option<&Path>) -> Result<Box<dyn AsyncBufRead + Unpin + Send>, AppError> {
    Ok(match path {
        Some(path) => Box::new(BufReader::new(tokio::fs::File::open(path).await?)),
        None => Box::new(BufReader::new(tokio::io::stdin())),
    })
}

async fn open_writer(path: Option<&Path>) -> Result<Box<dyn AsyncWrite + Unpin + Send>, AppError> {
    Ok(match path {
        Some(path) => Box::new(tokio::fs::File::create(path).await?),
        None => Box::new(tokio::io::stdout()),
    })
}
