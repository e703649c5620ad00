mod app;

use aditamil::config::{load_config_from_file, API_KEY_ENV, DEFAULT_CONFIG_FILE};
use aditamil::model::GeminiClient;
use aditamil::report::{format_analysis, format_batch, format_lookup, format_route, render_highlighted};
use aditamil::AnnotationSession;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "aditamil", version, about = "Discover the Tamil roots in everyday language")]
struct Cli {
    /// TOML settings file; defaults apply when it does not exist
    #[arg(long, global = true, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Highlight words with Tamil origins in a text (argument, --file or stdin)
    Analyze {
        text: Option<String>,
        #[arg(long, value_name = "FILE", conflicts_with = "text")]
        file: Option<PathBuf>,
        /// Print the result and segments as JSON
        #[arg(long)]
        json: bool,
    },
    /// Detailed Tamil etymology of a single word
    Lookup {
        word: String,
        #[arg(long)]
        json: bool,
    },
    /// Analyze several texts, one per argument or per line of --file
    Batch {
        texts: Vec<String>,
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
    },
    /// Only words that reached the text through ROUTE (e.g. Portuguese, direct)
    ByRoute {
        route: String,
        text: Option<String>,
        #[arg(long, value_name = "FILE", conflicts_with = "text")]
        file: Option<PathBuf>,
    },
    /// Open the desktop window
    Gui,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,aditamil=info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config_from_file(&cli.config)?;
    let credential = config.model.resolve_credential(std::env::var(API_KEY_ENV).ok());
    let client = GeminiClient::from_config(&config.model)?;
    let session = AnnotationSession::new(client, credential, config.model.params());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    match cli.command {
        Command::Gui => app::run(runtime, session),
        command => runtime.block_on(run_command(command, session)),
    }
}

async fn run_command(command: Command, mut session: AnnotationSession<GeminiClient>) -> Result<()> {
    match command {
        Command::Analyze { text, file, json } => {
            let text = read_input(text, file.as_deref())?;
            let result = session.run_analysis(&text).await?;
            if json {
                let payload = json!({ "text": text, "result": result, "segments": session.segments() });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("{}\n", render_highlighted(session.segments()));
                print!("{}", format_analysis(&text, &result));
            }
        }
        Command::Lookup { word, json } => {
            let lookup = session.lookup(&word).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&lookup)?);
            } else {
                print!("{}", format_lookup(&lookup));
            }
        }
        Command::Batch { mut texts, file } => {
            if let Some(path) = file {
                texts.extend(read_lines(&path)?);
            }
            if texts.is_empty() {
                bail!("nothing to analyze: pass texts as arguments or use --file");
            }
            let results = session.run_batch(&texts).await;
            print!("{}", format_batch(&texts, &results));
        }
        Command::ByRoute { route, text, file } => {
            let text = read_input(text, file.as_deref())?;
            let result = session.run_route_analysis(&text, &route).await?;
            println!("{}\n", render_highlighted(session.segments()));
            print!("{}", format_route(&text, &route, &result));
        }
        Command::Gui => bail!("the desktop window must be opened from the main thread"),
    }
    Ok(())
}

fn read_input(text: Option<String>, file: Option<&Path>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()));
    }
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer).context("failed to read stdin")?;
    Ok(buffer)
}

/// Non-empty lines, skipping `#` comments.
fn read_lines(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}
