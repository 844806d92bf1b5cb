//! Quill CLI - Command-line interface
//!
//! Usage:
//!   quill analyze [PATH|-] [--format json|summary]
//!   quill import PATH --novel UUID --store FILE [--only characters,places]
//!   quill list --novel UUID --store FILE [--kind place]

use std::fmt::Write as _;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use quill_analyzer::{
    AnalysisResult, ElementImporter, ImportReport, ImportSelection, TextAnalyzer,
};
use quill_core::config::AppConfig;
use quill_core::{ElementKind, FileStore, StoryElement, StoryStore};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "Find characters, places, events and items in fiction")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a chapter and print what was found
    Analyze {
        /// Chapter file, or "-" for stdin
        #[arg(default_value = "-")]
        path: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Analyze a chapter and store its elements for a novel
    Import {
        /// Chapter file, or "-" for stdin
        path: String,

        /// Novel the elements belong to
        #[arg(long)]
        novel: Uuid,

        /// JSON store file (defaults to QUILL_STORE_PATH)
        #[arg(long)]
        store: Option<PathBuf>,

        /// Only import these kinds, comma-separated
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,
    },
    /// List a novel's stored elements
    List {
        /// Novel to list
        #[arg(long)]
        novel: Uuid,

        /// JSON store file (defaults to QUILL_STORE_PATH)
        #[arg(long)]
        store: Option<PathBuf>,

        /// Only list this kind
        #[arg(long)]
        kind: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Summary,
}

fn load_config() -> anyhow::Result<AppConfig> {
    match std::env::var("QUILL_CONFIG") {
        Ok(path) => Ok(AppConfig::from_file(&path)
            .with_context(|| format!("failed to load config from {path}"))?
            .with_env_override()?),
        Err(_) => Ok(AppConfig::from_env()?),
    }
}

fn read_input(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))
}

fn read_chapter(path: &str, config: &AppConfig) -> anyhow::Result<String> {
    let text = read_input(path)?;
    let max = config.analyzer.max_input_chars;
    if text.chars().count() > max {
        bail!("{path} is longer than {max} characters");
    }
    Ok(text)
}

async fn open_store(
    store: Option<PathBuf>,
    config: &AppConfig,
) -> anyhow::Result<Arc<FileStore>> {
    let Some(path) = store.or_else(|| config.storage.path.clone()) else {
        bail!("no store file given; pass --store or set QUILL_STORE_PATH");
    };
    let store = FileStore::open(&path)
        .await
        .with_context(|| format!("failed to open store at {}", path.display()))?;
    tracing::debug!(path = %path.display(), "opened store");
    Ok(Arc::new(store))
}

fn render_summary(result: &AnalysisResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Characters ({})", result.characters.len());
    for character in &result.characters {
        let _ = writeln!(
            out,
            "  {} ({} lines, {} actions)",
            character.name,
            character.dialogues.len(),
            character.actions.len()
        );
    }
    let _ = writeln!(out, "Places ({})", result.places.len());
    for place in &result.places {
        let _ = writeln!(out, "  {}", place.name);
    }
    let _ = writeln!(out, "Events ({})", result.events.len());
    for event in &result.events {
        let _ = writeln!(out, "  [{}] {}", event.importance, event.text);
    }
    let _ = writeln!(out, "Items ({})", result.items.len());
    for item in &result.items {
        let _ = writeln!(out, "  {}", item.name);
    }
    out
}

fn parse_kinds(values: &[String]) -> anyhow::Result<Vec<ElementKind>> {
    values
        .iter()
        .map(|v| v.parse::<ElementKind>().map_err(anyhow::Error::from))
        .collect()
}

/// Analyze a chapter and render it in `format`
fn analyze_chapter(
    path: &str,
    format: OutputFormat,
    config: &AppConfig,
    analyzer: &TextAnalyzer,
) -> anyhow::Result<String> {
    let result = analyzer.analyze(&read_chapter(path, config)?);
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&result)?,
        OutputFormat::Summary => render_summary(&result),
    })
}

/// Analyze a chapter and store the selected kinds for `novel`
async fn import_chapter(
    path: &str,
    novel: Uuid,
    store: Option<PathBuf>,
    only: &[String],
    config: &AppConfig,
    analyzer: &TextAnalyzer,
) -> anyhow::Result<(PathBuf, ImportReport)> {
    let selection = if only.is_empty() {
        ImportSelection::all()
    } else {
        ImportSelection::only_kinds(&parse_kinds(only)?)
    };
    let store = open_store(store, config).await?;
    let text = read_chapter(path, config)?;
    let result = analyzer.analyze(&text);

    let report = ElementImporter::new(store.clone())
        .import(novel, &result, &selection)
        .await;
    Ok((store.path().to_path_buf(), report))
}

/// Stored elements of `novel`, optionally of one kind
async fn list_novel(
    novel: Uuid,
    store: Option<PathBuf>,
    kind: Option<&str>,
    config: &AppConfig,
) -> anyhow::Result<Vec<StoryElement>> {
    let kind = kind.map(str::parse::<ElementKind>).transpose()?;
    let store = open_store(store, config).await?;
    Ok(store.list_elements(novel, kind).await?)
}

/// Crates whose logs follow `logging.level` when `RUST_LOG` is unset
const LOG_TARGETS: &[&str] = &["quill", "quill_core", "quill_analyzer"];

fn init_tracing(config: &AppConfig) -> anyhow::Result<()> {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => tracing_subscriber::EnvFilter::try_new(
            config.logging.filter_directives(LOG_TARGETS),
        )
        .with_context(|| format!("invalid log level {:?}", config.logging.level))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config()?;
    init_tracing(&config)?;
    let analyzer = TextAnalyzer::with_config(&config.analyzer);

    match cli.command {
        Commands::Analyze { path, format } => {
            print!("{}", analyze_chapter(&path, format, &config, &analyzer)?);
            if matches!(format, OutputFormat::Json) {
                println!();
            }
        }
        Commands::Import {
            path,
            novel,
            store,
            only,
        } => {
            let (store_path, report) =
                import_chapter(&path, novel, store, &only, &config, &analyzer).await?;

            println!(
                "Imported into {}: {} created, {} updated, {} unchanged",
                store_path.display(),
                report.created,
                report.updated,
                report.unchanged
            );
            for failure in &report.failures {
                eprintln!("  failed {} {}: {}", failure.kind, failure.name, failure.error);
            }
            if !report.failures.is_empty() {
                bail!("{} elements failed to import", report.failures.len());
            }
        }
        Commands::List { novel, store, kind } => {
            let elements = list_novel(novel, store, kind.as_deref(), &config).await?;
            if elements.is_empty() {
                println!("No elements stored for {novel}");
            }
            for element in elements {
                println!("{:<9} {}  {}", element.kind.as_str(), element.id, element.name);
            }
        }
    }

    Ok(())
}
