use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use rebus::config::Config;
use rebus::corpus::{build_phrases, load_relationships};
use rebus::eval::{evaluate, load_cases};
use rebus::oracle::{
    CachedVisualOracle, CommandCompletionClient, Lexicon, Oracles, PromptVisualOracle,
    VisualOracle, VisualWordList,
};
use rebus::Segmenter;

#[derive(Parser, Debug)]
#[command(name = "rebus")]
#[command(about = "Find drawable words hidden inside phrases")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan phrases and print one JSON puzzle per line
    Segment(SegmentArgs),
    /// Build phrases from a relationships JSON file
    Phrases(PhrasesArgs),
    /// Score the visual oracle against labelled words
    Eval(EvalArgs),
}

#[derive(Args, Debug)]
struct SegmentArgs {
    /// Phrases to scan
    phrases: Vec<String>,

    /// File with one phrase per line
    #[arg(long)]
    input: Option<PathBuf>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Lexicon JSON (words, senses, hypernyms)
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Newline-delimited list of drawable words
    #[arg(long, conflicts_with = "visual_command")]
    visual_words: Option<PathBuf>,

    /// Program (and arguments) that answers the visual prompt on stdout; put it last
    #[arg(long, num_args = 1.., allow_hyphen_values = true)]
    visual_command: Option<Vec<String>>,

    /// Shortest hidden word to report
    #[arg(long)]
    min_length: Option<usize>,

    /// Phrases scanned concurrently
    #[arg(long, default_value_t = 4)]
    concurrency: usize,
}

#[derive(Args, Debug)]
struct EvalArgs {
    /// Cases JSON (array of `{ "word": .., "expected": true|false }`)
    cases: PathBuf,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Newline-delimited list of drawable words
    #[arg(long, conflicts_with = "visual_command")]
    visual_words: Option<PathBuf>,

    /// Program (and arguments) that answers the visual prompt on stdout; put it last
    #[arg(long, num_args = 1.., allow_hyphen_values = true)]
    visual_command: Option<Vec<String>>,

    /// Words checked concurrently
    #[arg(long, default_value_t = 8)]
    concurrency: usize,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct PhrasesArgs {
    /// Relationships JSON (array of items with a `relationships` list)
    relationships: PathBuf,

    /// Lexicon JSON used to keep only real words
    #[arg(long)]
    lexicon: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // WHY: logs go to stderr as JSON so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    info!(?cli, "Parsed CLI arguments");

    match cli.command {
        Command::Segment(args) => run_segment(args).await,
        Command::Phrases(args) => run_phrases(args).await,
        Command::Eval(args) => run_eval(args).await,
    }
}

async fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path).await,
        None => Ok(Config::default()),
    }
}

/// A visual backend given on the command line replaces the one in the config
fn override_visual(config: &mut Config, words: &Option<PathBuf>, command: &Option<Vec<String>>) {
    if words.is_some() {
        config.visual_words = words.clone();
        config.visual_command = None;
    }
    if command.is_some() {
        config.visual_command = command.clone();
        config.visual_words = None;
    }
}

async fn run_segment(args: SegmentArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref()).await?;
    if args.lexicon.is_some() {
        config.lexicon = args.lexicon.clone();
    }
    override_visual(&mut config, &args.visual_words, &args.visual_command);
    if args.min_length.is_some() {
        config.min_length = args.min_length;
    }

    let phrases = collect_phrases(&args).await?;
    if phrases.is_empty() {
        anyhow::bail!("No phrases given; pass them as arguments or with --input");
    }

    let Some(lexicon_path) = config.lexicon.as_deref() else {
        anyhow::bail!("No lexicon configured; pass --lexicon or set \"lexicon\" in the config");
    };
    let lexicon = Arc::new(Lexicon::load(lexicon_path).await?);
    let visual = build_visual_oracle(&config).await?;
    let oracles = Oracles::from_lexicon(lexicon, visual);
    let segmenter = Segmenter::new(config.segmenter());

    info!(phrases = phrases.len(), concurrency = args.concurrency, "Starting scan");
    let puzzles = segmenter.puzzles(phrases, &oracles, args.concurrency).await?;

    for puzzle in &puzzles {
        println!("{}", serde_json::to_string(puzzle)?);
    }

    let found: usize = puzzles.iter().map(|p| p.substrings.len()).sum();
    info!(puzzles = puzzles.len(), hidden_words = found, "Scan completed");
    Ok(())
}

async fn collect_phrases(args: &SegmentArgs) -> Result<Vec<String>> {
    let mut phrases: Vec<String> = args.phrases.clone();

    if let Some(path) = &args.input {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read phrases from {}", path.display()))?;
        phrases.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string),
        );
    }

    Ok(phrases)
}

async fn build_visual_oracle(config: &Config) -> Result<Arc<dyn VisualOracle>> {
    let policy = config.retry_policy();

    if let Some(path) = config.visual_words.as_deref() {
        let list = VisualWordList::load(path).await?;
        return Ok(Arc::new(CachedVisualOracle::new(list, policy)));
    }

    if let Some(command) = config.visual_command.as_deref() {
        let client = CommandCompletionClient::from_command_line(command, config.visual_timeout())?;
        info!(program = %command[0], "Using completion command for visual checks");
        return Ok(Arc::new(CachedVisualOracle::new(
            PromptVisualOracle::new(client),
            policy,
        )));
    }

    anyhow::bail!("No visual oracle configured; pass --visual-words or --visual-command")
}

async fn run_phrases(args: PhrasesArgs) -> Result<()> {
    validate_file(&args.relationships)?;
    let lexicon = Lexicon::load(&args.lexicon).await?;
    let items = load_relationships(&args.relationships).await?;

    let phrases = build_phrases(&items, &lexicon);
    for phrase in &phrases {
        println!("{phrase}");
    }

    info!(phrases = phrases.len(), "Phrase build completed");
    Ok(())
}

async fn run_eval(args: EvalArgs) -> Result<()> {
    validate_file(&args.cases)?;
    let mut config = load_config(args.config.as_deref()).await?;
    override_visual(&mut config, &args.visual_words, &args.visual_command);

    let cases = load_cases(&args.cases).await?;
    let visual = build_visual_oracle(&config).await?;

    info!(cases = cases.len(), concurrency = args.concurrency, "Starting evaluation");
    let report = evaluate(&cases, visual.as_ref(), args.concurrency).await?;

    if args.json {
        let summary = serde_json::json!({
            "total": report.total(),
            "accuracy": report.accuracy(),
            "false_positive_rate": report.false_positive_rate(),
            "false_negative_rate": report.false_negative_rate(),
            "report": report,
        });
        println!("{summary}");
    } else {
        println!("{report}");
    }
    Ok(())
}

fn validate_file(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("File does not exist: {}", path.display());
    }
    if !path.is_file() {
        anyhow::bail!("Path is not a file: {}", path.display());
    }
    Ok(())
}
