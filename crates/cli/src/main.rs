use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use std::io::Read as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tensaku_review::{
    AdapterRegistry, HttpInferenceProvider, Language, MockInferenceProvider, Report, ReviewConfig,
    ReviewEngine, Severity,
};

#[derive(Parser)]
#[command(name = "tensaku")]
#[command(about = "Concurrent multi-analyzer code review for Python and JavaScript")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a file (or stdin with `-`) and print the merged report
    Review(ReviewArgs),

    /// List the configured analyzers
    Adapters,
}

#[derive(Args, Debug)]
struct ReviewArgs {
    /// File to review, or `-` for stdin
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// python or javascript; detected from the file extension when omitted
    #[arg(short, long)]
    language: Option<Language>,

    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Per-adapter timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,

    /// Job-wide timeout in seconds
    #[arg(long, default_value = "90")]
    global_timeout: u64,

    /// Text-generation endpoint for the ML reviewer
    #[arg(long, env = "TENSAKU_ENDPOINT",
          default_value = "https://api-inference.huggingface.co/models/Salesforce/codet5-base")]
    endpoint: String,

    /// Model name recorded in logs
    #[arg(long, default_value = "Salesforce/codet5-base")]
    model: String,

    /// Skip the ML reviewer and run only the static tools
    #[arg(long)]
    no_ml: bool,

    /// Use the canned offline provider instead of the remote endpoint
    #[arg(long)]
    offline: bool,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Review(args) => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(run_review(args))
        }
        Commands::Adapters => list_adapters(),
    }
}

async fn run_review(args: ReviewArgs) -> Result<()> {
    let snippet = read_input(&args.input)?;

    let language = match args.language {
        Some(language) => language,
        None => Language::from_path(&args.input)
            .context("could not detect the language from the file extension; pass --language")?,
    };

    if args.verbose {
        eprintln!(
            "{} {} ({} bytes, {})",
            "Reviewing".bright_blue().bold(),
            args.input.display(),
            snippet.len(),
            language
        );
    }

    let registry = build_registry(&args);
    let config = ReviewConfig {
        adapter_timeout: Duration::from_secs(args.timeout),
        global_timeout: Duration::from_secs(args.global_timeout),
        ..Default::default()
    };

    let engine = ReviewEngine::new(Arc::new(registry), config);
    let report = engine.submit(&snippet, language).await?;

    match args.format {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Markdown => println!("{}", report.to_markdown()),
        OutputFormat::Text => print_text_report(&report),
    }

    Ok(())
}

fn build_registry(args: &ReviewArgs) -> AdapterRegistry {
    if args.no_ml {
        let mut registry = AdapterRegistry::new();
        registry.register(tensaku_review::PylintAdapter);
        registry.register(tensaku_review::BanditAdapter);
        registry.register(tensaku_review::EslintAdapter);
        return registry;
    }

    if args.offline {
        return AdapterRegistry::with_defaults(Arc::new(MockInferenceProvider::new()));
    }

    let provider = HttpInferenceProvider::new(&args.endpoint, &args.model);
    AdapterRegistry::with_defaults(Arc::new(provider))
}

fn read_input(input: &PathBuf) -> Result<String> {
    if input.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("failed to read file: {}", input.display()))
    }
}

fn list_adapters() -> Result<()> {
    let registry = AdapterRegistry::with_defaults(Arc::new(MockInferenceProvider::new()));

    println!("{}", "Configured analyzers".bold());
    for adapter in registry.all() {
        let languages: Vec<&str> = [Language::Python, Language::Javascript]
            .iter()
            .filter(|&&l| adapter.supports(l))
            .map(|l| match l {
                Language::Python => "python",
                Language::Javascript => "javascript",
            })
            .collect();
        println!(
            "  {:<12} {:<20} {}",
            adapter.id().cyan(),
            languages.join(","),
            adapter.description()
        );
    }
    Ok(())
}

fn severity_colored(severity: Severity) -> ColoredString {
    match severity {
        Severity::High => "HIGH".red().bold(),
        Severity::Medium => "MEDIUM".yellow(),
        Severity::Low => "LOW".blue(),
    }
}

fn print_text_report(report: &Report) {
    let status = match report.status() {
        tensaku_review::ReportStatus::Complete => "complete".green(),
        tensaku_review::ReportStatus::Partial => "partial".yellow(),
        tensaku_review::ReportStatus::Failed => "failed".red(),
    };
    println!("{} {} ({})", "Report".bold(), report.job_id(), status);

    if !report.failures().is_empty() {
        println!("\n{}", "Failed analyzers:".bold());
        for (adapter, reason) in report.failures() {
            println!("  {} {}", adapter.red(), reason.dimmed());
        }
    }

    if report.is_empty() {
        println!("\n{}", "No findings.".green());
        return;
    }

    let count = report.count_by_severity();
    println!(
        "\n{} high, {} medium, {} low",
        count.high, count.medium, count.low
    );

    println!();
    for finding in report.findings() {
        let line = finding
            .location
            .map(|loc| format!("line {:<4}", loc.line))
            .unwrap_or_else(|| "        ".to_string());
        let rule = finding
            .rule_id
            .as_deref()
            .map(|r| format!(" [{}]", r))
            .unwrap_or_default();
        println!(
            "  {:<6} {} {:<13} {}{}",
            severity_colored(finding.severity),
            line,
            format!("({})", finding.category),
            finding.message,
            rule.dimmed()
        );
    }
}
