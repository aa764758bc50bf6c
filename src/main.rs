//! Summarist CLI - web article summarisation
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use summarist::fetcher::ArticleSource;
use summarist::{pipeline, web, Config, SummaryJob, WordLimit};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "summarist")]
#[command(author, version, about = "Summarise a web article with an LLM", long_about = None)]
#[command(args_conflicts_with_subcommands = true, arg_required_else_help = true)]
struct Cli {
    /// Path to a config file (default: ./summarist.toml or ~/.config/summarist/summarist.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging on stderr (-v, -vv, -vvv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    summarise: SummariseArgs,
}

#[derive(Args)]
struct SummariseArgs {
    /// URL of the article to summarise
    url: Option<String>,
    /// Maximum summary length in words [default: 200]
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    max_words: Option<u32>,
    /// Summary language (default: the article's language)
    #[arg(long, short)]
    language: Option<String>,
    /// Chat model identifier
    #[arg(long, short)]
    model: Option<String>,
    /// Show raw extracted text instead of summary
    #[arg(long)]
    raw: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the interactive web form
    Serve {
        /// Address to listen on [default: from config, 127.0.0.1:8501]
        #[arg(long)]
        bind: Option<String>,
    },
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if !atty::is(atty::Stream::Stderr) {
        colored::control::set_override(false);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("summarist={level}")),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "summarist", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Serve { bind }) => {
            let config = load_config(cli.config.as_ref())?;
            let bind = bind.unwrap_or_else(|| config.web.bind.clone());
            eprintln!("{} http://{}", "Serving summarist on".dimmed(), bind);
            web::serve(config, &bind).await?;
            Ok(())
        }
        None => summarise(cli.summarise, cli.config.as_ref()).await,
    }
}

async fn summarise(args: SummariseArgs, config_path: Option<&PathBuf>) -> anyhow::Result<()> {
    let Some(url) = args.url else {
        anyhow::bail!("missing article URL; usage: summarist <url> [max_words]");
    };

    let mut config = load_config(config_path)?;
    if let Some(language) = args.language {
        config.summary.language = Some(language);
    }
    if let Some(model) = args.model {
        config.agent.model = model;
    }

    // Inputs first, then the credential, then the network.
    let source = ArticleSource::parse(&url)?;
    let max_words = WordLimit::try_from(i64::from(
        args.max_words.unwrap_or(config.summary.max_words),
    ))?;

    if args.raw {
        eprintln!("{}", format!("Fetching {source}...").dimmed());
        let article = pipeline::fetch_article(&source, &config).await?;
        let title = article.title.as_deref().unwrap_or("No title");
        println!("=== {title} ===\n");
        println!("{}", article.text);
        eprintln!(
            "{}",
            format!("--- Extracted {} characters ---", article.text.len()).dimmed()
        );
        return Ok(());
    }

    let job = SummaryJob::new(source, max_words, &config);
    if job.credential.is_some() {
        eprintln!("{}", format!("Fetching and summarising {}...", job.source).dimmed());
    }
    let outcome = pipeline::summarize(&job, &config).await?;

    tracing::info!(
        model = %outcome.summary.model,
        words = outcome.summary.word_count(),
        "summary complete"
    );
    println!("{}", outcome.summary);
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(config)
}
