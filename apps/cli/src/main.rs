use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, HttpBackend, QueryMode, QueryOrchestrator, QueryOutcome, ResultPanel,
    ResultView, VerseBackend,
};
use futures::future::join_all;
use shared::domain::Language;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "verse-guide", about = "Find Quran verses and read bilingual tafseer")]
struct Args {
    /// Settings file (defaults to ./verse_guide.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Keyword search over the translations
    Search {
        query: String,
        #[arg(long)]
        limit: Option<usize>,
        /// Generate tafseer for every result
        #[arg(long)]
        tafseer: bool,
    },
    /// Look a verse up by reference, e.g. 2:255
    Verse {
        reference: String,
        #[arg(long)]
        tafseer: bool,
    },
    /// Get a verse suggested for a problem, with tafseer
    Suggest {
        #[arg(required = true, num_args = 1..)]
        problem: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let settings = load_settings(args.config.as_deref())?;
    info!(api = %settings.api_base_url, "using verse service");
    let backend: Arc<dyn VerseBackend> =
        Arc::new(HttpBackend::new(&settings).context("failed to set up verse service client")?);
    let orchestrator = QueryOrchestrator::new(backend.clone());

    let (outcome, generate_all) = match &args.command {
        Command::Search {
            query,
            limit,
            tafseer,
        } => {
            orchestrator.set_mode(QueryMode::Reference);
            let limit = limit.unwrap_or(settings.result_limit);
            (orchestrator.run_search(query, limit).await, *tafseer)
        }
        Command::Verse { reference, tafseer } => {
            orchestrator.set_mode(QueryMode::Reference);
            (orchestrator.run_reference_lookup(reference).await, *tafseer)
        }
        Command::Suggest { problem } => {
            orchestrator.set_mode(QueryMode::Problem);
            (orchestrator.run_suggestion(&problem.join(" ")).await, false)
        }
    };

    let state = orchestrator.snapshot();
    match outcome {
        QueryOutcome::Succeeded => {}
        QueryOutcome::Skipped => {
            eprintln!("Nothing to look up.");
            return Ok(ExitCode::FAILURE);
        }
        QueryOutcome::Failed => {
            if let Some(error) = &state.error {
                eprintln!("{error}");
            }
            return Ok(ExitCode::FAILURE);
        }
    }

    let mut panel = ResultPanel::new(backend);
    panel.sync(&state);
    panel.mount().await;
    if generate_all {
        join_all(
            panel
                .views()
                .iter()
                .map(|view| view.commentary().generate()),
        )
        .await;
    }

    if panel.views().is_empty() {
        println!("No verses found.");
    }
    for view in panel.views() {
        print_view(view);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_view(view: &ResultView) {
    println!("== {} ==", view.verse().key);
    println!("{}", view.arabic_text());
    for language in Language::ALL {
        println!(
            "\n{} Translation:\n{}",
            language.display_name(),
            view.translation_text(language)
        );
    }

    let commentary = view.commentary().snapshot();
    if commentary.is_revealed() {
        for language in Language::ALL {
            if let Some(text) = commentary.display_text(language) {
                println!("\n{} Tafseer:\n{text}", language.display_name());
            }
        }
    } else if let Some(error) = &commentary.error {
        println!("\n{error}");
    }
    println!();
}
