mod cli;
mod ui;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command};
use speakscore::config::ScoreConfig;
use speakscore::pipeline::{ItemOutcome, Pipeline};
use speakscore::runner::JobRunner;
use speakscore::scoring::ScoreResult;
use speakscore::store::SqliteStore;
use speakscore::transcribe::{HttpTranscriptFetcher, TranscribeClient};
use speakscore::trigger::{StorageEvent, StorageEventRecord};

type ServiceRunner = JobRunner<TranscribeClient, TranscribeClient, HttpTranscriptFetcher>;

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "speakscore=debug,info" } else { "speakscore=info,warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_runner(config: &ScoreConfig) -> Result<ServiceRunner> {
    let client = TranscribeClient::new(
        config.endpoint.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )
    .context("failed to build transcription client")?;
    let fetcher = HttpTranscriptFetcher::new(Duration::from_secs(config.fetch_timeout_secs))
        .context("failed to build transcript fetcher")?;

    let runner = JobRunner::new(client.clone(), client, fetcher)
        .with_policy(config.poll_policy())
        .with_media(config.media_settings());
    info!(
        endpoint = %config.endpoint,
        poll_interval_secs = config.poll_interval_secs,
        max_attempts = config.max_attempts,
        "transcription runner ready"
    );
    Ok(runner)
}

fn open_store(config: &ScoreConfig) -> Result<SqliteStore> {
    SqliteStore::open(Path::new(&config.database_path))
        .with_context(|| format!("failed to open database {}", config.database_path))
}

/// Ctrl+C cancels the in-flight job wait instead of killing the process.
fn cancel_on_interrupt() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling");
            trigger.cancel();
        }
    });
    cancel
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = ScoreConfig::load()?;
    if let Some(secs) = cli.poll_interval_secs {
        config.poll_interval_secs = secs;
    }
    if let Some(max) = cli.max_attempts {
        config.max_attempts = max;
    }

    let cancel = cancel_on_interrupt();

    match cli.command {
        Command::Score {
            reference,
            transcribed,
        } => {
            let result = ScoreResult::compute(&reference, &transcribed);
            if cli.json {
                print_json(&result)?;
            } else {
                ui::print_score(&result);
            }
        }
        Command::Transcribe { media } => {
            let runner = build_runner(&config)?;
            let progress = ui::JobProgress::start(&format!("Transcribing {media}"));
            match runner.transcribe(&media, &cancel).await {
                Ok(transcription) => {
                    progress.success(&transcription.text);
                    if cli.json {
                        print_json(&transcription.report)?;
                    } else if cli.verbose {
                        ui::print_report(&transcription.report);
                    }
                }
                Err(failure) => {
                    progress.failure(&failure.to_string());
                    if let Some(report) = &failure.report {
                        if cli.json {
                            print_json(report)?;
                        } else {
                            ui::print_report(report);
                        }
                    }
                    return Err(failure.into());
                }
            }
        }
        Command::Process { bucket, key } => {
            let runner = build_runner(&config)?;
            let store = open_store(&config)?;
            let pipeline = Pipeline::new(&runner, &store, &store);
            let record = StorageEventRecord::new(&bucket, &key);

            let progress = ui::JobProgress::start(&format!("Scoring {}", record.source_location()));
            match pipeline.process_record(&record, &cancel).await {
                Ok(answer) => {
                    progress.success(&format!("{} scored {:.2}", answer.key, answer.result.score));
                    if cli.json {
                        print_json(&ItemOutcome::Scored(answer))?;
                    } else {
                        ui::print_score(&answer.result);
                    }
                }
                Err(e) => {
                    progress.failure(&e.to_string());
                    if let Some(report) = e.job_report() {
                        if cli.json {
                            print_json(report)?;
                        } else {
                            ui::print_report(report);
                        }
                    }
                    return Err(e.into());
                }
            }
        }
        Command::Batch { event } => {
            let raw = std::fs::read_to_string(&event)
                .with_context(|| format!("failed to read event file {}", event.display()))?;
            let event: StorageEvent = serde_json::from_str(&raw).context("failed to parse storage event")?;
            if event.records.is_empty() {
                bail!("event contains no records");
            }

            let runner = build_runner(&config)?;
            let store = open_store(&config)?;
            let pipeline = Pipeline::new(&runner, &store, &store);

            let summary = pipeline.process_event(&event, &cancel).await;
            if cli.json {
                print_json(&summary)?;
            } else {
                ui::print_summary(&summary);
            }
        }
        Command::AddProblem { text } => {
            let store = open_store(&config)?;
            let id = store.add_problem(&text)?;
            if cli.json {
                print_json(&serde_json::json!({ "id": id, "text": text }))?;
            } else {
                println!("{id}");
            }
        }
        Command::Problems { limit } => {
            let store = open_store(&config)?;
            let problems = store.recent_problems(limit)?;
            if cli.json {
                print_json(&problems)?;
            } else {
                for problem in &problems {
                    println!("{:>6}  {}", problem.id, problem.text);
                }
            }
        }
        Command::Results { user } => {
            let store = open_store(&config)?;
            let results = store.results_for_user(user)?;
            if cli.json {
                print_json(&results)?;
            } else {
                for r in &results {
                    println!(
                        "{:>6}  problem {:<6} {:>6.2}  {}",
                        r.id, r.problem_id, r.score, r.answered_text
                    );
                }
            }
        }
    }

    Ok(())
}

