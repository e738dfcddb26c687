//! Jamak - Korean Video Subtitle Translation & Glossary
//!
//! Command-line entry point: builds the shared term index, translation cache
//! and job tracker once, then dispatches subtitle and glossary commands.

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{Level, info, warn};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use walkdir::WalkDir;

use jamak::cli::{Args, Commands, parse_target_langs};
use jamak::config::Config;
use jamak::glossary::{GlossaryResolver, TermIndex};
use jamak::job::{JobState, JobTracker};
use jamak::subtitle::SubtitleDocument;
use jamak::translate::{TranslationCache, TranslationService};
use jamak::workflow::Workflow;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;

    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new("jamak.toml").exists() {
                info!("Found jamak.toml in current directory, loading...");
                Config::from_file("jamak.toml")?
            } else {
                Config::default()
            }
        }
    };

    // Shared state is built once and handed to every component.
    let cache = Arc::new(TranslationCache::new());
    let translator = Arc::new(TranslationService::from_config(&config.translate, cache));
    let tracker = Arc::new(JobTracker::new());

    match args.command {
        Commands::Process {
            input,
            source_lang,
            target_langs,
            output_dir,
        } => {
            let targets = parse_target_langs(&target_langs);
            let workflow = Workflow::new(config, translator, Arc::clone(&tracker));

            let job_id = tracker.create();
            info!("Processing {} as job {}", input.display(), job_id);
            workflow
                .run_media_job(&job_id, &input, &source_lang, &targets)
                .await;
            report_job(&tracker, &job_id, output_dir.as_deref()).await?;
        }
        Commands::TranslateSrt {
            input,
            source_lang,
            target_langs,
            output_dir,
        } => {
            let targets = parse_target_langs(&target_langs);
            let workflow = Workflow::new(config, translator, Arc::clone(&tracker));

            let job_id = tracker.create();
            info!("Translating {} as job {}", input.display(), job_id);
            workflow
                .run_subtitle_job(&job_id, &input, &source_lang, &targets)
                .await;
            report_job(&tracker, &job_id, output_dir.as_deref()).await?;
        }
        Commands::Batch {
            input_dir,
            source_lang,
            target_langs,
        } => {
            let targets = parse_target_langs(&target_langs);
            let workflow = Workflow::new(config, translator, Arc::clone(&tracker));

            let video_extensions = ["mp4", "avi", "mov", "mkv", "webm"];
            let mut video_files = Vec::new();
            for entry in WalkDir::new(&input_dir).into_iter().filter_map(|e| e.ok()) {
                if let Some(ext) = entry.path().extension().and_then(|e| e.to_str()) {
                    if video_extensions.contains(&ext.to_lowercase().as_str()) {
                        video_files.push(entry.path().to_path_buf());
                    }
                }
            }
            info!("Found {} video files to process", video_files.len());

            let bar = ProgressBar::new(video_files.len() as u64);
            bar.set_style(
                ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
                    .expect("progress template must parse"),
            );
            for video in video_files {
                bar.set_message(video.display().to_string());
                let job_id = tracker.create();
                workflow
                    .run_media_job(&job_id, &video, &source_lang, &targets)
                    .await;
                if let Some(status) = tracker.get(&job_id) {
                    match status.state {
                        JobState::Succeeded => info!("Completed {}", video.display()),
                        _ => warn!("Failed {}: {}", video.display(), status.message),
                    }
                }
                bar.inc(1);
            }
            bar.finish_with_message("batch complete");
        }
        Commands::Explain {
            text,
            display_lang,
            match_lang,
        } => {
            let index = Arc::new(
                TermIndex::from_file_or_empty(
                    &config.glossary.path,
                    &config.glossary.term_column,
                    &config.glossary.definition_column,
                    &config.glossary.encoding,
                )
                .await,
            );
            let resolver =
                GlossaryResolver::new(index, translator, config.glossary.result_limit);
            let hits = resolver
                .explain(&text, &display_lang, match_lang.as_deref())
                .await;
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
        Commands::Convert { input, output } => {
            let content = tokio::fs::read_to_string(&input).await?;
            let doc = SubtitleDocument::parse_srt(&content);
            tokio::fs::write(&output, doc.to_vtt()).await?;
            info!("Wrote {} cues to {}", doc.cues.len(), output.display());
        }
    }

    Ok(())
}

/// Print the final job status and copy finished tracks into the requested
/// output directory.
async fn report_job(
    tracker: &Arc<JobTracker>,
    job_id: &str,
    output_dir: Option<&Path>,
) -> Result<()> {
    let Some(status) = tracker.get(job_id) else {
        anyhow::bail!("job {job_id} not found");
    };

    match status.state {
        JobState::Succeeded => {
            println!("Job {job_id} succeeded:");
            let mut langs: Vec<_> = status.outputs.iter().collect();
            langs.sort();
            for (lang, artifact) in &langs {
                println!("  {lang}: {artifact}");
            }
            if let Some(dir) = output_dir {
                tokio::fs::create_dir_all(dir).await?;
                for (_, artifact) in &langs {
                    let src = PathBuf::from(artifact.as_str());
                    if let Some(name) = src.file_name() {
                        tokio::fs::copy(&src, dir.join(name)).await?;
                    }
                }
                println!("Copied {} tracks to {}", langs.len(), dir.display());
            }
            Ok(())
        }
        _ => anyhow::bail!("job {job_id} did not succeed: {}", status.message),
    }
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let jamak_dir = std::env::current_dir()?.join(".jamak");
    let log_dir = jamak_dir.join("log");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = rolling::daily(&log_dir, "jamak.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer().with_target(false);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_ansi(false);

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer);

    subscriber
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(())
}
