use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vidscribe::acquire::Acquirer;
use vidscribe::cli::{Cli, Commands};
use vidscribe::config::Config;
use vidscribe::pipeline::Pipeline;
use vidscribe::platform::VideoReference;
use vidscribe::runner::SystemRunner;
use vidscribe::transcribe::whisper::WhisperCliEngine;
use vidscribe::transcribe::Transcriber;
use vidscribe::{acquire, pipeline, transcribe, utils};

#[tokio::main]
async fn main() -> ExitCode {
    // All diagnostics go to stderr; stdout carries exactly one JSON
    // envelope per invocation, which the next stage may parse.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vidscribe=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let missing_deps = utils::check_dependencies().await;
    if !missing_deps.is_empty() {
        eprintln!("Dependency check warnings:");
        for dep in missing_deps {
            eprintln!("  - {}", dep);
        }
        eprintln!("  (continuing anyway)");
    }

    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            return emit(&FailureEnvelope {
                success: false,
                error: e.to_string(),
            });
        }
    };

    match cli.command {
        Commands::Run {
            url,
            model,
            language,
            output_dir,
            keep_files,
        } => {
            if let Some(model) = model {
                config.model = model;
            }
            if language.is_some() {
                config.language = language;
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            config.keep_files = config.keep_files || keep_files;

            let pipeline = Pipeline::new(config);

            let progress = spinner(cli.quiet, "Downloading and transcribing...");
            let result = pipeline.run(&url).await;
            if let Some(progress) = progress {
                progress.finish_and_clear();
            }

            if let Some(info) = result.video_info.as_ref() {
                if let (Some(title), Some(duration)) = (&info.title, info.duration) {
                    eprintln!("Done: {} ({})", title, utils::format_duration(duration));
                }
            }

            emit(&result)
        }
        Commands::Download {
            url,
            output_dir,
            quality,
        } => {
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(quality) = quality {
                config.quality = quality;
            }

            let acquirer = Acquirer::new(Arc::new(SystemRunner::new()), &config.quality);
            let reference = VideoReference::classify(&url);

            let progress = spinner(cli.quiet, "Downloading audio...");
            let result = acquirer.acquire(&reference, &config.downloads_dir()).await;
            if let Some(progress) = progress {
                progress.finish_and_clear();
            }

            emit(&result)
        }
        Commands::Transcribe {
            audio,
            model,
            language,
            output_dir,
        } => {
            if let Some(model) = model {
                config.model = model;
            }
            if language.is_some() {
                config.language = language;
            }

            let transcriber =
                Transcriber::new(Arc::new(WhisperCliEngine::new(Arc::new(SystemRunner::new()))));

            let progress = spinner(cli.quiet, "Transcribing audio...");
            let result = transcriber
                .transcribe(
                    &audio,
                    config.model,
                    config.language.as_deref(),
                    output_dir.as_deref(),
                )
                .await;
            if let Some(progress) = progress {
                progress.finish_and_clear();
            }

            emit(&result)
        }
    }
}

#[derive(Serialize)]
struct FailureEnvelope {
    success: bool,
    error: String,
}

/// Stage result with a serialized form and a success verdict
trait Envelope: Serialize {
    fn succeeded(&self) -> bool;
}

impl Envelope for FailureEnvelope {
    fn succeeded(&self) -> bool {
        self.success
    }
}

impl Envelope for acquire::DownloadResult {
    fn succeeded(&self) -> bool {
        self.success
    }
}

impl Envelope for transcribe::TranscriptionResult {
    fn succeeded(&self) -> bool {
        self.success
    }
}

impl Envelope for pipeline::PipelineResult {
    fn succeeded(&self) -> bool {
        self.success
    }
}

/// Print the result envelope to stdout and map `success` onto the exit
/// status: 0 when true, 1 otherwise. The same policy applies to every
/// stage and to the whole pipeline.
fn emit<T: Envelope>(envelope: &T) -> ExitCode {
    let rendered = match serde_json::to_string_pretty(envelope) {
        Ok(rendered) => rendered,
        Err(e) => {
            eprintln!("Failed to serialize result envelope: {}", e);
            return ExitCode::from(1);
        }
    };

    println!("{}", rendered);

    ExitCode::from(if envelope.succeeded() { 0 } else { 1 })
}

/// Progress spinner on stderr; suppressed by `--quiet`
fn spinner(quiet: bool, message: &'static str) -> Option<ProgressBar> {
    if quiet {
        return None;
    }

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    progress.set_message(message);
    progress.enable_steady_tick(Duration::from_millis(120));
    Some(progress)
}
