use std::{env, fs, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use clipsight::cli::Cli;
use clipsight::VideoAnalyzer;
use clipsight_audio::export_wav;
use clipsight_core::{find_ffmpeg_path, MediaSource, ProgressSender};
use colored::Colorize;
use dirs::home_dir;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

fn get_base_dir(custom_path: &Option<String>) -> anyhow::Result<PathBuf> {
    let default_path = home_dir()
        .ok_or_else(|| anyhow::anyhow!("failed to get home directory"))?
        .join(".clipsight");

    let base_dir = custom_path
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or(default_path);

    fs::create_dir_all(&base_dir)?;
    Ok(base_dir)
}

fn setup_logging(log_dir: &PathBuf, cli: &Cli) -> anyhow::Result<WorkerGuard> {
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("clipsight")
        .filename_suffix("log")
        .max_log_files(5)
        .build(log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("info".parse().unwrap())
        .add_directive("symphonia=error".parse().unwrap())
        .add_directive("rusty_tesseract=error".parse().unwrap())
        .add_directive("hound=error".parse().unwrap());

    let env_filter = env::var("CLIPSIGHT_LOG")
        .unwrap_or_default()
        .split(',')
        .filter(|s| !s.is_empty())
        .fold(
            env_filter,
            |filter, module_directive| match module_directive.parse() {
                Ok(directive) => filter.add_directive(directive),
                Err(e) => {
                    eprintln!(
                        "warning: invalid log directive '{}': {}",
                        module_directive, e
                    );
                    filter
                }
            },
        );

    let env_filter = if cli.debug {
        env_filter
            .add_directive("clipsight=debug".parse().unwrap())
            .add_directive("clipsight_core=debug".parse().unwrap())
            .add_directive("clipsight_audio=debug".parse().unwrap())
            .add_directive("clipsight_vision=debug".parse().unwrap())
    } else {
        env_filter
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stdout))
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_dir = get_base_dir(&cli.log_dir)?;
    let _log_guard = setup_logging(&log_dir, &cli)?;

    if find_ffmpeg_path().is_none() {
        eprintln!("ffmpeg not found. please install ffmpeg and ensure it is in your path");
        std::process::exit(1);
    }

    if cli.video.extension().and_then(|ext| ext.to_str()) != Some("mp4") {
        info!("input is not an mp4 container, proceeding anyway");
    }

    let source = MediaSource::open(&cli.video)
        .await
        .context("failed to open video")?;

    let analyzer = VideoAnalyzer::new(cli.analyzer_settings());

    let (progress, mut updates) = ProgressSender::channel(64);
    let printer = tokio::spawn(async move {
        while let Some(update) = updates.recv().await {
            println!("{:>3}% {}", update.percent, update.message.dimmed());
        }
    });

    let report = analyzer.analyze(&source, &progress).await?;
    drop(progress);
    printer.await?;

    let output_path = cli.output_path();
    let json = serde_json::to_string_pretty(&report)?;
    tokio::fs::write(&output_path, json)
        .await
        .with_context(|| format!("failed to write report to {}", output_path.display()))?;
    println!(
        "{} {}",
        "report written to".green(),
        output_path.display()
    );

    if cli.export_audio {
        let wav_path = cli.video.with_extension("wav");
        match export_wav(&source).await {
            Ok(wav) => {
                tokio::fs::write(&wav_path, wav)
                    .await
                    .with_context(|| {
                        format!("failed to write audio track to {}", wav_path.display())
                    })?;
                println!(
                    "{} {}",
                    "audio track written to".green(),
                    wav_path.display()
                );
            }
            Err(e) => error!("audio export failed: {}", e),
        }
    }

    if let Some(transcription) = &report.transcription {
        println!(
            "transcript: {} chars over {:.1}s",
            transcription.text.chars().count(),
            transcription.duration
        );
    }
    println!("keyframes: {}", report.keyframes.len());

    Ok(())
}
