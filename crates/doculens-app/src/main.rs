// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Doculens: live document detection and rectification.
//
// Entry point. Initialises logging, loads the scanner configuration, opens
// the frame source, and drives the run loop.

mod runner;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use doculens_core::ScannerConfig;
use doculens_io::{DirectorySink, ImageSequenceSource};
use doculens_scan::DocumentScanner;

use runner::RunOptions;

#[derive(Debug, Parser)]
#[command(name = "doculens", version)]
#[command(about = "Detect a document in each frame and rectify it to a fronto-parallel view")]
struct Cli {
    /// Image file or directory of frames (read in file name order)
    #[arg(value_name = "SOURCE", required_unless_present = "dump_config")]
    source: Option<PathBuf>,

    /// JSON scanner configuration; missing fields use defaults
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory receiving the "Work Flow" and "Result" images
    #[arg(short, long, value_name = "DIR", default_value = "doculens-out")]
    out: PathBuf,

    /// Frame rate of the source (default 30)
    #[arg(long, value_name = "N")]
    fps: Option<f64>,

    /// Sleep 1000/fps ms between frames
    #[arg(long)]
    pace: bool,

    /// Stop after this many frames
    #[arg(long, value_name = "N")]
    max_frames: Option<u64>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if cli.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let Some(source_path) = cli.source.as_ref() else {
        anyhow::bail!("no frame source given");
    };

    let mut source = ImageSequenceSource::open(source_path)?;
    tracing::info!(
        source = %source_path.display(),
        frames = source.frame_count(),
        out = %cli.out.display(),
        "Doculens starting"
    );
    if let Some(fps) = cli.fps {
        source = source.with_fps(fps);
    }

    let mut sink = DirectorySink::create(&cli.out)
        .with_context(|| format!("cannot prepare output directory {}", cli.out.display()))?;
    if let Some(max_frames) = cli.max_frames {
        sink = sink.with_max_frames(max_frames);
    }

    let scanner = DocumentScanner::new(config);
    let options = RunOptions {
        fps: cli.fps,
        pace: cli.pace,
    };
    let summary = runner::run(&scanner, &mut source, &mut sink, options)?;

    tracing::info!(
        frames = summary.frames,
        detected = summary.detected,
        skipped = summary.skipped,
        stopped = summary.stopped,
        "Doculens finished"
    );
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<ScannerConfig> {
    match &cli.config {
        Some(path) => ScannerConfig::load(path)
            .with_context(|| format!("cannot load configuration {}", path.display())),
        None => Ok(ScannerConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_full_command_line() {
        let cli = Cli::try_parse_from([
            "doculens",
            "frames/",
            "--config",
            "scan.json",
            "--out",
            "results",
            "--fps",
            "24",
            "--pace",
            "--max-frames",
            "10",
        ])
        .expect("parse");
        assert_eq!(cli.source, Some(PathBuf::from("frames/")));
        assert_eq!(cli.config, Some(PathBuf::from("scan.json")));
        assert_eq!(cli.out, PathBuf::from("results"));
        assert_eq!(cli.fps, Some(24.0));
        assert!(cli.pace);
        assert_eq!(cli.max_frames, Some(10));
    }

    #[test]
    fn source_is_required_unless_dumping_config() {
        assert!(Cli::try_parse_from(["doculens"]).is_err());
        let cli = Cli::try_parse_from(["doculens", "--dump-config"]).expect("parse");
        assert!(cli.dump_config);
        assert_eq!(cli.out, PathBuf::from("doculens-out"));
    }

    #[test]
    fn missing_config_file_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.json");
        let cli = Cli::try_parse_from(["doculens", "frames", "--config", path.to_str().expect("utf-8")])
            .expect("parse");
        assert!(load_config(&cli).is_err());
    }

    #[test]
    fn default_config_without_file() {
        let cli = Cli::try_parse_from(["doculens", "frames"]).expect("parse");
        assert_eq!(load_config(&cli).expect("config"), ScannerConfig::default());
    }
}
