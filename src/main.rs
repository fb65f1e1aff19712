use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde_json::json;
use tracing::{info, Level};

use beatscan::{audio::BeatAnalyzer, BeatReport};

#[derive(Parser)]
#[command(
    name = "beatscan",
    version,
    about = "Analyze an audio file for bass/snare onsets and tempo",
    long_about = "Beatscan analyzes a single audio file and reports its rhythmic structure as JSON: kick and snare onset times, a merged beat list and an estimated BPM. Intended as a batch step feeding beat-mapping or rhythm-game tooling."
)]
struct Cli {
    /// Audio file to analyze (WAV, MP3, FLAC, OGG, M4A)
    file: Option<PathBuf>,

    /// Pretty-print the JSON report
    #[arg(short, long)]
    pretty: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Stdout carries only the JSON payload; all logging goes to stderr.
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    let Some(file) = cli.file else {
        println!("{}", json!({ "error": "usage: beatscan <audio_file>" }));
        return ExitCode::FAILURE;
    };

    info!("Beatscan v{} analyzing {:?}", env!("CARGO_PKG_VERSION"), file);

    match BeatAnalyzer::new().analyze_path(&file) {
        Ok(report) => {
            print_report(&report, cli.pretty);
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{}", json!({ "error": e.user_message() }));
            ExitCode::FAILURE
        }
    }
}

fn print_report(report: &BeatReport, pretty: bool) {
    let payload = if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    };

    match payload {
        Ok(payload) => println!("{payload}"),
        // Serialization of a plain record cannot realistically fail, but the
        // contract is JSON on stdout no matter what.
        Err(e) => println!("{}", json!({ "error": e.to_string() })),
    }
}
