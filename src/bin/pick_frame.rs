use anyhow::{Result, bail};
use clap::Parser;
use console::style;
use frame_capture::init;
use frame_capture::tools::{FrameArtifact, FrameStore, validate_path_exists};
use log::{LevelFilter, info};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

/// 從影格資料中隨機挑選一張 `include: true` 的影格
#[derive(Debug, Parser)]
#[command(name = "pick_frame", version)]
struct Args {
    #[arg(long, default_value = "frames.yaml")]
    frames_file: PathBuf,

    /// 輸出格式：text 或 json
    #[arg(long, default_value = "text")]
    format: String,

    /// 顯示挑選過程的日誌
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct PickedFrame<'a> {
    key: &'a str,
    #[serde(flatten)]
    artifact: &'a FrameArtifact,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let level = if args.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    if let Err(e) = init::init(level) {
        eprintln!("{} {e:#}", style("警告:").yellow().bold());
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", style("錯誤:").red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    if !matches!(args.format.as_str(), "text" | "json") {
        bail!("輸出格式必須是 text 或 json: {}", args.format);
    }
    validate_path_exists(&args.frames_file)?;

    let store = FrameStore::load(&args.frames_file)?;
    info!(
        "影格資料 {} 筆，可挑選 {} 筆",
        store.len(),
        store.eligible().count()
    );

    let Some((key, artifact)) = store.pick_random_eligible(&mut rand::rng()) else {
        bail!("沒有可挑選的影格: {}", args.frames_file.display());
    };

    if args.format == "json" {
        println!(
            "{}",
            serde_json::to_string_pretty(&PickedFrame { key, artifact })?
        );
    } else {
        println!("{}", artifact.url);
        println!(
            "{} S{}E{} {}",
            key, artifact.season, artifact.episode, artifact.title
        );
    }
    Ok(())
}
