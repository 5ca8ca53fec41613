use anyhow::Result;
use clap::Parser;
use console::style;
use frame_capture::component::{PipelineOrchestrator, RunSummary};
use frame_capture::config::Cli;
use frame_capture::init;
use frame_capture::signal::setup_shutdown_signal;
use log::error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init::init(cli.log_level()) {
        eprintln!("{} {e:#}", style("警告:").yellow().bold());
    }

    match run(cli) {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("執行失敗: {e:#}");
            eprintln!("{} {e:#}", style("錯誤:").red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<RunSummary> {
    let config = cli.into_config()?;
    let shutdown_signal = setup_shutdown_signal()?;
    let orchestrator = PipelineOrchestrator::from_config(config, shutdown_signal)?;
    orchestrator.run()
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("{}", style("=== 影格擷取摘要 ===").cyan().bold());
    println!("  影片: {} 支", summary.discovered);
    println!("  處理: {} 支", style(summary.processed).green());
    println!("  跳過: {} 支（已在帳本中）", summary.skipped);

    if summary.failed > 0 {
        println!("  失敗: {} 支（下次執行會重試）", style(summary.failed).red());
    }

    println!(
        "  影格: {} 張（新增 {} 筆描述資料）",
        summary.frames_published, summary.new_frames
    );

    if summary.interrupted {
        println!("{}", style("  已中斷，剩餘影片下次執行時處理").yellow());
    }
}
