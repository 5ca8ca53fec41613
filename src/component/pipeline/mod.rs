//! 影格擷取管線
//!
//! 每支影片的狀態：
//! Discovered → SubtitleResolution（可選）→ Extracting → Publishing → Ledgered
//!
//! 擷取失敗的影片不會記入帳本，下次執行會重新處理。

mod main;

pub use main::{ItemOutcome, ItemState, PipelineOrchestrator, RunSummary};
