//! 字幕解析元件
//!
//! 流程：
//! A. 計算影片雜湊與大小
//! B. 查詢字幕資料庫（失敗時線性退避重試）
//! C. 排序候選並選出最佳字幕
//! D. 下載至暫存資料夾

mod candidate;
mod main;
mod opensubtitles;
mod ranking;
mod retry;

pub use candidate::{SubtitleCandidate, SubtitleQuery, parse_flag, parse_score};
pub use main::{ResolvedSubtitle, SubtitleResolver};
pub use opensubtitles::{OpenSubtitlesClient, SubtitleCatalog};
pub use ranking::{rank_candidates, select_best};
pub use retry::{RetryPolicy, Sleeper, ThreadSleeper};
