//! 影格擷取元件
//!
//! 每支影片呼叫一次 ffmpeg，依固定間隔取樣，可選擇同時燒錄字幕

mod ffmpeg_command;
mod main;

pub use ffmpeg_command::{ExtractionRequest, FfmpegCommand, SubtitleBurn};
pub use main::{FfmpegExtractor, FrameExtractor};
