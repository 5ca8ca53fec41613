//! 功能元件模組
//!
//! 每個子模組實現管線中的一個階段，`pipeline` 負責串接

pub mod artifact_publisher;
pub mod frame_extractor;
pub mod pipeline;
pub mod subtitle_resolver;

pub use artifact_publisher::{ArtifactPublisher, PublishedFrame};
pub use frame_extractor::{FfmpegExtractor, FrameExtractor};
pub use pipeline::{PipelineOrchestrator, RunSummary};
pub use subtitle_resolver::SubtitleResolver;
