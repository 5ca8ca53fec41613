pub mod cli;
pub mod types;

pub use cli::Cli;
pub use types::{
    Credentials, DEFAULT_CAPTURE_INTERVAL, MAX_SEARCH_ATTEMPTS, PipelineConfig, SubtitleSettings,
    SubtitleStyle,
};
