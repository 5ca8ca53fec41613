mod episode_parser;
mod file_hasher;
mod frame_store;
mod path_validator;
mod processing_ledger;
mod video_scanner;
mod yaml_document;

pub use episode_parser::{EpisodeEncoding, InputItem, parse_episode_encoding};
pub use file_hasher::{MovieHash, calculate_movie_hash};
pub use frame_store::{FrameArtifact, FrameStore};
pub use path_validator::{
    clear_directory, ensure_directory_exists, is_within, paths_overlap, resolve_path,
    validate_path_exists,
};
pub use processing_ledger::{LedgerEntry, ProcessingLedger, SubtitleOutcome};
pub use video_scanner::scan_video_files;
pub use yaml_document::{load_yaml_or_default, save_yaml_atomic};
