use super::candidate::SubtitleQuery;
use super::opensubtitles::{OpenSubtitlesClient, SubtitleCatalog};
use super::ranking::select_best;
use super::retry::{RetryPolicy, Sleeper, ThreadSleeper};
use crate::config::SubtitleSettings;
use crate::tools::{InputItem, calculate_movie_hash};
use anyhow::Result;
use log::{info, warn};
use std::path::PathBuf;

const LOG_TARGET: &str = "frame_capture::subtitles";

/// 已下載的字幕
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSubtitle {
    pub subtitle_id: String,
    pub path: PathBuf,
}

/// 字幕解析器
///
/// 任何失敗都降級為「沒有字幕」，不會中斷影片處理。
pub struct SubtitleResolver {
    catalog: Box<dyn SubtitleCatalog>,
    sleeper: Box<dyn Sleeper>,
    language: String,
    policy: RetryPolicy,
    scratch_dir: PathBuf,
}

impl SubtitleResolver {
    #[must_use]
    pub fn new(catalog: Box<dyn SubtitleCatalog>, settings: &SubtitleSettings) -> Self {
        Self {
            catalog,
            sleeper: Box::new(ThreadSleeper),
            language: settings.language.clone(),
            policy: RetryPolicy::new(settings.max_attempts, settings.backoff_unit),
            scratch_dir: settings.scratch_dir.clone(),
        }
    }

    /// 以 OpenSubtitles 建立解析器
    pub fn from_settings(settings: &SubtitleSettings) -> Result<Self> {
        let client = OpenSubtitlesClient::new(settings)?;
        Ok(Self::new(Box::new(client), settings))
    }

    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Box<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn resolve(&self, item: &InputItem) -> Option<ResolvedSubtitle> {
        let movie_hash = match calculate_movie_hash(&item.path) {
            Ok(hash) => hash,
            Err(e) => {
                warn!(target: LOG_TARGET, "無法計算影片雜湊 {}: {e:#}", item.file_name);
                return None;
            }
        };

        let query = SubtitleQuery {
            language: self.language.clone(),
            movie_hash: movie_hash.hash,
            movie_byte_size: movie_hash.byte_size,
            episode: item.episode_number(),
            season_number: item.season_number(),
        };

        let candidates = match self.policy.run(self.sleeper.as_ref(), "字幕查詢", |_| {
            self.catalog.search(&query)
        }) {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(target: LOG_TARGET, "放棄字幕查詢 {}: {e:#}", item.file_name);
                return None;
            }
        };

        let total = candidates.len();
        let Some(best) = select_best(candidates) else {
            info!(target: LOG_TARGET, "找不到字幕: {}", item.file_name);
            return None;
        };
        info!(
            target: LOG_TARGET,
            "從 {total} 筆結果選擇字幕 {} (score {}, trusted {}, bad {})",
            best.subtitle_id,
            best.score,
            best.trusted,
            best.bad
        );

        let subtitle_id = best.subtitle_id.clone();
        let downloaded = self
            .catalog
            .download(std::slice::from_ref(&best), &self.scratch_dir);

        match downloaded {
            Ok(mut paths) => match paths.remove(&subtitle_id) {
                Some(path) => Some(ResolvedSubtitle { subtitle_id, path }),
                None => {
                    warn!(target: LOG_TARGET, "下載結果缺少字幕 {subtitle_id}");
                    None
                }
            },
            Err(e) => {
                warn!(target: LOG_TARGET, "字幕下載失敗 {subtitle_id}: {e:#}");
                None
            }
        }
    }
}
