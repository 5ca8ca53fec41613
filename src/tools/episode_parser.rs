//! 影集檔名解析模組
//!
//! 檔名編碼格式：`<識別名稱>_S<季>E<集>_<標題片段>_<標題片段>...`
//! 例如 `Show_S02E05_Paradigms of Human Memory.mkv`

use anyhow::{Context, Result, bail};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

const SEGMENT_DELIMITER: char = '_';

static REGEX_SEASON_EPISODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[Ss](\d{2,})[Ee](\d{2,})$").expect("Invalid regex"));

/// 單一來源影片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputItem {
    pub path: PathBuf,
    /// 帳本的識別鍵（含副檔名）
    pub file_name: String,
    /// 不含副檔名的檔名，用於輸出檔名
    pub identifier: String,
    pub season: String,
    pub episode: String,
    pub title: String,
}

impl InputItem {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow::anyhow!("無法取得檔案名稱: {}", path.display()))?
            .to_string();
        let identifier = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow::anyhow!("無法取得檔案名稱: {}", path.display()))?
            .to_string();

        let encoding = parse_episode_encoding(&identifier)
            .with_context(|| format!("檔名不符合 <名稱>_SxxEyy_<標題> 格式: {file_name}"))?;

        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::path::absolute(path)
                .with_context(|| format!("無法取得絕對路徑: {}", path.display()))?
        };

        Ok(Self {
            path,
            file_name,
            identifier,
            season: encoding.season,
            episode: encoding.episode,
            title: encoding.title,
        })
    }

    #[must_use]
    pub fn season_number(&self) -> Option<u32> {
        self.season.parse().ok()
    }

    #[must_use]
    pub fn episode_number(&self) -> Option<u32> {
        self.episode.parse().ok()
    }
}

/// 解析後的季、集、標題
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeEncoding {
    pub season: String,
    pub episode: String,
    pub title: String,
}

pub fn parse_episode_encoding(identifier: &str) -> Result<EpisodeEncoding> {
    let segments: Vec<&str> = identifier.split(SEGMENT_DELIMITER).collect();

    if segments.len() < 2 {
        bail!("缺少季集編碼片段: {identifier}");
    }
    if segments[0].trim().is_empty() {
        bail!("缺少識別名稱片段: {identifier}");
    }

    let captures = REGEX_SEASON_EPISODE
        .captures(segments[1])
        .ok_or_else(|| anyhow::anyhow!("第二個片段不是 SxxEyy 格式: {}", segments[1]))?;

    Ok(EpisodeEncoding {
        season: captures[1].to_string(),
        episode: captures[2].to_string(),
        title: segments[2..].join(" "),
    })
}
