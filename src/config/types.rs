use crate::tools::{is_within, paths_overlap};
use anyhow::{Result, bail};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_CAPTURE_INTERVAL: u64 = 14;
pub const DEFAULT_VIDEO_EXTENSION: &str = "mkv";
pub const DEFAULT_SUBTITLE_LANGUAGE: &str = "eng";
pub const DEFAULT_USER_AGENT: &str = concat!("frame_capture v", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_OPENSUBTITLES_API: &str = "https://rest.opensubtitles.org";
pub const MAX_SEARCH_ATTEMPTS: u32 = 10;

/// 字幕燒錄樣式，依呼叫者給定的順序輸出 `key=value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleStyle {
    pairs: Vec<(String, String)>,
}

impl Default for SubtitleStyle {
    fn default() -> Self {
        Self::from_pairs(vec![
            ("FontName".to_string(), "Arial".to_string()),
            ("Fontsize".to_string(), "24".to_string()),
            ("Outline".to_string(), "1".to_string()),
        ])
    }
}

impl SubtitleStyle {
    #[must_use]
    pub const fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// 相同 key 原地取代，新 key 附加在最後
    pub fn apply_override(&mut self, key: &str, value: &str) {
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some(pair) => pair.1 = value.to_string(),
            None => self.pairs.push((key.to_string(), value.to_string())),
        }
    }

    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// ffmpeg `force_style` 字串
    #[must_use]
    pub fn to_force_style(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct SubtitleSettings {
    pub language: String,
    pub api_base: Url,
    pub user_agent: String,
    pub credentials: Option<Credentials>,
    pub style: SubtitleStyle,
    /// 下載字幕的暫存位置
    pub scratch_dir: PathBuf,
    pub max_attempts: u32,
    /// 第 n 次失敗後等待 n 個單位
    pub backoff_unit: Duration,
}

/// 一次執行所需的完整設定
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input_root: PathBuf,
    pub output_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub frames_file: PathBuf,
    pub ledger_file: PathBuf,
    pub extension: String,
    pub capture_interval: u64,
    pub url_base: Url,
    /// `None` 表示停用字幕
    pub subtitles: Option<SubtitleSettings>,
    pub show_progress: bool,
}

impl PipelineConfig {
    /// 每支影片擷取前都會清空暫存區，暫存區不可與其他資料夾重疊，也不可包含兩份文件
    pub fn validate_paths(&self) -> Result<()> {
        let staging = &self.staging_dir;

        let mut guarded: Vec<(&str, &Path)> = vec![
            ("輸入路徑", self.input_root.as_path()),
            ("輸出資料夾", self.output_dir.as_path()),
        ];
        if let Some(subtitles) = &self.subtitles {
            guarded.push(("字幕暫存資料夾", subtitles.scratch_dir.as_path()));
        }
        for (label, path) in guarded {
            if paths_overlap(staging, path)? {
                bail!(
                    "暫存資料夾 {} 不可與{} {} 重疊",
                    staging.display(),
                    label,
                    path.display()
                );
            }
        }

        for document in [&self.frames_file, &self.ledger_file] {
            if is_within(document, staging)? {
                bail!(
                    "暫存資料夾 {} 不可包含 {}",
                    staging.display(),
                    document.display()
                );
            }
        }
        Ok(())
    }
}
