use crate::tools::{load_yaml_or_default, save_yaml_atomic};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// 單一影片的字幕處理結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleOutcome {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_successful: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle_id: Option<String>,
    /// 燒錄時使用的 `force_style` 字串
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl SubtitleOutcome {
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub capture_interval: u64,
    pub subs: SubtitleOutcome,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerDocument {
    #[serde(default)]
    done: BTreeSet<String>,
    #[serde(flatten)]
    entries: BTreeMap<String, LedgerEntry>,
}

/// 處理帳本：記錄哪些影片（以檔名為鍵）已完成處理
///
/// 執行開始時載入一次，結束時整份寫回。
#[derive(Debug)]
pub struct ProcessingLedger {
    path: PathBuf,
    document: LedgerDocument,
}

impl ProcessingLedger {
    pub fn load(path: &Path) -> Result<Self> {
        let document = load_yaml_or_default(path)
            .with_context(|| format!("無法載入處理帳本: {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    #[must_use]
    pub fn is_done(&self, file_name: &str) -> bool {
        self.document.done.contains(file_name)
    }

    /// 標記完成；已完成的檔名保留原本的紀錄，回傳是否為新紀錄
    pub fn mark_done(&mut self, file_name: &str, entry: LedgerEntry) -> bool {
        if !self.document.done.insert(file_name.to_string()) {
            return false;
        }
        self.document
            .entries
            .entry(file_name.to_string())
            .or_insert(entry);
        true
    }

    #[must_use]
    pub fn entry(&self, file_name: &str) -> Option<&LedgerEntry> {
        self.document.entries.get(file_name)
    }

    #[must_use]
    pub fn done_count(&self) -> usize {
        self.document.done.len()
    }

    pub fn persist(&self) -> Result<()> {
        save_yaml_atomic(&self.document, &self.path)
            .with_context(|| format!("無法儲存處理帳本: {}", self.path.display()))
    }
}
