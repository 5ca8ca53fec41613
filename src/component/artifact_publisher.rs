//! 影格發布元件
//!
//! 將暫存區的影格以 URL 安全檔名移到輸出資料夾，並加入影格描述資料

use crate::tools::{FrameArtifact, FrameStore, InputItem, ensure_directory_exists};
use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;
use url::form_urlencoded;

const LOG_TARGET: &str = "frame_capture::publisher";

/// 一張已發布的影格
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedFrame {
    /// 檔名開頭的 `%04d` 序號
    pub sequence: Option<u32>,
    pub safe_name: String,
    pub path: PathBuf,
    /// 是否為影格資料中的新鍵
    pub newly_recorded: bool,
}

pub struct ArtifactPublisher {
    output_dir: PathBuf,
    url_base: Url,
}

impl ArtifactPublisher {
    #[must_use]
    pub fn new(output_dir: &Path, url_base: &Url) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            url_base: url_base.clone(),
        }
    }

    /// 發布暫存區內的所有檔案
    ///
    /// 同名檔案直接覆寫；已存在的影格資料不會被修改。
    pub fn publish_staged(
        &self,
        staging_dir: &Path,
        item: &InputItem,
        store: &mut FrameStore,
    ) -> Result<Vec<PublishedFrame>> {
        ensure_directory_exists(&self.output_dir)?;

        let mut staged: Vec<PathBuf> = fs::read_dir(staging_dir)
            .with_context(|| format!("無法讀取暫存資料夾: {}", staging_dir.display()))?
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .map(|entry| entry.path())
            .collect();
        staged.sort();

        let mut published = Vec::with_capacity(staged.len());
        for frame_path in staged {
            let frame_name = frame_path
                .file_name()
                .and_then(|s| s.to_str())
                .ok_or_else(|| anyhow::anyhow!("無法取得檔案名稱: {}", frame_path.display()))?
                .to_string();

            let safe_name = url_safe_name(&frame_name);
            let destination = self.output_dir.join(&safe_name);
            move_file(&frame_path, &destination)?;
            debug!(
                target: LOG_TARGET,
                "移動影格: {} -> {}",
                frame_path.display(),
                destination.display()
            );

            let newly_recorded = store.insert_if_absent(
                &safe_name,
                FrameArtifact {
                    title: item.title.clone(),
                    season: item.season.clone(),
                    episode: item.episode.clone(),
                    include: true,
                    url: frame_url(&self.url_base, &safe_name),
                },
            );

            published.push(PublishedFrame {
                sequence: sequence_index(&frame_name),
                safe_name,
                path: destination,
                newly_recorded,
            });
        }

        info!(
            target: LOG_TARGET,
            "{} 發布 {} 張影格",
            item.file_name,
            published.len()
        );
        Ok(published)
    }
}

/// `application/x-www-form-urlencoded` 編碼（空白為 `+`，`+` 為 `%2B`）
#[must_use]
pub fn url_safe_name(frame_name: &str) -> String {
    form_urlencoded::byte_serialize(frame_name.as_bytes()).collect()
}

/// `url_safe_name` 的反向解碼
#[must_use]
pub fn decode_safe_name(safe_name: &str) -> String {
    form_urlencoded::parse(safe_name.as_bytes())
        .next()
        .map(|(key, _)| key.into_owned())
        .unwrap_or_default()
}

#[must_use]
pub fn frame_url(url_base: &Url, safe_name: &str) -> String {
    format!("{}/{}", url_base.as_str().trim_end_matches('/'), safe_name)
}

fn sequence_index(frame_name: &str) -> Option<u32> {
    frame_name.split_once('-')?.0.parse().ok()
}

/// rename 失敗時（例如跨裝置）改用複製後刪除
fn move_file(source: &Path, destination: &Path) -> Result<()> {
    if fs::rename(source, destination).is_ok() {
        return Ok(());
    }

    fs::copy(source, destination).with_context(|| {
        format!(
            "無法移動影格: {} -> {}",
            source.display(),
            destination.display()
        )
    })?;
    fs::remove_file(source).with_context(|| format!("無法刪除暫存影格: {}", source.display()))?;
    Ok(())
}
