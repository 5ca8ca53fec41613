use crate::tools::validate_path_exists;
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const LOG_TARGET: &str = "frame_capture::discovery";

/// 掃描影片檔案
///
/// `root` 為檔案時直接回傳；為資料夾時遞迴搜尋所有子資料夾，
/// 以檔名排序確保每次執行的處理順序一致。
pub fn scan_video_files(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    validate_path_exists(root).context("輸入路徑設定錯誤")?;

    if root.is_file() {
        debug!(target: LOG_TARGET, "輸入路徑為單一檔案: {}", root.display());
        return Ok(vec![root.to_path_buf()]);
    }

    let extension = extension.trim_start_matches('.').to_lowercase();
    let mut video_files = Vec::new();

    // WalkDir 以明確的堆疊走訪，每個資料夾只會被拜訪一次
    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("無法走訪資料夾: {}", root.display()))?;
        if entry.file_type().is_file() && has_extension(entry.path(), &extension) {
            video_files.push(entry.into_path());
        }
    }

    info!(
        target: LOG_TARGET,
        "在 {} 找到 {} 個 .{} 檔案",
        root.display(),
        video_files.len(),
        extension
    );
    Ok(video_files)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.to_lowercase() == extension)
}
