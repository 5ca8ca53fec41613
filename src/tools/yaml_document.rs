use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// 讀取 YAML 文件，檔案不存在或內容為空時回傳預設值
pub fn load_yaml_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("無法讀取檔案: {}", path.display()))?;

    if content.trim().is_empty() {
        return Ok(T::default());
    }

    serde_yaml::from_str(&content).with_context(|| format!("無法解析檔案: {}", path.display()))
}

/// 整份重寫 YAML 文件
///
/// 先寫入同目錄的暫存檔再 rename，中途中斷時原檔案保持完整。
pub fn save_yaml_atomic<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let content = serde_yaml::to_string(value)
        .with_context(|| format!("無法序列化: {}", path.display()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("無法建立目錄: {}", parent.display()))?;
    }

    let temp_path = temp_path_for(path);
    fs::write(&temp_path, content)
        .with_context(|| format!("無法寫入檔案: {}", temp_path.display()))?;
    fs::rename(&temp_path, path).with_context(|| {
        format!(
            "無法取代檔案: {} -> {}",
            temp_path.display(),
            path.display()
        )
    })?;

    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map_or_else(|| "document".to_string(), |s| s.to_string_lossy().to_string());
    path.with_file_name(format!(".{file_name}.tmp"))
}
