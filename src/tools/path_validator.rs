use anyhow::{Context, Result, bail};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

pub fn validate_path_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("路徑不存在: {}", path.display());
    }
    Ok(())
}

pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("無法建立目錄: {}", path.display()))?;
    } else if !path.is_dir() {
        bail!("路徑不是資料夾: {}", path.display());
    }
    Ok(())
}

/// 清空資料夾內的檔案（保留資料夾本身與子資料夾），回傳刪除的檔案數
pub fn clear_directory(path: &Path) -> Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(path).with_context(|| format!("無法讀取目錄: {}", path.display()))? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            continue;
        }
        let entry_path = entry.path();
        fs::remove_file(&entry_path)
            .with_context(|| format!("無法刪除檔案: {}", entry_path.display()))?;
        removed += 1;
    }
    Ok(removed)
}

/// 轉為絕對路徑，並解析最長的既有上層路徑中的符號連結
pub fn resolve_path(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path)
        .with_context(|| format!("無法取得絕對路徑: {}", path.display()))?;

    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    loop {
        if let Ok(canonical) = fs::canonicalize(existing) {
            return Ok(missing
                .iter()
                .rev()
                .fold(canonical, |resolved, part: &OsString| resolved.join(part)));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return Ok(absolute.clone()),
        }
    }
}

/// `inner` 與 `outer` 相同或位於其中
pub fn is_within(inner: &Path, outer: &Path) -> Result<bool> {
    Ok(resolve_path(inner)?.starts_with(resolve_path(outer)?))
}

/// 兩個路徑相同或其中一個包含另一個
pub fn paths_overlap(a: &Path, b: &Path) -> Result<bool> {
    Ok(is_within(a, b)? || is_within(b, a)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_missing_path() {
        let temp_dir = TempDir::new().unwrap();
        assert!(validate_path_exists(&temp_dir.path().join("nope")).is_err());
        assert!(validate_path_exists(temp_dir.path()).is_ok());
    }

    #[test]
    fn test_ensure_directory_rejects_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        assert!(ensure_directory_exists(&file).is_err());

        let nested = temp_dir.path().join("a/b");
        ensure_directory_exists(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_clear_directory() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("0001-a.jpg"), "x").unwrap();
        fs::write(temp_dir.path().join("0002-a.jpg"), "y").unwrap();

        assert_eq!(clear_directory(temp_dir.path()).unwrap(), 2);
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_clear_directory_keeps_subdirectories() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("season1");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("Show_S01E01_Pilot.mkv"), "video").unwrap();
        fs::write(temp_dir.path().join("0001-a.jpg"), "x").unwrap();

        assert_eq!(clear_directory(temp_dir.path()).unwrap(), 1);
        assert!(nested.join("Show_S01E01_Pilot.mkv").exists());
    }

    #[test]
    fn test_paths_overlap() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("images")).unwrap();

        assert!(paths_overlap(&root.join("images"), &root.join("images")).unwrap());
        assert!(paths_overlap(&root.join("images/staging"), &root.join("images")).unwrap());
        assert!(paths_overlap(root, &root.join("images")).unwrap());
        assert!(paths_overlap(&root.join("images/./"), &root.join("images")).unwrap());
        assert!(!paths_overlap(&root.join("staging"), &root.join("images")).unwrap());
        assert!(!paths_overlap(&root.join("images2"), &root.join("images")).unwrap());
    }

    #[test]
    fn test_is_within() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        assert!(is_within(&root.join("staging/frames.yaml"), &root.join("staging")).unwrap());
        assert!(!is_within(&root.join("frames.yaml"), &root.join("staging")).unwrap());
    }
}
