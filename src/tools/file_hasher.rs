use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// 字幕資料庫比對用的區塊大小（頭尾各 64KB）
const CHUNK_SIZE: u64 = 64 * 1024;

/// 影片內容雜湊與檔案大小
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieHash {
    pub hash: String,
    pub byte_size: u64,
}

/// 計算 OpenSubtitles 格式的影片雜湊
///
/// 檔案大小加上頭尾 64KB 內所有 little-endian u64 的和（溢位時環繞），
/// 輸出 16 位小寫十六進位。
pub fn calculate_movie_hash(path: &Path) -> Result<MovieHash> {
    let file = File::open(path).with_context(|| format!("無法開啟檔案: {}", path.display()))?;
    let byte_size = file
        .metadata()
        .with_context(|| format!("無法讀取檔案資訊: {}", path.display()))?
        .len();
    let mut reader = BufReader::new(file);

    let mut hash = byte_size;
    let head_len = byte_size.min(CHUNK_SIZE);
    hash = hash.wrapping_add(sum_words(&mut reader, head_len, path)?);

    let tail_start = byte_size.saturating_sub(CHUNK_SIZE);
    reader
        .seek(SeekFrom::Start(tail_start))
        .with_context(|| format!("讀取檔案失敗: {}", path.display()))?;
    hash = hash.wrapping_add(sum_words(&mut reader, byte_size - tail_start, path)?);

    Ok(MovieHash {
        hash: format!("{hash:016x}"),
        byte_size,
    })
}

fn sum_words<R: Read>(reader: &mut R, len: u64, path: &Path) -> Result<u64> {
    let mut buffer = vec![0u8; usize::try_from(len)?];
    reader
        .read_exact(&mut buffer)
        .with_context(|| format!("讀取檔案失敗: {}", path.display()))?;

    // 不足 8 bytes 的尾段補零
    Ok(buffer.chunks(8).fold(0u64, |acc, chunk| {
        let mut word = [0u8; 8];
        word[..chunk.len()].copy_from_slice(chunk);
        acc.wrapping_add(u64::from_le_bytes(word))
    }))
}
