use super::candidate::{SubtitleCandidate, SubtitleQuery};
use crate::config::{Credentials, SubtitleSettings};
use crate::tools::ensure_directory_exists;
use anyhow::{Context, Result, bail};
use flate2::read::GzDecoder;
use log::debug;
use reqwest::blocking::Client;
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const LOG_TARGET: &str = "frame_capture::subtitles";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// 遠端字幕資料庫
pub trait SubtitleCatalog {
    fn search(&self, query: &SubtitleQuery) -> Result<Vec<SubtitleCandidate>>;

    /// 下載字幕到 `dest_dir`，回傳字幕 ID 對應的本機路徑
    fn download(
        &self,
        candidates: &[SubtitleCandidate],
        dest_dir: &Path,
    ) -> Result<HashMap<String, PathBuf>>;
}

/// OpenSubtitles REST API 用戶端
pub struct OpenSubtitlesClient {
    http: Client,
    api_base: Url,
    user_agent: String,
    credentials: Option<Credentials>,
}

impl OpenSubtitlesClient {
    /// 建立失敗時直接回傳錯誤，不會留下無法使用的用戶端
    pub fn new(settings: &SubtitleSettings) -> Result<Self> {
        let http = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("無法建立 HTTP 用戶端")?;

        Ok(Self {
            http,
            api_base: settings.api_base.clone(),
            user_agent: settings.user_agent.clone(),
            credentials: settings.credentials.clone(),
        })
    }

    /// 路徑參數依名稱字母排序，缺少的選填參數直接省略
    pub fn search_url(&self, query: &SubtitleQuery) -> Result<Url> {
        let mut segments = Vec::new();
        if let Some(episode) = query.episode {
            segments.push(format!("episode-{episode}"));
        }
        segments.push(format!("moviebytesize-{}", query.movie_byte_size));
        segments.push(format!("moviehash-{}", query.movie_hash));
        if let Some(season) = query.season_number {
            segments.push(format!("season-{season}"));
        }
        segments.push(format!("sublanguageid-{}", query.language));

        let raw = format!(
            "{}/search/{}",
            self.api_base.as_str().trim_end_matches('/'),
            segments.join("/")
        );
        Url::parse(&raw).with_context(|| format!("無效的查詢網址: {raw}"))
    }

    fn get(&self, url: &str) -> reqwest::blocking::RequestBuilder {
        let request = self
            .http
            .get(url)
            .header("X-User-Agent", self.user_agent.as_str());
        match &self.credentials {
            Some(credentials) => {
                request.basic_auth(&credentials.username, Some(&credentials.password))
            }
            None => request,
        }
    }

    fn download_one(&self, candidate: &SubtitleCandidate, dest_dir: &Path) -> Result<PathBuf> {
        let Some(link) = candidate.download_link.as_deref() else {
            bail!("字幕沒有下載連結: {}", candidate.subtitle_id);
        };

        let bytes = self
            .get(link)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .with_context(|| format!("無法下載字幕: {link}"))?
            .bytes()
            .with_context(|| format!("無法讀取字幕內容: {link}"))?;

        let content = decompress_if_gzip(&bytes)?;
        let extension = candidate.format.as_deref().unwrap_or("srt");
        let path = dest_dir.join(format!("{}.{extension}", candidate.subtitle_id));
        fs::write(&path, content).with_context(|| format!("無法寫入字幕: {}", path.display()))?;

        Ok(path)
    }
}

impl SubtitleCatalog for OpenSubtitlesClient {
    fn search(&self, query: &SubtitleQuery) -> Result<Vec<SubtitleCandidate>> {
        let url = self.search_url(query)?;
        debug!(target: LOG_TARGET, "查詢字幕: {url}");

        self.get(url.as_str())
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .with_context(|| format!("字幕查詢失敗: {url}"))?
            .json::<Vec<SubtitleCandidate>>()
            .context("無法解析字幕查詢結果")
    }

    fn download(
        &self,
        candidates: &[SubtitleCandidate],
        dest_dir: &Path,
    ) -> Result<HashMap<String, PathBuf>> {
        ensure_directory_exists(dest_dir)?;

        candidates
            .iter()
            .map(|candidate| {
                self.download_one(candidate, dest_dir)
                    .map(|path| (candidate.subtitle_id.clone(), path))
            })
            .collect()
    }
}

fn decompress_if_gzip(bytes: &[u8]) -> Result<Vec<u8>> {
    if !bytes.starts_with(&GZIP_MAGIC) {
        return Ok(bytes.to_vec());
    }

    let mut content = Vec::new();
    GzDecoder::new(bytes)
        .read_to_end(&mut content)
        .context("無法解壓縮字幕")?;
    Ok(content)
}
