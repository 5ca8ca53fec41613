use crate::config::types::{
    Credentials, DEFAULT_CAPTURE_INTERVAL, DEFAULT_OPENSUBTITLES_API, DEFAULT_SUBTITLE_LANGUAGE,
    DEFAULT_USER_AGENT, DEFAULT_VIDEO_EXTENSION, MAX_SEARCH_ATTEMPTS, PipelineConfig,
    SubtitleSettings, SubtitleStyle,
};
use crate::tools::validate_path_exists;
use anyhow::{Context, Result, bail};
use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// 依固定間隔擷取影片影格，可選擇燒錄字幕，並記錄每張影格的描述資料
#[derive(Debug, Parser)]
#[command(name = "frame_capture", version)]
pub struct Cli {
    /// 影片所在資料夾（或單一影片檔）
    #[arg(short, long)]
    pub input: PathBuf,

    /// 發布影格的輸出資料夾
    #[arg(short, long)]
    pub output: PathBuf,

    /// ffmpeg 輸出的暫存資料夾
    #[arg(long, default_value = "staging")]
    pub staging: PathBuf,

    /// 擷取間隔（秒）
    #[arg(long, default_value_t = DEFAULT_CAPTURE_INTERVAL)]
    pub interval: u64,

    /// 影格公開網址的前綴
    #[arg(long)]
    pub url_base: String,

    #[arg(long, default_value = "frames.yaml")]
    pub frames_file: PathBuf,

    #[arg(long, default_value = "processed.yaml")]
    pub ledger_file: PathBuf,

    /// 影片副檔名
    #[arg(long, default_value = DEFAULT_VIDEO_EXTENSION)]
    pub extension: String,

    /// 啟用字幕下載與燒錄
    #[arg(long)]
    pub subtitles: bool,

    #[arg(long, default_value = DEFAULT_SUBTITLE_LANGUAGE)]
    pub subtitle_language: String,

    #[arg(long, env = "OPENSUBTITLES_USERNAME")]
    pub subtitle_username: Option<String>,

    #[arg(long, env = "OPENSUBTITLES_PASSWORD", hide_env_values = true)]
    pub subtitle_password: Option<String>,

    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    #[arg(long, default_value = DEFAULT_OPENSUBTITLES_API)]
    pub subtitle_api: String,

    /// 覆寫字幕樣式，格式 KEY=VALUE，可重複指定
    #[arg(long = "subtitle-style", value_name = "KEY=VALUE")]
    pub subtitle_style: Vec<String>,

    /// 下載字幕的暫存資料夾
    #[arg(long, default_value = "subtitles")]
    pub scratch: PathBuf,

    /// 增加日誌詳細程度（-v info, -vv debug, -vvv trace）
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// 只輸出錯誤
    #[arg(short, long)]
    pub quiet: bool,

    /// 不顯示進度條
    #[arg(long)]
    pub no_progress: bool,
}

impl Cli {
    #[must_use]
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    /// 驗證並轉換為執行設定，任何錯誤都屬於設定錯誤
    pub fn into_config(self) -> Result<PipelineConfig> {
        validate_path_exists(&self.input).context("輸入路徑設定錯誤")?;

        if self.interval == 0 {
            bail!("擷取間隔必須大於 0");
        }

        let extension = self.extension.trim_start_matches('.').to_string();
        if extension.is_empty() {
            bail!("副檔名不可為空");
        }

        let url_base = parse_http_url(&self.url_base).context("--url-base 設定錯誤")?;

        let subtitles = if self.subtitles {
            let api_base = parse_http_url(&self.subtitle_api).context("--subtitle-api 設定錯誤")?;

            let credentials = match (self.subtitle_username, self.subtitle_password) {
                (Some(username), Some(password)) => Some(Credentials { username, password }),
                (None, None) => None,
                _ => bail!("字幕帳號與密碼必須同時提供"),
            };

            if self.user_agent.trim().is_empty() {
                bail!("--user-agent 不可為空");
            }

            let mut style = SubtitleStyle::default();
            for raw in &self.subtitle_style {
                let (key, value) = parse_style_pair(raw)?;
                style.apply_override(key, value);
            }

            Some(SubtitleSettings {
                language: self.subtitle_language,
                api_base,
                user_agent: self.user_agent,
                credentials,
                style,
                scratch_dir: self.scratch,
                max_attempts: MAX_SEARCH_ATTEMPTS,
                backoff_unit: Duration::from_secs(1),
            })
        } else {
            None
        };

        let config = PipelineConfig {
            input_root: self.input,
            output_dir: self.output,
            staging_dir: self.staging,
            frames_file: self.frames_file,
            ledger_file: self.ledger_file,
            extension,
            capture_interval: self.interval,
            url_base,
            subtitles,
            show_progress: !self.no_progress,
        };
        config.validate_paths().context("資料夾設定錯誤")?;
        Ok(config)
    }
}

fn parse_http_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("無效的網址: {raw}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("網址必須是 http 或 https: {raw}");
    }
    Ok(url)
}

fn parse_style_pair(raw: &str) -> Result<(&str, &str)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value.trim())),
        _ => bail!("字幕樣式格式必須是 KEY=VALUE: {raw}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(dir: &TempDir, extra: &[&str]) -> Result<PipelineConfig> {
        let input = dir.path().to_string_lossy().to_string();
        let mut args = vec![
            "frame_capture",
            "--input",
            input.as_str(),
            "--output",
            "images",
            "--url-base",
            "https://example.github.io/screens/images",
        ];
        args.extend_from_slice(extra);
        Cli::try_parse_from(args)?.into_config()
    }

    #[test]
    fn test_defaults() {
        let dir = TempDir::new().unwrap();
        let config = parse(&dir, &[]).unwrap();
        assert_eq!(config.capture_interval, DEFAULT_CAPTURE_INTERVAL);
        assert_eq!(config.extension, "mkv");
        assert!(config.subtitles.is_none());
        assert_eq!(
            config.url_base.as_str(),
            "https://example.github.io/screens/images"
        );
    }

    #[test]
    fn test_missing_required_flag() {
        assert!(Cli::try_parse_from(["frame_capture", "--input", "videos"]).is_err());
    }

    #[test]
    fn test_missing_input_root_is_config_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("videos").to_string_lossy().to_string();
        let cli = Cli::try_parse_from([
            "frame_capture",
            "--input",
            missing.as_str(),
            "--output",
            "images",
            "--url-base",
            "https://example.com",
        ])
        .unwrap();
        assert!(cli.into_config().is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = TempDir::new().unwrap();
        assert!(parse(&dir, &["--interval", "0"]).is_err());
        assert!(parse_http_url("ftp://example.com").is_err());
        assert!(parse_http_url("not a url").is_err());
        assert!(parse(&dir, &["--subtitles", "--subtitle-style", "Fontsize"]).is_err());
        assert!(parse(&dir, &["--subtitles", "--subtitle-username", "someone"]).is_err());
    }

    #[test]
    fn test_staging_must_not_overlap_other_paths() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().to_string_lossy().to_string();
        let inside_input = dir.path().join("staging").to_string_lossy().to_string();

        assert!(parse(&dir, &["--staging", "images"]).is_err());
        assert!(parse(&dir, &["--staging", "images/tmp"]).is_err());
        assert!(parse(&dir, &["--staging", input.as_str()]).is_err());
        assert!(parse(&dir, &["--staging", inside_input.as_str()]).is_err());
        assert!(parse(&dir, &["--staging", "state", "--frames-file", "state/frames.yaml"]).is_err());
        assert!(parse(&dir, &["--subtitles", "--scratch", "staging/subtitles"]).is_err());
        assert!(parse(&dir, &["--staging", "frame-staging"]).is_ok());
    }

    #[test]
    fn test_subtitle_settings() {
        let dir = TempDir::new().unwrap();
        let config = parse(
            &dir,
            &[
                "--subtitles",
                "--subtitle-style",
                "Fontsize=32",
                "--subtitle-style",
                "Bold=1",
            ],
        )
        .unwrap();

        let subtitles = config.subtitles.unwrap();
        assert_eq!(subtitles.language, "eng");
        assert_eq!(subtitles.max_attempts, MAX_SEARCH_ATTEMPTS);
        assert_eq!(
            subtitles.style.to_force_style(),
            "FontName=Arial,Fontsize=32,Outline=1,Bold=1"
        );
    }

    #[test]
    fn test_log_level() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().to_string_lossy().to_string();
        let base = [
            "frame_capture",
            "-i",
            input.as_str(),
            "-o",
            "out",
            "--url-base",
            "https://e.com",
        ];

        let cli = Cli::try_parse_from(base).unwrap();
        assert_eq!(cli.log_level(), LevelFilter::Warn);

        let cli = Cli::try_parse_from(base.iter().copied().chain(["-vv"])).unwrap();
        assert_eq!(cli.log_level(), LevelFilter::Debug);

        let cli = Cli::try_parse_from(base.iter().copied().chain(["-q"])).unwrap();
        assert_eq!(cli.log_level(), LevelFilter::Error);
    }
}
