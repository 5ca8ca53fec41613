use crate::config::SubtitleStyle;
use std::path::{Path, PathBuf};
use std::process::Command;

/// 燒錄用的字幕檔與樣式
#[derive(Debug, Clone)]
pub struct SubtitleBurn {
    pub path: PathBuf,
    pub style: SubtitleStyle,
}

/// 單支影片的擷取請求
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub video_path: PathBuf,
    /// 輸出檔名使用的識別名稱（不含副檔名）
    pub identifier: String,
    pub interval_seconds: u64,
    pub subtitle: Option<SubtitleBurn>,
}

pub struct FfmpegCommand {
    source_path: PathBuf,
    output_pattern: PathBuf,
    filter_chain: String,
    preserve_timestamps: bool,
}

impl FfmpegCommand {
    #[must_use]
    pub fn new(request: &ExtractionRequest, staging_dir: &Path) -> Self {
        Self {
            source_path: request.video_path.clone(),
            output_pattern: Self::generate_output_pattern(staging_dir, &request.identifier),
            filter_chain: build_filter_chain(request.interval_seconds, request.subtitle.as_ref()),
            // subtitles 與 fps 串在同一條濾鏡鏈時必須保留原始時間戳
            preserve_timestamps: request.subtitle.is_some(),
        }
    }

    /// `%04d-<identifier>.jpg`，識別名稱內的 `%` 需跳脫
    fn generate_output_pattern(staging_dir: &Path, identifier: &str) -> PathBuf {
        staging_dir.join(format!("%04d-{}.jpg", identifier.replace('%', "%%")))
    }

    #[must_use]
    pub fn output_pattern(&self) -> &Path {
        &self.output_pattern
    }

    #[must_use]
    pub fn filter_chain(&self) -> &str {
        &self.filter_chain
    }

    /// 每次呼叫都建立新的參數列表
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-nostdin".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-y".to_string(),
            "-i".to_string(),
            self.source_path.to_string_lossy().to_string(),
        ];

        if self.preserve_timestamps {
            args.push("-copyts".to_string());
        }

        args.extend([
            "-vf".to_string(),
            self.filter_chain.clone(),
            self.output_pattern.to_string_lossy().to_string(),
        ]);

        args
    }

    #[must_use]
    pub fn build_command(&self, program: &str) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(self.args());
        cmd
    }
}

/// 建立濾鏡鏈：`fps=1/<interval>`，有字幕時先 `subtitles=...` 再取樣
fn build_filter_chain(interval_seconds: u64, subtitle: Option<&SubtitleBurn>) -> String {
    let mut filters = Vec::new();

    if let Some(burn) = subtitle {
        let mut filter = format!(
            "subtitles={}",
            escape_filter_option(&burn.path.to_string_lossy())
        );
        if !burn.style.is_empty() {
            filter.push_str(&format!(
                ":force_style={}",
                escape_filter_option(&burn.style.to_force_style())
            ));
        }
        filters.push(filter);
    }

    filters.push(format!("fps=1/{interval_seconds}"));
    filters.join(",")
}

/// 濾鏡參數值需經兩層跳脫
///
/// 1. 選項層：`\`、`'`、`:` 前加反斜線
/// 2. 濾鏡圖層：整段以單引號包住，值內的單引號以 `'\''` 表示
fn escape_filter_option(value: &str) -> String {
    let mut option_level = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '\'' | ':') {
            option_level.push('\\');
        }
        option_level.push(c);
    }
    format!("'{}'", option_level.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(subtitle: Option<SubtitleBurn>) -> ExtractionRequest {
        ExtractionRequest {
            video_path: PathBuf::from("/videos/Show_S01E01_Pilot.mkv"),
            identifier: "Show_S01E01_Pilot".to_string(),
            interval_seconds: 14,
            subtitle,
        }
    }

    fn burn() -> SubtitleBurn {
        SubtitleBurn {
            path: PathBuf::from("/tmp/subs/1951976245.srt"),
            style: SubtitleStyle::from_pairs(vec![
                ("Fontsize".to_string(), "24".to_string()),
                ("FontName".to_string(), "Arial".to_string()),
            ]),
        }
    }

    #[test]
    fn test_output_pattern() {
        let cmd = FfmpegCommand::new(&request(None), Path::new("/staging"));
        assert_eq!(
            cmd.output_pattern(),
            Path::new("/staging/%04d-Show_S01E01_Pilot.jpg")
        );
    }

    #[test]
    fn test_output_pattern_escapes_percent() {
        let mut req = request(None);
        req.identifier = "Show_S01E01_100% Pilot".to_string();
        let cmd = FfmpegCommand::new(&req, Path::new("/staging"));
        assert_eq!(
            cmd.output_pattern(),
            Path::new("/staging/%04d-Show_S01E01_100%% Pilot.jpg")
        );
    }

    #[test]
    fn test_interval_only_args() {
        let cmd = FfmpegCommand::new(&request(None), Path::new("/staging"));
        let args = cmd.args();

        assert_eq!(cmd.filter_chain(), "fps=1/14");
        assert!(!args.contains(&"-copyts".to_string()));
        assert_eq!(args.last().unwrap(), "/staging/%04d-Show_S01E01_Pilot.jpg");

        let input_index = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[input_index + 1], "/videos/Show_S01E01_Pilot.mkv");
    }

    #[test]
    fn test_subtitle_filter_chain() {
        let cmd = FfmpegCommand::new(&request(Some(burn())), Path::new("/staging"));

        assert_eq!(
            cmd.filter_chain(),
            "subtitles='/tmp/subs/1951976245.srt':force_style='Fontsize=24,FontName=Arial',fps=1/14"
        );
        assert!(cmd.args().contains(&"-copyts".to_string()));
    }

    #[test]
    fn test_escape_filter_option_plain_path() {
        assert_eq!(
            escape_filter_option("/tmp/subs/1951976245.srt"),
            "'/tmp/subs/1951976245.srt'"
        );
    }

    #[test]
    fn test_escape_filter_option_apostrophe() {
        assert_eq!(escape_filter_option("it's.srt"), r"'it\'\''s.srt'");
    }

    #[test]
    fn test_escape_filter_option_colon_and_backslash() {
        assert_eq!(
            escape_filter_option(r"C:\subs\a.srt"),
            r"'C\:\\subs\\a.srt'"
        );
        assert_eq!(
            escape_filter_option("/scratch/10:30/77.srt"),
            r"'/scratch/10\:30/77.srt'"
        );
    }

    #[test]
    fn test_subtitle_filter_chain_with_special_path() {
        let mut special = burn();
        special.path = PathBuf::from("/tmp/Bob's subs:1/77.srt");
        let cmd = FfmpegCommand::new(&request(Some(special)), Path::new("/staging"));

        assert_eq!(
            cmd.filter_chain(),
            r"subtitles='/tmp/Bob\'\''s subs\:1/77.srt':force_style='Fontsize=24,FontName=Arial',fps=1/14"
        );
    }

    #[test]
    fn test_args_are_fresh_per_call() {
        let cmd = FfmpegCommand::new(&request(Some(burn())), Path::new("/staging"));
        let first = cmd.args();
        let second = cmd.args();
        assert_eq!(first, second);
        assert_eq!(
            first.iter().filter(|a| a.as_str() == "-copyts").count(),
            1
        );
    }
}
