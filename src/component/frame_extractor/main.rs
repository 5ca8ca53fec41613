use super::ffmpeg_command::{ExtractionRequest, FfmpegCommand};
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::Path;
use std::process::Command;

const LOG_TARGET: &str = "frame_capture::extractor";

/// 影格擷取工具的呼叫介面
///
/// 實作必須把編號影格寫入 `staging_dir`；失敗時回傳錯誤，呼叫端不會發布也不會記帳。
pub trait FrameExtractor {
    fn extract(&self, request: &ExtractionRequest, staging_dir: &Path) -> Result<()>;
}

/// 以外部 ffmpeg 擷取影格
pub struct FfmpegExtractor {
    program: String,
}

impl Default for FfmpegExtractor {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegExtractor {
    #[must_use]
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }
}

impl FrameExtractor for FfmpegExtractor {
    fn extract(&self, request: &ExtractionRequest, staging_dir: &Path) -> Result<()> {
        let ffmpeg_cmd = FfmpegCommand::new(request, staging_dir);
        debug!(
            target: LOG_TARGET,
            "執行擷取: {} {}",
            self.program,
            ffmpeg_cmd.args().join(" ")
        );

        let mut command = ffmpeg_cmd.build_command(&self.program);
        isolate_process_group(&mut command);
        let output = command
            .output()
            .with_context(|| format!("無法執行 {}", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "{} 擷取失敗 ({}): {}",
                self.program,
                output.status,
                stderr.trim()
            );
        }

        info!(
            target: LOG_TARGET,
            "擷取完成: {} (每 {} 秒一張)",
            request.video_path.display(),
            request.interval_seconds
        );
        Ok(())
    }
}

/// 子行程放在獨立的行程群組，終端機的 Ctrl-C 只送到本程式，擷取中的影片會完成
#[cfg(unix)]
fn isolate_process_group(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
fn isolate_process_group(_command: &mut Command) {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn request() -> ExtractionRequest {
        ExtractionRequest {
            video_path: PathBuf::from("/videos/Show_S01E01_Pilot.mkv"),
            identifier: "Show_S01E01_Pilot".to_string(),
            interval_seconds: 14,
            subtitle: None,
        }
    }

    #[test]
    fn test_missing_tool_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let extractor = FfmpegExtractor::new("frame-capture-no-such-tool");
        assert!(extractor.extract(&request(), temp_dir.path()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let extractor = FfmpegExtractor::new("false");
        assert!(extractor.extract(&request(), temp_dir.path()).is_err());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_child_runs_in_own_process_group() {
        let mut command = Command::new("sh");
        command.args(["-c", "cat /proc/$$/stat"]);
        isolate_process_group(&mut command);

        let output = command.output().unwrap();
        let stat = String::from_utf8_lossy(&output.stdout);
        let pid = stat.split_whitespace().next().unwrap().to_string();
        // `pid (comm) state ppid pgrp ...`
        let after_comm = stat.rsplit_once(')').unwrap().1;
        let pgrp = after_comm.split_whitespace().nth(2).unwrap();
        assert_eq!(pgrp, pid);
    }

    #[cfg(unix)]
    #[test]
    fn test_zero_exit_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let extractor = FfmpegExtractor::new("true");
        assert!(extractor.extract(&request(), temp_dir.path()).is_ok());
    }
}
