use crate::component::artifact_publisher::ArtifactPublisher;
use crate::component::frame_extractor::{
    ExtractionRequest, FfmpegExtractor, FrameExtractor, SubtitleBurn,
};
use crate::component::subtitle_resolver::SubtitleResolver;
use crate::config::PipelineConfig;
use crate::tools::{
    FrameStore, InputItem, LedgerEntry, ProcessingLedger, SubtitleOutcome, clear_directory,
    ensure_directory_exists, scan_video_files,
};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

const LOG_TARGET: &str = "frame_capture::pipeline";

/// 單支影片的處理階段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Discovered,
    SubtitleResolution,
    Extracting,
    Publishing,
    Ledgered,
}

/// 單支影片的處理結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// 已在帳本中，未呼叫擷取工具
    Skipped,
    Ledgered { frames: usize, new_frames: usize },
}

/// 整次執行的統計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub discovered: usize,
    pub skipped: usize,
    pub processed: usize,
    pub failed: usize,
    pub frames_published: usize,
    pub new_frames: usize,
    pub interrupted: bool,
}

/// 管線協調器
///
/// 依探索順序逐一處理影片：
/// 字幕解析（可選）→ 擷取 → 發布 → 記帳，結束時一次寫回兩份文件。
pub struct PipelineOrchestrator {
    config: PipelineConfig,
    extractor: Box<dyn FrameExtractor>,
    resolver: Option<SubtitleResolver>,
    shutdown_signal: Arc<AtomicBool>,
}

impl PipelineOrchestrator {
    #[must_use]
    pub fn new(
        config: PipelineConfig,
        extractor: Box<dyn FrameExtractor>,
        resolver: Option<SubtitleResolver>,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config,
            extractor,
            resolver,
            shutdown_signal,
        }
    }

    /// 使用 ffmpeg 與 OpenSubtitles 建立協調器
    pub fn from_config(config: PipelineConfig, shutdown_signal: Arc<AtomicBool>) -> Result<Self> {
        let resolver = config
            .subtitles
            .as_ref()
            .map(SubtitleResolver::from_settings)
            .transpose()
            .context("無法建立字幕解析器")?;

        Ok(Self::new(
            config,
            Box::new(FfmpegExtractor::default()),
            resolver,
            shutdown_signal,
        ))
    }

    pub fn run(&self) -> Result<RunSummary> {
        self.config.validate_paths()?;
        let videos = scan_video_files(&self.config.input_root, &self.config.extension)?;
        ensure_directory_exists(&self.config.staging_dir)?;
        ensure_directory_exists(&self.config.output_dir)?;

        let mut ledger = ProcessingLedger::load(&self.config.ledger_file)?;
        let mut store = FrameStore::load(&self.config.frames_file)?;
        let publisher = ArtifactPublisher::new(&self.config.output_dir, &self.config.url_base);

        info!(
            target: LOG_TARGET,
            "開始處理 {} 支影片（帳本已完成 {} 支，影格資料 {} 筆）",
            videos.len(),
            ledger.done_count(),
            store.len()
        );

        let progress_bar = self.progress_bar(videos.len() as u64)?;
        let mut summary = RunSummary {
            discovered: videos.len(),
            ..RunSummary::default()
        };

        for video_path in &videos {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                warn!(target: LOG_TARGET, "收到中斷訊號，停止處理剩餘影片");
                summary.interrupted = true;
                break;
            }

            let display_name = video_path
                .file_name()
                .map_or_else(|| video_path.display().to_string(), |s| s.to_string_lossy().to_string());
            progress_bar.set_message(display_name.clone());

            match self.process_item(video_path, &mut ledger, &mut store, &publisher) {
                Ok(ItemOutcome::Skipped) => {
                    debug!(target: LOG_TARGET, "已處理過，跳過: {display_name}");
                    summary.skipped += 1;
                }
                Ok(ItemOutcome::Ledgered { frames, new_frames }) => {
                    summary.processed += 1;
                    summary.frames_published += frames;
                    summary.new_frames += new_frames;
                }
                Err(e) => {
                    error!(target: LOG_TARGET, "處理影片失敗 {display_name}: {e:#}");
                    summary.failed += 1;
                }
            }
            progress_bar.inc(1);
        }
        progress_bar.finish_and_clear();

        store.persist()?;
        ledger.persist()?;

        info!(
            target: LOG_TARGET,
            "處理完成 - 新增: {}, 跳過: {}, 失敗: {}, 影格: {}",
            summary.processed,
            summary.skipped,
            summary.failed,
            summary.frames_published
        );
        Ok(summary)
    }

    fn process_item(
        &self,
        video_path: &Path,
        ledger: &mut ProcessingLedger,
        store: &mut FrameStore,
        publisher: &ArtifactPublisher,
    ) -> Result<ItemOutcome> {
        let file_name = video_path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow::anyhow!("無法取得檔案名稱: {}", video_path.display()))?;

        if ledger.is_done(file_name) {
            return Ok(ItemOutcome::Skipped);
        }

        let item = InputItem::from_path(video_path)?;
        self.log_state(&item, ItemState::Discovered);

        let (subtitle, subs) = match &self.resolver {
            Some(resolver) => {
                self.log_state(&item, ItemState::SubtitleResolution);
                self.resolve_subtitle(resolver, &item)
            }
            None => (None, SubtitleOutcome::disabled()),
        };

        self.log_state(&item, ItemState::Extracting);
        let cleared = clear_directory(&self.config.staging_dir)?;
        if cleared > 0 {
            warn!(target: LOG_TARGET, "清除暫存區殘留的 {cleared} 個檔案");
        }

        let request = ExtractionRequest {
            video_path: item.path.clone(),
            identifier: item.identifier.clone(),
            interval_seconds: self.config.capture_interval,
            subtitle,
        };
        self.extractor
            .extract(&request, &self.config.staging_dir)
            .with_context(|| format!("擷取失敗: {}", item.file_name))?;

        self.log_state(&item, ItemState::Publishing);
        let published = publisher.publish_staged(&self.config.staging_dir, &item, store)?;
        let new_frames = published.iter().filter(|f| f.newly_recorded).count();

        ledger.mark_done(
            &item.file_name,
            LedgerEntry {
                capture_interval: self.config.capture_interval,
                subs,
            },
        );
        self.log_state(&item, ItemState::Ledgered);

        Ok(ItemOutcome::Ledgered {
            frames: published.len(),
            new_frames,
        })
    }

    fn resolve_subtitle(
        &self,
        resolver: &SubtitleResolver,
        item: &InputItem,
    ) -> (Option<SubtitleBurn>, SubtitleOutcome) {
        let style = self
            .config
            .subtitles
            .as_ref()
            .map(|s| s.style.clone())
            .unwrap_or_default();

        match resolver.resolve(item) {
            Some(resolved) => {
                let outcome = SubtitleOutcome {
                    enabled: true,
                    download_successful: Some(true),
                    subtitle_id: Some(resolved.subtitle_id),
                    format: Some(style.to_force_style()),
                };
                let burn = SubtitleBurn {
                    path: resolved.path,
                    style,
                };
                (Some(burn), outcome)
            }
            None => (
                None,
                SubtitleOutcome {
                    enabled: true,
                    download_successful: Some(false),
                    subtitle_id: None,
                    format: None,
                },
            ),
        }
    }

    fn log_state(&self, item: &InputItem, state: ItemState) {
        debug!(target: LOG_TARGET, "{} -> {state:?}", item.file_name);
    }

    fn progress_bar(&self, len: u64) -> Result<ProgressBar> {
        if !self.config.show_progress {
            return Ok(ProgressBar::hidden());
        }

        let progress_bar = ProgressBar::new(len);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
                )?
                .progress_chars("#>-"),
        );
        Ok(progress_bar)
    }
}
