use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::captions::{CaptionGenerator, CaptionMode, CaptionTimeline, Segmenter};
use crate::file_utils::{FileManager, FileType};
use crate::media::{CaptionSource, CompositionJob, CompositionReport, MediaAsset, VideoCompositor};
use crate::style::StyleOverrides;

// @module: Application controller for text-to-video rendering

/// One render: narration text plus the media to put it on
#[derive(Debug, Clone, Default)]
pub struct RenderRequest {
    // @field: Narration text
    pub text: String,
    // @field: Narration audio; its duration drives everything
    pub audio: PathBuf,
    // @field: Background video
    pub background: PathBuf,
    // @field: Final video path
    pub output: PathBuf,
    // @field: Also keep the SRT here
    pub srt_out: Option<PathBuf>,
    // @field: Segmentation mode, config value when None
    pub mode: Option<CaptionMode>,
    // @field: Style overrides layered over the config style
    pub style: StyleOverrides,
    // @field: Loop policy, config value when None
    pub loop_background: Option<bool>,
    // @field: Trim policy, config value when None
    pub trim_background: Option<bool>,
    // @field: Replace an existing output file
    pub force_overwrite: bool,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Media pipeline
    compositor: VideoCompositor,
}

impl Controller {
    // @method: Create a controller driving the system ffmpeg
    pub fn with_config(config: Config) -> Result<Self> {
        let compositor = VideoCompositor::from_config(&config.video);
        Self::with_compositor(config, compositor)
    }

    // @method: Create a controller around an existing compositor
    pub fn with_compositor(config: Config, compositor: VideoCompositor) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        Ok(Self { config, compositor })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn compositor(&self) -> &VideoCompositor {
        &self.compositor
    }

    /// Fail early when ffmpeg or ffprobe cannot be started
    pub fn check_tools(&self) -> Result<()> {
        self.compositor.check_tools().context("Media tools are not available")?;
        Ok(())
    }

    /// Probe a media file
    pub fn probe<P: AsRef<Path>>(&self, path: P) -> Result<MediaAsset> {
        let path = path.as_ref();
        self.compositor
            .probe(path)
            .with_context(|| format!("Failed to probe {:?}", path))
    }

    /// Length of the narration in seconds
    pub fn audio_duration<P: AsRef<Path>>(&self, audio: P) -> Result<f64> {
        Ok(self.probe(audio)?.duration_seconds)
    }

    // @method: Generator for the configured mode, or `mode` when given
    pub fn caption_generator(&self, mode: Option<CaptionMode>) -> CaptionGenerator {
        let captions = &self.config.captions;
        let segmenter = Segmenter::new(mode.unwrap_or(captions.mode))
            .with_group_sizes(captions.word_group_size, captions.simple_group_size);
        CaptionGenerator::new(segmenter)
    }

    /// Write an SRT for `text` spread over `duration` seconds
    pub fn generate_captions<P: AsRef<Path>>(
        &self,
        text: &str,
        duration: f64,
        output: P,
        mode: Option<CaptionMode>,
    ) -> Result<CaptionTimeline> {
        let output = output.as_ref();
        let timeline = self
            .caption_generator(mode)
            .generate_srt(text, duration, output)
            .with_context(|| format!("Failed to generate captions for {:?}", output))?;
        Ok(timeline)
    }

    /// Run one render. Returns `None` when the output exists and
    /// `force_overwrite` is off.
    pub fn render(&self, request: &RenderRequest) -> Result<Option<CompositionReport>> {
        let start_time = Instant::now();

        for (label, path) in [("Audio", &request.audio), ("Background video", &request.background)] {
            if !FileManager::file_exists(path) {
                return Err(anyhow!("{} file does not exist: {:?}", label, path));
            }
        }
        if let Ok(kind) = FileManager::detect_file_type(&request.background) {
            if kind != FileType::Video && kind != FileType::Unknown {
                warn!("Background {:?} looks like {:?}, not a video", request.background, kind);
            }
        }

        if request.output.exists() {
            if !request.force_overwrite {
                warn!("Skipping render, output already exists (use -f to force overwrite)");
                return Ok(None);
            }
            info!("Overwriting existing output: {:?}", request.output);
        }

        let progress = Self::spinner();

        progress.set_message("Probing narration");
        let duration = self.audio_duration(&request.audio)?;
        info!("Audio duration: {:.2} seconds", duration);

        progress.set_message("Building captions");
        let generator = self.caption_generator(request.mode);
        let timeline = generator
            .build_timeline(&request.text, duration)
            .context("Failed to build caption timeline")?;
        info!("Generated {} {} captions", timeline.len(), generator.mode());

        if let Some(srt_out) = &request.srt_out {
            timeline
                .write_to_srt(srt_out)
                .with_context(|| format!("Failed to write subtitles to {:?}", srt_out))?;
            info!("Subtitles saved to: {}", srt_out.display());
        }

        let job = CompositionJob {
            background: request.background.clone(),
            audio: request.audio.clone(),
            captions: CaptionSource::Timeline(timeline),
            style: self.config.style.overlay(&request.style),
            output: request.output.clone(),
            loop_background: request.loop_background.unwrap_or(self.config.video.loop_background),
            trim_background: request.trim_background.unwrap_or(self.config.video.trim_background),
        };

        progress.set_message(format!("Compositing with {} renderer", self.compositor.renderer_name()));
        let result = self.compositor.create_video(&job);
        progress.finish_and_clear();

        let report = result.context("Video composition failed")?;
        info!(
            "Render completed in {}: {}",
            Self::format_duration(start_time.elapsed()),
            report.output.display()
        );
        Ok(Some(report))
    }

    /// Still frame at `time` seconds
    pub fn extract_frame<P1: AsRef<Path>, P2: AsRef<Path>>(&self, video: P1, output: P2, time: f64) -> Result<PathBuf> {
        let video = video.as_ref();
        if !FileManager::file_exists(video) {
            return Err(anyhow!("Video file does not exist: {:?}", video));
        }
        let path = self
            .compositor
            .extract_frame(video, output, time)
            .context("Frame extraction failed")?;
        Ok(path)
    }

    /// Downscaled preview; bounds default to the `preview` config section
    pub fn create_preview<P1: AsRef<Path>, P2: AsRef<Path>>(
        &self,
        video: P1,
        output: P2,
        max_width: Option<u32>,
        max_height: Option<u32>,
    ) -> Result<PathBuf> {
        let video = video.as_ref();
        if !FileManager::file_exists(video) {
            return Err(anyhow!("Video file does not exist: {:?}", video));
        }
        let max_width = max_width.unwrap_or(self.config.preview.max_width);
        let max_height = max_height.unwrap_or(self.config.preview.max_height);
        if max_width == 0 || max_height == 0 {
            return Err(anyhow!("Preview bounds must be positive, got {}x{}", max_width, max_height));
        }

        let path = self
            .compositor
            .create_preview(video, output, max_width, max_height)
            .context("Preview creation failed")?;
        Ok(path)
    }

    fn spinner() -> ProgressBar {
        let progress = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        progress.set_style(style);
        progress.enable_steady_tick(Duration::from_millis(120));
        progress
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:01}s", seconds, duration.subsec_millis() / 100)
        }
    }
}
