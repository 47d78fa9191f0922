/*!
 * Caption generation: text segmentation, timing and SRT output.
 *
 * - `timecode`: SRT timestamp formatting (truncating) and parsing
 * - `segmenter`: sentence / paragraph / word / simple splitting
 * - `timeline`: proportional timing and SRT serialization
 */

pub mod segmenter;
pub mod timecode;
pub mod timeline;

use std::path::Path;

use log::info;

pub use segmenter::{CaptionMode, CaptionUnit, Segmenter, Weighting};
pub use timeline::{CaptionTimeline, TimedCaption};

use crate::app_config::CaptionConfig;
use crate::errors::CaptionError;

/// Turns narrative text into a timed subtitle track
#[derive(Debug, Clone)]
pub struct CaptionGenerator {
    segmenter: Segmenter,
}

impl CaptionGenerator {
    pub fn new(segmenter: Segmenter) -> Self {
        Self { segmenter }
    }

    /// Build a generator from a mode name such as `"sentence"`.
    ///
    /// Unknown names fail with [`CaptionError::UnsupportedMode`].
    pub fn from_mode_name(mode: &str) -> Result<Self, CaptionError> {
        Ok(Self::new(Segmenter::new(mode.parse()?)))
    }

    /// Build a generator from the `captions` config section
    pub fn from_config(config: &CaptionConfig) -> Self {
        Self::new(
            Segmenter::new(config.mode).with_group_sizes(config.word_group_size, config.simple_group_size),
        )
    }

    pub fn mode(&self) -> CaptionMode {
        self.segmenter.mode()
    }

    /// Segment `text` and time it against `audio_duration` seconds
    pub fn build_timeline(&self, text: &str, audio_duration: f64) -> Result<CaptionTimeline, CaptionError> {
        if !audio_duration.is_finite() || audio_duration <= 0.0 {
            return Err(CaptionError::InvalidDuration(audio_duration));
        }
        let units = self.segmenter.segment(text)?;
        CaptionTimeline::build(&units, audio_duration, self.segmenter.mode().weighting())
    }

    /// Generate an SRT file. Nothing is written unless the timeline builds.
    pub fn generate_srt<P: AsRef<Path>>(&self, text: &str, audio_duration: f64, output_path: P) -> Result<CaptionTimeline, CaptionError> {
        let output_path = output_path.as_ref();
        let timeline = self.build_timeline(text, audio_duration)?;
        timeline.write_to_srt(output_path)?;
        info!("Generated {} {} captions: {}", timeline.len(), self.mode(), output_path.display());
        Ok(timeline)
    }
}
