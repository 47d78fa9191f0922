use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use log::{debug, warn};

use super::segmenter::{CaptionUnit, Weighting};
use super::timecode;
use crate::errors::CaptionError;

// @module: Timing caption units against a known audio duration

// @struct: Single timed subtitle entry
#[derive(Debug, Clone, PartialEq)]
pub struct TimedCaption {
    // @field: Sequence number, 1-based
    pub index: usize,

    // @field: Caption text
    pub text: String,

    // @field: Start offset in seconds
    pub start_seconds: f64,

    // @field: End offset in seconds
    pub end_seconds: f64,
}

impl TimedCaption {
    /// Length of the interval in seconds
    pub fn duration(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        timecode::format_timestamp(self.start_seconds)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        timecode::format_timestamp(self.end_seconds)
    }
}

impl fmt::Display for TimedCaption {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Contiguous timed captions covering exactly `total_duration` seconds
#[derive(Debug, Clone)]
pub struct CaptionTimeline {
    captions: Vec<TimedCaption>,
    total_duration: f64,
}

impl CaptionTimeline {
    /// Build a timeline, weighting units by character count or equally.
    pub fn build(units: &[CaptionUnit], total_duration: f64, weighting: Weighting) -> Result<Self, CaptionError> {
        let weights: Vec<f64> = match weighting {
            Weighting::CharacterCount => units.iter().map(|u| u.char_count() as f64).collect(),
            Weighting::Equal => vec![1.0; units.len()],
        };
        Self::build_weighted(units, &weights, total_duration)
    }

    /// Build a timeline from explicit per-unit weights.
    ///
    /// Each unit gets `total_duration * weight / sum(weights)`. Boundaries are
    /// computed from cumulative weights so rounding does not accumulate, and the
    /// last end is pinned to `total_duration`. When the weights sum to zero every
    /// unit gets `total_duration / N`. `weights` must have one entry per unit.
    pub fn build_weighted(units: &[CaptionUnit], weights: &[f64], total_duration: f64) -> Result<Self, CaptionError> {
        if !total_duration.is_finite() || total_duration <= 0.0 {
            return Err(CaptionError::InvalidDuration(total_duration));
        }
        if units.is_empty() {
            return Err(CaptionError::EmptyInput);
        }
        if weights.len() != units.len() {
            return Err(CaptionError::WeightCountMismatch {
                units: units.len(),
                weights: weights.len(),
            });
        }

        // Negative or NaN weights contribute nothing
        let mut weights: Vec<f64> = weights
            .iter()
            .map(|w| if w.is_finite() && *w > 0.0 { *w } else { 0.0 })
            .collect();

        let mut weight_sum: f64 = weights.iter().sum();
        if weight_sum <= 0.0 {
            warn!("All caption weights are zero, dividing {:.3}s equally across {} units", total_duration, units.len());
            weights = vec![1.0; units.len()];
            weight_sum = units.len() as f64;
        }

        let last = units.len() - 1;
        let mut captions = Vec::with_capacity(units.len());
        let mut cumulative_weight = 0.0;
        let mut start = 0.0;

        for (i, unit) in units.iter().enumerate() {
            cumulative_weight += weights[i];
            let end = if i == last {
                total_duration
            } else {
                total_duration * cumulative_weight / weight_sum
            };

            captions.push(TimedCaption {
                index: i + 1,
                text: unit.text().to_string(),
                start_seconds: start,
                end_seconds: end,
            });
            start = end;
        }

        debug!("Built caption timeline: {} entries over {:.3}s", captions.len(), total_duration);

        Ok(Self {
            captions,
            total_duration,
        })
    }

    pub fn captions(&self) -> &[TimedCaption] {
        &self.captions
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn len(&self) -> usize {
        self.captions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captions.is_empty()
    }

    /// Render the whole timeline as SRT text
    pub fn to_srt_string(&self) -> String {
        self.captions.iter().map(|caption| caption.to_string()).collect()
    }

    /// Write subtitles to an SRT file
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<(), CaptionError> {
        let path = path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = File::create(path)?;
        for caption in &self.captions {
            write!(file, "{}", caption)?;
        }
        file.flush()?;

        debug!("Wrote {} captions to {}", self.captions.len(), path.display());
        Ok(())
    }
}

impl fmt::Display for CaptionTimeline {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Caption Timeline")?;
        writeln!(f, "Entries: {}", self.captions.len())?;
        writeln!(f, "Duration: {}", timecode::format_timestamp(self.total_duration))?;
        Ok(())
    }
}
