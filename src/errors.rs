/*!
 * Error types for the text2video application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while segmenting text and building caption timelines
#[derive(Error, Debug)]
pub enum CaptionError {
    /// The input text was empty after trimming, so there is nothing to time
    #[error("No text to caption: input is empty")]
    EmptyInput,

    /// A segmentation mode name that is not one of sentence, paragraph, word or simple
    #[error("Unsupported caption mode: {0}")]
    UnsupportedMode(String),

    /// The target duration was zero, negative or not a finite number
    #[error("Invalid caption duration: {0} seconds")]
    InvalidDuration(f64),

    /// A word group size of zero was configured
    #[error("Invalid group size for {mode} mode: {size}")]
    InvalidGroupSize {
        /// Mode the size belongs to
        mode: String,
        /// Offending size
        size: usize,
    },

    /// Explicit weights did not line up with the caption units
    #[error("Got {weights} caption weights for {units} units")]
    WeightCountMismatch {
        /// Number of caption units
        units: usize,
        /// Number of weights supplied
        weights: usize,
    },

    /// Failure while writing the subtitle file
    #[error("Failed to write subtitle file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the external media tools (ffmpeg and ffprobe)
#[derive(Error, Debug)]
pub enum MediaError {
    /// The binary could not be started at all
    #[error("{tool} not found at '{path}'. Install it or configure its path")]
    ToolNotFound {
        /// Tool name, e.g. "ffmpeg"
        tool: String,
        /// Path or command name that was tried
        path: PathBuf,
    },

    /// Media inspection failed or returned output we could not use
    #[error("Failed to probe {path:?}: {message}")]
    Probe {
        /// File that was being inspected
        path: PathBuf,
        /// Diagnostic text captured from ffprobe or from parsing
        message: String,
    },

    /// An encoding, compositing or extraction invocation failed
    #[error("ffmpeg {operation} failed: {message}")]
    Encoding {
        /// Stage that was running, e.g. "subtitle burn"
        operation: String,
        /// Diagnostic text captured from ffmpeg
        message: String,
    },

    /// Filesystem failure around the job workspace or output path
    #[error("Media I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while resolving subtitle styles
#[derive(Error, Debug)]
pub enum StyleError {
    /// Override mapping contained a key that is not a known style attribute
    #[error("Unknown subtitle style key: {0}")]
    UnknownKey(String),

    /// A numeric attribute could not be parsed
    #[error("Invalid value for style key {key}: {value}")]
    InvalidValue {
        /// Style key
        key: String,
        /// Raw value that failed to parse
        value: String,
    },
}
