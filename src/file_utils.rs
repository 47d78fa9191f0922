use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

// @module: File and directory utilities

static SRT_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+\s*\r?\n\d{2}:\d{2}:\d{2},\d{3}\s+-->\s+\d{2}:\d{2}:\d{2},\d{3}")
        .unwrap()
});

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path).with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path).with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Narration text from a file or an inline string; the file wins when both are given
    pub fn read_text_input(file: Option<&Path>, inline: Option<&str>) -> Result<String> {
        match (file, inline) {
            (Some(path), _) => Self::read_to_string(path),
            (None, Some(text)) => Ok(text.to_string()),
            (None, None) => Err(anyhow::anyhow!("No text given: use --text or --text-input")),
        }
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content).with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Move a finished file into place.
    ///
    /// Tries a rename first. Across filesystems the content is copied into a
    /// `.part` sibling and renamed, so `to` never holds a half-written file.
    pub fn move_file<P1: AsRef<Path>, P2: AsRef<Path>>(from: P1, to: P2) -> io::Result<()> {
        let from = from.as_ref();
        let to = to.as_ref();

        if let Some(parent) = to.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        if fs::rename(from, to).is_ok() {
            return Ok(());
        }

        let mut partial = to.as_os_str().to_owned();
        partial.push(".part");
        let partial = PathBuf::from(partial);

        if let Err(e) = fs::copy(from, &partial).and_then(|_| fs::rename(&partial, to)) {
            let _ = fs::remove_file(&partial);
            return Err(e);
        }
        let _ = fs::remove_file(from);
        Ok(())
    }

    /// Classify a file by extension, sniffing SRT content for unknown extensions
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> Result<FileType> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow::anyhow!("File does not exist: {:?}", path));
        }

        if let Some(ext) = path.extension() {
            let ext_str = ext.to_string_lossy().to_lowercase();
            let kind = FileType::from_extension(&ext_str);
            if kind != FileType::Unknown {
                return Ok(kind);
            }
        }

        // Fall back to examining file contents
        if let Ok(content) = fs::read_to_string(path) {
            if content.contains("-->") && SRT_BLOCK.is_match(&content) {
                return Ok(FileType::Subtitle);
            }
        }

        Ok(FileType::Unknown)
    }
}

/// Enum representing different file types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Container with a video stream
    Video,
    /// Narration audio
    Audio,
    /// Subtitle file (SRT)
    Subtitle,
    /// Plain narration text
    Text,
    /// Still image such as an extracted frame
    Image,
    /// Unknown file type
    Unknown,
}

impl FileType {
    pub fn from_extension(ext: &str) -> Self {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "mp4" | "mkv" | "avi" | "mov" | "wmv" | "flv" | "webm" | "m4v" | "mpg" | "mpeg" | "ogv" | "ts" | "mts"
            | "m2ts" => FileType::Video,
            "mp3" | "wav" | "m4a" | "aac" | "flac" | "ogg" | "opus" | "wma" => FileType::Audio,
            "srt" => FileType::Subtitle,
            "txt" | "md" => FileType::Text,
            "jpg" | "jpeg" | "png" | "bmp" | "webp" => FileType::Image,
            _ => FileType::Unknown,
        }
    }
}
