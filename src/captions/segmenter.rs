use std::fmt;
use std::str::FromStr;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::CaptionError;

// @module: Splitting narrative text into caption units

// @const: Sentence boundary: terminal punctuation, whitespace, then an opener
static SENTENCE_BOUNDARY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[.!?…]\s+(["“\p{Lu}\d])"#).unwrap()
});

// @const: One or more blank lines
static PARAGRAPH_BREAK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n\s*\n").unwrap()
});

/// Default number of words per caption in `word` mode
pub const DEFAULT_WORD_GROUP_SIZE: usize = 3;

/// Default number of words per caption in `simple` mode
pub const DEFAULT_SIMPLE_GROUP_SIZE: usize = 5;

/// How text is cut into caption units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CaptionMode {
    // @mode: One unit per sentence
    #[default]
    Sentence,
    // @mode: One unit per blank-line separated paragraph
    Paragraph,
    // @mode: Small fixed-size word groups
    Word,
    // @mode: Larger fixed-size word groups, ignoring sentence boundaries
    Simple,
}

/// How the timeline distributes duration across units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weighting {
    /// Proportional to the number of characters in each unit
    CharacterCount,
    /// Every unit gets the same share
    Equal,
}

impl CaptionMode {
    /// All supported modes, in CLI order
    pub const ALL: [CaptionMode; 4] = [
        CaptionMode::Sentence,
        CaptionMode::Paragraph,
        CaptionMode::Word,
        CaptionMode::Simple,
    ];

    // @returns: Lowercase mode identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sentence => "sentence",
            Self::Paragraph => "paragraph",
            Self::Word => "word",
            Self::Simple => "simple",
        }
    }

    /// Word groups are already roughly uniform, so they share time equally.
    pub fn weighting(&self) -> Weighting {
        match self {
            Self::Sentence | Self::Paragraph => Weighting::CharacterCount,
            Self::Word | Self::Simple => Weighting::Equal,
        }
    }
}

impl fmt::Display for CaptionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CaptionMode {
    type Err = CaptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sentence" => Ok(Self::Sentence),
            "paragraph" => Ok(Self::Paragraph),
            "word" => Ok(Self::Word),
            "simple" => Ok(Self::Simple),
            _ => Err(CaptionError::UnsupportedMode(s.to_string())),
        }
    }
}

/// One chunk of source text destined to become one subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionUnit {
    index: usize,
    text: String,
}

impl CaptionUnit {
    /// 1-based position in the sequence
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of characters, used as the timing weight
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Splits text into caption units according to a [`CaptionMode`]
#[derive(Debug, Clone)]
pub struct Segmenter {
    mode: CaptionMode,
    word_group_size: usize,
    simple_group_size: usize,
}

impl Segmenter {
    /// Create a segmenter with the default group sizes
    pub fn new(mode: CaptionMode) -> Self {
        Self {
            mode,
            word_group_size: DEFAULT_WORD_GROUP_SIZE,
            simple_group_size: DEFAULT_SIMPLE_GROUP_SIZE,
        }
    }

    /// Override the word counts used by `word` and `simple` modes
    pub fn with_group_sizes(mut self, word_group_size: usize, simple_group_size: usize) -> Self {
        self.word_group_size = word_group_size;
        self.simple_group_size = simple_group_size;
        self
    }

    pub fn mode(&self) -> CaptionMode {
        self.mode
    }

    /// Split `text` into ordered, 1-indexed caption units.
    ///
    /// Every unit is trimmed and non-empty. Text that is empty after trimming
    /// yields [`CaptionError::EmptyInput`].
    pub fn segment(&self, text: &str) -> Result<Vec<CaptionUnit>, CaptionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CaptionError::EmptyInput);
        }

        let pieces = match self.mode {
            CaptionMode::Sentence => split_sentences(text),
            CaptionMode::Paragraph => split_paragraphs(text),
            CaptionMode::Word => group_words(text, self.checked_size(CaptionMode::Word, self.word_group_size)?),
            CaptionMode::Simple => group_words(text, self.checked_size(CaptionMode::Simple, self.simple_group_size)?),
        };

        let units: Vec<CaptionUnit> = pieces
            .into_iter()
            .filter(|piece| !piece.is_empty())
            .enumerate()
            .map(|(i, text)| CaptionUnit { index: i + 1, text })
            .collect();

        if units.is_empty() {
            return Err(CaptionError::EmptyInput);
        }

        debug!("Segmented {} chars into {} {} units", text.len(), units.len(), self.mode);
        Ok(units)
    }

    fn checked_size(&self, mode: CaptionMode, size: usize) -> Result<usize, CaptionError> {
        if size == 0 {
            return Err(CaptionError::InvalidGroupSize {
                mode: mode.to_string(),
                size,
            });
        }
        Ok(size)
    }
}

/// Collapse whitespace runs (including newlines) into single spaces
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for caps in SENTENCE_BOUNDARY_REGEX.captures_iter(text) {
        // The opener belongs to the next sentence
        let Some(opener) = caps.get(1) else { continue };
        let boundary = opener.start();
        sentences.push(normalize_whitespace(&text[start..boundary]));
        start = boundary;
    }

    // Trailing fragment, with or without terminal punctuation
    if start < text.len() {
        sentences.push(normalize_whitespace(&text[start..]));
    }

    sentences
}

fn split_paragraphs(text: &str) -> Vec<String> {
    PARAGRAPH_BREAK_REGEX
        .split(text)
        .map(|paragraph| {
            paragraph
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect()
}

fn group_words(text: &str, group_size: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words.chunks(group_size).map(|group| group.join(" ")).collect()
}
