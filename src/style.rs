/*!
 * Subtitle style resolution.
 *
 * A fixed default style is shallow-merged with caller overrides and rendered
 * into the `force_style` directive understood by ffmpeg's `subtitles` filter.
 * Values are not checked for legality here; a bad colour or font surfaces as
 * an encoder failure.
 */

use log::warn;
use serde::{Deserialize, Serialize};

use crate::errors::StyleError;

/// Fully resolved subtitle style (ASS style attributes)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubtitleStyle {
    pub font_name: String,
    pub font_size: u32,
    /// Fill colour, `&HBBGGRR`
    pub primary_colour: String,
    pub outline_colour: String,
    /// Box colour, `&HAABBGGRR`
    pub back_colour: String,
    pub bold: bool,
    /// 1 = outline + shadow, 3 or 4 = opaque box
    pub border_style: u8,
    /// Outline width in pixels
    pub outline: u32,
    /// Numpad layout: 2 bottom-centre, 5 middle, 8 top
    pub alignment: u8,
    /// Vertical margin in pixels
    pub margin_v: u32,
}

impl Default for SubtitleStyle {
    fn default() -> Self {
        Self {
            font_name: "Arial".to_string(),
            font_size: 24,
            primary_colour: "&HFFFFFF".to_string(),
            outline_colour: "&H000000".to_string(),
            back_colour: "&H80000000".to_string(),
            bold: false,
            border_style: 4,
            outline: 1,
            alignment: Position::Bottom.alignment(),
            margin_v: 30,
        }
    }
}

impl SubtitleStyle {
    /// Shallow merge: every key present in `overrides` replaces the current value
    pub fn merged(&self, overrides: &StyleOverrides) -> Self {
        Self {
            font_name: overrides.font_name.clone().unwrap_or_else(|| self.font_name.clone()),
            font_size: overrides.font_size.unwrap_or(self.font_size),
            primary_colour: overrides.primary_colour.clone().unwrap_or_else(|| self.primary_colour.clone()),
            outline_colour: overrides.outline_colour.clone().unwrap_or_else(|| self.outline_colour.clone()),
            back_colour: overrides.back_colour.clone().unwrap_or_else(|| self.back_colour.clone()),
            bold: overrides.bold.unwrap_or(self.bold),
            border_style: overrides.border_style.unwrap_or(self.border_style),
            outline: overrides.outline.unwrap_or(self.outline),
            alignment: overrides.alignment.unwrap_or(self.alignment),
            margin_v: overrides.margin_v.unwrap_or(self.margin_v),
        }
    }

    /// `Key=Value` pairs in fixed order
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("FontName", self.font_name.clone()),
            ("FontSize", self.font_size.to_string()),
            ("PrimaryColour", self.primary_colour.clone()),
            ("OutlineColour", self.outline_colour.clone()),
            ("BackColour", self.back_colour.clone()),
            ("Bold", if self.bold { "1" } else { "0" }.to_string()),
            ("BorderStyle", self.border_style.to_string()),
            ("Outline", self.outline.to_string()),
            ("Alignment", self.alignment.to_string()),
            ("MarginV", self.margin_v.to_string()),
        ]
    }

    /// Render as the `:force_style='...'` suffix of a `subtitles=` filter
    pub fn to_force_style(&self) -> String {
        let body = self
            .to_pairs()
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join(",");
        format!(":force_style='{}'", body)
    }
}

/// Partial style; absent keys keep the default
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields, default)]
pub struct StyleOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_colour: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline_colour: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_colour: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_style: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<u8>,
    #[serde(rename = "MarginV", skip_serializing_if = "Option::is_none")]
    pub margin_v: Option<u32>,
}

impl StyleOverrides {
    /// Parse `Key=Value` style pairs. Unknown keys are rejected.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, StyleError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut overrides = Self::default();
        for (key, value) in pairs {
            overrides.set(key.as_ref(), value.as_ref())?;
        }
        Ok(overrides)
    }

    /// Set one attribute by its ASS key name (case-insensitive)
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), StyleError> {
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "fontname" => self.font_name = Some(value.to_string()),
            "fontsize" => self.font_size = Some(parse_number(key, value)?),
            "primarycolour" => self.primary_colour = Some(value.to_string()),
            "outlinecolour" => self.outline_colour = Some(value.to_string()),
            "backcolour" => self.back_colour = Some(value.to_string()),
            "bold" => self.bold = Some(parse_flag(key, value)?),
            "borderstyle" => self.border_style = Some(parse_number(key, value)?),
            "outline" => self.outline = Some(parse_number(key, value)?),
            "alignment" => self.alignment = Some(parse_number(key, value)?),
            "marginv" => self.margin_v = Some(parse_number(key, value)?),
            _ => return Err(StyleError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Layer `other` on top of `self`; keys set in `other` win
    pub fn overlay(&self, other: &StyleOverrides) -> Self {
        Self {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            primary_colour: other.primary_colour.clone().or_else(|| self.primary_colour.clone()),
            outline_colour: other.outline_colour.clone().or_else(|| self.outline_colour.clone()),
            back_colour: other.back_colour.clone().or_else(|| self.back_colour.clone()),
            bold: other.bold.or(self.bold),
            border_style: other.border_style.or(self.border_style),
            outline: other.outline.or(self.outline),
            alignment: other.alignment.or(self.alignment),
            margin_v: other.margin_v.or(self.margin_v),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<&SubtitleStyle> for StyleOverrides {
    fn from(style: &SubtitleStyle) -> Self {
        Self {
            font_name: Some(style.font_name.clone()),
            font_size: Some(style.font_size),
            primary_colour: Some(style.primary_colour.clone()),
            outline_colour: Some(style.outline_colour.clone()),
            back_colour: Some(style.back_colour.clone()),
            bold: Some(style.bold),
            border_style: Some(style.border_style),
            outline: Some(style.outline),
            alignment: Some(style.alignment),
            margin_v: Some(style.margin_v),
        }
    }
}

/// Resolve overrides against the default style
pub fn resolve_style(overrides: Option<&StyleOverrides>) -> SubtitleStyle {
    match overrides {
        Some(overrides) => SubtitleStyle::default().merged(overrides),
        None => SubtitleStyle::default(),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, StyleError> {
    value.parse().map_err(|_| StyleError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_flag(key: &str, value: &str) -> Result<bool, StyleError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "-1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(StyleError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Vertical placement of captions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Top,
    Middle,
    #[default]
    Bottom,
}

impl Position {
    /// ASS numpad alignment, horizontally centred
    pub fn alignment(&self) -> u8 {
        match self {
            Self::Top => 8,
            Self::Middle => 5,
            Self::Bottom => 2,
        }
    }
}

/// Convert a colour name or `#RRGGBB` / `#AARRGGBB` hex into an ASS colour.
///
/// ASS colours are `&HBBGGRR`, or `&HAABBGGRR` with alpha first (00 opaque).
/// Unrecognised input falls back to white.
pub fn parse_color(color: &str) -> String {
    let normalized = color.trim().to_lowercase();
    let named = match normalized.as_str() {
        "white" => Some("&HFFFFFF"),
        "black" => Some("&H000000"),
        "red" => Some("&H0000FF"),
        "green" => Some("&H00FF00"),
        "blue" => Some("&HFF0000"),
        "yellow" => Some("&H00FFFF"),
        "cyan" => Some("&HFFFF00"),
        "magenta" => Some("&HFF00FF"),
        "gray" | "grey" => Some("&H808080"),
        "transparent" => Some("&H00000000"),
        "semitransparent" => Some("&H80000000"),
        _ => None,
    };
    if let Some(named) = named {
        return named.to_string();
    }

    if let Some(hex) = color.trim().strip_prefix('#') {
        if hex.chars().all(|c| c.is_ascii_hexdigit()) {
            let hex = hex.to_uppercase();
            match hex.len() {
                6 => return format!("&H{}{}{}", &hex[4..6], &hex[2..4], &hex[0..2]),
                8 => return format!("&H{}{}{}{}", &hex[0..2], &hex[6..8], &hex[4..6], &hex[2..4]),
                _ => {}
            }
        }
    }

    warn!("Unrecognized color: {}, using white instead", color);
    "&HFFFFFF".to_string()
}
