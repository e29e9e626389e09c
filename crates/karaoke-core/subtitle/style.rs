//! Colors, placement and font settings for emitted subtitles

use crate::error::{KaraokeError, Result};
use core::fmt;
use core::str::FromStr;

/// Web color as written in configuration, `#RRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct WebColor {
    /// Red channel
    pub red: u8,
    /// Green channel
    pub green: u8,
    /// Blue channel
    pub blue: u8,
}

impl WebColor {
    /// Pure white
    pub const WHITE: Self = Self::rgb(0xFF, 0xFF, 0xFF);
    /// Pure green
    pub const GREEN: Self = Self::rgb(0x00, 0xFF, 0x00);

    /// Color from channel values
    #[must_use]
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// ASS color literal `&H00BBGGRR` (byte order reversed, opaque alpha)
    #[must_use]
    pub fn to_ass(self) -> String {
        format!("&H00{:02X}{:02X}{:02X}", self.blue, self.green, self.red)
    }
}

impl FromStr for WebColor {
    type Err = KaraokeError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(KaraokeError::InvalidColor(format!(
                "expected #RRGGBB, got '{s}'"
            )));
        }

        let value = u32::from_str_radix(hex, 16)
            .map_err(|_| KaraokeError::InvalidColor(format!("Invalid hex value: {hex}")))?;
        let [_, red, green, blue] = value.to_be_bytes();
        Ok(Self::rgb(red, green, blue))
    }
}

impl TryFrom<String> for WebColor {
    type Error = KaraokeError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<WebColor> for String {
    fn from(color: WebColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for WebColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

/// Where lines appear on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum SubtitlePosition {
    /// Bottom center
    #[default]
    Bottom,
    /// Top center
    Top,
    /// Screen center
    Center,
    /// Bottom, top and center in turn, switching every four cues
    Alternating,
}

impl SubtitlePosition {
    /// All positions
    pub const ALL: [Self; 4] = [Self::Bottom, Self::Top, Self::Center, Self::Alternating];

    /// Configuration name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bottom => "bottom",
            Self::Top => "top",
            Self::Center => "center",
            Self::Alternating => "alternating",
        }
    }

    /// Numpad alignment for the default style
    #[must_use]
    pub const fn alignment(self) -> u8 {
        match self {
            Self::Bottom | Self::Alternating => 2,
            Self::Top => 8,
            Self::Center => 5,
        }
    }

    /// Vertical margin for the default style
    #[must_use]
    pub const fn margin_v(self) -> u32 {
        match self {
            Self::Center => 0,
            Self::Bottom | Self::Top | Self::Alternating => 50,
        }
    }

    /// Vertical text anchor on a canvas of `height`, used by moving effects
    #[must_use]
    pub const fn baseline(self, height: u32) -> i64 {
        match self {
            Self::Bottom | Self::Alternating => height as i64 - 100,
            Self::Top => 150,
            Self::Center => height as i64 / 2,
        }
    }

    /// Explicit placement tag for cue `index`, only needed when alternating
    #[must_use]
    pub fn placement_tag(self, index: usize, canvas: Canvas) -> Option<String> {
        if self != Self::Alternating {
            return None;
        }
        let x = canvas.center_x();
        let tag = match (index / 4) % 3 {
            0 => format!("\\an2\\pos({x},{})", i64::from(canvas.height) - 50),
            1 => format!("\\an8\\pos({x},50)"),
            _ => format!("\\an5\\pos({x},{})", canvas.center_y()),
        };
        Some(tag)
    }
}

impl fmt::Display for SubtitlePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SubtitlePosition {
    type Err = KaraokeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|position| position.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| KaraokeError::config(format!("unknown position '{s}'")))
    }
}

/// Video frame size the script is laid out for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Canvas {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl Canvas {
    /// Horizontal center
    #[must_use]
    pub const fn center_x(self) -> i64 {
        self.width as i64 / 2
    }

    /// Vertical center
    #[must_use]
    pub const fn center_y(self) -> i64 {
        self.height as i64 / 2
    }
}

/// Font and colors of the default style
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SubtitleStyle {
    /// Font family
    pub font: String,
    /// Font size in script pixels
    pub font_size: u32,
    /// Color of the highlighted word
    pub active_color: WebColor,
    /// Color of the other words in the window
    pub passive_color: WebColor,
    /// Frame size
    pub canvas: Canvas,
}

impl Default for SubtitleStyle {
    fn default() -> Self {
        Self {
            font: String::from("Arial"),
            font_size: 60,
            active_color: WebColor::GREEN,
            passive_color: WebColor::WHITE,
            canvas: Canvas::default(),
        }
    }
}

impl SubtitleStyle {
    /// Check the style can be rendered
    ///
    /// # Errors
    ///
    /// Returns [`KaraokeError::InvalidConfig`] for an empty or comma-bearing
    /// font name, a zero font size or an empty canvas.
    pub fn validate(&self) -> Result<()> {
        if self.font.trim().is_empty() || self.font.contains(',') {
            return Err(KaraokeError::config(format!(
                "font name '{}' cannot be used in a style line",
                self.font
            )));
        }
        if self.font_size == 0 {
            return Err(KaraokeError::config("font_size must be positive"));
        }
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(KaraokeError::config("canvas must have a positive size"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn web_color_converts_to_bgr() {
        let color: WebColor = "#FF8000".parse().unwrap();
        assert_eq!(color, WebColor::rgb(0xFF, 0x80, 0x00));
        assert_eq!(color.to_ass(), "&H000080FF");
        assert_eq!(WebColor::GREEN.to_ass(), "&H0000FF00");
        assert_eq!("00ff00".parse::<WebColor>().unwrap(), WebColor::GREEN);
        assert_eq!(color.to_string(), "#FF8000");
    }

    #[test]
    fn web_color_rejects_bad_input() {
        for bad in ["", "#FFF", "#GG0000", "#FF00001", "red"] {
            assert!(matches!(
                bad.parse::<WebColor>(),
                Err(KaraokeError::InvalidColor(_))
            ));
        }
    }

    #[test]
    fn position_layout_values() {
        assert_eq!(SubtitlePosition::Bottom.alignment(), 2);
        assert_eq!(SubtitlePosition::Top.alignment(), 8);
        assert_eq!(SubtitlePosition::Center.alignment(), 5);
        assert_eq!(SubtitlePosition::Center.margin_v(), 0);
        assert_eq!(SubtitlePosition::Bottom.baseline(1080), 980);
        assert_eq!(SubtitlePosition::Top.baseline(1080), 150);
        assert_eq!(SubtitlePosition::Center.baseline(1080), 540);
    }

    #[test]
    fn alternating_cycles_every_four_cues() {
        let canvas = Canvas::default();
        let tag = |i| SubtitlePosition::Alternating.placement_tag(i, canvas).unwrap();
        assert_eq!(tag(0), "\\an2\\pos(960,1030)");
        assert_eq!(tag(3), "\\an2\\pos(960,1030)");
        assert_eq!(tag(4), "\\an8\\pos(960,50)");
        assert_eq!(tag(8), "\\an5\\pos(960,540)");
        assert_eq!(tag(12), "\\an2\\pos(960,1030)");
        assert_eq!(SubtitlePosition::Bottom.placement_tag(0, canvas), None);
    }

    #[test]
    fn style_validation() {
        assert!(SubtitleStyle::default().validate().is_ok());
        let style = SubtitleStyle {
            font: String::from("Comic, Sans"),
            ..SubtitleStyle::default()
        };
        assert!(style.validate().is_err());
        let style = SubtitleStyle {
            font_size: 0,
            ..SubtitleStyle::default()
        };
        assert!(style.validate().is_err());
    }
}
