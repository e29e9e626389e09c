//! Highlight effects applied to the active word
//!
//! Exactly one effect is selected for a whole export. It decides the override
//! tags of the highlighted run; every other run in the window gets a flat
//! passive color. Two effects drop the window altogether and two add a
//! marker line above the text.

use crate::error::KaraokeError;
use core::fmt;
use core::str::FromStr;

/// Karaoke highlight effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum EffectSelection {
    /// Active color only
    #[default]
    Classic,
    /// Left-to-right color sweep over the cue's duration
    Wipe,
    /// Vertical stretch and settle
    Bounce,
    /// Glowing outline, white fill
    Neon,
    /// Word appears when reached
    Typewriter,
    /// Current word alone, at a random spot
    Scatter,
    /// Current word alone, enlarged at screen center
    Emphasis,
    /// Ball marker hopping onto the line
    BouncingMarker,
    /// Opaque box behind the text
    Box,
    /// Grows from half size past full size
    Pop,
    /// Quick rotation wobble
    Shake,
    /// Horizontal stretch with a red outline flash
    Glitch,
    /// Slides up into place
    Slide,
    /// Heart marker above the line
    HeartMarker,
    /// Fades in and out
    Fade,
    /// Grows and shrinks once
    Pulse,
    /// Grows and stays enlarged
    Zoom,
}

/// Marker glyph drawn on its own layer above the line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// `●` dropping onto the line
    Ball,
    /// Red `❤`
    Heart,
}

/// Layout values an effect may need for the active run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunLayout<'a> {
    /// ASS literal of the active color
    pub active_color: &'a str,
    /// ASS literal of the passive color
    pub passive_color: &'a str,
    /// Horizontal anchor
    pub center_x: i64,
    /// Vertical anchor
    pub baseline: i64,
}

impl EffectSelection {
    /// Every effect, in presentation order
    pub const ALL: [Self; 17] = [
        Self::Classic,
        Self::Wipe,
        Self::Bounce,
        Self::Neon,
        Self::Typewriter,
        Self::Scatter,
        Self::Emphasis,
        Self::BouncingMarker,
        Self::Box,
        Self::Pop,
        Self::Shake,
        Self::Glitch,
        Self::Slide,
        Self::HeartMarker,
        Self::Fade,
        Self::Pulse,
        Self::Zoom,
    ];

    /// Configuration name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Wipe => "wipe",
            Self::Bounce => "bounce",
            Self::Neon => "neon",
            Self::Typewriter => "typewriter",
            Self::Scatter => "scatter",
            Self::Emphasis => "emphasis",
            Self::BouncingMarker => "bouncing-marker",
            Self::Box => "box",
            Self::Pop => "pop",
            Self::Shake => "shake",
            Self::Glitch => "glitch",
            Self::Slide => "slide",
            Self::HeartMarker => "heart-marker",
            Self::Fade => "fade",
            Self::Pulse => "pulse",
            Self::Zoom => "zoom",
        }
    }

    /// Check if the effect shows only the current cue, ignoring the window
    #[must_use]
    pub const fn is_windowless(self) -> bool {
        matches!(self, Self::Scatter | Self::Emphasis)
    }

    /// Check if the default style needs an opaque box
    #[must_use]
    pub const fn uses_box(self) -> bool {
        matches!(self, Self::Box)
    }

    /// Marker line drawn with this effect, if any
    #[must_use]
    pub const fn marker(self) -> Option<Marker> {
        match self {
            Self::BouncingMarker => Some(Marker::Ball),
            Self::HeartMarker => Some(Marker::Heart),
            _ => None,
        }
    }

    /// Styled run for one word of the window
    ///
    /// `active` marks the highlighted word; `duration` is that cue's length
    /// in seconds. Passive runs ignore the effect.
    #[must_use]
    pub fn style_run(self, text: &str, active: bool, duration: f64, layout: &RunLayout<'_>) -> String {
        if !active {
            return format!("{{\\1c{}}}{text}", layout.passive_color);
        }
        format!("{{{}}}{text}", self.active_tags(duration, layout))
    }

    fn active_tags(self, duration: f64, layout: &RunLayout<'_>) -> String {
        let act = layout.active_color;
        match self {
            Self::Classic | Self::Box | Self::BouncingMarker | Self::HeartMarker | Self::Scatter => {
                format!("\\1c{act}")
            }
            Self::Emphasis => format!("\\fscx120\\fscy120\\1c{act}"),
            Self::Wipe => format!("\\kf{}\\1c{act}", centiseconds(duration)),
            Self::Bounce => format!("\\t(0,150,\\fscy150)\\t(150,300,\\fscy100)\\1c{act}"),
            Self::Neon => format!("\\bord5\\3c{act}\\blur3\\1c&HFFFFFF&"),
            Self::Typewriter => format!("\\alpha&H00&\\1c{act}"),
            Self::Pop => format!("\\fscx50\\fscy50\\t(0,100,\\fscx120\\fscy120)\\1c{act}"),
            Self::Shake => format!("\\t(0,50,\\frz5)\\t(50,100,\\frz-5)\\t(100,150,\\frz0)\\1c{act}"),
            Self::Glitch => format!(
                "\\t(0,50,\\fscx110\\3c&H0000FF&)\\t(50,100,\\fscx100\\3c&H000000&)\\1c{act}"
            ),
            Self::Slide => format!(
                "\\move({x},{from},{x},{to})\\1c{act}",
                x = layout.center_x,
                from = layout.baseline + 50,
                to = layout.baseline
            ),
            Self::Fade => format!("\\fad(100,100)\\1c{act}"),
            Self::Pulse => {
                format!("\\t(0,100,\\fscx110\\fscy110)\\t(100,200,\\fscx100\\fscy100)\\1c{act}")
            }
            Self::Zoom => format!("\\t(0,100,\\fscx130\\fscy130)\\1c{act}"),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn centiseconds(duration: f64) -> u64 {
    if duration.is_finite() && duration > 0.0 {
        (duration * 100.0) as u64
    } else {
        0
    }
}

impl fmt::Display for EffectSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EffectSelection {
    type Err = KaraokeError;

    /// Accepts configuration names plus a few common aliases
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        let alias = match wanted.as_str() {
            "ball" | "bouncing-ball" => Some(Self::BouncingMarker),
            "heart" | "hearts" => Some(Self::HeartMarker),
            "hormozi" => Some(Self::Emphasis),
            "karaoke" => Some(Self::Wipe),
            _ => None,
        };
        alias
            .or_else(|| Self::ALL.into_iter().find(|effect| effect.name() == wanted))
            .ok_or_else(|| KaraokeError::config(format!("unknown effect '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: RunLayout<'static> = RunLayout {
        active_color: "&H0000FF00",
        passive_color: "&H00FFFFFF",
        center_x: 960,
        baseline: 980,
    };

    #[test]
    fn passive_runs_ignore_effect() {
        for effect in EffectSelection::ALL {
            assert_eq!(
                effect.style_run("word", false, 1.0, &LAYOUT),
                "{\\1c&H00FFFFFF}word"
            );
        }
    }

    #[test]
    fn active_runs_carry_effect_tags() {
        assert_eq!(
            EffectSelection::Classic.style_run("hi", true, 1.0, &LAYOUT),
            "{\\1c&H0000FF00}hi"
        );
        assert_eq!(
            EffectSelection::Wipe.style_run("hi", true, 0.456, &LAYOUT),
            "{\\kf45\\1c&H0000FF00}hi"
        );
        assert_eq!(
            EffectSelection::Slide.style_run("hi", true, 1.0, &LAYOUT),
            "{\\move(960,1030,960,980)\\1c&H0000FF00}hi"
        );
        assert!(EffectSelection::Neon
            .style_run("hi", true, 1.0, &LAYOUT)
            .starts_with("{\\bord5\\3c&H0000FF00"));
    }

    #[test]
    fn every_active_run_differs_from_passive() {
        for effect in EffectSelection::ALL {
            let active = effect.style_run("w", true, 0.5, &LAYOUT);
            let passive = effect.style_run("w", false, 0.5, &LAYOUT);
            assert_ne!(active, passive, "{effect}");
        }
    }

    #[test]
    fn names_parse_back() {
        for effect in EffectSelection::ALL {
            assert_eq!(effect.name().parse::<EffectSelection>().ok(), Some(effect));
        }
        assert_eq!("Heart".parse::<EffectSelection>().ok(), Some(EffectSelection::HeartMarker));
        assert_eq!(
            "bouncing_marker".parse::<EffectSelection>().ok(),
            Some(EffectSelection::BouncingMarker)
        );
        assert!("sparkle".parse::<EffectSelection>().is_err());
    }

    #[test]
    fn special_cases() {
        assert!(EffectSelection::Scatter.is_windowless());
        assert!(EffectSelection::Emphasis.is_windowless());
        assert!(!EffectSelection::Classic.is_windowless());
        assert!(EffectSelection::Box.uses_box());
        assert_eq!(EffectSelection::HeartMarker.marker(), Some(Marker::Heart));
        assert_eq!(EffectSelection::BouncingMarker.marker(), Some(Marker::Ball));
        assert_eq!(EffectSelection::Fade.marker(), None);
    }
}
