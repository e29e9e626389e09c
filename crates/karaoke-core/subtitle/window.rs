//! Neighbouring cues shown together with the highlighted one

use crate::error::KaraokeError;
use crate::timeline::{Timeline, WordCue};
use core::fmt;
use core::ops::Range;
use core::str::FromStr;

/// How many neighbours appear on screen around the current cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum VisibilityWindow {
    /// Current cue only
    Single,
    /// One before, two after
    Compact,
    /// Three on each side
    #[default]
    Balanced,
    /// Five on each side
    Full,
}

impl VisibilityWindow {
    /// All modes in increasing size
    pub const ALL: [Self; 4] = [Self::Single, Self::Compact, Self::Balanced, Self::Full];

    /// Cues shown before and after the current one
    #[must_use]
    pub const fn reach(self) -> (usize, usize) {
        match self {
            Self::Single => (0, 0),
            Self::Compact => (1, 2),
            Self::Balanced => (3, 3),
            Self::Full => (5, 5),
        }
    }

    /// Index range shown for cue `index` in a sequence of `len` cues
    ///
    /// Clamped to `0..len`, so the window shrinks near either end.
    #[must_use]
    pub fn span(self, index: usize, len: usize) -> Range<usize> {
        let (before, after) = self.reach();
        let start = index.saturating_sub(before).min(len);
        let end = index.saturating_add(after + 1).min(len);
        start..end.max(start)
    }

    /// Configuration name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Compact => "compact",
            Self::Balanced => "balanced",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for VisibilityWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VisibilityWindow {
    type Err = KaraokeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| KaraokeError::config(format!("unknown window mode '{s}'")))
    }
}

/// Cues visible while cue `index` is highlighted
#[must_use]
pub fn window(timeline: &Timeline, index: usize, mode: VisibilityWindow) -> &[WordCue] {
    &timeline.cues()[mode.span(index, timeline.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{refine, RawCue};

    fn timeline(len: usize) -> Timeline {
        refine((0..len).map(|i| RawCue::new(format!("w{i}"), i as f64, i as f64 + 0.5)))
    }

    #[test]
    fn spans_in_the_middle() {
        assert_eq!(VisibilityWindow::Single.span(10, 20), 10..11);
        assert_eq!(VisibilityWindow::Compact.span(10, 20), 9..13);
        assert_eq!(VisibilityWindow::Balanced.span(10, 20), 7..14);
        assert_eq!(VisibilityWindow::Full.span(10, 20), 5..16);
    }

    #[test]
    fn spans_clamp_at_edges() {
        assert_eq!(VisibilityWindow::Balanced.span(0, 20), 0..4);
        assert_eq!(VisibilityWindow::Balanced.span(19, 20), 16..20);
        assert_eq!(VisibilityWindow::Full.span(1, 3), 0..3);
        assert_eq!(VisibilityWindow::Compact.span(0, 1), 0..1);
        assert_eq!(VisibilityWindow::Single.span(0, 0), 0..0);
    }

    #[test]
    fn window_slices_timeline() {
        let timeline = timeline(8);
        let shown = window(&timeline, 7, VisibilityWindow::Compact);
        let texts: Vec<&str> = shown.iter().map(|cue| cue.text.as_str()).collect();
        assert_eq!(texts, vec!["w6", "w7"]);
        assert!(window(&timeline, 3, VisibilityWindow::Single).len() == 1);
    }

    #[test]
    fn parse_names() {
        assert_eq!("Full".parse::<VisibilityWindow>().ok(), Some(VisibilityWindow::Full));
        assert_eq!(VisibilityWindow::default(), VisibilityWindow::Balanced);
        assert!("wide".parse::<VisibilityWindow>().is_err());
    }
}
