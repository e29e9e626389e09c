//! Word cues and the validated timeline
//!
//! Raw recognizer output enters as [`RawCue`] values of unknown quality and
//! leaves [`refine`] as a [`Timeline`]: sorted, non-overlapping, every cue with
//! a positive duration and non-empty text. A `Timeline` cannot be built any
//! other way, so every holder of one can rely on those invariants.
//!
//! - `refine`: the single repair pass all mutations flow through
//! - `History`: linear undo/redo over timeline snapshots
//! - `TimelineEditor`: validated edit operations recorded into history

pub mod editor;
pub mod history;
pub mod refine;

pub use editor::{CueEdit, TimelineEditor};
pub use history::{EditSnapshot, History, HistoryConfig, HistoryStats};
pub use refine::{refine, COLLAPSED_DURATION, OVERLAP_GAP, SYNTHETIC_DURATION};

use core::fmt;

/// A single timed word
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WordCue {
    /// Word text with its original casing and punctuation
    pub text: String,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
}

impl WordCue {
    /// Create a new cue
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Length of the cue in seconds
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Timestamp exactly as a recognizer or a file delivered it
///
/// Anything that is not a finite, non-negative number of seconds reads as
/// `0.0` through [`RawTime::seconds`]; malformed timing degrades instead of
/// failing.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawTime {
    /// Numeric seconds
    Seconds(f64),
    /// Textual value, parsed on demand
    Text(String),
    /// Null or absent
    #[default]
    Missing,
}

impl RawTime {
    /// Seconds value with malformed input coerced to `0.0`
    #[must_use]
    pub fn seconds(&self) -> f64 {
        let value = match self {
            Self::Seconds(value) => *value,
            Self::Text(text) => text.trim().parse::<f64>().unwrap_or(0.0),
            Self::Missing => 0.0,
        };

        if value.is_finite() && value >= 0.0 {
            value
        } else {
            0.0
        }
    }
}

impl From<f64> for RawTime {
    fn from(value: f64) -> Self {
        Self::Seconds(value)
    }
}

impl From<&str> for RawTime {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawTime {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Unvalidated cue as produced by a recognizer, the aligner or an edit
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawCue {
    /// Cue text (recognizer JSON calls this `word`)
    #[cfg_attr(feature = "serde", serde(alias = "word", default))]
    pub text: String,
    /// Start time
    #[cfg_attr(feature = "serde", serde(default))]
    pub start: RawTime,
    /// End time
    #[cfg_attr(feature = "serde", serde(default))]
    pub end: RawTime,
}

impl RawCue {
    /// Create a raw cue from any timestamp representation
    pub fn new(
        text: impl Into<String>,
        start: impl Into<RawTime>,
        end: impl Into<RawTime>,
    ) -> Self {
        Self {
            text: text.into(),
            start: start.into(),
            end: end.into(),
        }
    }
}

impl From<WordCue> for RawCue {
    fn from(cue: WordCue) -> Self {
        Self {
            text: cue.text,
            start: RawTime::Seconds(cue.start),
            end: RawTime::Seconds(cue.end),
        }
    }
}

impl From<&WordCue> for RawCue {
    fn from(cue: &WordCue) -> Self {
        Self::from(cue.clone())
    }
}

/// Ordered, validated sequence of word cues
///
/// Deserializing a timeline runs the raw cues through [`refine`], so a
/// hand-edited file still yields a valid timeline.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "Vec<RawCue>"))]
pub struct Timeline {
    cues: Vec<WordCue>,
}

impl Timeline {
    /// Timeline without cues
    #[must_use]
    pub const fn empty() -> Self {
        Self { cues: Vec::new() }
    }

    /// Wrap cues that already went through the repair pass
    pub(crate) fn from_refined(cues: Vec<WordCue>) -> Self {
        Self { cues }
    }

    /// Number of cues
    #[must_use]
    pub fn len(&self) -> usize {
        self.cues.len()
    }

    /// Check if the timeline has no cues
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Cue at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&WordCue> {
        self.cues.get(index)
    }

    /// All cues in order
    #[must_use]
    pub fn cues(&self) -> &[WordCue] {
        &self.cues
    }

    /// Iterate over cues in order
    pub fn iter(&self) -> core::slice::Iter<'_, WordCue> {
        self.cues.iter()
    }

    /// End time of the last cue, `0.0` when empty
    #[must_use]
    pub fn end_time(&self) -> f64 {
        self.cues.last().map_or(0.0, |cue| cue.end)
    }

    /// Copy the cues back out as raw input for another refinement pass
    #[must_use]
    pub fn to_raw(&self) -> Vec<RawCue> {
        self.cues.iter().map(RawCue::from).collect()
    }

    /// Take ownership of the cues
    #[must_use]
    pub fn into_cues(self) -> Vec<WordCue> {
        self.cues
    }
}

impl From<Vec<RawCue>> for Timeline {
    fn from(raw: Vec<RawCue>) -> Self {
        refine(raw)
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a WordCue;
    type IntoIter = core::slice::Iter<'a, WordCue>;

    fn into_iter(self) -> Self::IntoIter {
        self.cues.iter()
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, cue) in self.cues.iter().enumerate() {
            writeln!(
                f,
                "{index:>4}  {:>8.3} -> {:>8.3}  {}",
                cue.start, cue.end, cue.text
            )?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Timeline {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.cues.serialize(serializer)
    }
}

#[cfg(feature = "serde")]
mod raw_time_serde {
    use super::RawTime;
    use core::fmt;
    use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for RawTime {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Self::Seconds(value) => serializer.serialize_f64(*value),
                Self::Text(text) => serializer.serialize_str(text),
                Self::Missing => serializer.serialize_none(),
            }
        }
    }

    /// Accepts any JSON value; shapes that cannot hold a time become `Missing`
    struct RawTimeVisitor;

    impl<'de> Visitor<'de> for RawTimeVisitor {
        type Value = RawTime;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a timestamp in seconds")
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<RawTime, E> {
            Ok(RawTime::Seconds(value))
        }

        #[allow(clippy::cast_precision_loss)]
        fn visit_i64<E: de::Error>(self, value: i64) -> Result<RawTime, E> {
            Ok(RawTime::Seconds(value as f64))
        }

        #[allow(clippy::cast_precision_loss)]
        fn visit_u64<E: de::Error>(self, value: u64) -> Result<RawTime, E> {
            Ok(RawTime::Seconds(value as f64))
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<RawTime, E> {
            Ok(RawTime::Text(value.to_string()))
        }

        fn visit_string<E: de::Error>(self, value: String) -> Result<RawTime, E> {
            Ok(RawTime::Text(value))
        }

        fn visit_bool<E: de::Error>(self, _value: bool) -> Result<RawTime, E> {
            Ok(RawTime::Missing)
        }

        fn visit_none<E: de::Error>(self) -> Result<RawTime, E> {
            Ok(RawTime::Missing)
        }

        fn visit_unit<E: de::Error>(self) -> Result<RawTime, E> {
            Ok(RawTime::Missing)
        }

        fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<RawTime, D::Error> {
            deserializer.deserialize_any(self)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<RawTime, A::Error> {
            while seq.next_element::<IgnoredAny>()?.is_some() {}
            Ok(RawTime::Missing)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawTime, A::Error> {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            Ok(RawTime::Missing)
        }
    }

    impl<'de> Deserialize<'de> for RawTime {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_any(RawTimeVisitor)
        }
    }
}
