//! Repair pass turning raw cues into a valid [`Timeline`]
//!
//! The pass is local: each cue is compared only with its
//! successor, in one forward sweep. Re-running it on its own output changes
//! nothing because the output is already sorted and gapped.

use super::{RawCue, Timeline, WordCue};
use tracing::{debug, warn};

/// Duration given to a cue whose end does not come after its start
pub const SYNTHETIC_DURATION: f64 = 0.2;

/// Gap left between a clipped cue and its successor
pub const OVERLAP_GAP: f64 = 0.01;

/// Duration given to a cue that clipping would otherwise collapse
pub const COLLAPSED_DURATION: f64 = 0.1;

/// Sanitize, sort and repair raw cues
///
/// Steps, in order:
/// 1. Times that are missing, non-numeric, non-finite or negative become `0.0`.
/// 2. Text is trimmed; cues left with empty text are dropped.
/// 3. Cues are stably sorted by start time.
/// 4. One forward sweep: a cue with `end <= start` gets
///    [`SYNTHETIC_DURATION`]; a cue running into its successor is clipped to
///    end [`OVERLAP_GAP`] before it, and if that collapses the cue it keeps
///    [`COLLAPSED_DURATION`] while the successor's start moves past it.
///
/// Never fails. Empty input yields an empty timeline.
pub fn refine<I>(cues: I) -> Timeline
where
    I: IntoIterator<Item = RawCue>,
{
    let mut refined = Vec::new();
    let mut dropped = 0_usize;

    for raw in cues {
        let text = raw.text.trim();
        if text.is_empty() {
            dropped += 1;
            continue;
        }
        refined.push(WordCue {
            text: text.to_string(),
            start: raw.start.seconds(),
            end: raw.end.seconds(),
        });
    }

    if dropped > 0 {
        warn!(dropped, "dropped cues with empty text");
    }

    // sort_by is stable: equal starts keep their input order
    refined.sort_by(|a, b| a.start.total_cmp(&b.start));

    let repairs = repair(&mut refined);
    if repairs > 0 {
        debug!(cues = refined.len(), repairs, "refined timeline");
    }

    Timeline::from_refined(refined)
}

fn repair(cues: &mut [WordCue]) -> usize {
    let mut repairs = 0;

    for i in 0..cues.len() {
        if cues[i].end <= cues[i].start {
            cues[i].end = cues[i].start + SYNTHETIC_DURATION;
            repairs += 1;
        }

        if i + 1 < cues.len() && cues[i].end > cues[i + 1].start {
            cues[i].end = cues[i + 1].start - OVERLAP_GAP;
            if cues[i].end <= cues[i].start {
                cues[i].end = cues[i].start + COLLAPSED_DURATION;
                cues[i + 1].start = cues[i].end + OVERLAP_GAP;
            }
            repairs += 1;
        }
    }

    repairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::RawTime;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn cue(text: &str, start: f64, end: f64) -> RawCue {
        RawCue::new(text, start, end)
    }

    #[test]
    fn overlapping_cue_is_clipped() {
        let timeline = refine(vec![cue("A", 0.0, 1.0), cue("B", 0.6, 1.5)]);
        let cues = timeline.cues();
        assert_eq!(cues.len(), 2);
        assert!(approx(cues[0].start, 0.0));
        assert!(approx(cues[0].end, 0.59));
        assert!(approx(cues[1].start, 0.6));
        assert!(approx(cues[1].end, 1.5));
    }

    #[test]
    fn zero_length_cue_gets_synthetic_duration() {
        let timeline = refine(vec![cue("A", 2.0, 2.0)]);
        let only = &timeline.cues()[0];
        assert!(approx(only.start, 2.0));
        assert!(approx(only.end, 2.2));
    }

    #[test]
    fn collapsed_cue_pushes_successor() {
        let timeline = refine(vec![cue("A", 1.0, 1.0), cue("B", 1.0, 1.05)]);
        let cues = timeline.cues();
        assert!(approx(cues[0].start, 1.0));
        assert!(approx(cues[0].end, 1.1));
        assert!(approx(cues[1].start, 1.11));
        // successor is fixed on its own turn of the sweep
        assert!(cues[1].end > cues[1].start);
    }

    #[test]
    fn unsorted_input_is_sorted_stably() {
        let timeline = refine(vec![
            cue("late", 5.0, 6.0),
            cue("first", 1.0, 2.0),
            cue("second", 1.0, 2.0),
        ]);
        let texts: Vec<&str> = timeline.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "late"]);
    }

    #[test]
    fn malformed_times_become_zero() {
        let timeline = refine(vec![RawCue::new("x", "abc", RawTime::Missing)]);
        let only = &timeline.cues()[0];
        assert!(approx(only.start, 0.0));
        assert!(approx(only.end, 0.2));
    }

    #[test]
    fn empty_text_is_dropped_and_trimmed() {
        let timeline = refine(vec![cue("   ", 0.0, 1.0), cue("  hola ", 1.0, 2.0)]);
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.cues()[0].text, "hola");
    }

    #[test]
    fn empty_input_yields_empty_timeline() {
        assert!(refine(Vec::new()).is_empty());
    }

    #[test]
    fn refine_is_idempotent_on_its_output() {
        let once = refine(vec![
            cue("a", 0.0, 0.0),
            cue("b", 0.05, 0.3),
            cue("c", 0.1, 0.2),
            cue("d", 3.0, 2.0),
        ]);
        let twice = refine(once.to_raw());
        assert_eq!(once, twice);
    }

    #[test]
    fn clipping_can_leave_short_cues() {
        // one sweep only looks ahead by one cue; a clip may end under COLLAPSED_DURATION
        let timeline = refine(vec![cue("A", 0.0, 1.0), cue("B", 0.05, 1.0)]);
        let first = &timeline.cues()[0];
        assert!(approx(first.end, 0.04));
        assert!(first.duration() > 0.0);
    }

    #[test]
    fn packed_cues_drift_without_bound() {
        // known limitation: each collapse pushes the next start, so drift grows with the run
        let timeline = refine((0..5).map(|i| cue(&format!("w{i}"), 0.0, 0.05)));
        let starts: Vec<f64> = timeline.iter().map(|cue| cue.start).collect();
        for (i, start) in starts.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let expected = 0.11 * i as f64;
            assert!(approx(*start, expected), "cue {i} starts at {start}");
        }
    }
}
