//! SubRip output and import
//!
//! SRT carries no styling, so every cue becomes one numbered block with its
//! own text. Import is lenient: malformed blocks are skipped with a warning
//! and the surviving cues still go through refinement.

use super::timecode::{format_srt_time, parse_srt_time};
use crate::timeline::{RawCue, Timeline};
use regex::Regex;
use std::sync::OnceLock;
use tracing::warn;

fn timing_line() -> &'static Regex {
    static TIMING: OnceLock<Regex> = OnceLock::new();
    TIMING.get_or_init(|| {
        Regex::new(r"^\s*(\S+)\s*-->\s*(\S+)").expect("timing pattern is valid")
    })
}

fn markup_tag() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"</?[^>]+>|\{[^}]*\}").expect("tag pattern is valid"))
}

/// SubRip document with one block per cue
#[must_use]
pub fn render_srt(timeline: &Timeline) -> String {
    let mut srt = String::new();
    for (index, cue) in timeline.iter().enumerate() {
        srt.push_str(&format!("{}\n", index + 1));
        srt.push_str(&format!(
            "{} --> {}\n",
            format_srt_time(cue.start),
            format_srt_time(cue.end)
        ));
        srt.push_str(&cue.text.replace('\n', " "));
        srt.push_str("\n\n");
    }
    srt
}

/// Read cues back from a SubRip document
///
/// Block numbers are not checked. Text lines of a block are joined with a
/// space and stripped of HTML and ASS tags. Blocks without a valid timing
/// line or without text are skipped with a warning.
#[must_use]
pub fn parse_srt(content: &str) -> Vec<RawCue> {
    let normalized = content.replace("\r\n", "\n");
    let mut cues = Vec::new();
    let mut skipped = 0_usize;

    for (block_number, block) in normalized.split("\n\n").enumerate() {
        let lines: Vec<&str> = block
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if lines.is_empty() {
            continue;
        }

        let Some(timing_index) = lines.iter().position(|line| line.contains("-->")) else {
            warn!(block = block_number + 1, "skipping SRT block without timing line");
            skipped += 1;
            continue;
        };

        let Some((start, end)) = parse_timing(lines[timing_index]) else {
            warn!(
                block = block_number + 1,
                line = lines[timing_index],
                "skipping SRT block with invalid timing"
            );
            skipped += 1;
            continue;
        };

        let text = lines[timing_index + 1..]
            .iter()
            .map(|line| markup_tag().replace_all(line, "").trim().to_string())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if text.is_empty() {
            warn!(block = block_number + 1, "skipping SRT block without text");
            skipped += 1;
            continue;
        }

        cues.push(RawCue::new(text, start, end));
    }

    if skipped > 0 {
        warn!(skipped, imported = cues.len(), "SRT import skipped blocks");
    }
    cues
}

fn parse_timing(line: &str) -> Option<(f64, f64)> {
    let captures = timing_line().captures(line)?;
    let start = parse_srt_time(&captures[1]).ok()?;
    let end = parse_srt_time(&captures[2]).ok()?;
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::refine;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_numbered_blocks() {
        let timeline = refine(vec![
            RawCue::new("Hello", 0.0, 0.5),
            RawCue::new("world", 0.6, 1.0),
        ]);
        assert_eq!(
            render_srt(&timeline),
            "1\n00:00:00,000 --> 00:00:00,500\nHello\n\n2\n00:00:00,600 --> 00:00:01,000\nworld\n\n"
        );
    }

    #[test]
    fn empty_timeline_renders_empty_document() {
        assert_eq!(render_srt(&Timeline::empty()), "");
    }

    #[test]
    fn parses_blocks_with_markup_and_crlf() {
        let content = "1\r\n00:00:01,000 --> 00:00:02,500\r\n<i>Hola</i>\r\n\r\n2\r\n00:00:03,000 --> 00:00:04,000\r\n{\\an8}mundo\r\ncruel\r\n";
        let cues = parse_srt(content);
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text, "Hola");
        assert_eq!(cues[1].text, "mundo cruel");
        let timeline = refine(cues);
        assert_eq!(timeline.cues()[0].start, 1.0);
        assert_eq!(timeline.cues()[0].end, 2.5);
    }

    #[test]
    fn skips_malformed_blocks() {
        let content = "1\nnot a timing line\ntext\n\n2\n00:00:01,000 --> bad\ntext\n\n3\n00:00:02,000 --> 00:00:03,000\n\n4\n00:00:04,000 --> 00:00:05,000\nkept\n";
        let cues = parse_srt(content);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "kept");
    }

    #[test]
    fn rendered_output_parses_back() {
        let timeline = refine(vec![
            RawCue::new("uno", 0.25, 0.75),
            RawCue::new("dos", 1.0, 1.5),
        ]);
        let reparsed = refine(parse_srt(&render_srt(&timeline)));
        assert_eq!(reparsed, timeline);
    }
}
