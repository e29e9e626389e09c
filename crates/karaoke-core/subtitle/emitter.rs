//! Per-cue styled lines for karaoke subtitles
//!
//! For every cue the emitter renders the cue's visibility window as one line,
//! highlighting the cue itself. Each line is shown for exactly the cue's own
//! time span, so consecutive lines overlap on screen while the highlight
//! advances word by word.

use super::effects::{EffectSelection, Marker, RunLayout};
use super::window::window;
use super::RenderConfig;
use crate::timeline::{Timeline, WordCue};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// One dialogue line of the output script
#[derive(Debug, Clone, PartialEq)]
pub struct CueMarkup {
    /// Drawing layer; markers sit above the text on layer 1
    pub layer: u8,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Text with inline override tags
    pub text: String,
}

impl CueMarkup {
    fn text_line(cue: &WordCue, text: String) -> Self {
        Self {
            layer: 0,
            start: cue.start,
            end: cue.end,
            text,
        }
    }

    fn marker_line(cue: &WordCue, text: String) -> Self {
        Self {
            layer: 1,
            start: cue.start,
            end: cue.end,
            text,
        }
    }
}

/// Builds [`CueMarkup`] lines from a timeline
#[derive(Debug, Clone, Copy)]
pub struct SubtitleEmitter<'a> {
    config: &'a RenderConfig,
}

impl<'a> SubtitleEmitter<'a> {
    /// Emitter for `config`
    #[must_use]
    pub const fn new(config: &'a RenderConfig) -> Self {
        Self { config }
    }

    /// All lines for `timeline`, in cue order
    #[must_use]
    pub fn emit(&self, timeline: &Timeline) -> Vec<CueMarkup> {
        let lines = match self.config.effect {
            EffectSelection::Scatter => self.emit_scatter(timeline),
            EffectSelection::Emphasis => self.emit_emphasis(timeline),
            _ => self.emit_windowed(timeline),
        };
        debug!(
            effect = %self.config.effect,
            cues = timeline.len(),
            lines = lines.len(),
            "emitted subtitle lines"
        );
        lines
    }

    fn emit_scatter(&self, timeline: &Timeline) -> Vec<CueMarkup> {
        let canvas = self.config.style.canvas;
        let (width, height) = (i64::from(canvas.width), i64::from(canvas.height));
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        timeline
            .iter()
            .map(|cue| {
                let x = rng.gen_range(width / 4..=width * 3 / 4);
                let y = rng.gen_range(height / 4..=height * 3 / 4);
                CueMarkup::text_line(
                    cue,
                    format!(
                        "{{\\an5\\move({x},{y},{x},{y})\\fad(100,100)}}{}",
                        escape_text(&cue.text)
                    ),
                )
            })
            .collect()
    }

    fn emit_emphasis(&self, timeline: &Timeline) -> Vec<CueMarkup> {
        let canvas = self.config.style.canvas;
        let active = self.config.style.active_color.to_ass();

        timeline
            .iter()
            .map(|cue| {
                CueMarkup::text_line(
                    cue,
                    format!(
                        "{{\\an5\\pos({},{})\\fscx120\\fscy120\\1c{active}}}{}",
                        canvas.center_x(),
                        canvas.center_y(),
                        escape_text(&cue.text)
                    ),
                )
            })
            .collect()
    }

    fn emit_windowed(&self, timeline: &Timeline) -> Vec<CueMarkup> {
        let style = &self.config.style;
        let active_color = style.active_color.to_ass();
        let passive_color = style.passive_color.to_ass();
        let layout = RunLayout {
            active_color: &active_color,
            passive_color: &passive_color,
            center_x: style.canvas.center_x(),
            baseline: self.config.position.baseline(style.canvas.height),
        };
        let marker = self.config.effect.marker();

        let mut lines = Vec::with_capacity(timeline.len() * if marker.is_some() { 2 } else { 1 });
        for (index, cue) in timeline.iter().enumerate() {
            if let Some(marker) = marker {
                lines.push(CueMarkup::marker_line(cue, self.marker_text(marker, &layout)));
            }

            let span = self.config.window.span(index, timeline.len());
            let first = span.start;
            let runs: Vec<String> = window(timeline, index, self.config.window)
                .iter()
                .enumerate()
                .map(|(offset, shown)| {
                    self.config.effect.style_run(
                        &escape_text(&shown.text),
                        first + offset == index,
                        cue.duration(),
                        &layout,
                    )
                })
                .collect();

            let placement = self
                .config
                .position
                .placement_tag(index, style.canvas)
                .map(|tag| format!("{{{tag}}}"))
                .unwrap_or_default();

            lines.push(CueMarkup::text_line(cue, format!("{placement}{}", runs.join(" "))));
        }
        lines
    }

    fn marker_text(&self, marker: Marker, layout: &RunLayout<'_>) -> String {
        let x = layout.center_x;
        let above = layout.baseline - i64::from(self.config.style.font_size) - 20;
        match marker {
            Marker::Heart => format!("{{\\an5\\pos({x},{above})\\1c&H0000FF&}}❤"),
            Marker::Ball => format!(
                "{{\\an5\\move({x},{},{x},{above},0,150)\\1c{}}}●",
                above - 60,
                layout.active_color
            ),
        }
    }
}

/// Keep cue text on one dialogue line
fn escape_text(text: &str) -> String {
    text.replace("\r\n", "\\N").replace('\n', "\\N")
}
