//! Advanced SubStation Alpha script writer

use super::emitter::{CueMarkup, SubtitleEmitter};
use super::timecode::format_ass_time;
use super::RenderConfig;
use crate::timeline::Timeline;

const STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";

const EVENT_FORMAT: &str =
    "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

/// Header sections: script info, the `Default` style and the events format
#[must_use]
pub fn ass_header(config: &RenderConfig) -> String {
    let style = &config.style;
    let (border_style, back_color) = if config.effect.uses_box() {
        (3, "&H80000000")
    } else {
        (1, "&H00000000")
    };

    let mut header = String::new();
    header.push_str("[Script Info]\n");
    header.push_str("ScriptType: v4.00+\n");
    header.push_str(&format!("PlayResX: {}\n", style.canvas.width));
    header.push_str(&format!("PlayResY: {}\n", style.canvas.height));
    header.push_str("WrapStyle: 0\n");
    header.push_str("ScaledBorderAndShadow: yes\n\n");

    header.push_str("[V4+ Styles]\n");
    header.push_str(STYLE_FORMAT);
    header.push('\n');
    header.push_str(&format!(
        "Style: Default,{},{},{},{},&H00000000,{back_color},-1,0,0,0,100,100,0,0,{border_style},2,0,{},10,10,{},1\n\n",
        style.font,
        style.font_size,
        style.active_color.to_ass(),
        style.passive_color.to_ass(),
        config.position.alignment(),
        config.position.margin_v(),
    ));

    header.push_str("[Events]\n");
    header.push_str(EVENT_FORMAT);
    header.push('\n');
    header
}

/// One `Dialogue:` event line
#[must_use]
pub fn dialogue_line(markup: &CueMarkup) -> String {
    format!(
        "Dialogue: {},{},{},Default,,0,0,0,,{}",
        markup.layer,
        format_ass_time(markup.start),
        format_ass_time(markup.end),
        markup.text
    )
}

/// Complete ASS script for `timeline`
#[must_use]
pub fn render_ass(timeline: &Timeline, config: &RenderConfig) -> String {
    let mut script = ass_header(config);
    for markup in SubtitleEmitter::new(config).emit(timeline) {
        script.push_str(&dialogue_line(&markup));
        script.push('\n');
    }
    script
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitle::{EffectSelection, SubtitlePosition, VisibilityWindow};
    use crate::timeline::{refine, RawCue};
    use pretty_assertions::assert_eq;

    #[test]
    fn header_uses_style_settings() {
        let config = RenderConfig {
            position: SubtitlePosition::Top,
            ..RenderConfig::default()
        };
        let header = ass_header(&config);
        assert!(header.starts_with("[Script Info]\nScriptType: v4.00+\nPlayResX: 1920\nPlayResY: 1080\n"));
        assert!(header.contains(
            "Style: Default,Arial,60,&H0000FF00,&H00FFFFFF,&H00000000,&H00000000,-1,0,0,0,100,100,0,0,1,2,0,8,10,10,50,1\n"
        ));
        assert!(header.ends_with(&format!("[Events]\n{EVENT_FORMAT}\n")));
    }

    #[test]
    fn box_effect_switches_border_style() {
        let config = RenderConfig {
            effect: EffectSelection::Box,
            position: SubtitlePosition::Center,
            ..RenderConfig::default()
        };
        assert!(ass_header(&config).contains(",&H80000000,-1,0,0,0,100,100,0,0,3,2,0,5,10,10,0,1"));
    }

    #[test]
    fn dialogue_lines_follow_cues() {
        let timeline = refine(vec![
            RawCue::new("Hola", 0.0, 0.5),
            RawCue::new("mundo", 0.5, 1.25),
        ]);
        let config = RenderConfig {
            window: VisibilityWindow::Single,
            ..RenderConfig::default()
        };
        let script = render_ass(&timeline, &config);
        let events: Vec<&str> = script
            .lines()
            .filter(|line| line.starts_with("Dialogue:"))
            .collect();
        assert_eq!(
            events,
            vec![
                "Dialogue: 0,0:00:00.00,0:00:00.50,Default,,0,0,0,,{\\1c&H0000FF00}Hola",
                "Dialogue: 0,0:00:00.50,0:00:01.25,Default,,0,0,0,,{\\1c&H0000FF00}mundo",
            ]
        );
    }

    #[test]
    fn empty_timeline_is_header_only() {
        let config = RenderConfig::default();
        assert_eq!(render_ass(&Timeline::empty(), &config), ass_header(&config));
    }
}
