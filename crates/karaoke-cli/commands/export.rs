//! `karaoke export`: timeline to SRT or ASS

use super::load_timeline;
use crate::cli::ExportArgs;
use crate::config::CliConfig;
use anyhow::{Context, Result};
use karaoke_core::subtitle::export_to_path;

pub fn run(args: &ExportArgs, config: &CliConfig) -> Result<()> {
    let timeline = load_timeline(&args.timeline)?;
    let mut render = config.pipeline.render.clone();
    args.style.apply(&mut render);
    render.validate()?;

    let format = export_to_path(&args.out, &timeline, &render)
        .with_context(|| format!("exporting {}", args.out.display()))?;
    println!("{} cues -> {} ({format})", timeline.len(), args.out.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::StyleArgs;
    use crate::commands::save_timeline;
    use karaoke_core::{refine, EffectSelection, RawCue};
    use std::fs;

    #[test]
    fn exports_styled_ass() {
        let dir = tempfile::tempdir().unwrap();
        let timeline_path = dir.path().join("song.json");
        save_timeline(
            &timeline_path,
            &refine(vec![RawCue::new("la", 0.0, 0.5), RawCue::new("la", 0.6, 1.0)]),
        )
        .unwrap();

        let args = ExportArgs {
            timeline: timeline_path,
            out: dir.path().join("song.ass"),
            style: StyleArgs {
                effect: Some(EffectSelection::Wipe),
                ..StyleArgs::default()
            },
        };
        run(&args, &CliConfig::default()).unwrap();

        let script = fs::read_to_string(&args.out).unwrap();
        assert!(script.contains("\\kf50"));
        assert_eq!(script.lines().filter(|line| line.starts_with("Dialogue:")).count(), 2);
    }

    #[test]
    fn bad_style_override_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let timeline_path = dir.path().join("song.json");
        fs::write(&timeline_path, "[]").unwrap();

        let args = ExportArgs {
            timeline: timeline_path,
            out: dir.path().join("song.ass"),
            style: StyleArgs {
                font_size: Some(0),
                ..StyleArgs::default()
            },
        };
        assert!(run(&args, &CliConfig::default()).is_err());
        assert!(!args.out.exists());
    }
}
