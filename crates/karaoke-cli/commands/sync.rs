//! `karaoke sync`: recognizer output plus lyrics to a timeline

use super::save_timeline;
use crate::cli::SyncArgs;
use crate::config::CliConfig;
use crate::tools::WhisperCommand;
use anyhow::{Context, Result};
use dialoguer::Confirm;
use karaoke_core::collab::{CollaboratorWorker, RecognitionRequest, Recognizer};
use karaoke_core::subtitle::{parse_srt, SubtitleFormat};
use karaoke_core::sync::{parse_recognizer_json, AmbiguityResolver};
use karaoke_core::{RawCue, SyncPipeline, SyncResolution};
use std::fs;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub fn run(args: &SyncArgs, config: &CliConfig) -> Result<()> {
    let words = match (&args.transcript, &args.media) {
        (Some(path), _) => load_transcript(path)?,
        (None, Some(media)) => transcribe(media, args, config)?,
        (None, None) => anyhow::bail!("either --media or --transcript is required"),
    };

    let lyrics = match &args.lyrics {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading lyrics {}", path.display()))?,
        None => String::new(),
    };

    let mut policy = config.pipeline.sync;
    if let Some(threshold) = args.threshold {
        policy.similarity_threshold = threshold;
    }
    policy.validate()?;

    let resolver = resolver_for(args);
    let outcome = SyncPipeline::new(policy).run(words, &lyrics, resolver.as_ref());
    save_timeline(&args.out, &outcome.timeline)?;

    match outcome.ratio {
        Some(ratio) => println!(
            "{} cues from {} (similarity {:.0}%) -> {}",
            outcome.timeline.len(),
            outcome.source,
            ratio * 100.0,
            args.out.display()
        ),
        None => println!(
            "{} cues from {} -> {}",
            outcome.timeline.len(),
            outcome.source,
            args.out.display()
        ),
    }
    Ok(())
}

/// Recognizer JSON, or an SRT file treated as already recognized words
fn load_transcript(path: &Path) -> Result<Vec<RawCue>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading transcript {}", path.display()))?;
    let words = if SubtitleFormat::from_path(path) == Some(SubtitleFormat::Srt) {
        parse_srt(&content)
    } else {
        parse_recognizer_json(&content)
            .with_context(|| format!("parsing transcript {}", path.display()))?
    };
    info!(path = %path.display(), words = words.len(), "loaded transcript");
    Ok(words)
}

fn transcribe(media: &Path, args: &SyncArgs, config: &CliConfig) -> Result<Vec<RawCue>> {
    let tools = &config.tools;
    let model = args.model.as_deref().unwrap_or(&tools.model);
    let mut request = RecognitionRequest::new(media, model);
    if let Some(language) = args.language.as_ref().or(tools.language.as_ref()) {
        request = request.with_language(language);
    }

    let recognizer = Arc::new(WhisperCommand::new(&tools.whisper));
    let worker = CollaboratorWorker::new(recognizer.name());
    let transcript = worker
        .recognize(recognizer, request)?
        .wait()
        .with_context(|| format!("transcribing {}", media.display()))?;
    Ok(transcript.words)
}

fn resolver_for(args: &SyncArgs) -> Box<dyn AmbiguityResolver> {
    if args.force_lyrics {
        Box::new(SyncResolution::ForceLyrics)
    } else if args.use_recognizer {
        Box::new(SyncResolution::UseRecognizer)
    } else if std::io::stdin().is_terminal() {
        Box::new(ConfirmPrompt)
    } else {
        Box::new(NonInteractive)
    }
}

/// Asks on the terminal whether to keep poorly matching lyrics
struct ConfirmPrompt;

impl AmbiguityResolver for ConfirmPrompt {
    fn resolve(&self, ratio: f64) -> SyncResolution {
        let prompt = format!(
            "The lyrics match only {}% of what was heard; the result may drift out of sync. Use them anyway?",
            percent(ratio)
        );
        match Confirm::new().with_prompt(prompt).default(false).interact() {
            Ok(true) => SyncResolution::ForceLyrics,
            Ok(false) => SyncResolution::UseRecognizer,
            Err(err) => {
                warn!(%err, "prompt failed, keeping recognized words");
                SyncResolution::UseRecognizer
            }
        }
    }
}

/// Keeps the recognized words when nobody can be asked
struct NonInteractive;

impl AmbiguityResolver for NonInteractive {
    fn resolve(&self, ratio: f64) -> SyncResolution {
        warn!(
            similarity = percent(ratio),
            "lyrics barely match, keeping recognized words (pass --force-lyrics to override)"
        );
        SyncResolution::UseRecognizer
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percent(ratio: f64) -> u32 {
    (ratio.clamp(0.0, 1.0) * 100.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::load_timeline;
    use std::path::PathBuf;

    fn args(transcript: PathBuf, lyrics: Option<PathBuf>, out: PathBuf) -> SyncArgs {
        SyncArgs {
            media: None,
            transcript: Some(transcript),
            lyrics,
            force_lyrics: false,
            use_recognizer: true,
            model: None,
            language: None,
            threshold: None,
            out,
        }
    }

    #[test]
    fn percent_truncates() {
        assert_eq!(percent(0.399), 39);
        assert_eq!(percent(1.0), 100);
        assert_eq!(percent(-0.2), 0);
    }

    #[test]
    fn non_interactive_keeps_recognizer() {
        assert_eq!(NonInteractive.resolve(0.1), SyncResolution::UseRecognizer);
    }

    #[test]
    fn transcript_and_lyrics_to_timeline_file() {
        let dir = tempfile::tempdir().unwrap();
        let transcript = dir.path().join("heard.json");
        let lyrics = dir.path().join("lyrics.txt");
        let out = dir.path().join("timeline.json");
        fs::write(
            &transcript,
            r#"{"segments": [{"words": [
                {"word": " hola", "start": 0.0, "end": 0.5},
                {"word": " mundo", "start": 0.5, "end": 1.0}
            ]}]}"#,
        )
        .unwrap();
        fs::write(&lyrics, "Hola mundo\n").unwrap();

        run(&args(transcript, Some(lyrics), out.clone()), &CliConfig::default()).unwrap();

        let timeline = load_timeline(&out).unwrap();
        let words: Vec<_> = timeline.iter().map(|cue| cue.text.as_str()).collect();
        assert_eq!(words, ["Hola", "mundo"]);
        assert_eq!(timeline.cues()[1].start, 0.5);
    }

    #[test]
    fn srt_transcript_without_lyrics_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let transcript = dir.path().join("heard.srt");
        let out = dir.path().join("timeline.json");
        fs::write(&transcript, "1\n00:00:00,000 --> 00:00:00,400\nla\n").unwrap();

        run(&args(transcript, None, out.clone()), &CliConfig::default()).unwrap();
        assert_eq!(load_timeline(&out).unwrap().len(), 1);
    }

    #[test]
    fn invalid_threshold_fails_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let transcript = dir.path().join("heard.json");
        let out = dir.path().join("timeline.json");
        fs::write(&transcript, "[]").unwrap();

        let mut sync_args = args(transcript, None, out.clone());
        sync_args.threshold = Some(1.5);
        assert!(run(&sync_args, &CliConfig::default()).is_err());
        assert!(!out.exists());
    }
}
