//! External programs behind the recognizer and encoder seams
//!
//! Both run as child processes. The child is polled so a cancelled request
//! kills it, and stderr is collected on a separate thread so a chatty
//! program cannot stall on a full pipe.

use karaoke_core::collab::{
    CancellationToken, Encoder, RecognitionRequest, Recognizer, RenderJob, Transcript,
};
use karaoke_core::sync::parse_recognizer_json;
use karaoke_core::{KaraokeError, Result};
use std::ffi::OsStr;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Lines of stderr kept for failure messages
const STDERR_TAIL: usize = 12;

/// Recognizer driving the `whisper` command line program
#[derive(Debug, Clone)]
pub struct WhisperCommand {
    program: PathBuf,
}

impl WhisperCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, request: &RecognitionRequest, output_dir: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg(&request.media)
            .args(["--model", request.model.as_str()])
            .args(["--word_timestamps", "True"])
            .args(["--output_format", "json"])
            .arg("--output_dir")
            .arg(output_dir);
        if let Some(language) = &request.language {
            command.args(["--language", language.as_str()]);
        }
        command
    }
}

impl Recognizer for WhisperCommand {
    fn name(&self) -> &str {
        "whisper"
    }

    fn recognize(&self, request: &RecognitionRequest, cancel: &CancellationToken) -> Result<Transcript> {
        let output_dir = tempfile::tempdir()
            .map_err(|e| KaraokeError::io(format!("Failed to create recognizer output directory: {e}")))?;

        info!(media = %request.media.display(), model = %request.model, "transcribing");
        run_to_completion(self.name(), self.command(request, output_dir.path()), cancel)?;

        let stem = request
            .media
            .file_stem()
            .unwrap_or_else(|| OsStr::new("transcript"))
            .to_string_lossy();
        let json_path = output_dir.path().join(format!("{stem}.json"));
        let json = fs::read_to_string(&json_path).map_err(|e| {
            KaraokeError::collaborator(
                self.name(),
                format!("no output at {}: {e}", json_path.display()),
            )
        })?;

        let words = parse_recognizer_json(&json)
            .map_err(|e| KaraokeError::collaborator(self.name(), e))?;
        let language = serde_json::from_str::<serde_json::Value>(&json)
            .ok()
            .and_then(|document| document.get("language")?.as_str().map(String::from));

        info!(words = words.len(), language = ?language, "transcription finished");
        Ok(Transcript { words, language })
    }
}

/// Encoder driving `ffmpeg` with the `ass` filter
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    program: PathBuf,
}

impl FfmpegCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, job: &RenderJob) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("-i")
            .arg(&job.media)
            .arg("-vf")
            .arg(format!("ass={}", filter_path(&job.subtitles)))
            .args(["-c:v", "libx264", "-preset", "ultrafast", "-c:a", "copy", "-y"])
            .arg(&job.output);
        command
    }
}

impl Encoder for FfmpegCommand {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn encode(&self, job: &RenderJob, cancel: &CancellationToken) -> Result<()> {
        info!(media = %job.media.display(), output = %job.output.display(), "encoding");
        run_to_completion(self.name(), self.command(job), cancel)
    }
}

/// Path as an ffmpeg filter argument
///
/// Backslashes become forward slashes; `:` and `'` are escaped.
fn filter_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .replace(':', "\\:")
        .replace('\'', "\\'")
}

fn run_to_completion(name: &str, mut command: Command, cancel: &CancellationToken) -> Result<()> {
    command.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::piped());
    debug!(collaborator = name, command = ?command, "starting");

    let mut child = command
        .spawn()
        .map_err(|e| KaraokeError::collaborator(name, format!("cannot start {:?}: {e}", command.get_program())))?;

    let stderr = child.stderr.take();
    let collector = thread::spawn(move || {
        let mut text = String::new();
        if let Some(mut pipe) = stderr {
            // partial output is still useful if the pipe breaks
            let _ = pipe.read_to_string(&mut text);
        }
        text
    });

    let status = loop {
        if cancel.is_cancelled() {
            // the child may already have exited
            let _ = child.kill();
            let _ = child.wait();
            let _ = collector.join();
            return Err(KaraokeError::Cancelled {
                collaborator: name.to_string(),
            });
        }
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => return Err(KaraokeError::collaborator(name, format!("lost track of process: {e}"))),
        }
    };

    let stderr = collector.join().unwrap_or_default();
    if status.success() {
        debug!(collaborator = name, "finished");
        Ok(())
    } else {
        Err(KaraokeError::collaborator(
            name,
            format!("exited with {status}: {}", stderr_tail(&stderr)),
        ))
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|line| !line.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_path_escapes_separators() {
        assert_eq!(filter_path(Path::new("/tmp/sub.ass")), "/tmp/sub.ass");
        assert_eq!(filter_path(Path::new("C:\\subs\\it's.ass")), "C\\:/subs/it\\'s.ass");
    }

    #[test]
    fn whisper_arguments() {
        let request = RecognitionRequest::new("song.mp4", "medium").with_language("es");
        let command = WhisperCommand::new("whisper").command(&request, Path::new("/tmp/out"));
        let args: Vec<_> = command.get_args().map(|arg| arg.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            [
                "song.mp4",
                "--model",
                "medium",
                "--word_timestamps",
                "True",
                "--output_format",
                "json",
                "--output_dir",
                "/tmp/out",
                "--language",
                "es"
            ]
        );
    }

    #[test]
    fn ffmpeg_arguments() {
        let job = RenderJob {
            media: PathBuf::from("in.mp4"),
            subtitles: PathBuf::from("subs.ass"),
            output: PathBuf::from("out.mp4"),
        };
        let command = FfmpegCommand::new("ffmpeg").command(&job);
        let args: Vec<_> = command.get_args().map(|arg| arg.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            [
                "-i", "in.mp4", "-vf", "ass=subs.ass", "-c:v", "libx264", "-preset", "ultrafast",
                "-c:a", "copy", "-y", "out.mp4"
            ]
        );
    }

    #[test]
    fn stderr_tail_keeps_last_lines() {
        let text: String = (0..20).map(|i| format!("line {i}\n\n")).collect();
        let tail = stderr_tail(&text);
        assert!(tail.starts_with("line 8"));
        assert!(tail.ends_with("line 19"));
    }

    #[test]
    fn missing_program_is_a_collaborator_failure() {
        let recognizer = WhisperCommand::new("/nonexistent/karaoke-whisper");
        let request = RecognitionRequest::new("song.mp4", "small");
        let err = recognizer.recognize(&request, &CancellationToken::new()).unwrap_err();
        assert!(err.is_collaborator_error());
    }

    #[cfg(unix)]
    #[test]
    fn failing_program_reports_stderr() {
        let mut command = Command::new("sh");
        command.args(["-c", "echo 'bad input' >&2; exit 3"]);
        let err = run_to_completion("sh", command, &CancellationToken::new()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("bad input"), "{message}");
    }

    #[cfg(unix)]
    #[test]
    fn cancelled_request_kills_the_child() {
        let token = CancellationToken::new();
        token.cancel();
        let mut command = Command::new("sleep");
        command.arg("30");
        let err = run_to_completion("sleep", command, &token).unwrap_err();
        assert!(matches!(err, KaraokeError::Cancelled { .. }));
    }
}
