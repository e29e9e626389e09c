//! `karaoke edit`: line-oriented timeline editor
//!
//! Reads one command per line, applies it through [`TimelineEditor`] and
//! reports the result. Rejected edits print an error and the session goes
//! on.

use super::{load_timeline, save_timeline};
use crate::cli::EditArgs;
use crate::config::CliConfig;
use anyhow::{anyhow, bail, Context, Result};
use karaoke_core::timeline::{CueEdit, RawTime, TimelineEditor};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

const HELP: &str = "\
commands:
  list                          show all cues
  set <i> <start> <end> <text>  replace a cue
  text <i> <text>               replace a cue's text
  delete <i>                    remove a cue
  insert <seconds>              add a placeholder cue
  undo | redo                   step through history
  save                          write the timeline
  quit                          leave (refuses with unsaved changes)
  quit!                         leave and discard changes";

/// One editor command
#[derive(Debug, Clone, PartialEq)]
pub enum EditCommand {
    List,
    Set { index: usize, edit: CueEdit },
    Text { index: usize, text: String },
    Delete(usize),
    Insert(f64),
    Undo,
    Redo,
    Save,
    Help,
    Quit { force: bool },
}

impl FromStr for EditCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match word {
            "list" | "ls" => Self::List,
            "set" => {
                let mut parts = rest.splitn(4, char::is_whitespace).filter(|part| !part.is_empty());
                let index = parse_index(parts.next())?;
                let start = parts.next().ok_or_else(|| anyhow!("usage: set <i> <start> <end> <text>"))?;
                let end = parts.next().ok_or_else(|| anyhow!("usage: set <i> <start> <end> <text>"))?;
                let text = parts.next().unwrap_or_default();
                Self::Set {
                    index,
                    edit: CueEdit {
                        text: text.to_string(),
                        start: RawTime::Text(start.to_string()),
                        end: RawTime::Text(end.to_string()),
                    },
                }
            }
            "text" => {
                let (index, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                Self::Text {
                    index: parse_index(Some(index))?,
                    text: text.trim().to_string(),
                }
            }
            "delete" | "del" | "rm" => Self::Delete(parse_index(Some(rest))?),
            "insert" | "add" => {
                let at = rest
                    .parse()
                    .map_err(|_| anyhow!("usage: insert <seconds>"))?;
                Self::Insert(at)
            }
            "undo" | "u" => Self::Undo,
            "redo" | "r" => Self::Redo,
            "save" | "w" => Self::Save,
            "help" | "?" => Self::Help,
            "quit" | "q" => Self::Quit { force: false },
            "quit!" | "q!" => Self::Quit { force: true },
            other => bail!("unknown command '{other}' (try 'help')"),
        };
        Ok(command)
    }
}

fn parse_index(token: Option<&str>) -> Result<usize> {
    let token = token.map(str::trim).filter(|token| !token.is_empty());
    let token = token.ok_or_else(|| anyhow!("missing cue index"))?;
    token
        .parse()
        .map_err(|_| anyhow!("'{token}' is not a cue index"))
}

/// Editor plus where and whether to save
pub struct EditSession {
    editor: TimelineEditor,
    save_path: PathBuf,
    dirty: bool,
}

/// What the loop does after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

impl EditSession {
    pub fn new(editor: TimelineEditor, save_path: impl Into<PathBuf>) -> Self {
        Self {
            editor,
            save_path: save_path.into(),
            dirty: false,
        }
    }

    pub fn editor(&self) -> &TimelineEditor {
        &self.editor
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Run commands from `input` until `quit` or end of input
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> Result<()> {
        writeln!(output, "{} cues loaded, 'help' lists commands", self.editor.timeline().len())?;
        for line in input.lines() {
            let line = line.context("reading command")?;
            if line.trim().is_empty() {
                continue;
            }
            let flow = match line.parse::<EditCommand>() {
                Ok(command) => self.apply(command, output)?,
                Err(err) => {
                    writeln!(output, "error: {err}")?;
                    Flow::Continue
                }
            };
            if flow == Flow::Stop {
                return Ok(());
            }
        }
        if self.dirty {
            writeln!(output, "input ended with unsaved changes")?;
        }
        Ok(())
    }

    fn apply<W: Write>(&mut self, command: EditCommand, output: &mut W) -> Result<Flow> {
        let changed = match command {
            EditCommand::List => {
                write!(output, "{}", self.editor.timeline())?;
                None
            }
            EditCommand::Set { index, edit } => Some(self.editor.edit(index, edit).map(|_| ())),
            EditCommand::Text { index, text } => Some(self.editor.set_text(index, &text).map(|_| ())),
            EditCommand::Delete(index) => Some(self.editor.delete(index).map(|_| ())),
            EditCommand::Insert(at) => {
                self.editor.insert_at(at);
                Some(Ok(()))
            }
            EditCommand::Undo => {
                if self.editor.history().can_undo() {
                    self.editor.undo();
                    Some(Ok(()))
                } else {
                    writeln!(output, "nothing to undo")?;
                    None
                }
            }
            EditCommand::Redo => {
                if self.editor.history().can_redo() {
                    self.editor.redo();
                    Some(Ok(()))
                } else {
                    writeln!(output, "nothing to redo")?;
                    None
                }
            }
            EditCommand::Save => {
                save_timeline(&self.save_path, self.editor.timeline())?;
                self.dirty = false;
                writeln!(output, "saved {}", self.save_path.display())?;
                info!(path = %self.save_path.display(), "timeline saved");
                None
            }
            EditCommand::Help => {
                writeln!(output, "{HELP}")?;
                None
            }
            EditCommand::Quit { force } => {
                if self.dirty && !force {
                    writeln!(output, "unsaved changes: 'save' first or 'quit!' to discard")?;
                    return Ok(Flow::Continue);
                }
                return Ok(Flow::Stop);
            }
        };

        match changed {
            Some(Ok(())) => {
                self.dirty = true;
                writeln!(output, "ok, {} cues", self.editor.timeline().len())?;
            }
            Some(Err(err)) => writeln!(output, "error: {err}")?,
            None => {}
        }
        Ok(Flow::Continue)
    }
}

pub fn run(args: &EditArgs, config: &CliConfig) -> Result<()> {
    let timeline = load_timeline(&args.timeline)?;
    let save_path = args.out.clone().unwrap_or_else(|| json_path(&args.timeline));
    let editor = TimelineEditor::with_config(timeline, config.pipeline.history);

    let mut session = EditSession::new(editor, save_path);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    session.run(stdin.lock(), &mut stdout)
}

/// Saving never overwrites an imported SRT file
fn json_path(input: &Path) -> PathBuf {
    if input.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
        input.to_path_buf()
    } else {
        input.with_extension("json")
    }
}
