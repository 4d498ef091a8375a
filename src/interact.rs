//! User interaction: line prompts, the fuzzy picker and the external editor.
//!
//! Commands talk to the user only through the [`Interaction`] trait, so they
//! can be driven by a script in tests. [`Terminal`] is the real thing:
//!
//! - prompts read one line from stdin, showing the current value, which is
//!   kept when the answer is empty
//! - the picker pipes the choices into `fzf`; cancelling it (non-zero exit)
//!   means nothing was picked
//! - the editor runs the configured `editor-command` through the shell with
//!   `%s` replaced by the quoted file path

use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InteractError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("editor command {command:?} exited with {status}")]
    EditorFailed { command: String, status: ExitStatus },
    #[error("no input: stdin is closed")]
    Eof,
}

/// Everything a command may ask of the user.
pub trait Interaction {
    /// Ask for one line of text. Empty input keeps `current`.
    fn prompt(&mut self, label: &str, current: &str) -> Result<String, InteractError>;

    /// Let the user pick one of `choices`. `None` when cancelled.
    fn pick(&mut self, label: &str, choices: &[String]) -> Result<Option<String>, InteractError>;

    /// Open `path` in the editor and wait for it to close.
    fn edit(&mut self, path: &Path) -> Result<(), InteractError>;

    /// Yes/no question; empty input answers `default`.
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool, InteractError> {
        let hint = if default { "Y/n" } else { "y/N" };
        let answer = self.prompt(&format!("{question}? ({hint})"), "")?;
        Ok(match answer.trim().chars().next() {
            Some(c) => c.eq_ignore_ascii_case(&'y'),
            None => default,
        })
    }
}

/// Interaction over stdin/stdout, `fzf` and the configured editor.
pub struct Terminal {
    editor_command: String,
    /// `.editorconfig` copied next to drafts before editing, if present.
    editorconfig: Option<PathBuf>,
    /// Prompt answers are appended here.
    history: Option<PathBuf>,
}

impl Terminal {
    pub fn new(editor_command: impl Into<String>) -> Self {
        Self {
            editor_command: editor_command.into(),
            editorconfig: None,
            history: None,
        }
    }

    pub fn with_editorconfig(mut self, path: PathBuf) -> Self {
        self.editorconfig = Some(path);
        self
    }

    pub fn with_history(mut self, path: PathBuf) -> Self {
        self.history = Some(path);
        self
    }

    fn record_history(&self, line: &str) -> io::Result<()> {
        let Some(path) = &self.history else {
            return Ok(());
        };
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{line}")
    }
}

impl Interaction for Terminal {
    fn prompt(&mut self, label: &str, current: &str) -> Result<String, InteractError> {
        let current = current.trim();
        let mut stdout = io::stdout().lock();
        if current.is_empty() {
            write!(stdout, "({label}) ")?;
        } else {
            write!(stdout, "({label}) [{current}] ")?;
        }
        stdout.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(InteractError::Eof);
        }
        let answer = line.trim();
        if answer.is_empty() {
            return Ok(current.to_string());
        }
        self.record_history(answer)?;
        Ok(answer.to_string())
    }

    fn pick(&mut self, label: &str, choices: &[String]) -> Result<Option<String>, InteractError> {
        let mut child = Command::new("fzf")
            .arg(format!("--prompt={label}"))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|source| InteractError::Spawn {
                program: "fzf".to_string(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(choices.join("\n").as_bytes())?;
        }
        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Ok(None);
        }

        let picked = String::from_utf8_lossy(&output.stdout);
        let picked = picked.lines().next().unwrap_or("").trim();
        Ok((!picked.is_empty()).then(|| picked.to_string()))
    }

    fn edit(&mut self, path: &Path) -> Result<(), InteractError> {
        if let (Some(source), Some(dir)) = (&self.editorconfig, path.parent())
            && source.is_file()
        {
            fs::copy(source, dir.join(".editorconfig"))?;
        }

        let command = editor_command_line(&self.editor_command, path);
        let status = shell(&command)
            .status()
            .map_err(|source| InteractError::Spawn {
                program: command.clone(),
                source,
            })?;
        if !status.success() {
            return Err(InteractError::EditorFailed { command, status });
        }
        Ok(())
    }
}

/// Substitute the quoted `path` for every `%s` in the editor command.
pub fn editor_command_line(template: &str, path: &Path) -> String {
    template.replace("%s", &shell_quote(&path.to_string_lossy()))
}

#[cfg(not(windows))]
fn shell_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}

#[cfg(windows)]
fn shell_quote(text: &str) -> String {
    format!("\"{text}\"")
}

#[cfg(not(windows))]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::Scripted;

    #[cfg(not(windows))]
    #[test]
    fn editor_path_is_quoted() {
        let line = editor_command_line("vim -- %s", Path::new("/tmp/it's.md"));
        assert_eq!(line, r"vim -- '/tmp/it'\''s.md'");
    }

    #[test]
    fn every_placeholder_is_replaced() {
        let line = editor_command_line("cp %s %s.bak", Path::new("a.md"));
        assert!(!line.contains("%s"));
        assert_eq!(line.matches("a.md").count(), 2);
    }

    #[cfg(not(windows))]
    #[test]
    fn terminal_editor_runs_the_command() {
        let tmp = tempfile::TempDir::new().unwrap();
        let draft = tmp.path().join("draft.md");
        fs::write(&draft, "").unwrap();

        let mut terminal = Terminal::new("printf 'written' > %s");
        terminal.edit(&draft).unwrap();
        assert_eq!(fs::read_to_string(&draft).unwrap(), "written");
    }

    #[cfg(not(windows))]
    #[test]
    fn failing_editor_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let draft = tmp.path().join("draft.md");

        let mut terminal = Terminal::new("false %s");
        let result = terminal.edit(&draft);
        assert!(matches!(result, Err(InteractError::EditorFailed { .. })));
    }

    #[cfg(not(windows))]
    #[test]
    fn editorconfig_is_copied_next_to_the_draft() {
        let site = tempfile::TempDir::new().unwrap();
        let drafts = tempfile::TempDir::new().unwrap();
        fs::write(site.path().join(".editorconfig"), "root = true\n").unwrap();

        let mut terminal =
            Terminal::new("true %s").with_editorconfig(site.path().join(".editorconfig"));
        terminal.edit(&drafts.path().join("x.md")).unwrap();
        assert!(drafts.path().join(".editorconfig").is_file());
    }

    #[test]
    fn confirm_defaults_on_empty_answer() {
        let mut ui = Scripted::new().answer("");
        assert!(ui.confirm("Overwrite", true).unwrap());

        let mut ui = Scripted::new().answer("");
        assert!(!ui.confirm("Overwrite", false).unwrap());
    }

    #[test]
    fn confirm_reads_first_letter() {
        let mut ui = Scripted::new().answer("Yes please").answer("nope");
        assert!(ui.confirm("Overwrite", false).unwrap());
        assert!(!ui.confirm("Overwrite", true).unwrap());
    }
}
