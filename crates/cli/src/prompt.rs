//! Line-oriented prompts on stdin.

use std::io::{self, IsTerminal, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

/// Reads answers from stdin. One buffered reader is shared by every prompt
/// so piped input is not lost between questions.
pub struct Prompt {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl Prompt {
    pub fn stdin() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    /// Ask a question and return the answer without the line ending.
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedEof` once stdin is closed.
    pub async fn ask(&self, label: &str) -> io::Result<String> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(format!("{label}: ").as_bytes()).await?;
        stdout.flush().await?;

        self.lines
            .lock()
            .await
            .next_line()
            .await?
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"))
    }

    /// Ask for a secret. On a terminal the answer is not echoed; piped input
    /// is read like any other line.
    ///
    /// # Errors
    ///
    /// See [`Prompt::ask`]; `Interrupted` if the user presses Ctrl-C.
    pub async fn ask_secret(&self, label: &str) -> io::Result<String> {
        if !io::stdin().is_terminal() {
            return self.ask(label).await;
        }

        let label = label.to_string();
        tokio::task::spawn_blocking(move || read_hidden(&label))
            .await
            .map_err(io::Error::other)?
    }

    /// Ask with a default shown in brackets; a blank answer keeps it.
    ///
    /// # Errors
    ///
    /// See [`Prompt::ask`].
    pub async fn ask_or(&self, label: &str, current: &str) -> io::Result<String> {
        let answer = self.ask(&format!("{label} [{current}]")).await?;
        if answer.trim().is_empty() {
            Ok(current.to_string())
        } else {
            Ok(answer)
        }
    }
}

/// What a key press does to a hidden answer.
#[derive(Debug, PartialEq, Eq)]
enum KeyStep {
    Continue,
    Submit,
    Abort,
}

fn apply_key(answer: &mut String, key: KeyEvent) -> KeyStep {
    if key.kind == KeyEventKind::Release {
        return KeyStep::Continue;
    }
    match key.code {
        KeyCode::Enter => KeyStep::Submit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyStep::Abort,
        KeyCode::Char(c) => {
            answer.push(c);
            KeyStep::Continue
        }
        KeyCode::Backspace => {
            answer.pop();
            KeyStep::Continue
        }
        _ => KeyStep::Continue,
    }
}

/// Leaves raw mode when dropped, on every exit path.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn read_hidden(label: &str) -> io::Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{label}: ")?;
    stdout.flush()?;

    let mut answer = String::new();
    let step = {
        let _raw = RawMode::enable()?;
        loop {
            if let Event::Key(key) = event::read()? {
                match apply_key(&mut answer, key) {
                    KeyStep::Continue => {}
                    step => break step,
                }
            }
        }
    };
    writeln!(stdout)?;

    match step {
        KeyStep::Abort => Err(io::Error::new(io::ErrorKind::Interrupted, "cancelled")),
        _ => Ok(answer),
    }
}
