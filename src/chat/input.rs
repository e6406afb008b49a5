//! Terminal input: physical line sources and the logical-line classifier.
//!
//! A logical line is usually one physical line.  A line that starts with a
//! fence marker opens a verbatim block that runs until a later physical line
//! contains a fence marker; the whole block, newlines and fences included, is
//! one logical line.

use std::io::{self, Write};

use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, ExternalPrinter};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::chat::commands::{ChatCommand, parse_command};
use crate::chat::console::Console;
use crate::error::{Error, Result};

/// Opens and closes a verbatim block.
pub const FENCE: &str = "```";

/// Input that ends the read loop when entered on its own.
pub const QUIT: &str = ":q";

/// A source of newline-terminated physical lines.
#[async_trait::async_trait(?Send)]
pub trait LineSource {
    /// Reads the next physical line, including its trailing newline if any.
    ///
    /// Returns `None` at end of input.
    async fn next_line(&mut self) -> Result<Option<String>>;

    /// Reads the next physical line after showing `prompt`.
    ///
    /// Sources without a prompt of their own print it through `console`.
    async fn next_line_prompted(
        &mut self,
        prompt: &str,
        console: &Console,
    ) -> Result<Option<String>> {
        console.print_prompt(prompt);
        self.next_line().await
    }
}

/// Reads lines from any buffered async reader, e.g. piped stdin.
pub struct ReaderSource<R> {
    reader: R,
}

impl<R: AsyncBufRead + Unpin> ReaderSource<R> {
    /// Wraps a buffered reader.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

#[async_trait::async_trait(?Send)]
impl<R: AsyncBufRead + Unpin> LineSource for ReaderSource<R> {
    async fn next_line(&mut self) -> Result<Option<String>> {
        let mut line = Vec::new();
        let read = self
            .reader
            .read_until(b'\n', &mut line)
            .await
            .map_err(|err| Error::io(format!("failed to read input: {err}"), err))?;
        if read == 0 {
            return Ok(None);
        }
        // Bytes that are not UTF-8 become U+FFFD rather than ending the session.
        Ok(Some(String::from_utf8_lossy(&line).into_owned()))
    }
}

/// Reads lines from an interactive terminal with line editing and history.
pub struct EditorSource {
    editor: DefaultEditor,
    prompt: String,
}

impl EditorSource {
    /// Creates a line editor that shows `prompt` before each line.
    pub fn new(prompt: impl Into<String>) -> Result<Self> {
        let editor = DefaultEditor::new()
            .map_err(|err| Error::input(format!("cannot open terminal: {err}")))?;
        Ok(Self {
            editor,
            prompt: prompt.into(),
        })
    }

    /// Returns a sink for [`Console`] that prints above the line being edited.
    ///
    /// Output written through it is redrawn around the prompt instead of
    /// landing in the middle of a half-typed line.
    pub fn console_writer(&mut self) -> Result<Box<dyn Write + Send>> {
        let printer = self
            .editor
            .create_external_printer()
            .map_err(|err| Error::input(format!("cannot share terminal output: {err}")))?;
        Ok(Box::new(PromptWriter::new(printer)))
    }

    fn read(&mut self, prompt: &str) -> Result<Option<String>> {
        loop {
            // The editor owns the terminal while it waits; keep other tasks running.
            let line = tokio::task::block_in_place(|| self.editor.readline(prompt));
            match line {
                Ok(line) => {
                    if !line.is_empty() {
                        let _ = self.editor.add_history_entry(line.as_str());
                    }
                    return Ok(Some(line + "\n"));
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => return Ok(None),
                Err(err) => return Err(Error::input(err.to_string())),
            }
        }
    }
}

#[async_trait::async_trait(?Send)]
impl LineSource for EditorSource {
    async fn next_line(&mut self) -> Result<Option<String>> {
        let prompt = self.prompt.clone();
        self.read(&prompt)
    }

    async fn next_line_prompted(
        &mut self,
        prompt: &str,
        _console: &Console,
    ) -> Result<Option<String>> {
        self.read(prompt)
    }
}

/// A [`Write`] sink that hands each flushed chunk to a line editor's printer.
pub struct PromptWriter<P> {
    printer: P,
    pending: Vec<u8>,
}

impl<P: ExternalPrinter> PromptWriter<P> {
    /// Wraps an external printer.
    pub fn new(printer: P) -> Self {
        Self {
            printer,
            pending: Vec::new(),
        }
    }
}

impl<P: ExternalPrinter> Write for PromptWriter<P> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        self.printer
            .print(text)
            .map_err(|err| io::Error::other(err.to_string()))
    }
}

/// A classified logical line.
#[derive(Debug, Clone, PartialEq)]
pub enum InputLine {
    /// Stop reading input.
    Quit,
    /// A verbatim block, exactly as read.
    Fenced(String),
    /// A recognised command.
    Command(ChatCommand),
    /// Ordinary text, trailing newline removed.
    Text(String),
}

/// Reads and classifies one logical line.
///
/// Returns `None` at end of input.  A fence left open at end of input yields
/// whatever was accumulated.
pub async fn read_logical_line(source: &mut dyn LineSource) -> Result<Option<InputLine>> {
    let Some(line) = source.next_line().await? else {
        return Ok(None);
    };

    if line.starts_with(FENCE) {
        let mut block = line;
        while let Some(subline) = source.next_line().await? {
            block.push_str(&subline);
            if subline.contains(FENCE) {
                break;
            }
        }
        return Ok(Some(InputLine::Fenced(block)));
    }

    Ok(Some(classify(strip_newline(&line))))
}

/// Classifies a single line that has already had its newline removed.
pub fn classify(line: &str) -> InputLine {
    if line.is_empty() || line == QUIT {
        InputLine::Quit
    } else if let Some(command) = parse_command(line) {
        InputLine::Command(command)
    } else {
        InputLine::Text(line.to_string())
    }
}

/// Removes one trailing `\n` (and a `\r` before it).
pub fn strip_newline(line: &str) -> &str {
    match line.strip_suffix('\n') {
        Some(line) => line.strip_suffix('\r').unwrap_or(line),
        None => line,
    }
}
