//! Terminal output shared by the read loop and the inbound printer.
//!
//! Both paths write through a [`Console`] handle.  Each call takes the lock,
//! writes complete lines, flushes, and releases it, so output from the two
//! paths never interleaves within a line.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::types::Message;
use crate::utils::time::clock;

/// ANSI escape code for dim text (used for timestamps).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for bold text (used for headers).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for author names).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

struct Inner {
    out: Box<dyn Write + Send>,
    use_color: bool,
    show_timestamps: bool,
}

/// A cloneable handle to the terminal's output stream.
#[derive(Clone)]
pub struct Console {
    inner: Arc<Mutex<Inner>>,
}

impl Console {
    /// Creates a console writing to stdout.
    pub fn stdout(use_color: bool, show_timestamps: bool) -> Self {
        Self::with_writer(Box::new(io::stdout()), use_color, show_timestamps)
    }

    /// Creates a console writing to an arbitrary sink.
    pub fn with_writer(out: Box<dyn Write + Send>, use_color: bool, show_timestamps: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                out,
                use_color,
                show_timestamps,
            })),
        }
    }

    /// Creates an uncolored console that writes into a [`SharedBuffer`].
    pub fn capture(show_timestamps: bool) -> (Self, SharedBuffer) {
        let buffer = SharedBuffer::default();
        let console = Self::with_writer(Box::new(buffer.clone()), false, show_timestamps);
        (console, buffer)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_lines(&self, render: impl FnOnce(&Inner) -> String) {
        let mut inner = self.lock();
        let text = render(&*inner);
        // A closed stdout leaves nowhere to report the failure.
        let _ = inner.out.write_all(text.as_bytes());
        let _ = inner.out.flush();
    }

    /// Print an informational message.
    pub fn print_info(&self, info: &str) {
        self.write_lines(|_| format!("{info}\n"));
    }

    /// Print an error message.
    pub fn print_error(&self, error: &str) {
        self.write_lines(|inner| {
            if inner.use_color {
                format!("{ANSI_RED}Error:{ANSI_RESET} {error}\n")
            } else {
                format!("Error: {error}\n")
            }
        });
    }

    /// Print a header line, e.g. the banner or the selected channel.
    pub fn print_header(&self, header: &str) {
        self.write_lines(|inner| {
            if inner.use_color {
                format!("{ANSI_BOLD}{header}{ANSI_RESET}\n")
            } else {
                format!("{header}\n")
            }
        });
    }

    /// Print a numbered menu of choices, 1-based.
    pub fn print_menu(&self, title: &str, labels: &[String]) {
        self.write_lines(|_| {
            let mut text = format!("{title}:\n");
            for (index, label) in labels.iter().enumerate() {
                text.push_str(&format!("  {:>3}) {}\n", index + 1, label));
            }
            text
        });
    }

    /// Print a prompt without a trailing newline.
    pub fn print_prompt(&self, prompt: &str) {
        self.write_lines(|_| prompt.to_string());
    }

    /// Print a message from the channel log.
    pub fn print_message(&self, message: &Message) {
        self.write_lines(|inner| format_message(message, inner.use_color, inner.show_timestamps));
    }
}

fn format_message(message: &Message, use_color: bool, show_timestamps: bool) -> String {
    let author = message.author.display_name();
    let mut text = String::new();
    if show_timestamps {
        let stamp = clock(&message.timestamp);
        if use_color {
            text.push_str(&format!("{ANSI_DIM}{stamp}{ANSI_RESET} "));
        } else {
            text.push_str(&format!("{stamp} "));
        }
    }
    if use_color {
        text.push_str(&format!("{ANSI_CYAN}<{author}>{ANSI_RESET} "));
    } else {
        text.push_str(&format!("<{author}> "));
    }
    text.push_str(&message.content);
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

/// An in-memory sink whose contents can be read back.
#[derive(Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Returns everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        let bytes = self
            .bytes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
