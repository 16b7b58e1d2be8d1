//! Clipboard writes with graceful degradation.
//!
//! Copying an assistant reply tries three tiers in order, each only after the
//! previous one failed:
//! 1. rich: the reply as an HTML document (`text/html`) together with the
//!    markdown source as plain-text alternative, in one clipboard write;
//! 2. plain: the markdown source as plain text;
//! 3. terminal selection: an OSC 52 escape asking the terminal emulator to
//!    set its selection, which also works over SSH.

use std::cell::RefCell;
use std::error::Error;
use std::fmt;
use std::io::{self, Write};
use std::process::{Child, Command, ExitStatus, Stdio};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::{debug, warn};

use crate::utils::html::markdown_to_html_document;

#[derive(Debug)]
pub enum ClipboardError {
    /// No tool for this tier exists on the platform or in `PATH`.
    NotAvailable(String),
    /// The tool ran but reported failure.
    CommandFailed(String),
    /// The platform clipboard rejected a multi-format write.
    Platform(arboard::Error),
    Io(io::Error),
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardError::NotAvailable(what) => write!(f, "{what} not available"),
            ClipboardError::CommandFailed(cmd) => write!(f, "clipboard command `{cmd}` failed"),
            ClipboardError::Platform(err) => write!(f, "platform clipboard: {err}"),
            ClipboardError::Io(err) => write!(f, "clipboard write failed: {err}"),
        }
    }
}

impl Error for ClipboardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ClipboardError::Io(err) => Some(err),
            ClipboardError::Platform(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ClipboardError {
    fn from(err: io::Error) -> Self {
        ClipboardError::Io(err)
    }
}

impl From<arboard::Error> for ClipboardError {
    fn from(err: arboard::Error) -> Self {
        ClipboardError::Platform(err)
    }
}

/// Which tier ended up holding the copied text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyTier {
    Rich,
    PlainText,
    TerminalSelection,
}

impl fmt::Display for CopyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CopyTier::Rich => "rich text",
            CopyTier::PlainText => "plain text",
            CopyTier::TerminalSelection => "terminal selection",
        };
        f.write_str(label)
    }
}

/// Destination for the three copy tiers.
pub trait ClipboardSink {
    /// Offer `html` and its `plain` alternative together. Must fail rather
    /// than store only one of the two.
    fn write_rich(&self, html: &str, plain: &str) -> Result<(), ClipboardError>;
    fn write_plain(&self, text: &str) -> Result<(), ClipboardError>;
    fn write_selection(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Copy an assistant reply, walking the tiers until one succeeds. Failures
/// are logged; the error of the final tier is returned if all fail.
pub fn copy_with_fallback(
    sink: &dyn ClipboardSink,
    markdown: &str,
) -> Result<CopyTier, ClipboardError> {
    let html = markdown_to_html_document(markdown);
    match sink.write_rich(&html, markdown) {
        Ok(()) => return Ok(CopyTier::Rich),
        Err(err) => debug!(error = %err, "rich clipboard write failed; trying plain text"),
    }

    match sink.write_plain(markdown) {
        Ok(()) => return Ok(CopyTier::PlainText),
        Err(err) => warn!(error = %err, "plain clipboard write failed; trying terminal selection"),
    }

    sink.write_selection(markdown).map(|()| CopyTier::TerminalSelection).map_err(|err| {
        warn!(error = %err, "final copy attempt failed");
        err
    })
}

/// Rich writes go through the platform clipboard API, plain writes through
/// external tools, and the terminal selection through stdout.
///
/// On X11 and Wayland the copied data is served by this process, so keep one
/// instance alive for as long as the chat runs.
#[derive(Default)]
pub struct SystemClipboard {
    platform: RefCell<Option<arboard::Clipboard>>,
}

impl SystemClipboard {
    /// The platform clipboard is opened on the first rich write.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardSink for SystemClipboard {
    fn write_rich(&self, html: &str, plain: &str) -> Result<(), ClipboardError> {
        let mut platform = self.platform.borrow_mut();
        if platform.is_none() {
            *platform = Some(arboard::Clipboard::new()?);
        }
        match platform.as_mut() {
            Some(clipboard) => Ok(clipboard.set_html(html, Some(plain))?),
            None => Err(ClipboardError::NotAvailable("platform clipboard".to_string())),
        }
    }

    fn write_plain(&self, text: &str) -> Result<(), ClipboardError> {
        #[cfg(target_os = "macos")]
        {
            run_with_stdin("pbcopy", &[], text)
        }
        #[cfg(target_os = "windows")]
        {
            run_with_stdin("cmd", &["/C", "clip"], text)
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            if run_with_stdin("wl-copy", &[], text).is_ok() {
                return Ok(());
            }
            if run_with_stdin("xclip", &["-selection", "clipboard"], text).is_ok() {
                return Ok(());
            }
            if run_with_stdin("xsel", &["--clipboard", "--input"], text).is_ok() {
                return Ok(());
            }
            Err(ClipboardError::NotAvailable(
                "clipboard command (install wl-copy, xclip, or xsel)".to_string(),
            ))
        }
    }

    fn write_selection(&self, text: &str) -> Result<(), ClipboardError> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(osc52_sequence(text).as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

/// OSC 52 "set clipboard selection" escape for `text`.
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", BASE64.encode(text.as_bytes()))
}

fn run_with_stdin(cmd: &str, args: &[&str], input: &str) -> Result<(), ClipboardError> {
    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|_| ClipboardError::NotAvailable(format!("clipboard command `{cmd}`")))?;

    if write_and_reap(&mut child, input)?.success() {
        Ok(())
    } else {
        Err(ClipboardError::CommandFailed(cmd.to_string()))
    }
}

/// Feed `input` to the child's stdin, close it, and wait for exit. The child
/// is waited on even when the write fails.
fn write_and_reap(child: &mut Child, input: &str) -> io::Result<ExitStatus> {
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(input.as_bytes()),
        None => Ok(()),
    };
    let status = child.wait();
    written?;
    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records every tier attempt; the first `failures` tiers fail.
    struct RecordingSink {
        failures: usize,
        attempts: RefCell<Vec<(&'static str, String)>>,
        rich_alternative: RefCell<Option<String>>,
    }

    impl RecordingSink {
        fn failing_first(failures: usize) -> Self {
            Self {
                failures,
                attempts: RefCell::new(Vec::new()),
                rich_alternative: RefCell::new(None),
            }
        }

        fn attempt(&self, tier: &'static str, payload: &str) -> Result<(), ClipboardError> {
            let mut attempts = self.attempts.borrow_mut();
            attempts.push((tier, payload.to_string()));
            if attempts.len() <= self.failures {
                Err(ClipboardError::CommandFailed(tier.to_string()))
            } else {
                Ok(())
            }
        }

        fn tiers(&self) -> Vec<&'static str> {
            self.attempts.borrow().iter().map(|(t, _)| *t).collect()
        }
    }

    impl ClipboardSink for RecordingSink {
        fn write_rich(&self, html: &str, plain: &str) -> Result<(), ClipboardError> {
            *self.rich_alternative.borrow_mut() = Some(plain.to_string());
            self.attempt("rich", html)
        }
        fn write_plain(&self, text: &str) -> Result<(), ClipboardError> {
            self.attempt("plain", text)
        }
        fn write_selection(&self, text: &str) -> Result<(), ClipboardError> {
            self.attempt("selection", text)
        }
    }

    #[test]
    fn rich_success_stops_the_chain() {
        let sink = RecordingSink::failing_first(0);
        assert_eq!(copy_with_fallback(&sink, "**hi**").unwrap(), CopyTier::Rich);
        assert_eq!(sink.tiers(), vec!["rich"]);
        let html = &sink.attempts.borrow()[0].1;
        assert!(html.contains("<strong>hi</strong>"));
    }

    #[test]
    fn rich_write_carries_the_markdown_as_plain_alternative() {
        let sink = RecordingSink::failing_first(0);
        copy_with_fallback(&sink, "# Title\n\n- item").unwrap();
        assert_eq!(
            sink.rich_alternative.borrow().as_deref(),
            Some("# Title\n\n- item")
        );
        assert!(sink.attempts.borrow()[0].1.contains("<h1>Title</h1>"));
    }

    #[test]
    fn plain_text_is_tried_only_after_rich_fails() {
        let sink = RecordingSink::failing_first(1);
        assert_eq!(copy_with_fallback(&sink, "**hi**").unwrap(), CopyTier::PlainText);
        assert_eq!(sink.tiers(), vec!["rich", "plain"]);
        assert_eq!(sink.attempts.borrow()[1].1, "**hi**");
    }

    #[test]
    fn terminal_selection_is_the_last_resort() {
        let sink = RecordingSink::failing_first(2);
        assert_eq!(
            copy_with_fallback(&sink, "text").unwrap(),
            CopyTier::TerminalSelection
        );
        assert_eq!(sink.tiers(), vec!["rich", "plain", "selection"]);
    }

    #[test]
    fn total_failure_returns_last_error() {
        let sink = RecordingSink::failing_first(3);
        let err = copy_with_fallback(&sink, "text").unwrap_err();
        assert_eq!(err.to_string(), "clipboard command `selection` failed");
    }

    #[cfg(unix)]
    #[test]
    fn child_is_reaped_when_stdin_write_fails() {
        // `true` exits without reading, so a large write hits a closed pipe.
        let mut child = Command::new("true")
            .stdin(Stdio::piped())
            .spawn()
            .unwrap();
        let input = "x".repeat(4 * 1024 * 1024);

        assert!(write_and_reap(&mut child, &input).is_err());
        assert!(child.try_wait().unwrap().is_some());
    }

    #[test]
    fn missing_command_is_not_available() {
        let err = run_with_stdin("flashchat-no-such-clipboard-tool", &[], "x").unwrap_err();
        assert!(matches!(err, ClipboardError::NotAvailable(_)));
    }

    #[test]
    fn osc52_wraps_base64_payload() {
        assert_eq!(osc52_sequence("hi"), "\x1b]52;c;aGk=\x07");
    }
}
