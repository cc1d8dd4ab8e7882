use crate::errors::AppError;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::io::Write;
use tracing::warn;

pub trait Clipboard: Send {
    fn set_text(&mut self, text: &str) -> Result<(), AppError>;
}

/// Desktop clipboard via `arboard`.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), AppError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|err| AppError::clipboard(err.to_string()))?;
        clipboard
            .set_text(text.to_owned())
            .map_err(|err| AppError::clipboard(err.to_string()))
    }
}

/// Asks the terminal to set the clipboard with an OSC 52 escape sequence.
/// Works over SSH where no desktop clipboard is reachable.
pub struct Osc52Clipboard<W> {
    out: W,
}

impl<W: Write + Send> Osc52Clipboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl Osc52Clipboard<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}

impl<W: Write + Send> Clipboard for Osc52Clipboard<W> {
    fn set_text(&mut self, text: &str) -> Result<(), AppError> {
        self.out
            .write_all(osc52_sequence(text).as_bytes())
            .and_then(|_| self.out.flush())
            .map_err(|err| AppError::clipboard(err.to_string()))
    }
}

/// Primary clipboard with a fallback tried when the primary fails.
pub struct ClipboardChain {
    primary: Box<dyn Clipboard>,
    fallback: Option<Box<dyn Clipboard>>,
}

impl ClipboardChain {
    pub fn new(primary: impl Clipboard + 'static) -> Self {
        Self {
            primary: Box::new(primary),
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: impl Clipboard + 'static) -> Self {
        self.fallback = Some(Box::new(fallback));
        self
    }

    /// System clipboard first, terminal escape sequence second.
    pub fn system() -> Self {
        Self::new(SystemClipboard).with_fallback(Osc52Clipboard::stdout())
    }
}

impl Clipboard for ClipboardChain {
    fn set_text(&mut self, text: &str) -> Result<(), AppError> {
        let err = match self.primary.set_text(text) {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };
        warn!("clipboard copy failed, trying fallback: {err}");
        match self.fallback.as_mut() {
            Some(fallback) => fallback.set_text(text),
            None => Err(err),
        }
    }
}
