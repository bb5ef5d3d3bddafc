//! Generic error-message detection over raw shell output
//!
//! Used by the client when the receiver does not parse errors itself
//! (see [`sh_receiver::OutputReceiver::parses_errors`]).
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// A failure the remote command reported through its output
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteCommandError {
    #[error("file not found: '{0}'")]
    FileNotFound(String),

    #[error("unknown option: '{0}'")]
    UnknownOption(String),

    #[error("command aborting: '{0}'")]
    CommandAborting(String),

    #[error("permission denied: '{0}'")]
    PermissionDenied(String),
}

impl RemoteCommandError {
    /// The output line the error was detected in
    pub fn line(&self) -> &str {
        match self {
            Self::FileNotFound(line)
            | Self::UnknownOption(line)
            | Self::CommandAborting(line)
            | Self::PermissionDenied(line) => line,
        }
    }
}

static ABORTING: LazyLock<Regex> = LazyLock::new(|| Regex::new("Aborting.$").unwrap());
static APPLET_NOT_FOUND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("applet not found$").unwrap());
static PERMISSION_DENIED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("(?i)(permission|access) denied$").unwrap());

/// Check a single line of output for a known error message
pub fn detect_error(line: &str) -> Option<RemoteCommandError> {
    let line_owned = || line.to_string();

    if line.ends_with(": not found") || line.ends_with("No such file or directory") {
        Some(RemoteCommandError::FileNotFound(line_owned()))
    } else if line.contains("Unknown option") {
        Some(RemoteCommandError::UnknownOption(line_owned()))
    } else if ABORTING.is_match(line) {
        Some(RemoteCommandError::CommandAborting(line_owned()))
    } else if APPLET_NOT_FOUND.is_match(line) {
        Some(RemoteCommandError::FileNotFound(line_owned()))
    } else if PERMISSION_DENIED.is_match(line) {
        Some(RemoteCommandError::PermissionDenied(line_owned()))
    } else {
        None
    }
}

/// Longest tail of an unterminated line the scanner keeps
const MAX_CARRY: usize = 512;

/// Incremental [`detect_error`] over chunked output
///
/// Only the last [`MAX_CARRY`] bytes of a line are kept while it is incomplete, so a line
/// that is too long is reported by its tail. Every marker but `Unknown option` sits at the
/// end of a line, and that one is looked for before anything is dropped.
#[derive(Debug, Default)]
pub struct ErrorScanner {
    carry: Vec<u8>,
}

impl ErrorScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan the complete lines in `data`. Returns the first error found in them.
    pub fn feed(&mut self, data: &[u8]) -> Option<RemoteCommandError> {
        let mut rest = data;
        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            self.carry.extend_from_slice(&rest[..pos]);
            rest = &rest[pos + 1..];
            if let Some(err) = self.scan_line() {
                return Some(err);
            }
        }

        self.carry.extend_from_slice(rest);
        if self.carry.len() > MAX_CARRY {
            let partial = String::from_utf8_lossy(&self.carry);
            if partial.contains("Unknown option") {
                let err = RemoteCommandError::UnknownOption(partial.into_owned());
                self.carry.clear();
                return Some(err);
            }
            let excess = self.carry.len() - MAX_CARRY;
            self.carry.drain(..excess);
        }
        None
    }

    /// Scan the last, unterminated line
    pub fn finish(&mut self) -> Option<RemoteCommandError> {
        if self.carry.is_empty() {
            return None;
        }
        self.scan_line()
    }

    fn scan_line(&mut self) -> Option<RemoteCommandError> {
        let line = self.carry.strip_suffix(b"\r").unwrap_or(&self.carry);
        let found = detect_error(&String::from_utf8_lossy(line));
        self.carry.clear();
        found
    }
}
