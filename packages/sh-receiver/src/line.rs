//! Line-oriented receivers
//!
//! [`LineReceiver`] turns the raw byte stream into lines and hands them to a [`LineHandler`]
//! in batches, one batch per received chunk. A line split across two chunks is kept until
//! its terminator arrives, and a trailing line without terminator is delivered on flush.
use bytes::BytesMut;
use tracing::trace;

use crate::{CancellationFlag, OutputReceiver, ReceiverResult};

/// Something that consumes complete lines of output
pub trait LineHandler {
    /// Called with every complete line decoded from one chunk of output.
    fn process_lines(&mut self, lines: &[String]) -> ReceiverResult<()>;

    /// Called once, after the last line has been processed.
    fn done(&mut self) -> ReceiverResult<()> {
        Ok(())
    }

    fn parses_errors(&self) -> bool {
        false
    }
}

impl<F> LineHandler for F
where
    F: FnMut(&[String]) -> ReceiverResult<()>,
{
    fn process_lines(&mut self, lines: &[String]) -> ReceiverResult<()> {
        self(lines)
    }
}

/// Splits output into lines (`\n` or `\r\n`) and feeds them to a [`LineHandler`].
///
/// Invalid UTF-8 is replaced with `U+FFFD`.
pub struct LineReceiver<H> {
    handler: H,
    pending: BytesMut,
    trim_lines: bool,
    skip_empty_lines: bool,
    cancelled: CancellationFlag,
    flushed: bool,
}

impl<H: LineHandler> LineReceiver<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            pending: BytesMut::new(),
            trim_lines: false,
            skip_empty_lines: false,
            cancelled: CancellationFlag::new(),
            flushed: false,
        }
    }

    /// Strip leading and trailing whitespace from every line
    pub fn trim_lines(mut self, trim_lines: bool) -> Self {
        self.trim_lines = trim_lines;
        self
    }

    /// Do not pass empty lines (after trimming, if enabled) to the handler
    pub fn skip_empty_lines(mut self, skip_empty_lines: bool) -> Self {
        self.skip_empty_lines = skip_empty_lines;
        self
    }

    /// Use an existing flag, e.g. one shared with a timeout timer
    pub fn with_cancellation_flag(mut self, flag: CancellationFlag) -> Self {
        self.cancelled = flag;
        self
    }

    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancelled.clone()
    }

    pub fn cancel(&self) {
        self.cancelled.cancel();
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    fn decode(&self, raw: &[u8]) -> Option<String> {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let line = String::from_utf8_lossy(raw);
        let line = if self.trim_lines {
            line.trim()
        } else {
            &*line
        };
        if self.skip_empty_lines && line.is_empty() {
            None
        } else {
            Some(line.to_string())
        }
    }
}

impl<H: LineHandler> OutputReceiver for LineReceiver<H> {
    fn add_output(&mut self, data: &[u8]) -> ReceiverResult<()> {
        // Only the newly appended bytes can contain the next terminator.
        let mut scan_from = self.pending.len();
        self.pending.extend_from_slice(data);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending[scan_from..].iter().position(|&b| b == b'\n') {
            let raw = self.pending.split_to(scan_from + pos + 1);
            scan_from = 0;
            if let Some(line) = self.decode(&raw[..raw.len() - 1]) {
                lines.push(line);
            }
        }

        if lines.is_empty() {
            return Ok(());
        }
        trace!("decoded {} lines, {} bytes pending", lines.len(), self.pending.len());
        self.handler.process_lines(&lines)
    }

    fn flush(&mut self) -> ReceiverResult<()> {
        if self.flushed {
            return Ok(());
        }
        self.flushed = true;

        if !self.pending.is_empty() {
            let raw = self.pending.split();
            if let Some(line) = self.decode(&raw) {
                self.handler.process_lines(&[line])?;
            }
        }
        self.handler.done()
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.is_cancelled()
    }

    fn parses_errors(&self) -> bool {
        self.handler.parses_errors()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ReceiverError;

    #[derive(Default)]
    struct Batches {
        batches: Vec<Vec<String>>,
        done: usize,
    }

    impl LineHandler for Batches {
        fn process_lines(&mut self, lines: &[String]) -> ReceiverResult<()> {
            self.batches.push(lines.to_vec());
            Ok(())
        }

        fn done(&mut self) -> ReceiverResult<()> {
            self.done += 1;
            Ok(())
        }
    }

    #[test]
    fn test_batches_per_chunk() {
        let mut receiver = LineReceiver::new(Batches::default());
        receiver.add_output(b"one\ntwo\r\nthr").unwrap();
        receiver.add_output(b"ee\n").unwrap();
        receiver.add_output(b"four").unwrap();
        receiver.flush().unwrap();

        let handler = receiver.into_handler();
        assert_eq!(
            handler.batches,
            vec![
                vec!["one".to_string(), "two".to_string()],
                vec!["three".to_string()],
                vec!["four".to_string()],
            ]
        );
        assert_eq!(handler.done, 1);
    }

    #[test]
    fn test_crlf_split_across_chunks() {
        let mut receiver = LineReceiver::new(Batches::default());
        receiver.add_output(b"abc\r").unwrap();
        receiver.add_output(b"\ndef").unwrap();
        receiver.flush().unwrap();
        assert_eq!(
            receiver.handler().batches,
            vec![vec!["abc".to_string()], vec!["def".to_string()]]
        );
    }

    #[test]
    fn test_trim_and_skip_empty() {
        let mut receiver = LineReceiver::new(Batches::default())
            .trim_lines(true)
            .skip_empty_lines(true);
        receiver.add_output(b"  a  \n\n   \n\tb\n").unwrap();
        receiver.flush().unwrap();
        assert_eq!(
            receiver.handler().batches,
            vec![vec!["a".to_string(), "b".to_string()]]
        );
    }

    #[test]
    fn test_empty_lines_kept_by_default() {
        let mut receiver = LineReceiver::new(Batches::default());
        receiver.add_output(b"a\n\nb\n").unwrap();
        receiver.flush().unwrap();
        assert_eq!(
            receiver.handler().batches,
            vec![vec!["a".to_string(), String::new(), "b".to_string()]]
        );
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut receiver = LineReceiver::new(Batches::default());
        receiver.add_output(b"ok \xff\n").unwrap();
        receiver.flush().unwrap();
        assert_eq!(receiver.handler().batches, vec![vec!["ok \u{FFFD}".to_string()]]);
    }

    #[test]
    fn test_flush_is_idempotent() {
        let mut receiver = LineReceiver::new(Batches::default());
        receiver.add_output(b"tail").unwrap();
        receiver.flush().unwrap();
        receiver.flush().unwrap();
        assert_eq!(receiver.handler().batches, vec![vec!["tail".to_string()]]);
        assert_eq!(receiver.handler().done, 1);
    }

    #[test]
    fn test_flush_without_output() {
        let mut receiver = LineReceiver::new(Batches::default());
        receiver.flush().unwrap();
        assert!(receiver.handler().batches.is_empty());
        assert_eq!(receiver.handler().done, 1);
    }

    #[test]
    fn test_cancel() {
        let receiver = LineReceiver::new(Batches::default());
        let flag = receiver.cancellation_flag();
        assert!(!receiver.is_cancelled());
        flag.cancel();
        assert!(receiver.is_cancelled());

        let shared = CancellationFlag::new();
        let receiver = LineReceiver::new(Batches::default()).with_cancellation_flag(shared.clone());
        receiver.cancel();
        assert!(shared.is_cancelled());
    }

    #[test]
    fn test_closure_handler_error() {
        let mut seen = Vec::new();
        let mut receiver = LineReceiver::new(|lines: &[String]| {
            if lines.iter().any(|line| line == "bad") {
                return Err(ReceiverError::Handler("bad line".to_string()));
            }
            seen.extend_from_slice(lines);
            Ok(())
        });
        receiver.add_output(b"good\n").unwrap();
        assert_eq!(
            receiver.add_output(b"bad\n"),
            Err(ReceiverError::Handler("bad line".to_string()))
        );
        assert!(!receiver.parses_errors());
        drop(receiver);
        assert_eq!(seen, vec!["good".to_string()]);
    }
}
