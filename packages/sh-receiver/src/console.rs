use tracing::trace;

use crate::{CancellationFlag, LineHandler, LineReceiver, OutputReceiver, ReceiverResult};

/// Keeps every line it is handed
#[derive(Debug, Default)]
pub struct ConsoleLines {
    lines: Vec<String>,
}

impl LineHandler for ConsoleLines {
    fn process_lines(&mut self, lines: &[String]) -> ReceiverResult<()> {
        for line in lines {
            trace!("{line}");
        }
        self.lines.extend_from_slice(lines);
        Ok(())
    }
}

/// Collects a command's output as text, one entry per line
pub struct ConsoleOutputReceiver {
    inner: LineReceiver<ConsoleLines>,
}

impl Default for ConsoleOutputReceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleOutputReceiver {
    pub fn new() -> Self {
        Self {
            inner: LineReceiver::new(ConsoleLines::default()),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.inner.handler().lines
    }

    /// All lines received so far, joined with `\n`
    pub fn output(&self) -> String {
        self.lines().join("\n")
    }

    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.inner.cancellation_flag()
    }

    pub fn cancel(&self) {
        self.inner.cancel();
    }
}

impl OutputReceiver for ConsoleOutputReceiver {
    fn add_output(&mut self, data: &[u8]) -> ReceiverResult<()> {
        self.inner.add_output(data)
    }

    fn flush(&mut self) -> ReceiverResult<()> {
        self.inner.flush()
    }

    fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    fn parses_errors(&self) -> bool {
        self.inner.parses_errors()
    }
}
