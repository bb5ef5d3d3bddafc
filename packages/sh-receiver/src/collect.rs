use bytes::{Bytes, BytesMut};
use tracing::debug;

use crate::{CancellationFlag, OutputReceiver, ReceiverResult};

/// Collects raw output bytes, optionally up to a limit.
///
/// Once the limit is reached the rest of the output is dropped and the receiver cancels
/// itself, so the producer can stop the command instead of reading output nobody keeps.
#[derive(Debug, Default)]
pub struct CollectingReceiver {
    buf: BytesMut,
    limit: Option<usize>,
    truncated: bool,
    cancelled: CancellationFlag,
}

impl CollectingReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Default::default()
        }
    }

    /// Use an existing flag, e.g. one shared with a timeout timer
    pub fn with_cancellation_flag(mut self, flag: CancellationFlag) -> Self {
        self.cancelled = flag;
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Whether output beyond the limit was dropped
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }

    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancelled.clone()
    }

    pub fn cancel(&self) {
        self.cancelled.cancel();
    }
}

impl OutputReceiver for CollectingReceiver {
    fn add_output(&mut self, data: &[u8]) -> ReceiverResult<()> {
        let take = match self.limit {
            Some(limit) => data.len().min(limit.saturating_sub(self.buf.len())),
            None => data.len(),
        };
        self.buf.extend_from_slice(&data[..take]);
        if take < data.len() {
            self.truncated = true;
        }

        if let Some(limit) = self.limit {
            if self.buf.len() >= limit && !self.cancelled.is_cancelled() {
                debug!("collected {} bytes, limit reached", self.buf.len());
                self.cancelled.cancel();
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> ReceiverResult<()> {
        Ok(())
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.is_cancelled()
    }
}
