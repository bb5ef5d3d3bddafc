//! Shell output receivers
//!
//! A receiver consumes the raw bytes a remote shell command produces, chunk by chunk,
//! as the transport reads them off the wire. The transport polls
//! [`OutputReceiver::is_cancelled`] between chunks to stop a long-running command early,
//! and the owning client checks [`OutputReceiver::parses_errors`] to decide whether it
//! should scan the output for error messages itself.
//!
//! The call sequence for one command is always:
//! zero or more [`OutputReceiver::add_output`], then exactly one [`OutputReceiver::flush`].
pub mod cancel;
pub mod channel;
pub mod collect;
pub mod console;
pub mod error;
pub mod line;
pub mod null;

pub use cancel::CancellationFlag;
pub use channel::ChannelReceiver;
pub use collect::CollectingReceiver;
pub use console::ConsoleOutputReceiver;
pub use error::{ReceiverError, ReceiverResult};
pub use line::{LineHandler, LineReceiver};
pub use null::{NullOutputReceiver, null_receiver};

/// Consumer side of a shell command's output stream
pub trait OutputReceiver {
    /// Append a chunk of output, in the order it was produced.
    fn add_output(&mut self, data: &[u8]) -> ReceiverResult<()>;

    /// Append `data[offset..offset + length]`.
    ///
    /// Returns [`ReceiverError::InvalidRange`] if the range does not fit in `data`.
    fn add_output_range(
        &mut self,
        data: &[u8],
        offset: usize,
        length: usize,
    ) -> ReceiverResult<()> {
        let chunk = offset
            .checked_add(length)
            .and_then(|end| data.get(offset..end))
            .ok_or(ReceiverError::InvalidRange {
                offset,
                length,
                len: data.len(),
            })?;
        self.add_output(chunk)
    }

    /// Signal end of stream. The producer calls this exactly once, after the last chunk.
    fn flush(&mut self) -> ReceiverResult<()>;

    /// Whether the producer should stop feeding output and tear the command down.
    fn is_cancelled(&self) -> bool;

    /// Whether this receiver detects error messages in the output itself.
    ///
    /// If `false`, the client scans the raw output for known error messages
    /// and fails the command on its own.
    fn parses_errors(&self) -> bool {
        false
    }
}

impl<R: OutputReceiver + ?Sized> OutputReceiver for &mut R {
    fn add_output(&mut self, data: &[u8]) -> ReceiverResult<()> {
        (**self).add_output(data)
    }

    fn flush(&mut self) -> ReceiverResult<()> {
        (**self).flush()
    }

    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }

    fn parses_errors(&self) -> bool {
        (**self).parses_errors()
    }
}

impl<R: OutputReceiver + ?Sized> OutputReceiver for Box<R> {
    fn add_output(&mut self, data: &[u8]) -> ReceiverResult<()> {
        (**self).add_output(data)
    }

    fn flush(&mut self) -> ReceiverResult<()> {
        (**self).flush()
    }

    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }

    fn parses_errors(&self) -> bool {
        (**self).parses_errors()
    }
}
