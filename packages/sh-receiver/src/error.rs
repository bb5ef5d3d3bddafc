use thiserror::Error;

/// Errors an [`crate::OutputReceiver`] may report back to its producer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReceiverError {
    /// The producer asked for a byte range outside of the supplied buffer
    #[error("invalid output range: offset {offset} + length {length} exceeds buffer of {len} bytes")]
    InvalidRange {
        offset: usize,
        length: usize,
        len: usize,
    },

    /// A line handler failed to process the output
    #[error("Handler error: {0}")]
    Handler(String),

    /// The consuming end of a channel receiver is gone
    #[error("output channel closed")]
    ChannelClosed,
}

/// Receiver result type alias
pub type ReceiverResult<T> = Result<T, ReceiverError>;
