use async_channel::{Receiver, Sender};
use bytes::Bytes;
use tracing::debug;

use crate::{CancellationFlag, OutputReceiver, ReceiverError, ReceiverResult};

/// Forwards every output chunk over an [`async_channel`].
///
/// The channel is closed on flush. Dropping every [`Receiver`] cancels the command.
///
/// With a bounded channel, [`OutputReceiver::add_output`] blocks the producer while the
/// channel is full.
pub struct ChannelReceiver {
    tx: Sender<Bytes>,
    cancelled: CancellationFlag,
}

impl ChannelReceiver {
    pub fn new(tx: Sender<Bytes>) -> Self {
        Self {
            tx,
            cancelled: CancellationFlag::new(),
        }
    }

    pub fn unbounded() -> (Self, Receiver<Bytes>) {
        let (tx, rx) = async_channel::unbounded();
        (Self::new(tx), rx)
    }

    pub fn bounded(cap: usize) -> (Self, Receiver<Bytes>) {
        let (tx, rx) = async_channel::bounded(cap);
        (Self::new(tx), rx)
    }

    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancelled.clone()
    }

    pub fn cancel(&self) {
        self.cancelled.cancel();
    }
}

impl OutputReceiver for ChannelReceiver {
    fn add_output(&mut self, data: &[u8]) -> ReceiverResult<()> {
        if data.is_empty() {
            return Ok(());
        }
        match self.tx.send_blocking(Bytes::copy_from_slice(data)) {
            Ok(()) => Ok(()),
            // Nobody listens anymore; `is_cancelled` reports it to the producer.
            Err(_) if self.tx.receiver_count() == 0 => Ok(()),
            Err(_) => Err(ReceiverError::ChannelClosed),
        }
    }

    fn flush(&mut self) -> ReceiverResult<()> {
        if self.tx.close() {
            debug!("output channel closed");
        }
        Ok(())
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.is_cancelled() || self.tx.receiver_count() == 0
    }
}

#[cfg(test)]
mod test {
    use std::thread;

    use super::*;

    #[test]
    fn test_forward_and_close() {
        let (mut receiver, rx) = ChannelReceiver::unbounded();
        receiver.add_output(b"hello ").unwrap();
        receiver.add_output(b"").unwrap();
        receiver.add_output(b"world").unwrap();
        receiver.flush().unwrap();

        let mut chunks = Vec::new();
        while let Ok(chunk) = rx.recv_blocking() {
            chunks.push(chunk);
        }
        assert_eq!(
            chunks,
            vec![Bytes::from_static(b"hello "), Bytes::from_static(b"world")]
        );
    }

    #[test]
    fn test_cancelled_when_consumer_drops() {
        let (mut receiver, rx) = ChannelReceiver::unbounded();
        assert!(!receiver.is_cancelled());
        drop(rx);
        assert!(receiver.is_cancelled());
        receiver.add_output(b"dropped").unwrap();
        receiver.flush().unwrap();
    }

    #[test]
    fn test_send_after_flush_fails() {
        let (mut receiver, _rx) = ChannelReceiver::unbounded();
        receiver.flush().unwrap();
        assert_eq!(receiver.add_output(b"late"), Err(ReceiverError::ChannelClosed));
    }

    #[test]
    fn test_consumer_on_another_thread() {
        let (mut receiver, rx) = ChannelReceiver::bounded(1);
        let consumer = thread::spawn(move || {
            let mut total = 0;
            while let Ok(chunk) = rx.recv_blocking() {
                total += chunk.len();
            }
            total
        });
        for _ in 0..64 {
            receiver.add_output(&[7; 100]).unwrap();
        }
        receiver.flush().unwrap();
        assert_eq!(consumer.join().unwrap(), 6400);
    }

    #[test]
    fn test_explicit_cancel() {
        let (receiver, _rx) = ChannelReceiver::unbounded();
        receiver.cancellation_flag().cancel();
        assert!(receiver.is_cancelled());
        let (receiver, _rx) = ChannelReceiver::unbounded();
        receiver.cancel();
        assert!(receiver.is_cancelled());
    }
}
