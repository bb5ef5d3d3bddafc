use crate::{OutputReceiver, ReceiverResult};

static INSTANCE: NullOutputReceiver = NullOutputReceiver { _private: () };

/// A receiver that discards everything.
///
/// For commands whose output nobody cares about. There is exactly one instance per process,
/// obtained through [`NullOutputReceiver::instance`]. It holds no state, so it can be shared
/// by any number of concurrent commands.
///
/// It is never cancelled and never parses errors, so the client's own error detection
/// still applies to commands run through it.
#[derive(Debug)]
pub struct NullOutputReceiver {
    _private: (),
}

impl NullOutputReceiver {
    /// The shared instance. Every call returns the same reference.
    pub fn instance() -> &'static NullOutputReceiver {
        &INSTANCE
    }
}

/// Shorthand for [`NullOutputReceiver::instance`]
pub fn null_receiver() -> &'static NullOutputReceiver {
    NullOutputReceiver::instance()
}

impl OutputReceiver for &NullOutputReceiver {
    #[inline(always)]
    fn add_output(&mut self, _data: &[u8]) -> ReceiverResult<()> {
        Ok(())
    }

    #[inline(always)]
    fn flush(&mut self) -> ReceiverResult<()> {
        Ok(())
    }

    fn is_cancelled(&self) -> bool {
        false
    }

    fn parses_errors(&self) -> bool {
        false
    }
}
