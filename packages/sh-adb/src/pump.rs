//! Feeding a command's output stream into an [`OutputReceiver`]
use std::{
    io::{ErrorKind, Read},
    time::{Duration, Instant},
};

use sh_receiver::OutputReceiver;
use tracing::{debug, trace, warn};

use crate::{
    config::{AdbConfig, DEFAULT_CHUNK_SIZE},
    detect::ErrorScanner,
    error::{AdbError, AdbResult},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PumpOptions {
    /// Largest chunk handed to the receiver at once
    pub chunk_size: usize,
    /// Fail if no output arrives for this long
    pub max_time_to_output_response: Option<Duration>,
}

impl Default for PumpOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_time_to_output_response: None,
        }
    }
}

impl From<&AdbConfig> for PumpOptions {
    fn from(config: &AdbConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            max_time_to_output_response: config.max_time_to_output_response(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpStatus {
    /// The command's output ended
    Completed,
    /// The receiver asked to stop before the output ended
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpOutcome {
    pub status: PumpStatus,
    pub bytes_read: usize,
}

impl PumpOutcome {
    pub fn is_cancelled(&self) -> bool {
        self.status == PumpStatus::Cancelled
    }
}

/// Read `source` to its end and push everything into `receiver`, in order.
///
/// The receiver's cancellation flag is checked before the first read and after every chunk.
/// If the receiver does not parse errors, the output is also scanned for known error
/// messages and the first one found fails the command with [`AdbError::Remote`].
/// A cancelled command is not checked for an error on its last, unterminated line.
///
/// [`OutputReceiver::flush`] is called exactly once, whatever the outcome.
pub fn pump_output<R, O>(
    source: &mut R,
    receiver: &mut O,
    options: &PumpOptions,
) -> AdbResult<PumpOutcome>
where
    R: Read + ?Sized,
    O: OutputReceiver + ?Sized,
{
    let mut scanner = (!receiver.parses_errors()).then(ErrorScanner::new);

    let res = read_into(source, receiver, &mut scanner, options);
    let flushed = receiver.flush();
    trace!("receiver flushed");

    let outcome = res?;
    flushed?;
    Ok(outcome)
}

fn read_into<R, O>(
    source: &mut R,
    receiver: &mut O,
    scanner: &mut Option<ErrorScanner>,
    options: &PumpOptions,
) -> AdbResult<PumpOutcome>
where
    R: Read + ?Sized,
    O: OutputReceiver + ?Sized,
{
    let mut buf = vec![0; options.chunk_size.max(1)];
    let mut bytes_read = 0;
    let mut last_output = Instant::now();

    loop {
        if receiver.is_cancelled() {
            debug!("receiver cancelled after {bytes_read} bytes");
            return Ok(PumpOutcome {
                status: PumpStatus::Cancelled,
                bytes_read,
            });
        }

        let n = match source.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                if let Some(max) = options.max_time_to_output_response {
                    // a cancel that arrived while waiting wins over the timeout
                    if last_output.elapsed() >= max && !receiver.is_cancelled() {
                        warn!("no output for {max:?}, giving up");
                        return Err(AdbError::ShellCommandUnresponsive(max));
                    }
                }
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        last_output = Instant::now();
        bytes_read += n;

        let chunk = &buf[..n];
        receiver.add_output(chunk)?;
        if let Some(scanner) = scanner.as_mut() {
            if let Some(err) = scanner.feed(chunk) {
                warn!("remote command reported an error: {err}");
                return Err(err.into());
            }
        }
    }

    if let Some(scanner) = scanner.as_mut() {
        if let Some(err) = scanner.finish() {
            warn!("remote command reported an error: {err}");
            return Err(err.into());
        }
    }

    debug!("output complete, {bytes_read} bytes");
    Ok(PumpOutcome {
        status: PumpStatus::Completed,
        bytes_read,
    })
}
