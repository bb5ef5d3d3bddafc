use std::time::Duration;

use sh_receiver::ReceiverError;
use thiserror::Error;

use crate::detect::RemoteCommandError;

/// Unified ADB error type
#[derive(Error, Debug)]
pub enum AdbError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ADB response error
    #[error("ADB response error: {0}")]
    ResponseError(String),

    /// UTF-8 decode error
    #[error("UTF-8 decode error: {0}")]
    Utf8Error(#[from] std::str::Utf8Error),

    /// Hex parse error
    #[error("Hex parse error: {0}")]
    HexParseError(#[from] std::num::ParseIntError),

    /// Unknown response status
    #[error("Unknown response status: {0}")]
    UnknownResponseStatus(String),

    /// Protocol error
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// Invalid or unreadable configuration
    #[error("Config error: {0}")]
    Config(String),

    /// The output receiver rejected the output
    #[error("Receiver error: {0}")]
    Receiver(#[from] ReceiverError),

    /// The remote command reported a failure in its output
    #[error("Remote command failed: {0}")]
    Remote(#[from] RemoteCommandError),

    /// The remote command produced no output for too long
    #[error("Shell command produced no output for {0:?}")]
    ShellCommandUnresponsive(Duration),
}

/// ADB result type alias
pub type AdbResult<T> = Result<T, AdbError>;
