//! ADB (Android Debug Bridge) shell client
//!
//! Runs shell commands on a device through the local adb server and streams their output
//! into an [`OutputReceiver`]
use std::{
    io::{ErrorKind, Read, Write},
    net::{Shutdown, SocketAddrV4, TcpStream},
};

use sh_receiver::{ConsoleOutputReceiver, NullOutputReceiver, OutputReceiver};
use tracing::{debug, error, trace};

use utils::{ResponseStatus, read_payload_to_string, read_response_status};

use self::{
    command::{AdbCommand, host_service, local_service},
    pump::{PumpOptions, PumpOutcome, pump_output},
    utils::write_request,
};

pub mod command;
pub mod config;
pub mod detect;
pub mod error;
pub mod pump;
pub mod utils;

// Re-export commonly used types
pub use config::AdbConfig;
pub use detect::RemoteCommandError;
pub use error::{AdbError, AdbResult};
pub use pump::PumpStatus;

pub struct AdbTcpStream {
    inner: TcpStream,
}

impl AdbTcpStream {
    pub fn connect(socket_addr: SocketAddrV4, config: &AdbConfig) -> AdbResult<Self> {
        trace!("connecting to {:?}...", socket_addr);
        let stream = TcpStream::connect(socket_addr)?;
        stream.set_read_timeout(Some(config.read_timeout()))?;
        stream.set_write_timeout(config.write_timeout())?;
        let res = Self { inner: stream };
        trace!("connected");
        Ok(res)
    }

    pub fn connect_host(config: &AdbConfig) -> AdbResult<Self> {
        Self::connect(config.socket_addr(), config)
    }

    pub fn connect_device<S: AsRef<str>>(serial: S, config: &AdbConfig) -> AdbResult<Self> {
        let serial = serial.as_ref();
        let mut stream = Self::connect_host(config)?;
        stream.execute_command(host_service::Transport::new(serial.to_string()))?;
        Ok(stream)
    }

    pub fn execute_command<T>(&mut self, command: impl AdbCommand<Output = T>) -> AdbResult<T> {
        let raw_command = command.raw_command();
        trace!("executing command: {:?}...", raw_command);
        write_request(self, &raw_command)?;

        command.handle_response(self)
    }

    pub fn check_response_status(&mut self) -> AdbResult<()> {
        trace!("checking response_status...");
        let status = read_response_status(self)?;
        if let ResponseStatus::Fail = status {
            let reason = read_payload_to_string(self)?;
            error!("response status is FAIL, reason: {}", reason);
            return Err(AdbError::ResponseError(reason));
        }
        trace!("response status is OKAY");
        Ok(())
    }

    /// Close both directions of the connection, which ends the remote command
    pub fn shutdown(&self) -> AdbResult<()> {
        match self.inner.shutdown(Shutdown::Both) {
            Err(err) if err.kind() != ErrorKind::NotConnected => Err(err.into()),
            _ => Ok(()),
        }
    }
}

/// Check that the device with `serial` is reachable through the adb server
///
/// Returns [`AdbError::ResponseError`] if the server does not know the device
pub fn connect<S: AsRef<str>>(serial: S, config: AdbConfig) -> AdbResult<Device> {
    let serial = serial.as_ref();
    let stream = AdbTcpStream::connect_device(serial, &config)?;
    drop(stream);
    Ok(Device::with_config(serial, config))
}

/// A device that can be used to execute ADB commands
#[derive(Debug, Clone)]
pub struct Device {
    /// ADB device serial number
    serial: String,

    config: AdbConfig,
}

impl Device {
    pub fn new<S: Into<String>>(serial: S) -> Self {
        Self::with_config(serial, AdbConfig::default())
    }

    pub fn with_config<S: Into<String>>(serial: S, config: AdbConfig) -> Self {
        Self {
            serial: serial.into(),
            config,
        }
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn config(&self) -> &AdbConfig {
        &self.config
    }

    pub fn connect_adb_tcp_stream(&self) -> AdbResult<AdbTcpStream> {
        AdbTcpStream::connect_device(&self.serial, &self.config)
    }

    /// Run `command` in a shell on the device and stream its output into `receiver`.
    ///
    /// The receiver is flushed once the output ends, the receiver cancels, or reading fails.
    /// A cancelled command has its connection closed right away.
    /// If the device rejects the shell request the receiver is never used.
    pub fn execute_remote_command<O: OutputReceiver + ?Sized>(
        &self,
        command: &str,
        receiver: &mut O,
    ) -> AdbResult<PumpOutcome> {
        debug!("[{}]: executing `{}`", self.serial, command);
        let mut stream = self.connect_adb_tcp_stream()?;
        stream.execute_command(local_service::Shell::new(command.to_string()))?;

        let outcome = pump_output(&mut stream, receiver, &PumpOptions::from(&self.config))?;
        if outcome.is_cancelled() {
            debug!("[{}]: `{}` cancelled, closing connection", self.serial, command);
            stream.shutdown()?;
        }
        Ok(outcome)
    }

    /// Run `command` and throw its output away
    pub fn execute_remote_command_discarding(&self, command: &str) -> AdbResult<PumpOutcome> {
        let mut receiver = NullOutputReceiver::instance();
        self.execute_remote_command(command, &mut receiver)
    }

    /// Run `command` and return its output lines joined with `\n`
    pub fn shell(&self, command: &str) -> AdbResult<String> {
        let mut receiver = ConsoleOutputReceiver::new();
        self.execute_remote_command(command, &mut receiver)?;
        Ok(receiver.output())
    }
}

impl Read for AdbTcpStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for AdbTcpStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
