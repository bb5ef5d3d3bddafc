//! Requests served by the adb server itself
use crate::{AdbTcpStream, error::AdbResult};

use super::AdbCommand;

/// host:transport:serial
///
/// Switch the connection to the device with the given serial,
/// every request after it is forwarded to that device.
pub struct Transport {
    serial: String,
}

impl Transport {
    pub fn new(serial: String) -> Self {
        Self { serial }
    }
}

impl AdbCommand for Transport {
    type Output = ();

    fn raw_command(&self) -> String {
        format!("host:transport:{}", self.serial)
    }

    fn handle_response(&self, stream: &mut AdbTcpStream) -> AdbResult<Self::Output> {
        stream.check_response_status()
    }
}
