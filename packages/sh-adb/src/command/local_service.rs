//! Requests served by the device, sent after [`super::host_service::Transport`]
use crate::{AdbTcpStream, error::AdbResult};

use super::AdbCommand;

/// shell:command
///
/// command is something like "cmd arg1 arg2 ...".
///
/// Only opens the shell; the command's output is left on the stream
/// for [`crate::pump::pump_output`] to read.
pub struct Shell {
    command: String,
}

impl Shell {
    pub fn new(command: String) -> Self {
        Self { command }
    }
}

impl AdbCommand for Shell {
    type Output = ();

    fn raw_command(&self) -> String {
        format!("shell:{}", self.command)
    }

    fn handle_response(&self, stream: &mut AdbTcpStream) -> AdbResult<Self::Output> {
        stream.check_response_status()
    }
}
