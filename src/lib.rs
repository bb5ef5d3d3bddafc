pub use sh_adb as adb;
pub use sh_receiver as receiver;

// Re-export specific items users might need frequently
pub use adb::{AdbConfig, AdbError, AdbResult, Device, RemoteCommandError};
pub use receiver::{
    CancellationFlag, ChannelReceiver, CollectingReceiver, ConsoleOutputReceiver, LineHandler,
    LineReceiver, NullOutputReceiver, OutputReceiver,
};
