use std::{
    net::{Ipv4Addr, SocketAddrV4},
    path::Path,
    time::Duration,
};

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::error::{AdbError, AdbResult};

pub const DEFAULT_ADB_PORT: u16 = 5037;
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 2000;

/// Connection and streaming settings, usually read from a `adb-shell.toml`
///
/// ```toml
/// host = "127.0.0.1"
/// port = 5037
/// read_timeout_ms = 2000
/// max_time_to_output_response_ms = 30000
/// ```
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdbConfig {
    /// Address of the adb server
    pub host: Ipv4Addr,
    pub port: u16,
    /// Socket read timeout, must be greater than `0`.
    ///
    /// This is also how often a running command checks whether it was cancelled,
    /// so reads are never left to block forever. A `0` set in code falls back to
    /// [`DEFAULT_READ_TIMEOUT_MS`].
    pub read_timeout_ms: u64,
    /// Socket write timeout, `0` disables it
    pub write_timeout_ms: u64,
    /// Size of the buffer output is read into, i.e. the largest chunk a receiver gets
    pub chunk_size: usize,
    /// Fail a command that produces no output for this long. Unset means wait forever.
    pub max_time_to_output_response_ms: Option<u64>,
}

impl Default for AdbConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::LOCALHOST,
            port: DEFAULT_ADB_PORT,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            write_timeout_ms: 2000,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_time_to_output_response_ms: None,
        }
    }
}

fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

impl AdbConfig {
    pub fn from_toml_str(s: &str) -> AdbResult<Self> {
        let config: Self = toml::from_str(s).map_err(|err| AdbError::Config(err.to_string()))?;
        if config.chunk_size == 0 {
            return Err(AdbError::Config("chunk_size must be greater than 0".to_string()));
        }
        if config.read_timeout_ms == 0 {
            return Err(AdbError::Config(
                "read_timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> AdbResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|err| AdbError::Config(format!("failed to read {}: {err}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> AdbResult<String> {
        toml::to_string_pretty(self).map_err(|err| AdbError::Config(err.to_string()))
    }

    pub fn socket_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.host, self.port)
    }

    pub fn read_timeout(&self) -> Duration {
        millis(self.read_timeout_ms)
            .unwrap_or(Duration::from_millis(DEFAULT_READ_TIMEOUT_MS))
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        millis(self.write_timeout_ms)
    }

    pub fn max_time_to_output_response(&self) -> Option<Duration> {
        self.max_time_to_output_response_ms.and_then(millis)
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = AdbConfig::from_toml_str("").unwrap();
        assert_eq!(config, AdbConfig::default());
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:5037");
        assert_eq!(config.read_timeout(), Duration::from_secs(2));
        assert_eq!(config.max_time_to_output_response(), None);
    }

    #[test]
    fn test_partial_config() {
        let config = AdbConfig::from_toml_str(
            r#"
host = "192.168.1.3"
port = 5038
read_timeout_ms = 250
max_time_to_output_response_ms = 1500
"#,
        )
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "192.168.1.3:5038");
        assert_eq!(config.read_timeout(), Duration::from_millis(250));
        assert_eq!(config.write_timeout(), Some(Duration::from_secs(2)));
        assert_eq!(
            config.max_time_to_output_response(),
            Some(Duration::from_millis(1500))
        );
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            AdbConfig::from_toml_str("port = \"not a port\""),
            Err(AdbError::Config(_))
        ));
        assert!(matches!(
            AdbConfig::from_toml_str("chunk_size = 0"),
            Err(AdbError::Config(_))
        ));
        assert!(matches!(
            AdbConfig::from_toml_str("read_timeout_ms = 0"),
            Err(AdbError::Config(_))
        ));
    }

    #[test]
    fn test_read_timeout_is_never_unbounded() {
        let config = AdbConfig {
            read_timeout_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.read_timeout(), Duration::from_secs(2));
        assert_eq!(config.write_timeout(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = AdbConfig {
            port: 6000,
            max_time_to_output_response_ms: Some(100),
            ..Default::default()
        };
        let toml = config.to_toml_string().unwrap();
        assert_eq!(AdbConfig::from_toml_str(&toml).unwrap(), config);

        let toml = AdbConfig::default().to_toml_string().unwrap();
        assert!(!toml.contains("max_time_to_output_response_ms"));
    }

    #[test]
    fn test_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 5555").unwrap();
        let config = AdbConfig::load(file.path()).unwrap();
        assert_eq!(config.port, 5555);

        assert!(matches!(
            AdbConfig::load(file.path().with_extension("missing")),
            Err(AdbError::Config(_))
        ));
    }
}
