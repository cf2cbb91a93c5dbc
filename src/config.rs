//! Device configuration.
//!
//! All knobs of the firmware live in one [`Config`] value. The defaults
//! reproduce the timings the device shipped with; a provisioning tool can
//! override any subset of them with a JSON document:
//!
//! ```rust
//! use iotlink::config::Config;
//!
//! let config = Config::from_json(r#"{"remote":"10.0.0.2:1883","telemetry_interval_ms":5000}"#).unwrap();
//! assert_eq!(config.remote.as_str(), "10.0.0.2:1883");
//! assert_eq!(config.telemetry_interval_ms, 5000);
//! assert_eq!(config.session_retry_ms, 2000);
//! ```

use core::fmt;
use heapless::String;
use serde::{Deserialize, Serialize};

/// Maximum length of a Wi-Fi SSID.
pub const MAX_SSID_LEN: usize = 32;
/// Maximum length of a Wi-Fi password.
pub const MAX_PASSWORD_LEN: usize = 64;

/// Errors raised while loading a configuration.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// The JSON document could not be parsed.
    Parse,
    /// `remote` is not of the form `host:port`.
    InvalidRemote,
    /// A timer interval is zero.
    ZeroInterval,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse => f.write_str("malformed configuration"),
            Error::InvalidRemote => f.write_str("remote must be host:port"),
            Error::ZeroInterval => f.write_str("intervals must be non-zero"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Parse => defmt::write!(f, "Parse"),
            Error::InvalidRemote => defmt::write!(f, "InvalidRemote"),
            Error::ZeroInterval => defmt::write!(f, "ZeroInterval"),
        }
    }
}

/// Wi-Fi station credentials.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Credentials {
    /// Network name.
    pub ssid: String<MAX_SSID_LEN>,
    /// Pre-shared key.
    pub password: String<MAX_PASSWORD_LEN>,
}

impl Credentials {
    /// Build credentials, truncating nothing: over-long input is rejected.
    pub fn new(ssid: &str, password: &str) -> Option<Self> {
        Some(Self {
            ssid: String::try_from(ssid).ok()?,
            password: String::try_from(password).ok()?,
        })
    }

    /// Both fields are set. Incomplete credentials are never applied.
    pub fn is_complete(&self) -> bool {
        !self.ssid.is_empty() && !self.password.is_empty()
    }
}

/// Firmware configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Endpoint as `host:port`.
    pub remote: String<64>,
    /// Client identifier presented at login.
    pub client_id: String<64>,
    /// User name presented at login. Empty to omit.
    pub user_name: String<32>,
    /// Secret presented at login. Empty to omit.
    pub secret: String<64>,
    /// Topic telemetry is published on.
    pub publish_topic: String<64>,
    /// Topic commands arrive on.
    pub subscribe_topic: String<64>,
    /// Session keep-alive in seconds, 0 disables it.
    pub keep_alive_s: u16,
    /// Period of the telemetry tick.
    pub telemetry_interval_ms: u32,
    /// Delay before retrying the session layer.
    pub session_retry_ms: u32,
    /// Delay before retrying the network layer.
    pub network_retry_ms: u32,
    /// Time allowed for the login handshake.
    pub handshake_timeout_ms: u32,
    /// Toggle period of the "searching" indicator pattern.
    pub indicator_interval_ms: u32,
    /// Bound on a blocking connect.
    pub connect_timeout_ms: u32,
    /// Bound on a blocking read or write.
    pub io_timeout_ms: u32,
    /// Credentials the network manager was provisioned with.
    pub credentials: Credentials,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote: String::try_from("127.0.0.1:1883").unwrap_or_default(),
            client_id: String::try_from("iotlink-device").unwrap_or_default(),
            user_name: String::new(),
            secret: String::new(),
            publish_topic: String::try_from("iot/up").unwrap_or_default(),
            subscribe_topic: String::try_from("iot/down").unwrap_or_default(),
            keep_alive_s: 60,
            telemetry_interval_ms: 3000,
            session_retry_ms: 2000,
            network_retry_ms: 3000,
            handshake_timeout_ms: 5000,
            indicator_interval_ms: 300,
            connect_timeout_ms: 3000,
            io_timeout_ms: 5000,
            credentials: Credentials::default(),
        }
    }
}

impl Config {
    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let (config, _): (Config, _) =
            serde_json_core::from_str(json).map_err(|_| Error::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the lifecycle relies on.
    pub fn validate(&self) -> Result<(), Error> {
        match self.remote.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {}
            _ => return Err(Error::InvalidRemote),
        }

        let intervals = [
            self.telemetry_interval_ms,
            self.session_retry_ms,
            self.network_retry_ms,
            self.handshake_timeout_ms,
            self.indicator_interval_ms,
        ];
        if intervals.contains(&0) {
            return Err(Error::ZeroInterval);
        }
        Ok(())
    }
}
