//! # iotlink - telemetry firmware core
//!
//! The platform-independent part of a sensor node that reports telemetry to
//! an IoT endpoint over TCP and takes commands back on the same channel.
//! Designed for `no_std` targets; nothing here allocates.
//!
//! ## Layers
//!
//! - **[`network::application::tlv`]**: the tag-length-value data point codec
//!   and the outgoing packet buffer
//! - **[`network::application::mqtt`]**: the session that logs in and carries
//!   TLV packets inside MQTT publishes
//! - **[`lifecycle`]**: the connection state machine with its two retry layers
//! - **[`indicator`]**: the status LED patterns
//! - **[`system::scheduler`]**: the one-shot timer table everything runs on
//!
//! The board support package provides the socket stack, the network manager,
//! the sensors and the LEDs by implementing the traits in [`network`],
//! [`sensor`] and [`indicator`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! # #[cfg(feature = "std")]
//! # fn main() {
//! use iotlink::config::Config;
//! use iotlink::lifecycle::Connection;
//! use iotlink::network::application::mqtt::MqttSession;
//! # use iotlink::config::Credentials;
//! # use iotlink::indicator::{IndicatorDriver, Led};
//! # use iotlink::network::tcp::{TcpConnector, TcpSocket};
//! # use iotlink::network::{Connect, NetworkLink, ReadInterest};
//! # use iotlink::sensor::{Reading, SensorKind, Sensors};
//! # struct Board(TcpConnector);
//! # impl Connect for Board {
//! #     type Connection = TcpSocket;
//! #     type Error = iotlink::network::error::Error;
//! #     fn connect(&mut self, remote: &str) -> Result<TcpSocket, Self::Error> { self.0.connect(remote) }
//! # }
//! # impl ReadInterest for Board {
//! #     fn register(&mut self, _: &TcpSocket) {}
//! #     fn unregister(&mut self, _: &TcpSocket) {}
//! # }
//! # impl NetworkLink for Board {
//! #     fn is_reachable(&self) -> bool { true }
//! #     fn reconnect(&mut self) {}
//! #     fn apply_credentials(&mut self, _: &Credentials) {}
//! # }
//! # impl Sensors for Board {
//! #     fn read(&mut self, _: SensorKind) -> Option<Reading> { None }
//! #     fn unix_time(&self) -> u64 { 0 }
//! # }
//! # impl IndicatorDriver for Board {
//! #     fn set(&mut self, _: Led, _: bool) {}
//! # }
//!
//! let config = Config::from_json(r#"{"remote":"192.168.1.10:1883"}"#).unwrap();
//! let board = Board(TcpConnector::new(config.connect_timeout_ms, config.io_timeout_ms));
//! let mut connection: Connection<_, MqttSession> = Connection::new(config, board);
//!
//! connection.start(0);
//! // From the event loop:
//! // connection.poll(now_ms);
//! // connection.on_readable(now_ms); // once the registered socket is readable
//! # }
//! # #[cfg(not(feature = "std"))]
//! # fn main() {}
//! ```
//!
//! ## Optional Features
//!
//! - `std`: blocking TCP sockets over `std::net` (default: disabled)
//! - `defmt`: `defmt::Format` for every error type

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

/// Transport traits, the network manager seam and application protocols.
pub mod network;

/// Device configuration.
pub mod config;

/// Status LEDs.
pub mod indicator;

/// Connection lifecycle state machine.
pub mod lifecycle;

/// Sensor sources.
pub mod sensor;

/// Scheduling primitives.
pub mod system;
