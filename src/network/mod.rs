//! A network abstraction layer for embedded systems
//!
//! The traits here are the seam between the firmware core and whatever socket
//! stack the board provides (smoltcp, an AT-command modem, `std::net`, ...).
//! The connection lifecycle only ever talks to a socket through [`Read`],
//! [`Write`] and [`Close`], and only ever learns about the network attachment
//! through [`NetworkLink`].
//!

#![deny(unsafe_code)]

use crate::config::Credentials;
use core::net::IpAddr;

/// Common error types for network operations
pub mod error;

/// Application protocols spoken over a connection
pub mod application;

/// Blocking TCP adapter over `std::net`
#[cfg(feature = "std")]
pub mod tcp;

/// Re-exports of common traits
pub mod prelude {
    pub use super::{Close, Connect, Connection, NetworkLink, Read, ReadInterest, Write};
}

// Core synchronous traits

/// Byte source of a connection
pub trait Read {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Read data from the connection. `Ok(0)` means the peer closed it.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Byte sink of a connection
pub trait Write {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Write data to the connection
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;
    /// Flush the write buffer
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Orderly shutdown of a connection
pub trait Close {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Close the connection
    fn close(self) -> Result<(), Self::Error>;
}

/// A synchronous connection
pub trait Connection: Read + Write + Close {}

/// A synchronous connector (client)
pub trait Connect {
    /// Associated connection type
    type Connection: Connection;
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Open a connection to `remote` (`host:port`)
    fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error>;
}

/// Readiness reporting for open connections.
///
/// The board watches a registered connection (select, an interrupt line, a
/// modem URC) and calls `Connection::on_readable` only when it has data.
pub trait ReadInterest: Connect {
    /// Start reporting when `socket` is readable.
    fn register(&mut self, socket: &Self::Connection);

    /// Stop reporting for `socket`. Called right before it is closed.
    fn unregister(&mut self, socket: &Self::Connection);
}

/// Notifications from the network-attachment manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkEvent {
    /// The link came up and an address was obtained.
    Attached,
    /// The link went down.
    Detached,
}

/// The network-attachment manager (Wi-Fi station, cellular modem, ...).
///
/// Its internals are owned by the board support code; the lifecycle only asks
/// whether the network is usable and pokes it to reconnect.
pub trait NetworkLink {
    /// Whether an address is currently held.
    fn is_reachable(&self) -> bool;

    /// Restart the attachment procedure.
    fn reconnect(&mut self);

    /// Persist new credentials and restart the attachment with them.
    fn apply_credentials(&mut self, credentials: &Credentials);

    /// Current address, if any. Only used for logging.
    fn address(&self) -> Option<IpAddr> {
        None
    }
}
