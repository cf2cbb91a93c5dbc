//! The session layer sitting between the socket and the TLV codec.
//!
//! A session performs the login handshake, wraps outgoing TLV packets in its
//! own envelope, and turns raw socket bytes back into decoded records. The
//! lifecycle owns exactly one session per connected socket and throws it away
//! together with the socket.

use super::tlv::{self, Header, Record};
use crate::config::Config;
use crate::network::error::Error as NetworkError;
use core::fmt;

/// The send callback handed to a session.
///
/// Implemented by the lifecycle over the connected socket. The chunks are
/// written back to back as one packet; anything less than a complete write is
/// an error.
pub trait Transmit {
    /// Write every chunk in order.
    fn transmit(&mut self, chunks: &[&[u8]]) -> Result<(), NetworkError>;
}

/// Something the session wants the lifecycle to know about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent<'a> {
    /// The endpoint answered the login. `0` means accepted, anything else is
    /// the rejection code.
    LoginResult(u8),
    /// One record of a downlink packet.
    Message {
        /// Header of the packet the record came in.
        header: Header,
        /// The record itself.
        record: Record<'a>,
    },
}

/// Session failures.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SessionError {
    /// The send callback failed.
    Transport(NetworkError),
    /// The envelope around a packet was malformed.
    Malformed,
    /// A downlink TLV packet could not be decoded.
    Codec(tlv::Error),
    /// A packet did not fit in the session's fixed buffers.
    Overflow,
}

impl From<NetworkError> for SessionError {
    fn from(e: NetworkError) -> Self {
        SessionError::Transport(e)
    }
}

impl From<tlv::Error> for SessionError {
    fn from(e: tlv::Error) -> Self {
        SessionError::Codec(e)
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Transport(e) => write!(f, "transport: {}", e),
            SessionError::Malformed => f.write_str("malformed session packet"),
            SessionError::Codec(e) => write!(f, "codec: {}", e),
            SessionError::Overflow => f.write_str("session buffer overflow"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SessionError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            SessionError::Transport(e) => defmt::write!(f, "Transport({})", e),
            SessionError::Malformed => defmt::write!(f, "Malformed"),
            SessionError::Codec(e) => defmt::write!(f, "Codec({})", e),
            SessionError::Overflow => defmt::write!(f, "Overflow"),
        }
    }
}

/// A protocol session over one connected socket.
pub trait Session {
    /// Create a fresh session context for a new socket.
    fn open(config: &Config) -> Self
    where
        Self: Sized;

    /// Send the login packet.
    fn login<T: Transmit>(&mut self, now_ms: u64, tx: &mut T) -> Result<(), SessionError>;

    /// Feed bytes read from the socket. Complete packets are decoded and
    /// reported through `on_event`; partial ones are kept for the next call.
    fn input<T: Transmit>(
        &mut self,
        bytes: &[u8],
        now_ms: u64,
        tx: &mut T,
        on_event: &mut dyn FnMut(SessionEvent<'_>),
    ) -> Result<(), SessionError>;

    /// Send one finished TLV packet.
    fn send<T: Transmit>(
        &mut self,
        packet: &[u8],
        now_ms: u64,
        tx: &mut T,
    ) -> Result<(), SessionError>;

    /// Periodic housekeeping such as keep-alives.
    fn tick<T: Transmit>(&mut self, _now_ms: u64, _tx: &mut T) -> Result<(), SessionError> {
        Ok(())
    }

    /// Request id for the next outgoing packet.
    fn next_request_id(&mut self) -> u32;
}
