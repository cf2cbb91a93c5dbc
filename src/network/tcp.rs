//! Blocking TCP sockets for hosted targets (Linux gateways, test rigs).
//!
//! Every blocking call is bounded: the connect by `connect_timeout`, reads and
//! writes by `io_timeout`. A timed-out read surfaces as [`Error::Timeout`] so
//! the lifecycle never stalls the event loop indefinitely.

use super::error::Error;
use super::{Close, Connect, Connection, Read, Write};
use std::io::{ErrorKind, Read as StdRead, Write as StdWrite};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Opens [`TcpSocket`]s with bounded timeouts.
#[derive(Debug, Clone, Copy)]
pub struct TcpConnector {
    connect_timeout: Duration,
    io_timeout: Duration,
}

impl TcpConnector {
    /// Create a connector with the given timeouts in milliseconds.
    pub fn new(connect_timeout_ms: u32, io_timeout_ms: u32) -> Self {
        Self {
            connect_timeout: Duration::from_millis(u64::from(connect_timeout_ms)),
            io_timeout: Duration::from_millis(u64::from(io_timeout_ms)),
        }
    }
}

impl Connect for TcpConnector {
    type Connection = TcpSocket;
    type Error = Error;

    fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error> {
        let address = remote
            .to_socket_addrs()
            .map_err(|_| Error::InvalidAddress)?
            .next()
            .ok_or(Error::InvalidAddress)?;

        let stream =
            TcpStream::connect_timeout(&address, self.connect_timeout).map_err(|e| {
                if e.kind() == ErrorKind::TimedOut {
                    Error::Timeout
                } else {
                    Error::ConnectionRefused
                }
            })?;
        stream
            .set_read_timeout(Some(self.io_timeout))
            .map_err(|_| Error::ConnectionRefused)?;
        stream
            .set_write_timeout(Some(self.io_timeout))
            .map_err(|_| Error::ConnectionRefused)?;
        stream
            .set_nodelay(true)
            .map_err(|_| Error::ConnectionRefused)?;

        log::debug!("tcp connected to {}", address);
        Ok(TcpSocket { stream })
    }
}

/// A connected TCP stream.
#[derive(Debug)]
pub struct TcpSocket {
    stream: TcpStream,
}

impl TcpSocket {
    /// Borrow the underlying stream, e.g. to register it with a poller.
    pub fn stream(&self) -> &TcpStream {
        &self.stream
    }
}

impl Read for TcpSocket {
    type Error = Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.stream.read(buf).map_err(|e| match e.kind() {
            ErrorKind::WouldBlock | ErrorKind::TimedOut => Error::Timeout,
            _ => Error::ReadError,
        })
    }
}

impl Write for TcpSocket {
    type Error = Error;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.stream.write(buf).map_err(|e| match e.kind() {
            ErrorKind::WouldBlock | ErrorKind::TimedOut => Error::Timeout,
            _ => Error::WriteError,
        })
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.stream.flush().map_err(|_| Error::WriteError)
    }
}

impl Close for TcpSocket {
    type Error = Error;

    fn close(self) -> Result<(), Self::Error> {
        match self.stream.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            // Already torn down by the peer.
            Err(e) if e.kind() == ErrorKind::NotConnected => Ok(()),
            Err(_) => Err(Error::NotOpen),
        }
    }
}

impl Connection for TcpSocket {}
