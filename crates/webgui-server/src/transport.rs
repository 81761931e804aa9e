//! Socket transport.
//!
//! The dispatcher needs very little from the network stack: a way to pick
//! up one waiting client without blocking, and a byte stream to that
//! client. Board ports implement these two traits over their WiFi server.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

/// A connected client.
pub trait Connection: Read + Write {
    /// Close the connection after the response was written.
    fn close(&mut self) -> io::Result<()>;

    fn peer_addr(&self) -> Option<SocketAddr> {
        None
    }
}

/// Source of client connections.
pub trait Transport {
    type Conn: Connection;

    /// Return a waiting client, or `None` when nobody is waiting.
    fn accept_pending(&mut self) -> io::Result<Option<Self::Conn>>;
}

impl Connection for TcpStream {
    fn close(&mut self) -> io::Result<()> {
        match self.shutdown(Shutdown::Both) {
            Err(e) if e.kind() != io::ErrorKind::NotConnected => Err(e),
            _ => Ok(()),
        }
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        TcpStream::peer_addr(self).ok()
    }
}

/// `std::net` listener polled without blocking.
#[derive(Debug)]
pub struct TcpTransport {
    listener: TcpListener,
    read_timeout: Option<Duration>,
}

impl TcpTransport {
    pub fn bind(addr: impl ToSocketAddrs, read_timeout: Option<Duration>) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        Ok(Self {
            listener,
            read_timeout,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for TcpTransport {
    type Conn = TcpStream;

    fn accept_pending(&mut self) -> io::Result<Option<TcpStream>> {
        match self.listener.accept() {
            Ok((stream, peer)) => {
                // Client I/O is blocking, bounded by the read timeout.
                stream.set_nonblocking(false)?;
                stream.set_read_timeout(self.read_timeout)?;
                stream.set_nodelay(true)?;
                debug!("Client connected: {}", peer);
                Ok(Some(stream))
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }
}
