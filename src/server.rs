//! TCP server for the fake PTL controller.
//!
//! Binds one IPv4 listener, accepts exactly one connection, and answers
//! every read on it with the fixed acknowledgement frame until the peer
//! disconnects. The listener is never polled a second time.

use crate::logging::CONSOLE;
use crate::protocol::{ack_frame, frame_text, to_hex, BACKLOG, READ_SIZE};
use bytes::BytesMut;
use std::io;
use std::net::{AddrParseError, SocketAddr};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{debug, info, trace};

/// Server instance owning the listening socket
pub struct Server {
    listener: TcpListener,
}

impl Server {
    /// Bind the listening socket.
    ///
    /// Must be called from within a tokio runtime.
    pub fn bind(listen: &str) -> Result<Self, ServerError> {
        let addr: SocketAddr = listen
            .parse()
            .map_err(|e| ServerError::InvalidAddress(listen.to_string(), e))?;
        if !addr.is_ipv4() {
            return Err(ServerError::NotIpv4(addr));
        }

        let std_listener = create_listener(addr).map_err(|e| ServerError::Bind(addr, e))?;
        let listener = TcpListener::from_std(std_listener).map_err(|e| ServerError::Bind(addr, e))?;
        let local_addr = listener.local_addr().map_err(ServerError::Io)?;

        info!(target: CONSOLE, "Fake PTL Controller listening on {local_addr}");

        Ok(Server { listener })
    }

    /// Get the bound address for testing
    #[cfg(test)]
    pub fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr().unwrap()
    }

    /// Accept a single connection and serve it until the peer disconnects.
    ///
    /// Consumes the server, so the listener is closed on return.
    pub async fn run(self) -> Result<(), ServerError> {
        let (stream, peer) = self.listener.accept().await.map_err(ServerError::Accept)?;
        info!(target: CONSOLE, "Connected by {peer}");

        let messages = handle_connection(stream).await.map_err(ServerError::Io)?;
        debug!(peer = %peer, messages, "Connection closed");

        Ok(())
    }
}

/// Serve one connection, returning the number of messages answered.
///
/// Each non-empty read counts as one message and gets one acknowledgement.
/// A zero-byte read ends the loop without a reply.
pub async fn handle_connection<S>(mut stream: S) -> io::Result<u64>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buffer = BytesMut::with_capacity(READ_SIZE);
    let mut messages = 0u64;

    loop {
        buffer.clear();
        buffer.resize(READ_SIZE, 0);

        let n = stream.read(&mut buffer[..]).await?;
        if n == 0 {
            info!(target: CONSOLE, "Client disconnected");
            return Ok(messages);
        }
        buffer.truncate(n);

        info!(target: CONSOLE, "RECEIVED: {}", to_hex(&buffer));
        if let Some(text) = frame_text(&buffer) {
            debug!(payload = %text, "Inbound frame");
        }

        let response = ack_frame();
        info!(target: CONSOLE, "SENT: {}", to_hex(&response));
        stream.write_all(&response).await?;

        messages += 1;
        trace!(messages, bytes = n, "Acknowledged message");
    }
}

/// Create an IPv4 TCP listener with a backlog of one.
///
/// Address reuse is left off so a port already in use fails the bind.
fn create_listener(addr: SocketAddr) -> io::Result<std::net::TcpListener> {
    let socket = socket2::Socket::new(
        socket2::Domain::IPV4,
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(BACKLOG)?;

    Ok(socket.into())
}

/// Server errors. All of them are fatal.
#[derive(Debug)]
pub enum ServerError {
    InvalidAddress(String, AddrParseError),
    NotIpv4(SocketAddr),
    Bind(SocketAddr, io::Error),
    Accept(io::Error),
    Io(io::Error),
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerError::InvalidAddress(addr, e) => {
                write!(f, "Invalid listen address '{}': {}", addr, e)
            }
            ServerError::NotIpv4(addr) => {
                write!(f, "Listen address '{}' is not an IPv4 address", addr)
            }
            ServerError::Bind(addr, e) => write!(f, "Failed to bind {}: {}", addr, e),
            ServerError::Accept(e) => write!(f, "Failed to accept connection: {}", e),
            ServerError::Io(e) => write!(f, "Connection error: {}", e),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::InvalidAddress(_, e) => Some(e),
            ServerError::NotIpv4(_) => None,
            ServerError::Bind(_, e) | ServerError::Accept(e) | ServerError::Io(e) => Some(e),
        }
    }
}
