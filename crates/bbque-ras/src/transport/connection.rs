//! Stream wrapper and connection establishment.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};

use bbque_config::ResourceManagerEndpoint;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use tracing::debug;

use super::{Readiness, TRANSPORT_TARGET};
use crate::errors::AllocationError;

/// Open connection to the resource manager.
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    endpoint: ResourceManagerEndpoint,
}

impl Connection {
    /// Wraps an already connected stream.
    #[must_use]
    pub const fn from_stream(stream: TcpStream, endpoint: ResourceManagerEndpoint) -> Self {
        Self { stream, endpoint }
    }

    /// Endpoint this connection was opened to.
    #[must_use]
    pub const fn endpoint(&self) -> ResourceManagerEndpoint {
        self.endpoint
    }

    /// Blocks until at least one byte can be read or the peer has gone.
    pub fn wait_readable(&self) -> io::Result<Readiness> {
        let mut probe = [0_u8; 1];
        loop {
            match self.stream.peek(&mut probe) {
                Ok(0) => return Ok(Readiness::Closed),
                Ok(_) => return Ok(Readiness::Readable),
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(error),
            }
        }
    }

    /// Handle that can close this connection from elsewhere.
    pub fn shutdown_handle(&self) -> io::Result<ShutdownHandle> {
        self.stream.try_clone().map(ShutdownHandle)
    }

    /// Shuts down both directions. The descriptor closes when `self` drops.
    pub fn close(self) {
        shutdown_stream(&self.stream);
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

/// Cancels a connection by shutting its socket down.
///
/// Any thread blocked waiting for readability on the same socket wakes up and
/// observes the connection as closed.
#[derive(Debug)]
pub struct ShutdownHandle(TcpStream);

impl ShutdownHandle {
    /// Shuts the socket down in both directions.
    pub fn shutdown(&self) {
        shutdown_stream(&self.0);
    }
}

fn shutdown_stream(stream: &TcpStream) {
    if let Err(error) = stream.shutdown(Shutdown::Both)
        && error.kind() != io::ErrorKind::NotConnected
    {
        debug!(
            target: TRANSPORT_TARGET,
            error = %error,
            "socket shutdown failed"
        );
    }
}

/// Opens a stream socket and connects it to `endpoint`.
pub fn connect(endpoint: &ResourceManagerEndpoint) -> Result<Connection, AllocationError> {
    let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))
        .map_err(|source| AllocationError::SocketCreate { source })?;
    let address = SockAddr::from(SocketAddr::V4(endpoint.socket_addr()));
    socket
        .connect(&address)
        .map_err(|source| AllocationError::Connect {
            endpoint: endpoint.to_string(),
            source,
        })?;
    let stream: TcpStream = socket.into();
    debug!(
        target: TRANSPORT_TARGET,
        endpoint = %endpoint,
        "connected to resource manager"
    );
    Ok(Connection::from_stream(stream, *endpoint))
}
