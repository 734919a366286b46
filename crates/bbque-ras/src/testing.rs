//! Loopback stand-in for the resource manager.
//!
//! [`FakeResourceManager`] accepts one connection, plays a fixed script of
//! reads and writes against it, then records every command the client sends
//! until the connection closes.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, SocketAddrV4, TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use bbque_config::{Config, ResourceManagerEndpoint};

use crate::protocol::{
    Command, CommandKind, Hostname, JobId, JobRequest, ResourceItem, WireRecord,
};

const ACCEPT_DEADLINE: Duration = Duration::from_secs(5);
const ACCEPT_BACKOFF: Duration = Duration::from_millis(10);
const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// One scripted action of the fake resource manager.
#[derive(Debug, Clone)]
pub enum ServerStep {
    /// Read a node request (header and body) and record it.
    ExpectRequest,
    /// Send raw bytes as-is.
    Send(Vec<u8>),
    /// Close the connection without draining further commands.
    Disconnect,
}

impl ServerStep {
    /// A complete reply: header, then one item per node with `more_items`
    /// cleared on the last.
    pub fn reply(job: u32, nodes: &[(&str, i32)]) -> Self {
        let job_id = JobId::new(job);
        let mut bytes = Command::new(CommandKind::NodesReply, job_id).encode();
        for (index, (name, slots)) in nodes.iter().enumerate() {
            bytes.extend(encode_item(job_id, name, *slots, index + 1 < nodes.len()));
        }
        Self::Send(bytes)
    }

    /// A single command header.
    pub fn command(kind: u8, job: u32) -> Self {
        let mut bytes = Command::new(CommandKind::NodesReply, JobId::new(job)).encode();
        if let Some(slot) = bytes.get_mut(4) {
            *slot = kind;
        }
        Self::Send(bytes)
    }

    /// One resource item.
    pub fn item(job: u32, name: &str, slots: i32, more_items: bool) -> Self {
        Self::Send(encode_item(JobId::new(job), name, slots, more_items))
    }
}

fn encode_item(job_id: JobId, name: &str, slots: i32, more_items: bool) -> Vec<u8> {
    let hostname = Hostname::new(name).unwrap_or_default();
    ResourceItem {
        job_id,
        hostname,
        slots_available: slots,
        more_items,
    }
    .encode()
}

/// What the fake resource manager observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    /// Node requests read by [`ServerStep::ExpectRequest`].
    pub requests: Vec<(Command, JobRequest)>,
    /// Commands received after the script finished, typically `Terminate`.
    pub trailing_commands: Vec<Command>,
}

/// Fake resource manager bound to an ephemeral loopback port.
pub struct FakeResourceManager {
    address: SocketAddrV4,
    handle: Option<thread::JoinHandle<io::Result<Transcript>>>,
}

impl FakeResourceManager {
    /// Starts serving `steps` on a background thread.
    pub fn spawn(steps: Vec<ServerStep>) -> io::Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0))?;
        listener.set_nonblocking(true)?;
        let SocketAddr::V4(address) = listener.local_addr()? else {
            return Err(io::Error::other("loopback listener is not IPv4"));
        };
        let handle = thread::spawn(move || serve(&listener, &steps));
        Ok(Self {
            address,
            handle: Some(handle),
        })
    }

    /// Endpoint clients should connect to.
    pub fn endpoint(&self) -> ResourceManagerEndpoint {
        ResourceManagerEndpoint::from(self.address)
    }

    /// Configuration pointing at this fake.
    pub fn config(&self) -> Config {
        Config::for_endpoint(self.endpoint())
    }

    /// Waits for the server thread and returns what it saw.
    ///
    /// The client must have closed its connection first, otherwise this
    /// blocks until the read timeout expires.
    pub fn finish(mut self) -> io::Result<Transcript> {
        self.join()
    }

    fn join(&mut self) -> io::Result<Transcript> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| io::Error::other("fake resource manager panicked"))?,
            None => Ok(Transcript::default()),
        }
    }
}

impl Drop for FakeResourceManager {
    fn drop(&mut self) {
        drop(self.join());
    }
}

fn serve(listener: &TcpListener, steps: &[ServerStep]) -> io::Result<Transcript> {
    let Some(mut stream) = accept(listener)? else {
        return Ok(Transcript::default());
    };
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(READ_TIMEOUT))?;

    let mut transcript = Transcript::default();
    for step in steps {
        match step {
            ServerStep::ExpectRequest => {
                let command = read_exact_record::<Command>(&mut stream)?;
                let request = read_exact_record::<JobRequest>(&mut stream)?;
                transcript.requests.push((command, request));
            }
            ServerStep::Send(bytes) => {
                stream.write_all(bytes)?;
                stream.flush()?;
            }
            ServerStep::Disconnect => {
                drop(stream.shutdown(Shutdown::Both));
                return Ok(transcript);
            }
        }
    }

    loop {
        match read_exact_record::<Command>(&mut stream) {
            Ok(command) => transcript.trailing_commands.push(command),
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::UnexpectedEof
                        | io::ErrorKind::ConnectionReset
                        | io::ErrorKind::WouldBlock
                        | io::ErrorKind::TimedOut
                ) =>
            {
                return Ok(transcript);
            }
            Err(error) => return Err(error),
        }
    }
}

fn accept(listener: &TcpListener) -> io::Result<Option<TcpStream>> {
    let deadline = Instant::now() + ACCEPT_DEADLINE;
    loop {
        match listener.accept() {
            Ok((stream, _)) => return Ok(Some(stream)),
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => {
                if Instant::now() >= deadline {
                    return Ok(None);
                }
                thread::sleep(ACCEPT_BACKOFF);
            }
            Err(error) => return Err(error),
        }
    }
}

fn read_exact_record<R: WireRecord>(stream: &mut TcpStream) -> io::Result<R> {
    let mut buffer = vec![0_u8; R::SIZE];
    stream.read_exact(&mut buffer)?;
    R::decode(&buffer).map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))
}
