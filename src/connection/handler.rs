//! Connection Handler
//!
//! One async task per accepted client. The task loops: read one chunk,
//! treat it as one command line, execute, write back whatever reply the
//! command produced.
//!
//! ## Framing
//!
//! The protocol has no message terminator. One `read()`'s payload is
//! treated as exactly one command line: no reassembly of a command
//! split across reads, no splitting of several commands packed into one
//! read. This mirrors the deployed protocol and is a known limitation -
//! interactive clients send one short command per write, which in
//! practice arrives as one read. Reads are capped at
//! [`MAX_COMMAND_BYTES`].
//!
//! ## Lifecycle
//!
//! A zero-byte read means the peer closed: the task logs, updates the
//! stats, and ends, dropping the socket. Write failures are logged and
//! tear the connection down; nothing is ever retried. No failure here
//! escapes to the accept loop.

use crate::commands::CommandHandler;
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, trace, warn};

/// Maximum bytes accepted in a single read, and therefore the maximum
/// command-line length.
pub const MAX_COMMAND_BYTES: usize = 1000;

/// Statistics for connection handling.
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Currently active connections
    pub active_connections: AtomicU64,
    /// Total command lines processed
    pub commands_processed: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn command_processed(&self) {
        self.commands_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written
            .fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Errors that can end a connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Peer closed the connection (zero-byte read)
    #[error("client disconnected")]
    ClientDisconnected,
}

/// Manages reading, command dispatch and replies for one client.
pub struct ConnectionHandler {
    stream: TcpStream,
    /// Client's address (for logging)
    addr: SocketAddr,
    /// Read buffer, cleared between commands
    buffer: BytesMut,
    /// Executes command lines against the shared latch bank
    commands: CommandHandler,
    /// Connection statistics (shared)
    stats: Arc<ConnectionStats>,
}

impl ConnectionHandler {
    pub fn new(
        stream: TcpStream,
        addr: SocketAddr,
        commands: CommandHandler,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream,
            addr,
            buffer: BytesMut::with_capacity(MAX_COMMAND_BYTES),
            commands,
            stats,
        }
    }

    /// Runs the connection to completion.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "Client connected");

        let result = self.main_loop().await;

        match &result {
            Err(ConnectionError::ClientDisconnected) => {
                info!(client = %self.addr, "Client disconnected")
            }
            Err(e) => warn!(client = %self.addr, error = %e, "Connection error"),
            Ok(()) => {}
        }

        self.stats.connection_closed();
        result
    }

    /// The read-execute-reply loop.
    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        loop {
            let line = match self.read_command().await? {
                Some(line) => line,
                None => continue, // undecodable payload, dropped
            };

            debug!(client = %self.addr, line = %line.escape_debug(), "Received command");

            if let Some(reply) = self.commands.execute(&line).await {
                self.send_reply(&reply).await?;
            }
            self.stats.command_processed();
        }
    }

    /// Reads one chunk and decodes it as one command line.
    ///
    /// Returns `Ok(None)` for payloads that are not valid UTF-8; those
    /// are logged and skipped without killing the connection.
    async fn read_command(&mut self) -> Result<Option<String>, ConnectionError> {
        self.buffer.clear();

        let n = self.stream.read_buf(&mut self.buffer).await?;
        if n == 0 {
            return Err(ConnectionError::ClientDisconnected);
        }
        self.stats.bytes_read(n);
        trace!(client = %self.addr, bytes = n, "Read data");

        match std::str::from_utf8(&self.buffer[..n.min(MAX_COMMAND_BYTES)]) {
            Ok(line) => Ok(Some(line.to_string())),
            Err(e) => {
                warn!(client = %self.addr, error = %e, "Dropping non-UTF-8 payload");
                Ok(None)
            }
        }
    }

    /// Writes one reply. Failures are surfaced to the caller, never retried.
    async fn send_reply(&mut self, reply: &str) -> Result<(), ConnectionError> {
        self.stream.write_all(reply.as_bytes()).await?;
        self.stream.flush().await?;
        self.stats.bytes_written(reply.len());
        trace!(client = %self.addr, bytes = reply.len(), "Sent reply");
        Ok(())
    }
}

/// Handles one client connection to completion.
///
/// Convenience wrapper for spawning: converts every exit path into a
/// log line so the accept loop never sees an error.
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    commands: CommandHandler,
    stats: Arc<ConnectionStats>,
) {
    let handler = ConnectionHandler::new(stream, addr, commands, stats);
    if let Err(e) = handler.run().await {
        match e {
            ConnectionError::ClientDisconnected => {}
            ConnectionError::Io(ref io_err)
                if io_err.kind() == std::io::ErrorKind::ConnectionReset => {}
            _ => {
                debug!(client = %addr, error = %e, "Connection ended with error");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::latch::{LatchBank, LineId, MockPinDriver};
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio::time::timeout;

    async fn create_test_server(
        latches: u32,
    ) -> (SocketAddr, Arc<LatchBank>, Arc<ConnectionStats>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let lines = (0..latches).map(LineId).collect();
        let bank = Arc::new(LatchBank::new(Box::new(MockPinDriver::new()), lines).unwrap());
        let stats = Arc::new(ConnectionStats::new());

        let bank_clone = Arc::clone(&bank);
        let stats_clone = Arc::clone(&stats);

        tokio::spawn(async move {
            while let Ok((stream, client_addr)) = listener.accept().await {
                let commands = CommandHandler::new(Arc::clone(&bank_clone));
                let stats = Arc::clone(&stats_clone);
                tokio::spawn(handle_connection(stream, client_addr, commands, stats));
            }
        });

        (addr, bank, stats)
    }

    async fn send_and_read(client: &mut TcpStream, command: &str) -> String {
        client.write_all(command.as_bytes()).await.unwrap();
        let mut buf = [0u8; 128];
        let n = client.read(&mut buf).await.unwrap();
        String::from_utf8_lossy(&buf[..n]).into_owned()
    }

    async fn expect_silence(client: &mut TcpStream, command: &str) {
        client.write_all(command.as_bytes()).await.unwrap();
        let mut buf = [0u8; 128];
        let read = timeout(Duration::from_millis(200), client.read(&mut buf)).await;
        assert!(read.is_err(), "expected no reply, got one");
    }

    #[tokio::test]
    async fn eight_latch_scenario() {
        let (addr, bank, _) = create_test_server(8).await;
        let mut client = TcpStream::connect(addr).await.unwrap();

        assert_eq!(send_and_read(&mut client, "set 3").await, "set pin 3 high");
        assert_eq!(send_and_read(&mut client, "toggle 3").await, "toggled pin 3");
        assert!(!bank.states().await[2]);

        assert_eq!(
            send_and_read(&mut client, "toggle 0").await,
            "invalid number \"0\""
        );
        let before = bank.states().await;
        expect_silence(&mut client, "foo").await;
        assert_eq!(bank.states().await, before);
    }

    #[tokio::test]
    async fn echo_round_trip() {
        let (addr, _, _) = create_test_server(8).await;
        let mut client = TcpStream::connect(addr).await.unwrap();
        assert_eq!(send_and_read(&mut client, "echo").await, "echo! echo! echo!");
    }

    #[tokio::test]
    async fn parse_error_reply() {
        let (addr, _, _) = create_test_server(8).await;
        let mut client = TcpStream::connect(addr).await.unwrap();
        assert_eq!(
            send_and_read(&mut client, "set banana").await,
            "cannot parse \"banana\""
        );
    }

    #[tokio::test]
    async fn disconnect_leaves_other_clients_working() {
        let (addr, _, stats) = create_test_server(8).await;

        let mut first = TcpStream::connect(addr).await.unwrap();
        let mut second = TcpStream::connect(addr).await.unwrap();

        assert_eq!(send_and_read(&mut first, "set 1").await, "set pin 1 high");
        drop(first);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(stats.active_connections.load(Ordering::Relaxed), 1);

        assert_eq!(send_and_read(&mut second, "toggle 2").await, "toggled pin 2");
    }

    #[tokio::test]
    async fn stats_track_traffic() {
        let (addr, _, stats) = create_test_server(8).await;
        let mut client = TcpStream::connect(addr).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(stats.connections_accepted.load(Ordering::Relaxed), 1);
        assert_eq!(stats.active_connections.load(Ordering::Relaxed), 1);

        let _ = send_and_read(&mut client, "echo").await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(stats.commands_processed.load(Ordering::Relaxed) >= 1);
        assert!(stats.bytes_read.load(Ordering::Relaxed) >= 4);
        assert!(stats.bytes_written.load(Ordering::Relaxed) >= 1);

        drop(client);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(stats.active_connections.load(Ordering::Relaxed), 0);
    }
}
