//! # droplatch - A TCP Remote-Control Server for Latched Output Lines
//!
//! droplatch listens on a loopback TCP port for short text commands and
//! drives a fixed bank of hardware output lines (relays/latches) in
//! response, including timed multi-latch sequences.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         droplatch                            │
//! │                                                              │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐         │
//! │  │ TCP Server  │──>│ Connection  │──>│  Command    │         │
//! │  │ (Listener)  │   │  Handler    │   │  Handler    │         │
//! │  └─────────────┘   └─────────────┘   └──────┬──────┘         │
//! │                                             │                │
//! │  ┌─────────────┐                            ▼                │
//! │  │    Line     │   ┌─────────────────────────────────────┐   │
//! │  │   Parser    │   │              LatchBank              │   │
//! │  └─────────────┘   │  ┌───────┐ ┌───────┐ ┌───────┐      │   │
//! │                    │  │Latch 0│ │Latch 1│ │ ...N  │      │   │
//! │                    │  └───────┘ └───────┘ └───────┘      │   │
//! │                    └──────────────────┬──────────────────┘   │
//! │                                       ▼                      │
//! │                              ┌─────────────────┐             │
//! │                              │  dyn PinDriver  │             │
//! │                              └─────────────────┘             │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire protocol
//!
//! Plain UTF-8 text, one command per message, case-sensitive:
//!
//! - `echo` → `echo! echo! echo!`
//! - `toggle <n>` → `toggled pin <n>` (indices are 1-based)
//! - `set <n>` → `set pin <n> high`
//! - `unset <n>` → `set pin <n> low`
//! - `random` → no reply; timed randomized drop/restore of every latch
//! - `dropAll` → no reply; drop all, hold 500 ms, restore all
//!
//! Bad numeric arguments come back as `cannot parse "<text>"` or
//! `invalid number "<text>"`; everything else unrecognized is logged
//! server-side and ignored.
//!
//! ## Quick Start
//!
//! ```ignore
//! use droplatch::commands::CommandHandler;
//! use droplatch::connection::{handle_connection, ConnectionStats};
//! use droplatch::latch::{LatchBank, LineId, MockPinDriver};
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() {
//!     let lines = droplatch::DEFAULT_LINES.iter().copied().map(LineId).collect();
//!     let bank = Arc::new(LatchBank::new(Box::new(MockPinDriver::new()), lines).unwrap());
//!     let stats = Arc::new(ConnectionStats::new());
//!
//!     let listener = TcpListener::bind("127.0.0.1:9999").await.unwrap();
//!     loop {
//!         let (stream, addr) = listener.accept().await.unwrap();
//!         let commands = CommandHandler::new(Arc::clone(&bank));
//!         tokio::spawn(handle_connection(stream, addr, commands, Arc::clone(&stats)));
//!     }
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`protocol`]: command-line parser and command types
//! - [`latch`]: the latch bank, its timed sequences, and the pin-driver seam
//! - [`commands`]: command validation, execution and reply formatting
//! - [`connection`]: per-client connection handling and statistics

pub mod commands;
pub mod connection;
pub mod latch;
pub mod protocol;

// Re-export commonly used types for convenience
pub use commands::{CommandHandler, ECHO_REPLY};
pub use connection::{handle_connection, ConnectionError, ConnectionStats};
pub use latch::{LatchBank, LatchError, LineId, MockPinDriver, PinDriver};
pub use protocol::{parse_line, Command, ParseError};

/// The default port droplatch listens on
pub const DEFAULT_PORT: u16 = 9999;

/// The default host droplatch binds to (loopback only)
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Listen backlog for the server socket
pub const LISTEN_BACKLOG: u32 = 2;

/// Default physical lines, in bank order (BCM numbering of a common
/// 8-relay HAT; see pinout.xyz)
pub const DEFAULT_LINES: [u32; 8] = [4, 17, 27, 22, 5, 6, 13, 19];

/// Version of droplatch
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
