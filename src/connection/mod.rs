//! Connection Management
//!
//! The original droplatch server multiplexed its listening socket and
//! client sockets through one readiness loop with stored callbacks.
//! Here that becomes the runtime's job: the accept loop in `main.rs`
//! owns the listening socket, and each accepted client gets its own
//! async task running [`handle_connection`]. The two event sources are
//! distinguished by which code owns them, not by a callback stashed in
//! registration data.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              TCP Listener                   │
//! │       (main.rs, backlog of 2)               │
//! └──────────────────┬──────────────────────────┘
//!                    │ accept()
//!                    ▼
//!        ┌───────────────────────┐
//!        │  spawn per client...  │
//!        └───────────┬───────────┘
//!                    ▼
//! ┌─────────────────────────────────────────────┐
//! │            ConnectionHandler                │
//! │                                             │
//! │  ┌──────────┐  ┌──────────┐  ┌──────────┐   │
//! │  │ Read one │─>│ Execute  │─>│  Reply   │   │
//! │  │  chunk   │  │ command  │  │ (if any) │   │
//! │  └──────────┘  └──────────┘  └──────────┘   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! A latch sequence holds the bank lock inside its own connection's
//! task, so a long `random` run delays commands from other clients only
//! at the bank, never their accepts or reads.

pub mod handler;

// Re-export commonly used types
pub use handler::{
    handle_connection, ConnectionError, ConnectionHandler, ConnectionStats, MAX_COMMAND_BYTES,
};
