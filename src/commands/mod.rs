//! Command Processing
//!
//! Receives raw command lines from the connection layer, parses them,
//! validates indices, executes them against the latch bank, and decides
//! what (if anything) goes back to the client.
//!
//! ```text
//! Client line
//!       │
//!       ▼
//! ┌─────────────────┐
//! │   parse_line    │  (protocol module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (this module)
//! │                 │
//! │  - Validate     │
//! │  - Execute      │
//! │  - Format reply │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    LatchBank    │  (latch module)
//! └─────────────────┘
//! ```

pub mod handler;

// Re-export the main command handler
pub use handler::{CommandHandler, ECHO_REPLY};
