//! Wire Protocol
//!
//! The droplatch protocol is deliberately minimal: plain UTF-8 text,
//! one whitespace-separated command per message, no framing terminator.
//!
//! ## Modules
//!
//! - `types`: the [`Command`] value a line parses into
//! - `parser`: [`parse_line`] and [`ParseError`]
//!
//! ## Example
//!
//! ```
//! use droplatch::protocol::{parse_line, Command};
//!
//! let cmd = parse_line("toggle 3").unwrap();
//! assert!(matches!(cmd, Command::Toggle(arg) if arg.value == 3));
//! ```

pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use parser::{parse_line, ParseError, ParseResult};
pub use types::{Argument, Command};
