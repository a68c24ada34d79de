//! Command Execution
//!
//! Bridges the wire protocol and the latch bank: parse the line, police
//! the index, apply the effect, format the reply.
//!
//! ```text
//! line ──> parse_line ──> Command ──> LatchBank ──> Option<reply>
//! ```
//!
//! ## Reply policy
//!
//! Clients speak 1-based indices; the bank speaks 0-based. The handler
//! converts (`n - 1`) and rejects `n <= 0` with `invalid number "<raw>"`
//! before the bank is touched. Successful numeric commands confirm with
//! the client's 1-based index. Sequences (`random`, `dropAll`) are
//! fire-and-forget: they run to completion and send nothing. Missing
//! arguments and unrecognized verbs are logged server-side only - the
//! protocol deliberately stays silent toward the client for those.

use crate::latch::{LatchBank, LatchError};
use crate::protocol::{parse_line, Argument, Command, ParseError};
use std::sync::Arc;
use tracing::{error, warn};

/// Fixed reply to the `echo` liveness command.
pub const ECHO_REPLY: &str = "echo! echo! echo!";

/// The three commands of shape `<verb> <n>`.
#[derive(Debug, Clone, Copy)]
enum NumericOp {
    Toggle,
    Set,
    Unset,
}

/// Executes parsed commands against the latch bank.
///
/// Cheap to clone; every connection task carries one.
#[derive(Clone)]
pub struct CommandHandler {
    bank: Arc<LatchBank>,
}

impl CommandHandler {
    pub fn new(bank: Arc<LatchBank>) -> Self {
        Self { bank }
    }

    /// Executes one command line.
    ///
    /// Returns the reply to send to the client, or `None` when the
    /// protocol calls for silence. Never panics and never lets a bank
    /// error escape to the connection loop.
    pub async fn execute(&self, line: &str) -> Option<String> {
        let command = match parse_line(line) {
            Ok(command) => command,
            Err(ParseError::BadNumber(token)) => {
                return Some(format!("cannot parse \"{token}\""));
            }
            Err(err) => {
                // Missing argument or unrecognized verb: diagnostic only
                warn!(%err, "Dropping command");
                return None;
            }
        };

        match command {
            Command::Echo => Some(ECHO_REPLY.to_string()),
            Command::Toggle(arg) => self.numeric_command(arg, NumericOp::Toggle).await,
            Command::Set(arg) => self.numeric_command(arg, NumericOp::Set).await,
            Command::Unset(arg) => self.numeric_command(arg, NumericOp::Unset).await,
            Command::Random => {
                if let Err(err) = self.bank.random_sequence().await {
                    error!(%err, "Randomized sequence failed");
                }
                None
            }
            Command::DropAll => {
                if let Err(err) = self.bank.all_clear().await {
                    error!(%err, "All-clear sequence failed");
                }
                None
            }
        }
    }

    /// Shared path for commands of shape `<verb> <n>`.
    async fn numeric_command(&self, arg: Argument, op: NumericOp) -> Option<String> {
        // 1-based on the wire, 0-based in the bank
        if arg.value <= 0 {
            return Some(format!("invalid number \"{}\"", arg.raw));
        }
        let index = (arg.value - 1) as usize;

        let result = match op {
            NumericOp::Toggle => self.bank.toggle(index).await.map(|_| ()),
            NumericOp::Set => self.bank.set(index, true).await,
            NumericOp::Unset => self.bank.set(index, false).await,
        };

        match result {
            Ok(()) => Some(match op {
                NumericOp::Toggle => format!("toggled pin {}", arg.value),
                NumericOp::Set => format!("set pin {} high", arg.value),
                NumericOp::Unset => format!("set pin {} low", arg.value),
            }),
            Err(err @ LatchError::IndexOutOfRange { .. }) => {
                // The handler only polices the lower bound, so a
                // too-large index lands here. Contract says: shout,
                // invent no reply text.
                error!(?op, index, %err, "Latch operation rejected");
                None
            }
            Err(err) => {
                error!(?op, index, %err, "Latch operation failed");
                None
            }
        }
    }
}
