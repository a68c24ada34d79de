//! Command Types
//!
//! Defines the structured form a client line is parsed into.
//! A `Command` is ephemeral: one is built per received line, executed,
//! and dropped.

use std::fmt;

/// A numeric command argument, as supplied by the client.
///
/// The client addresses latches with 1-based indices. We keep the raw
/// token alongside the parsed value so error replies can echo exactly
/// what the client typed (`invalid number "007"` would otherwise come
/// back normalized as `"7"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    /// The original token from the wire
    pub raw: String,
    /// The parsed base-10 value (1-based latch index)
    pub value: i64,
}

impl Argument {
    pub fn new(raw: impl Into<String>, value: i64) -> Self {
        Self {
            raw: raw.into(),
            value,
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A fully parsed client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `echo` - liveness check, replies with a fixed banner
    Echo,
    /// `toggle <n>` - flip latch `n`
    Toggle(Argument),
    /// `set <n>` - energize latch `n` (drive it high)
    Set(Argument),
    /// `unset <n>` - de-energize latch `n` (drive it low)
    Unset(Argument),
    /// `random` - timed randomized drop/restore across every latch
    Random,
    /// `dropAll` - drop every latch, hold briefly, restore every latch
    DropAll,
}

impl Command {
    /// The verb this command was parsed from, for logging.
    pub fn verb(&self) -> &'static str {
        match self {
            Command::Echo => "echo",
            Command::Toggle(_) => "toggle",
            Command::Set(_) => "set",
            Command::Unset(_) => "unset",
            Command::Random => "random",
            Command::DropAll => "dropAll",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_display_preserves_raw_token() {
        let arg = Argument::new("007", 7);
        assert_eq!(arg.to_string(), "007");
        assert_eq!(arg.value, 7);
    }

    #[test]
    fn verb_names() {
        assert_eq!(Command::Echo.verb(), "echo");
        assert_eq!(Command::Toggle(Argument::new("1", 1)).verb(), "toggle");
        assert_eq!(Command::DropAll.verb(), "dropAll");
    }
}
