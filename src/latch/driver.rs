//! Pin Driver Seam
//!
//! The latch bank never talks to hardware directly; it goes through the
//! [`PinDriver`] trait. A real deployment plugs in a GPIO-backed driver,
//! tests and bench runs use [`MockPinDriver`].
//!
//! Whether "energized" means physical HIGH or LOW is a wiring concern
//! that lives entirely behind this trait (relay boards with active-low
//! inputs idle HIGH). The bank only speaks in logical state.

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Opaque identifier for a physical output line (e.g. a BCM pin number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(pub u32);

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line{}", self.0)
    }
}

/// Errors surfaced by a pin driver.
///
/// Configuration failures are expected to happen loudly at startup;
/// per-call failures after a successful `configure` indicate a driver or
/// wiring fault.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// A line was driven or read without being configured first
    #[error("line {0} is not configured")]
    Unconfigured(LineId),

    /// The same line appeared twice in the configuration list
    #[error("line {0} configured twice")]
    DuplicateLine(LineId),
}

/// Capability for driving physical output lines.
///
/// Contract: `configure` is called exactly once, before any other method,
/// with the full set of lines the server will ever touch.
pub trait PinDriver: Send {
    /// Claims the given lines and drives them all to the energized
    /// (idle) state.
    fn configure(&mut self, lines: &[LineId]) -> Result<(), DriverError>;

    /// Drives one line to the requested logical state.
    fn set_line(&mut self, line: LineId, energized: bool) -> Result<(), DriverError>;

    /// Reads back the last commanded logical state of one line.
    fn read_line(&self, line: LineId) -> Result<bool, DriverError>;
}

/// In-memory driver: remembers commanded states, touches no hardware.
#[derive(Debug, Default)]
pub struct MockPinDriver {
    /// Last commanded state per configured line
    states: HashMap<LineId, bool>,
}

impl MockPinDriver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PinDriver for MockPinDriver {
    fn configure(&mut self, lines: &[LineId]) -> Result<(), DriverError> {
        for &line in lines {
            if self.states.insert(line, true).is_some() {
                return Err(DriverError::DuplicateLine(line));
            }
        }
        Ok(())
    }

    fn set_line(&mut self, line: LineId, energized: bool) -> Result<(), DriverError> {
        match self.states.get_mut(&line) {
            Some(state) => {
                *state = energized;
                Ok(())
            }
            None => Err(DriverError::Unconfigured(line)),
        }
    }

    fn read_line(&self, line: LineId) -> Result<bool, DriverError> {
        self.states
            .get(&line)
            .copied()
            .ok_or(DriverError::Unconfigured(line))
    }
}
