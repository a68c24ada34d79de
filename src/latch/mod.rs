//! Latch Control
//!
//! Everything that touches output-line state lives here.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 LatchBank                    │
//! │   tokio::sync::Mutex                         │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐         │
//! │  │ Latch 0 │ │ Latch 1 │ │ ...N    │         │
//! │  └─────────┘ └─────────┘ └─────────┘         │
//! │                    │                         │
//! │                    ▼                         │
//! │          ┌───────────────────┐               │
//! │          │  dyn PinDriver    │  (hardware /  │
//! │          └───────────────────┘   mock seam)  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `driver`: the [`PinDriver`] hardware seam, [`LineId`], [`MockPinDriver`]
//! - `bank`: the [`LatchBank`] and its timed sequences

pub mod bank;
pub mod driver;

// Re-export commonly used types
pub use bank::{LatchBank, LatchError};
pub use driver::{DriverError, LineId, MockPinDriver, PinDriver};
