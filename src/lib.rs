//! # triaxis-link
//!
//! Serial move protocol and synchronized three-axis pulse execution with
//! embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Exact framing**: one opcode byte selects a fixed payload layout;
//!   no resynchronization ambiguity
//! - **Bounded queueing**: fixed-capacity move queue with an explicit
//!   flush/backpressure protocol
//! - **Phase-aligned pulses**: all three axes share one duration window,
//!   with edge counts recomputed from absolute elapsed time each tick
//! - **embedded-hal 1.0**: step/direction pins are `OutputPin`s
//! - **no_std compatible**: the core runs without the standard library
//! - **Single-threaded**: decode and tick interleave in one loop; no
//!   locking, no allocation on the hot path
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use triaxis_link::{LinkController, StepDirPins, TimingConstraints};
//!
//! // Load timing configuration from TOML
//! let config = triaxis_link::load_config("link.toml")?;
//! let constraints = TimingConstraints::from_config(&config.link);
//!
//! // Wire the step/direction pins
//! let driver = StepDirPins::new(sx, dx, sy, dy, sz, dz);
//! let mut link: LinkController<_> = LinkController::new(driver, constraints);
//!
//! // Transport poll loop: re-offer bytes left behind under reply pressure
//! let mut pending: &[u8] = serial.read_available_bytes();
//! while !pending.is_empty() {
//!     let accepted = link.on_bytes(pending);
//!     serial.write_bytes(&link.take_tx());
//!     pending = &pending[accepted..];
//! }
//!
//! // Timer interrupt, period = constraints.tick_period_us
//! link.on_tick();
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `alloc`: Enables heap allocation for no_std with allocator
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Core modules
pub mod config;
pub mod controller;
pub mod driver;
pub mod error;
pub mod executor;
pub mod protocol;
pub mod queue;

// Re-exports for ergonomic API
pub use config::{validate_config, LinkConfig, TimingConfig, TimingConstraints};
pub use controller::LinkController;
pub use driver::{AxisDriver, DriverError, StepDirPins};
pub use error::{Error, Result};
pub use executor::{ExecutorState, MotionExecutor, PulseTrain, TickEvent};
pub use protocol::{
    Axis, DirState, DispatchKind, Message, Move, PwmWindow, ReasonCode,
};
pub use queue::{MoveQueue, DEFAULT_QUEUE_DEPTH};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};
