//! Error types for triaxis-link.
//!
//! Provides unified error handling across framing, move admission,
//! flush draining, and configuration.

use core::fmt;

use crate::protocol::ReasonCode;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all triaxis-link operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Framing-layer failure while decoding or encoding wire bytes
    Decode(DecodeError),
    /// A move was refused at admission
    Move(MoveRejected),
    /// A flush drain was aborted
    Drain(DrainFailure),
    /// Configuration parsing or validation error
    Config(ConfigError),
}

/// Framing-layer errors.
///
/// `Incomplete` is a wait state, not a fault: the caller retries once
/// more transport bytes arrive. Everything else is malformed data and
/// may trigger byte-level resynchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// The frame is truncated; wait for more bytes.
    Incomplete,
    /// The opcode byte selects no known payload layout.
    UnknownOpcode(u8),
    /// A payload field holds an out-of-range value (axis id or
    /// direction state).
    InvalidField,
    /// The output buffer is too small for the encoded frame.
    BufferTooSmall,
}

/// Move admission errors, always reported to the host and never
/// silently dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MoveRejected {
    /// Requested tick density exceeds the hardware pulse-width limit.
    InvalidPulseDensity {
        /// Offending axis tick count.
        ticks: u32,
        /// Window length in microseconds.
        duration_us: u32,
    },
    /// The move queue is at capacity.
    QueueFull,
    /// A flush is pending; enqueue again after the terminal flush reply.
    FlushInProgress,
    /// A pulse train is already occupying the active-move slot.
    Busy,
    /// An axis pin driver failed.
    DriverFault,
}

impl MoveRejected {
    /// The wire reason code reported for this rejection.
    pub const fn reason(self) -> ReasonCode {
        match self {
            MoveRejected::InvalidPulseDensity { .. } => ReasonCode::PulseDensity,
            MoveRejected::QueueFull => ReasonCode::QueueFull,
            MoveRejected::FlushInProgress => ReasonCode::FlushInProgress,
            MoveRejected::Busy => ReasonCode::Busy,
            MoveRejected::DriverFault => ReasonCode::DriverFault,
        }
    }
}

/// A flush drain aborted before the queue emptied cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DrainFailure {
    /// The wire reason code reported via `FLUSH_FAILED`.
    pub reason: ReasonCode,
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Tick period must be non-zero
    InvalidTickPeriod(u32),
    /// Minimum pulse width must be non-zero
    InvalidPulseWidth(u32),
    /// Tick period shorter than the minimum pulse width cannot host a
    /// full edge pair
    TickShorterThanPulse {
        /// Configured tick period in microseconds.
        tick_period_us: u32,
        /// Configured minimum pulse width in microseconds.
        min_pulse_width_us: u32,
    },
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Decode(e) => write!(f, "Decode error: {}", e),
            Error::Move(e) => write!(f, "Move rejected: {}", e),
            Error::Drain(e) => write!(f, "Drain failed: {}", e),
            Error::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Incomplete => write!(f, "frame truncated, need more bytes"),
            DecodeError::UnknownOpcode(op) => write!(f, "unknown opcode {:#04x}", op),
            DecodeError::InvalidField => write!(f, "payload field out of range"),
            DecodeError::BufferTooSmall => write!(f, "encode buffer too small"),
        }
    }
}

impl fmt::Display for MoveRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveRejected::InvalidPulseDensity { ticks, duration_us } => {
                write!(f, "{} ticks exceed pulse-width limit in {} us", ticks, duration_us)
            }
            MoveRejected::QueueFull => write!(f, "move queue full"),
            MoveRejected::FlushInProgress => write!(f, "flush in progress"),
            MoveRejected::Busy => write!(f, "pulse train already in flight"),
            MoveRejected::DriverFault => write!(f, "axis pin driver fault"),
        }
    }
}

impl fmt::Display for DrainFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "flush drain aborted, reason {:#04x}", self.reason.value())
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidTickPeriod(v) => {
                write!(f, "Invalid tick period: {}. Must be > 0", v)
            }
            ConfigError::InvalidPulseWidth(v) => {
                write!(f, "Invalid minimum pulse width: {}. Must be > 0", v)
            }
            ConfigError::TickShorterThanPulse {
                tick_period_us,
                min_pulse_width_us,
            } => write!(
                f,
                "Tick period {} us shorter than minimum pulse width {} us",
                tick_period_us, min_pulse_width_us
            ),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

// Conversion impls
impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Error::Decode(e)
    }
}

impl From<MoveRejected> for Error {
    fn from(e: MoveRejected) -> Self {
        Error::Move(e)
    }
}

impl From<DrainFailure> for Error {
    fn from(e: DrainFailure) -> Self {
        Error::Drain(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

#[cfg(feature = "std")]
impl std::error::Error for MoveRejected {}

#[cfg(feature = "std")]
impl std::error::Error for DrainFailure {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}
