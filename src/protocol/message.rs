//! Wire message and move command types.
//!
//! Every message variant maps 1:1 to a single-byte opcode with a fixed,
//! statically-sized payload layout. Multi-byte fields are little-endian u32.

/// Wire opcodes, one byte each.
///
/// `0x30` is a reserved decode-failure sentinel and is never emitted.
pub mod opcode {
    /// Reserved sentinel, never sent intentionally.
    pub const UNKNOWN: u8 = 0x30;
    /// Host liveness probe.
    pub const PING: u8 = 0x31;
    /// Reply to PING.
    pub const PONG: u8 = 0x32;
    /// Immediate synchronized pulse train (4x u32 payload).
    pub const THREE_PWM: u8 = 0x33;
    /// Scheduled synchronized pulse train (4x u32 payload).
    pub const THREE_PWM_SCHEDULED: u8 = 0x34;
    /// Immediate direction latch write (2x u32 payload).
    pub const SET_DIR: u8 = 0x36;
    /// Scheduled direction latch write (2x u32 payload).
    pub const SET_DIR_SCHEDULED: u8 = 0x37;
    /// Move rejection report (1-byte reason code).
    pub const THREE_PWM_ERROR: u8 = 0x38;
    /// Begin a queue flush.
    pub const FLUSH: u8 = 0x39;
    /// Flush acknowledged, drain in progress.
    pub const FLUSH_STARTED: u8 = 0x3a;
    /// Drain completed cleanly.
    pub const FLUSH_FINISHED: u8 = 0x3b;
    /// Drain aborted (1-byte reason code).
    pub const FLUSH_FAILED: u8 = 0x3c;
}

/// Largest encoded frame: opcode plus a 4x u32 payload.
pub const MAX_FRAME_LEN: usize = 1 + 4 * 4;

/// A motion axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    /// X axis (wire id 0).
    X,
    /// Y axis (wire id 1).
    Y,
    /// Z axis (wire id 2).
    Z,
}

impl Axis {
    /// All three axes, in wire-id order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Wire identifier (0, 1, 2).
    #[inline]
    pub const fn id(self) -> u32 {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Index into per-axis arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self.id() as usize
    }

    /// Parse a wire identifier.
    #[inline]
    pub const fn from_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(Axis::X),
            1 => Some(Axis::Y),
            2 => Some(Axis::Z),
            _ => None,
        }
    }
}

/// State of an axis direction latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DirState {
    /// Negative travel (wire value 0).
    Down,
    /// Positive travel (wire value 1).
    Up,
}

impl DirState {
    /// Wire value (0 or 1).
    #[inline]
    pub const fn value(self) -> u32 {
        match self {
            DirState::Down => 0,
            DirState::Up => 1,
        }
    }

    /// Parse a wire value.
    #[inline]
    pub const fn from_value(value: u32) -> Option<Self> {
        match value {
            0 => Some(DirState::Down),
            1 => Some(DirState::Up),
            _ => None,
        }
    }
}

/// Whether a move executes as soon as decoded or joins the FIFO queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchKind {
    /// Execute as soon as decoded, ahead of the queue.
    Immediate,
    /// Append to the move queue, execute in arrival order.
    Scheduled,
}

/// A synchronized pulse window across all three axes.
///
/// Within `duration_us`, each axis emits its tick count as evenly spaced
/// toggle edges, so all three stay phase-aligned to the shared window
/// regardless of differing counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmWindow {
    /// Window length in microseconds.
    pub duration_us: u32,
    /// Toggle edges to emit on X.
    pub ticks_x: u32,
    /// Toggle edges to emit on Y.
    pub ticks_y: u32,
    /// Toggle edges to emit on Z.
    pub ticks_z: u32,
}

impl PwmWindow {
    /// Tick count for one axis.
    #[inline]
    pub const fn ticks(&self, axis: Axis) -> u32 {
        match axis {
            Axis::X => self.ticks_x,
            Axis::Y => self.ticks_y,
            Axis::Z => self.ticks_z,
        }
    }

    /// Whether the window emits no edges at all (pure dwell).
    #[inline]
    pub const fn is_dwell(&self) -> bool {
        self.ticks_x == 0 && self.ticks_y == 0 && self.ticks_z == 0
    }
}

/// A command to the motion hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Move {
    /// Set one axis's direction latch; instantaneous, no duration.
    SetDirection {
        /// Axis whose latch is written.
        axis: Axis,
        /// New latch state.
        state: DirState,
    },
    /// Drive all three axes for one shared pulse window.
    ThreePwm(PwmWindow),
}

/// One-byte reason codes carried by `THREE_PWM_ERROR` and `FLUSH_FAILED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReasonCode {
    /// Requested tick density violates the minimum pulse width.
    PulseDensity,
    /// Move queue is at capacity.
    QueueFull,
    /// A flush is pending; no new moves are accepted.
    FlushInProgress,
    /// An axis pin driver reported a fault.
    DriverFault,
    /// An unrecognized opcode byte was discarded.
    UnknownOpcode,
    /// A pulse train is already in flight; the active slot is occupied.
    Busy,
}

impl ReasonCode {
    /// Wire value.
    #[inline]
    pub const fn value(self) -> u8 {
        match self {
            ReasonCode::PulseDensity => 0x01,
            ReasonCode::QueueFull => 0x02,
            ReasonCode::FlushInProgress => 0x03,
            ReasonCode::DriverFault => 0x04,
            ReasonCode::UnknownOpcode => 0x05,
            ReasonCode::Busy => 0x06,
        }
    }

    /// Parse a wire value.
    #[inline]
    pub const fn from_value(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(ReasonCode::PulseDensity),
            0x02 => Some(ReasonCode::QueueFull),
            0x03 => Some(ReasonCode::FlushInProgress),
            0x04 => Some(ReasonCode::DriverFault),
            0x05 => Some(ReasonCode::UnknownOpcode),
            0x06 => Some(ReasonCode::Busy),
            _ => None,
        }
    }
}

/// A typed wire message, sent or received over the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Message {
    /// Host liveness probe.
    Ping,
    /// Liveness reply.
    Pong,
    /// A move command with its dispatch kind.
    Move {
        /// Immediate or scheduled dispatch.
        kind: DispatchKind,
        /// The move itself.
        payload: Move,
    },
    /// A move was rejected at admission.
    MoveError(ReasonCode),
    /// Begin draining the queue; no new moves until the flush completes.
    Flush,
    /// Flush acknowledged; drain in progress.
    FlushStarted,
    /// Drain completed, queue empty, executor idle.
    FlushFinished,
    /// Drain aborted; queue cleared.
    FlushFailed(ReasonCode),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_ids_round_trip() {
        for axis in Axis::ALL {
            assert_eq!(Axis::from_id(axis.id()), Some(axis));
        }
        assert_eq!(Axis::from_id(3), None);
    }

    #[test]
    fn dir_state_values() {
        assert_eq!(DirState::Down.value(), 0);
        assert_eq!(DirState::Up.value(), 1);
        assert_eq!(DirState::from_value(2), None);
    }

    #[test]
    fn reason_codes_round_trip() {
        for code in [
            ReasonCode::PulseDensity,
            ReasonCode::QueueFull,
            ReasonCode::FlushInProgress,
            ReasonCode::DriverFault,
            ReasonCode::UnknownOpcode,
            ReasonCode::Busy,
        ] {
            assert_eq!(ReasonCode::from_value(code.value()), Some(code));
        }
        assert_eq!(ReasonCode::from_value(0x00), None);
    }

    #[test]
    fn dwell_window() {
        let dwell = PwmWindow {
            duration_us: 500,
            ticks_x: 0,
            ticks_y: 0,
            ticks_z: 0,
        };
        assert!(dwell.is_dwell());

        let moving = PwmWindow {
            ticks_y: 1,
            ..dwell
        };
        assert!(!moving.is_dwell());
    }
}
