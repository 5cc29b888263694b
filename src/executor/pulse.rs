//! Pulse train progress tracking.
//!
//! A [`PulseTrain`] is the in-flight form of a `ThreePwm` window: elapsed
//! time plus per-axis emitted-edge counts. Edges are scheduled by centered
//! even spacing: edge `i` of `n` is due at `(2i + 1) * duration / (2n)`,
//! so the due count at any elapsed time is recomputed from absolute time
//! rather than accumulated, keeping all three axes phase-aligned to the
//! shared window and self-correcting against tick-period jitter.

use crate::protocol::{Axis, PwmWindow};

/// Runtime state of an in-flight pulse window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseTrain {
    /// The window being executed.
    window: PwmWindow,

    /// Microseconds elapsed since the window opened.
    elapsed_us: u32,

    /// Toggle edges already emitted per axis (X, Y, Z).
    emitted: [u32; 3],
}

impl PulseTrain {
    /// Open a window with no elapsed time.
    pub fn new(window: PwmWindow) -> Self {
        Self {
            window,
            elapsed_us: 0,
            emitted: [0; 3],
        }
    }

    /// The window under execution.
    #[inline]
    pub fn window(&self) -> &PwmWindow {
        &self.window
    }

    /// Microseconds elapsed so far.
    #[inline]
    pub fn elapsed_us(&self) -> u32 {
        self.elapsed_us
    }

    /// Edges emitted so far on one axis.
    #[inline]
    pub fn emitted(&self, axis: Axis) -> u32 {
        self.emitted[axis.index()]
    }

    /// Whether the window has closed and all edges are out.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.elapsed_us >= self.window.duration_us
    }

    /// Number of edges due on `axis` once `elapsed_us` has passed.
    ///
    /// Monotonic in elapsed time, clamped to the axis target, and equal
    /// to the target exactly when the window closes.
    pub fn edges_due(&self, axis: Axis, elapsed_us: u32) -> u32 {
        let ticks = self.window.ticks(axis);
        let duration = self.window.duration_us;
        if ticks == 0 || duration == 0 {
            return if duration == 0 { ticks } else { 0 };
        }
        if elapsed_us >= duration {
            return ticks;
        }

        // Centered spacing: edge i due at (2i + 1) * duration / (2 * ticks).
        let due = (2 * ticks as u64 * elapsed_us as u64 + duration as u64) / (2 * duration as u64);
        due as u32
    }

    /// Advance the window by `delta_us`, emitting newly due edges through
    /// `emit`. Returns `true` once the window has closed.
    ///
    /// The due count is O(1) to compute; `emit` is called once per edge
    /// that became due during this tick.
    pub fn advance<E>(&mut self, delta_us: u32, mut emit: E) -> Result<bool, PulseFault>
    where
        E: FnMut(Axis) -> Result<(), PulseFault>,
    {
        let elapsed = self.elapsed_us.saturating_add(delta_us);

        for axis in Axis::ALL {
            let due = self.edges_due(axis, elapsed);
            while self.emitted[axis.index()] < due {
                emit(axis)?;
                self.emitted[axis.index()] += 1;
            }
        }

        self.elapsed_us = elapsed;
        Ok(self.is_complete())
    }
}

/// An edge could not be emitted; the axis driver faulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseFault;
