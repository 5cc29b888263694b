//! Axis pin drivers.
//!
//! The executor talks to hardware through the [`AxisDriver`] seam: one
//! direction latch write and one step-edge toggle per axis. A concrete
//! implementation over embedded-hal 1.0 `OutputPin`s is provided.

use embedded_hal::digital::OutputPin;

use crate::protocol::{Axis, DirState};

/// An axis pin operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverError;

/// Per-axis step/direction output interface consumed by the executor.
pub trait AxisDriver {
    /// Write one axis's direction latch.
    fn set_direction(&mut self, axis: Axis, state: DirState) -> Result<(), DriverError>;

    /// Emit one toggle edge on an axis's step line.
    fn toggle_step(&mut self, axis: Axis) -> Result<(), DriverError>;
}

/// Step/direction driver over six embedded-hal output pins.
///
/// Tracks each step line's level so a toggle alternates high/low, and
/// caches direction latches to skip redundant pin writes.
pub struct StepDirPins<XS, XD, YS, YD, ZS, ZD>
where
    XS: OutputPin,
    XD: OutputPin,
    YS: OutputPin,
    YD: OutputPin,
    ZS: OutputPin,
    ZD: OutputPin,
{
    step_x: XS,
    dir_x: XD,
    step_y: YS,
    dir_y: YD,
    step_z: ZS,
    dir_z: ZD,

    /// Current level of each step line.
    step_level: [bool; 3],

    /// Last written latch state per axis, to avoid redundant writes.
    dir_state: [Option<DirState>; 3],

    /// Per-axis direction polarity inversion.
    invert_dir: [bool; 3],
}

impl<XS, XD, YS, YD, ZS, ZD> StepDirPins<XS, XD, YS, YD, ZS, ZD>
where
    XS: OutputPin,
    XD: OutputPin,
    YS: OutputPin,
    YD: OutputPin,
    ZS: OutputPin,
    ZD: OutputPin,
{
    /// Create a driver from step and direction pins, X, Y, Z order.
    pub fn new(step_x: XS, dir_x: XD, step_y: YS, dir_y: YD, step_z: ZS, dir_z: ZD) -> Self {
        Self {
            step_x,
            dir_x,
            step_y,
            dir_y,
            step_z,
            dir_z,
            step_level: [false; 3],
            dir_state: [None; 3],
            invert_dir: [false; 3],
        }
    }

    /// Invert the direction pin polarity of one axis.
    pub fn invert_direction(mut self, axis: Axis) -> Self {
        self.invert_dir[axis.index()] = true;
        self
    }

    // Each pin has its own error type; unify per arm.
    fn write_dir(&mut self, axis: Axis, high: bool) -> Result<(), DriverError> {
        match axis {
            Axis::X => write_level(&mut self.dir_x, high).map_err(|_| DriverError),
            Axis::Y => write_level(&mut self.dir_y, high).map_err(|_| DriverError),
            Axis::Z => write_level(&mut self.dir_z, high).map_err(|_| DriverError),
        }
    }

    fn write_step(&mut self, axis: Axis, high: bool) -> Result<(), DriverError> {
        match axis {
            Axis::X => write_level(&mut self.step_x, high).map_err(|_| DriverError),
            Axis::Y => write_level(&mut self.step_y, high).map_err(|_| DriverError),
            Axis::Z => write_level(&mut self.step_z, high).map_err(|_| DriverError),
        }
    }
}

fn write_level<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), P::Error> {
    if high {
        pin.set_high()
    } else {
        pin.set_low()
    }
}

impl<XS, XD, YS, YD, ZS, ZD> AxisDriver for StepDirPins<XS, XD, YS, YD, ZS, ZD>
where
    XS: OutputPin,
    XD: OutputPin,
    YS: OutputPin,
    YD: OutputPin,
    ZS: OutputPin,
    ZD: OutputPin,
{
    fn set_direction(&mut self, axis: Axis, state: DirState) -> Result<(), DriverError> {
        if self.dir_state[axis.index()] == Some(state) {
            return Ok(());
        }

        let high = matches!(state, DirState::Up) != self.invert_dir[axis.index()];
        self.write_dir(axis, high)?;
        self.dir_state[axis.index()] = Some(state);
        Ok(())
    }

    fn toggle_step(&mut self, axis: Axis) -> Result<(), DriverError> {
        let next = !self.step_level[axis.index()];
        self.write_step(axis, next)?;
        self.step_level[axis.index()] = next;
        Ok(())
    }
}
