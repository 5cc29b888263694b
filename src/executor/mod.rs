//! Motion executor for triaxis-link.
//!
//! A tick-driven state machine owning the single active-move slot. Each
//! tick advances the in-flight pulse train (or pulls the next move from
//! the queue) and reports completion, drain termination, and faults to
//! the caller. The executor never terminates; every failure returns it
//! to `Idle` ready for the next tick.

mod pulse;

pub use pulse::{PulseFault, PulseTrain};

use crate::config::TimingConstraints;
use crate::driver::AxisDriver;
use crate::error::{DrainFailure, MoveRejected};
use crate::protocol::{Move, ReasonCode};
use crate::queue::MoveQueue;

/// Observable executor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExecutorState {
    /// No active move; ready for immediate dispatch or a queue pull.
    Idle,
    /// A pulse train is mid-flight.
    RunningPwm,
    /// A flush is pending; the active move and queue drain to empty.
    Draining,
}

/// Outcome of one motion tick, when anything noteworthy happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickEvent {
    /// The active pulse window closed; all edges were emitted.
    MoveCompleted,
    /// The active move failed outside a drain.
    MoveFailed(MoveRejected),
    /// The drain reached an empty queue with the executor idle.
    DrainFinished,
    /// The drain aborted; the queue has been cleared.
    DrainFailed(DrainFailure),
}

/// The motion-execution scheduler.
///
/// Owns the active-move slot; the queue and axis driver are borrowed per
/// call so the controller keeps ownership of both.
#[derive(Debug)]
pub struct MotionExecutor {
    constraints: TimingConstraints,
    active: Option<PulseTrain>,
    draining: bool,
}

impl MotionExecutor {
    /// Create an idle executor.
    pub fn new(constraints: TimingConstraints) -> Self {
        Self {
            constraints,
            active: None,
            draining: false,
        }
    }

    /// Current state.
    pub fn state(&self) -> ExecutorState {
        if self.draining {
            ExecutorState::Draining
        } else if self.active.is_some() {
            ExecutorState::RunningPwm
        } else {
            ExecutorState::Idle
        }
    }

    /// Whether the active-move slot is empty.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// The in-flight pulse train, if any.
    #[inline]
    pub fn active(&self) -> Option<&PulseTrain> {
        self.active.as_ref()
    }

    /// The admission constraints in force.
    #[inline]
    pub fn constraints(&self) -> &TimingConstraints {
        &self.constraints
    }

    /// Execute a move ahead of the queue, as soon as decoded.
    ///
    /// A direction latch applies instantly, even while a train runs. A
    /// pulse window is admitted only when the active slot is empty; it is
    /// validated against the pulse-width invariant and never partially
    /// executed on rejection. Nothing is admitted during a drain.
    pub fn dispatch_immediate<D: AxisDriver>(
        &mut self,
        mv: Move,
        driver: &mut D,
    ) -> Result<(), MoveRejected> {
        if self.draining {
            return Err(MoveRejected::FlushInProgress);
        }

        match mv {
            Move::SetDirection { axis, state } => driver
                .set_direction(axis, state)
                .map_err(|_| MoveRejected::DriverFault),
            Move::ThreePwm(window) => {
                if self.active.is_some() {
                    return Err(MoveRejected::Busy);
                }
                self.constraints.admit(&window)?;
                self.active = Some(PulseTrain::new(window));
                Ok(())
            }
        }
    }

    /// Enter the draining state: the active move finishes, the queue
    /// empties, then the drain reports through [`TickEvent`].
    pub fn begin_drain(&mut self) {
        self.draining = true;
    }

    /// Leave the draining state once the drain has been reported.
    pub fn end_drain(&mut self) {
        self.draining = false;
    }

    /// Whether a drain is pending.
    #[inline]
    pub fn is_draining(&self) -> bool {
        self.draining
    }

    /// Advance the executor by one tick period Δ.
    ///
    /// With an active train: emit the edges due by the new elapsed time.
    /// When idle: pull one move from the queue. Returns an event when a
    /// window closes, a move fails, or a drain terminates.
    pub fn tick<D: AxisDriver, const N: usize>(
        &mut self,
        queue: &mut MoveQueue<N>,
        driver: &mut D,
    ) -> Option<TickEvent> {
        let delta_us = self.constraints.tick_period_us;

        if let Some(train) = self.active.as_mut() {
            let advanced = train.advance(delta_us, |axis| {
                driver.toggle_step(axis).map_err(|_| PulseFault)
            });

            match advanced {
                Ok(false) => return None,
                Ok(true) => {
                    self.active = None;
                    if self.draining && queue.is_empty() {
                        self.draining = false;
                        return Some(TickEvent::DrainFinished);
                    }
                    return Some(TickEvent::MoveCompleted);
                }
                Err(PulseFault) => {
                    self.active = None;
                    return Some(self.fault(queue));
                }
            }
        }

        // Idle: one queue pull per tick.
        match queue.dequeue() {
            Some(Move::SetDirection { axis, state }) => {
                if driver.set_direction(axis, state).is_err() {
                    return Some(self.fault(queue));
                }
            }
            Some(Move::ThreePwm(window)) => {
                // Scheduled windows were admitted at enqueue time.
                self.active = Some(PulseTrain::new(window));
                return None;
            }
            None => {}
        }

        if self.draining && queue.is_empty() {
            self.draining = false;
            return Some(TickEvent::DrainFinished);
        }

        None
    }

    fn fault<const N: usize>(&mut self, queue: &mut MoveQueue<N>) -> TickEvent {
        if self.draining {
            queue.clear();
            self.draining = false;
            TickEvent::DrainFailed(DrainFailure {
                reason: ReasonCode::DriverFault,
            })
        } else {
            TickEvent::MoveFailed(MoveRejected::DriverFault)
        }
    }
}
