//! Bounded FIFO of decoded moves awaiting execution.
//!
//! The queue is a fixed-capacity ring: enqueue on a full queue is a
//! rejection, never a block, because the controller is single-threaded
//! and must keep servicing the transport. A flush marks the queue as
//! closed to new entries while the existing entries drain normally.

use heapless::Deque;

use crate::error::MoveRejected;
use crate::protocol::Move;

/// Default number of queue slots.
pub const DEFAULT_QUEUE_DEPTH: usize = 16;

/// Bounded FIFO holding scheduled moves, with flush bookkeeping.
#[derive(Debug, Default)]
pub struct MoveQueue<const N: usize = DEFAULT_QUEUE_DEPTH> {
    slots: Deque<Move, N>,
    flushing: bool,
}

impl<const N: usize> MoveQueue<N> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            slots: Deque::new(),
            flushing: false,
        }
    }

    /// Append a move, failing without side effects if the queue is full
    /// or closed by a pending flush.
    pub fn enqueue(&mut self, mv: Move) -> Result<(), MoveRejected> {
        if self.flushing {
            return Err(MoveRejected::FlushInProgress);
        }
        self.slots.push_back(mv).map_err(|_| MoveRejected::QueueFull)
    }

    /// Pop the oldest move, if any.
    ///
    /// Dequeue stays available during a flush so the drain proceeds.
    pub fn dequeue(&mut self) -> Option<Move> {
        self.slots.pop_front()
    }

    /// Number of queued moves.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the queue holds no moves.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether every slot is occupied.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.slots.is_full()
    }

    /// Total slot count.
    #[inline]
    pub fn capacity(&self) -> usize {
        N
    }

    /// Close the queue to new entries until [`MoveQueue::end_flush`].
    pub fn begin_flush(&mut self) {
        self.flushing = true;
    }

    /// Reopen the queue once the drain has completed.
    pub fn end_flush(&mut self) {
        self.flushing = false;
    }

    /// Whether a flush is pending.
    #[inline]
    pub fn is_flushing(&self) -> bool {
        self.flushing
    }

    /// Drop all queued moves. Used when a drain aborts.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Axis, DirState, PwmWindow};

    fn window(duration_us: u32) -> Move {
        Move::ThreePwm(PwmWindow {
            duration_us,
            ticks_x: 1,
            ticks_y: 0,
            ticks_z: 0,
        })
    }

    #[test]
    fn fifo_order_preserved() {
        let mut queue: MoveQueue<8> = MoveQueue::new();
        for duration in 1..=5 {
            queue.enqueue(window(duration)).unwrap();
        }

        for duration in 1..=5 {
            assert_eq!(queue.dequeue(), Some(window(duration)));
        }
        assert_eq!(queue.dequeue(), None);
    }

    #[test]
    fn enqueue_on_full_queue_rejected_without_side_effects() {
        let mut queue: MoveQueue<4> = MoveQueue::new();
        for duration in 0..4 {
            queue.enqueue(window(duration)).unwrap();
        }
        assert!(queue.is_full());

        // The (C+1)-th enqueue never succeeds.
        assert_eq!(queue.enqueue(window(99)), Err(MoveRejected::QueueFull));
        assert_eq!(queue.len(), 4);
        assert_eq!(queue.dequeue(), Some(window(0)));
    }

    #[test]
    fn flush_blocks_enqueue_but_not_dequeue() {
        let mut queue: MoveQueue<4> = MoveQueue::new();
        queue
            .enqueue(Move::SetDirection {
                axis: Axis::X,
                state: DirState::Up,
            })
            .unwrap();

        queue.begin_flush();
        assert_eq!(queue.enqueue(window(1)), Err(MoveRejected::FlushInProgress));
        assert!(queue.dequeue().is_some());
        assert!(queue.is_empty());

        queue.end_flush();
        assert!(queue.enqueue(window(1)).is_ok());
    }

    #[test]
    fn clear_empties_without_reopening() {
        let mut queue: MoveQueue<4> = MoveQueue::new();
        queue.enqueue(window(1)).unwrap();
        queue.enqueue(window(2)).unwrap();
        queue.begin_flush();

        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.is_flushing());
    }
}
