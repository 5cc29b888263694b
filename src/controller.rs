//! Protocol controller: binds the codec to the queue and executor.
//!
//! Two entry points drive the controller, both from the same
//! single-threaded loop: [`LinkController::on_bytes`] for transport
//! arrivals and [`LinkController::on_tick`] for the periodic motion tick.
//! Replies accumulate in an internal buffer the caller hands to the
//! transport via [`LinkController::take_tx`]. No failure here is fatal:
//! every decode or admission problem becomes a reply message and the
//! loop keeps servicing bytes and ticks.

use heapless::Vec;

use crate::config::TimingConstraints;
use crate::driver::AxisDriver;
use crate::error::DecodeError;
use crate::executor::{ExecutorState, MotionExecutor, TickEvent};
use crate::protocol::{codec, DispatchKind, Message, Move, ReasonCode};
use crate::queue::{MoveQueue, DEFAULT_QUEUE_DEPTH};

/// Reassembly buffer size; holds several frames of leftover bytes.
const RX_BUFFER_LEN: usize = 64;

/// Reply buffer size; drained by the caller after each poll.
const TX_BUFFER_LEN: usize = 128;

/// Largest reply frame a single dispatched command can produce.
const REPLY_HEADROOM: usize = 2;

/// Tail bytes of the reply buffer reserved for the flush-protocol
/// acknowledgements, which must reach the host even under reply
/// pressure.
const FLUSH_REPLY_RESERVE: usize = 4;

/// Top-level dispatcher for the move protocol.
///
/// Owns the axis driver, the move queue, the executor, and the rx/tx
/// byte buffers. Generic over the driver and the queue depth.
pub struct LinkController<D: AxisDriver, const QUEUE_DEPTH: usize = DEFAULT_QUEUE_DEPTH> {
    driver: D,
    queue: MoveQueue<QUEUE_DEPTH>,
    executor: MotionExecutor,
    rx: Vec<u8, RX_BUFFER_LEN>,
    tx: Vec<u8, TX_BUFFER_LEN>,
}

impl<D: AxisDriver, const QUEUE_DEPTH: usize> LinkController<D, QUEUE_DEPTH> {
    /// Create a controller in the idle state.
    pub fn new(driver: D, constraints: TimingConstraints) -> Self {
        Self {
            driver,
            queue: MoveQueue::new(),
            executor: MotionExecutor::new(constraints),
            rx: Vec::new(),
            tx: Vec::new(),
        }
    }

    /// Feed bytes read from the transport, returning how many were
    /// accepted.
    ///
    /// Complete frames are dispatched as they appear; a trailing partial
    /// frame waits in the reassembly buffer for the next call. A byte
    /// that opens no known frame is reported and skipped, resynchronizing
    /// on the following byte.
    ///
    /// When the reply buffer has no room left for further reports, intake
    /// stops and the unaccepted tail is left with the caller: drain
    /// [`LinkController::take_tx`] and offer the remaining bytes again.
    /// No accepted byte and no reply is ever dropped.
    pub fn on_bytes(&mut self, bytes: &[u8]) -> usize {
        let mut accepted = 0;
        loop {
            let room = RX_BUFFER_LEN - self.rx.len();
            let take = room.min(bytes.len() - accepted);
            let _ = self.rx.extend_from_slice(&bytes[accepted..accepted + take]);
            accepted += take;

            let stalled = self.pump_rx();
            if stalled || accepted == bytes.len() || self.rx.is_full() {
                return accepted;
            }
        }
    }

    /// Advance the executor by one tick period Δ.
    pub fn on_tick(&mut self) {
        match self.executor.tick(&mut self.queue, &mut self.driver) {
            Some(TickEvent::DrainFinished) => {
                self.queue.end_flush();
                self.reply(Message::FlushFinished);
            }
            Some(TickEvent::DrainFailed(failure)) => {
                self.queue.end_flush();
                self.reply(Message::FlushFailed(failure.reason));
            }
            Some(TickEvent::MoveFailed(rejection)) => {
                self.reply(Message::MoveError(rejection.reason()));
            }
            Some(TickEvent::MoveCompleted) | None => {}
        }
    }

    /// Take the encoded replies accumulated so far.
    pub fn take_tx(&mut self) -> Vec<u8, TX_BUFFER_LEN> {
        core::mem::take(&mut self.tx)
    }

    /// Observable executor state.
    pub fn executor_state(&self) -> ExecutorState {
        self.executor.state()
    }

    /// Number of queued scheduled moves.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Whether a flush is pending.
    pub fn is_flushing(&self) -> bool {
        self.queue.is_flushing()
    }

    /// Borrow the axis driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Mutably borrow the axis driver.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Dispatch buffered frames. Returns `true` when decoding stalled on
    /// reply-buffer pressure rather than on a partial frame.
    fn pump_rx(&mut self) -> bool {
        while !self.rx.is_empty() {
            if self.tx.len() + REPLY_HEADROOM > TX_BUFFER_LEN - FLUSH_REPLY_RESERVE {
                return true;
            }
            match codec::decode(&self.rx) {
                Ok((message, consumed)) => {
                    self.consume_rx(consumed);
                    self.handle(message);
                }
                Err(DecodeError::Incomplete) => break,
                Err(_) => {
                    // Malformed frame: report, discard one byte, retry.
                    self.reply(Message::MoveError(ReasonCode::UnknownOpcode));
                    self.consume_rx(1);
                }
            }
        }
        false
    }

    fn handle(&mut self, message: Message) {
        match message {
            Message::Ping => self.reply(Message::Pong),
            Message::Move {
                kind: DispatchKind::Immediate,
                payload,
            } => {
                if let Err(rejection) = self.executor.dispatch_immediate(payload, &mut self.driver)
                {
                    self.reply(Message::MoveError(rejection.reason()));
                }
            }
            Message::Move {
                kind: DispatchKind::Scheduled,
                payload,
            } => {
                if let Err(rejection) = self.schedule(payload) {
                    self.reply(Message::MoveError(rejection));
                }
            }
            Message::Flush => {
                // A drain is already pending; one terminal reply answers
                // for both requests.
                if self.queue.is_flushing() {
                    return;
                }
                self.reply(Message::FlushStarted);
                self.queue.begin_flush();
                self.executor.begin_drain();

                // Nothing to drain: terminate the flush in the same poll.
                if self.executor.is_idle() && self.queue.is_empty() {
                    self.executor.end_drain();
                    self.queue.end_flush();
                    self.reply(Message::FlushFinished);
                }
            }
            // Host-bound replies arriving from the host are not part of
            // the device-bound protocol; drop them.
            Message::Pong
            | Message::MoveError(_)
            | Message::FlushStarted
            | Message::FlushFinished
            | Message::FlushFailed(_) => {}
        }
    }

    fn schedule(&mut self, payload: Move) -> Result<(), ReasonCode> {
        // Admission validation happens before the window reaches the
        // queue, so a dequeued window is always executable.
        if let Move::ThreePwm(window) = &payload {
            self.executor
                .constraints()
                .admit(window)
                .map_err(|rejection| rejection.reason())?;
        }

        self.queue
            .enqueue(payload)
            .map_err(|rejection| rejection.reason())
    }

    fn reply(&mut self, message: Message) {
        // Flush acknowledgements may use the reserved tail; everything
        // else is held off earlier by the intake gate in pump_rx.
        let limit = match message {
            Message::FlushStarted | Message::FlushFinished | Message::FlushFailed(_) => {
                TX_BUFFER_LEN
            }
            _ => TX_BUFFER_LEN - FLUSH_REPLY_RESERVE,
        };
        let encoded = codec::encode_to_vec(&message);
        if self.tx.len() + encoded.len() <= limit {
            let _ = self.tx.extend_from_slice(&encoded);
        }
    }

    fn consume_rx(&mut self, n: usize) {
        let len = self.rx.len();
        self.rx.copy_within(n..len, 0);
        self.rx.truncate(len - n);
    }
}
