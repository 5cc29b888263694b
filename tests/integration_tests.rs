//! Integration tests for triaxis-link.
//!
//! These tests drive the complete path: host bytes in, decoded dispatch,
//! tick-driven execution against a recording driver, and encoded replies
//! back out.

use triaxis_link::protocol::{codec, opcode};
use triaxis_link::{
    Axis, DirState, DispatchKind, DriverError, LinkController, Message, Move, PwmWindow,
    ReasonCode, TimingConstraints,
};

// =============================================================================
// Test driver: records latch writes and toggle edges
// =============================================================================

#[derive(Debug, Default)]
struct TraceDriver {
    toggles: [u32; 3],
    directions: Vec<(Axis, DirState)>,
    fail_toggle: bool,
}

impl triaxis_link::AxisDriver for TraceDriver {
    fn set_direction(&mut self, axis: Axis, state: DirState) -> Result<(), DriverError> {
        self.directions.push((axis, state));
        Ok(())
    }

    fn toggle_step(&mut self, axis: Axis) -> Result<(), DriverError> {
        if self.fail_toggle {
            return Err(DriverError);
        }
        self.toggles[axis.index()] += 1;
        Ok(())
    }
}

// Δ = 100 us, minimum pulse width 5 us.
fn controller() -> LinkController<TraceDriver> {
    LinkController::new(TraceDriver::default(), TimingConstraints::new(100, 5))
}

fn send(link: &mut LinkController<TraceDriver>, message: Message) {
    link.on_bytes(&codec::encode_to_vec(&message));
}

fn replies<const QUEUE_DEPTH: usize>(
    link: &mut LinkController<TraceDriver, QUEUE_DEPTH>,
) -> Vec<Message> {
    let bytes = link.take_tx();
    let mut out = Vec::new();
    let mut rest: &[u8] = &bytes;
    while !rest.is_empty() {
        let (message, consumed) = codec::decode(rest).expect("reply stream is well-formed");
        out.push(message);
        rest = &rest[consumed..];
    }
    out
}

fn pwm(duration_us: u32, ticks_x: u32, ticks_y: u32, ticks_z: u32) -> Move {
    Move::ThreePwm(PwmWindow {
        duration_us,
        ticks_x,
        ticks_y,
        ticks_z,
    })
}

fn scheduled(payload: Move) -> Message {
    Message::Move {
        kind: DispatchKind::Scheduled,
        payload,
    }
}

fn immediate(payload: Move) -> Message {
    Message::Move {
        kind: DispatchKind::Immediate,
        payload,
    }
}

// =============================================================================
// Liveness and framing
// =============================================================================

#[test]
fn ping_yields_pong() {
    let mut link = controller();
    send(&mut link, Message::Ping);
    assert_eq!(replies(&mut link), vec![Message::Pong]);
}

#[test]
fn split_frame_reassembled_across_polls() {
    let mut link = controller();
    let frame = codec::encode_to_vec(&scheduled(pwm(1000, 4, 2, 0)));

    // One byte per poll: nothing dispatches until the frame closes.
    for &byte in frame.iter() {
        link.on_bytes(&[byte]);
    }

    assert_eq!(link.queue_len(), 1);
    assert!(replies(&mut link).is_empty());
}

#[test]
fn garbage_byte_reported_and_resynced() {
    let mut link = controller();

    let mut stream = vec![0x00, 0xff];
    stream.extend_from_slice(&codec::encode_to_vec(&Message::Ping));
    link.on_bytes(&stream);

    assert_eq!(
        replies(&mut link),
        vec![
            Message::MoveError(ReasonCode::UnknownOpcode),
            Message::MoveError(ReasonCode::UnknownOpcode),
            Message::Pong,
        ]
    );
}

#[test]
fn reserved_sentinel_opcode_rejected() {
    let mut link = controller();
    link.on_bytes(&[opcode::UNKNOWN]);
    assert_eq!(
        replies(&mut link),
        vec![Message::MoveError(ReasonCode::UnknownOpcode)]
    );
}

// =============================================================================
// Move execution
// =============================================================================

#[test]
fn immediate_window_emits_exact_toggle_totals() {
    let mut link = controller();
    send(&mut link, immediate(pwm(1000, 4, 2, 0)));
    assert!(replies(&mut link).is_empty());

    for _ in 0..10 {
        link.on_tick();
    }

    assert_eq!(link.driver().toggles, [4, 2, 0]);
    assert_eq!(
        link.executor_state(),
        triaxis_link::ExecutorState::Idle
    );
}

#[test]
fn scheduled_moves_execute_in_fifo_order() {
    let mut link = controller();
    send(
        &mut link,
        scheduled(Move::SetDirection {
            axis: Axis::X,
            state: DirState::Up,
        }),
    );
    send(&mut link, scheduled(pwm(500, 3, 0, 0)));
    send(
        &mut link,
        scheduled(Move::SetDirection {
            axis: Axis::X,
            state: DirState::Down,
        }),
    );
    assert_eq!(link.queue_len(), 3);

    for _ in 0..10 {
        link.on_tick();
    }

    assert_eq!(link.queue_len(), 0);
    assert_eq!(
        link.driver().directions,
        vec![(Axis::X, DirState::Up), (Axis::X, DirState::Down)]
    );
    assert_eq!(link.driver().toggles, [3, 0, 0]);
    assert!(replies(&mut link).is_empty());
}

#[test]
fn immediate_latch_write_leaves_queue_untouched() {
    let mut link = controller();
    for duration in [300, 400, 500] {
        send(&mut link, scheduled(pwm(duration, 1, 0, 0)));
    }
    assert_eq!(link.queue_len(), 3);

    send(
        &mut link,
        immediate(Move::SetDirection {
            axis: Axis::X,
            state: DirState::Up,
        }),
    );

    // The latch applied instantly, before any tick, queue intact.
    assert_eq!(link.driver().directions, vec![(Axis::X, DirState::Up)]);
    assert_eq!(link.queue_len(), 3);
    assert!(replies(&mut link).is_empty());
}

#[test]
fn dense_window_rejected_not_enqueued() {
    let mut link = controller();
    // max ticks for 100 us at 5 us pulse width is 10
    send(&mut link, scheduled(pwm(100, 0, 11, 0)));

    assert_eq!(
        replies(&mut link),
        vec![Message::MoveError(ReasonCode::PulseDensity)]
    );
    assert_eq!(link.queue_len(), 0);
}

#[test]
fn immediate_window_while_busy_rejected() {
    let mut link = controller();
    send(&mut link, immediate(pwm(1000, 4, 0, 0)));
    send(&mut link, immediate(pwm(1000, 4, 0, 0)));

    assert_eq!(
        replies(&mut link),
        vec![Message::MoveError(ReasonCode::Busy)]
    );
}

#[test]
fn queue_overflow_rejected_without_losing_entries() {
    let mut link: LinkController<TraceDriver, 4> =
        LinkController::new(TraceDriver::default(), TimingConstraints::new(100, 5));

    for duration in [100, 200, 300, 400] {
        link.on_bytes(&codec::encode_to_vec(&scheduled(pwm(duration, 1, 0, 0))));
    }
    assert!(replies(&mut link).is_empty());
    assert_eq!(link.queue_len(), 4);

    // The (C+1)-th enqueue never succeeds.
    link.on_bytes(&codec::encode_to_vec(&scheduled(pwm(999, 1, 0, 0))));
    assert_eq!(
        replies(&mut link),
        vec![Message::MoveError(ReasonCode::QueueFull)]
    );
    assert_eq!(link.queue_len(), 4);
}

// =============================================================================
// Flush protocol
// =============================================================================

#[test]
fn flush_on_idle_link_finishes_immediately() {
    let mut link = controller();
    send(&mut link, Message::Flush);
    assert_eq!(
        replies(&mut link),
        vec![Message::FlushStarted, Message::FlushFinished]
    );
    assert!(!link.is_flushing());
}

#[test]
fn flush_drains_active_and_queued_moves() {
    let mut link = controller();
    send(&mut link, immediate(pwm(500, 2, 0, 0)));
    send(&mut link, scheduled(pwm(500, 0, 2, 0)));
    send(&mut link, Message::Flush);

    assert_eq!(replies(&mut link), vec![Message::FlushStarted]);
    assert!(link.is_flushing());

    // No scheduled enqueue succeeds between FLUSH_STARTED and the
    // terminal reply.
    send(&mut link, scheduled(pwm(100, 1, 0, 0)));
    assert_eq!(
        replies(&mut link),
        vec![Message::MoveError(ReasonCode::FlushInProgress)]
    );

    let mut terminal = Vec::new();
    for _ in 0..20 {
        link.on_tick();
        terminal.extend(replies(&mut link));
    }

    assert_eq!(terminal, vec![Message::FlushFinished]);
    assert!(!link.is_flushing());
    assert_eq!(link.driver().toggles, [2, 2, 0]);

    // Intake resumes after the terminal reply.
    send(&mut link, scheduled(pwm(100, 1, 0, 0)));
    assert!(replies(&mut link).is_empty());
    assert_eq!(link.queue_len(), 1);
}

#[test]
fn reply_pressure_never_drops_flush_acks() {
    let mut link = controller();

    // A long undecodable burst produces one error reply per byte, far
    // more than the reply buffer holds at once; the flush frame at the
    // end must still be acknowledged.
    let mut stream = vec![0x00u8; 100];
    stream.extend_from_slice(&codec::encode_to_vec(&Message::Flush));

    let mut got = Vec::new();
    let mut offset = 0;
    while offset < stream.len() {
        let accepted = link.on_bytes(&stream[offset..]);
        got.extend(replies(&mut link));
        offset += accepted;
    }
    got.extend(replies(&mut link));

    let count = |needle: Message| got.iter().filter(|m| **m == needle).count();
    assert_eq!(count(Message::MoveError(ReasonCode::UnknownOpcode)), 100);
    assert_eq!(count(Message::FlushStarted), 1);
    assert_eq!(count(Message::FlushFinished), 1);
    assert!(!link.is_flushing());
}

#[test]
fn duplicate_flush_mid_drain_gets_one_terminal_reply() {
    let mut link = controller();
    send(&mut link, immediate(pwm(500, 2, 0, 0)));
    send(&mut link, Message::Flush);
    send(&mut link, Message::Flush);

    assert_eq!(replies(&mut link), vec![Message::FlushStarted]);

    let mut terminal = Vec::new();
    for _ in 0..10 {
        link.on_tick();
        terminal.extend(replies(&mut link));
    }

    assert_eq!(terminal, vec![Message::FlushFinished]);
    assert!(!link.is_flushing());
}

#[test]
fn immediate_moves_rejected_during_flush() {
    let mut link = controller();
    send(&mut link, immediate(pwm(500, 2, 0, 0)));
    send(&mut link, Message::Flush);
    let _ = replies(&mut link);

    send(
        &mut link,
        immediate(Move::SetDirection {
            axis: Axis::Y,
            state: DirState::Up,
        }),
    );
    assert_eq!(
        replies(&mut link),
        vec![Message::MoveError(ReasonCode::FlushInProgress)]
    );
}

#[test]
fn driver_fault_during_flush_reports_failure_and_clears() {
    let mut link = controller();
    send(&mut link, immediate(pwm(500, 2, 0, 0)));
    send(&mut link, scheduled(pwm(500, 2, 0, 0)));
    send(&mut link, Message::Flush);
    let _ = replies(&mut link);

    // Fault the step pins mid-drain; the next due edge fails.
    // (The trace driver faults on every toggle from now on.)
    fault_driver(&mut link);

    let mut terminal = Vec::new();
    for _ in 0..20 {
        link.on_tick();
        terminal.extend(replies(&mut link));
    }

    assert_eq!(
        terminal,
        vec![Message::FlushFailed(ReasonCode::DriverFault)]
    );
    assert_eq!(link.queue_len(), 0);
    assert!(!link.is_flushing());
    assert_eq!(
        link.executor_state(),
        triaxis_link::ExecutorState::Idle
    );
}

fn fault_driver(link: &mut LinkController<TraceDriver>) {
    link.driver_mut().fail_toggle = true;
}

// =============================================================================
// Worked example: 1000 us window, 4/2/0 ticks, Δ = 100 us
// =============================================================================

#[test]
fn worked_example_tick_by_tick() {
    let mut link = controller();
    send(&mut link, immediate(pwm(1000, 4, 2, 0)));

    // Expected cumulative (x, y, z) toggle counts after each tick:
    // ideal X edges at 125/375/625/875 us land on ticks 2, 4, 7, 9;
    // ideal Y edges at 250/750 us land on ticks 3 and 8.
    let expected = [
        [0, 0, 0], // 100 us
        [1, 0, 0], // 200 us
        [1, 1, 0], // 300 us
        [2, 1, 0], // 400 us
        [2, 1, 0], // 500 us
        [2, 1, 0], // 600 us
        [3, 1, 0], // 700 us
        [3, 2, 0], // 800 us
        [4, 2, 0], // 900 us
        [4, 2, 0], // 1000 us
    ];

    for (tick, want) in expected.iter().enumerate() {
        link.on_tick();
        assert_eq!(&link.driver().toggles, want, "after tick {}", tick + 1);
    }

    assert_eq!(
        link.executor_state(),
        triaxis_link::ExecutorState::Idle
    );
}
