//! Wire codec: exact framing of transport bytes into [`Message`] values.
//!
//! The opcode byte selects a known, statically-sized payload layout, so a
//! decode consumes exactly the bytes of one frame. A truncated frame is
//! [`DecodeError::Incomplete`] (wait for more bytes); an unrecognized
//! opcode is [`DecodeError::UnknownOpcode`] and consumes nothing, leaving
//! resynchronization policy to the caller.

use heapless::Vec;

use crate::error::DecodeError;

use super::message::{
    opcode, Axis, DirState, DispatchKind, Message, Move, PwmWindow, ReasonCode, MAX_FRAME_LEN,
};

/// Decode one message from the front of `bytes`.
///
/// Returns the message and the number of bytes consumed. The caller keeps
/// any remaining bytes for the next decode.
pub fn decode(bytes: &[u8]) -> Result<(Message, usize), DecodeError> {
    let op = *bytes.first().ok_or(DecodeError::Incomplete)?;

    match op {
        opcode::PING => Ok((Message::Ping, 1)),
        opcode::PONG => Ok((Message::Pong, 1)),
        opcode::FLUSH => Ok((Message::Flush, 1)),
        opcode::FLUSH_STARTED => Ok((Message::FlushStarted, 1)),
        opcode::FLUSH_FINISHED => Ok((Message::FlushFinished, 1)),
        opcode::THREE_PWM | opcode::THREE_PWM_SCHEDULED => {
            let kind = dispatch_kind(op == opcode::THREE_PWM);
            let payload = &bytes[1..];
            let window = PwmWindow {
                duration_us: read_u32(payload, 0)?,
                ticks_x: read_u32(payload, 4)?,
                ticks_y: read_u32(payload, 8)?,
                ticks_z: read_u32(payload, 12)?,
            };
            Ok((
                Message::Move {
                    kind,
                    payload: Move::ThreePwm(window),
                },
                1 + 16,
            ))
        }
        opcode::SET_DIR | opcode::SET_DIR_SCHEDULED => {
            let kind = dispatch_kind(op == opcode::SET_DIR);
            let payload = &bytes[1..];
            let axis_id = read_u32(payload, 0)?;
            let dir_state = read_u32(payload, 4)?;
            let axis = Axis::from_id(axis_id).ok_or(DecodeError::InvalidField)?;
            let state = DirState::from_value(dir_state).ok_or(DecodeError::InvalidField)?;
            Ok((
                Message::Move {
                    kind,
                    payload: Move::SetDirection { axis, state },
                },
                1 + 8,
            ))
        }
        opcode::THREE_PWM_ERROR => {
            let reason = read_reason(bytes)?;
            Ok((Message::MoveError(reason), 2))
        }
        opcode::FLUSH_FAILED => {
            let reason = read_reason(bytes)?;
            Ok((Message::FlushFailed(reason), 2))
        }
        other => Err(DecodeError::UnknownOpcode(other)),
    }
}

/// Encode a message into `buf`, returning the number of bytes written.
pub fn encode(message: &Message, buf: &mut [u8]) -> Result<usize, DecodeError> {
    let mut frame = [0u8; MAX_FRAME_LEN];
    let len = match message {
        Message::Ping => put_opcode(&mut frame, opcode::PING),
        Message::Pong => put_opcode(&mut frame, opcode::PONG),
        Message::Flush => put_opcode(&mut frame, opcode::FLUSH),
        Message::FlushStarted => put_opcode(&mut frame, opcode::FLUSH_STARTED),
        Message::FlushFinished => put_opcode(&mut frame, opcode::FLUSH_FINISHED),
        Message::MoveError(reason) => put_reason(&mut frame, opcode::THREE_PWM_ERROR, *reason),
        Message::FlushFailed(reason) => put_reason(&mut frame, opcode::FLUSH_FAILED, *reason),
        Message::Move { kind, payload } => match payload {
            Move::ThreePwm(window) => {
                frame[0] = match kind {
                    DispatchKind::Immediate => opcode::THREE_PWM,
                    DispatchKind::Scheduled => opcode::THREE_PWM_SCHEDULED,
                };
                frame[1..5].copy_from_slice(&window.duration_us.to_le_bytes());
                frame[5..9].copy_from_slice(&window.ticks_x.to_le_bytes());
                frame[9..13].copy_from_slice(&window.ticks_y.to_le_bytes());
                frame[13..17].copy_from_slice(&window.ticks_z.to_le_bytes());
                17
            }
            Move::SetDirection { axis, state } => {
                frame[0] = match kind {
                    DispatchKind::Immediate => opcode::SET_DIR,
                    DispatchKind::Scheduled => opcode::SET_DIR_SCHEDULED,
                };
                frame[1..5].copy_from_slice(&axis.id().to_le_bytes());
                frame[5..9].copy_from_slice(&state.value().to_le_bytes());
                9
            }
        },
    };

    if buf.len() < len {
        return Err(DecodeError::BufferTooSmall);
    }
    buf[..len].copy_from_slice(&frame[..len]);
    Ok(len)
}

/// Encode a message into a heapless Vec.
pub fn encode_to_vec(message: &Message) -> Vec<u8, MAX_FRAME_LEN> {
    let mut buf = [0u8; MAX_FRAME_LEN];
    // A MAX_FRAME_LEN buffer fits every variant.
    let len = match encode(message, &mut buf) {
        Ok(len) => len,
        Err(_) => 0,
    };
    let mut vec = Vec::new();
    let _ = vec.extend_from_slice(&buf[..len]);
    vec
}

#[inline]
fn dispatch_kind(immediate: bool) -> DispatchKind {
    if immediate {
        DispatchKind::Immediate
    } else {
        DispatchKind::Scheduled
    }
}

#[inline]
fn read_u32(payload: &[u8], offset: usize) -> Result<u32, DecodeError> {
    let end = offset + 4;
    if payload.len() < end {
        return Err(DecodeError::Incomplete);
    }
    let mut le = [0u8; 4];
    le.copy_from_slice(&payload[offset..end]);
    Ok(u32::from_le_bytes(le))
}

#[inline]
fn read_reason(bytes: &[u8]) -> Result<ReasonCode, DecodeError> {
    let raw = *bytes.get(1).ok_or(DecodeError::Incomplete)?;
    ReasonCode::from_value(raw).ok_or(DecodeError::InvalidField)
}

#[inline]
fn put_opcode(frame: &mut [u8; MAX_FRAME_LEN], op: u8) -> usize {
    frame[0] = op;
    1
}

#[inline]
fn put_reason(frame: &mut [u8; MAX_FRAME_LEN], op: u8, reason: ReasonCode) -> usize {
    frame[0] = op;
    frame[1] = reason.value();
    2
}
