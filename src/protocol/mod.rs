//! Protocol module for triaxis-link.
//!
//! Provides the typed wire messages and the byte-level codec.

pub mod codec;
mod message;

pub use codec::{decode, encode, encode_to_vec};
pub use message::{
    opcode, Axis, DirState, DispatchKind, Message, Move, PwmWindow, ReasonCode, MAX_FRAME_LEN,
};
