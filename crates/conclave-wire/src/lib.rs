//! # conclave-wire: peer wire protocol
//!
//! This crate defines the messages exchanged between quorum replicas and the
//! frame codec that carries them over a byte stream.
//!
//! Every peer connection is a sequence of frames: a `u32` little-endian
//! length prefix followed by a [`postcard`]-encoded [`PeerRequest`] (inbound)
//! or [`PeerReply`] (outbound). The message union is tagged by
//! [`MessageKind`], which the dispatcher routes on without interpreting the
//! payload.

mod error;
mod frame;
mod message;

pub use error::{WireError, WireResult};
pub use frame::{DEFAULT_MAX_FRAME_BYTES, FRAME_HEADER_SIZE, FrameReader, FrameWriter};
pub use message::{
    AppendReply, AppendRequest, BeaconReply, BeaconRequest, MessageKind, PeerReply, PeerRequest,
    ProposeReply, ProposeRequest, ReplyPayload, VoteReply, VoteRequest,
};
