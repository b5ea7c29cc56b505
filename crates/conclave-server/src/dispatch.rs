//! Per-connection dispatch loop.
//!
//! One `StreamDispatcher` is created per accepted peer connection and runs
//! on that connection's thread. The loop is strictly sequential: receive a
//! message, route it by kind to a handler, send the reply, then receive the
//! next message. Message N+1 is never read before the reply for message N
//! has been fully written, so peers observe replies in exactly the order
//! their requests arrived -- an invariant most consensus protocols rely on.
//! The cost is explicit: a connection's throughput is bounded by handler
//! latency, with no pipelining. A future pipelined mode needs per-message
//! sequence numbers and peer-side reordering; it cannot simply parallelize
//! this loop.
//!
//! Any handler error, any send failure, and any receive failure other than
//! a clean close terminates the loop and tears the connection down. Other
//! connections are unaffected.

use std::net::{SocketAddr, TcpStream};

use conclave_wire::{FrameReader, FrameWriter, PeerReply, PeerRequest, ReplyPayload};
use tracing::trace;

use crate::error::{HandlerError, ServerResult};
use crate::replica::Replica;

/// Dispatch loop state for one peer connection.
///
/// Holds nothing beyond the framed stream halves and a handle to the owning
/// replica; dropped when the stream closes or errors.
pub(crate) struct StreamDispatcher {
    replica: Replica,
    reader: FrameReader<TcpStream>,
    writer: FrameWriter<TcpStream>,
    peer: SocketAddr,
}

impl StreamDispatcher {
    /// Binds a dispatcher to an accepted stream.
    pub(crate) fn new(replica: Replica, stream: TcpStream, peer: SocketAddr) -> ServerResult<Self> {
        let max_frame_bytes = replica.config().max_frame_bytes;
        let write_half = stream.try_clone()?;
        Ok(Self {
            replica,
            reader: FrameReader::new(stream, max_frame_bytes),
            writer: FrameWriter::new(write_half, max_frame_bytes),
            peer,
        })
    }

    /// Runs the receive → route → reply loop until the stream ends.
    ///
    /// Returns `Ok(())` on a clean close by the peer; any other exit is the
    /// error that killed the connection.
    pub(crate) fn run(mut self) -> ServerResult<()> {
        loop {
            let Some(request) = self.reader.read::<PeerRequest>()? else {
                return Ok(());
            };

            let kind = request.kind();
            trace!(peer = %self.peer, %kind, "message received");

            let reply = self.route(&request)?;
            self.writer.write(&reply)?;
            trace!(peer = %self.peer, %kind, "reply sent");
        }
    }

    /// Selects the handler for one message and produces its reply.
    ///
    /// The match is exhaustive over the message union: a kind without a
    /// real handler reaches the consensus trait's default body, which
    /// returns [`HandlerError::Unimplemented`] -- fatal, like every handler
    /// error.
    fn route(&self, request: &PeerRequest) -> Result<PeerReply, HandlerError> {
        let payload = match request {
            PeerRequest::Beacon(_) => ReplyPayload::Beacon(self.replica.beacon()),
            PeerRequest::Propose(req) => ReplyPayload::Propose(self.replica.propose(req)?),
            PeerRequest::Vote(req) => ReplyPayload::Vote(self.replica.consensus().vote(req)?),
            PeerRequest::Append(req) => {
                ReplyPayload::Append(self.replica.consensus().append(req)?)
            }
        };

        Ok(PeerReply {
            sender: self.replica.name().to_string(),
            payload,
        })
    }
}
