//! # conclave-client: blocking peer client
//!
//! A thin client over the Conclave wire protocol. One [`PeerClient`] owns
//! one dispatch stream to a replica; [`PeerClient::call`] sends a single
//! framed request and reads the single matching reply, and the raw
//! [`send`]/[`recv`] pair exposes the streaming surface -- a caller may
//! send several requests back-to-back and then drain the replies, which
//! arrive in exactly the order the requests were sent.
//!
//! [`send`]: PeerClient::send
//! [`recv`]: PeerClient::recv

use std::net::{SocketAddr, TcpStream};

use bytes::Bytes;
use conclave_wire::{
    BeaconReply, BeaconRequest, DEFAULT_MAX_FRAME_BYTES, FrameReader, FrameWriter, MessageKind,
    PeerReply, PeerRequest, ProposeReply, ProposeRequest, ReplyPayload, WireError,
};
use thiserror::Error;
use tracing::debug;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur on a client connection.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Could not open the connection.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        /// The replica address dialed.
        addr: SocketAddr,
        /// The underlying connect error.
        source: std::io::Error,
    },

    /// Wire protocol error on the stream.
    #[error("wire protocol error: {0}")]
    Wire(#[from] WireError),

    /// The replica closed the stream before replying.
    #[error("connection closed by replica")]
    ConnectionClosed,

    /// The reply kind did not match the request.
    #[error("unexpected reply type '{got}'")]
    UnexpectedReply {
        /// Discriminator of the reply that arrived.
        got: MessageKind,
    },
}

/// A blocking connection to one replica's dispatch stream.
pub struct PeerClient {
    reader: FrameReader<TcpStream>,
    writer: FrameWriter<TcpStream>,
}

impl PeerClient {
    /// Connects to a replica with the default frame limit.
    pub fn connect(addr: SocketAddr) -> ClientResult<Self> {
        Self::connect_with_max_frame(addr, DEFAULT_MAX_FRAME_BYTES)
    }

    /// Connects with an explicit frame limit, which must match the
    /// replica's.
    pub fn connect_with_max_frame(addr: SocketAddr, max_frame_bytes: usize) -> ClientResult<Self> {
        let stream =
            TcpStream::connect(addr).map_err(|source| ClientError::Connect { addr, source })?;
        let write_half = stream.try_clone().map_err(WireError::from)?;
        debug!(%addr, "connected to replica");
        Ok(Self {
            reader: FrameReader::new(stream, max_frame_bytes),
            writer: FrameWriter::new(write_half, max_frame_bytes),
        })
    }

    /// Sends one framed request without waiting for the reply.
    pub fn send(&mut self, request: &PeerRequest) -> ClientResult<()> {
        self.writer.write(request)?;
        Ok(())
    }

    /// Reads the next reply; `None` means the replica closed the stream.
    pub fn recv(&mut self) -> ClientResult<Option<PeerReply>> {
        Ok(self.reader.read()?)
    }

    /// Sends one request and reads its reply.
    pub fn call(&mut self, request: &PeerRequest) -> ClientResult<PeerReply> {
        self.send(request)?;
        self.recv()?.ok_or(ClientError::ConnectionClosed)
    }

    /// Probes the replica's liveness.
    pub fn beacon(&mut self) -> ClientResult<BeaconReply> {
        let reply = self.call(&PeerRequest::Beacon(BeaconRequest))?;
        let got = reply.kind();
        match reply.payload {
            ReplyPayload::Beacon(beacon) => Ok(beacon),
            _ => Err(ClientError::UnexpectedReply { got }),
        }
    }

    /// Proposes a command under the given client identity.
    pub fn propose(
        &mut self,
        identity: impl Into<String>,
        command: impl Into<Bytes>,
    ) -> ClientResult<ProposeReply> {
        let request = PeerRequest::Propose(ProposeRequest {
            identity: identity.into(),
            command: command.into(),
        });
        let reply = self.call(&request)?;
        let got = reply.kind();
        match reply.payload {
            ReplyPayload::Propose(propose) => Ok(propose),
            _ => Err(ClientError::UnexpectedReply { got }),
        }
    }
}
