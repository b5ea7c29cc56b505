//! Peer protocol messages.
//!
//! The message union carried on a dispatch stream:
//!
//! - [`BeaconRequest`] / [`BeaconReply`] -- liveness probe
//! - [`ProposeRequest`] / [`ProposeReply`] -- client command proposal
//! - [`VoteRequest`] / [`VoteReply`] -- leader election (consensus layer)
//! - [`AppendRequest`] / [`AppendReply`] -- log replication (consensus layer)
//!
//! The base framework routes `Beacon` and `Propose`; the consensus-protocol
//! kinds exist so the dispatcher's match stays exhaustive while their
//! handlers remain pluggable.

use std::fmt::{self, Display};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

// ============================================================================
// Discriminator
// ============================================================================

/// The message-type tag a dispatcher routes on.
///
/// Readable from an envelope without decoding the payload, via
/// [`PeerRequest::kind`] and [`PeerReply::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    /// Liveness probe.
    Beacon,
    /// Client command proposal.
    Propose,
    /// Leader-election vote request.
    Vote,
    /// Log-append replication message.
    Append,
}

impl Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Beacon => "BEACON",
            Self::Propose => "PROPOSE",
            Self::Vote => "VOTE",
            Self::Append => "APPEND",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Requests
// ============================================================================

/// A message received from a remote peer on a dispatch stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeerRequest {
    /// Confirm liveness of this replica.
    Beacon(BeaconRequest),
    /// Propose a command to the quorum.
    Propose(ProposeRequest),
    /// Request a leader-election vote.
    Vote(VoteRequest),
    /// Append entries to the replicated log.
    Append(AppendRequest),
}

impl PeerRequest {
    /// Returns the type discriminator for this message.
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Beacon(_) => MessageKind::Beacon,
            Self::Propose(_) => MessageKind::Propose,
            Self::Vote(_) => MessageKind::Vote,
            Self::Append(_) => MessageKind::Append,
        }
    }
}

/// Liveness probe. Carries no payload; the reply carries the timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconRequest;

/// A command proposed to the quorum by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposeRequest {
    /// The proposing client's declared identity.
    pub identity: String,
    /// Opaque command bytes; interpreted by the consensus layer.
    pub command: Bytes,
}

/// Leader-election vote request (consensus layer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRequest {
    /// Election term the candidate is campaigning in.
    pub term: u64,
    /// Name of the candidate requesting the vote.
    pub candidate: String,
}

/// Log-append replication message (consensus layer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendRequest {
    /// The leader's current term.
    pub term: u64,
    /// Name of the leader sending the entries.
    pub leader: String,
    /// Opaque log entries; interpreted by the consensus layer.
    pub entries: Vec<Bytes>,
}

// ============================================================================
// Replies
// ============================================================================

/// A reply sent back to a remote peer, one per request, in request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerReply {
    /// Name of the replica that produced this reply.
    pub sender: String,
    /// The reply payload, matching the request's kind.
    pub payload: ReplyPayload,
}

impl PeerReply {
    /// Returns the type discriminator for this reply.
    pub fn kind(&self) -> MessageKind {
        match &self.payload {
            ReplyPayload::Beacon(_) => MessageKind::Beacon,
            ReplyPayload::Propose(_) => MessageKind::Propose,
            ReplyPayload::Vote(_) => MessageKind::Vote,
            ReplyPayload::Append(_) => MessageKind::Append,
        }
    }
}

/// Payload union for [`PeerReply`], one variant per request kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplyPayload {
    /// Reply to a liveness probe.
    Beacon(BeaconReply),
    /// Reply to a command proposal.
    Propose(ProposeReply),
    /// Reply to a vote request.
    Vote(VoteReply),
    /// Reply to a log append.
    Append(AppendReply),
}

/// Reply to a liveness probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconReply {
    /// The replica's current wall-clock time, RFC 3339 with nanoseconds.
    pub timestamp: String,
}

/// Reply to a command proposal.
///
/// A rejected proposal is a business-logic outcome, not a transport error:
/// `success` is false and `error` explains why, and the connection stays
/// open for further messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposeReply {
    /// Whether the proposal was committed.
    pub success: bool,
    /// Explanation when `success` is false.
    pub error: Option<String>,
}

/// Reply to a vote request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReply {
    /// The voter's current term.
    pub term: u64,
    /// Whether the vote was granted.
    pub granted: bool,
}

/// Reply to a log append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendReply {
    /// The follower's current term.
    pub term: u64,
    /// Whether the entries were accepted.
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn request_kind_matches_variant() {
        let beacon = PeerRequest::Beacon(BeaconRequest);
        let propose = PeerRequest::Propose(ProposeRequest {
            identity: "clientA".to_string(),
            command: Bytes::from_static(b"set x=1"),
        });
        let vote = PeerRequest::Vote(VoteRequest {
            term: 3,
            candidate: "r2".to_string(),
        });

        assert_eq!(beacon.kind(), MessageKind::Beacon);
        assert_eq!(propose.kind(), MessageKind::Propose);
        assert_eq!(vote.kind(), MessageKind::Vote);
    }

    #[test]
    fn reply_kind_matches_payload() {
        let reply = PeerReply {
            sender: "r1".to_string(),
            payload: ReplyPayload::Propose(ProposeReply {
                success: false,
                error: Some("rejected".to_string()),
            }),
        };
        assert_eq!(reply.kind(), MessageKind::Propose);
    }

    #[test_case(MessageKind::Beacon, "BEACON")]
    #[test_case(MessageKind::Propose, "PROPOSE")]
    #[test_case(MessageKind::Vote, "VOTE")]
    #[test_case(MessageKind::Append, "APPEND")]
    fn kind_display_uses_wire_names(kind: MessageKind, expected: &str) {
        assert_eq!(kind.to_string(), expected);
    }
}
