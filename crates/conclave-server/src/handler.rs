//! The consensus handler capability.
//!
//! The dispatch core routes messages but does not interpret them; the
//! decision logic -- what a replica does with a proposal, how it votes, how
//! it replicates log entries -- plugs in behind [`Consensus`]. The base
//! framework ships [`Placeholder`], which rejects every proposal and leaves
//! the consensus-protocol kinds unimplemented.

use conclave_wire::{
    AppendReply, AppendRequest, ProposeReply, ProposeRequest, VoteReply, VoteRequest,
};

use crate::error::HandlerError;

/// The pluggable consensus algorithm behind the dispatch core.
///
/// Implementations must be shareable across connection threads. Returning
/// `Err` from any method is fatal to the connection the message arrived on;
/// business-logic failure (a rejected proposal, a denied vote) belongs in
/// the reply payload instead.
///
/// `vote` and `append` default to [`HandlerError::Unimplemented`] so a
/// transport-only deployment fails loudly on consensus-protocol messages
/// rather than silently skipping them.
pub trait Consensus: Send + Sync {
    /// Decides the outcome of a client proposal.
    fn propose(&self, request: &ProposeRequest) -> Result<ProposeReply, HandlerError>;

    /// Decides a leader-election vote.
    fn vote(&self, request: &VoteRequest) -> Result<VoteReply, HandlerError> {
        let _ = request;
        Err(HandlerError::Unimplemented(
            conclave_wire::MessageKind::Vote,
        ))
    }

    /// Applies a log-append from the leader.
    fn append(&self, request: &AppendRequest) -> Result<AppendReply, HandlerError> {
        let _ = request;
        Err(HandlerError::Unimplemented(
            conclave_wire::MessageKind::Append,
        ))
    }
}

/// Stand-in consensus used until a real algorithm is plugged in.
///
/// Every proposal is reported as failed in the reply payload -- an explicit
/// "not yet implemented" outcome rather than a silently wrong default.
#[derive(Debug, Clone, Copy, Default)]
pub struct Placeholder;

impl Consensus for Placeholder {
    fn propose(&self, _request: &ProposeRequest) -> Result<ProposeReply, HandlerError> {
        Ok(ProposeReply {
            success: false,
            error: Some("proposal handling is not implemented".to_string()),
        })
    }
}
