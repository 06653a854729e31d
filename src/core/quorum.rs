//! Bid decision quorum
//!
//! A bid is approved once `min(responsible, MAX_QUORUM)` distinct
//! responsible employees of the tender's organization have approved it.
//! A single reject is final. Decisions never move back: once Rejected, a
//! later approve is ignored.

use crate::core::entity::Decision;

/// Upper bound on approvals needed, however many responsibles there are
pub const MAX_QUORUM: u32 = 3;

/// Approvals needed for an organization with `responsible` responsibles
pub fn quorum_size(responsible: u32) -> u32 {
    responsible.min(MAX_QUORUM)
}

/// Whether a requested decision leaves the stored one as it is
pub fn short_circuits(stored: Option<Decision>, requested: Decision) -> bool {
    match stored {
        Some(current) if current == requested => true,
        Some(Decision::Rejected) => requested == Decision::Approved,
        _ => false,
    }
}

/// What an accepted vote does to the bid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// Approve stored in the ledger, quorum not reached yet
    Recorded { approvals: u32, quorum: u32 },
    /// Decision written and ledger cleared
    Final(Decision),
}

/// Outcome of one more approve given `pending` votes already in the ledger
pub fn approve_outcome(pending: u32, responsible: u32) -> VoteOutcome {
    let quorum = quorum_size(responsible);
    if pending + 1 < quorum {
        VoteOutcome::Recorded {
            approvals: pending + 1,
            quorum,
        }
    } else {
        VoteOutcome::Final(Decision::Approved)
    }
}

/// Outcome of a vote, independent of the ledger for rejects
pub fn vote_outcome(requested: Decision, pending: u32, responsible: u32) -> VoteOutcome {
    match requested {
        Decision::Rejected => VoteOutcome::Final(Decision::Rejected),
        Decision::Approved => approve_outcome(pending, responsible),
    }
}
