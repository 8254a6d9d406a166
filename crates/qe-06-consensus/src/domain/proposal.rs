//! Proposal lifecycle types

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of one proposal round. Re-proposing a timed-out block opens a
/// new round with a new id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProposalId(pub Uuid);

impl ProposalId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProposalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// `Proposed → Voting → {Finalized | Rejected | TimedOut}`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    /// Validated, no votes yet.
    Proposed,
    /// At least one vote counted.
    Voting,
    Finalized,
    /// Refused at commit, or superseded by another block at its height.
    Rejected,
    /// Deadline passed without quorum. Votes were released.
    TimedOut,
}

impl ProposalStatus {
    /// Whether the proposal still accepts votes.
    pub fn is_live(&self) -> bool {
        matches!(self, ProposalStatus::Proposed | ProposalStatus::Voting)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Proposed => "proposed",
            ProposalStatus::Voting => "voting",
            ProposalStatus::Finalized => "finalized",
            ProposalStatus::Rejected => "rejected",
            ProposalStatus::TimedOut => "timed_out",
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to a submitted vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoteOutcome {
    /// Added to the tally.
    Counted { votes: usize, required: usize },
    /// Same validator, same proposal: already counted.
    Duplicate,
    /// Wrong block hash or height, or the validator already voted for
    /// another live proposal at this height.
    Ignored,
    /// The proposal is no longer live.
    Late,
}

impl VoteOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteOutcome::Counted { .. } => "counted",
            VoteOutcome::Duplicate => "duplicate",
            VoteOutcome::Ignored => "ignored",
            VoteOutcome::Late => "late",
        }
    }
}
