//! doctor::issues
//!
//! Known graph inconsistencies.
//!
//! # Architecture
//!
//! Each variant names one way the score invariant can break. The enum gives
//! stable issue ids, severities and whether the troubleshoot crawl may
//! repair it.

use thiserror::Error;

use super::{IssueId, Severity};
use crate::core::types::{Centipawns, MoveCode, PositionId};

/// Known issue types the troubleshoot crawl detects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KnownIssue {
    /// An edge has a diff but its destination has no score.
    ///
    /// Left behind when scoring stops between the node patch and the
    /// destination writes.
    #[error("{uci} from '{source_id}' leads to unscored '{destination}' (expected {expected})")]
    UnscoredDestination {
        source_id: PositionId,
        uci: MoveCode,
        destination: PositionId,
        /// Score implied by the source score and the diff.
        expected: Centipawns,
    },

    /// An edge's destination score disagrees with the source score and diff.
    ///
    /// Transpositions make this legitimate after a later evaluation through
    /// another parent, so it is reported only.
    #[error("{uci} from '{source_id}' implies {expected} at '{destination}', found {actual}")]
    ScoreMismatch {
        source_id: PositionId,
        uci: MoveCode,
        destination: PositionId,
        expected: Centipawns,
        actual: Centipawns,
    },
}

impl KnownIssue {
    /// Stable id derived from the edge.
    pub fn issue_id(&self) -> IssueId {
        match self {
            KnownIssue::UnscoredDestination {
                source_id, uci, ..
            } => IssueId::new("unscored-destination", &format!("{}|{}", source_id, uci)),
            KnownIssue::ScoreMismatch { source_id, uci, .. } => {
                IssueId::new("score-mismatch", &format!("{}|{}", source_id, uci))
            }
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            KnownIssue::UnscoredDestination { .. } => Severity::Error,
            KnownIssue::ScoreMismatch { .. } => Severity::Warning,
        }
    }

    /// Whether `troubleshoot --adjust` repairs this issue.
    pub fn is_repairable(&self) -> bool {
        matches!(self, KnownIssue::UnscoredDestination { .. })
    }
}
