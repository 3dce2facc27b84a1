//! Per-task outcomes and the accumulated batch result.

use std::fmt;

use thiserror::Error;

use crate::address::TileAddress;
use crate::extract::{ExtractError, Payload};
use crate::fetch::FetchError;

/// Why a single tile task failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("corrupt archive: {0}")]
    CorruptArchive(String),

    #[error("no matching payload in archive")]
    NoMatchingPayload,
}

impl From<FetchError> for FailureReason {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Transport(cause) => FailureReason::Transport(cause),
            FetchError::Status(code) => FailureReason::Status(code),
        }
    }
}

impl From<ExtractError> for FailureReason {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::CorruptArchive(cause) => FailureReason::CorruptArchive(cause),
            ExtractError::NoMatchingPayload { .. } => FailureReason::NoMatchingPayload,
        }
    }
}

/// Result of one tile task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success {
        address: TileAddress,
        payload: Payload,
    },
    Failure {
        address: TileAddress,
        /// Progress label of the failed tile.
        label: String,
        reason: FailureReason,
    },
}

impl FetchOutcome {
    pub fn address(&self) -> &TileAddress {
        match self {
            FetchOutcome::Success { address, .. } | FetchOutcome::Failure { address, .. } => {
                address
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success { .. })
    }
}

/// Attempted / succeeded / failed counts for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} tiles fetched ({} failed)",
            self.succeeded, self.attempted, self.failed
        )
    }
}

/// Ordered outcomes of a batch run, in task enumeration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchResult {
    outcomes: Vec<FetchOutcome>,
    planned: usize,
    cancelled: bool,
}

impl BatchResult {
    pub fn new(outcomes: Vec<FetchOutcome>, planned: usize, cancelled: bool) -> Self {
        Self {
            outcomes,
            planned,
            cancelled,
        }
    }

    pub fn outcomes(&self) -> &[FetchOutcome] {
        &self.outcomes
    }

    pub fn into_outcomes(self) -> Vec<FetchOutcome> {
        self.outcomes
    }

    /// Number of tasks enumerated for the batch.
    pub fn planned(&self) -> usize {
        self.planned
    }

    /// Whether the run stopped before visiting every task.
    pub fn cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.succeeded()
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            attempted: self.attempted(),
            succeeded: self.succeeded(),
            failed: self.failed(),
        }
    }

    /// Successful payloads in order.
    pub fn payloads(&self) -> impl Iterator<Item = &Payload> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            FetchOutcome::Success { payload, .. } => Some(payload),
            FetchOutcome::Failure { .. } => None,
        })
    }

    /// `(label, reason)` for each failed task, in order.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &FailureReason)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            FetchOutcome::Failure { label, reason, .. } => Some((label.as_str(), reason)),
            FetchOutcome::Success { .. } => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{Channel, GridTile, YearRange};

    fn address(east: u16) -> TileAddress {
        GridTile::new(east, 31, Channel::East, YearRange::default())
            .unwrap()
            .into()
    }

    fn success(east: u16) -> FetchOutcome {
        FetchOutcome::Success {
            address: address(east),
            payload: Payload {
                filename: format!("tile_{}.csv", east),
                bytes: vec![1],
            },
        }
    }

    fn failure(east: u16) -> FetchOutcome {
        FetchOutcome::Failure {
            address: address(east),
            label: format!("E{}N31 E", east),
            reason: FailureReason::Status(500),
        }
    }

    #[test]
    fn test_summary_counts() {
        let result = BatchResult::new(vec![success(10), failure(11), success(12)], 3, false);

        assert_eq!(
            result.summary(),
            BatchSummary {
                attempted: 3,
                succeeded: 2,
                failed: 1
            }
        );
        assert_eq!(result.summary().to_string(), "2 of 3 tiles fetched (1 failed)");
    }

    #[test]
    fn test_payloads_and_failures_keep_order() {
        let result = BatchResult::new(vec![success(12), failure(11), success(10)], 3, false);

        let names: Vec<_> = result.payloads().map(|p| p.filename.as_str()).collect();
        assert_eq!(names, vec!["tile_12.csv", "tile_10.csv"]);

        let failed: Vec<_> = result.failures().map(|(label, _)| label).collect();
        assert_eq!(failed, vec!["E11N31 E"]);
    }

    #[test]
    fn test_failure_reason_from_errors() {
        assert_eq!(
            FailureReason::from(FetchError::Status(404)),
            FailureReason::Status(404)
        );
        assert_eq!(
            FailureReason::from(ExtractError::NoMatchingPayload {
                prefix: "x".into()
            }),
            FailureReason::NoMatchingPayload
        );
    }
}
