use thiserror::Error;

use crate::point::SetRole;

/// Errors surfaced by the rank runtime and the workbench.
///
/// The pure strategy functions never fail; these variants come from the
/// guards placed in front of them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RankError {
    /// A y coordinate is NaN or infinite, so comparisons would be meaningless.
    #[error("{role} contains a non-finite y coordinate at index {index} ({value})")]
    NonFiniteCoordinate {
        /// Set holding the offending point.
        role: SetRole,
        /// Position of the point within its set.
        index: usize,
        /// The rejected value.
        value: f64,
    },
    /// Brute force would exceed the configured comparison budget.
    #[error(
        "brute force over {reference} x {query} points exceeds the work limit of {limit} comparisons"
    )]
    WorkLimitExceeded {
        /// Size of A.
        reference: usize,
        /// Size of B.
        query: usize,
        /// Configured maximum |A|*|B|.
        limit: u64,
    },
    /// A set required for the computation is empty.
    #[error("{0} is empty; nothing to rank")]
    EmptySet(SetRole),
}
