use thiserror::Error;

use crate::tree::NodeId;

/// Errors reported at the public boundary of a tree.
///
/// Lookups of missing keys are not errors; they return `None` or an empty result.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum TreeError {
    /// The range starts after it ends, or starts and ends at the same excluded key.
    #[error("range start is greater than range end")]
    InvalidRange,
    /// The id does not name a live node of this tree.
    #[error("{0:?} is not a live node of this tree")]
    StaleNode(NodeId),
    /// Sorted construction received a key that is not strictly greater than its predecessor.
    #[error("input is not strictly ascending at index {index}")]
    UnsortedInput {
        /// Position of the offending entry.
        index: usize,
    },
}
