//! Normcheck Text Processing
//!
//! Pure text stages of the analysis pipeline: the fragment splitter that
//! segments extracted document text into bounded-size semantic fragments, and
//! the topic filter that selects fragments relevant to a named topic. Both
//! are deterministic and never suspend; all lengths are measured in
//! characters, not bytes, because the documents are largely Cyrillic.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod splitter;
pub mod topic;

pub use splitter::{FragmentSplitter, MAX_FRAGMENT_LEN, MIN_FRAGMENT_LEN};
pub use topic::filter_fragments_by_topic;
