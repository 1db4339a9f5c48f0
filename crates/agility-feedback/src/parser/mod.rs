//! Parsers for model output.
//!
//! Both parsers are pure and infallible: malformed text degrades to empty
//! fields or skipped blocks, with a `tracing` warning for each degradation.

pub mod epic;
pub mod issue;

pub use epic::{parse_epic_feedback, EpicFeedback};
pub use issue::{parse_issue_feedback, IssueFeedback, IssueProposal};
