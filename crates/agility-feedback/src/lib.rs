//! # agility-feedback
//!
//! Turns model output into ticket proposals.
//!
//! - [`parser`]: pure parsers for epic and issue output
//! - [`apply`]: stages parsed issue feedback on an [`ApprovalHandler`]
//! - [`Assistant`]: prompt -> model -> parse -> stage, for each flow
//! - [`CompletionModel`] / [`OpenAiModel`]: the model seam and its HTTP client
//! - [`AssistantConfig`]: `.agility/config.toml`
//!
//! [`ApprovalHandler`]: agility_ticket::ApprovalHandler

pub mod apply;
pub mod assistant;
pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod prompts;

pub use apply::{apply_issue_feedback, AppliedFeedback, SkipReason};
pub use assistant::{Assistant, IssueFeedbackOutcome};
pub use config::{AgilityPaths, AssistantConfig, EventsConfig, ModelConfig};
pub use error::FeedbackError;
pub use model::{CompletionModel, OpenAiModel};
pub use parser::{
    parse_epic_feedback, parse_issue_feedback, EpicFeedback, IssueFeedback, IssueProposal,
};
