// epic.rs - Parse epic generation/feedback output.
//
// Expected shape (either header spelling is accepted):
//
//   Epic:                 | Proposed Epic:
//   <epic statement>      | <epic statement>
//
//   Summary:              | Changes Summary:
//   <reasoning>           | <reasoning>
//
// Headers must start the line. Text after a header's colon counts as the
// first line of its block. Lines before the first header are ignored.

use agility_ticket::{Epic, IdAllocator};
use serde::{Deserialize, Serialize};

const EPIC_HEADERS: &[&str] = &["Epic:", "Proposed Epic:"];
const SUMMARY_HEADERS: &[&str] = &["Summary:", "Changes Summary:"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    None,
    Epic,
    Summary,
}

/// Parsed epic output: the proposed statement and the reasoning summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpicFeedback {
    pub proposed: String,
    pub summary: String,
}

impl EpicFeedback {
    /// True when no header was found or both blocks were empty.
    pub fn is_empty(&self) -> bool {
        self.proposed.is_empty() && self.summary.is_empty()
    }

    /// Stage the proposed statement as an update on an existing epic.
    ///
    /// An empty statement leaves the epic untouched and returns `false`.
    pub fn propose_onto(&self, epic: &mut Epic) -> bool {
        if self.proposed.is_empty() {
            tracing::warn!(epic_id = %epic.id(), "no proposed epic text; epic left unchanged");
            return false;
        }
        epic.propose_update(self.proposed.clone());
        true
    }

    /// Build a fresh, approved epic from the proposed statement.
    pub fn into_epic(self, ids: &mut IdAllocator) -> (Epic, String) {
        (Epic::new(ids.next_id(), self.proposed), self.summary)
    }
}

/// Parse raw LLM text into an epic statement and summary.
///
/// Never fails: text without headers yields two empty strings.
pub fn parse_epic_feedback(raw_output: &str) -> EpicFeedback {
    let mut epic_lines: Vec<&str> = Vec::new();
    let mut summary_lines: Vec<&str> = Vec::new();
    let mut mode = Mode::None;

    for line in raw_output.lines() {
        if let Some(rest) = strip_header(line, EPIC_HEADERS) {
            mode = Mode::Epic;
            push_inline(&mut epic_lines, rest);
        } else if let Some(rest) = strip_header(line, SUMMARY_HEADERS) {
            mode = Mode::Summary;
            push_inline(&mut summary_lines, rest);
        } else {
            match mode {
                Mode::Epic => epic_lines.push(line.trim()),
                Mode::Summary => summary_lines.push(line.trim()),
                Mode::None => {}
            }
        }
    }

    let feedback = EpicFeedback {
        proposed: epic_lines.join("\n").trim().to_string(),
        summary: summary_lines.join("\n").trim().to_string(),
    };
    if feedback.proposed.is_empty() {
        tracing::warn!("epic output had no epic statement");
    }
    feedback
}

fn strip_header<'a>(line: &'a str, headers: &[&str]) -> Option<&'a str> {
    headers.iter().find_map(|header| line.strip_prefix(header))
}

fn push_inline<'a>(lines: &mut Vec<&'a str>, rest: &'a str) {
    let text = rest.trim();
    if !text.is_empty() {
        lines.push(text);
    }
}
