// prompts.rs - Prompt text for each flow.
//
// Wording is free to change; the output formats requested here are the ones
// the parsers in `crate::parser` understand.

use agility_ticket::{Epic, Issue};

pub const SYSTEM_PROMPT: &str =
    "You are an experienced project manager working as a scrum master.";

const EPIC_FORMAT: &str = "\
Format your response exactly as follows:

Epic:
<epic statement>

Summary:
<summary of your reasoning>";

const ISSUE_FORMAT: &str = "\
Follow this format exactly, separating blocks with a blank line.

For existing issues:
Issue <ID>:
Action: <Update or Delete>
Proposed Title: <revised title, only for Update>
Proposed Body:
<revised description, only for Update>

For new issues:
New Issue:
Proposed Title: <title>
Proposed Body:
<description>

Proposal Summary:
<concise summary of the proposed changes>";

const NEW_ISSUES_FORMAT: &str = "\
Write one block per issue, separating blocks with a blank line:

New Issue:
Proposed Title: <title>
Proposed Body:
<description>

End with:

Proposal Summary:
<concise summary of the issues and why they cover the epic>";

pub fn generate_epic(user_prompt: &str) -> String {
    format!(
        "Based on the user's input below, define a high-level epic for the project \
and briefly explain how you arrived at it.

{EPIC_FORMAT}

User Prompt:
\"\"\"
{user_prompt}
\"\"\""
    )
}

pub fn epic_feedback(epic: &Epic, feedback: &str, project_summary: &str) -> String {
    format!(
        "The current epic for a project is shown below, along with feedback from the \
development team. Propose an updated epic that incorporates the feedback and briefly \
explain the changes.

{EPIC_FORMAT}

Current epic:
\"\"\"
{current}
\"\"\"

Feedback:
\"\"\"
{feedback}
\"\"\"

Project details and status:
\"\"\"
{project_summary}
\"\"\"",
        current = epic.content(),
    )
}

pub fn issue_feedback<'a>(issues: impl IntoIterator<Item = &'a Issue>, feedback: &str) -> String {
    let current = issues
        .into_iter()
        .map(|issue| {
            format!(
                "Issue {}:\nTitle: {}\nBody: {}",
                issue.id(),
                issue.title(),
                issue.body()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Below are the current issues for a project and feedback from the team. Based \
only on these, propose changes: update or delete existing issues, and add any issue \
that is missing.

{ISSUE_FORMAT}

Feedback:
\"\"\"
{feedback}
\"\"\"

Current issues:
\"\"\"
{current}
\"\"\""
    )
}

pub fn generate_issues(epic: &Epic, repository_context: Option<&str>) -> String {
    let context = repository_context
        .map(|ctx| format!("\n\nRepository context:\n\"\"\"\n{ctx}\n\"\"\""))
        .unwrap_or_default();

    format!(
        "Break the epic below into concrete, independently deliverable issues.

{NEW_ISSUES_FORMAT}

Epic:
\"\"\"
{epic}
\"\"\"{context}",
        epic = epic.content(),
    )
}
