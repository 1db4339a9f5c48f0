// mod.rs - Shared command plumbing: project context, input and output.

pub mod epic;
pub mod issue;
pub mod parse;

use std::io::Read;
use std::path::Path;

use agility_feedback::{AgilityPaths, Assistant, AssistantConfig, OpenAiModel};
use agility_ticket::{ApprovalHandler, LogSink};
use anyhow::Context as _;
use serde::Serialize;

/// Config and paths for the project the CLI runs against.
pub struct Context {
    pub paths: AgilityPaths,
    pub config: AssistantConfig,
}

impl Context {
    pub fn for_project(project_root: &Path) -> Self {
        let paths = AgilityPaths::for_project(project_root);
        let config = AssistantConfig::load_or_default(&paths.config_file);
        Self { paths, config }
    }

    pub fn assistant(&self) -> anyhow::Result<Assistant<OpenAiModel>> {
        let model = OpenAiModel::from_config(&self.config.model)
            .context("cannot create the completion model client")?;
        tracing::info!("using model {}", model.model_name());
        Ok(Assistant::new(model))
    }

    /// A handler wired to the configured event log, if any.
    pub fn handler(&self) -> ApprovalHandler {
        let mut handler = ApprovalHandler::new();
        if let Some(log) = self.paths.event_log(&self.config.events) {
            handler.add_sink(Box::new(LogSink::new(log)));
        }
        handler
    }
}

/// Read `file`, or stdin when no file is given.
pub fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Inline JSON, or `@path` to read it from a file.
pub fn read_json_arg<T: serde::de::DeserializeOwned>(arg: &str, what: &str) -> anyhow::Result<T> {
    let text = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {what} from {path}"))?,
        None => arg.to_string(),
    };
    serde_json::from_str(&text).with_context(|| format!("invalid {what} JSON"))
}

/// Fail when a required text argument is blank.
pub fn require_text(text: &str, what: &str) -> anyhow::Result<()> {
    if text.trim().is_empty() {
        anyhow::bail!("{what} must not be empty");
    }
    Ok(())
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
