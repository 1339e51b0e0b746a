//! Timed input scripts for headless replay

use anyhow::{Context, Result};
use serde::Deserialize;
use starfield_core::CommunityRecord;
use std::path::Path;

/// One scripted input, applied on the first frame at or after `at_ms`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptEvent {
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: ScriptAction,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptAction {
    Search { index: usize },
    Click { index: usize },
    Cancel,
    /// Swap in a refetched community list
    Communities { communities: Vec<CommunityRecord> },
}

impl ScriptAction {
    pub fn label(&self) -> &'static str {
        match self {
            ScriptAction::Search { .. } => "search",
            ScriptAction::Click { .. } => "click",
            ScriptAction::Cancel => "cancel",
            ScriptAction::Communities { .. } => "communities",
        }
    }
}

/// Parse a script, ordering events by time. Events sharing a time keep
/// their file order.
pub fn parse_script(content: &str) -> Result<Vec<ScriptEvent>> {
    let mut events: Vec<ScriptEvent> =
        serde_json::from_str(content).context("Failed to parse replay script")?;
    events.sort_by_key(|event| event.at_ms);
    Ok(events)
}

pub fn load_script(path: &Path) -> Result<Vec<ScriptEvent>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    parse_script(&content)
}

pub fn load_communities(path: &Path) -> Result<Vec<CommunityRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read communities {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse communities {}", path.display()))
}
