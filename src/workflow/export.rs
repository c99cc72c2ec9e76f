//! Export a workflow configuration to a standalone JSON file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::workflow::{WorkflowConfig, WorkflowError};

fn whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

/// Path separators, characters Windows rejects, and control characters.
fn unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[/\\:*?"<>|\x00-\x1f\x7f]"#).expect("static regex"))
}

/// `{name}_workflow.json` with whitespace runs collapsed to `_` and
/// filename-unsafe characters replaced by `_`, so the result is always a
/// single path component.
pub fn export_file_name(name: &str) -> String {
    let collapsed = whitespace().replace_all(name, "_");
    format!("{}_workflow.json", unsafe_chars().replace_all(&collapsed, "_"))
}

/// Pretty-printed JSON for `workflow`.
pub fn export_json(workflow: &WorkflowConfig) -> Result<String, WorkflowError> {
    Ok(serde_json::to_string_pretty(workflow)?)
}

/// Write `workflow` into `dir`, creating the directory if needed.
/// Returns the path of the written file.
pub fn export_to_dir(workflow: &WorkflowConfig, dir: &Path) -> Result<PathBuf, WorkflowError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(&workflow.name));
    fs::write(&path, export_json(workflow)?)?;
    tracing::info!(id = %workflow.id, path = %path.display(), "Exported workflow");
    Ok(path)
}
