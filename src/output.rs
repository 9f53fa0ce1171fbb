use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::types::ResponseValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Pretty JSON of the response's `output` member.
    #[default]
    Raw,
    /// Only the generated text.
    Text,
}

pub fn render(response: &ResponseValue, mode: OutputMode) -> Result<String> {
    match mode {
        OutputMode::Raw => serde_json::to_string_pretty(response.output())
            .context("failed to serialize response output"),
        OutputMode::Text => Ok(response.output_text()),
    }
}

/// Write the rendered response followed by a newline.
pub fn emit<W: Write>(response: &ResponseValue, mode: OutputMode, out: &mut W) -> Result<String> {
    let rendered = render(response, mode)?;
    writeln!(out, "{rendered}")?;
    out.flush()?;
    Ok(rendered)
}

pub fn save(path: &Path, rendered: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, rendered).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
