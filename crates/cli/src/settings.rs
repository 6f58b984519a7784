//! Settings file loading (JSON → `EnvelopeCfg`).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use hmenv::config::EnvelopeCfg;

/// Read, parse and validate a settings file. Any failure is fatal for the run.
pub fn load(path: &Path) -> Result<EnvelopeCfg> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading settings {}", path.display()))?;
    let cfg: EnvelopeCfg = serde_json::from_str(&text)
        .with_context(|| format!("parsing settings {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validating settings {}", path.display()))?;
    Ok(cfg)
}
