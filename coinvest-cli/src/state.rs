use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub fn coinvest_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".coinvest"))
}

pub fn ensure_coinvest_home() -> Result<PathBuf> {
    let dir = coinvest_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

/// Write `text` with a single trailing newline.
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    let mut s = text.trim_end_matches('\n').to_string();
    s.push('\n');
    fs::write(path, s).with_context(|| format!("write {}", path.display()))
}
