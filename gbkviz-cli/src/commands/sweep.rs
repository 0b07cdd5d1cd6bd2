//! Sweep command implementation - remove stale session directories

use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::Config;
use gbkviz_core::session::sweep_stale;

pub fn execute(config: &Config, root: Option<PathBuf>, ttl: Option<u64>) -> Result<()> {
    let root = root.unwrap_or_else(|| config.session.root.clone());
    let ttl = ttl.map(Duration::from_secs).unwrap_or_else(|| config.session.ttl());

    let removed = sweep_stale(&root, ttl)?;
    log::info!(
        "Removed {} session directories older than {}s from {}",
        removed,
        ttl.as_secs(),
        root.display()
    );
    Ok(())
}
