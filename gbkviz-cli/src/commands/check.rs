//! Check command implementation - availability of the comparison feature

use anyhow::Result;

use crate::config::Config;
use gbkviz_core::aligner::{check_requirements, missing_tools};

pub fn execute(config: &Config) -> Result<()> {
    let tools = &config.tools;
    let missing = missing_tools(tools);
    for tool in [&tools.nucmer, &tools.promer, &tools.delta_filter, &tools.show_coords] {
        let status = if missing.contains(tool) { "missing" } else { "ok" };
        println!("{:<16} {}", tool.display(), status);
    }

    if check_requirements(tools) {
        println!("Genome comparison is available");
        Ok(())
    } else {
        // Names the unsupported host or the missing tools
        super::ensure_tools(config)
    }
}
