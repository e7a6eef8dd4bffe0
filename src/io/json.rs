//! Export of committed routes through JSON files.
use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::router::RouteRecord;

/// Writes the per-drone route records as an uncompressed JSON file.
pub fn write_routes(routes: &[RouteRecord], filename: &Path) -> Result<()> {
    let mut writer = File::create(filename)
        .with_context(|| format!("Unable to create route file `{filename:?}`"))?;
    let buffer = serde_json::to_vec_pretty(routes)?;
    writer.write_all(&buffer)?;
    Ok(())
}
