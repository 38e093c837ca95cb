//! Compact command implementation.

use super::open_store;
use std::path::Path;
use tracing::info;

/// Runs the compact command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!("Compacting journal in {:?}", path);
    let store = open_store(path)?;
    let before = store.storage_info()?.disk_bytes;
    store.compact()?;
    let after = store.storage_info()?.disk_bytes;

    println!("Compacted journal at {}", path.display());
    println!("  Size before: {before} bytes");
    println!("  Size after:  {after} bytes");
    println!(
        "  Space saved: {} bytes ({:.1}%)",
        before.saturating_sub(after),
        if before > 0 {
            (before.saturating_sub(after) as f64 / before as f64) * 100.0
        } else {
            0.0
        }
    );
    Ok(())
}
