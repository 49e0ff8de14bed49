//! Size/count-bounded rotation policy for file sinks.
//!
//! The active file is `<prefix>`; retained generations are `<prefix>.1`
//! (newest) through `<prefix>.<max_files>` (oldest). Rotation runs inside
//! the single drain task that owns the sink's file handle, so no write to
//! the same sink can observe a half-rotated file set.

use std::path::Path;
use tokio::fs;

/// True when writing `incoming` more bytes would push the active file past
/// `max_size`.
pub fn should_rotate(current_size: u64, incoming: u64, max_size: u64) -> bool {
    current_size + incoming > max_size
}

/// Retires the active file to `<prefix>.1`, shifting earlier generations
/// up by one. The oldest generation `<prefix>.<max_files>` is deleted
/// first. The caller reopens a fresh active file afterwards.
pub async fn rotate(dir: &Path, prefix: &str, max_files: u32) -> std::io::Result<()> {
    let oldest = dir.join(format!("{prefix}.{max_files}"));
    if fs::try_exists(&oldest).await? {
        fs::remove_file(&oldest).await?;
    }

    for n in (1..max_files).rev() {
        let from = dir.join(format!("{prefix}.{n}"));
        if fs::try_exists(&from).await? {
            fs::rename(&from, dir.join(format!("{prefix}.{}", n + 1))).await?;
        }
    }

    let active = dir.join(prefix);
    if fs::try_exists(&active).await? {
        fs::rename(&active, dir.join(format!("{prefix}.1"))).await?;
    }

    Ok(())
}
