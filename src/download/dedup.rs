//! Path/size based duplicate detection.

use std::path::Path;

/// Returns true if `path` already holds a non-empty file.
///
/// Only presence and size are checked, never content. A zero-byte file
/// (left behind by an aborted transfer) counts as absent so it is fetched
/// again. Metadata errors are treated as absent as well.
pub async fn should_skip(path: &Path) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(meta) => meta.is_file() && meta.len() > 0,
        Err(_) => false,
    }
}
