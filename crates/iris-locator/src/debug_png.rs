//! Debug sink writing every pipeline snapshot as a PNG file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::segment::{DebugSink, DebugSnapshot};

/// Writes `roi{index}_{stage}.png` files into one directory.
///
/// Write failures are logged and otherwise ignored.
#[derive(Clone, Debug)]
pub struct PngDebugSink {
    dir: PathBuf,
}

impl PngDebugSink {
    /// Create the sink, creating `dir` if needed.
    pub fn new(dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, roi_index: usize, stage: &str) -> PathBuf {
        self.dir.join(format!("roi{roi_index}_{stage}.png"))
    }
}

impl DebugSink for PngDebugSink {
    fn snapshot(&self, roi_index: usize, snapshot: &DebugSnapshot<'_>) {
        let path = self.path_for(roi_index, snapshot.name());
        match snapshot.render().save(&path) {
            Ok(()) => log::debug!("wrote {}", path.display()),
            Err(err) => log::warn!("failed to write {}: {err}", path.display()),
        }
    }
}
