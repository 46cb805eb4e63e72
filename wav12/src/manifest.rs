//! JSON manifest describing a memory image
//!
//! ```json
//! {
//!   "dirs": [
//!     { "path": "hum", "files": [
//!       { "path": "loop.wav", "shift": 2 },
//!       { "path": "swing.wav", "compress": false }
//!     ] }
//!   ]
//! }
//! ```
//!
//! File paths are relative to their directory, which is relative to the
//! manifest itself.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use libwav12::Format;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub dirs: Vec<DirEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirEntry {
    pub path: String,
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    /// Low bits to discard, 0 when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift: Option<u8>,
    /// Force the linear (true) or raw (false) layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compress: Option<bool>,
}

impl DirEntry {
    pub fn file_path(&self, base: &Path, file: &FileEntry) -> PathBuf {
        base.join(&self.path).join(&file.path)
    }
}

impl FileEntry {
    pub fn forced_format(&self) -> Option<Format> {
        self.compress
            .map(|c| if c { Format::Linear } else { Format::Raw })
    }

    /// Name stored in the image: the file name without its extension
    pub fn image_name(&self) -> String {
        Path::new(&self.path)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.clone())
    }
}

impl Manifest {
    pub fn from_json(text: &str) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(text).context("Invalid image manifest")?;
        if manifest.dirs.iter().any(|d| d.path.is_empty()) {
            bail!("Manifest directory with an empty path");
        }
        Ok(manifest)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        Self::from_json(&text)
    }
}
