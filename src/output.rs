//! All-or-nothing artifact publishing.
//!
//! Every artifact of a command is first written to a [`NamedTempFile`] in
//! its destination directory. Only when all of them are staged does
//! [`Staging::publish`] rename them into place. Dropping a [`Staging`]
//! without publishing deletes the temporaries and leaves existing
//! artifacts untouched.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tempfile::NamedTempFile;

#[derive(Debug, Default)]
pub struct Staging {
    staged: Vec<(NamedTempFile, PathBuf)>,
}

impl Staging {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `value` as pretty-printed JSON for `dest`.
    pub fn stage_json<T: Serialize + ?Sized>(&mut self, dest: &Path, value: &T) -> Result<()> {
        let mut bytes = serde_json::to_vec_pretty(value)
            .with_context(|| format!("Failed to serialize {}", dest.display()))?;
        bytes.push(b'\n');
        self.stage_bytes(dest, &bytes)
    }

    pub fn stage_bytes(&mut self, dest: &Path, bytes: &[u8]) -> Result<()> {
        let dir = match dest.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

        let mut tmp = NamedTempFile::new_in(&dir)
            .with_context(|| format!("Failed to stage {}", dest.display()))?;
        tmp.write_all(bytes)
            .and_then(|_| tmp.as_file().sync_all())
            .with_context(|| format!("Failed to write staged {}", dest.display()))?;

        self.staged.push((tmp, dest.to_path_buf()));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Move every staged artifact into place, in staging order.
    pub fn publish(self) -> Result<Vec<PathBuf>> {
        let mut published = Vec::with_capacity(self.staged.len());
        for (tmp, dest) in self.staged {
            tmp.persist(&dest)
                .map_err(|e| e.error)
                .with_context(|| format!("Failed to publish {}", dest.display()))?;
            published.push(dest);
        }
        Ok(published)
    }
}
