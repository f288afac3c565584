//! Concrete [`super::ArtifactSink`] implementations: filesystem-backed for
//! the CLI, in-memory for tests and embedders.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use super::ArtifactSink;

/// Writes artifacts under a fixed output directory, created on first use.
/// `exists` checks the hand-written source root (`--srcdir`) ahead of the
/// output directory itself, so a hand-maintained file is never overwritten
/// whether it lives alongside the generated ones or in its own tree.
pub struct FsArtifactSink {
    out_dir: PathBuf,
    src_dir: Option<PathBuf>,
}

impl FsArtifactSink {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            src_dir: None,
        }
    }

    pub fn with_srcdir(out_dir: impl Into<PathBuf>, src_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            src_dir: Some(src_dir.into()),
        }
    }
}

impl ArtifactSink for FsArtifactSink {
    fn exists(&self, relative_path: &str) -> bool {
        if let Some(src_dir) = &self.src_dir {
            if src_dir.join(relative_path).exists() {
                return true;
            }
        }
        self.out_dir.join(relative_path).exists()
    }

    fn emit(&mut self, artifact_name: &str, body_text: &str) -> std::io::Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        fs::write(self.out_dir.join(artifact_name), body_text)
    }
}

/// Records emitted `(name, body)` pairs in insertion order without touching
/// the filesystem; used by tests and by callers embedding the compiler as a
/// library.
#[derive(Debug, Default)]
pub struct InMemoryArtifactSink {
    artifacts: Vec<(String, String)>,
    preexisting: BTreeSet<String>,
}

impl InMemoryArtifactSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `relative_path` as already present, so a subsequent `emit_all`
    /// skips generating it.
    pub fn seed_existing(&mut self, relative_path: &str) {
        self.preexisting.insert(relative_path.to_owned());
    }

    pub fn artifacts(&self) -> &[(String, String)] {
        &self.artifacts
    }

    pub fn body_of(&self, artifact_name: &str) -> Option<&str> {
        self.artifacts
            .iter()
            .find(|(name, _)| name == artifact_name)
            .map(|(_, body)| body.as_str())
    }
}

impl ArtifactSink for InMemoryArtifactSink {
    fn exists(&self, relative_path: &str) -> bool {
        self.preexisting.contains(relative_path) || self.artifacts.iter().any(|(name, _)| name == relative_path)
    }

    fn emit(&mut self, artifact_name: &str, body_text: &str) -> std::io::Result<()> {
        self.artifacts.push((artifact_name.to_owned(), body_text.to_owned()));
        Ok(())
    }
}
