use anyhow::{Context, Result};
use log::{debug, trace};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tempfile::{Builder, TempDir};

use crate::constants::{BUNDLE_EXTENSION, ENTRY_FILE, PROJECT_NAME, SOURCEMAP_EXTENSION};

const WORKSPACE_PREFIX: &str = "bundlecost-";
const REPORT_PREFIX: &str = "bundlecost-reports-";

/// Temporary directory holding the generated sample app.
///
/// Removed when dropped unless `keep` was requested, on success and on failure alike.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    project_dir: PathBuf,
    keep: bool,
}

impl Workspace {
    pub fn create(keep: bool) -> Result<Self> {
        let dir = Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .disable_cleanup(keep)
            .tempdir_in(temp_dir_base())
            .context("Failed to create a temporary directory")?;
        let project_dir = dir.path().join(PROJECT_NAME);
        debug!("Created workspace at {} (keep: {})", dir.path().display(), keep);
        Ok(Self { dir, project_dir, keep })
    }

    /// The temporary directory itself.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Directory the generator creates the sample app in.
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn entry_file(&self) -> PathBuf {
        self.project_dir.join(ENTRY_FILE)
    }

    pub fn artifact(&self, name: &str) -> BundleArtifact {
        BundleArtifact::new(&self.project_dir, name)
    }

    /// The workspace path if it outlives the run.
    pub fn retained(&self) -> Option<&Path> {
        self.keep.then(|| self.root())
    }
}

/// Create the directory the HTML visualisations are written to. It is never cleaned up.
pub fn create_report_dir() -> Result<PathBuf> {
    let dir = Builder::new()
        .prefix(REPORT_PREFIX)
        .disable_cleanup(true)
        .tempdir_in(temp_dir_base())
        .context("Failed to create the report directory")?;
    debug!("Created report directory at {}", dir.path().display());
    Ok(dir.path().to_path_buf())
}

/// Never hand tempfile a relative base, or the workspace would land under cwd.
fn temp_dir_base() -> PathBuf {
    let t = env::temp_dir();
    if t.is_absolute() { t } else { PathBuf::from("/tmp") }
}

/// A bundle file and its source map, written by one bundler pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleArtifact {
    pub name: String,
    pub bundle: PathBuf,
    pub sourcemap: PathBuf,
}

impl BundleArtifact {
    pub fn new(dir: &Path, name: &str) -> Self {
        Self {
            name: name.to_string(),
            bundle: dir.join(format!("{name}.{BUNDLE_EXTENSION}")),
            sourcemap: dir.join(format!("{name}.{SOURCEMAP_EXTENSION}")),
        }
    }

    pub fn bundle_file_name(&self) -> String {
        format!("{}.{BUNDLE_EXTENSION}", self.name)
    }

    pub fn sourcemap_file_name(&self) -> String {
        format!("{}.{SOURCEMAP_EXTENSION}", self.name)
    }

    /// Size of the bundle file in bytes.
    pub fn size(&self) -> Result<u64> {
        let meta = fs::metadata(&self.bundle)
            .with_context(|| format!("Failed to stat {}", self.bundle.display()))?;
        trace!("{} is {} bytes", self.bundle.display(), meta.len());
        Ok(meta.len())
    }
}
