use anyhow::{Result, bail};
use bundlecost_core::BundleArtifact;
use log::debug;

use crate::types::SizeComparison;

impl SizeComparison {
    pub fn delta(&self) -> i64 {
        self.with_packages as i64 - self.original as i64
    }

    /// Growth in percent, rounded half up.
    pub fn percent(&self) -> i64 {
        let ratio = self.with_packages as f64 * 100.0 / self.original as f64 - 100.0;
        (ratio + 0.5).floor() as i64
    }
}

/// Stat both bundles (concurrently) and compare their sizes.
pub fn compare_bundles(
    original: &BundleArtifact,
    with_packages: &BundleArtifact,
) -> Result<SizeComparison> {
    let (original_size, with_packages_size) =
        rayon::join(|| original.size(), || with_packages.size());
    let sizes = SizeComparison { original: original_size?, with_packages: with_packages_size? };
    debug!("Bundle sizes: {:?}", sizes);

    for (artifact, size) in [(original, sizes.original), (with_packages, sizes.with_packages)] {
        if size == 0 {
            bail!("Bundle {} is empty", artifact.bundle.display());
        }
    }

    Ok(sizes)
}

/// Format a byte count with binary units.
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}
