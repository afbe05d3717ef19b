use bundlecost_core::{NodeToolchain, PackageSpec};
use std::path::PathBuf;

/// Where the seed dependencies come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSource {
    Disabled,
    Path(PathBuf),
}

/// Immutable configuration of a single measurement run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub packages: Vec<PackageSpec>,
    pub manifest: ManifestSource,
    /// Explicit version; falls back to the manifest's, then `latest`
    pub react_native_version: Option<String>,
    pub debug: bool,
    pub npx: String,
    pub yarn: String,
}

impl RunConfig {
    pub fn toolchain(&self) -> NodeToolchain {
        NodeToolchain::new(&self.npx, &self.yarn)
    }

    pub fn package_names(&self) -> Vec<String> {
        self.packages.iter().map(|p| p.name.clone()).collect()
    }

    pub fn install_args(&self) -> Vec<String> {
        self.packages.iter().map(PackageSpec::install_arg).collect()
    }

    /// The packages as the user typed them, space separated.
    pub fn packages_label(&self) -> String {
        self.packages.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
    }
}

/// Sizes of the two bundles in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeComparison {
    pub original: u64,
    pub with_packages: u64,
}

#[derive(Debug, Clone)]
pub struct Report {
    pub packages: String,
    pub sizes: SizeComparison,
    pub original_html: PathBuf,
    pub with_packages_html: PathBuf,
    /// The sample app directory when it was kept for inspection
    pub workspace: Option<PathBuf>,
}
