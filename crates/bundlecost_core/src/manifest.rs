use anyhow::{Context, Result, bail};
use log::{debug, trace};
use serde::Deserialize;
use std::{collections::BTreeMap, fs, path::Path};

use crate::{
    constants::{FRAMEWORK_PACKAGE, UI_LIBRARY_PACKAGE},
    package::PackageSpec,
};

#[derive(Debug, Deserialize)]
struct PackageJson {
    #[serde(default)]
    dependencies: Option<BTreeMap<String, String>>,
}

/// Dependencies of an existing React Native project, used to seed the sample app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub react_native_version: String,
    /// Declared dependencies without `react-native` and `react`, in name order
    pub dependencies: Vec<PackageSpec>,
}

impl Manifest {
    pub fn dependency_names(&self) -> Vec<String> {
        self.dependencies.iter().map(|d| d.name.clone()).collect()
    }

    pub fn install_args(&self) -> Vec<String> {
        self.dependencies.iter().map(PackageSpec::install_arg).collect()
    }
}

pub fn read_manifest(path: &Path) -> Result<Manifest> {
    debug!("Reading manifest at: {}", path.display());
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    parse_manifest(&content)
}

fn parse_manifest(content: &str) -> Result<Manifest> {
    let json: PackageJson = serde_json::from_str(content).context("Invalid package.json")?;
    let declared = json.dependencies.unwrap_or_default();

    let Some(react_native_version) = declared.get(FRAMEWORK_PACKAGE).cloned() else {
        bail!("This is not a React Native project.");
    };
    debug!("Found {}@{}", FRAMEWORK_PACKAGE, react_native_version);

    let dependencies: Vec<PackageSpec> = declared
        .into_iter()
        .filter(|(name, _)| name != FRAMEWORK_PACKAGE && name != UI_LIBRARY_PACKAGE)
        .map(|(name, version)| {
            trace!("Seed dependency: {}@{}", name, version);
            PackageSpec::new(name, Some(version))
        })
        .collect();
    debug!("Manifest declares {} seed dependencies", dependencies.len());

    Ok(Manifest { react_native_version, dependencies })
}
