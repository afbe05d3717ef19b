use anyhow::{Result, bail};
use bundlecost_core::{MANIFEST_FILE, PackageSpec};
use clap::Parser;
use log::{debug, trace};
use path_clean::clean;
use std::{ffi::OsString, path::Path};

use crate::types::{ManifestSource, RunConfig};

const RNV_SHORT: &str = "-rnv";
const RNV_LONG: &str = "--react-native-version";

#[derive(Debug, Clone, Parser)]
#[command(name = "react-native-bundle-cost")]
#[command(
    about = "See how adding packages affects the JavaScript bundle of a React Native app"
)]
pub struct Config {
    /// Packages to add, optionally with a version (e.g. `lodash`, `moment@2.29.4`)
    #[arg(value_name = "PACKAGES")]
    pub packages: Vec<String>,

    /// Show full error output and keep the temporary sample app
    #[arg(short, long)]
    pub debug: bool,

    /// React Native version of the sample app (also accepted as -rnv)
    #[arg(long, value_name = "VERSION")]
    pub react_native_version: Option<String>,

    /// Seed the sample app with the dependencies of this package.json
    /// (defaults to the one in the current directory)
    #[arg(short = 'p', long = "package-json", value_name = "PATH", num_args = 0..=1)]
    pub package_json: Option<Option<String>>,

    /// Do not seed the sample app with a package.json
    #[arg(long, conflicts_with = "package_json")]
    pub no_package_json: bool,

    #[arg(long, env = "BUNDLECOST_NPX", default_value = "npx", hide = true)]
    pub npx: String,

    #[arg(long, env = "BUNDLECOST_YARN", default_value = "yarn", hide = true)]
    pub yarn: String,
}

impl Config {
    /// Validate the raw options and build the run configuration.
    pub fn resolve(self, cwd: &Path) -> Result<RunConfig> {
        if self.packages.is_empty() {
            bail!("You must provide at least one package to add.");
        }

        let packages =
            self.packages.iter().map(|p| PackageSpec::parse(p)).collect::<Result<Vec<_>>>()?;
        debug!("Packages to add: {:?}", packages);

        let manifest = if self.no_package_json {
            ManifestSource::Disabled
        } else {
            let path = match self.package_json.flatten() {
                Some(path) => cwd.join(clean(&path)),
                None => cwd.join(MANIFEST_FILE),
            };
            ManifestSource::Path(path)
        };
        debug!("Manifest source: {:?}", manifest);

        Ok(RunConfig {
            packages,
            manifest,
            react_native_version: self.react_native_version,
            debug: self.debug,
            npx: self.npx,
            yarn: self.yarn,
        })
    }
}

/// Rewrite the multi-letter `-rnv` short flag into its long form, which clap can parse.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| match arg.to_str() {
            Some(RNV_SHORT) => {
                trace!("Rewriting {} to {}", RNV_SHORT, RNV_LONG);
                OsString::from(RNV_LONG)
            }
            Some(s) if s.starts_with("-rnv=") => {
                OsString::from(format!("{RNV_LONG}={}", &s[RNV_SHORT.len() + 1..]))
            }
            _ => arg,
        })
        .collect()
}
