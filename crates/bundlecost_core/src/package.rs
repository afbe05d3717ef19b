use anyhow::{Result, bail};
use log::trace;
use std::fmt;

use crate::constants::LATEST;

/// A package requested on the command line or declared in a manifest.
///
/// The version separator is the last `@` that is not the leading scope marker,
/// so `@scope/name@^2` splits into `@scope/name` and `^2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub name: String,
    pub version: Option<String>,
}

impl PackageSpec {
    pub fn new(name: impl Into<String>, version: Option<String>) -> Self {
        Self { name: name.into(), version }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            bail!("Package name must not be empty");
        }

        let spec = match raw.rfind('@') {
            Some(idx) if idx > 0 => {
                let (name, version) = raw.split_at(idx);
                let version = &version[1..];
                if name.is_empty() || name == "@" {
                    bail!("Invalid package specifier '{}'", raw);
                }
                Self::new(name, (!version.is_empty()).then(|| version.to_string()))
            }
            _ => Self::new(raw, None),
        };
        trace!("Parsed package specifier '{}' as {:?}", raw, spec);
        Ok(spec)
    }

    /// Argument handed to the package manager's `add` command.
    pub fn install_arg(&self) -> String {
        format!("{}@{}", self.name, self.version.as_deref().unwrap_or(LATEST))
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}@{}", self.name, v),
            None => f.write_str(&self.name),
        }
    }
}
