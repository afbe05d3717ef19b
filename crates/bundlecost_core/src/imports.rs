//! Synthetic imports that force the bundler to include a package.
//!
//! Metro only bundles what the entry file reaches, so every package being
//! measured gets a namespace import prepended to the sample app's entry file.
//! Aliases are `<prefix><index>` to keep the generated bindings unique.

use anyhow::{Context, Result};
use log::{debug, trace};
use std::{collections::HashSet, fs, path::Path};

const IMPORT_MARKER: &str = "import * as ";

/// Render one namespace import per package name.
pub fn import_block(prefix: &str, names: &[String]) -> String {
    names
        .iter()
        .enumerate()
        .map(|(idx, name)| format!("{IMPORT_MARKER}{prefix}{idx} from '{name}';\n"))
        .collect()
}

/// Prepend the import block for `names` to `entry`, keeping its content below.
pub fn prepend_imports(entry: &Path, prefix: &str, names: &[String]) -> Result<()> {
    debug!("Prepending {} imports to {}", names.len(), entry.display());
    let original = fs::read_to_string(entry)
        .with_context(|| format!("Failed to read entry file {}", entry.display()))?;

    let block = import_block(prefix, names);
    trace!("Import block:\n{}", block);

    fs::write(entry, format!("{block}{original}"))
        .with_context(|| format!("Failed to write entry file {}", entry.display()))?;
    Ok(())
}

/// Names of the requested packages that still need an import.
///
/// Packages already seeded from the manifest were imported by the first pass;
/// importing them again would make the two bundles inconsistent.
pub fn requested_imports(requested: &[String], existing: &[String]) -> Vec<String> {
    let existing: HashSet<&str> = existing.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();

    requested
        .iter()
        .filter(|name| {
            if existing.contains(name.as_str()) {
                debug!("Skipping import of '{}', already imported from the manifest", name);
                return false;
            }
            seen.insert(name.as_str())
        })
        .cloned()
        .collect()
}

/// Count the synthetic import lines in `source`.
pub fn count_imports(source: &str) -> usize {
    source.lines().filter(|line| line.trim_start().starts_with(IMPORT_MARKER)).count()
}
