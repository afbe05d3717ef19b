//! Fixed names shared by the pipeline and the toolchain.
//!
//! The sample app is always generated under the same project name, bundled
//! for a single platform and written to two fixed bundle names so the two
//! bundler passes can be compared.

/// Name of the generated sample project (and its directory inside the workspace)
pub const PROJECT_NAME: &str = "BundleSize";

/// Entry file of the generated sample app, relative to the project directory
pub const ENTRY_FILE: &str = "index.js";

/// The manifest looked up in the current directory when no path is given
pub const MANIFEST_FILE: &str = "package.json";

/// The framework package that anchors the sample app version
pub const FRAMEWORK_PACKAGE: &str = "react-native";

/// The framework's UI library, always installed by the generator
pub const UI_LIBRARY_PACKAGE: &str = "react";

/// Version literal used when no version is pinned
pub const LATEST: &str = "latest";

/// Target platform handed to the bundler
pub const PLATFORM: &str = "ios";

/// Bundle produced before the requested packages are added
pub const ORIGINAL_BUNDLE: &str = "original";

/// Bundle produced after the requested packages are added
pub const WITH_PACKAGES_BUNDLE: &str = "with-packages";

pub const BUNDLE_EXTENSION: &str = "jsbundle";
pub const SOURCEMAP_EXTENSION: &str = "map";

/// Alias prefix for imports seeded from the manifest
pub const SEED_IMPORT_PREFIX: &str = "OriginalPackage";

/// Alias prefix for imports of the requested packages
pub const REQUESTED_IMPORT_PREFIX: &str = "Package";
