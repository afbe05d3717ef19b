//! Core building blocks for measuring React Native bundle cost.
//!
//! This crate provides the pieces the measurement pipeline is assembled from:
//! - Parsing package specifiers (`name`, `name@version`, `@scope/name@version`)
//! - Reading a project's `package.json` to seed the sample app
//! - Injecting synthetic imports into the sample app's entry file
//! - Owning the temporary workspace and report directories
//! - Invoking the external toolchain (project generator, yarn, bundler, visualizer)

mod constants;
mod imports;
mod manifest;
mod package;
mod toolchain;
mod workspace;

// Re-export public API
pub use constants::{
    BUNDLE_EXTENSION, ENTRY_FILE, FRAMEWORK_PACKAGE, LATEST, MANIFEST_FILE, ORIGINAL_BUNDLE,
    PLATFORM, PROJECT_NAME, REQUESTED_IMPORT_PREFIX, SEED_IMPORT_PREFIX, SOURCEMAP_EXTENSION,
    UI_LIBRARY_PACKAGE, WITH_PACKAGES_BUNDLE,
};
pub use imports::{count_imports, import_block, prepend_imports, requested_imports};
pub use manifest::{Manifest, read_manifest};
pub use package::PackageSpec;
pub use toolchain::{NodeToolchain, Toolchain};
pub use workspace::{BundleArtifact, Workspace, create_report_dir};
