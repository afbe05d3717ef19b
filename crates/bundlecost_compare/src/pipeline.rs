use anyhow::Result;
use bundlecost_core::{
    FRAMEWORK_PACKAGE, LATEST, Manifest, ORIGINAL_BUNDLE, REQUESTED_IMPORT_PREFIX,
    SEED_IMPORT_PREFIX, Toolchain, WITH_PACKAGES_BUNDLE, Workspace, count_imports,
    create_report_dir, prepend_imports, read_manifest, requested_imports,
};
use colored::Colorize;
use log::{debug, info};
use std::fs;

use crate::{
    comparator::{compare_bundles, format_size},
    progress::{Progress, Step},
    types::{ManifestSource, Report, RunConfig},
};

/// Measure how much the requested packages add to the sample app's bundle.
///
/// Stages run strictly in order and the first failure aborts the run. The
/// workspace is dropped (and removed, unless debugging) before returning.
pub fn run_bundle_cost<T: Toolchain>(
    cfg: &RunConfig,
    toolchain: &T,
    progress: &Progress,
) -> Result<Report> {
    info!("Starting bundle cost run for {}", cfg.packages_label());
    let debug = cfg.debug;

    let manifest = match &cfg.manifest {
        ManifestSource::Disabled => {
            debug!("Manifest seeding disabled");
            None
        }
        ManifestSource::Path(path) => {
            let label = if debug {
                format!("Reading package.json {}", path.display().to_string().blue())
            } else {
                "Reading package.json".to_string()
            };
            let manifest = progress.check(&label, || {
                let manifest = read_manifest(path)?;
                let caption =
                    format!("Found {}@{}", FRAMEWORK_PACKAGE, manifest.react_native_version);
                Ok(Step::new(manifest).with_caption(caption))
            })?;
            Some(manifest)
        }
    };

    let react_native_version = cfg
        .react_native_version
        .clone()
        .or_else(|| manifest.as_ref().map(|m| m.react_native_version.clone()))
        .unwrap_or_else(|| LATEST.to_string());
    debug!("Using {}@{}", FRAMEWORK_PACKAGE, react_native_version);

    let workspace = progress.step("Creating a temporary directory", || {
        let step = Step::new(Workspace::create(debug)?);
        if debug {
            let caption = step.value.project_dir().display().to_string();
            return Ok(step.with_caption(caption));
        }
        Ok(step)
    })?;
    debug!("Workspace root: {}", workspace.root().display());
    let project_dir = workspace.project_dir();
    let entry = workspace.entry_file();

    progress.step(
        &format!("Creating a sample app with {}@{}", FRAMEWORK_PACKAGE, react_native_version),
        || {
            toolchain.init_app(&react_native_version, project_dir)?;
            Ok(Step::done())
        },
    )?;

    if let Some(manifest) = &manifest {
        seed_from_manifest(manifest, toolchain, &workspace, progress)?;
    }

    let original = workspace.artifact(ORIGINAL_BUNDLE);
    progress.step("Bundling sample app", || {
        toolchain.bundle(project_dir, &original)?;
        Ok(Step::done())
    })?;

    let label = cfg.packages_label();
    progress.step(&format!("Adding {label}"), || {
        toolchain.add_packages(project_dir, &cfg.install_args())?;
        Ok(Step::done())
    })?;

    let existing = manifest.as_ref().map(Manifest::dependency_names).unwrap_or_default();
    let to_import = requested_imports(&cfg.package_names(), &existing);
    progress.step(&format!("Importing {label}"), || {
        prepend_imports(&entry, REQUESTED_IMPORT_PREFIX, &to_import)?;
        if debug {
            let source = fs::read_to_string(&entry)?;
            debug!("{} now has {} synthetic imports", entry.display(), count_imports(&source));
        }
        Ok(Step::done())
    })?;

    let with_packages = workspace.artifact(WITH_PACKAGES_BUNDLE);
    progress.step("Bundling sample app again", || {
        toolchain.bundle(project_dir, &with_packages)?;
        Ok(Step::done())
    })?;

    let sizes = progress.step("Comparing size of bundles", || {
        let sizes = compare_bundles(&original, &with_packages)?;
        let caption =
            format!("{} → {}", format_size(sizes.original), format_size(sizes.with_packages));
        Ok(Step::new(sizes).with_caption(caption))
    })?;

    let (original_html, with_packages_html) =
        progress.step("Generating source map explorer", || {
            let report_dir = create_report_dir()?;
            let (original_html, with_packages_html) = rayon::join(
                || toolchain.visualize(&original, &report_dir),
                || toolchain.visualize(&with_packages, &report_dir),
            );
            Ok(Step::new((original_html?, with_packages_html?)))
        })?;

    let report = Report {
        packages: label,
        sizes,
        original_html,
        with_packages_html,
        workspace: workspace.retained().map(|p| p.to_path_buf()),
    };
    info!("Bundle cost run complete: {:+} bytes", sizes.delta());
    Ok(report)
}

fn seed_from_manifest<T: Toolchain>(
    manifest: &Manifest,
    toolchain: &T,
    workspace: &Workspace,
    progress: &Progress,
) -> Result<()> {
    let count = manifest.dependencies.len();

    progress.step(
        &format!("Adding {count} dependencies from your package.json to the sample app"),
        || {
            toolchain.add_packages(workspace.project_dir(), &manifest.install_args())?;
            Ok(Step::done())
        },
    )?;

    progress.step(
        &format!("Importing {count} dependencies from your package.json to the sample app"),
        || {
            prepend_imports(
                &workspace.entry_file(),
                SEED_IMPORT_PREFIX,
                &manifest.dependency_names(),
            )?;
            Ok(Step::done())
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use bundlecost_core::{BundleArtifact, PackageSpec};
    use std::{
        path::{Path, PathBuf},
        sync::Mutex,
    };
    use tempfile::TempDir;

    /// Writes what the real tools would write, and records every call.
    #[derive(Default)]
    struct FakeToolchain {
        fail_on: Option<&'static str>,
        calls: Mutex<Vec<String>>,
        project_dir: Mutex<Option<PathBuf>>,
    }

    impl FakeToolchain {
        fn failing_on(call: &'static str) -> Self {
            Self { fail_on: Some(call), ..Default::default() }
        }

        fn record(&self, call: String) -> Result<()> {
            let failed = self.fail_on.is_some_and(|f| call.starts_with(f));
            self.calls.lock().unwrap().push(call.clone());
            if failed {
                bail!("`{}` failed (exit status: 1): simulated failure", call);
            }
            Ok(())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn project_dir(&self) -> PathBuf {
            self.project_dir.lock().unwrap().clone().unwrap()
        }
    }

    impl Toolchain for FakeToolchain {
        fn init_app(&self, react_native_version: &str, project_dir: &Path) -> Result<()> {
            *self.project_dir.lock().unwrap() = Some(project_dir.to_path_buf());
            self.record(format!("init {react_native_version}"))?;
            fs::create_dir_all(project_dir)?;
            fs::write(project_dir.join("index.js"), "import {AppRegistry} from 'react-native';\n")?;
            Ok(())
        }

        fn add_packages(&self, _project_dir: &Path, install_args: &[String]) -> Result<()> {
            self.record(format!("add {}", install_args.join(" ")))
        }

        fn bundle(&self, project_dir: &Path, artifact: &BundleArtifact) -> Result<()> {
            self.record(format!("bundle {}", artifact.name))?;
            let size = if artifact.name == ORIGINAL_BUNDLE { 1_000_000 } else { 1_250_000 };
            fs::write(project_dir.join(artifact.bundle_file_name()), vec![b'x'; size])?;
            fs::write(project_dir.join(artifact.sourcemap_file_name()), "{}")?;
            Ok(())
        }

        fn visualize(&self, artifact: &BundleArtifact, output_dir: &Path) -> Result<PathBuf> {
            self.record(format!("visualize {}", artifact.name))?;
            let output = output_dir.join(format!("{}.html", artifact.name));
            fs::write(&output, "<html></html>")?;
            Ok(output)
        }
    }

    fn run_config(packages: &[&str], manifest: ManifestSource, debug: bool) -> RunConfig {
        RunConfig {
            packages: packages.iter().map(|p| PackageSpec::parse(p).unwrap()).collect(),
            manifest,
            react_native_version: None,
            debug,
            npx: "npx".to_string(),
            yarn: "yarn".to_string(),
        }
    }

    fn write_manifest(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("package.json");
        fs::write(&path, content).unwrap();
        path
    }

    const RN_MANIFEST: &str = r#"{
  "dependencies": {
    "react": "18.2.0",
    "react-native": "0.72.4",
    "axios": "^1.4.0",
    "lodash": "^4.17.21"
  }
}"#;

    fn cleanup(report: &Report) {
        if let Some(parent) = report.original_html.parent() {
            let _ = fs::remove_dir_all(parent);
        }
        if let Some(workspace) = &report.workspace {
            let _ = fs::remove_dir_all(workspace);
        }
    }

    #[test]
    fn test_successful_run_reports_delta() {
        let toolchain = FakeToolchain::default();
        let cfg = run_config(&["moment"], ManifestSource::Disabled, false);

        let report = run_bundle_cost(&cfg, &toolchain, &Progress::hidden(false)).unwrap();

        assert_eq!(report.sizes.delta(), 250_000);
        assert_eq!(report.sizes.percent(), 25);
        assert_eq!(report.packages, "moment");
        cleanup(&report);
    }

    #[test]
    fn test_stage_order_without_manifest() {
        let toolchain = FakeToolchain::default();
        let cfg = run_config(&["moment"], ManifestSource::Disabled, false);

        let report = run_bundle_cost(&cfg, &toolchain, &Progress::hidden(false)).unwrap();

        let calls = toolchain.calls();
        assert_eq!(calls.len(), 6);
        assert_eq!(
            calls[..4],
            ["init latest", "bundle original", "add moment@latest", "bundle with-packages"]
        );
        assert!(calls.contains(&"visualize original".to_string()));
        assert!(calls.contains(&"visualize with-packages".to_string()));
        cleanup(&report);
    }

    #[test]
    fn test_workspace_removed_without_debug() {
        let toolchain = FakeToolchain::default();
        let cfg = run_config(&["moment"], ManifestSource::Disabled, false);

        let report = run_bundle_cost(&cfg, &toolchain, &Progress::hidden(false)).unwrap();

        assert!(report.workspace.is_none());
        assert!(!toolchain.project_dir().exists());
        assert!(report.original_html.exists());
        assert!(report.with_packages_html.exists());
        assert_eq!(report.original_html.parent(), report.with_packages_html.parent());
        cleanup(&report);
    }

    #[test]
    fn test_workspace_kept_with_debug() {
        let toolchain = FakeToolchain::default();
        let cfg = run_config(&["moment"], ManifestSource::Disabled, true);

        let report = run_bundle_cost(&cfg, &toolchain, &Progress::hidden(true)).unwrap();

        let workspace = report.workspace.clone().unwrap();
        assert!(workspace.exists());
        assert!(toolchain.project_dir().starts_with(&workspace));
        assert!(report.original_html.parent().unwrap().is_dir());
        cleanup(&report);
    }

    #[test]
    fn test_manifest_seeds_and_deduplicates_imports() {
        let dir = TempDir::new().unwrap();
        let manifest_path = write_manifest(&dir, RN_MANIFEST);
        let toolchain = FakeToolchain::default();
        let cfg = run_config(&["lodash", "moment"], ManifestSource::Path(manifest_path), true);

        let report = run_bundle_cost(&cfg, &toolchain, &Progress::hidden(true)).unwrap();

        let calls = toolchain.calls();
        assert_eq!(calls[0], "init 0.72.4");
        assert_eq!(calls[1], "add axios@^1.4.0 lodash@^4.17.21");
        assert_eq!(calls[3], "add lodash@latest moment@latest");

        let entry = fs::read_to_string(toolchain.project_dir().join("index.js")).unwrap();
        // 2 seeded imports + moment; lodash is already seeded
        assert_eq!(count_imports(&entry), 3);
        assert_eq!(entry.matches("from 'lodash'").count(), 1);
        assert!(entry.contains("import * as Package0 from 'moment';"));
        assert!(entry.contains("import * as OriginalPackage0 from 'axios';"));
        assert!(entry.contains("import * as OriginalPackage1 from 'lodash';"));
        cleanup(&report);
    }

    #[test]
    fn test_explicit_version_wins_over_manifest() {
        let dir = TempDir::new().unwrap();
        let manifest_path = write_manifest(&dir, RN_MANIFEST);
        let toolchain = FakeToolchain::default();
        let mut cfg = run_config(&["moment"], ManifestSource::Path(manifest_path), false);
        cfg.react_native_version = Some("0.73.0".to_string());

        let report = run_bundle_cost(&cfg, &toolchain, &Progress::hidden(false)).unwrap();

        assert_eq!(toolchain.calls()[0], "init 0.73.0");
        cleanup(&report);
    }

    #[test]
    fn test_manifest_without_framework_fails_before_any_tool() {
        let dir = TempDir::new().unwrap();
        let manifest_path = write_manifest(&dir, r#"{ "dependencies": { "lodash": "4.0.0" } }"#);
        let toolchain = FakeToolchain::default();
        let cfg = run_config(&["moment"], ManifestSource::Path(manifest_path), true);
        let progress = Progress::hidden(true);

        let err = run_bundle_cost(&cfg, &toolchain, &progress).unwrap_err();

        assert!(format!("{err:#}").contains("This is not a React Native project."));
        assert!(toolchain.calls().is_empty());
        let lines = progress.finished_lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Reading package.json"));
    }

    #[test]
    fn test_manifest_failure_reason_shown_without_debug() {
        let dir = TempDir::new().unwrap();
        let manifest_path = write_manifest(&dir, r#"{ "dependencies": { "lodash": "4.0.0" } }"#);
        let toolchain = FakeToolchain::default();
        let cfg = run_config(&["moment"], ManifestSource::Path(manifest_path), false);
        let progress = Progress::hidden(false);

        assert!(run_bundle_cost(&cfg, &toolchain, &progress).is_err());

        assert!(toolchain.calls().is_empty());
        let lines = progress.finished_lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("This is not a React Native project."));
    }

    #[test]
    fn test_missing_manifest_names_file_without_debug() {
        let dir = TempDir::new().unwrap();
        let manifest_path = dir.path().join("package.json");
        let toolchain = FakeToolchain::default();
        let cfg = run_config(&["moment"], ManifestSource::Path(manifest_path.clone()), false);
        let progress = Progress::hidden(false);

        assert!(run_bundle_cost(&cfg, &toolchain, &progress).is_err());

        let lines = progress.finished_lines();
        assert!(lines[0].contains("Failed to read"));
        assert!(lines[0].contains(&manifest_path.display().to_string()));
    }

    #[test]
    fn test_tool_failure_stops_pipeline() {
        let toolchain = FakeToolchain::failing_on("bundle original");
        let cfg = run_config(&["moment"], ManifestSource::Disabled, false);
        let progress = Progress::hidden(false);

        assert!(run_bundle_cost(&cfg, &toolchain, &progress).is_err());

        assert_eq!(toolchain.calls(), vec!["init latest", "bundle original"]);
        assert!(!toolchain.project_dir().exists());
        let lines = progress.finished_lines();
        let last = lines.last().unwrap();
        assert!(last.contains("Bundling sample app"));
        assert!(!last.contains("simulated failure"));
    }

    #[test]
    fn test_tool_failure_detail_in_debug() {
        let toolchain = FakeToolchain::failing_on("add");
        let cfg = run_config(&["moment"], ManifestSource::Disabled, true);
        let progress = Progress::hidden(true);

        assert!(run_bundle_cost(&cfg, &toolchain, &progress).is_err());

        let lines = progress.finished_lines();
        let last = lines.last().unwrap();
        assert!(last.contains("Adding moment"));
        assert!(last.contains("simulated failure"));
        // Debug keeps the workspace even on failure
        let project_dir = toolchain.project_dir();
        assert!(project_dir.exists());
        fs::remove_dir_all(project_dir.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_visualizer_failure_still_runs_both() {
        let toolchain = FakeToolchain::failing_on("visualize original");
        let cfg = run_config(&["moment"], ManifestSource::Disabled, false);

        assert!(run_bundle_cost(&cfg, &toolchain, &Progress::hidden(false)).is_err());

        let calls = toolchain.calls();
        assert!(calls.contains(&"visualize original".to_string()));
        assert!(calls.contains(&"visualize with-packages".to_string()));
    }
}
