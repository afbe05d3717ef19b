use anyhow::{Context, Result, bail};
use log::{debug, info, trace};
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use crate::{
    constants::{ENTRY_FILE, FRAMEWORK_PACKAGE, LATEST, PLATFORM, PROJECT_NAME},
    workspace::BundleArtifact,
};

/// The external tools the measurement is delegated to.
///
/// Every method blocks until the tool exits and fails if it exits non-zero.
/// Implementations must be shareable across threads because the two
/// visualizer runs happen concurrently.
pub trait Toolchain: Sync {
    /// Generate the sample app into `project_dir`.
    fn init_app(&self, react_native_version: &str, project_dir: &Path) -> Result<()>;

    /// Add `name@version` arguments to the sample app.
    fn add_packages(&self, project_dir: &Path, install_args: &[String]) -> Result<()>;

    /// Bundle the sample app into `artifact` for production.
    fn bundle(&self, project_dir: &Path, artifact: &BundleArtifact) -> Result<()>;

    /// Render `artifact` as an HTML treemap in `output_dir`, returning the file path.
    fn visualize(&self, artifact: &BundleArtifact, output_dir: &Path) -> Result<PathBuf>;
}

/// Toolchain backed by `npx` and `yarn` on the `PATH` (or the given executables).
#[derive(Debug, Clone)]
pub struct NodeToolchain {
    npx: String,
    yarn: String,
}

impl Default for NodeToolchain {
    fn default() -> Self {
        Self::new("npx", "yarn")
    }
}

impl NodeToolchain {
    pub fn new(npx: impl Into<String>, yarn: impl Into<String>) -> Self {
        Self { npx: npx.into(), yarn: yarn.into() }
    }

    fn npx(&self) -> Command {
        Command::new(&self.npx)
    }

    fn yarn(&self) -> Command {
        Command::new(&self.yarn)
    }
}

impl Toolchain for NodeToolchain {
    fn init_app(&self, react_native_version: &str, project_dir: &Path) -> Result<()> {
        info!("Generating sample app with {}@{}", FRAMEWORK_PACKAGE, react_native_version);
        let mut command = self.npx();
        command
            .arg("--yes")
            .arg(format!("{FRAMEWORK_PACKAGE}@{react_native_version}"))
            .arg("init")
            .arg(PROJECT_NAME)
            .arg("--directory")
            .arg(project_dir);
        if react_native_version != LATEST {
            command.arg("--version").arg(react_native_version);
        }
        run(&mut command)
    }

    fn add_packages(&self, project_dir: &Path, install_args: &[String]) -> Result<()> {
        if install_args.is_empty() {
            debug!("Nothing to add");
            return Ok(());
        }
        info!("Adding {} packages", install_args.len());
        run(self.yarn().arg("add").args(install_args).current_dir(project_dir))
    }

    fn bundle(&self, project_dir: &Path, artifact: &BundleArtifact) -> Result<()> {
        info!("Bundling {}", artifact.name);
        run(self
            .npx()
            .args([FRAMEWORK_PACKAGE, "bundle", "--entry-file", ENTRY_FILE, "--platform", PLATFORM])
            .args(["--dev", "false"])
            .arg("--bundle-output")
            .arg(artifact.bundle_file_name())
            .arg("--sourcemap-output")
            .arg(artifact.sourcemap_file_name())
            .current_dir(project_dir))
    }

    fn visualize(&self, artifact: &BundleArtifact, output_dir: &Path) -> Result<PathBuf> {
        let output = output_dir.join(format!("{}.html", artifact.name));
        info!("Visualizing {} into {}", artifact.name, output.display());
        run(self
            .npx()
            .args(["--yes", "source-map-explorer"])
            .arg(&artifact.bundle)
            .arg(&artifact.sourcemap)
            .arg("--html")
            .arg(&output))?;
        Ok(output)
    }
}

fn command_line(command: &Command) -> String {
    let mut parts: Vec<OsString> = vec![command.get_program().to_os_string()];
    parts.extend(command.get_args().map(|a| a.to_os_string()));
    parts.iter().map(|p| p.to_string_lossy()).collect::<Vec<_>>().join(" ")
}

fn run(command: &mut Command) -> Result<()> {
    let line = command_line(command);
    debug!("Running: {}", line);
    if let Some(dir) = command.get_current_dir() {
        trace!("Working directory: {}", dir.display());
    }

    let output = command
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("Failed to launch `{}`", line))?;
    trace!("`{}` exited with {}", line, output.status);

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let detail = if stderr.trim().is_empty() { stdout.trim() } else { stderr.trim() };
        bail!("`{}` failed ({}): {}", line, output.status, detail);
    }
    Ok(())
}
