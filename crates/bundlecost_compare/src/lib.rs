//! Bundle cost measurement for React Native packages.
//!
//! This crate scaffolds a throwaway React Native app, bundles it once as a
//! baseline, adds the requested packages, bundles it again and reports the
//! size difference together with two source map visualisations.
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```no_run
//! use bundlecost_compare::{Config, Progress, print_report, run_bundle_cost};
//! use clap::Parser;
//! use std::io::{BufWriter, Write};
//!
//! # fn main() -> anyhow::Result<()> {
//! let cfg = Config::parse_from(["react-native-bundle-cost", "--no-package-json", "lodash"]);
//! let run = cfg.resolve(&std::env::current_dir()?)?;
//!
//! let progress = Progress::new(run.debug);
//! let report = run_bundle_cost(&run, &run.toolchain(), &progress)?;
//!
//! let mut stdout = BufWriter::new(std::io::stdout());
//! print_report(&mut stdout, &report)?;
//! stdout.flush()?;
//! # Ok(())
//! # }
//! ```

mod comparator;
mod config;
mod pipeline;
mod progress;
mod reporter;
mod types;

// Re-export public API
pub use comparator::{compare_bundles, format_size};
pub use config::{Config, normalize_args};
pub use pipeline::run_bundle_cost;
pub use progress::{Progress, Step, failure_message, reason_message, success_message};
pub use reporter::print_report;
pub use types::{ManifestSource, Report, RunConfig, SizeComparison};
