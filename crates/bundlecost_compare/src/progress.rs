//! Spinner-per-stage progress reporting.
//!
//! Every pipeline stage runs inside [`Progress::step`]: a spinner labelled
//! with the stage is shown while it runs and replaced by a `✔`/`✖` line when
//! it settles. Error details are only printed in debug mode, except for
//! [`Progress::check`] stages whose reason is always shown.

use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, trace};
use std::{sync::Mutex, time::Duration};

/// Result of a stage: its value and an optional caption appended to the label.
#[derive(Debug)]
pub struct Step<T> {
    pub value: T,
    pub caption: Option<String>,
}

impl<T> Step<T> {
    pub fn new(value: T) -> Self {
        Self { value, caption: None }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

impl Step<()> {
    pub fn done() -> Self {
        Self::new(())
    }
}

enum Target {
    Stderr,
    Hidden,
    #[cfg(test)]
    Term(indicatif::InMemoryTerm),
}

pub struct Progress {
    debug: bool,
    target: Target,
    finished: Mutex<Vec<String>>,
}

impl Progress {
    /// Progress drawn on stderr.
    pub fn new(debug: bool) -> Self {
        Self::with_target(debug, Target::Stderr)
    }

    /// Progress that draws nothing and only records the finished lines.
    pub fn hidden(debug: bool) -> Self {
        Self::with_target(debug, Target::Hidden)
    }

    fn with_target(debug: bool, target: Target) -> Self {
        Self { debug, target, finished: Mutex::new(Vec::new()) }
    }

    /// Lines printed for settled stages, in order.
    pub fn finished_lines(&self) -> Vec<String> {
        self.finished.lock().map(|lines| lines.clone()).unwrap_or_default()
    }

    /// Run one stage. A failed stage is reported and its error returned unchanged.
    ///
    /// Outside debug mode only the stage label is shown on failure.
    pub fn step<T>(&self, label: &str, work: impl FnOnce() -> Result<Step<T>>) -> Result<T> {
        self.run(label, Failure::LabelOnly, work)
    }

    /// Like [`Progress::step`], but the failure reason is always shown.
    ///
    /// Used for precondition checks whose message is meant for the user.
    pub fn check<T>(&self, label: &str, work: impl FnOnce() -> Result<Step<T>>) -> Result<T> {
        self.run(label, Failure::WithReason, work)
    }

    fn run<T>(
        &self,
        label: &str,
        failure: Failure,
        work: impl FnOnce() -> Result<Step<T>>,
    ) -> Result<T> {
        debug!("Stage started: {}", label);
        let spinner = self.spinner(label);

        match work() {
            Ok(step) => {
                self.finish(&spinner, success_message(label, step.caption.as_deref()));
                debug!("Stage succeeded: {}", label);
                Ok(step.value)
            }
            Err(err) => {
                let message = match (self.debug, failure) {
                    (false, Failure::WithReason) => reason_message(label, &err),
                    _ => failure_message(label, &err, self.debug),
                };
                self.finish(&spinner, message);
                debug!("Stage failed: {}: {:#}", label, err);
                Err(err)
            }
        }
    }

    fn spinner(&self, label: &str) -> ProgressBar {
        let pb = match &self.target {
            Target::Hidden => return ProgressBar::hidden(),
            Target::Stderr => ProgressBar::new_spinner(),
            #[cfg(test)]
            Target::Term(term) => ProgressBar::with_draw_target(
                None,
                indicatif::ProgressDrawTarget::term_like(Box::new(term.clone())),
            ),
        };
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(label.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    fn finish(&self, spinner: &ProgressBar, message: String) {
        trace!("Finishing stage with: {}", message);
        if let Ok(mut lines) = self.finished.lock() {
            lines.push(message.clone());
        }
        if matches!(self.target, Target::Hidden) {
            return;
        }
        if spinner.is_hidden() {
            // Not a terminal: indicatif draws nothing, so print the outcome as plain lines
            spinner.finish_and_clear();
            eprintln!("{}", message);
        } else {
            // The settled line carries its own ✔/✖, drop the spinner column
            if let Ok(style) = ProgressStyle::with_template("{msg}") {
                spinner.set_style(style);
            }
            spinner.finish_with_message(message);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Failure {
    LabelOnly,
    WithReason,
}

pub fn success_message(label: &str, caption: Option<&str>) -> String {
    match caption {
        Some(caption) => format!("{} {} {}", "✔".green(), label, caption.green()),
        None => format!("{} {}", "✔".green(), label),
    }
}

/// Failure line for a stage; the error chain is only included in debug mode.
pub fn failure_message(label: &str, err: &anyhow::Error, debug: bool) -> String {
    if debug {
        format!("{} {}\n{}", "✖".red(), label, format!("{err:?}").red())
    } else {
        format!("{} {}", "✖".red(), label)
    }
}

/// Failure line with the outermost error message appended.
pub fn reason_message(label: &str, err: &anyhow::Error) -> String {
    format!("{} {}: {}", "✖".red(), label, err.to_string().red())
}
