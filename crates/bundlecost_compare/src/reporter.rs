use colored::Colorize;
use log::debug;
use std::io::{self, Write};

use crate::{comparator::format_size, types::Report};

pub fn print_report<W: Write>(writer: &mut W, report: &Report) -> io::Result<()> {
    debug!("Printing report for {}", report.packages);
    let sizes = report.sizes;
    let delta = sizes.delta();
    let verb = if delta < 0 { "removes" } else { "adds" };

    writeln!(writer)?;
    writeln!(writer, "📦 The original bundle is: {}", format_size(sizes.original).bold())?;
    writeln!(
        writer,
        "📦 The bundle with {} is: {}",
        report.packages,
        format_size(sizes.with_packages).bold()
    )?;
    writeln!(
        writer,
        "⚖️  Therefore, {} {} {} to the JavaScript bundle",
        report.packages,
        verb,
        format!("{} ({:+}%)", format_size(delta.unsigned_abs()), sizes.percent()).red().bold()
    )?;

    writeln!(writer)?;
    writeln!(
        writer,
        "Original source map explorer: {}",
        report.original_html.display().to_string().underline()
    )?;
    writeln!(
        writer,
        "With {}: {}",
        report.packages,
        report.with_packages_html.display().to_string().underline()
    )?;

    if let Some(workspace) = &report.workspace {
        writeln!(writer, "Sample app kept at: {}", workspace.display().to_string().blue())?;
    }

    writer.flush()?;
    Ok(())
}
