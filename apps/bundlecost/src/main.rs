use anyhow::Result;
use bundlecost_compare::{Config, Progress, normalize_args, print_report, run_bundle_cost};
use clap::{Arg, ArgAction, CommandFactory, FromArgMatches, Parser};
use colored::Colorize;
use log::{debug, info};
use std::env;
use std::io::{BufWriter, Write};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "react-native-bundle-cost", version)]
#[command(
    about = "See how adding packages affects the JavaScript bundle of a React Native app",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    config: Config,
}

/// Parse the process arguments, with `-v` (rather than clap's `-V`) printing the version.
fn parse_cli() -> Cli {
    let matches = Cli::command()
        .disable_version_flag(true)
        .arg(
            Arg::new("version")
                .short('v')
                .long("version")
                .action(ArgAction::Version)
                .help("Print version"),
        )
        .get_matches_from(normalize_args(env::args_os()));
    Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit())
}

fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    // See https://github.com/rust-lang/rust/issues/60673
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = parse_cli();
    debug!("Parsed CLI arguments: {:?}", cli.config);

    let cwd = env::current_dir()?;
    let cfg = match cli.config.resolve(&cwd) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };
    info!("Measuring {} (debug: {})", cfg.packages_label(), cfg.debug);

    let start = Instant::now();
    let progress = Progress::new(cfg.debug);

    match run_bundle_cost(&cfg, &cfg.toolchain(), &progress) {
        Ok(report) => {
            print_report(&mut stdout, &report)?;
            writeln!(
                stdout,
                "\n{} Finished in {}s.",
                "●".bright_blue(),
                start.elapsed().as_secs().to_string().cyan()
            )?;
            stdout.flush()?;
            Ok(())
        }
        Err(err) => {
            // Already reported by the failed stage
            debug!("Run failed: {:#}", err);
            std::process::exit(1);
        }
    }
}
