use anyhow::Result;
use clap::Parser;
use std::ffi::OsString;
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod deps;
mod error;
mod exec;
mod fanin;
mod frames;
mod inspect;
mod pipeline;
mod workspace;

use config::Config;
use deps::{Dependency, Locator, Toolchain};
use pipeline::{OutputFormat, Pipeline};

fn main() -> ExitCode {
    init_tracing();

    let argv: Vec<OsString> = std::env::args_os().collect();
    if cli::wants_help(&argv) {
        cli::print_usage();
        return ExitCode::from(cli::USAGE_EXIT_CODE);
    }
    let args = cli::Args::parse_from(argv);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: cli::Args) -> Result<()> {
    let label = args.input.display().to_string();
    let config = Config::from_env()?;
    let job = args.into_job()?;

    let locator = Locator::from_env(config.dependencies_dir.as_deref())?;
    let gif_output = job.format() == OutputFormat::Gif;
    let tools = Toolchain::resolve(&locator, &Dependency::required(gif_output))?;

    let report = Pipeline::new(&tools, &config).run(&job)?;
    tracing::info!(
        destination = %job.destination.display(),
        delay = %report.delay,
        "interpolation complete"
    );
    println!(
        "{label} : {} frames -> {} frames",
        report.source_frames, report.final_frames
    );
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}
