//! minusone CLI entry point

use clap::Parser;
use minusone::config::cli::{Command, RunArgs};
use minusone::config::{schedule_from_args, Cli, Settings};
use minusone::pipeline;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(&cli);

    let show_progress = !cli.quiet;

    let outcome = match &cli.command {
        Command::Run(args) => run(args, cli.quiet),
        Command::Combine(args) => {
            pipeline::run_combine(&args.dir, args.dry_run, show_progress).map(|mixes| {
                if !args.dry_run {
                    println!("Wrote {} mixes in {}", mixes.len(), args.dir.display());
                }
            })
        }
        Command::Pitch(args) => schedule_from_args(&args.schedule)
            .and_then(|schedule| {
                pipeline::run_pitch(&args.path, schedule, args.dry_run, show_progress)
            })
            .map(|variants| {
                if !args.dry_run {
                    println!("Wrote {} pitch variants", variants.len());
                }
            }),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &RunArgs, quiet: bool) -> minusone::Result<()> {
    let settings = Settings::from_run_args(args, quiet)?;
    let result = pipeline::run(&settings)?;

    if settings.dry_run {
        return Ok(());
    }

    println!();
    println!(
        "Summary: {} stems {} in {}",
        result.stems.len(),
        if result.separated { "separated" } else { "reused" },
        result.stem_directory.display()
    );
    println!("  {} mixes", result.mixes.len());
    if settings.pitch_enabled {
        println!("  {} pitch variants", result.variants.len());
    }
    if let Some(manifest) = &result.manifest {
        println!("  manifest: {}", manifest.display());
    }
    Ok(())
}

fn init_logging(cli: &Cli) {
    let filter = cli.log_level().to_string().to_lowercase();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}
