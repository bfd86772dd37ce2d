//! Soundlab CLI - Sound Session Engine
//!
//! Command-line interface for the Soundlab session engine.

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use soundlab::cli::{commands, Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_target(false)
        .init();

    info!("Soundlab v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd)?,
        None => {
            println!("Soundlab v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
        }
    }
    Ok(())
}

fn handle_command(cmd: Commands) -> soundlab::Result<()> {
    match cmd {
        Commands::GenNoise {
            out,
            spectrum_level,
            duration,
            ramps,
            ear,
            pink,
            rate,
            bits,
        } => commands::gen_noise(&out, spectrum_level, duration, ramps, ear.into(), pink, rate, bits),
        Commands::GenTone {
            out,
            frequency,
            level,
            duration,
            ramps,
            ear,
            itd,
            itd_ref,
            ild,
            ild_ref,
            rate,
            bits,
        } => commands::gen_tone(
            &out,
            frequency,
            level,
            duration,
            ramps,
            ear.into(),
            itd,
            itd_ref.map(Into::into),
            ild,
            ild_ref.map(Into::into),
            rate,
            bits,
        ),
        Commands::GenHarm {
            out,
            harm_type,
            f0,
            low_harm,
            high_harm,
            level,
            duration,
            ramps,
            ear,
            filter_low,
            filter_high,
            rate,
            bits,
        } => commands::gen_harm(
            &out,
            harm_type.into(),
            f0,
            low_harm,
            high_harm,
            level,
            duration,
            ramps,
            ear.into(),
            filter_low,
            filter_high,
            rate,
            bits,
        ),
        Commands::Info { file } => commands::info(&file),
        Commands::Cut {
            input,
            out,
            from,
            to,
            bits,
        } => commands::cut(&input, &out, from, to, bits),
        Commands::Resample {
            input,
            out,
            rate,
            window,
            bits,
        } => commands::resample(&input, &out, rate, &window, bits),
        Commands::Scale {
            input,
            out,
            db,
            bits,
        } => commands::scale(&input, &out, db, bits),
        Commands::Compare { a, b } => commands::compare(&a, &b),
        Commands::Mix { inputs, out, bits } => commands::mix(&inputs, &out, bits),
    }
}
