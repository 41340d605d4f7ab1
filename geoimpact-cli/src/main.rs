use clap::Parser;
use geoimpact_cli::cli::{Cli, Commands};
use geoimpact_cli::commands;
use geoimpact_cli::config;
use geoimpact_cli::error::{exit_with_error, CliResult};

fn init_tracing(cli: &Cli) {
    // --quiet   → "off"
    // --verbose → RUST_LOG if set, otherwise "info"
    // default   → "off", so log lines never mix into table output
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("off")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    } else {
        tracing_subscriber::EnvFilter::new("off")
    };

    let ansi = !(cli.no_color || std::env::var_os("NO_COLOR").is_some());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    init_tracing(&cli);

    if let Err(e) = run(cli).await {
        exit_with_error(e);
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let mut config = config::load(cli.config.as_deref())?;
    config.apply_cli(cli.fixture.as_deref());

    match cli.command {
        Commands::Expand {
            region,
            resolution,
            count,
        } => commands::expand::run(&config, &region, resolution, count),

        Commands::Compute {
            region,
            material,
            admin_region,
            indicators,
            context,
            scenario,
            tonnage,
            year,
            format,
        } => {
            commands::compute::run(
                &config,
                commands::compute::ComputeArgs {
                    region,
                    material,
                    admin_region,
                    indicators,
                    context,
                    scenario,
                    tonnage,
                    year,
                    format,
                },
            )
            .await
        }

        Commands::Indicators { format } => commands::indicators::run(format),

        Commands::Compare {
            baseline,
            intervention,
            group_by,
            mode,
            start_year,
            end_year,
            scenarios,
            format,
        } => commands::compare::run(
            &config,
            commands::compare::CompareArgs {
                baseline,
                intervention,
                group_by,
                mode,
                start_year,
                end_year,
                scenarios,
                format,
            },
        ),
    }
}
