use crate::cli::{ContextArg, OutputFormatArg};
use crate::config::EngineConfig;
use crate::error::{CliError, CliResult};
use crate::fixture::Workspace;
use crate::output;
use colored::Colorize;
use geoimpact_core::IndicatorCode;
use geoimpact_query::{CalculationContext, IndicatorParams, SourcingLocation};

pub struct ComputeArgs {
    pub region: String,
    pub material: String,
    pub admin_region: Option<String>,
    pub indicators: Vec<String>,
    pub context: ContextArg,
    pub scenario: Option<String>,
    pub tonnage: f64,
    pub year: Option<i32>,
    pub format: OutputFormatArg,
}

pub async fn run(config: &EngineConfig, args: ComputeArgs) -> CliResult<()> {
    let codes = args
        .indicators
        .iter()
        .map(|s| s.parse::<IndicatorCode>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| CliError::Usage(e.to_string()))?;

    let context = match args.context {
        ContextArg::Import => CalculationContext::Import,
        ContextArg::Intervention => CalculationContext::Intervention,
        ContextArg::Baseline => CalculationContext::ScenarioBaseline {
            scenario: args
                .scenario
                .as_deref()
                .ok_or_else(|| CliError::Usage("--context baseline requires --scenario".to_string()))?
                .into(),
        },
    };

    let mut location = SourcingLocation::new(args.region.as_str(), args.material.as_str());
    if let Some(admin) = &args.admin_region {
        location = location.with_admin_region(admin.as_str());
    }
    let mut params = IndicatorParams::default().with_tonnage(args.tonnage);
    if let Some(year) = args.year {
        params = params.with_year(year);
    }

    let workspace = Workspace::load(config)?;
    let engine = workspace.engine();
    let outcome = engine
        .compute_indicator_batch(&location, &codes, &context, &params)
        .await;

    if outcome.values.is_empty() && !outcome.failures.is_empty() {
        return Err(CliError::Indicators(outcome.failures));
    }

    println!("{}", output::format_batch(&outcome, args.format)?);
    if args.format == OutputFormatArg::Table {
        for failure in &outcome.failures {
            eprintln!("{} {failure}", "warning:".yellow().bold());
        }
        if outcome.empty_region {
            eprintln!(
                "{} region {} has no cells at the aggregation resolution",
                "note:".cyan().bold(),
                location.geo_region
            );
        }
    }
    Ok(())
}
