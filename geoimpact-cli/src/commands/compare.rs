use crate::cli::{GroupByArg, ModeArg, OutputFormatArg};
use crate::config::EngineConfig;
use crate::error::{CliError, CliResult};
use crate::output;
use geoimpact_compare::{compare, compare_scenarios, ComparisonRequest, ImpactRecord};
use std::path::{Path, PathBuf};

pub struct CompareArgs {
    pub baseline: PathBuf,
    pub intervention: PathBuf,
    pub group_by: GroupByArg,
    pub mode: ModeArg,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub scenarios: bool,
    pub format: OutputFormatArg,
}

fn read_records(path: &Path) -> CliResult<Vec<ImpactRecord>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Input(format!("cannot read {}: {e}", path.display())))?;
    Ok(serde_json::from_str(&text)?)
}

pub fn run(config: &EngineConfig, args: CompareArgs) -> CliResult<()> {
    let baseline = read_records(&args.baseline)?;
    let intervention = read_records(&args.intervention)?;

    let mut request = ComparisonRequest::new(args.group_by.into())
        .with_mode(args.mode.into())
        .with_config(&config.compare);
    if let (Some(start), Some(end)) = (args.start_year, args.end_year) {
        request = request.with_years(start, end);
    }

    let table = if args.scenarios {
        compare_scenarios(&baseline, &intervention, &request)?
    } else {
        compare(&baseline, &intervention, &request)?
    };
    println!("{}", output::format_comparison(&table, args.format)?);
    Ok(())
}
