use crate::cli::OutputFormatArg;
use crate::error::CliResult;
use crate::output;
use geoimpact_query::StrategyRegistry;

pub fn run(format: OutputFormatArg) -> CliResult<()> {
    println!("{}", output::format_indicators(&StrategyRegistry::standard(), format)?);
    Ok(())
}
