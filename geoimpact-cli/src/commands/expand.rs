use crate::config::EngineConfig;
use crate::error::CliResult;
use crate::fixture::Workspace;
use crate::output;
use geoimpact_core::GeoRegionId;

pub fn run(config: &EngineConfig, region: &str, resolution: i64, count: bool) -> CliResult<()> {
    let workspace = Workspace::load(config)?;
    let cells = workspace
        .regions
        .expand(&GeoRegionId::new(region), resolution)?;
    println!("{}", output::format_cells(&cells, count));
    Ok(())
}
