use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "geoimpact", about = "Geospatial indicator aggregation engine", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Fixture workspace (regions, datasets, grids, coefficients)
    #[arg(long, global = true)]
    pub fixture: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Expand a region to a uniform resolution
    Expand {
        /// Geo-region id
        region: String,

        /// Target resolution (1-15)
        #[arg(long, short = 'r', allow_negative_numbers = true)]
        resolution: i64,

        /// Print only the cell count
        #[arg(long)]
        count: bool,
    },

    /// Compute indicators for one sourcing location
    Compute {
        #[arg(long)]
        region: String,

        #[arg(long)]
        material: String,

        #[arg(long)]
        admin_region: Option<String>,

        /// Indicator name codes, e.g. DF_LUC_T (repeatable)
        #[arg(long = "indicator", short = 'i', required = true)]
        indicators: Vec<String>,

        #[arg(long, default_value = "import", value_enum)]
        context: ContextArg,

        /// Scenario id for the baseline context
        #[arg(long, required_if_eq("context", "baseline"))]
        scenario: Option<String>,

        /// Sourced tonnage
        #[arg(long, default_value_t = 1.0)]
        tonnage: f64,

        /// Dataset reference year
        #[arg(long)]
        year: Option<i32>,

        #[arg(long, default_value = "table", value_enum)]
        format: OutputFormatArg,
    },

    /// List known indicators with their raw values and plans
    Indicators {
        #[arg(long, default_value = "table", value_enum)]
        format: OutputFormatArg,
    },

    /// Compare impact records of a baseline and an intervention
    Compare {
        /// Baseline records (JSON array)
        #[arg(long)]
        baseline: PathBuf,

        /// Intervention records (JSON array)
        #[arg(long)]
        intervention: PathBuf,

        #[arg(long, default_value = "material", value_enum)]
        group_by: GroupByArg,

        #[arg(long, default_value = "absolute", value_enum)]
        mode: ModeArg,

        #[arg(long, requires = "end_year")]
        start_year: Option<i32>,

        #[arg(long, requires = "start_year")]
        end_year: Option<i32>,

        /// Treat both files as whole scenarios and compare their intervention sides
        #[arg(long)]
        scenarios: bool,

        #[arg(long, default_value = "table", value_enum)]
        format: OutputFormatArg,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ContextArg {
    Import,
    Baseline,
    Intervention,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    /// Human-readable table
    Table,
    /// Pretty JSON
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GroupByArg {
    Material,
    Supplier,
    Origin,
    BusinessUnit,
    LocationType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Absolute,
    Relative,
}

impl From<GroupByArg> for geoimpact_compare::GroupBy {
    fn from(arg: GroupByArg) -> Self {
        match arg {
            GroupByArg::Material => Self::Material,
            GroupByArg::Supplier => Self::Supplier,
            GroupByArg::Origin => Self::Origin,
            GroupByArg::BusinessUnit => Self::BusinessUnit,
            GroupByArg::LocationType => Self::LocationType,
        }
    }
}

impl From<ModeArg> for geoimpact_compare::ComparisonMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Absolute => Self::Absolute,
            ModeArg::Relative => Self::Relative,
        }
    }
}
