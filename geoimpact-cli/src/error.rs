use colored::Colorize;
use geoimpact_compare::CompareError;
use geoimpact_core::RegistryError;
use geoimpact_grid::GridError;
use geoimpact_query::IndicatorError;
use std::fmt;
use std::process;

pub const EXIT_ERROR: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

/// Unified error type for CLI operations.
pub enum CliError {
    /// Catalog or coefficient table rejected the fixture.
    Registry(RegistryError),
    /// Region lookup or expansion failed.
    Grid(GridError),
    /// Every requested indicator failed.
    Indicators(Vec<IndicatorError>),
    Compare(CompareError),
    /// Configuration file or environment issues.
    Config(String),
    /// Bad file path, unreadable input, parse failure.
    Input(String),
    /// No fixture given on the command line, in the environment or in config.
    NoFixture,
    /// Argument / usage errors.
    Usage(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Registry(e) => write!(f, "{} {e}", "error:".red().bold()),
            CliError::Grid(e) => write!(f, "{} {e}", "error:".red().bold()),
            CliError::Indicators(errors) => {
                write!(f, "{} no indicator could be computed", "error:".red().bold())?;
                for e in errors {
                    write!(f, "\n  {e}")?;
                }
                Ok(())
            }
            CliError::Compare(e) => write!(f, "{} {e}", "error:".red().bold()),
            CliError::Config(msg) => write!(f, "{} {msg}", "error:".red().bold()),
            CliError::Input(msg) => write!(f, "{} {msg}", "error:".red().bold()),
            CliError::NoFixture => write!(
                f,
                "{} no fixture workspace given\n  {} pass --fixture <path>, set GEOIMPACT_FIXTURE, or add `fixture` to .geoimpact/config.toml",
                "error:".red().bold(),
                "help:".cyan().bold(),
            ),
            CliError::Usage(msg) => write!(f, "{} {msg}", "error:".red().bold()),
        }
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<RegistryError> for CliError {
    fn from(e: RegistryError) -> Self {
        CliError::Registry(e)
    }
}

impl From<GridError> for CliError {
    fn from(e: GridError) -> Self {
        CliError::Grid(e)
    }
}

impl From<CompareError> for CliError {
    fn from(e: CompareError) -> Self {
        CliError::Compare(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Input(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Input(format!("JSON parse error: {e}"))
    }
}

impl From<toml::de::Error> for CliError {
    fn from(e: toml::de::Error) -> Self {
        CliError::Config(format!("config parse error: {e}"))
    }
}

/// Print error and exit with the appropriate code.
pub fn exit_with_error(err: CliError) -> ! {
    eprintln!("{err}");
    let code = match &err {
        CliError::Usage(_) => EXIT_USAGE,
        _ => EXIT_ERROR,
    };
    process::exit(code)
}

pub type CliResult<T> = std::result::Result<T, CliError>;
