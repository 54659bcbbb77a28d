//! Command-line surface and run configuration

use clap::Parser;
use std::path::PathBuf;

/// Version string printed by `-v`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(
    name = "hcl2fmt",
    about = "Recursively format *.hcl files in place",
    disable_version_flag = true
)]
pub struct Cli {
    /// Print version information and exit
    #[arg(short = 'v')]
    pub version: bool,

    /// Working directory, defaults to the current directory
    #[arg(short = 'w', value_name = "DIR")]
    pub working_dir: Option<PathBuf>,
}

/// Settings for one invocation, built once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub version_requested: bool,
    pub base_dir: PathBuf,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let base_dir = cli
            .working_dir
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        Self {
            version_requested: cli.version,
            base_dir,
        }
    }
}
