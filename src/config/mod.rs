#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "vakit")]
#[command(about = "Daily prayer times for a position or a city")]
pub struct CliConfig {
    #[arg(long, help = "Path to a TOML engine configuration")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Search by city name instead of locating")]
    pub city: Option<String>,

    #[arg(long, help = "Country sent with a city search")]
    pub country: Option<String>,

    #[arg(long, help = "Calculation method, overrides the configured default")]
    pub method: Option<u32>,

    #[arg(long, allow_hyphen_values = true, requires = "longitude")]
    pub latitude: Option<f64>,

    #[arg(long, allow_hyphen_values = true, requires = "latitude")]
    pub longitude: Option<f64>,

    #[arg(long, help = "Place name reported for the given position, e.g. \"Kadıköy,İstanbul\"")]
    pub place: Option<String>,

    #[arg(long, help = "Simulate a declined location permission")]
    pub deny_permission: bool,

    #[arg(long, help = "Print the final state as JSON")]
    pub json: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}
