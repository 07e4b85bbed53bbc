pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{AladhanClient, StaticDevice};
pub use config::toml_config::EngineConfig;
pub use crate::core::coordinator::{
    AttemptOutcome, Collaborators, ResolutionCoordinator, ResolverSettings,
};
pub use domain::model::{
    CityQuery, CoordinateQuery, Coordinates, FailureReason, PlaceLabel, PrayerName,
    ResolutionState, ResolvedPlace, Schedule,
};
pub use utils::error::{ResolveError, Result};
