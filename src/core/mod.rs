pub mod coordinator;
pub mod state;

pub use crate::domain::model::{FailureReason, ResolutionState, Schedule};
pub use crate::domain::ports::{PermissionGate, PlaceNameResolver, PositionSource, ScheduleClient};
pub use crate::utils::error::Result;
