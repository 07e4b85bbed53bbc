use crate::domain::model::{
    CityQuery, CoordinateQuery, Coordinates, LocationGrant, PermissionStatus, PlaceLabel, Schedule,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Foreground location permission negotiation. May show an OS prompt.
#[async_trait]
pub trait PermissionGate: Send + Sync {
    /// `Err` means the platform call itself failed, not that the user declined.
    async fn request_foreground_permission(&self) -> Result<PermissionStatus>;
}

#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn current_position(&self, grant: &LocationGrant) -> Result<Coordinates>;
}

#[async_trait]
pub trait PlaceNameResolver: Send + Sync {
    async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<PlaceLabel>;
}

/// Remote prayer-time service. Both entry points only ever return complete schedules.
#[async_trait]
pub trait ScheduleClient: Send + Sync {
    async fn fetch_by_coordinates(&self, query: &CoordinateQuery) -> Result<Schedule>;
    async fn fetch_by_city(&self, query: &CityQuery) -> Result<Schedule>;
}
