use crate::domain::model::{Coordinates, LocationGrant, PermissionStatus, PlaceLabel};
use crate::domain::ports::{PermissionGate, PlaceNameResolver, PositionSource};
use crate::utils::error::{ResolveError, Result};
use async_trait::async_trait;

/// Stand-in for a device location service on hosts without one.
///
/// Permission is granted only when a position is configured (and not
/// explicitly denied); reverse geocoding answers with the configured label.
#[derive(Debug, Clone, Default)]
pub struct StaticDevice {
    position: Option<(f64, f64)>,
    place: Option<PlaceLabel>,
    deny: bool,
}

impl StaticDevice {
    pub fn new(position: Option<(f64, f64)>) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_place(mut self, place: PlaceLabel) -> Self {
        self.place = Some(place);
        self
    }

    pub fn denying(mut self) -> Self {
        self.deny = true;
        self
    }
}

#[async_trait]
impl PermissionGate for StaticDevice {
    async fn request_foreground_permission(&self) -> Result<PermissionStatus> {
        if self.deny || self.position.is_none() {
            tracing::debug!("Static device declines location permission");
            Ok(PermissionStatus::Denied)
        } else {
            Ok(PermissionStatus::Granted)
        }
    }
}

#[async_trait]
impl PositionSource for StaticDevice {
    async fn current_position(&self, _grant: &LocationGrant) -> Result<Coordinates> {
        let (latitude, longitude) = self
            .position
            .ok_or_else(|| ResolveError::location_unavailable("no position configured"))?;
        Coordinates::new(latitude, longitude)
    }
}

#[async_trait]
impl PlaceNameResolver for StaticDevice {
    async fn reverse_geocode(&self, _coordinates: Coordinates) -> Result<PlaceLabel> {
        self.place
            .clone()
            .ok_or_else(|| ResolveError::location_unavailable("no place name for this position"))
    }
}
