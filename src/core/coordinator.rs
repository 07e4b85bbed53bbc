use crate::core::state::{AttemptToken, StateCell};
use crate::domain::model::{
    CityQuery, CitySearchInput, CoordinateQuery, Coordinates, DenialCause, FailureReason,
    LocationGrant, Permission, PermissionStatus, PlaceLabel, ResolutionState, ResolvedPlace,
    Schedule, DEFAULT_COUNTRY, DEFAULT_METHOD, DEFAULT_PLACEHOLDER,
};
use crate::domain::ports::{PermissionGate, PlaceNameResolver, PositionSource, ScheduleClient};
use crate::utils::error::ResolveError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

#[derive(Clone)]
pub struct Collaborators {
    pub permission: Arc<dyn PermissionGate>,
    pub position: Arc<dyn PositionSource>,
    pub places: Arc<dyn PlaceNameResolver>,
    pub schedule: Arc<dyn ScheduleClient>,
}

#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub location_timeout: Duration,
    pub geocode_timeout: Duration,
    pub placeholder_label: String,
    pub country: String,
    pub method: u32,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            location_timeout: Duration::from_secs(15),
            geocode_timeout: Duration::from_secs(5),
            placeholder_label: DEFAULT_PLACEHOLDER.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            method: DEFAULT_METHOD,
        }
    }
}

/// What became of one triggered flow.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    /// The attempt's terminal state was committed.
    Committed(ResolutionState),
    /// A newer attempt started before this one finished; its result was dropped.
    Superseded,
}

impl AttemptOutcome {
    pub fn state(&self) -> Option<&ResolutionState> {
        match self {
            AttemptOutcome::Committed(state) => Some(state),
            AttemptOutcome::Superseded => None,
        }
    }
}

enum Halt {
    Failed(FailureReason),
    Superseded,
}

/// Asks the gate for foreground permission and mints a grant on success.
pub async fn negotiate_permission(gate: &dyn PermissionGate) -> Permission {
    match gate.request_foreground_permission().await {
        Ok(PermissionStatus::Granted) => Permission::Granted(LocationGrant::new()),
        Ok(PermissionStatus::Denied) => Permission::Denied(DenialCause::UserDeclined),
        Err(e) => {
            tracing::warn!("⚠️ Permission request failed on the platform side: {}", e);
            Permission::Denied(DenialCause::PlatformError)
        }
    }
}

/// Drives the auto-locate and manual-city flows and owns the observable state.
///
/// Both entry points take `&self` and may run concurrently; the latest trigger
/// wins and older attempts finish without touching the state.
pub struct ResolutionCoordinator {
    collaborators: Collaborators,
    settings: ResolverSettings,
    state: StateCell,
}

impl ResolutionCoordinator {
    pub fn new(collaborators: Collaborators, settings: ResolverSettings) -> Self {
        Self {
            collaborators,
            settings,
            state: StateCell::new(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ResolutionState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ResolutionState {
        self.state.snapshot()
    }

    pub async fn start_auto_locate(&self) -> AttemptOutcome {
        let token = self.state.begin(ResolutionState::RequestingPermission);
        tracing::info!(attempt = token.id(), "🧭 Starting auto-locate flow");

        let result = self.run_auto_locate(token).await;
        self.finish(token, result)
    }

    pub async fn search_city(&self, name: &str) -> AttemptOutcome {
        let country = self.settings.country.clone();
        self.search_city_with(name, &country, self.settings.method).await
    }

    pub async fn search_city_with(&self, name: &str, country: &str, method: u32) -> AttemptOutcome {
        let input = match CitySearchInput::parse(name) {
            Ok(input) => input,
            Err(_) => {
                let failed = ResolutionState::SearchFailed {
                    reason: FailureReason::EmptyInput,
                };
                let token = self.state.begin(failed.clone());
                tracing::info!(attempt = token.id(), "City search rejected: empty input");
                return AttemptOutcome::Committed(failed);
            }
        };

        let token = self.state.begin(ResolutionState::FetchingSchedule);
        tracing::info!(
            attempt = token.id(),
            "🔎 Searching prayer times for city '{}'",
            input.as_str()
        );

        let query = CityQuery::new(input.as_str())
            .with_country(country)
            .with_method(method);

        let result = match self.collaborators.schedule.fetch_by_city(&query).await {
            Ok(schedule) => Ok((
                schedule,
                ResolvedPlace::City {
                    name: query.city.clone(),
                },
            )),
            Err(e) => Err(Halt::Failed(schedule_failure(&e))),
        };
        self.finish(token, result)
    }

    async fn run_auto_locate(
        &self,
        token: AttemptToken,
    ) -> Result<(Schedule, ResolvedPlace), Halt> {
        let grant = match negotiate_permission(self.collaborators.permission.as_ref()).await {
            Permission::Granted(grant) => grant,
            Permission::Denied(cause) => {
                return Err(Halt::Failed(FailureReason::PermissionDenied(cause)));
            }
        };
        self.advance(token, ResolutionState::Locating)?;

        let coordinates = self.locate(&grant).await.map_err(Halt::Failed)?;
        tracing::debug!(attempt = token.id(), "Position fix: {}", coordinates);
        self.advance(token, ResolutionState::ReverseGeocoding)?;

        // The reverse geocode never gates the schedule fetch; a failed fetch
        // returns without waiting for the label.
        let place_lookup = async {
            let label = self.lookup_place(coordinates).await;
            self.state.commit(token, ResolutionState::FetchingSchedule);
            Ok::<_, Halt>(label)
        };
        let query = CoordinateQuery::new(coordinates).with_method(self.settings.method);
        let schedule_fetch = async {
            self.collaborators
                .schedule
                .fetch_by_coordinates(&query)
                .await
                .map_err(|e| Halt::Failed(schedule_failure(&e)))
        };
        let (label, schedule) = tokio::try_join!(place_lookup, schedule_fetch)?;

        let display = label.display(&self.settings.placeholder_label);
        Ok((schedule, ResolvedPlace::Located { label, display }))
    }

    async fn locate(&self, grant: &LocationGrant) -> Result<Coordinates, FailureReason> {
        let lookup = self.collaborators.position.current_position(grant);
        match tokio::time::timeout(self.settings.location_timeout, lookup).await {
            Ok(Ok(coordinates)) => Ok(coordinates),
            Ok(Err(e)) => {
                tracing::warn!("📍 Location unavailable: {}", e);
                Err(FailureReason::LocationUnavailable)
            }
            Err(_) => {
                tracing::warn!(
                    "📍 No position fix within {:?}",
                    self.settings.location_timeout
                );
                Err(FailureReason::LocationUnavailable)
            }
        }
    }

    /// Soft failure: a geocoding error or a lookup slower than
    /// `geocode_timeout` degrades to an empty label.
    async fn lookup_place(&self, coordinates: Coordinates) -> PlaceLabel {
        let lookup = self.collaborators.places.reverse_geocode(coordinates);
        match tokio::time::timeout(self.settings.geocode_timeout, lookup).await {
            Ok(Ok(label)) => label,
            Ok(Err(e)) => {
                tracing::warn!("Reverse geocoding failed, using placeholder label: {}", e);
                PlaceLabel::default()
            }
            Err(_) => {
                tracing::warn!(
                    "Reverse geocoding gave no answer within {:?}, using placeholder label",
                    self.settings.geocode_timeout
                );
                PlaceLabel::default()
            }
        }
    }

    fn advance(&self, token: AttemptToken, next: ResolutionState) -> Result<(), Halt> {
        let name = next.name();
        if self.state.commit(token, next) {
            tracing::debug!(attempt = token.id(), "State -> {}", name);
            Ok(())
        } else {
            Err(Halt::Superseded)
        }
    }

    fn finish(
        &self,
        token: AttemptToken,
        result: Result<(Schedule, ResolvedPlace), Halt>,
    ) -> AttemptOutcome {
        let next = match result {
            Ok((schedule, place)) => ResolutionState::Resolved { schedule, place },
            Err(Halt::Failed(reason)) => ResolutionState::SearchFailed { reason },
            Err(Halt::Superseded) => {
                tracing::debug!(attempt = token.id(), "Attempt superseded");
                return AttemptOutcome::Superseded;
            }
        };

        if self.state.commit(token, next.clone()) {
            match &next {
                ResolutionState::Resolved { place, .. } => tracing::info!(
                    attempt = token.id(),
                    "✅ Prayer times resolved for {}",
                    place.display_label()
                ),
                ResolutionState::SearchFailed { reason } => tracing::info!(
                    attempt = token.id(),
                    "❌ Resolution failed: {:?}",
                    reason
                ),
                _ => {}
            }
            AttemptOutcome::Committed(next)
        } else {
            tracing::warn!(
                attempt = token.id(),
                "Discarding stale {} result from a superseded attempt",
                next.name()
            );
            AttemptOutcome::Superseded
        }
    }
}

fn schedule_failure(error: &ResolveError) -> FailureReason {
    tracing::warn!("Schedule fetch failed: {}", error);
    match error.reason() {
        Some(reason @ (FailureReason::NetworkError | FailureReason::InvalidScheduleResponse)) => {
            reason
        }
        _ => FailureReason::NetworkError,
    }
}
