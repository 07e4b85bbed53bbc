use crate::utils::error::{ResolveError, Result};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const DEFAULT_COUNTRY: &str = "Turkey";
pub const DEFAULT_METHOD: u32 = 13;
pub const DEFAULT_PLACEHOLDER: &str = "Unknown";

/// A validated position on the globe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ResolveError::location_unavailable(format!(
                "latitude {} is outside [-90, 90]",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ResolveError::location_unavailable(format!(
                "longitude {} is outside [-180, 180]",
                longitude
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Best-effort reverse geocoding result. Never used as input to a schedule lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceLabel {
    pub city: Option<String>,
    pub region: Option<String>,
}

impl PlaceLabel {
    pub fn new(city: Option<String>, region: Option<String>) -> Self {
        Self { city, region }
    }

    /// Joins the present, non-blank fields; falls back to `placeholder`.
    pub fn display(&self, placeholder: &str) -> String {
        let parts: Vec<&str> = [self.city.as_deref(), self.region.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            placeholder.to_string()
        } else {
            parts.join(", ")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PrayerName {
    Fajr,
    Sunrise,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerName {
    pub const ALL: [PrayerName; 6] = [
        PrayerName::Fajr,
        PrayerName::Sunrise,
        PrayerName::Dhuhr,
        PrayerName::Asr,
        PrayerName::Maghrib,
        PrayerName::Isha,
    ];

    pub const MANDATORY: [PrayerName; 5] = [
        PrayerName::Fajr,
        PrayerName::Dhuhr,
        PrayerName::Asr,
        PrayerName::Maghrib,
        PrayerName::Isha,
    ];

    /// Key used by the remote timings object.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrayerName::Fajr => "Fajr",
            PrayerName::Sunrise => "Sunrise",
            PrayerName::Dhuhr => "Dhuhr",
            PrayerName::Asr => "Asr",
            PrayerName::Maghrib => "Maghrib",
            PrayerName::Isha => "Isha",
        }
    }

    pub fn is_mandatory(&self) -> bool {
        !matches!(self, PrayerName::Sunrise)
    }
}

impl fmt::Display for PrayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A complete prayer-time schedule for one day.
///
/// Only built through [`Schedule::from_response`] or [`Schedule::from_timings`],
/// both of which reject payloads missing any mandatory prayer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schedule {
    times: BTreeMap<PrayerName, String>,
}

impl Schedule {
    /// Validates the `data.timings` envelope of a schedule API response.
    pub fn from_response(body: &serde_json::Value) -> Result<Self> {
        let data = body
            .get("data")
            .ok_or_else(|| ResolveError::invalid_schedule("response has no 'data' field"))?;
        let timings = data
            .get("timings")
            .ok_or_else(|| ResolveError::invalid_schedule("'data' has no 'timings' field"))?
            .as_object()
            .ok_or_else(|| ResolveError::invalid_schedule("'data.timings' is not an object"))?;

        Self::from_timings(timings)
    }

    pub fn from_timings(timings: &serde_json::Map<String, serde_json::Value>) -> Result<Self> {
        let mut times = BTreeMap::new();

        for name in PrayerName::ALL {
            let value = timings
                .get(name.as_str())
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|v| !v.is_empty());

            match value {
                Some(time) if parse_clock(time).is_some() => {
                    times.insert(name, time.to_string());
                }
                Some(time) if name.is_mandatory() => {
                    return Err(ResolveError::invalid_schedule(format!(
                        "'{}' is not a clock time: '{}'",
                        name, time
                    )));
                }
                None if name.is_mandatory() => {
                    return Err(ResolveError::invalid_schedule(format!(
                        "timings is missing mandatory key '{}'",
                        name
                    )));
                }
                _ => {}
            }
        }

        Ok(Self { times })
    }

    pub fn get(&self, name: PrayerName) -> Option<&str> {
        self.times.get(&name).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = PrayerName> + '_ {
        self.times.keys().copied()
    }

    /// Entries in day order.
    pub fn iter(&self) -> impl Iterator<Item = (PrayerName, &str)> + '_ {
        self.times.iter().map(|(name, time)| (*name, time.as_str()))
    }

    /// Parses the leading `HH:MM` token; the API may append a zone suffix such as `(+03)`.
    pub fn time_of(&self, name: PrayerName) -> Option<NaiveTime> {
        parse_clock(self.get(name)?)
    }

    /// First mandatory prayer strictly after `now`, if any remains today.
    pub fn next_after(&self, now: NaiveTime) -> Option<(PrayerName, NaiveTime)> {
        PrayerName::MANDATORY
            .into_iter()
            .filter_map(|name| self.time_of(name).map(|time| (name, time)))
            .find(|(_, time)| *time > now)
    }
}

fn parse_clock(value: &str) -> Option<NaiveTime> {
    let token = value.split_whitespace().next()?;
    NaiveTime::parse_from_str(token, "%H:%M").ok()
}

/// Free-text city input, trimmed. Blank input is rejected before any network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitySearchInput(String);

impl CitySearchInput {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ResolveError::EmptyInput);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Parameters of a by-city schedule lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityQuery {
    pub city: String,
    pub country: String,
    pub method: u32,
}

impl CityQuery {
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            country: DEFAULT_COUNTRY.to_string(),
            method: DEFAULT_METHOD,
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn with_method(mut self, method: u32) -> Self {
        self.method = method;
        self
    }
}

/// Parameters of a by-coordinates schedule lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateQuery {
    pub coordinates: Coordinates,
    pub method: u32,
}

impl CoordinateQuery {
    pub fn new(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            method: DEFAULT_METHOD,
        }
    }

    pub fn with_method(mut self, method: u32) -> Self {
        self.method = method;
        self
    }
}

/// Raw answer of the platform permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DenialCause {
    /// The user (or a policy) declined the prompt.
    UserDeclined,
    /// The permission call itself failed.
    PlatformError,
}

/// Proof that foreground location permission was granted for the current attempt.
///
/// Only the coordinator can mint one, so a position lookup without a grant
/// does not compile.
#[derive(Debug)]
pub struct LocationGrant {
    _private: (),
}

impl LocationGrant {
    pub(crate) fn new() -> Self {
        Self { _private: () }
    }
}

#[derive(Debug)]
pub enum Permission {
    Granted(LocationGrant),
    Denied(DenialCause),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
}

/// Closed taxonomy of reasons a resolution attempt can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureReason {
    PermissionDenied(DenialCause),
    LocationUnavailable,
    NetworkError,
    InvalidScheduleResponse,
    EmptyInput,
}

impl FailureReason {
    fn specificity(&self) -> u8 {
        match self {
            FailureReason::NetworkError => 0,
            FailureReason::LocationUnavailable => 1,
            FailureReason::PermissionDenied(_) => 2,
            FailureReason::InvalidScheduleResponse => 3,
            FailureReason::EmptyInput => 4,
        }
    }

    /// Picks the more actionable of two reasons that both apply.
    pub fn more_specific(a: FailureReason, b: FailureReason) -> FailureReason {
        if b.specificity() > a.specificity() {
            b
        } else {
            a
        }
    }

    /// Whether re-triggering the same flow unchanged can help.
    pub fn is_retryable(&self) -> bool {
        match self {
            FailureReason::NetworkError | FailureReason::LocationUnavailable => true,
            FailureReason::PermissionDenied(DenialCause::PlatformError) => true,
            FailureReason::PermissionDenied(DenialCause::UserDeclined)
            | FailureReason::InvalidScheduleResponse
            | FailureReason::EmptyInput => false,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            FailureReason::EmptyInput => ErrorSeverity::Low,
            FailureReason::NetworkError | FailureReason::LocationUnavailable => {
                ErrorSeverity::Medium
            }
            FailureReason::PermissionDenied(_) | FailureReason::InvalidScheduleResponse => {
                ErrorSeverity::High
            }
        }
    }

    pub fn user_friendly_message(&self) -> &'static str {
        match self {
            FailureReason::PermissionDenied(DenialCause::UserDeclined) => {
                "Location permission denied."
            }
            FailureReason::PermissionDenied(DenialCause::PlatformError) => {
                "Location permission could not be requested."
            }
            FailureReason::LocationUnavailable => "Location could not be obtained.",
            FailureReason::NetworkError => "Prayer times could not be obtained.",
            FailureReason::InvalidScheduleResponse => {
                "The prayer time service returned an unusable answer."
            }
            FailureReason::EmptyInput => "Please enter a city name.",
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            FailureReason::PermissionDenied(DenialCause::UserDeclined) => {
                "Allow location access and try again, or search for a city instead."
            }
            FailureReason::PermissionDenied(DenialCause::PlatformError) => {
                "Try again, or search for a city instead."
            }
            FailureReason::LocationUnavailable => {
                "Check that location services are enabled, or search for a city instead."
            }
            FailureReason::NetworkError => "Check your connection and try again.",
            FailureReason::InvalidScheduleResponse => {
                "Check the city name and country, or the configured API endpoint."
            }
            FailureReason::EmptyInput => "Type a city name before searching.",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.user_friendly_message())
    }
}

/// Where a resolved schedule applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ResolvedPlace {
    Located { label: PlaceLabel, display: String },
    City { name: String },
}

impl ResolvedPlace {
    pub fn display_label(&self) -> &str {
        match self {
            ResolvedPlace::Located { display, .. } => display,
            ResolvedPlace::City { name } => name,
        }
    }
}

/// Observable state of the resolution engine. Every transition replaces the whole value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ResolutionState {
    Idle,
    RequestingPermission,
    Locating,
    /// Coordinates exist; reverse geocode and schedule fetch are both in flight.
    ReverseGeocoding,
    FetchingSchedule,
    Resolved {
        schedule: Schedule,
        place: ResolvedPlace,
    },
    SearchFailed {
        reason: FailureReason,
    },
}

impl ResolutionState {
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            ResolutionState::RequestingPermission
                | ResolutionState::Locating
                | ResolutionState::ReverseGeocoding
                | ResolutionState::FetchingSchedule
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ResolutionState::Resolved { .. } | ResolutionState::SearchFailed { .. }
        )
    }

    pub fn schedule(&self) -> Option<&Schedule> {
        match self {
            ResolutionState::Resolved { schedule, .. } => Some(schedule),
            _ => None,
        }
    }

    pub fn display_label(&self) -> Option<&str> {
        match self {
            ResolutionState::Resolved { place, .. } => Some(place.display_label()),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<FailureReason> {
        match self {
            ResolutionState::SearchFailed { reason } => Some(*reason),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResolutionState::Idle => "Idle",
            ResolutionState::RequestingPermission => "RequestingPermission",
            ResolutionState::Locating => "Locating",
            ResolutionState::ReverseGeocoding => "ReverseGeocoding",
            ResolutionState::FetchingSchedule => "FetchingSchedule",
            ResolutionState::Resolved { .. } => "Resolved",
            ResolutionState::SearchFailed { .. } => "SearchFailed",
        }
    }
}
