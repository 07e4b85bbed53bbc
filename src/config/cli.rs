use crate::adapters::location::StaticDevice;
use crate::config::toml_config::EngineConfig;
use crate::config::CliConfig;
use crate::domain::model::PlaceLabel;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};

impl CliConfig {
    pub fn position(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    /// `"city,region"` or just `"city"`.
    pub fn place_label(&self) -> Option<PlaceLabel> {
        let raw = self.place.as_deref()?;
        let (city, region) = match raw.split_once(',') {
            Some((city, region)) => (city, Some(region)),
            None => (raw, None),
        };
        let non_blank = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());
        Some(PlaceLabel::new(non_blank(city), region.and_then(non_blank)))
    }

    pub fn device(&self) -> StaticDevice {
        let mut device = StaticDevice::new(self.position());
        if let Some(place) = self.place_label() {
            device = device.with_place(place);
        }
        if self.deny_permission {
            device = device.denying();
        }
        device
    }

    pub fn engine_config(&self) -> Result<EngineConfig> {
        match &self.config {
            Some(path) => EngineConfig::from_file(path),
            None => Ok(EngineConfig::default()),
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(country) = &self.country {
            validation::validate_non_empty_string("country", country)?;
        }
        if let Some(method) = self.method {
            validation::validate_range("method", method, 0, 99)?;
        }
        if let Some(latitude) = self.latitude {
            validation::validate_range("latitude", latitude, -90.0, 90.0)?;
        }
        if let Some(longitude) = self.longitude {
            validation::validate_range("longitude", longitude, -180.0, 180.0)?;
        }
        Ok(())
    }
}
