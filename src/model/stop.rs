use serde::{Deserialize, Serialize};

use crate::error::ResolutionError;

use super::gemini_api_model::GeminiStop;

const UNKNOWN_STOP: &str = "Unknown Stop";
const UNKNOWN_CITY: &str = "Unknown City";

/// A resolved real-world bus stop.
///
/// Can only be built with finite, in-range coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopRecord {
    id: String,
    name: String,
    latitude: f64,
    longitude: f64,
    city: Option<String>,
    description: Option<String>,
}

impl StopRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        city: Option<String>,
        description: Option<String>,
    ) -> Result<Self, ResolutionError> {
        validate_coordinates(latitude, longitude)?;

        Ok(StopRecord {
            id: id.into(),
            name: name.into(),
            latitude,
            longitude,
            city,
            description,
        })
    }

    /// The lookup service sometimes leaves out the name or the city, those get placeholders.
    pub fn try_from_gemini_stop(value: GeminiStop, id: &str) -> Result<Self, ResolutionError> {
        let name = non_blank(value.name).unwrap_or_else(|| UNKNOWN_STOP.to_string());
        let city = non_blank(value.city).or_else(|| Some(UNKNOWN_CITY.to_string()));

        StopRecord::new(
            id,
            name,
            value.latitude,
            value.longitude,
            city,
            non_blank(value.description),
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Latitude must be within [-90, 90] and longitude within [-180, 180].
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), ResolutionError> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(ResolutionError::InvalidCoordinate {
            field: "latitude",
            value: latitude,
        });
    }

    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(ResolutionError::InvalidCoordinate {
            field: "longitude",
            value: longitude,
        });
    }

    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A grounding citation shown next to the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub uri: String,
    pub title: String,
}
