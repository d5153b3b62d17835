//! Projection of latitude/longitude onto the block grid.
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{GridCoords, LAT_TO_METERS, LNG_TO_METERS, Origin, SEOUL_STATION, Source, StopRecord};
use crate::resolver::Resolution;

/// Maps a real-world point onto the grid around `origin`.
///
/// Longitude grows the X axis, latitude shrinks the Z axis (north is -Z).
/// Values are rounded half away from zero, so 2.5 becomes 3 and -2.5 becomes -3.
pub fn convert(lat: f64, lng: f64, origin: &Origin, lat_scale: f64, lng_scale: f64) -> GridCoords {
    let delta_lat = lat - origin.latitude;
    let delta_lng = lng - origin.longitude;

    GridCoords {
        x: (delta_lng * lng_scale).round() as i64,
        y: origin.altitude,
        z: (-delta_lat * lat_scale).round() as i64,
        origin_name: origin.name.to_string(),
    }
}

/// Converts a stop relative to Seoul Station.
pub fn convert_stop(stop: &StopRecord) -> GridCoords {
    convert(
        stop.latitude(),
        stop.longitude(),
        &SEOUL_STATION,
        LAT_TO_METERS,
        LNG_TO_METERS,
    )
}

/// Everything shown for a successful search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionResult {
    pub stop: StopRecord,
    pub coords: GridCoords,
    pub sources: Vec<Source>,
    pub teleport_command: String,
    pub resolved_at: DateTime<Utc>,
}

impl From<Resolution> for ConversionResult {
    fn from(value: Resolution) -> Self {
        let coords = convert_stop(&value.stop);

        ConversionResult {
            teleport_command: coords.teleport_command(),
            stop: value.stop,
            coords,
            sources: value.sources,
            resolved_at: Utc::now(),
        }
    }
}
