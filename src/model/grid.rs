use serde::Serialize;

/// Real-world point that sits at grid position (0, altitude, 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Origin {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    /// Grid Y every converted point is placed at
    pub altitude: i64,
}

/// Seoul Station is the (0, 0) of the South Korea map. Y 64 is sea level.
pub const SEOUL_STATION: Origin = Origin {
    name: "Seoul Station (서울역)",
    latitude: 37.5547,
    longitude: 126.9706,
    altitude: 64,
};

/// Meters per degree of latitude.
pub const LAT_TO_METERS: f64 = 111320.0;

/// Meters per degree of longitude at roughly 37.5°N.
pub const LNG_TO_METERS: f64 = 88000.0;

/// Block coordinates, 1 block = 1 meter.
///
/// +X is east, +Z is south.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridCoords {
    pub x: i64,
    pub y: i64,
    pub z: i64,
    pub origin_name: String,
}

impl GridCoords {
    pub fn teleport_command(&self) -> String {
        format!("/tp @s {} {} {}", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teleport_command() {
        let coords = GridCoords {
            x: -1520,
            y: 64,
            z: 387,
            origin_name: SEOUL_STATION.name.to_string(),
        };

        assert_eq!(coords.teleport_command(), "/tp @s -1520 64 387");
    }
}
