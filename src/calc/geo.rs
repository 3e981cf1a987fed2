//! Distance arithmetic for GPS run tracks

use serde::{Deserialize, Serialize};

/// Mean Earth radius in metres
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// One GPS sample, serialised as `[lat, lon]` in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint(pub f64, pub f64);

impl GeoPoint {
    pub fn lat(&self) -> f64 {
        self.0
    }

    pub fn lon(&self) -> f64 {
        self.1
    }

    pub fn is_valid(&self) -> bool {
        self.0.is_finite()
            && self.1.is_finite()
            && (-90.0..=90.0).contains(&self.0)
            && (-180.0..=180.0).contains(&self.1)
    }
}

/// Great-circle distance between two points, in metres
pub fn haversine_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat() - a.lat()).to_radians();
    let d_lon = (b.lon() - a.lon()).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat().to_radians().cos() * b.lat().to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Sum of the legs between consecutive samples
pub fn track_distance(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|leg| haversine_distance(leg[0], leg[1]))
        .sum()
}

/// XP for a run: one point per 100 metres, rounded
pub fn run_xp(distance_m: f64) -> u32 {
    if !distance_m.is_finite() || distance_m <= 0.0 {
        return 0;
    }
    (distance_m / 100.0).round() as u32
}
