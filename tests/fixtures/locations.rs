//! Real locations for realistic test fixtures.
//!
//! The first two are the default trip endpoints; the rest are nearby points
//! used as alternative destinations and intermediate stops.

use route_planner::geo::GeoPoint;
use route_planner::request::Waypoint;

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng).expect("fixture coordinates are valid")
    }

    pub fn waypoint(&self) -> Waypoint {
        Waypoint::new(self.point())
    }
}

pub const TRIP_START: Location = Location::new("Trip start", 33.7046767, -7.362642);
pub const TRIP_END: Location = Location::new("Trip end", 33.706628, -7.3584743);

pub const NEARBY: &[Location] = &[
    Location::new("Benslimane centre", 33.6167, -7.1212),
    Location::new("Mohammedia port", 33.7151, -7.3993),
    Location::new("Bouznika beach", 33.7890, -7.1596),
];
