//! Coordinate and polyline value types.
//!
//! Both types are immutable once constructed and validate their invariants
//! up front, so the rest of the crate can pass them around freely.

use serde::{Deserialize, Serialize};

use crate::error::GeoError;

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
}

impl GeoPoint {
    /// Creates a point, rejecting non-finite or out-of-range components.
    pub fn new(lat: f64, lng: f64) -> Result<Self, GeoError> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(GeoError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(GeoError::LongitudeOutOfRange(lng));
        }
        Ok(Self { lat, lng })
    }

    /// For compile-time constants already known to be in range.
    pub(crate) const fn new_unchecked(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Returns the point as a (latitude, longitude) tuple.
    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

#[derive(Deserialize)]
struct RawGeoPoint {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = GeoError;

    fn try_from(raw: RawGeoPoint) -> Result<Self, Self::Error> {
        GeoPoint::new(raw.lat, raw.lng)
    }
}

impl TryFrom<(f64, f64)> for GeoPoint {
    type Error = GeoError;

    fn try_from((lat, lng): (f64, f64)) -> Result<Self, Self::Error> {
        GeoPoint::new(lat, lng)
    }
}

/// An ordered sequence of points describing a route geometry.
///
/// Always holds at least two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<GeoPoint>", into = "Vec<GeoPoint>")]
pub struct GeoPath {
    points: Vec<GeoPoint>,
}

impl GeoPath {
    pub fn new(points: Vec<GeoPoint>) -> Result<Self, GeoError> {
        if points.len() < 2 {
            return Err(GeoError::PathTooShort(points.len()));
        }
        Ok(Self { points })
    }

    /// Joins paths end to end, dropping a joint point repeated at the seam.
    pub fn concat<'a>(paths: impl IntoIterator<Item = &'a GeoPath>) -> Result<Self, GeoError> {
        let mut points: Vec<GeoPoint> = Vec::new();
        for path in paths {
            let skip = usize::from(points.last() == path.points.first());
            points.extend(path.points.iter().skip(skip).copied());
        }
        Self::new(points)
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn first(&self) -> GeoPoint {
        self.points[0]
    }

    pub fn last(&self) -> GeoPoint {
        self.points[self.points.len() - 1]
    }

    /// Smallest box containing every point, as (south-west, north-east).
    pub fn bounds(&self) -> (GeoPoint, GeoPoint) {
        let mut min = self.points[0];
        let mut max = self.points[0];
        for point in &self.points[1..] {
            min.lat = min.lat.min(point.lat);
            min.lng = min.lng.min(point.lng);
            max.lat = max.lat.max(point.lat);
            max.lng = max.lng.max(point.lng);
        }
        (min, max)
    }

    pub fn into_points(self) -> Vec<GeoPoint> {
        self.points
    }
}

impl TryFrom<Vec<GeoPoint>> for GeoPath {
    type Error = GeoError;

    fn try_from(points: Vec<GeoPoint>) -> Result<Self, Self::Error> {
        GeoPath::new(points)
    }
}

impl From<GeoPath> for Vec<GeoPoint> {
    fn from(path: GeoPath) -> Self {
        path.points
    }
}
