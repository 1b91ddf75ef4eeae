//! Route result entities returned by a routing capability.

use serde::{Deserialize, Serialize};

use crate::error::GeoError;
use crate::geo::{GeoPath, GeoPoint};

/// A departure or arrival location of a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// The coordinate that was asked for.
    pub original: GeoPoint,
    /// The coordinate snapped onto the routable network, when known.
    pub map_matched: Option<GeoPoint>,
}

impl Place {
    pub fn new(original: GeoPoint) -> Self {
        Self {
            original,
            map_matched: None,
        }
    }

    pub fn matched(original: GeoPoint, map_matched: GeoPoint) -> Self {
        Self {
            original,
            map_matched: Some(map_matched),
        }
    }

    /// Map-matched point, falling back to the requested one.
    pub fn display_point(&self) -> GeoPoint {
        self.map_matched.unwrap_or(self.original)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManeuverAction {
    Depart,
    Arrive,
    Continue,
    LeftTurn,
    RightTurn,
    SlightLeftTurn,
    SlightRightTurn,
    SharpLeftTurn,
    SharpRightTurn,
    UTurn,
    Merge,
    Roundabout,
    Other(String),
}

/// A discrete driving instruction at a point along a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Maneuver {
    pub action: ManeuverAction,
    pub location: GeoPoint,
    /// Name of the road the maneuver leads onto, if any.
    pub road_name: Option<String>,
}

/// Non-fatal advisory attached to a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionNotice {
    pub code: String,
    pub message: String,
}

/// A contiguous part of a route between two waypoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    departure: Place,
    arrival: Place,
    geometry: GeoPath,
    duration_secs: u64,
    length_meters: u64,
    maneuvers: Vec<Maneuver>,
    notices: Vec<SectionNotice>,
}

impl Section {
    pub fn new(
        departure: Place,
        arrival: Place,
        geometry: GeoPath,
        duration_secs: u64,
        length_meters: u64,
    ) -> Self {
        Self {
            departure,
            arrival,
            geometry,
            duration_secs,
            length_meters,
            maneuvers: Vec::new(),
            notices: Vec::new(),
        }
    }

    pub fn with_maneuvers(mut self, maneuvers: Vec<Maneuver>) -> Self {
        self.maneuvers = maneuvers;
        self
    }

    pub fn with_notices(mut self, notices: Vec<SectionNotice>) -> Self {
        self.notices = notices;
        self
    }

    pub fn departure(&self) -> &Place {
        &self.departure
    }

    pub fn arrival(&self) -> &Place {
        &self.arrival
    }

    pub fn geometry(&self) -> &GeoPath {
        &self.geometry
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn length_meters(&self) -> u64 {
        self.length_meters
    }

    pub fn maneuvers(&self) -> &[Maneuver] {
        &self.maneuvers
    }

    pub fn notices(&self) -> &[SectionNotice] {
        &self.notices
    }
}

/// A calculated route: one or more sections in travel order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRoute")]
pub struct Route {
    sections: Vec<Section>,
    geometry: GeoPath,
}

/// Serialized geometry is ignored; it is always rebuilt from the sections.
#[derive(Deserialize)]
struct RawRoute {
    sections: Vec<Section>,
}

impl TryFrom<RawRoute> for Route {
    type Error = GeoError;

    fn try_from(raw: RawRoute) -> Result<Self, Self::Error> {
        Route::new(raw.sections)
    }
}

impl Route {
    /// Builds a route, rejecting an empty section list.
    pub fn new(sections: Vec<Section>) -> Result<Self, GeoError> {
        let geometry = GeoPath::concat(sections.iter().map(Section::geometry))?;
        Ok(Self { sections, geometry })
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Full geometry across all sections.
    pub fn geometry(&self) -> &GeoPath {
        &self.geometry
    }

    pub fn duration_secs(&self) -> u64 {
        self.sections.iter().map(Section::duration_secs).sum()
    }

    pub fn length_meters(&self) -> u64 {
        self.sections.iter().map(Section::length_meters).sum()
    }

    /// Departure place of the first section.
    pub fn departure(&self) -> &Place {
        self.sections[0].departure()
    }

    /// Arrival place of the last section.
    pub fn arrival(&self) -> &Place {
        self.sections[self.sections.len() - 1].arrival()
    }

    pub fn maneuvers(&self) -> impl Iterator<Item = &Maneuver> {
        self.sections.iter().flat_map(|section| section.maneuvers.iter())
    }

    pub fn notices(&self) -> impl Iterator<Item = &SectionNotice> {
        self.sections.iter().flat_map(|section| section.notices.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    fn section(from: GeoPoint, to: GeoPoint, secs: u64, meters: u64) -> Section {
        Section::new(
            Place::new(from),
            Place::new(to),
            GeoPath::new(vec![from, to]).unwrap(),
            secs,
            meters,
        )
    }

    #[test]
    fn test_route_requires_sections() {
        assert_eq!(Route::new(vec![]), Err(GeoError::PathTooShort(0)));
    }

    #[test]
    fn test_totals_sum_sections() {
        let route = Route::new(vec![
            section(p(0.0, 0.0), p(0.0, 1.0), 600, 1200),
            section(p(0.0, 1.0), p(1.0, 1.0), 930, 1140),
        ])
        .unwrap();
        assert_eq!(route.duration_secs(), 1530);
        assert_eq!(route.length_meters(), 2340);
        assert_eq!(route.geometry().points().len(), 3);
    }

    #[test]
    fn test_departure_and_arrival_use_outer_sections() {
        let first = Section::new(
            Place::matched(p(0.0, 0.0), p(0.001, 0.0)),
            Place::new(p(0.0, 1.0)),
            GeoPath::new(vec![p(0.001, 0.0), p(0.0, 1.0)]).unwrap(),
            10,
            10,
        );
        let last = Section::new(
            Place::new(p(0.0, 1.0)),
            Place::matched(p(1.0, 1.0), p(1.0, 1.002)),
            GeoPath::new(vec![p(0.0, 1.0), p(1.0, 1.002)]).unwrap(),
            10,
            10,
        );
        let route = Route::new(vec![first, last]).unwrap();
        assert_eq!(route.departure().display_point(), p(0.001, 0.0));
        assert_eq!(route.arrival().display_point(), p(1.0, 1.002));
    }

    #[test]
    fn test_notices_span_sections() {
        let notice = SectionNotice {
            code: "restriction".to_string(),
            message: "route may violate a turn restriction".to_string(),
        };
        let route = Route::new(vec![
            section(p(0.0, 0.0), p(0.0, 1.0), 1, 1),
            section(p(0.0, 1.0), p(1.0, 1.0), 1, 1).with_notices(vec![notice.clone()]),
        ])
        .unwrap();
        assert_eq!(route.notices().collect::<Vec<_>>(), vec![&notice]);
    }

    #[test]
    fn test_deserialize_rejects_empty_sections() {
        let json = r#"{"sections": [], "geometry": [{"lat": 0.0, "lng": 0.0}, {"lat": 1.0, "lng": 1.0}]}"#;
        assert!(serde_json::from_str::<Route>(json).is_err());
    }

    #[test]
    fn test_deserialize_rebuilds_geometry_from_sections() {
        let route = Route::new(vec![
            section(p(0.0, 0.0), p(0.0, 1.0), 600, 1200),
            section(p(0.0, 1.0), p(1.0, 1.0), 930, 1140),
        ])
        .unwrap();
        let mut json = serde_json::to_value(&route).unwrap();
        json["geometry"] = serde_json::json!([{"lat": 50.0, "lng": 50.0}, {"lat": 51.0, "lng": 51.0}]);

        let decoded: Route = serde_json::from_value(json).unwrap();
        assert_eq!(decoded.geometry(), route.geometry());
        assert_eq!(decoded, route);
    }
}
