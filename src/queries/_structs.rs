use serde::{Deserialize, Serialize};

/// A point on the map. Coordinates are WGS84 degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Location {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            name: None,
        }
    }

    pub fn named(lat: f64, lng: f64, name: impl Into<String>) -> Self {
        Self {
            lat,
            lng,
            name: Some(name.into()),
        }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Raw lat/lng pair as it appears in place coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// The three supported travel profiles. Public-transport requests are
/// approximated with the driving profile until a transit router is wired in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Walking,
    Cycling,
    Driving,
}

impl Mode {
    pub fn is_sustainable(self) -> bool {
        matches!(self, Mode::Walking | Mode::Cycling)
    }

    /// Profile segment expected by the routing service URL.
    pub fn profile(self) -> &'static str {
        match self {
            Mode::Walking => "walking",
            Mode::Cycling => "cycling",
            Mode::Driving => "driving",
        }
    }

    /// Catalog entry for the mode, with its display name.
    pub fn descriptor(self) -> TransportMode {
        match self {
            Mode::Driving => TransportMode {
                id: "car".into(),
                name: "Car".into(),
                icon: "🚗".into(),
                is_sustainable: false,
                accessibility: "high".into(),
            },
            Mode::Walking => TransportMode {
                id: "walk".into(),
                name: "Walking".into(),
                icon: "🚶".into(),
                is_sustainable: true,
                accessibility: "high".into(),
            },
            Mode::Cycling => TransportMode {
                id: "bike".into(),
                name: "Cycling".into(),
                icon: "🚲".into(),
                is_sustainable: true,
                accessibility: "medium".into(),
            },
        }
    }

    /// Mode object attached to a requested route, which reports the wire
    /// profile rather than the catalog display name.
    pub fn route_descriptor(self) -> TransportMode {
        TransportMode {
            name: self.profile().into(),
            ..self.descriptor()
        }
    }
}

/// Display-oriented view of a travel mode, embedded in every route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportMode {
    pub id: String,
    pub name: String,
    pub icon: String,
    #[serde(rename = "isSustainable")]
    pub is_sustainable: bool,
    pub accessibility: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Accessibility {
    pub wheelchair: bool,
    pub audio: bool,
    pub visual: bool,
}

impl Accessibility {
    pub fn full() -> Self {
        Self {
            wheelchair: true,
            audio: true,
            visual: true,
        }
    }
}

/// A point of interest normalized from heterogeneous geodata tags.
/// Missing textual fields carry explicit sentinels, never empty strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Great-circle distance from the query origin, in kilometers.
    pub distance: f64,
    pub coordinates: Coordinates,
    pub address: String,
    pub phone: String,
    pub website: String,
    pub opening_hours: String,
    pub rating: Option<f64>,
    pub wheelchair: String,
    pub smoking: String,
    pub cuisine: Option<String>,
    pub brand: Option<String>,
    pub operator: Option<String>,
    pub capacity: Option<String>,
    pub fee: String,
    pub parking: String,
    pub public_transport: String,
    pub accessibility: Accessibility,
}

/// Resolved endpoint of a route, kept for the visible reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub address: String,
    pub phone: String,
    pub website: String,
    pub opening_hours: String,
    pub accessibility: Accessibility,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    #[serde(default)]
    pub instruction: String,
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub intersections: Vec<serde_json::Value>,
    #[serde(default)]
    pub geometry: serde_json::Value,
}

/// GeoJSON-shaped line geometry, coordinates as [lng, lat] pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<[f64; 2]>,
}

impl RouteGeometry {
    pub fn line(coordinates: Vec<[f64; 2]>) -> Self {
        Self {
            kind: "LineString".into(),
            coordinates,
        }
    }
}

/// A computed or synthesized path. Never mutated after construction, only
/// reassembled into new values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub mode: TransportMode,
    /// Total distance in meters.
    pub distance: f64,
    /// Total duration in seconds.
    pub duration: f64,
    #[serde(rename = "carbonFootprint")]
    pub carbon_footprint: f64,
    pub accessibility: Accessibility,
    pub steps: Vec<RouteStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<RouteGeometry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<Destination>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sustainability {
    #[serde(rename = "carbonFootprint")]
    pub carbon_footprint: f64,
    #[serde(rename = "greenScore")]
    pub green_score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealTimeUpdates {
    pub traffic: String,
    pub weather: String,
    pub incidents: Vec<String>,
}

impl RealTimeUpdates {
    /// Static stand-in until a live traffic/weather feed is integrated.
    pub fn mock() -> Self {
        Self {
            traffic: "Moderate".into(),
            weather: "Clear".into(),
            incidents: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealTimeInfo {
    pub status: String,
    #[serde(rename = "nextUpdate", skip_serializing_if = "Option::is_none")]
    pub next_update: Option<String>,
}

/// An amenity record for the current position, used by the non-route
/// mobility snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobilityAmenity {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub location: Location,
    pub accessibility: Vec<String>,
    #[serde(rename = "realTimeInfo", skip_serializing_if = "Option::is_none")]
    pub real_time_info: Option<RealTimeInfo>,
}

/// Top-level envelope returned alongside the generated reply. Built fresh
/// per request, carries no identity across requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobilityResponse {
    pub routes: Vec<Route>,
    pub amenities: Vec<MobilityAmenity>,
    pub sustainability: Sustainability,
    pub accessibility: Accessibility,
    #[serde(rename = "realTimeUpdates")]
    pub real_time_updates: RealTimeUpdates,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_validation_bounds() {
        assert!(Location::new(51.505, -0.09).is_valid());
        assert!(Location::new(-90.0, 180.0).is_valid());
        assert!(!Location::new(90.5, 0.0).is_valid());
        assert!(!Location::new(0.0, -180.1).is_valid());
    }

    #[test]
    fn mode_sustainability_flags() {
        assert!(Mode::Walking.is_sustainable());
        assert!(Mode::Cycling.is_sustainable());
        assert!(!Mode::Driving.is_sustainable());
    }

    #[test]
    fn descriptors_carry_display_names() {
        assert_eq!(Mode::Driving.descriptor().name, "Car");
        assert_eq!(Mode::Walking.descriptor().name, "Walking");
        assert_eq!(Mode::Cycling.descriptor().name, "Cycling");
    }

    #[test]
    fn route_descriptor_uses_the_wire_profile() {
        let driving = Mode::Driving.route_descriptor();
        assert_eq!(driving.name, "driving");
        assert_eq!(driving.id, "car");
        assert!(!driving.is_sustainable);
        assert_eq!(Mode::Cycling.route_descriptor().name, "cycling");
    }

    #[test]
    fn mobility_response_serializes_with_camel_case_envelope() {
        let resp = MobilityResponse {
            routes: vec![],
            amenities: vec![],
            sustainability: Sustainability {
                carbon_footprint: 0.0,
                green_score: 100,
            },
            accessibility: Accessibility::full(),
            real_time_updates: RealTimeUpdates::mock(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["sustainability"]["greenScore"], 100);
        assert_eq!(json["realTimeUpdates"]["traffic"], "Moderate");
    }
}
