//! Real Grand Rapids, MI area locations for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap. Spread across downtown, the
//! northeast side and Wyoming/Kentwood so multi-rep runs form distinct
//! geographic clusters.

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
}

// ============================================================================
// Downtown Grand Rapids
// ============================================================================

pub const DOWNTOWN: &[Location] = &[
    Location::new("Amway Grand Plaza", 42.9687, -85.6726),
    Location::new("Van Andel Arena", 42.9622, -85.6715),
    Location::new("DeVos Place", 42.9712, -85.6729),
    Location::new("Founders Brewing", 42.9578, -85.6740),
    Location::new("Grand Rapids Art Museum", 42.9668, -85.6704),
    Location::new("Bridgewater Place", 42.9701, -85.6756),
];

// ============================================================================
// Northeast side / Plainfield corridor
// ============================================================================

pub const NORTHEAST: &[Location] = &[
    Location::new("Celebration Cinema North", 43.0123, -85.6211),
    Location::new("Knapp's Corner Meijer", 43.0080, -85.6044),
    Location::new("Plainfield Plaza", 43.0221, -85.6510),
    Location::new("Northview Plaza", 43.0302, -85.6240),
];

// ============================================================================
// Wyoming / Kentwood (southwest and southeast suburbs)
// ============================================================================

pub const SOUTH_SUBURBS: &[Location] = &[
    Location::new("Rivertown Crossings", 42.8783, -85.7627),
    Location::new("Metro Health Village", 42.8599, -85.7258),
    Location::new("Woodland Mall", 42.9129, -85.5876),
    Location::new("Centerpointe Mall", 42.9119, -85.5943),
];
