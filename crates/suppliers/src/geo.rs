//! Geography: address resolution and nearest-branch lookup.
//!
//! Branch locations are a static per-supplier table; only the free-text
//! address resolution goes through the injectable [`Geocoder`].

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::kind::SupplierKind;

/// A WGS84 coordinate pair.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Great-circle distance in kilometers (haversine, mean earth radius).
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;

    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Resolves free-text addresses to coordinates.
///
/// Implementations typically wrap an external geocoding service; selection
/// logic only depends on this trait so tests can stub it. An unresolvable
/// address is `None`, never an error.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, address_text: &str) -> Option<Coordinates>;
}

/// One physical branch of a supplier.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub name: &'static str,
    pub location: Coordinates,
}

const fn branch(name: &'static str, lat: f64, lng: f64) -> Branch {
    Branch {
        name,
        location: Coordinates::new(lat, lng),
    }
}

const BUILDMAX_BRANCHES: &[Branch] = &[
    branch("BuildMax Berlin-Spandau", 52.5354, 13.1997),
    branch("BuildMax Hamburg-Harburg", 53.4609, 9.9872),
    branch("BuildMax Munich-Freimann", 48.2108, 11.6121),
    branch("BuildMax Cologne-Ossendorf", 50.9745, 6.8803),
];

const TOOLHAUS_BRANCHES: &[Branch] = &[
    branch("ToolHaus Frankfurt-Ost", 50.1213, 8.7433),
    branch("ToolHaus Stuttgart-Feuerbach", 48.8122, 9.1581),
    branch("ToolHaus Leipzig-Nord", 51.3824, 12.3716),
    branch("ToolHaus Hannover-Linden", 52.3662, 9.6897),
];

const METROSUPPLY_BRANCHES: &[Branch] = &[
    branch("MetroSupply Berlin-Marzahn", 52.5447, 13.5634),
    branch("MetroSupply Dortmund-Hafen", 51.5291, 7.4406),
    branch("MetroSupply Nuremberg-Sued", 49.4214, 11.1133),
];

/// Nearest branch of one supplier relative to a resolved address.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchMatch {
    pub branch_name: &'static str,
    pub distance_km: f64,
}

/// Static per-supplier branch table with nearest-branch lookup.
#[derive(Debug, Clone)]
pub struct BranchDirectory {
    branches: HashMap<SupplierKind, Vec<Branch>>,
}

impl Default for BranchDirectory {
    fn default() -> Self {
        Self::builtin()
    }
}

impl BranchDirectory {
    /// The built-in branch tables for all known backends.
    pub fn builtin() -> Self {
        let mut branches = HashMap::new();
        branches.insert(SupplierKind::Buildmax, BUILDMAX_BRANCHES.to_vec());
        branches.insert(SupplierKind::Toolhaus, TOOLHAUS_BRANCHES.to_vec());
        branches.insert(SupplierKind::Metrosupply, METROSUPPLY_BRANCHES.to_vec());
        Self { branches }
    }

    /// A directory with explicit tables (tests, staged rollouts).
    pub fn with_branches(branches: HashMap<SupplierKind, Vec<Branch>>) -> Self {
        Self { branches }
    }

    /// The supplier's branch closest to `at`, by great-circle distance.
    ///
    /// `None` when the supplier has no branches in the table.
    pub fn nearest(&self, kind: SupplierKind, at: Coordinates) -> Option<BranchMatch> {
        self.branches
            .get(&kind)?
            .iter()
            .map(|b| BranchMatch {
                branch_name: b.name,
                distance_km: haversine_km(at, b.location),
            })
            .min_by(|x, y| {
                x.distance_km
                    .partial_cmp(&y.distance_km)
                    .unwrap_or(core::cmp::Ordering::Equal)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BERLIN: Coordinates = Coordinates::new(52.5200, 13.4050);
    const MUNICH: Coordinates = Coordinates::new(48.1372, 11.5755);

    #[test]
    fn haversine_matches_known_distance() {
        // Berlin <-> Munich is roughly 504 km great-circle.
        let d = haversine_km(BERLIN, MUNICH);
        assert!((d - 504.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn haversine_is_zero_for_identical_points() {
        assert!(haversine_km(BERLIN, BERLIN) < 1e-9);
    }

    #[test]
    fn nearest_picks_the_closest_branch() {
        let directory = BranchDirectory::builtin();

        let m = directory.nearest(SupplierKind::Buildmax, BERLIN).unwrap();
        assert_eq!(m.branch_name, "BuildMax Berlin-Spandau");

        let m = directory.nearest(SupplierKind::Buildmax, MUNICH).unwrap();
        assert_eq!(m.branch_name, "BuildMax Munich-Freimann");
    }

    #[test]
    fn empty_table_yields_none() {
        let directory = BranchDirectory::with_branches(HashMap::new());
        assert!(directory.nearest(SupplierKind::Buildmax, BERLIN).is_none());
    }
}
