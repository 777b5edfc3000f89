//! Read-only completion context: routine rules, site location, inventory.
//!
//! Routine templates and points of sale are authored outside this crate; the
//! completion workflow consults them and never mutates them.

use super::{Coordinates, DEFAULT_PDV_RADIUS_METERS, PdvId, ProductId, RoutineId};
use serde::{Deserialize, Serialize};

/// Completion rules snapshot taken from a routine template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineRules {
    /// Routine template identifier.
    pub id: RoutineId,
    /// Human-readable routine name, embedded in review notifications.
    pub name: String,
    /// Whether a submission must carry geofence-validated coordinates.
    pub gps_required: bool,
    /// Whether a submission must carry inventory rows.
    pub inventory_required: bool,
}

/// Physical point of sale where a task is executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pdv {
    /// Point-of-sale identifier.
    pub id: PdvId,
    /// Configured site coordinates, absent until the site is geolocated.
    pub location: Option<Coordinates>,
    /// Acceptance radius in meters around [`Self::location`].
    pub radius_meters: Option<f64>,
}

impl Pdv {
    /// Returns the acceptance radius, falling back to the platform default
    /// when the site has none configured.
    #[must_use]
    pub fn effective_radius_meters(&self) -> f64 {
        self.radius_meters.unwrap_or(DEFAULT_PDV_RADIUS_METERS)
    }
}

/// One product count submitted with a completed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLine {
    /// Counted product.
    pub product_id: ProductId,
    /// Expected quantity per the routine's planogram.
    pub expected: i32,
    /// Physically counted quantity.
    pub counted: i32,
}
