//! Catalog types for water-access points.

use serde::{Deserialize, Serialize};

use crate::PointId;

/// A physical location where water can be obtained.
///
/// Identity is immutable; every other field can be replaced by a full
/// update. Only `name`, `latitude`, and `longitude` are required — the rest
/// of the descriptive metadata is routinely absent in imported datasets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterPoint {
    /// Storage-assigned identifier.
    pub id: PointId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Point category label (wire name `type`).
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// City name.
    pub city: Option<String>,
    /// Country name.
    pub country: Option<String>,
    /// Average rating, if any reviews exist.
    pub rating: Option<f64>,
    /// Website URL.
    pub website: Option<String>,
    /// Number of reviews behind `rating`.
    pub reviews_count: Option<i64>,
    /// Administrative region.
    pub region: Option<String>,
    /// IANA timezone name.
    pub timezone: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Geographic latitude in degrees.
    pub latitude: f64,
    /// Geographic longitude in degrees.
    pub longitude: f64,
}

/// The id-less payload used to create or fully replace a [`WaterPoint`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterPointDraft {
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Point category label (wire name `type`).
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Street address.
    #[serde(default)]
    pub address: Option<String>,
    /// City name.
    #[serde(default)]
    pub city: Option<String>,
    /// Country name.
    #[serde(default)]
    pub country: Option<String>,
    /// Average rating.
    #[serde(default)]
    pub rating: Option<f64>,
    /// Website URL.
    #[serde(default)]
    pub website: Option<String>,
    /// Number of reviews behind `rating`.
    #[serde(default)]
    pub reviews_count: Option<i64>,
    /// Administrative region.
    #[serde(default)]
    pub region: Option<String>,
    /// IANA timezone name.
    #[serde(default)]
    pub timezone: Option<String>,
    /// Contact phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// Geographic latitude in degrees.
    pub latitude: f64,
    /// Geographic longitude in degrees.
    pub longitude: f64,
}

impl WaterPointDraft {
    /// Attach a storage-assigned id, producing the full entity.
    #[must_use]
    pub fn into_point(self, id: PointId) -> WaterPoint {
        WaterPoint {
            id,
            name: self.name,
            description: self.description,
            kind: self.kind,
            address: self.address,
            city: self.city,
            country: self.country,
            rating: self.rating,
            website: self.website,
            reviews_count: self.reviews_count,
            region: self.region,
            timezone: self.timezone,
            phone: self.phone,
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}
