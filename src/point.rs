//! Marker input type with coordinate validation at the ingestion boundary

use crate::{ClusterError, Result};
use geo::Point;

/// A single geolocated marker supplied by the caller
///
/// Coordinates are stored as a `geo::Point<f64>` with x = longitude and
/// y = latitude, following the convention of the `geo` ecosystem. Points are
/// immutable for the duration of a clustering pass and are never mutated by
/// the engine.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    /// Stable unique identifier
    id: String,
    /// Position in WGS84 degrees (x = longitude, y = latitude)
    position: Point<f64>,
    /// Display label
    title: String,
    /// Optional caller-defined classification tag
    category: Option<String>,
}

impl GeoPoint {
    /// Create a new marker, validating its coordinates
    ///
    /// # Arguments
    /// * `id` - Stable unique identifier
    /// * `latitude` - Latitude in degrees (-90 to 90)
    /// * `longitude` - Longitude in degrees (-180 to 180)
    /// * `title` - Display label
    ///
    /// # Returns
    /// The marker, or [`ClusterError::InvalidCoordinate`] if either coordinate
    /// is non-finite or out of range.
    pub fn new(
        id: impl Into<String>,
        latitude: f64,
        longitude: f64,
        title: impl Into<String>,
    ) -> Result<Self> {
        if !latitude.is_finite()
            || !longitude.is_finite()
            || !(-90.0..=90.0).contains(&latitude)
            || !(-180.0..=180.0).contains(&longitude)
        {
            return Err(ClusterError::InvalidCoordinate {
                latitude,
                longitude,
            });
        }
        Ok(Self::new_unchecked(id, latitude, longitude, title))
    }

    /// Create a marker without validating coordinates (for trusted input)
    ///
    /// Out-of-range values propagate through the distance calculator as
    /// mathematically defined but geographically meaningless results; nothing
    /// downstream can panic on them.
    pub fn new_unchecked(
        id: impl Into<String>,
        latitude: f64,
        longitude: f64,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            position: Point::new(longitude, latitude),
            title: title.into(),
            category: None,
        }
    }

    /// Attach a classification tag
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Stable unique identifier
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Latitude in degrees
    #[inline]
    pub fn latitude(&self) -> f64 {
        self.position.y()
    }

    /// Longitude in degrees
    #[inline]
    pub fn longitude(&self) -> f64 {
        self.position.x()
    }

    /// Position as a `geo::Point` (x = longitude, y = latitude)
    #[inline]
    pub fn position(&self) -> Point<f64> {
        self.position
    }

    /// Display label
    #[inline]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Optional classification tag
    #[inline]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}
