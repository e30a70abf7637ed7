//! Marker Cluster - Zoom-Aware Grouping of Geolocated Map Markers
//!
//! This library decides, for a given set of map markers and a zoom level, which
//! markers should be rendered individually and which should be merged into
//! aggregate cluster markers. Pairwise great-circle distances are memoized in a
//! bounded LRU cache so that repeated, overlapping passes (panning, zooming)
//! avoid redundant trigonometric work.
//!
//! # Architecture
//!
//! - **[`GeoPoint`]**: Immutable marker input with validated WGS84 coordinates
//! - **[`distance`]**: Pure haversine great-circle distance in kilometers
//! - **[`DistanceCache`]**: Bounded LRU memo over quantized coordinate pairs
//! - **[`MarkerClusterer`]**: Single-pass greedy grouping driver that owns the cache
//! - **[`RenderItem`]**: Output unit, either a singleton marker or a [`Cluster`]
//!
//! # Performance Characteristics
//!
//! - **Clustering pass**: O(N²) worst case over N input points, skipped entirely
//!   below the configured population/zoom thresholds
//! - **Distance lookup**: O(1) amortized once the cache is warm
//! - **Memory**: O(capacity) for the cache + O(N) for one pass's output
//!
//! The pipeline is synchronous and single-threaded by design; a clustering pass
//! is one blocking call with no I/O. Callers that share a [`MarkerClusterer`]
//! across threads must serialize access themselves.

mod cache;
mod cluster;
pub mod distance;
mod point;

// Public API exports
pub use cache::{CacheStats, DistanceCache, COORDINATE_QUANT_SCALE, DEFAULT_CACHE_CAPACITY};
pub use cluster::{Cluster, Config, MarkerClusterer, RenderItem};
pub use point::GeoPoint;

/// Error types for marker ingestion
///
/// Only the point-construction boundary can fail; the distance calculator and
/// the cache are total over finite input and never report errors.
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    #[error("invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
}

pub type Result<T> = std::result::Result<T, ClusterError>;
