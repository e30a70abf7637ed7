//! Single-pass greedy marker clustering with zoom-dependent radius
//!
//! This module provides the high-level API: a [`Config`] of named thresholds,
//! the [`RenderItem`] output model, and the [`MarkerClusterer`] driver that
//! owns the distance cache and runs clustering passes on demand.

use crate::GeoPoint;
use crate::cache::DistanceCache;
use geo::Point;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the clusterer
///
/// Every threshold of the grouping policy is a named field with the reference
/// default, so callers can tune behavior without forking the algorithm.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Population at or below which clustering is skipped entirely.
    /// Default: 50
    pub skip_below_points: usize,
    /// Zoom level above which clustering is skipped entirely.
    /// Default: 12.0
    pub skip_above_zoom: f64,
    /// Grouping radius in kilometers at `radius_zoom_offset`.
    /// Default: 0.1
    pub radius_base_km: f64,
    /// Zoom level at which the grouping radius equals `radius_base_km`;
    /// the radius halves for each zoom level above it.
    /// Default: 8.0
    pub radius_zoom_offset: f64,
    /// Lower bound on the grouping radius in kilometers, so highly zoomed
    /// views never degenerate to a zero radius.
    /// Default: 0.01
    pub radius_floor_km: f64,
    /// Distance cache capacity in entries (fixed at clusterer construction).
    /// Default: [`DEFAULT_CACHE_CAPACITY`](crate::DEFAULT_CACHE_CAPACITY)
    pub cache_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            skip_below_points: 50,
            skip_above_zoom: 12.0,
            radius_base_km: 0.1,
            radius_zoom_offset: 8.0,
            radius_floor_km: 0.01,
            cache_capacity: crate::DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl Config {
    /// Grouping radius in kilometers for a zoom level
    ///
    /// Shrinks geometrically as the view zooms in, clamped to
    /// `radius_floor_km`.
    #[inline]
    pub fn radius_for_zoom(&self, zoom: f64) -> f64 {
        let radius = self.radius_base_km / 2.0_f64.powf(zoom - self.radius_zoom_offset);
        radius.max(self.radius_floor_km)
    }
}

/// A synthesized aggregate marker
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Cluster<'a> {
    /// Pass-local identifier (`cluster-0`, `cluster-1`, ...)
    pub id: String,
    /// Arithmetic mean of member positions (x = longitude, y = latitude)
    pub centroid: Point<f64>,
    /// Count-based display label
    pub label: String,
    /// Member markers in input order, always at least two
    pub members: Vec<&'a GeoPoint>,
}

impl Cluster<'_> {
    /// Centroid latitude in degrees
    #[inline]
    pub fn centroid_latitude(&self) -> f64 {
        self.centroid.y()
    }

    /// Centroid longitude in degrees
    #[inline]
    pub fn centroid_longitude(&self) -> f64 {
        self.centroid.x()
    }
}

/// One unit of renderable output
///
/// Borrows the input slice: a clustering pass never copies or mutates markers,
/// and its output is superseded entirely by the next pass.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum RenderItem<'a> {
    /// A marker rendered individually
    Singleton(&'a GeoPoint),
    /// A group of markers rendered as one aggregate
    Cluster(Cluster<'a>),
}

impl RenderItem<'_> {
    /// Number of input markers this item stands for
    #[inline]
    pub fn point_count(&self) -> usize {
        match self {
            RenderItem::Singleton(_) => 1,
            RenderItem::Cluster(cluster) => cluster.members.len(),
        }
    }

    /// Check whether this item is an aggregate
    #[inline]
    pub fn is_cluster(&self) -> bool {
        matches!(self, RenderItem::Cluster(_))
    }
}

/// Driver for clustering passes, owning the distance cache
///
/// The cache persists across passes so that overlapping queries (panning,
/// zooming over the same markers) reuse previously computed distances. One
/// clusterer per map instance; access is exclusive and sequential.
#[derive(Debug)]
pub struct MarkerClusterer {
    config: Config,
    cache: DistanceCache,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl MarkerClusterer {
    /// Create a clusterer with the given configuration
    pub fn new(config: Config) -> Self {
        let cache = DistanceCache::new(config.cache_capacity);
        Self { config, cache }
    }

    /// Run one clustering pass over `points` at `zoom`
    ///
    /// Returns one [`RenderItem`] per marker or group, partitioning the input:
    /// every point appears in exactly one item. When the population is at or
    /// below `skip_below_points`, or `zoom` is above `skip_above_zoom`, every
    /// point is returned as a singleton in input order and no distances are
    /// computed.
    ///
    /// Grouping is single-pass and greedy: each unprocessed point in input
    /// order becomes a seed, and every later unprocessed point within the
    /// zoom-dependent radius *of the seed* joins its group. A point therefore
    /// joins the first seed in range, even if a later seed would be closer;
    /// with a different input ordering the same point set can produce
    /// different groups. This order dependence is a known characteristic of
    /// the algorithm, kept deliberately for its simplicity and predictable
    /// cost at the target input sizes (hundreds to low thousands of markers).
    pub fn cluster<'a>(&mut self, points: &'a [GeoPoint], zoom: f64) -> Vec<RenderItem<'a>> {
        #[cfg(feature = "profiling")]
        profiling::scope!("clusterer::cluster");

        if points.len() <= self.config.skip_below_points || zoom > self.config.skip_above_zoom {
            tracing::debug!(
                points = points.len(),
                zoom,
                "clustering skipped, rendering all markers as singletons"
            );
            return points.iter().map(RenderItem::Singleton).collect();
        }

        let radius_km = self.config.radius_for_zoom(zoom);
        let mut processed = vec![false; points.len()];
        let mut items = Vec::new();
        let mut cluster_count = 0usize;

        for seed_index in 0..points.len() {
            if processed[seed_index] {
                continue;
            }
            processed[seed_index] = true;
            let seed = &points[seed_index];

            // Collect every later unprocessed point within radius of the seed
            let mut members = vec![seed];
            for candidate_index in (seed_index + 1)..points.len() {
                if processed[candidate_index] {
                    continue;
                }
                let candidate = &points[candidate_index];
                let distance_km = self.cache.get_or_compute(
                    seed.latitude(),
                    seed.longitude(),
                    candidate.latitude(),
                    candidate.longitude(),
                );
                if distance_km <= radius_km {
                    processed[candidate_index] = true;
                    members.push(candidate);
                }
            }

            if members.len() > 1 {
                items.push(RenderItem::Cluster(Self::make_cluster(
                    cluster_count,
                    members,
                )));
                cluster_count += 1;
            } else {
                items.push(RenderItem::Singleton(seed));
            }
        }

        tracing::debug!(
            points = points.len(),
            zoom,
            radius_km,
            clusters = cluster_count,
            items = items.len(),
            "clustering pass complete"
        );

        items
    }

    /// Build a cluster from its members (centroid = arithmetic mean)
    fn make_cluster(index: usize, members: Vec<&GeoPoint>) -> Cluster<'_> {
        let count = members.len() as f64;
        let lat_sum: f64 = members.iter().map(|p| p.latitude()).sum();
        let lon_sum: f64 = members.iter().map(|p| p.longitude()).sum();

        Cluster {
            id: format!("cluster-{index}"),
            centroid: Point::new(lon_sum / count, lat_sum / count),
            label: format!("{} objets", members.len()),
            members,
        }
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the distance cache effectiveness counters
    #[inline]
    pub fn cache_stats(&self) -> crate::CacheStats {
        self.cache.stats()
    }

    /// Drop all cached distances
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_point(id: &str, lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(id, lat, lon, format!("marker {id}")).unwrap()
    }

    /// Config that never skips, for exercising the grouping itself
    fn always_cluster() -> Config {
        Config {
            skip_below_points: 0,
            ..Config::default()
        }
    }

    /// Points spread far enough apart that nothing groups at any tested zoom
    fn scattered_points(count: usize) -> Vec<GeoPoint> {
        (0..count)
            .map(|i| make_point(&format!("p{i}"), 40.0 + i as f64 * 0.01, 10.0))
            .collect()
    }

    fn output_ids(items: &[RenderItem<'_>]) -> Vec<String> {
        let mut ids = Vec::new();
        for item in items {
            match item {
                RenderItem::Singleton(point) => ids.push(point.id().to_string()),
                RenderItem::Cluster(cluster) => {
                    ids.extend(cluster.members.iter().map(|p| p.id().to_string()))
                }
            }
        }
        ids
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.skip_below_points, 50);
        assert_eq!(config.skip_above_zoom, 12.0);
        assert_eq!(config.radius_base_km, 0.1);
        assert_eq!(config.radius_zoom_offset, 8.0);
        assert_eq!(config.radius_floor_km, 0.01);
        assert_eq!(config.cache_capacity, 1000);
    }

    #[test]
    fn test_radius_for_zoom() {
        let config = Config::default();
        assert!((config.radius_for_zoom(8.0) - 0.1).abs() < 1e-12);
        assert!((config.radius_for_zoom(10.0) - 0.025).abs() < 1e-12);
        // Floor reached at zoom 12 (0.1 / 16 = 0.00625 clamps up to 0.01)
        assert_eq!(config.radius_for_zoom(12.0), 0.01);
        // And stays clamped beyond
        assert_eq!(config.radius_for_zoom(20.0), 0.01);
    }

    #[test]
    fn test_skip_small_population() {
        let points = scattered_points(50);
        let mut clusterer = MarkerClusterer::new(Config::default());

        let items = clusterer.cluster(&points, 5.0);
        assert_eq!(items.len(), 50);
        assert!(items.iter().all(|item| !item.is_cluster()));
        // Input order preserved
        let ids = output_ids(&items);
        assert_eq!(ids, (0..50).map(|i| format!("p{i}")).collect::<Vec<_>>());
        // No distances were computed
        assert_eq!(clusterer.cache_stats().misses, 0);
    }

    #[test]
    fn test_skip_high_zoom() {
        // 60 coincident points would all cluster, but zoom > 12 skips grouping
        let points: Vec<GeoPoint> = (0..60)
            .map(|i| make_point(&format!("p{i}"), 48.8566, 2.3522))
            .collect();
        let mut clusterer = MarkerClusterer::new(Config::default());

        let items = clusterer.cluster(&points, 12.5);
        assert_eq!(items.len(), 60);
        assert!(items.iter().all(|item| !item.is_cluster()));
    }

    #[test]
    fn test_zoom_threshold_is_exclusive() {
        // Exactly zoom 12 still clusters
        let points: Vec<GeoPoint> = (0..51)
            .map(|i| make_point(&format!("p{i}"), 48.8566, 2.3522))
            .collect();
        let mut clusterer = MarkerClusterer::new(Config::default());

        let items = clusterer.cluster(&points, 12.0);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].point_count(), 51);
    }

    #[test]
    fn test_two_near_one_far() {
        // Two points ~14 m apart merge at zoom 10 (radius 0.025 km);
        // the third, several km away, stays a singleton
        let points = vec![
            make_point("a", 48.8566, 2.3522),
            make_point("b", 48.8567, 2.3523),
            make_point("c", 48.8700, 2.4000),
        ];
        let mut clusterer = MarkerClusterer::new(always_cluster());

        let items = clusterer.cluster(&points, 10.0);
        assert_eq!(items.len(), 2);

        let RenderItem::Cluster(cluster) = &items[0] else {
            panic!("expected a cluster first");
        };
        assert_eq!(cluster.members.len(), 2);
        assert_eq!(cluster.members[0].id(), "a");
        assert_eq!(cluster.members[1].id(), "b");
        assert_eq!(cluster.id, "cluster-0");
        assert_eq!(cluster.label, "2 objets");

        let RenderItem::Singleton(point) = &items[1] else {
            panic!("expected a singleton second");
        };
        assert_eq!(point.id(), "c");
    }

    #[test]
    fn test_two_near_one_far_under_default_thresholds() {
        // Same scenario, population pushed above the skip threshold with
        // widely scattered filler markers
        let mut points = vec![
            make_point("a", 48.8566, 2.3522),
            make_point("b", 48.8567, 2.3523),
            make_point("c", 48.8700, 2.4000),
        ];
        points.extend(scattered_points(48));
        let mut clusterer = MarkerClusterer::new(Config::default());

        let items = clusterer.cluster(&points, 10.0);
        assert_eq!(items.len(), 50);
        assert_eq!(items.iter().filter(|item| item.is_cluster()).count(), 1);
        assert_eq!(items[0].point_count(), 2);
    }

    #[test]
    fn test_partition_invariant() {
        // A mix of tight groups and isolated markers
        let mut points = Vec::new();
        for i in 0..20 {
            let base_lat = 45.0 + (i / 4) as f64 * 0.5;
            let base_lon = 7.0 + (i % 4) as f64 * 0.5;
            for j in 0..4 {
                points.push(make_point(
                    &format!("p{i}-{j}"),
                    base_lat + j as f64 * 0.00005,
                    base_lon,
                ));
            }
        }
        let input_ids: Vec<String> = points.iter().map(|p| p.id().to_string()).collect();
        let mut clusterer = MarkerClusterer::new(Config::default());

        let items = clusterer.cluster(&points, 9.0);

        let mut seen = output_ids(&items);
        let mut expected = input_ids;
        seen.sort();
        expected.sort();
        assert_eq!(seen, expected);
        assert!(items.len() <= 80);
        for item in &items {
            if let RenderItem::Cluster(cluster) = item {
                assert!(cluster.members.len() >= 2);
            }
        }
    }

    #[test]
    fn test_greedy_first_seed_wins() {
        // Chain: b is within radius of a, c is within radius of b but not of a.
        // The seed-to-candidate rule puts b with a and leaves c alone, even
        // though b and c are just as close.
        let points = vec![
            make_point("a", 0.0, 0.0),
            make_point("b", 0.0, 0.0008), // ~89 m from a
            make_point("c", 0.0, 0.0016), // ~178 m from a, ~89 m from b
        ];
        let mut clusterer = MarkerClusterer::new(always_cluster());

        // Zoom 8 radius is 0.1 km
        let items = clusterer.cluster(&points, 8.0);
        assert_eq!(items.len(), 2);

        let RenderItem::Cluster(cluster) = &items[0] else {
            panic!("expected cluster of a and b");
        };
        let member_ids: Vec<&str> = cluster.members.iter().map(|p| p.id()).collect();
        assert_eq!(member_ids, ["a", "b"]);

        let RenderItem::Singleton(point) = &items[1] else {
            panic!("expected c as a singleton");
        };
        assert_eq!(point.id(), "c");
    }

    #[test]
    fn test_cluster_centroid_is_member_mean() {
        let points = vec![
            make_point("a", 48.0, 2.0),
            make_point("b", 48.0001, 2.0001),
        ];
        let mut clusterer = MarkerClusterer::new(always_cluster());

        let items = clusterer.cluster(&points, 8.0);
        let RenderItem::Cluster(cluster) = &items[0] else {
            panic!("expected a cluster");
        };
        assert!((cluster.centroid_latitude() - 48.00005).abs() < 1e-12);
        assert!((cluster.centroid_longitude() - 2.00005).abs() < 1e-12);
    }

    #[test]
    fn test_cache_warm_across_passes() {
        let mut points = vec![
            make_point("a", 48.8566, 2.3522),
            make_point("b", 48.8567, 2.3523),
        ];
        points.extend(scattered_points(55));
        // 57 points produce 1541 distinct pair keys; the capacity must hold
        // the whole working set, or a sequential re-scan evicts every entry
        // before it is read again and the second pass stays cold
        let mut clusterer = MarkerClusterer::new(Config {
            cache_capacity: 2000,
            ..Config::default()
        });

        clusterer.cluster(&points, 10.0);
        let cold = clusterer.cache_stats();
        assert!(cold.misses > 0);
        assert_eq!(cold.hits, 0);
        assert!((cold.misses as usize) <= clusterer.config().cache_capacity);

        // Same pass again: every comparison is answered from the cache
        clusterer.cluster(&points, 10.0);
        let warm = clusterer.cache_stats();
        assert_eq!(warm.misses, cold.misses);
        assert_eq!(warm.hits, cold.misses);
    }

    #[test]
    fn test_clear_cache() {
        let points = scattered_points(60);
        let mut clusterer = MarkerClusterer::new(Config::default());

        clusterer.cluster(&points, 5.0);
        clusterer.cluster(&points, 8.0);
        assert!(clusterer.cache_stats().len > 0);

        clusterer.clear_cache();
        assert_eq!(clusterer.cache_stats().len, 0);
        assert_eq!(clusterer.cache_stats().misses, 0);
    }

    #[test]
    fn test_empty_input() {
        let mut clusterer = MarkerClusterer::new(Config::default());
        assert!(clusterer.cluster(&[], 10.0).is_empty());
    }

    #[test]
    fn test_render_item_helpers() {
        let points = vec![
            make_point("a", 0.0, 0.0),
            make_point("b", 0.0, 0.0001),
            make_point("c", 10.0, 10.0),
        ];
        let mut clusterer = MarkerClusterer::new(always_cluster());

        let items = clusterer.cluster(&points, 8.0);
        assert!(items[0].is_cluster());
        assert_eq!(items[0].point_count(), 2);
        assert!(!items[1].is_cluster());
        assert_eq!(items[1].point_count(), 1);
    }
}
