//! Geographic primitives: points, bounding boxes, buffers and distances.
//!
//! Distances use the Haversine formula on a sphere of mean Earth radius. The
//! buffer is built with the same model so a bounding box always contains every
//! point whose great-circle distance to the origin is within the radius.

use std::f64::consts::FRAC_PI_2;

use geo::{BoundingRect, Coord, Destination, Distance, Haversine, LineString, Point, Polygon};

use crate::models::types::{GraphError, Result};

/// Mean Earth radius in meters (IUGG), the radius `geo::Haversine` uses
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Number of vertices on a buffer ring (before tangent points are added)
pub const BUFFER_STEPS: usize = 64;

/// A WGS84 position
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    /// Validated constructor. Coordinates must be finite and within WGS84 ranges.
    pub fn new(longitude: f64, latitude: f64) -> Result<Self> {
        let valid = longitude.is_finite()
            && latitude.is_finite()
            && (-180.0..=180.0).contains(&longitude)
            && (-90.0..=90.0).contains(&latitude);

        if !valid {
            return Err(GraphError::InvalidCoordinate {
                longitude,
                latitude,
            });
        }

        Ok(Self {
            longitude,
            latitude,
        })
    }

    pub fn to_point(self) -> Point {
        Point::new(self.longitude, self.latitude)
    }
}

impl From<GeoPoint> for Point {
    fn from(point: GeoPoint) -> Self {
        point.to_point()
    }
}

/// Axis-aligned longitude/latitude rectangle.
///
/// Only produced by [`buffer_bounding_box`], so `lon_min <= lon_max` and
/// `lat_min <= lat_max` always hold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    lon_min: f64,
    lon_max: f64,
    lat_min: f64,
    lat_max: f64,
}

impl BoundingBox {
    pub fn lon_min(&self) -> f64 {
        self.lon_min
    }

    pub fn lon_max(&self) -> f64 {
        self.lon_max
    }

    pub fn lat_min(&self) -> f64 {
        self.lat_min
    }

    pub fn lat_max(&self) -> f64 {
        self.lat_max
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        self.contains_coord(point.longitude, point.latitude)
    }

    pub fn contains_coord(&self, longitude: f64, latitude: f64) -> bool {
        (self.lon_min..=self.lon_max).contains(&longitude)
            && (self.lat_min..=self.lat_max).contains(&latitude)
    }

    /// Corners as `[lon, lat]` pairs (min, max), the layout the R-tree uses
    pub fn corners(&self) -> ([f64; 2], [f64; 2]) {
        ([self.lon_min, self.lat_min], [self.lon_max, self.lat_max])
    }
}

fn validate_radius(radius_km: f64) -> Result<()> {
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(GraphError::InvalidRadius(radius_km));
    }
    Ok(())
}

/// Shift a longitude by whole turns so it lies within 180° of `reference`
fn unwrap_longitude(longitude: f64, reference: f64) -> f64 {
    let mut lon = longitude;
    while lon - reference > 180.0 {
        lon -= 360.0;
    }
    while lon - reference < -180.0 {
        lon += 360.0;
    }
    lon
}

/// Buffer ring of all points `radius_km` away from `origin`.
///
/// Besides the evenly spaced bearings the ring contains the two tangent points
/// where the circle reaches its eastern and western extremes, so the ring's
/// bounding rectangle is the circle's bounding rectangle.
pub fn buffer_polygon(origin: GeoPoint, radius_km: f64) -> Result<Polygon> {
    validate_radius(radius_km)?;

    let meters = radius_km * 1000.0;
    let angular = meters / EARTH_RADIUS_M;

    let mut bearings: Vec<f64> = (0..BUFFER_STEPS)
        .map(|i| i as f64 * 360.0 / BUFFER_STEPS as f64)
        .collect();

    // Right spherical triangle pole/origin/tangent: cos(bearing) = tan(δ)·tan(φ)
    let tangent = angular.tan() * origin.latitude.to_radians().tan();
    if angular < FRAC_PI_2 && tangent.abs() <= 1.0 {
        let bearing = tangent.acos().to_degrees();
        bearings.push(bearing);
        bearings.push(360.0 - bearing);
        bearings.sort_by(f64::total_cmp);
    }

    let center = origin.to_point();
    let ring: Vec<Coord> = bearings
        .into_iter()
        .map(|bearing| {
            let vertex = Haversine.destination(center, bearing, meters);
            Coord {
                x: unwrap_longitude(vertex.x(), origin.longitude),
                y: vertex.y(),
            }
        })
        .collect();

    Ok(Polygon::new(LineString::from(ring), vec![]))
}

/// Bounding box of the geodesic buffer of `radius_km` around `origin`.
///
/// Near the poles or the antimeridian the box widens to the full longitude
/// range rather than wrapping.
pub fn buffer_bounding_box(origin: GeoPoint, radius_km: f64) -> Result<BoundingBox> {
    let polygon = buffer_polygon(origin, radius_km)?;
    let rect = polygon
        .bounding_rect()
        .ok_or(GraphError::InvalidRadius(radius_km))?;

    let angular = radius_km * 1000.0 / EARTH_RADIUS_M;
    let colatitude_north = (90.0 - origin.latitude).to_radians();
    let colatitude_south = (90.0 + origin.latitude).to_radians();
    let covers_north_pole = angular >= colatitude_north;
    let covers_south_pole = angular >= colatitude_south;

    let mut bbox = BoundingBox {
        lon_min: rect.min().x,
        lon_max: rect.max().x,
        lat_min: rect.min().y.max(-90.0),
        lat_max: rect.max().y.min(90.0),
    };

    if covers_north_pole {
        bbox.lat_max = 90.0;
    }
    if covers_south_pole {
        bbox.lat_min = -90.0;
    }

    let crosses_antimeridian = bbox.lon_min < -180.0 || bbox.lon_max > 180.0;
    if covers_north_pole || covers_south_pole || crosses_antimeridian {
        bbox.lon_min = -180.0;
        bbox.lon_max = 180.0;
    }

    // Rounding in the destination formula can leave the origin a hair outside
    bbox.lon_min = bbox.lon_min.min(origin.longitude);
    bbox.lon_max = bbox.lon_max.max(origin.longitude);
    bbox.lat_min = bbox.lat_min.min(origin.latitude);
    bbox.lat_max = bbox.lat_max.max(origin.latitude);

    Ok(bbox)
}

/// Great-circle distance between two points in kilometers
pub fn great_circle_distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    if a == b {
        return 0.0;
    }
    Haversine.distance(a.to_point(), b.to_point()) / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn point(longitude: f64, latitude: f64) -> GeoPoint {
        GeoPoint::new(longitude, latitude).unwrap()
    }

    #[test]
    fn test_great_circle_distance() {
        // Brussels to Antwerp is roughly 41 km
        let brussels = point(4.3517, 50.8503);
        let antwerp = point(4.4025, 51.2194);

        let dist = great_circle_distance_km(brussels, antwerp);
        assert!((dist - 41.2).abs() < 1.0);
        assert_relative_eq!(dist, great_circle_distance_km(antwerp, brussels), epsilon = 1e-9);
        assert_eq!(great_circle_distance_km(brussels, brussels), 0.0);
    }

    #[test]
    fn test_scenario_distances() {
        let origin = point(4.4, 51.2);
        let near = great_circle_distance_km(origin, point(4.41, 51.21));
        let far = great_circle_distance_km(origin, point(4.6, 51.5));

        assert!((near - 1.3).abs() < 0.2);
        assert!((far - 36.4).abs() < 2.0);
    }

    #[test]
    fn test_invalid_radius() {
        let origin = point(4.4, 51.2);
        assert!(matches!(buffer_bounding_box(origin, 0.0), Err(GraphError::InvalidRadius(_))));
        assert!(matches!(buffer_bounding_box(origin, -3.0), Err(GraphError::InvalidRadius(_))));
        assert!(matches!(
            buffer_bounding_box(origin, f64::NAN),
            Err(GraphError::InvalidRadius(_))
        ));
    }

    #[test]
    fn test_invalid_coordinate() {
        assert!(GeoPoint::new(f64::INFINITY, 51.0).is_err());
        assert!(GeoPoint::new(4.4, 91.0).is_err());
        assert!(GeoPoint::new(-181.0, 0.0).is_err());
    }

    #[test]
    fn test_bbox_contains_origin() {
        for &(lon, lat) in &[(4.4, 51.2), (0.0, 0.0), (-73.99, 40.75), (151.2, -33.86), (25.0, 70.0)] {
            let origin = point(lon, lat);
            for &radius in &[0.5, 5.0, 10.0, 250.0] {
                let bbox = buffer_bounding_box(origin, radius).unwrap();
                assert!(bbox.contains(origin), "{origin:?} r={radius}");
                assert!(bbox.lon_min() <= bbox.lon_max());
                assert!(bbox.lat_min() <= bbox.lat_max());
            }
        }
    }

    #[test]
    fn test_bbox_contains_points_within_radius() {
        let center = point(4.4, 51.2);
        let radius = 5.0;
        let bbox = buffer_bounding_box(center, radius).unwrap();

        for step in 0..360 {
            let bearing = step as f64;
            let inside = Haversine.destination(center.to_point(), bearing, radius * 999.0);
            assert!(
                bbox.contains_coord(inside.x(), inside.y()),
                "bearing {bearing} escaped {bbox:?}"
            );
        }
    }

    #[test]
    fn test_bbox_is_tight() {
        let center = point(4.4, 51.2);
        let bbox = buffer_bounding_box(center, 5.0).unwrap();

        // 5 km is about 0.045° of latitude and 0.072° of longitude at 51.2°N
        assert_relative_eq!(bbox.lat_max() - center.latitude, 0.04497, epsilon = 1e-3);
        assert_relative_eq!(bbox.lon_max() - center.longitude, 0.07178, epsilon = 1e-3);
        assert!(!bbox.contains(point(4.6, 51.5)));
    }

    #[test]
    fn test_bbox_wider_at_high_latitude() {
        let equator = buffer_bounding_box(point(10.0, 0.0), 10.0).unwrap();
        let north = buffer_bounding_box(point(10.0, 65.0), 10.0).unwrap();

        let equator_width = equator.lon_max() - equator.lon_min();
        let north_width = north.lon_max() - north.lon_min();
        assert!(north_width > 2.0 * equator_width);
    }

    #[test]
    fn test_bbox_pole_and_antimeridian() {
        let polar = buffer_bounding_box(point(0.0, 89.99), 50.0).unwrap();
        assert_eq!(polar.lat_max(), 90.0);
        assert_eq!((polar.lon_min(), polar.lon_max()), (-180.0, 180.0));

        let fiji = buffer_bounding_box(point(179.99, -17.0), 20.0).unwrap();
        assert_eq!((fiji.lon_min(), fiji.lon_max()), (-180.0, 180.0));
        assert!(fiji.contains(point(179.99, -17.0)));
    }
}
