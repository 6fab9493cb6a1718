//! Geofence geometry: shape types, editor shapes, persisted geometry, rings.
//!
//! [`MapShape`] is what the editor and the map surface work with (map-native
//! coordinates). [`Geometry`] is what gets stored (persisted coordinates,
//! closed rings). [`MapShape::to_geometry`] and [`Geometry::to_map_shape`] are
//! the only crossings between the two.

use geo::BoundingRect;
use serde::{Deserialize, Serialize};

use super::coordinate::{
    from_geo_coord, from_persisted, to_geo_coord, to_persisted, MapCoordinate,
    PersistedCoordinate,
};

/// Meters per degree of latitude (and of longitude at the equator).
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Default radius for a freshly drawn circle.
pub const DEFAULT_CIRCLE_RADIUS_METERS: f64 = 500.0;

/// Supported geofence shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    Circle,
    Rectangle,
    Polygon,
}

impl ShapeType {
    /// Converts to wire string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeType::Circle => "circle",
            ShapeType::Rectangle => "rectangle",
            ShapeType::Polygon => "polygon",
        }
    }

    /// Parses from wire string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "circle" => Some(ShapeType::Circle),
            "rectangle" => Some(ShapeType::Rectangle),
            "polygon" => Some(ShapeType::Polygon),
            _ => None,
        }
    }
}

impl std::fmt::Display for ShapeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allowed circle radius range in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusLimits {
    pub min: f64,
    pub max: f64,
}

impl Default for RadiusLimits {
    fn default() -> Self {
        Self {
            min: 50.0,
            max: 10_000.0,
        }
    }
}

impl RadiusLimits {
    pub fn clamp(&self, meters: f64) -> f64 {
        shared::validation::clamp_to_range(meters, self.min, self.max)
    }
}

/// A shape in map-native coordinates, as drawn in the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum MapShape {
    Circle {
        center: MapCoordinate,
        radius_meters: f64,
    },
    Rectangle {
        south_west: MapCoordinate,
        north_east: MapCoordinate,
    },
    /// Open point list; closure happens on conversion to [`Geometry`].
    Polygon { points: Vec<MapCoordinate> },
}

impl MapShape {
    /// Rectangle spanned by two opposite corners, in either click order.
    pub fn rectangle_from_corners(a: MapCoordinate, b: MapCoordinate) -> Self {
        MapShape::Rectangle {
            south_west: MapCoordinate::new(a.lat.min(b.lat), a.lng.min(b.lng)),
            north_east: MapCoordinate::new(a.lat.max(b.lat), a.lng.max(b.lng)),
        }
    }

    pub fn shape_type(&self) -> ShapeType {
        match self {
            MapShape::Circle { .. } => ShapeType::Circle,
            MapShape::Rectangle { .. } => ShapeType::Rectangle,
            MapShape::Polygon { .. } => ShapeType::Polygon,
        }
    }

    /// Every coordinate the shape is defined by.
    pub fn defining_points(&self) -> Vec<MapCoordinate> {
        match self {
            MapShape::Circle { center, .. } => vec![*center],
            MapShape::Rectangle {
                south_west,
                north_east,
            } => vec![*south_west, *north_east],
            MapShape::Polygon { points } => points.clone(),
        }
    }

    /// Converts to persisted geometry.
    ///
    /// Does not validate; polygons with too few points still convert.
    pub fn to_geometry(&self) -> Geometry {
        match self {
            MapShape::Circle {
                center,
                radius_meters,
            } => Geometry::Circle(CircleGeometry {
                center: to_persisted(*center),
                radius_meters: *radius_meters,
            }),
            MapShape::Rectangle {
                south_west,
                north_east,
            } => Geometry::Rectangle(RectangleGeometry::from_corners(*south_west, *north_east)),
            MapShape::Polygon { points } => {
                let persisted: Vec<PersistedCoordinate> =
                    points.iter().copied().map(to_persisted).collect();
                Geometry::Polygon(PolygonGeometry::from_ring(persisted))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CircleGeometry {
    pub center: PersistedCoordinate,
    pub radius_meters: f64,
}

/// Axis-aligned rectangle stored as a closed 5-point ring (SW, SE, NE, NW, SW).
#[derive(Debug, Clone, PartialEq)]
pub struct RectangleGeometry {
    ring: Vec<PersistedCoordinate>,
}

impl RectangleGeometry {
    pub fn from_corners(a: MapCoordinate, b: MapCoordinate) -> Self {
        let south = a.lat.min(b.lat);
        let north = a.lat.max(b.lat);
        let west = a.lng.min(b.lng);
        let east = a.lng.max(b.lng);

        let corners = [
            MapCoordinate::new(south, west),
            MapCoordinate::new(south, east),
            MapCoordinate::new(north, east),
            MapCoordinate::new(north, west),
        ];
        let ring: Vec<PersistedCoordinate> = corners.into_iter().map(to_persisted).collect();
        Self {
            ring: close_ring(&ring),
        }
    }

    /// Wraps a ring received from storage, closing it if needed.
    ///
    /// Returns `None` for an empty ring.
    pub fn from_ring(ring: Vec<PersistedCoordinate>) -> Option<Self> {
        if ring.is_empty() {
            return None;
        }
        Some(Self {
            ring: close_ring(&ring),
        })
    }

    pub fn ring(&self) -> &[PersistedCoordinate] {
        &self.ring
    }

    /// South-west and north-east corners, taken as the min/max over the ring.
    pub fn corners(&self) -> (MapCoordinate, MapCoordinate) {
        let first = from_persisted(self.ring[0]);
        self.ring
            .iter()
            .copied()
            .map(from_persisted)
            .fold((first, first), |(sw, ne), c| {
                (
                    MapCoordinate::new(sw.lat.min(c.lat), sw.lng.min(c.lng)),
                    MapCoordinate::new(ne.lat.max(c.lat), ne.lng.max(c.lng)),
                )
            })
    }
}

/// Polygon stored as a closed ring.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonGeometry {
    ring: Vec<PersistedCoordinate>,
}

impl PolygonGeometry {
    pub fn from_ring(ring: Vec<PersistedCoordinate>) -> Self {
        Self {
            ring: close_ring(&ring),
        }
    }

    pub fn ring(&self) -> &[PersistedCoordinate] {
        &self.ring
    }
}

/// Geometry in persisted coordinate order.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Circle(CircleGeometry),
    Rectangle(RectangleGeometry),
    Polygon(PolygonGeometry),
}

impl Geometry {
    pub fn shape_type(&self) -> ShapeType {
        match self {
            Geometry::Circle(_) => ShapeType::Circle,
            Geometry::Rectangle(_) => ShapeType::Rectangle,
            Geometry::Polygon(_) => ShapeType::Polygon,
        }
    }

    /// Converts stored geometry back into an editable map-native shape.
    ///
    /// Rectangles recover their corners as the min/max of the ring; polygons
    /// drop the closing duplicate point.
    pub fn to_map_shape(&self) -> MapShape {
        match self {
            Geometry::Circle(circle) => MapShape::Circle {
                center: from_persisted(circle.center),
                radius_meters: circle.radius_meters,
            },
            Geometry::Rectangle(rect) => {
                let (south_west, north_east) = rect.corners();
                MapShape::Rectangle {
                    south_west,
                    north_east,
                }
            }
            Geometry::Polygon(polygon) => {
                let mut points: Vec<MapCoordinate> =
                    polygon.ring().iter().copied().map(from_persisted).collect();
                if points.len() > 1 && points.first() == points.last() {
                    points.pop();
                }
                MapShape::Polygon { points }
            }
        }
    }
}

/// Closes a ring by appending the first point when the last one differs.
///
/// Idempotent: closing an already closed ring returns it unchanged.
pub fn close_ring<T: Copy + PartialEq>(points: &[T]) -> Vec<T> {
    let mut ring = points.to_vec();
    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        if first != last {
            ring.push(*first);
        }
    }
    ring
}

/// Number of pairwise distinct points.
pub fn distinct_point_count<T: PartialEq>(points: &[T]) -> usize {
    points
        .iter()
        .enumerate()
        .filter(|(i, p)| !points[..*i].contains(p))
        .count()
}

/// True when the points can form a polygon: at least three distinct points.
///
/// A trailing closing duplicate does not count twice.
pub fn is_valid_polygon<T: PartialEq>(points: &[T]) -> bool {
    distinct_point_count(points) >= 3
}

/// Map viewport bounds in map-native coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: MapCoordinate,
    pub north_east: MapCoordinate,
}

impl Bounds {
    pub fn contains(&self, coord: &MapCoordinate) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&coord.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&coord.lng)
    }
}

/// Bounds used to center and zoom the map on a shape.
///
/// `None` only for a polygon with no points.
pub fn bounds_of(shape: &MapShape) -> Option<Bounds> {
    match shape {
        MapShape::Circle {
            center,
            radius_meters,
        } => Some(circle_bounds(*center, *radius_meters)),
        MapShape::Rectangle {
            south_west,
            north_east,
        } => bounds_of_points(&[*south_west, *north_east]),
        MapShape::Polygon { points } => bounds_of_points(points),
    }
}

fn circle_bounds(center: MapCoordinate, radius_meters: f64) -> Bounds {
    let lat_offset = radius_meters / METERS_PER_DEGREE;
    // Longitude degrees shrink with latitude; keep the divisor away from zero at the poles.
    let cos_lat = center.lat.to_radians().cos().abs().max(1e-6);
    let lng_offset = (radius_meters / (METERS_PER_DEGREE * cos_lat)).min(180.0);

    Bounds {
        south_west: MapCoordinate::new(
            (center.lat - lat_offset).max(-90.0),
            (center.lng - lng_offset).max(-180.0),
        ),
        north_east: MapCoordinate::new(
            (center.lat + lat_offset).min(90.0),
            (center.lng + lng_offset).min(180.0),
        ),
    }
}

fn bounds_of_points(points: &[MapCoordinate]) -> Option<Bounds> {
    let line: geo::LineString<f64> = points.iter().copied().map(to_geo_coord).collect();
    line.bounding_rect().map(|rect| Bounds {
        south_west: from_geo_coord(rect.min()),
        north_east: from_geo_coord(rect.max()),
    })
}
