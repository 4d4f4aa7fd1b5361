//! WKT geometry handling for Within predicates.
//!
//! Geometries arrive as well-known text and leave as longitude/latitude
//! coordinate rings ready for a geo-shape clause, or as bounding boxes for
//! the SQL backend. Longitude wraps at ±180°: a polygon whose vertices jump
//! from 170° to -170° crosses the antimeridian and must be split into a
//! multipolygon so both sides of the 180° meridian match, instead of the
//! wrong hemisphere.

use geo_types::{Geometry, LineString, Polygon};
use wkt::TryFromWkt;

use crate::error::{Error, Result};

/// A parsed, normalized shape ready for backend emission.
///
/// Polygons are stored as rings of `[lon, lat]` pairs (exterior first,
/// holes after), already split at the antimeridian where necessary.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A single point.
    Point([f64; 2]),
    /// An open line.
    LineString(Vec<[f64; 2]>),
    /// One polygon: exterior ring plus holes.
    Polygon(Vec<Vec<[f64; 2]>>),
    /// Several polygons (also produced by antimeridian splitting).
    MultiPolygon(Vec<Vec<Vec<[f64; 2]>>>),
}

/// Latitude/longitude bounding box.
///
/// When `west > east` the box crosses the antimeridian and the longitude
/// test must be an OR of the two sides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Southernmost latitude.
    pub min_lat: f64,
    /// Northernmost latitude.
    pub max_lat: f64,
    /// Western longitude edge.
    pub west: f64,
    /// Eastern longitude edge.
    pub east: f64,
}

impl BoundingBox {
    /// True if the box wraps across the ±180° meridian.
    #[must_use]
    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }
}

/// Parses and validates a WKT string into a normalized [`Shape`].
///
/// Accepts POINT, LINESTRING, POLYGON and MULTIPOLYGON. Consecutive
/// duplicate vertices are dropped; polygons crossing the antimeridian are
/// split. Anything unparsable, empty, zero-area or of another geometry
/// type is a [`Error::MalformedGeometry`].
pub fn parse_wkt(wkt_text: &str) -> Result<Shape> {
    let geometry: Geometry<f64> = Geometry::try_from_wkt_str(wkt_text)
        .map_err(|e| Error::MalformedGeometry(format!("cannot parse WKT: {e}")))?;

    match geometry {
        Geometry::Point(p) => Ok(Shape::Point([p.x(), p.y()])),
        Geometry::LineString(line) => {
            let coords = dedupe(&line);
            if coords.len() < 2 {
                return Err(Error::MalformedGeometry(
                    "linestring needs at least two distinct points".to_string(),
                ));
            }
            Ok(Shape::LineString(coords))
        }
        Geometry::Polygon(polygon) => {
            let parts = normalize_polygon(&polygon)?;
            if parts.len() == 1 {
                Ok(Shape::Polygon(parts.into_iter().next().unwrap_or_default()))
            } else {
                Ok(Shape::MultiPolygon(parts))
            }
        }
        Geometry::MultiPolygon(multi) => {
            let mut parts = Vec::new();
            for polygon in &multi {
                parts.extend(normalize_polygon(polygon)?);
            }
            Ok(Shape::MultiPolygon(parts))
        }
        other => Err(Error::MalformedGeometry(format!(
            "unsupported WKT geometry type: {}",
            geometry_name(&other)
        ))),
    }
}

/// Bounding box of a parsed shape, antimeridian-aware.
#[must_use]
pub fn bounding_box(shape: &Shape) -> BoundingBox {
    let rings: Vec<&Vec<[f64; 2]>> = match shape {
        Shape::Point(p) => {
            return BoundingBox {
                min_lat: p[1],
                max_lat: p[1],
                west: p[0],
                east: p[0],
            }
        }
        Shape::LineString(coords) => vec![coords],
        Shape::Polygon(rings) => rings.iter().take(1).collect(),
        Shape::MultiPolygon(polygons) => polygons.iter().filter_map(|p| p.first()).collect(),
    };

    let mut min_lat = f64::MAX;
    let mut max_lat = f64::MIN;
    let mut intervals = Vec::with_capacity(rings.len());
    for ring in rings {
        // Work on unwrapped longitudes so a ring hugging the antimeridian
        // yields a tight interval instead of [-180, 180].
        let unwrapped = unwrap_longitudes(ring);
        let mut ring_west = f64::MAX;
        let mut ring_east = f64::MIN;
        for (i, coord) in unwrapped.iter().enumerate() {
            min_lat = min_lat.min(ring[i][1]);
            max_lat = max_lat.max(ring[i][1]);
            ring_west = ring_west.min(coord[0]);
            ring_east = ring_east.max(coord[0]);
        }
        let start = (ring_west + 180.0).rem_euclid(360.0) - 180.0;
        intervals.push((start, start + (ring_east - ring_west).min(360.0)));
    }
    let (west, east) = merge_longitude_intervals(&intervals);
    BoundingBox {
        min_lat,
        max_lat,
        west,
        east,
    }
}

/// Union of longitude intervals on the circle, returned as (west, east).
///
/// Intervals are `(start, end)` with `start` in `[-180, 180)` and
/// `end >= start`. The union is the complement of the widest uncovered
/// gap; `west > east` in the result signals an antimeridian crossing.
fn merge_longitude_intervals(intervals: &[(f64, f64)]) -> (f64, f64) {
    // Duplicate each interval one period later so a gap that wraps the
    // seam shows up between consecutive entries.
    let mut doubled = Vec::with_capacity(intervals.len() * 2);
    for &(start, end) in intervals {
        if end - start >= 360.0 {
            return (-180.0, 180.0);
        }
        doubled.push((start, end));
        doubled.push((start + 360.0, end + 360.0));
    }
    doubled.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut merged: Vec<(f64, f64)> = Vec::with_capacity(doubled.len());
    for (start, end) in doubled {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    let mut best_gap = 0.0;
    let mut west = 0.0;
    let mut east = 0.0;
    for pair in merged.windows(2) {
        let gap = pair[1].0 - pair[0].1;
        if gap > best_gap {
            best_gap = gap;
            west = pair[1].0;
            east = pair[0].1;
        }
    }
    if best_gap <= 0.0 {
        return (-180.0, 180.0);
    }
    (wrap_longitude(west), wrap_longitude(east))
}

fn geometry_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "POINT",
        Geometry::Line(_) => "LINE",
        Geometry::LineString(_) => "LINESTRING",
        Geometry::Polygon(_) => "POLYGON",
        Geometry::MultiPoint(_) => "MULTIPOINT",
        Geometry::MultiLineString(_) => "MULTILINESTRING",
        Geometry::MultiPolygon(_) => "MULTIPOLYGON",
        Geometry::GeometryCollection(_) => "GEOMETRYCOLLECTION",
        Geometry::Rect(_) => "RECT",
        Geometry::Triangle(_) => "TRIANGLE",
    }
}

/// Drops consecutive duplicate coordinates, preserving order.
fn dedupe(line: &LineString<f64>) -> Vec<[f64; 2]> {
    let mut coords: Vec<[f64; 2]> = Vec::with_capacity(line.0.len());
    for c in &line.0 {
        let point = [c.x, c.y];
        if coords.last() != Some(&point) {
            coords.push(point);
        }
    }
    coords
}

/// Normalizes one polygon: dedupe, validate, split at the antimeridian.
///
/// Returns one or two ring sets; two when the polygon straddles ±180°.
fn normalize_polygon(polygon: &Polygon<f64>) -> Result<Vec<Vec<Vec<[f64; 2]>>>> {
    let exterior = dedupe(polygon.exterior());
    if exterior.len() < 4 {
        return Err(Error::MalformedGeometry(
            "polygon ring needs at least three distinct points".to_string(),
        ));
    }
    let unwrapped = unwrap_longitudes(&exterior);
    if ring_area(&unwrapped).abs() < f64::EPSILON {
        return Err(Error::MalformedGeometry(
            "polygon has zero area".to_string(),
        ));
    }

    let holes: Vec<Vec<[f64; 2]>> = polygon
        .interiors()
        .iter()
        .map(|ring| unwrap_longitudes(&dedupe(ring)))
        .collect();

    let spills_east = unwrapped.iter().any(|c| c[0] > 180.0);
    let spills_west = unwrapped.iter().any(|c| c[0] < -180.0);
    if !spills_east && !spills_west {
        let mut rings = vec![exterior];
        rings.extend(
            holes
                .into_iter()
                .map(|h| h.iter().map(|c| [wrap_longitude(c[0]), c[1]]).collect()),
        );
        return Ok(vec![rings]);
    }

    // Split at the meridian the unwrapped ring spills over, then shift the
    // overflowing half back into [-180, 180].
    let meridian = if spills_east { 180.0 } else { -180.0 };
    let mut parts = Vec::new();
    for (keep_west_side, shift) in [(true, 0.0), (false, -meridian * 2.0)] {
        let clipped = clip_ring(&unwrapped, meridian, keep_west_side == (meridian > 0.0));
        if clipped.len() < 4 || ring_area(&clipped).abs() < f64::EPSILON {
            continue;
        }
        let mut rings = vec![shift_ring(&clipped, shift)];
        for hole in &holes {
            let clipped_hole = clip_ring(hole, meridian, keep_west_side == (meridian > 0.0));
            if clipped_hole.len() >= 4 {
                rings.push(shift_ring(&clipped_hole, shift));
            }
        }
        parts.push(rings);
    }
    if parts.is_empty() {
        return Err(Error::MalformedGeometry(
            "antimeridian-crossing polygon could not be normalized".to_string(),
        ));
    }
    Ok(parts)
}

/// Makes ring longitudes continuous: consecutive deltas never exceed 180°.
fn unwrap_longitudes(ring: &[[f64; 2]]) -> Vec<[f64; 2]> {
    let mut out = Vec::with_capacity(ring.len());
    let mut offset = 0.0;
    let mut prev: Option<f64> = None;
    for c in ring {
        let mut lon = c[0] + offset;
        if let Some(p) = prev {
            if lon - p > 180.0 {
                offset -= 360.0;
                lon -= 360.0;
            } else if lon - p < -180.0 {
                offset += 360.0;
                lon += 360.0;
            }
        }
        prev = Some(lon);
        out.push([lon, c[1]]);
    }
    out
}

fn wrap_longitude(lon: f64) -> f64 {
    if lon > 180.0 {
        lon - 360.0
    } else if lon < -180.0 {
        lon + 360.0
    } else {
        lon
    }
}

fn shift_ring(ring: &[[f64; 2]], shift: f64) -> Vec<[f64; 2]> {
    ring.iter().map(|c| [c[0] + shift, c[1]]).collect()
}

/// Shoelace area of a closed ring (unwrapped coordinates).
fn ring_area(ring: &[[f64; 2]]) -> f64 {
    let mut sum = 0.0;
    for pair in ring.windows(2) {
        sum += pair[0][0] * pair[1][1] - pair[1][0] * pair[0][1];
    }
    sum / 2.0
}

/// Sutherland-Hodgman clip of a closed ring against a vertical meridian.
///
/// `keep_below` keeps the half-plane with `lon <= meridian`, otherwise
/// `lon >= meridian`. The returned ring is closed.
fn clip_ring(ring: &[[f64; 2]], meridian: f64, keep_below: bool) -> Vec<[f64; 2]> {
    let inside =
        |c: &[f64; 2]| if keep_below { c[0] <= meridian } else { c[0] >= meridian };
    let intersect = |a: &[f64; 2], b: &[f64; 2]| -> [f64; 2] {
        let t = (meridian - a[0]) / (b[0] - a[0]);
        [meridian, a[1] + t * (b[1] - a[1])]
    };

    let mut out: Vec<[f64; 2]> = Vec::with_capacity(ring.len() + 2);
    for pair in ring.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        match (inside(a), inside(b)) {
            (true, true) => out.push(*b),
            (true, false) => out.push(intersect(a, b)),
            (false, true) => {
                out.push(intersect(a, b));
                out.push(*b);
            }
            (false, false) => {}
        }
    }
    if out.is_empty() {
        return out;
    }
    if out.first() != out.last() {
        let first = out[0];
        out.push(first);
    }
    // Drop consecutive duplicates the clipping may have introduced.
    let mut cleaned: Vec<[f64; 2]> = Vec::with_capacity(out.len());
    for c in out {
        if cleaned.last() != Some(&c) {
            cleaned.push(c);
        }
    }
    cleaned
}
