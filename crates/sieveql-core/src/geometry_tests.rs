//! Tests for geometry module

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::geometry::{bounding_box, parse_wkt, Shape};

    #[test]
    fn test_parse_point() {
        let shape = parse_wkt("POINT (30.5 -10.25)").unwrap();
        assert_eq!(shape, Shape::Point([30.5, -10.25]));
    }

    #[test]
    fn test_parse_linestring_drops_duplicate_vertices() {
        let shape = parse_wkt("LINESTRING (0 0, 0 0, 10 10, 20 20)").unwrap();
        let Shape::LineString(coords) = shape else {
            panic!("expected linestring");
        };
        assert_eq!(coords, vec![[0.0, 0.0], [10.0, 10.0], [20.0, 20.0]]);
    }

    #[test]
    fn test_parse_simple_polygon() {
        let shape = parse_wkt("POLYGON ((30 10, 10 20, 20 40, 40 40, 30 10))").unwrap();
        let Shape::Polygon(rings) = shape else {
            panic!("expected polygon");
        };
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].first(), rings[0].last());
        assert_eq!(rings[0][0], [30.0, 10.0]);
    }

    #[test]
    fn test_parse_polygon_with_hole() {
        let shape = parse_wkt(
            "POLYGON ((0 0, 10 0, 10 10, 0 10, 0 0), (2 2, 4 2, 4 4, 2 4, 2 2))",
        )
        .unwrap();
        let Shape::Polygon(rings) = shape else {
            panic!("expected polygon");
        };
        assert_eq!(rings.len(), 2);
    }

    #[test]
    fn test_rejects_garbage() {
        let err = parse_wkt("POLYGON ((an an, bb bb))").unwrap_err();
        assert!(matches!(err, Error::MalformedGeometry(_)));
    }

    #[test]
    fn test_rejects_unsupported_geometry_type() {
        let err = parse_wkt("MULTIPOINT ((10 40), (40 30))").unwrap_err();
        assert!(err.to_string().contains("MULTIPOINT"));
    }

    #[test]
    fn test_rejects_zero_area_polygon() {
        let err = parse_wkt("POLYGON ((0 0, 10 0, 20 0, 0 0))").unwrap_err();
        assert!(matches!(err, Error::MalformedGeometry(_)));
    }

    #[test]
    fn test_antimeridian_polygon_splits_into_two_parts() {
        // 20° wide band straddling the antimeridian.
        let shape =
            parse_wkt("POLYGON ((170 -10, -170 -10, -170 10, 170 10, 170 -10))").unwrap();
        let Shape::MultiPolygon(parts) = shape else {
            panic!("expected a split multipolygon");
        };
        assert_eq!(parts.len(), 2);
        for part in &parts {
            for coord in &part[0] {
                assert!(coord[0] >= -180.0 && coord[0] <= 180.0);
            }
        }
        // One side must touch +180, the other -180.
        let touches = |parts: &[Vec<Vec<[f64; 2]>>], lon: f64| {
            parts
                .iter()
                .any(|p| p[0].iter().any(|c| (c[0] - lon).abs() < 1e-9))
        };
        assert!(touches(&parts, 180.0));
        assert!(touches(&parts, -180.0));
    }

    #[test]
    fn test_non_crossing_polygon_stays_single() {
        let shape = parse_wkt("POLYGON ((-10 -10, 10 -10, 10 10, -10 10, -10 -10))").unwrap();
        assert!(matches!(shape, Shape::Polygon(_)));
    }

    #[test]
    fn test_bounding_box_plain() {
        let shape = parse_wkt("POLYGON ((30 10, 10 20, 20 40, 40 40, 30 10))").unwrap();
        let bbox = bounding_box(&shape);
        assert!((bbox.min_lat - 10.0).abs() < 1e-9);
        assert!((bbox.max_lat - 40.0).abs() < 1e-9);
        assert!((bbox.west - 10.0).abs() < 1e-9);
        assert!((bbox.east - 40.0).abs() < 1e-9);
        assert!(!bbox.crosses_antimeridian());
    }

    #[test]
    fn test_bounding_box_across_antimeridian() {
        let shape =
            parse_wkt("POLYGON ((170 -10, -170 -10, -170 10, 170 10, 170 -10))").unwrap();
        let bbox = bounding_box(&shape);
        assert!(bbox.crosses_antimeridian());
        assert!((bbox.west - 170.0).abs() < 1e-9);
        assert!((bbox.east - -170.0).abs() < 1e-9);
        assert!((bbox.min_lat - -10.0).abs() < 1e-9);
        assert!((bbox.max_lat - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_bounding_box_point() {
        let bbox = bounding_box(&Shape::Point([12.0, 56.0]));
        assert!((bbox.west - 12.0).abs() < 1e-9);
        assert!((bbox.min_lat - 56.0).abs() < 1e-9);
        assert!(!bbox.crosses_antimeridian());
    }
}
