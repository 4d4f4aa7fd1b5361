//! Structured search-engine query representation.
//!
//! The visitor produces this IR rather than raw JSON so callers can inspect
//! or recombine clauses; [`SearchQuery::to_json`] renders the final query
//! DSL document and `Serialize` delegates to it.

use serde::ser::Serializer;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::geometry::Shape;

/// One node of the search-engine boolean query tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchQuery {
    /// Nested boolean combinator.
    Bool(BoolQuery),
    /// Exact single-value match.
    Term {
        /// Target index field.
        field: String,
        /// Value to match.
        value: Value,
    },
    /// Exact any-of-set match.
    Terms {
        /// Target index field.
        field: String,
        /// Value set.
        values: Vec<Value>,
    },
    /// Analyzed full-text match.
    Match {
        /// Target index field.
        field: String,
        /// Query text, analyzed by the engine.
        query: String,
    },
    /// Bounded range match.
    Range {
        /// Target index field.
        field: String,
        /// Bound set.
        clause: RangeClause,
    },
    /// Field-has-a-value match.
    Exists {
        /// Target index field.
        field: String,
    },
    /// Distance-from-point match on a geo-point field.
    GeoDistance {
        /// Geo-point field.
        field: String,
        /// Anchor latitude.
        latitude: f64,
        /// Anchor longitude.
        longitude: f64,
        /// Radius, e.g. `5km`.
        distance: String,
    },
    /// Containment match on a geo-shape field.
    GeoShape {
        /// Geo-shape field.
        field: String,
        /// The query shape.
        shape: GeoShapeBody,
    },
}

impl SearchQuery {
    /// Renders the node as a search-engine query DSL document.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(bool_query) => bool_query.to_json(),
            Self::Term { field, value } => keyed("term", field, value.clone()),
            Self::Terms { field, values } => {
                keyed("terms", field, Value::Array(values.clone()))
            }
            Self::Match { field, query } => keyed("match", field, Value::from(query.clone())),
            Self::Range { field, clause } => keyed("range", field, clause.to_json()),
            Self::Exists { field } => json!({ "exists": { "field": field } }),
            Self::GeoDistance {
                field,
                latitude,
                longitude,
                distance,
            } => {
                let mut body = Map::new();
                body.insert("distance".to_string(), Value::from(distance.clone()));
                body.insert(
                    field.clone(),
                    json!({ "lat": latitude, "lon": longitude }),
                );
                json!({ "geo_distance": body })
            }
            Self::GeoShape { field, shape } => keyed(
                "geo_shape",
                field,
                json!({ "shape": shape.to_json(), "relation": "within" }),
            ),
        }
    }
}

/// `{ outer: { field: body } }` with a runtime field name.
fn keyed(outer: &str, field: &str, body: Value) -> Value {
    let mut inner = Map::new();
    inner.insert(field.to_string(), body);
    let mut root = Map::new();
    root.insert(outer.to_string(), Value::Object(inner));
    Value::Object(root)
}

impl Serialize for SearchQuery {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        self.to_json().serialize(serializer)
    }
}

/// A boolean combinator clause.
///
/// Empty occurrence lists are omitted from the rendered document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    /// Clauses that must all match.
    pub must: Vec<SearchQuery>,
    /// Clauses of which at least `minimum_should_match` must match.
    pub should: Vec<SearchQuery>,
    /// Clauses that must not match.
    pub must_not: Vec<SearchQuery>,
    /// Minimum matching `should` clauses.
    pub minimum_should_match: Option<u32>,
}

impl BoolQuery {
    /// A combinator requiring all the given clauses.
    #[must_use]
    pub fn all_of(must: Vec<SearchQuery>) -> Self {
        Self {
            must,
            ..Self::default()
        }
    }

    /// A combinator requiring at least one of the given clauses.
    #[must_use]
    pub fn any_of(should: Vec<SearchQuery>) -> Self {
        Self {
            should,
            minimum_should_match: Some(1),
            ..Self::default()
        }
    }

    /// A combinator rejecting the given clause.
    #[must_use]
    pub fn none_of(clause: SearchQuery) -> Self {
        Self {
            must_not: vec![clause],
            ..Self::default()
        }
    }

    fn to_json(&self) -> Value {
        let mut body = Map::new();
        let render = |clauses: &[SearchQuery]| {
            Value::Array(clauses.iter().map(SearchQuery::to_json).collect())
        };
        if !self.must.is_empty() {
            body.insert("must".to_string(), render(&self.must));
        }
        if !self.should.is_empty() {
            body.insert("should".to_string(), render(&self.should));
        }
        if !self.must_not.is_empty() {
            body.insert("must_not".to_string(), render(&self.must_not));
        }
        if let Some(minimum) = self.minimum_should_match {
            body.insert("minimum_should_match".to_string(), Value::from(minimum));
        }
        json!({ "bool": body })
    }
}

/// Bound set of a range clause; unset bounds are omitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeClause {
    /// Inclusive lower bound.
    pub gte: Option<Value>,
    /// Exclusive lower bound.
    pub gt: Option<Value>,
    /// Inclusive upper bound.
    pub lte: Option<Value>,
    /// Exclusive upper bound.
    pub lt: Option<Value>,
}

impl RangeClause {
    fn to_json(&self) -> Value {
        let mut body = Map::new();
        let bounds = [
            ("gte", &self.gte),
            ("gt", &self.gt),
            ("lte", &self.lte),
            ("lt", &self.lt),
        ];
        for (name, bound) in bounds {
            if let Some(value) = bound {
                body.insert(name.to_string(), value.clone());
            }
        }
        Value::Object(body)
    }
}

/// Shape body of a geo-shape clause, GeoJSON-style.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoShapeBody {
    /// GeoJSON geometry type.
    pub shape_type: &'static str,
    /// Nested coordinate arrays, `[lon, lat]` innermost.
    pub coordinates: Value,
}

impl GeoShapeBody {
    fn to_json(&self) -> Value {
        json!({ "type": self.shape_type, "coordinates": self.coordinates })
    }
}

impl From<&Shape> for GeoShapeBody {
    fn from(shape: &Shape) -> Self {
        match shape {
            Shape::Point(point) => Self {
                shape_type: "point",
                coordinates: json!(point),
            },
            Shape::LineString(coords) => Self {
                shape_type: "linestring",
                coordinates: json!(coords),
            },
            Shape::Polygon(rings) => Self {
                shape_type: "polygon",
                coordinates: json!(rings),
            },
            Shape::MultiPolygon(parts) => Self {
                shape_type: "multipolygon",
                coordinates: json!(parts),
            },
        }
    }
}
