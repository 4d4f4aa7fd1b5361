//! The logical filter model: an immutable tree of typed search predicates.
//!
//! A [`Predicate`] is either a compound boolean combinator (conjunction,
//! disjunction, negation) or a simple per-field test. The tree is built and
//! validated by the embedding application; the translation engine only ever
//! reads it. Literal values are carried as strings and interpreted through
//! the active mapper's term table, so the same tree can be compiled for
//! different backends.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A node in the logical filter tree.
///
/// `S` is the domain-specific field parameter type (e.g.
/// [`OccurrenceField`](crate::OccurrenceField)); every simple predicate's
/// field must belong to the domain the active mapper understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate<S> {
    /// Logical AND of the child predicates.
    Conjunction {
        /// Children, in emission order.
        predicates: Vec<Predicate<S>>,
    },
    /// Logical OR of the child predicates.
    Disjunction {
        /// Children, in emission order.
        predicates: Vec<Predicate<S>>,
    },
    /// Logical NOT of a single child predicate.
    Not {
        /// The negated child.
        predicate: Box<Predicate<S>>,
    },
    /// field == value
    Equals {
        /// Field under test.
        field: S,
        /// Literal value, typed by the mapper's term table.
        value: String,
        /// Match case-sensitively (verbatim field / no case folding).
        match_case: bool,
    },
    /// Field value is one of the given literals.
    In {
        /// Field under test.
        field: S,
        /// Literal value set.
        values: Vec<String>,
        /// Match case-sensitively.
        match_case: bool,
    },
    /// field > value
    GreaterThan {
        /// Field under test.
        field: S,
        /// Literal bound.
        value: String,
    },
    /// field >= value
    GreaterThanOrEquals {
        /// Field under test.
        field: S,
        /// Literal bound.
        value: String,
    },
    /// field < value
    LessThan {
        /// Field under test.
        field: S,
        /// Literal bound.
        value: String,
    },
    /// field <= value
    LessThanOrEquals {
        /// Field under test.
        field: S,
        /// Literal bound.
        value: String,
    },
    /// Field value falls within explicit gt/gte/lt/lte bounds.
    Range {
        /// Field under test.
        field: S,
        /// Bound set.
        value: RangeValue,
    },
    /// SQL-LIKE style pattern match.
    ///
    /// Logical wildcards are `*` (zero or more characters) and `?`
    /// (exactly one character); backend dialect syntax is substituted by
    /// the visitors.
    Like {
        /// Field under test.
        field: S,
        /// Pattern with logical wildcards.
        value: String,
        /// Match case-sensitively.
        match_case: bool,
    },
    /// Field has no value.
    IsNull {
        /// Field under test.
        field: S,
    },
    /// Field has a value.
    IsNotNull {
        /// Field under test.
        field: S,
    },
    /// Location lies within a radius of a point.
    GeoDistance {
        /// Anchor point and radius.
        distance: GeoDistance,
    },
    /// Location falls within a WKT geometry.
    Within {
        /// Well-known-text geometry (POINT, LINESTRING, POLYGON or
        /// MULTIPOLYGON).
        geometry: String,
    },
}

impl<S: Copy> Predicate<S> {
    /// Creates a conjunction (AND) of the given predicates.
    #[must_use]
    pub fn conjunction(predicates: Vec<Predicate<S>>) -> Self {
        Self::Conjunction { predicates }
    }

    /// Creates a disjunction (OR) of the given predicates.
    #[must_use]
    pub fn disjunction(predicates: Vec<Predicate<S>>) -> Self {
        Self::Disjunction { predicates }
    }

    /// Negates a predicate.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(predicate: Predicate<S>) -> Self {
        Self::Not {
            predicate: Box::new(predicate),
        }
    }

    /// Creates a case-insensitive equality predicate.
    #[must_use]
    pub fn equals(field: S, value: impl Into<String>) -> Self {
        Self::Equals {
            field,
            value: value.into(),
            match_case: false,
        }
    }

    /// Creates an equality predicate with explicit case sensitivity.
    #[must_use]
    pub fn equals_match_case(field: S, value: impl Into<String>, match_case: bool) -> Self {
        Self::Equals {
            field,
            value: value.into(),
            match_case,
        }
    }

    /// Creates a case-insensitive IN predicate.
    #[must_use]
    pub fn is_in(field: S, values: Vec<String>) -> Self {
        Self::In {
            field,
            values,
            match_case: false,
        }
    }

    /// Creates a greater-than predicate.
    #[must_use]
    pub fn greater_than(field: S, value: impl Into<String>) -> Self {
        Self::GreaterThan {
            field,
            value: value.into(),
        }
    }

    /// Creates a greater-than-or-equals predicate.
    #[must_use]
    pub fn greater_than_or_equals(field: S, value: impl Into<String>) -> Self {
        Self::GreaterThanOrEquals {
            field,
            value: value.into(),
        }
    }

    /// Creates a less-than predicate.
    #[must_use]
    pub fn less_than(field: S, value: impl Into<String>) -> Self {
        Self::LessThan {
            field,
            value: value.into(),
        }
    }

    /// Creates a less-than-or-equals predicate.
    #[must_use]
    pub fn less_than_or_equals(field: S, value: impl Into<String>) -> Self {
        Self::LessThanOrEquals {
            field,
            value: value.into(),
        }
    }

    /// Creates a range predicate from a validated bound set.
    #[must_use]
    pub fn range(field: S, value: RangeValue) -> Self {
        Self::Range { field, value }
    }

    /// Creates a case-insensitive LIKE predicate.
    #[must_use]
    pub fn like(field: S, value: impl Into<String>) -> Self {
        Self::Like {
            field,
            value: value.into(),
            match_case: false,
        }
    }

    /// Creates an is-null predicate.
    #[must_use]
    pub fn is_null(field: S) -> Self {
        Self::IsNull { field }
    }

    /// Creates an is-not-null predicate.
    #[must_use]
    pub fn is_not_null(field: S) -> Self {
        Self::IsNotNull { field }
    }

    /// Creates a geo-distance predicate.
    #[must_use]
    pub fn geo_distance(distance: GeoDistance) -> Self {
        Self::GeoDistance { distance }
    }

    /// Creates a within-geometry predicate from WKT.
    #[must_use]
    pub fn within(geometry: impl Into<String>) -> Self {
        Self::Within {
            geometry: geometry.into(),
        }
    }

    /// The field a simple predicate tests, if any.
    ///
    /// Compound and geospatial predicates return `None`.
    #[must_use]
    pub fn simple_field(&self) -> Option<S> {
        match self {
            Self::Equals { field, .. }
            | Self::In { field, .. }
            | Self::GreaterThan { field, .. }
            | Self::GreaterThanOrEquals { field, .. }
            | Self::LessThan { field, .. }
            | Self::LessThanOrEquals { field, .. }
            | Self::Range { field, .. }
            | Self::Like { field, .. }
            | Self::IsNull { field }
            | Self::IsNotNull { field } => Some(*field),
            _ => None,
        }
    }
}

impl<S: Copy + Eq> Predicate<S> {
    /// Checks whether a disjunction's children collapse into a single IN
    /// predicate: all of them equality tests on one identical field with
    /// identical case sensitivity.
    ///
    /// Both backends apply the same collapse so their results stay
    /// consistent; for large disjunctions an IN is also considerably
    /// faster than a flat OR on either store.
    #[must_use]
    pub fn as_single_field_equality(children: &[Predicate<S>]) -> Option<(S, Vec<&str>, bool)> {
        if children.len() < 2 {
            return None;
        }
        let mut common: Option<(S, bool)> = None;
        let mut values = Vec::with_capacity(children.len());
        for child in children {
            let Self::Equals {
                field,
                value,
                match_case,
            } = child
            else {
                return None;
            };
            match common {
                None => common = Some((*field, *match_case)),
                Some((f, mc)) if f == *field && mc == *match_case => {}
                Some(_) => return None,
            }
            values.push(value.as_str());
        }
        common.map(|(field, match_case)| (field, values, match_case))
    }
}

/// Explicit bound set for a [`Predicate::Range`].
///
/// At least one bound must be present; `gte`/`gt` are mutually exclusive,
/// as are `lte`/`lt`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeValue {
    /// Inclusive lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<String>,
    /// Exclusive lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt: Option<String>,
    /// Inclusive upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<String>,
    /// Exclusive upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lt: Option<String>,
}

impl RangeValue {
    /// Creates a validated bound set.
    pub fn new(
        gte: Option<&str>,
        gt: Option<&str>,
        lte: Option<&str>,
        lt: Option<&str>,
    ) -> Result<Self> {
        if gte.is_none() && gt.is_none() && lte.is_none() && lt.is_none() {
            return Err(Error::InvalidValue(
                "range requires at least one bound".to_string(),
            ));
        }
        if gte.is_some() && gt.is_some() {
            return Err(Error::InvalidValue(
                "specify gte or gt, not both".to_string(),
            ));
        }
        if lte.is_some() && lt.is_some() {
            return Err(Error::InvalidValue(
                "specify lte or lt, not both".to_string(),
            ));
        }
        Ok(Self {
            gte: gte.map(str::to_string),
            gt: gt.map(str::to_string),
            lte: lte.map(str::to_string),
            lt: lt.map(str::to_string),
        })
    }
}

/// Anchor point and radius for a [`Predicate::GeoDistance`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoDistance {
    /// Latitude of the anchor point, in degrees.
    pub latitude: f64,
    /// Longitude of the anchor point, in degrees.
    pub longitude: f64,
    /// Search radius.
    pub distance: Distance,
}

impl GeoDistance {
    /// Creates a validated geo-distance anchor.
    pub fn new(latitude: f64, longitude: f64, distance: Distance) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::InvalidValue(format!(
                "latitude {latitude} out of range [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::InvalidValue(format!(
                "longitude {longitude} out of range [-180, 180]"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
            distance,
        })
    }
}

/// A distance magnitude with unit, e.g. `5km`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    /// Magnitude, strictly positive.
    pub value: f64,
    /// Unit of measure.
    pub unit: DistanceUnit,
}

impl Distance {
    /// Creates a validated distance.
    pub fn new(value: f64, unit: DistanceUnit) -> Result<Self> {
        if value <= 0.0 || !value.is_finite() {
            return Err(Error::InvalidValue(format!(
                "distance must be a positive number, got {value}"
            )));
        }
        Ok(Self { value, unit })
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

impl FromStr for Distance {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        // Longest suffix first so "5km" does not parse as "5k" + "m".
        let (number, unit) = if let Some(v) = s.strip_suffix("km") {
            (v, DistanceUnit::Kilometers)
        } else if let Some(v) = s.strip_suffix("mi") {
            (v, DistanceUnit::Miles)
        } else if let Some(v) = s.strip_suffix('m') {
            (v, DistanceUnit::Meters)
        } else {
            return Err(Error::InvalidValue(format!(
                "distance '{s}' must end in m, km or mi"
            )));
        };
        let value: f64 = number
            .trim()
            .parse()
            .map_err(|_| Error::InvalidValue(format!("invalid distance magnitude '{number}'")))?;
        Self::new(value, unit)
    }
}

/// Units supported for geo-distance radii.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
    /// Metres.
    Meters,
    /// Kilometres.
    Kilometers,
    /// Statute miles.
    Miles,
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Meters => "m",
            Self::Kilometers => "km",
            Self::Miles => "mi",
        };
        f.write_str(s)
    }
}
