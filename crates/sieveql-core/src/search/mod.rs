//! Translation of predicate trees into search-engine boolean queries.
//!
//! Recursive return-and-combine: every predicate node becomes exactly one
//! [`SearchQuery`] node, so compound clauses mirror the input tree 1:1 (the
//! only rewrite is the disjunction-to-terms collapse, which both backends
//! apply identically).

pub mod query;


use serde_json::Value;
use tracing::trace;

use crate::columns::{self, Term, TermKind};
use crate::datetime;
use crate::error::{Error, Result};
use crate::geometry;
use crate::mapper::FieldMapper;
use crate::predicate::{GeoDistance, Predicate, RangeValue};
use crate::search::query::{BoolQuery, GeoShapeBody, RangeClause, SearchQuery};

/// Compiles a predicate tree into a [`SearchQuery`].
///
/// Stateless; one instance can serve any number of concurrent calls.
#[derive(Debug, Clone, Copy)]
pub struct SearchQueryVisitor<'a, M> {
    mapper: &'a M,
}

impl<'a, M: FieldMapper> SearchQueryVisitor<'a, M> {
    /// Creates a visitor over the given mapper.
    #[must_use]
    pub const fn new(mapper: &'a M) -> Self {
        Self { mapper }
    }

    /// Translates the whole tree, all-or-nothing.
    pub fn build_query(&self, predicate: &Predicate<M::Field>) -> Result<SearchQuery> {
        let query = self.visit(predicate)?;
        trace!(target: "sieveql::search", "compiled search query");
        Ok(query)
    }

    fn visit(&self, predicate: &Predicate<M::Field>) -> Result<SearchQuery> {
        match predicate {
            Predicate::Conjunction { predicates } => {
                let clauses = predicates
                    .iter()
                    .map(|child| self.visit(child))
                    .collect::<Result<Vec<_>>>()?;
                Ok(SearchQuery::Bool(BoolQuery::all_of(clauses)))
            }
            Predicate::Disjunction { predicates } => self.visit_disjunction(predicates),
            Predicate::Not { predicate } => {
                Ok(SearchQuery::Bool(BoolQuery::none_of(self.visit(predicate)?)))
            }
            Predicate::Equals {
                field,
                value,
                match_case,
            } => self.visit_equals(*field, value, *match_case),
            Predicate::In {
                field,
                values,
                match_case,
            } => {
                let values: Vec<&str> = values.iter().map(String::as_str).collect();
                self.visit_in(*field, &values, *match_case)
            }
            Predicate::GreaterThan { field, value }
            | Predicate::GreaterThanOrEquals { field, value }
            | Predicate::LessThan { field, value }
            | Predicate::LessThanOrEquals { field, value } => {
                self.visit_comparison(predicate, *field, value)
            }
            Predicate::Range { field, value } => self.visit_range(*field, value),
            Predicate::Like {
                field,
                value,
                match_case: _,
            } => Ok(SearchQuery::Match {
                field: self.mapper.verbatim_field_name(*field)?.to_string(),
                query: value.clone(),
            }),
            Predicate::IsNull { field } => {
                Ok(SearchQuery::Bool(BoolQuery::none_of(self.exists(*field)?)))
            }
            Predicate::IsNotNull { field } => self.exists(*field),
            Predicate::GeoDistance { distance } => Ok(self.geo_distance(distance)),
            Predicate::Within { geometry } => self.geo_shape(geometry),
        }
    }

    /// Disjunctions where every child is an equality on one field collapse
    /// into a single terms clause; anything else mirrors its children.
    fn visit_disjunction(&self, children: &[Predicate<M::Field>]) -> Result<SearchQuery> {
        if let Some((field, values, match_case)) = Predicate::as_single_field_equality(children) {
            let term = self.mapper.term(field)?;
            if !columns::is_date(term.kind) {
                return self.visit_in(field, &values, match_case);
            }
        }
        let clauses = children
            .iter()
            .map(|child| self.visit(child))
            .collect::<Result<Vec<_>>>()?;
        Ok(SearchQuery::Bool(BoolQuery::any_of(clauses)))
    }

    fn visit_equals(
        &self,
        field: M::Field,
        value: &str,
        match_case: bool,
    ) -> Result<SearchQuery> {
        let term = self.mapper.term(field)?;
        if columns::is_date(term.kind) {
            let clause = date_equality_range(value)?;
            return Ok(SearchQuery::Range {
                field: self.mapper.exact_match_field_name(field)?.to_string(),
                clause,
            });
        }
        let name = self.field_name(field, match_case)?;
        let value = typed_value(term, value)?;
        if self.mapper.is_array(field)? || self.mapper.is_vocabulary(field)? {
            Ok(SearchQuery::Terms {
                field: name,
                values: vec![value],
            })
        } else {
            Ok(SearchQuery::Term { field: name, value })
        }
    }

    fn visit_in(&self, field: M::Field, values: &[&str], match_case: bool) -> Result<SearchQuery> {
        let term = self.mapper.term(field)?;
        if columns::is_date(term.kind) {
            let name = self.mapper.exact_match_field_name(field)?;
            let clauses = values
                .iter()
                .map(|raw| {
                    Ok(SearchQuery::Range {
                        field: name.to_string(),
                        clause: date_equality_range(raw)?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            return Ok(SearchQuery::Bool(BoolQuery::any_of(clauses)));
        }
        let values = values
            .iter()
            .map(|raw| typed_value(term, raw))
            .collect::<Result<Vec<_>>>()?;
        Ok(SearchQuery::Terms {
            field: self.field_name(field, match_case)?,
            values,
        })
    }

    fn visit_comparison(
        &self,
        predicate: &Predicate<M::Field>,
        field: M::Field,
        value: &str,
    ) -> Result<SearchQuery> {
        let term = self.mapper.term(field)?;
        let clause = comparison_range(predicate, term, value)?;
        let range = SearchQuery::Range {
            field: self.mapper.exact_match_field_name(field)?.to_string(),
            clause,
        };
        if self.mapper.include_null_in_predicate(predicate) {
            let missing = SearchQuery::Bool(BoolQuery::none_of(self.exists(field)?));
            return Ok(SearchQuery::Bool(BoolQuery::any_of(vec![range, missing])));
        }
        Ok(range)
    }

    fn visit_range(&self, field: M::Field, bounds: &RangeValue) -> Result<SearchQuery> {
        let term = self.mapper.term(field)?;
        let clause = explicit_range(term, bounds)?;
        let range = SearchQuery::Range {
            field: self.mapper.exact_match_field_name(field)?.to_string(),
            clause,
        };
        if self.mapper.include_null_in_range(field, bounds) {
            let missing = SearchQuery::Bool(BoolQuery::none_of(self.exists(field)?));
            return Ok(SearchQuery::Bool(BoolQuery::any_of(vec![range, missing])));
        }
        Ok(range)
    }

    fn exists(&self, field: M::Field) -> Result<SearchQuery> {
        Ok(SearchQuery::Exists {
            field: self.mapper.exact_match_field_name(field)?.to_string(),
        })
    }

    fn geo_distance(&self, distance: &GeoDistance) -> SearchQuery {
        SearchQuery::GeoDistance {
            field: self.mapper.geo_distance_field().to_string(),
            latitude: distance.latitude,
            longitude: distance.longitude,
            distance: distance.distance.to_string(),
        }
    }

    fn geo_shape(&self, wkt_text: &str) -> Result<SearchQuery> {
        let shape = geometry::parse_wkt(wkt_text)?;
        Ok(SearchQuery::GeoShape {
            field: self.mapper.geo_shape_field().to_string(),
            shape: GeoShapeBody::from(&shape),
        })
    }

    /// Case-sensitive matches hit the verbatim field, the rest the
    /// exact-match field.
    fn field_name(&self, field: M::Field, match_case: bool) -> Result<String> {
        let name = if match_case {
            self.mapper.verbatim_field_name(field)?
        } else {
            self.mapper.exact_match_field_name(field)?
        };
        Ok(name.to_string())
    }
}

/// Interprets a literal for a typed index field.
fn typed_value(term: Term, raw: &str) -> Result<Value> {
    let invalid = |kind: &str| {
        Error::InvalidValue(format!("'{raw}' is not a valid {kind} for {}", term.name))
    };
    match term.kind {
        TermKind::Integer => raw
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| invalid("integer")),
        TermKind::Double => raw
            .trim()
            .parse::<f64>()
            .map(Value::from)
            .map_err(|_| invalid("number")),
        TermKind::Boolean => raw
            .trim()
            .to_ascii_lowercase()
            .parse::<bool>()
            .map(Value::from)
            .map_err(|_| invalid("boolean")),
        _ => Ok(Value::from(raw)),
    }
}

/// A date equality covers the whole period the literal names, as a
/// closed-open range.
fn date_equality_range(value: &str) -> Result<RangeClause> {
    let interval = datetime::parse_interval(value)?;
    Ok(RangeClause {
        gte: interval.start.map(|d| Value::from(datetime::iso_value(d))),
        lt: interval.end.map(|d| Value::from(datetime::iso_value(d))),
        ..RangeClause::default()
    })
}

/// Range clause for a single comparison predicate.
///
/// Date bounds honor period semantics: `>= 2000` starts at 2000-01-01,
/// `> 2000` starts after 2000-12-31, `<= 2000` ends before 2001-01-01 and
/// `< 2000` ends before 2000-01-01.
fn comparison_range<S>(predicate: &Predicate<S>, term: Term, value: &str) -> Result<RangeClause> {
    let mut clause = RangeClause::default();
    if columns::is_date(term.kind) {
        let (start, end) = datetime::parse_period(value)?;
        let iso = |d| Value::from(datetime::iso_value(d));
        match predicate {
            Predicate::GreaterThanOrEquals { .. } => clause.gte = Some(iso(start)),
            Predicate::GreaterThan { .. } => clause.gte = Some(iso(end)),
            Predicate::LessThanOrEquals { .. } => clause.lt = Some(iso(end)),
            Predicate::LessThan { .. } => clause.lt = Some(iso(start)),
            _ => {}
        }
        return Ok(clause);
    }
    let bound = typed_value(term, value)?;
    match predicate {
        Predicate::GreaterThan { .. } => clause.gt = Some(bound),
        Predicate::GreaterThanOrEquals { .. } => clause.gte = Some(bound),
        Predicate::LessThan { .. } => clause.lt = Some(bound),
        Predicate::LessThanOrEquals { .. } => clause.lte = Some(bound),
        _ => {}
    }
    Ok(clause)
}

/// Range clause for an explicit bound set.
fn explicit_range(term: Term, bounds: &RangeValue) -> Result<RangeClause> {
    let mut clause = RangeClause::default();
    if columns::is_date(term.kind) {
        let iso = |d| Value::from(datetime::iso_value(d));
        if let Some(raw) = &bounds.gte {
            clause.gte = Some(iso(datetime::parse_period(raw)?.0));
        }
        if let Some(raw) = &bounds.gt {
            clause.gte = Some(iso(datetime::parse_period(raw)?.1));
        }
        if let Some(raw) = &bounds.lte {
            clause.lt = Some(iso(datetime::parse_period(raw)?.1));
        }
        if let Some(raw) = &bounds.lt {
            clause.lt = Some(iso(datetime::parse_period(raw)?.0));
        }
        return Ok(clause);
    }
    if let Some(raw) = &bounds.gte {
        clause.gte = Some(typed_value(term, raw)?);
    }
    if let Some(raw) = &bounds.gt {
        clause.gt = Some(typed_value(term, raw)?);
    }
    if let Some(raw) = &bounds.lte {
        clause.lte = Some(typed_value(term, raw)?);
    }
    if let Some(raw) = &bounds.lt {
        clause.lt = Some(typed_value(term, raw)?);
    }
    Ok(clause)
}
