//! Translation of predicate trees into SQL `WHERE` fragments.
//!
//! Literals are inlined, escaped and cast by the column's term kind; the
//! produced string is safe to splice directly after `WHERE`. Same
//! return-and-combine recursion and disjunction collapse as the search
//! backend, so both stores answer the same logical filter identically.

#[cfg(test)]
mod tests;

use std::fmt::Write as _;

use chrono::NaiveDate;
use tracing::trace;

use crate::columns::{self, Term, TermKind};
use crate::datetime;
use crate::error::{Error, Result};
use crate::geometry;
use crate::mapper::FieldMapper;
use crate::predicate::{GeoDistance, Predicate, RangeValue};

/// Compiles a predicate tree into a SQL boolean expression.
///
/// Stateless; one instance can serve any number of concurrent calls.
#[derive(Debug, Clone, Copy)]
pub struct SqlQueryVisitor<'a, M> {
    mapper: &'a M,
}

impl<'a, M: FieldMapper> SqlQueryVisitor<'a, M> {
    /// Creates a visitor over the given mapper.
    #[must_use]
    pub const fn new(mapper: &'a M) -> Self {
        Self { mapper }
    }

    /// Translates the whole tree, all-or-nothing.
    pub fn build_query(&self, predicate: &Predicate<M::Field>) -> Result<String> {
        let sql = self.visit(predicate)?;
        trace!(target: "sieveql::sql", "compiled SQL fragment");
        Ok(sql)
    }

    fn visit(&self, predicate: &Predicate<M::Field>) -> Result<String> {
        match predicate {
            Predicate::Conjunction { predicates } => self.visit_compound(predicates, " AND "),
            Predicate::Disjunction { predicates } => {
                if let Some((field, values, match_case)) =
                    Predicate::as_single_field_equality(predicates)
                {
                    let term = self.mapper.term(field)?;
                    if !columns::is_date(term.kind) {
                        return self.visit_in(field, &values, match_case);
                    }
                }
                self.visit_compound(predicates, " OR ")
            }
            Predicate::Not { predicate } => Ok(format!("NOT ({})", self.visit(predicate)?)),
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
                match_case,
            } => self.visit_like(*field, value, *match_case),
            Predicate::IsNull { field } => self.visit_is_null(*field),
            Predicate::IsNotNull { field } => self.visit_is_not_null(*field),
            Predicate::GeoDistance { distance } => self.visit_geo_distance(distance),
            Predicate::Within { geometry } => self.visit_within(geometry),
        }
    }

    fn visit_compound(
        &self,
        children: &[Predicate<M::Field>],
        separator: &str,
    ) -> Result<String> {
        let mut out = String::new();
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                out.push_str(separator);
            }
            let _ = write!(out, "({})", self.visit(child)?);
        }
        Ok(out)
    }

    fn visit_equals(&self, field: M::Field, value: &str, match_case: bool) -> Result<String> {
        if let Some(terms) = self.mapper.expansion_terms(field) {
            let parts = terms
                .iter()
                .map(|term| self.equality_on_term(*term, value, match_case))
                .collect::<Result<Vec<_>>>()?;
            return Ok(join_parenthesized(&parts, " OR "));
        }
        let term = self.mapper.term(field)?;
        let equality = self.equality_on_term(term, value, match_case)?;
        if let Some(denorm) = self.mapper.denorm_column(field) {
            let contained = self.equality_on_term(denorm, value, match_case)?;
            return Ok(format!("({equality} OR {contained})"));
        }
        Ok(equality)
    }

    /// One equality test against one physical column, by term kind.
    fn equality_on_term(&self, term: Term, value: &str, match_case: bool) -> Result<String> {
        if columns::is_date(term.kind) {
            return date_interval_condition(term, value);
        }
        let column = columns::sql_query_column(term);
        if columns::is_vocabulary(term.kind) {
            return Ok(format!("array_contains({column}, {})", quoted(value)));
        }
        if columns::is_sql_array(term.kind) {
            return Ok(format!(
                "array_contains({column}, {}, {match_case})",
                quoted(value)
            ));
        }
        let literal = sql_literal(term, value)?;
        if folds_case(term.kind, match_case) {
            Ok(format!("lower({column}) = lower({literal})"))
        } else {
            Ok(format!("{column} = {literal}"))
        }
    }

    fn visit_in(&self, field: M::Field, values: &[&str], match_case: bool) -> Result<String> {
        if let Some(terms) = self.mapper.expansion_terms(field) {
            let parts = terms
                .iter()
                .map(|term| self.in_on_term(*term, values, match_case))
                .collect::<Result<Vec<_>>>()?;
            return Ok(join_parenthesized(&parts, " OR "));
        }
        let term = self.mapper.term(field)?;
        let membership = self.in_on_term(term, values, match_case)?;
        if let Some(denorm) = self.mapper.denorm_column(field) {
            let contained = self.in_on_term(denorm, values, match_case)?;
            return Ok(format!("({membership} OR {contained})"));
        }
        Ok(membership)
    }

    fn in_on_term(&self, term: Term, values: &[&str], match_case: bool) -> Result<String> {
        // Containment and date columns have no IN form; each value keeps
        // its equality codegen and the set becomes a disjunction.
        if columns::is_complex_type(term.kind) || columns::is_date(term.kind) {
            let parts = values
                .iter()
                .map(|value| self.equality_on_term(term, value, match_case))
                .collect::<Result<Vec<_>>>()?;
            return Ok(join_parenthesized(&parts, " OR "));
        }
        let column = columns::sql_query_column(term);
        let fold = folds_case(term.kind, match_case);
        let rendered = values
            .iter()
            .map(|value| {
                let literal = sql_literal(term, value)?;
                Ok(if fold {
                    format!("lower({literal})")
                } else {
                    literal
                })
            })
            .collect::<Result<Vec<_>>>()?
            .join(", ");
        if fold {
            Ok(format!("lower({column}) IN ({rendered})"))
        } else {
            Ok(format!("{column} IN ({rendered})"))
        }
    }

    fn visit_comparison(
        &self,
        predicate: &Predicate<M::Field>,
        field: M::Field,
        value: &str,
    ) -> Result<String> {
        let term = self.mapper.term(field)?;
        let column = columns::sql_query_column(term);
        let condition = if columns::is_date(term.kind) {
            let (start, end) = datetime::parse_period(value)?;
            // Period semantics: ">= 2000" starts at its first day,
            // "> 2000" starts after its last, and the mirrored rule below.
            match predicate {
                Predicate::GreaterThanOrEquals { .. } => {
                    format!("{column} >= {}", datetime::epoch_value(start, term))
                }
                Predicate::GreaterThan { .. } => {
                    format!("{column} >= {}", datetime::epoch_value(end, term))
                }
                Predicate::LessThanOrEquals { .. } => {
                    format!("{column} < {}", datetime::epoch_value(end, term))
                }
                Predicate::LessThan { .. } => {
                    format!("{column} < {}", datetime::epoch_value(start, term))
                }
                _ => String::new(),
            }
        } else {
            let operator = match predicate {
                Predicate::GreaterThan { .. } => ">",
                Predicate::GreaterThanOrEquals { .. } => ">=",
                Predicate::LessThan { .. } => "<",
                Predicate::LessThanOrEquals { .. } => "<=",
                _ => return Err(Error::UnsupportedPredicate("not a comparison".to_string())),
            };
            format!("{column} {operator} {}", sql_literal(term, value)?)
        };
        if self.mapper.include_null_in_predicate(predicate) {
            return Ok(format!("({condition} OR {column} IS NULL)"));
        }
        Ok(condition)
    }

    fn visit_range(&self, field: M::Field, bounds: &RangeValue) -> Result<String> {
        let term = self.mapper.term(field)?;
        let column = columns::sql_query_column(term);
        let mut parts = Vec::new();
        if columns::is_date(term.kind) {
            let epoch = |raw: &str, end: bool| -> Result<i64> {
                let period = datetime::parse_period(raw)?;
                let day: NaiveDate = if end { period.1 } else { period.0 };
                Ok(datetime::epoch_value(day, term))
            };
            if let Some(raw) = &bounds.gte {
                parts.push(format!("{column} >= {}", epoch(raw, false)?));
            }
            if let Some(raw) = &bounds.gt {
                parts.push(format!("{column} >= {}", epoch(raw, true)?));
            }
            if let Some(raw) = &bounds.lte {
                parts.push(format!("{column} < {}", epoch(raw, true)?));
            }
            if let Some(raw) = &bounds.lt {
                parts.push(format!("{column} < {}", epoch(raw, false)?));
            }
        } else {
            let comparisons = [
                (">=", &bounds.gte),
                (">", &bounds.gt),
                ("<=", &bounds.lte),
                ("<", &bounds.lt),
            ];
            for (operator, bound) in comparisons {
                if let Some(raw) = bound {
                    parts.push(format!("{column} {operator} {}", sql_literal(term, raw)?));
                }
            }
        }
        let condition = if parts.len() == 1 {
            parts.remove(0)
        } else {
            join_parenthesized(&parts, " AND ")
        };
        if self.mapper.include_null_in_range(field, bounds) {
            return Ok(format!("({condition} OR {column} IS NULL)"));
        }
        Ok(condition)
    }

    fn visit_like(&self, field: M::Field, pattern: &str, match_case: bool) -> Result<String> {
        let term = self.mapper.term(field)?;
        let column = columns::sql_query_column(term);
        let literal = quoted(&like_pattern(pattern));
        if folds_case(term.kind, match_case) {
            Ok(format!("lower({column}) LIKE lower({literal})"))
        } else {
            Ok(format!("{column} LIKE {literal}"))
        }
    }

    fn visit_is_null(&self, field: M::Field) -> Result<String> {
        let term = self.mapper.term(field)?;
        let column = columns::sql_value_column(term);
        if columns::is_sql_array(term.kind) {
            return Ok(format!("({column} IS NULL OR size({column}) = 0)"));
        }
        Ok(format!("{column} IS NULL"))
    }

    fn visit_is_not_null(&self, field: M::Field) -> Result<String> {
        let term = self.mapper.term(field)?;
        let column = columns::sql_value_column(term);
        if columns::is_sql_array(term.kind) {
            return Ok(format!("({column} IS NOT NULL AND size({column}) > 0)"));
        }
        Ok(format!("{column} IS NOT NULL"))
    }

    fn visit_geo_distance(&self, distance: &GeoDistance) -> Result<String> {
        let (lat_column, lon_column) = self.geo_columns()?;
        Ok(format!(
            "(geoDistance({}, {}, {}, {lat_column}, {lon_column}) = TRUE)",
            quoted(&distance.distance.to_string()),
            distance.latitude,
            distance.longitude
        ))
    }

    fn visit_within(&self, wkt_text: &str) -> Result<String> {
        let (lat_column, lon_column) = self.geo_columns()?;
        let shape = geometry::parse_wkt(wkt_text)?;
        let bbox = geometry::bounding_box(&shape);
        let longitude_part = if bbox.crosses_antimeridian() {
            format!(
                "({lon_column} >= {} OR {lon_column} <= {})",
                bbox.west, bbox.east
            )
        } else {
            format!(
                "{lon_column} >= {} AND {lon_column} <= {}",
                bbox.west, bbox.east
            )
        };
        Ok(format!(
            "(({lat_column} >= {} AND {lat_column} <= {} AND {longitude_part}) \
             AND contains({}, {lat_column}, {lon_column}) = TRUE)",
            bbox.min_lat,
            bbox.max_lat,
            quoted(wkt_text)
        ))
    }

    fn geo_columns(&self) -> Result<(&'static str, &'static str)> {
        self.mapper.sql_geo_columns().ok_or_else(|| {
            Error::UnsupportedPredicate(
                "this domain has no coordinate columns in the SQL store".to_string(),
            )
        })
    }
}

/// True when a string column's comparison folds case on both sides.
///
/// Only free text folds; keywords are codes matched exactly.
const fn folds_case(kind: TermKind, match_case: bool) -> bool {
    matches!(kind, TermKind::Text) && !match_case
}

/// Single-quoted SQL string literal, quotes doubled.
fn quoted(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Renders a literal for a typed column, unquoted for numbers and booleans.
fn sql_literal(term: Term, raw: &str) -> Result<String> {
    let invalid = |kind: &str| {
        Error::InvalidValue(format!("'{raw}' is not a valid {kind} for {}", term.name))
    };
    match term.kind {
        TermKind::Integer => raw
            .trim()
            .parse::<i64>()
            .map(|n| n.to_string())
            .map_err(|_| invalid("integer")),
        TermKind::Double => raw
            .trim()
            .parse::<f64>()
            .map(|n| n.to_string())
            .map_err(|_| invalid("number")),
        TermKind::Boolean => raw
            .trim()
            .to_ascii_lowercase()
            .parse::<bool>()
            .map(|b| if b { "TRUE" } else { "FALSE" }.to_string())
            .map_err(|_| invalid("boolean")),
        _ => Ok(quoted(raw)),
    }
}

/// A date equality covers the whole period the literal names.
fn date_interval_condition(term: Term, value: &str) -> Result<String> {
    let column = columns::sql_query_column(term);
    let interval = datetime::parse_interval(value)?;
    let mut parts = Vec::new();
    if let Some(start) = interval.start {
        parts.push(format!("{column} >= {}", datetime::epoch_value(start, term)));
    }
    if let Some(end) = interval.end {
        parts.push(format!("{column} < {}", datetime::epoch_value(end, term)));
    }
    if parts.len() == 1 {
        return Ok(parts.remove(0));
    }
    Ok(join_parenthesized(&parts, " AND "))
}

/// Maps logical wildcards to SQL LIKE syntax, escaping SQL's own.
fn like_pattern(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        match c {
            '*' => out.push('%'),
            '?' => out.push('_'),
            '%' => out.push_str("\\%"),
            '_' => out.push_str("\\_"),
            '\\' => out.push_str("\\\\"),
            other => out.push(other),
        }
    }
    out
}

fn join_parenthesized(parts: &[String], separator: &str) -> String {
    let mut out = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        let _ = write!(out, "({part})");
    }
    out
}
