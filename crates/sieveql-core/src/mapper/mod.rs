//! The capability contract between the filter model and the two backends.
//!
//! A [`FieldMapper`] answers every backend-specific question about a logical
//! field: which physical column stores it, which search-engine field to hit
//! for exact and full-text matches, whether it is an array or a vocabulary,
//! whether absent values satisfy relational predicates. Each translation
//! call receives its mapper explicitly; there is no registry.

pub mod event;
pub mod occurrence;

use crate::columns::{self, Term};
use crate::error::Result;
use crate::predicate::{Predicate, RangeValue};

/// Backend capabilities of one search domain.
///
/// Implementations are immutable tables; all methods are pure and the
/// mapper can be shared freely across threads.
pub trait FieldMapper {
    /// The domain's logical field enum.
    type Field: Copy + Eq + std::fmt::Debug;

    /// Physical storage descriptor of a field.
    fn term(&self, field: Self::Field) -> Result<Term>;

    /// Search-engine field for exact (term/terms) matches.
    fn exact_match_field_name(&self, field: Self::Field) -> Result<&'static str>;

    /// Search-engine field for analyzed full-text matches.
    fn verbatim_field_name(&self, field: Self::Field) -> Result<&'static str>;

    /// Search-engine geo-point field used by distance queries.
    fn geo_distance_field(&self) -> &'static str;

    /// Search-engine geo-shape field used by within queries.
    fn geo_shape_field(&self) -> &'static str;

    /// SQL latitude/longitude columns, if the domain stores coordinates.
    ///
    /// `None` makes every geospatial predicate unsupported on the SQL
    /// backend.
    fn sql_geo_columns(&self) -> Option<(&'static str, &'static str)>;

    /// True if the field is stored as a SQL array.
    fn is_array(&self, field: Self::Field) -> Result<bool> {
        Ok(columns::is_sql_array(self.term(field)?.kind))
    }

    /// True if the field is backed by a controlled vocabulary.
    fn is_vocabulary(&self, field: Self::Field) -> Result<bool> {
        Ok(columns::is_vocabulary(self.term(field)?.kind))
    }

    /// Secondary array column a denormalized field also matches against.
    ///
    /// A denormalized equality test becomes
    /// `(col = v) OR array_contains(denorm_col, v)`.
    fn denorm_column(&self, field: Self::Field) -> Option<Term> {
        let _ = field;
        None
    }

    /// True if the field carries a denormalized secondary column.
    fn is_denormed_term(&self, field: Self::Field) -> bool {
        self.denorm_column(field).is_some()
    }

    /// Physical columns a hierarchical field expands into.
    ///
    /// An equality test on such a field becomes a disjunction over every
    /// listed column (e.g. a taxon key matches at any rank).
    fn expansion_terms(&self, field: Self::Field) -> Option<&'static [Term]> {
        let _ = field;
        None
    }

    /// Whether absent values satisfy this relational predicate.
    ///
    /// Consulted identically by both backends so their results agree.
    fn include_null_in_predicate(&self, predicate: &Predicate<Self::Field>) -> bool {
        let _ = predicate;
        false
    }

    /// Whether absent values satisfy a range predicate on this field.
    fn include_null_in_range(&self, field: Self::Field, range: &RangeValue) -> bool {
        let _ = (field, range);
        false
    }

    /// Deepest administrative level of the hierarchical geography field.
    fn default_gadm_level(&self) -> u8 {
        3
    }
}
