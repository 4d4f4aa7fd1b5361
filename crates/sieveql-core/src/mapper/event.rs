//! Field mapper for the sampling-event search domain.
//!
//! A smaller domain than occurrences: no interpreted coordinate columns in
//! the SQL store, so geospatial predicates only compile for the search
//! engine. Location identifiers are denormalized down the event hierarchy.

use serde::{Deserialize, Serialize};

use crate::columns::{Term, TermKind};
use crate::error::Result;
use crate::mapper::FieldMapper;

/// Logical search fields of the event domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventField {
    /// Event identifier.
    EventId,
    /// Identifier of the parent event.
    ParentEventId,
    /// Location identifier, denormalized from ancestor events.
    LocationId,
    /// Sampling protocols used.
    SamplingProtocol,
    /// Date of the event.
    EventDate,
    /// Event year.
    Year,
    /// Event month.
    Month,
    /// ISO country code.
    Country,
    /// State or province name.
    StateProvince,
}

/// The event domain's [`FieldMapper`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EventMapper;

impl EventMapper {
    /// Creates the mapper.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl FieldMapper for EventMapper {
    type Field = EventField;

    fn term(&self, field: EventField) -> Result<Term> {
        use EventField as F;
        let term = match field {
            F::EventId => Term::new("event_id", TermKind::Keyword),
            F::ParentEventId => Term::new("parent_event_id", TermKind::Keyword),
            F::LocationId => Term::new("location_id", TermKind::Keyword),
            F::SamplingProtocol => Term::new("sampling_protocol", TermKind::ArrayText),
            F::EventDate => Term::new("event_date", TermKind::LocalDateSeconds),
            F::Year => Term::new("year", TermKind::Integer),
            F::Month => Term::new("month", TermKind::Integer),
            F::Country => Term::new("country_code", TermKind::Keyword),
            F::StateProvince => Term::new("state_province", TermKind::Text),
        };
        Ok(term)
    }

    fn exact_match_field_name(&self, field: EventField) -> Result<&'static str> {
        use EventField as F;
        let name = match field {
            F::EventId => "event_id.keyword",
            F::ParentEventId => "parent_event_id.keyword",
            F::LocationId => "location_id.keyword",
            F::SamplingProtocol => "sampling_protocol",
            F::EventDate => "event_date",
            F::Year => "year",
            F::Month => "month",
            F::Country => "country_code.keyword",
            F::StateProvince => "state_province.keyword",
        };
        Ok(name)
    }

    fn verbatim_field_name(&self, field: EventField) -> Result<&'static str> {
        use EventField as F;
        let name = match field {
            F::EventId => "event_id",
            F::ParentEventId => "parent_event_id",
            F::LocationId => "location_id",
            F::Country => "country_code",
            F::StateProvince => "state_province",
            other => return self.exact_match_field_name(other),
        };
        Ok(name)
    }

    fn geo_distance_field(&self) -> &'static str {
        "coordinate_point"
    }

    fn geo_shape_field(&self) -> &'static str {
        "coordinate_shape"
    }

    fn sql_geo_columns(&self) -> Option<(&'static str, &'static str)> {
        None
    }

    fn denorm_column(&self, field: EventField) -> Option<Term> {
        match field {
            EventField::LocationId => Some(Term::new("location_ids", TermKind::ArrayText)),
            _ => None,
        }
    }
}
