//! Field mapper for the occurrence search domain.
//!
//! The richest domain: numeric and date interpretation, array and
//! vocabulary columns, hierarchical taxonomy and geography expansion, geo
//! columns on both backends, and a null-inclusion rule for the
//! distance-from-centroid filter.

use serde::{Deserialize, Serialize};

use crate::columns::{Term, TermKind};
use crate::error::{Error, Result};
use crate::mapper::FieldMapper;
use crate::predicate::{Predicate, RangeValue};

/// Logical search fields of the occurrence domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OccurrenceField {
    /// Collecting year.
    Year,
    /// Collecting month.
    Month,
    /// Collecting day of month.
    Day,
    /// Elevation above sea level, metres.
    Elevation,
    /// Depth below surface, metres.
    Depth,
    /// Distance from the dataset centroid, metres.
    DistanceFromCentroidInMeters,
    /// Record carries interpreted coordinates.
    HasCoordinate,
    /// ISO country code.
    Country,
    /// Collection catalog number.
    CatalogNumber,
    /// Free-text locality description.
    Locality,
    /// State or province name.
    StateProvince,
    /// Name of the recorder.
    RecordedBy,
    /// Date of the collecting event.
    EventDate,
    /// Timestamp of the last interpretation run.
    LastInterpreted,
    /// Media types attached to the record.
    MediaType,
    /// Interpretation issue flags.
    Issue,
    /// Life stage, controlled vocabulary.
    LifeStage,
    /// Media format; its bare column name is a reserved SQL word.
    MediaFormat,
    /// Taxon key, matching at any rank of the classification.
    TaxonKey,
    /// GADM geography identifier, matching at any administrative level.
    GadmGid,
    /// DNA sequence identifier, stored in an extension outside the core
    /// row and absent from the search index.
    DnaSequenceId,
}

static TAXONOMY_TERMS: [Term; 8] = [
    Term::new("kingdom_key", TermKind::Integer),
    Term::new("phylum_key", TermKind::Integer),
    Term::new("class_key", TermKind::Integer),
    Term::new("order_key", TermKind::Integer),
    Term::new("family_key", TermKind::Integer),
    Term::new("genus_key", TermKind::Integer),
    Term::new("species_key", TermKind::Integer),
    Term::new("taxon_key", TermKind::Integer),
];

static GADM_TERMS: [Term; 4] = [
    Term::new("level0_gid", TermKind::Keyword),
    Term::new("level1_gid", TermKind::Keyword),
    Term::new("level2_gid", TermKind::Keyword),
    Term::new("level3_gid", TermKind::Keyword),
];

/// The occurrence domain's [`FieldMapper`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OccurrenceMapper;

impl OccurrenceMapper {
    /// Creates the mapper.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl FieldMapper for OccurrenceMapper {
    type Field = OccurrenceField;

    fn term(&self, field: OccurrenceField) -> Result<Term> {
        use OccurrenceField as F;
        let term = match field {
            F::Year => Term::new("year", TermKind::Integer),
            F::Month => Term::new("month", TermKind::Integer),
            F::Day => Term::new("day", TermKind::Integer),
            F::Elevation => Term::new("elevation", TermKind::Double),
            F::Depth => Term::new("depth", TermKind::Double),
            F::DistanceFromCentroidInMeters => {
                Term::new("distance_from_centroid_in_meters", TermKind::Double)
            }
            F::HasCoordinate => Term::new("has_coordinate", TermKind::Boolean),
            F::Country => Term::new("country_code", TermKind::Keyword),
            F::CatalogNumber => Term::new("catalog_number", TermKind::Keyword),
            F::Locality => Term::new("locality", TermKind::Text),
            F::StateProvince => Term::new("state_province", TermKind::Text),
            F::RecordedBy => Term::new("recorded_by", TermKind::Text),
            F::EventDate => Term::new("event_date", TermKind::LocalDateSeconds),
            F::LastInterpreted => Term::new("last_interpreted", TermKind::UtcDateMillis),
            F::MediaType => Term::new("media_type", TermKind::ArrayText),
            F::Issue => Term::new("issues", TermKind::ArrayText),
            F::LifeStage => Term::new("life_stage", TermKind::Vocabulary),
            F::MediaFormat => Term::new("format", TermKind::Text),
            F::TaxonKey => Term::new("taxon_key", TermKind::Integer),
            F::GadmGid => Term::new("gadm_gid", TermKind::Keyword),
            F::DnaSequenceId => Term::new("dna_sequence_id", TermKind::Extension),
        };
        Ok(term)
    }

    fn exact_match_field_name(&self, field: OccurrenceField) -> Result<&'static str> {
        use OccurrenceField as F;
        let name = match field {
            F::Year => "year",
            F::Month => "month",
            F::Day => "day",
            F::Elevation => "elevation",
            F::Depth => "depth",
            F::DistanceFromCentroidInMeters => "distance_from_centroid_in_meters",
            F::HasCoordinate => "has_coordinate",
            F::Country => "country_code.keyword",
            F::CatalogNumber => "catalog_number.keyword",
            F::Locality => "locality.keyword",
            F::StateProvince => "state_province.keyword",
            F::RecordedBy => "recorded_by.keyword",
            F::EventDate => "event_date",
            F::LastInterpreted => "last_interpreted",
            F::MediaType => "media_type",
            F::Issue => "issues",
            F::LifeStage => "life_stage.concept",
            F::MediaFormat => "media_format.keyword",
            F::TaxonKey => "taxon_key",
            F::GadmGid => "gadm.gid",
            F::DnaSequenceId => {
                return Err(Error::Mapping(format!("{field:?}")))
            }
        };
        Ok(name)
    }

    fn verbatim_field_name(&self, field: OccurrenceField) -> Result<&'static str> {
        use OccurrenceField as F;
        let name = match field {
            F::Country => "country_code",
            F::CatalogNumber => "catalog_number",
            F::Locality => "locality",
            F::StateProvince => "state_province",
            F::RecordedBy => "recorded_by",
            F::MediaFormat => "media_format",
            F::LifeStage => "life_stage.concept",
            F::DnaSequenceId => {
                return Err(Error::Mapping(format!("{field:?}")))
            }
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
        Some(("decimal_latitude", "decimal_longitude"))
    }

    fn expansion_terms(&self, field: OccurrenceField) -> Option<&'static [Term]> {
        match field {
            OccurrenceField::TaxonKey => Some(&TAXONOMY_TERMS),
            OccurrenceField::GadmGid => {
                let levels = usize::from(self.default_gadm_level());
                Some(&GADM_TERMS[..=levels.min(GADM_TERMS.len() - 1)])
            }
            _ => None,
        }
    }

    fn include_null_in_predicate(&self, predicate: &Predicate<OccurrenceField>) -> bool {
        // Records without coordinates have no centroid distance, yet a
        // minimum-distance filter is meant to keep them.
        predicate.simple_field() == Some(OccurrenceField::DistanceFromCentroidInMeters)
            && matches!(predicate, Predicate::GreaterThanOrEquals { .. })
    }

    fn include_null_in_range(&self, field: OccurrenceField, range: &RangeValue) -> bool {
        field == OccurrenceField::DistanceFromCentroidInMeters && range.gte.is_some()
    }
}
