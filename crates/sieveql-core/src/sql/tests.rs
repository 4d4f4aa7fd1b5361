//! Tests for the SQL visitor

use proptest::prelude::*;

use crate::error::Error;
use crate::mapper::event::{EventField, EventMapper};
use crate::mapper::occurrence::{OccurrenceField, OccurrenceMapper};
use crate::predicate::{Distance, DistanceUnit, GeoDistance, Predicate, RangeValue};
use crate::sql::SqlQueryVisitor;

fn compile(predicate: &Predicate<OccurrenceField>) -> String {
    let mapper = OccurrenceMapper::new();
    SqlQueryVisitor::new(&mapper).build_query(predicate).unwrap()
}

#[test]
fn test_keyword_equality() {
    assert_eq!(
        compile(&Predicate::equals(OccurrenceField::Country, "US")),
        "country_code = 'US'"
    );
}

#[test]
fn test_conjunction_parenthesizes_children() {
    let sql = compile(&Predicate::conjunction(vec![
        Predicate::equals(OccurrenceField::Country, "US"),
        Predicate::greater_than_or_equals(OccurrenceField::Year, "2000"),
    ]));
    assert_eq!(sql, "(country_code = 'US') AND (year >= 2000)");
}

#[test]
fn test_not_is_null() {
    let sql = compile(&Predicate::not(Predicate::is_null(
        OccurrenceField::Elevation,
    )));
    assert_eq!(sql, "NOT (elevation IS NULL)");
}

#[test]
fn test_single_quotes_are_doubled() {
    let sql = compile(&Predicate::equals(OccurrenceField::Locality, "O'Brien's"));
    assert_eq!(sql, "lower(locality) = lower('O''Brien''s')");
}

#[test]
fn test_text_equality_folds_case_on_both_sides() {
    assert_eq!(
        compile(&Predicate::equals(OccurrenceField::StateProvince, "Jutland")),
        "lower(state_province) = lower('Jutland')"
    );
    assert_eq!(
        compile(&Predicate::equals_match_case(
            OccurrenceField::StateProvince,
            "Jutland",
            true,
        )),
        "state_province = 'Jutland'"
    );
}

#[test]
fn test_reserved_word_column_is_quoted() {
    let sql = compile(&Predicate::equals_match_case(
        OccurrenceField::MediaFormat,
        "image/jpeg",
        true,
    ));
    assert_eq!(sql, "\"format\" = 'image/jpeg'");
}

#[test]
fn test_reserved_word_quoted_in_every_clause() {
    let like = compile(&Predicate::like(OccurrenceField::MediaFormat, "image/*"));
    assert_eq!(like, "lower(\"format\") LIKE lower('image/%')");
    let null = compile(&Predicate::is_null(OccurrenceField::MediaFormat));
    assert_eq!(null, "\"format\" IS NULL");
}

#[test]
fn test_extension_term_targets_prefixed_column() {
    let sql = compile(&Predicate::equals_match_case(
        OccurrenceField::DnaSequenceId,
        "SEQ-42",
        true,
    ));
    assert_eq!(sql, "ext_dna_sequence_id = 'SEQ-42'");
}

#[test]
fn test_boolean_and_numeric_literals_are_unquoted() {
    assert_eq!(
        compile(&Predicate::equals(OccurrenceField::HasCoordinate, "true")),
        "has_coordinate = TRUE"
    );
    assert_eq!(
        compile(&Predicate::less_than(OccurrenceField::Elevation, "150.5")),
        "elevation < 150.5"
    );
}

#[test]
fn test_bad_integer_literal_is_invalid_value() {
    let mapper = OccurrenceMapper::new();
    let err = SqlQueryVisitor::new(&mapper)
        .build_query(&Predicate::equals(OccurrenceField::Year, "twenty"))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidValue(_)));
}

#[test]
fn test_in_over_keyword_column() {
    let sql = compile(&Predicate::is_in(
        OccurrenceField::Country,
        vec!["US".to_string(), "DK".to_string()],
    ));
    assert_eq!(sql, "country_code IN ('US', 'DK')");
}

#[test]
fn test_in_over_text_column_folds_case() {
    let sql = compile(&Predicate::is_in(
        OccurrenceField::Locality,
        vec!["Aarhus".to_string(), "Odense".to_string()],
    ));
    assert_eq!(sql, "lower(locality) IN (lower('Aarhus'), lower('Odense'))");
}

#[test]
fn test_disjunction_collapse_matches_in_codegen() {
    let disjunction = compile(&Predicate::disjunction(vec![
        Predicate::equals(OccurrenceField::Country, "US"),
        Predicate::equals(OccurrenceField::Country, "DK"),
    ]));
    let membership = compile(&Predicate::is_in(
        OccurrenceField::Country,
        vec!["US".to_string(), "DK".to_string()],
    ));
    assert_eq!(disjunction, membership);
}

#[test]
fn test_mixed_disjunction_stays_flat_or() {
    let sql = compile(&Predicate::disjunction(vec![
        Predicate::equals(OccurrenceField::Country, "US"),
        Predicate::is_null(OccurrenceField::Depth),
    ]));
    assert_eq!(sql, "(country_code = 'US') OR (depth IS NULL)");
}

#[test]
fn test_single_element_in_is_equivalent_to_equals() {
    let membership = compile(&Predicate::is_in(
        OccurrenceField::Country,
        vec!["US".to_string()],
    ));
    assert_eq!(membership, "country_code IN ('US')");
}

#[test]
fn test_array_containment() {
    let sql = compile(&Predicate::equals(OccurrenceField::MediaType, "StillImage"));
    assert_eq!(sql, "array_contains(media_type, 'StillImage', false)");
}

#[test]
fn test_array_in_becomes_containment_disjunction() {
    let sql = compile(&Predicate::is_in(
        OccurrenceField::MediaType,
        vec!["StillImage".to_string(), "Sound".to_string()],
    ));
    assert_eq!(
        sql,
        "(array_contains(media_type, 'StillImage', false)) OR \
         (array_contains(media_type, 'Sound', false))"
    );
}

#[test]
fn test_array_null_checks_consider_emptiness() {
    assert_eq!(
        compile(&Predicate::is_not_null(OccurrenceField::MediaType)),
        "(media_type IS NOT NULL AND size(media_type) > 0)"
    );
    assert_eq!(
        compile(&Predicate::is_null(OccurrenceField::MediaType)),
        "(media_type IS NULL OR size(media_type) = 0)"
    );
}

#[test]
fn test_vocabulary_matches_lineage_and_null_checks_concept() {
    assert_eq!(
        compile(&Predicate::equals(OccurrenceField::LifeStage, "Adult")),
        "array_contains(life_stage.lineage, 'Adult')"
    );
    assert_eq!(
        compile(&Predicate::is_null(OccurrenceField::LifeStage)),
        "life_stage.concept IS NULL"
    );
}

#[test]
fn test_date_equality_expands_to_epoch_interval() {
    let sql = compile(&Predicate::equals(OccurrenceField::EventDate, "2000"));
    assert_eq!(sql, "(event_date >= 946684800) AND (event_date < 978307200)");
}

#[test]
fn test_date_interval_with_open_end() {
    let sql = compile(&Predicate::equals(OccurrenceField::EventDate, "2000,*"));
    assert_eq!(sql, "event_date >= 946684800");
}

#[test]
fn test_millisecond_column_uses_millisecond_epochs() {
    let sql = compile(&Predicate::equals(
        OccurrenceField::LastInterpreted,
        "2000-01-01",
    ));
    assert_eq!(
        sql,
        "(last_interpreted >= 946684800000) AND (last_interpreted < 946771200000)"
    );
}

#[test]
fn test_date_in_is_a_disjunction_of_epoch_intervals() {
    let sql = compile(&Predicate::is_in(
        OccurrenceField::EventDate,
        vec!["1999".to_string(), "2000".to_string()],
    ));
    assert_eq!(
        sql,
        "((event_date >= 915148800) AND (event_date < 946684800)) OR \
         ((event_date >= 946684800) AND (event_date < 978307200))"
    );
}

#[test]
fn test_date_comparison_endpoints() {
    assert_eq!(
        compile(&Predicate::greater_than_or_equals(
            OccurrenceField::EventDate,
            "2000",
        )),
        "event_date >= 946684800"
    );
    assert_eq!(
        compile(&Predicate::greater_than(OccurrenceField::EventDate, "2000")),
        "event_date >= 978307200"
    );
    assert_eq!(
        compile(&Predicate::less_than_or_equals(
            OccurrenceField::EventDate,
            "2000",
        )),
        "event_date < 978307200"
    );
    assert_eq!(
        compile(&Predicate::less_than(OccurrenceField::EventDate, "2000")),
        "event_date < 946684800"
    );
}

#[test]
fn test_explicit_range() {
    let bounds = RangeValue::new(Some("100"), None, None, Some("200")).unwrap();
    let sql = compile(&Predicate::range(OccurrenceField::Elevation, bounds));
    assert_eq!(sql, "(elevation >= 100) AND (elevation < 200)");
}

#[test]
fn test_null_policy_widens_centroid_distance_filter() {
    let sql = compile(&Predicate::greater_than_or_equals(
        OccurrenceField::DistanceFromCentroidInMeters,
        "100",
    ));
    assert_eq!(
        sql,
        "(distance_from_centroid_in_meters >= 100 \
         OR distance_from_centroid_in_meters IS NULL)"
    );
}

#[test]
fn test_null_policy_widens_centroid_distance_range() {
    let bounds = RangeValue::new(Some("100"), None, None, None).unwrap();
    let sql = compile(&Predicate::range(
        OccurrenceField::DistanceFromCentroidInMeters,
        bounds,
    ));
    assert_eq!(
        sql,
        "(distance_from_centroid_in_meters >= 100 \
         OR distance_from_centroid_in_meters IS NULL)"
    );
}

#[test]
fn test_upper_bounded_centroid_distance_range_has_no_null_widening() {
    let bounds = RangeValue::new(None, None, Some("100"), None).unwrap();
    let sql = compile(&Predicate::range(
        OccurrenceField::DistanceFromCentroidInMeters,
        bounds,
    ));
    assert_eq!(sql, "distance_from_centroid_in_meters <= 100");
}

#[test]
fn test_plain_greater_than_has_no_null_widening() {
    let sql = compile(&Predicate::greater_than(
        OccurrenceField::DistanceFromCentroidInMeters,
        "100",
    ));
    assert_eq!(sql, "distance_from_centroid_in_meters > 100");
}

#[test]
fn test_like_maps_logical_wildcards() {
    let sql = compile(&Predicate::like(OccurrenceField::Locality, "Copenh*gen?"));
    assert_eq!(sql, "lower(locality) LIKE lower('Copenh%gen_')");
}

#[test]
fn test_like_escapes_sql_wildcards() {
    let sql = compile(&Predicate::like(OccurrenceField::Locality, "100%_*"));
    assert_eq!(sql, "lower(locality) LIKE lower('100\\%\\_%')");
}

#[test]
fn test_taxon_key_expands_over_the_classification() {
    let sql = compile(&Predicate::equals(OccurrenceField::TaxonKey, "212"));
    assert_eq!(
        sql,
        "(kingdom_key = 212) OR (phylum_key = 212) OR (class_key = 212) OR \
         (order_key = 212) OR (family_key = 212) OR (genus_key = 212) OR \
         (species_key = 212) OR (taxon_key = 212)"
    );
}

#[test]
fn test_gadm_gid_expands_over_administrative_levels() {
    let sql = compile(&Predicate::equals(OccurrenceField::GadmGid, "USA.5_1"));
    assert_eq!(
        sql,
        "(level0_gid = 'USA.5_1') OR (level1_gid = 'USA.5_1') OR \
         (level2_gid = 'USA.5_1') OR (level3_gid = 'USA.5_1')"
    );
}

#[test]
fn test_expansion_in_becomes_per_column_membership() {
    let sql = compile(&Predicate::is_in(
        OccurrenceField::GadmGid,
        vec!["USA".to_string(), "DNK".to_string()],
    ));
    assert_eq!(
        sql,
        "(level0_gid IN ('USA', 'DNK')) OR (level1_gid IN ('USA', 'DNK')) OR \
         (level2_gid IN ('USA', 'DNK')) OR (level3_gid IN ('USA', 'DNK'))"
    );
}

#[test]
fn test_denormalized_field_also_matches_secondary_array() {
    let mapper = EventMapper::new();
    let sql = SqlQueryVisitor::new(&mapper)
        .build_query(&Predicate::equals_match_case(
            EventField::LocationId,
            "L-17",
            true,
        ))
        .unwrap();
    assert_eq!(
        sql,
        "(location_id = 'L-17' OR array_contains(location_ids, 'L-17', true))"
    );
}

#[test]
fn test_geo_distance_udf_form() {
    let radius = Distance::new(5.0, DistanceUnit::Kilometers).unwrap();
    let anchor = GeoDistance::new(55.68, 12.57, radius).unwrap();
    let sql = compile(&Predicate::geo_distance(anchor));
    assert_eq!(
        sql,
        "(geoDistance('5km', 55.68, 12.57, decimal_latitude, decimal_longitude) = TRUE)"
    );
}

#[test]
fn test_within_prefilters_with_bounding_box() {
    let wkt = "POLYGON ((-10 -10, 10 -10, 10 10, -10 10, -10 -10))";
    let sql = compile(&Predicate::within(wkt));
    assert_eq!(
        sql,
        "((decimal_latitude >= -10 AND decimal_latitude <= 10 AND \
         decimal_longitude >= -10 AND decimal_longitude <= 10) AND \
         contains('POLYGON ((-10 -10, 10 -10, 10 10, -10 10, -10 -10))', \
         decimal_latitude, decimal_longitude) = TRUE)"
    );
}

#[test]
fn test_within_across_antimeridian_splits_longitude_test() {
    let wkt = "POLYGON ((170 -10, -170 -10, -170 10, 170 10, 170 -10))";
    let sql = compile(&Predicate::within(wkt));
    assert!(sql.contains("(decimal_longitude >= 170 OR decimal_longitude <= -170)"));
    assert!(sql.contains("decimal_latitude >= -10 AND decimal_latitude <= 10"));
}

#[test]
fn test_geo_predicates_unsupported_without_coordinate_columns() {
    let mapper = EventMapper::new();
    let err = SqlQueryVisitor::new(&mapper)
        .build_query(&Predicate::<EventField>::within(
            "POLYGON ((0 0, 1 0, 1 1, 0 1, 0 0))",
        ))
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedPredicate(_)));
}

#[test]
fn test_translation_is_idempotent() {
    let mapper = OccurrenceMapper::new();
    let visitor = SqlQueryVisitor::new(&mapper);
    let predicate = Predicate::conjunction(vec![
        Predicate::equals(OccurrenceField::TaxonKey, "212"),
        Predicate::like(OccurrenceField::Locality, "Copenh*"),
        Predicate::within("POLYGON ((170 -10, -170 -10, -170 10, 170 10, 170 -10))"),
    ]);
    assert_eq!(
        visitor.build_query(&predicate).unwrap(),
        visitor.build_query(&predicate).unwrap()
    );
}

proptest! {
    #[test]
    fn prop_string_literals_never_leave_a_quote_unescaped(value in ".*") {
        let sql = compile(&Predicate::equals_match_case(
            OccurrenceField::Country,
            value.clone(),
            true,
        ));
        let quote_count = sql.matches('\'').count();
        prop_assert_eq!(quote_count % 2, 0);
        prop_assert_eq!(sql, format!("country_code = '{}'", value.replace('\'', "''")));
    }

    #[test]
    fn prop_compilation_is_deterministic(values in proptest::collection::vec("[A-Z]{2}", 1..6)) {
        let predicate = Predicate::is_in(OccurrenceField::Country, values);
        let first = compile(&predicate);
        let second = compile(&predicate);
        prop_assert_eq!(first, second);
    }
}
