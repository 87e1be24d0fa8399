use super::*;
use chrono::TimeZone;

#[test]
fn zero_conditions_compile_to_no_filter() {
    let compiled = compile(&[]).unwrap();
    assert!(compiled.is_none());
}

#[test]
fn one_condition_compiles_bare() {
    let expr = FilterExpression::Equals(FilterField::Source, "Example Wire".to_string());
    let compiled = compile(&[expr]).unwrap().expect("filter present");

    assert_eq!(compiled.must.len(), 1);
    assert!(compiled.should.is_empty());
    assert!(compiled.must_not.is_empty());
}

#[test]
fn two_conditions_compile_to_a_conjunction_of_both() {
    let exprs = [
        FilterExpression::Equals(FilterField::Category, "economy".to_string()),
        FilterExpression::min_credibility(0.6),
    ];
    let compiled = compile(&exprs).unwrap().expect("filter present");

    assert_eq!(compiled.must.len(), 2);
}

#[test]
fn nested_and_flattens() {
    let exprs = [FilterExpression::And(vec![
        FilterExpression::Equals(FilterField::Source, "A".to_string()),
        FilterExpression::And(vec![FilterExpression::min_credibility(0.7)]),
    ])];
    let compiled = compile(&exprs).unwrap().expect("filter present");

    assert_eq!(compiled.must.len(), 2);
}

#[test]
fn published_range_emits_one_clause_per_bound() {
    let from = chrono::Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let to = chrono::Utc.with_ymd_and_hms(2025, 6, 30, 0, 0, 0).unwrap();

    let both = compile(&[FilterExpression::published_between(Some(from), Some(to))])
        .unwrap()
        .expect("filter present");
    assert_eq!(both.must.len(), 2);

    let lower_only = compile(&[FilterExpression::published_between(Some(from), None)])
        .unwrap()
        .expect("filter present");
    assert_eq!(lower_only.must.len(), 1);
}

#[test]
fn credibility_accepts_only_a_floor() {
    let compiled = compile(&[FilterExpression::min_credibility(0.6)])
        .unwrap()
        .expect("filter present");
    assert_eq!(compiled.must.len(), 1);

    let ceiling = FilterExpression::Range(
        FilterField::CredibilityScore,
        RangeBounds {
            gte: None,
            lte: Some(0.9),
        },
    );
    assert_eq!(
        compile(&[ceiling]).unwrap_err(),
        FilterError::UnsupportedBound {
            field: FIELD_CREDIBILITY,
            bound: "lte",
        }
    );
}

#[test]
fn unsupported_pairs_fail_at_compile_time() {
    let equals_on_score =
        FilterExpression::Equals(FilterField::CredibilityScore, "0.9".to_string());
    assert!(matches!(
        compile(&[equals_on_score]),
        Err(FilterError::UnsupportedFilter {
            field: FIELD_CREDIBILITY,
            operator: "equals",
        })
    ));

    let range_on_source = FilterExpression::Range(
        FilterField::Source,
        RangeBounds {
            gte: Some(1.0),
            lte: None,
        },
    );
    assert!(matches!(
        compile(&[range_on_source]),
        Err(FilterError::UnsupportedFilter {
            field: FIELD_SOURCE,
            operator: "range",
        })
    ));

    let in_on_published = FilterExpression::In(
        FilterField::PublishedAt,
        ["2025".to_string()].into_iter().collect(),
    );
    assert!(matches!(
        compile(&[in_on_published]),
        Err(FilterError::UnsupportedFilter { .. })
    ));
}

#[test]
fn degenerate_conditions_are_rejected() {
    let empty_set = FilterExpression::source_in(Vec::<String>::new());
    assert_eq!(
        compile(&[empty_set]).unwrap_err(),
        FilterError::EmptySet {
            field: FIELD_SOURCE
        }
    );

    let empty_range = FilterExpression::published_between(None, None);
    assert_eq!(
        compile(&[empty_range]).unwrap_err(),
        FilterError::EmptyRange {
            field: FIELD_PUBLISHED_AT
        }
    );
}

#[test]
fn validate_matches_compile() {
    assert!(validate(&[]).is_ok());
    assert!(validate(&[FilterExpression::min_credibility(0.5)]).is_ok());
    assert!(validate(&[FilterExpression::source_in(Vec::<String>::new())]).is_err());
}
