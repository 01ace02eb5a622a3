use super::*;

#[test]
fn percent_limit_rounds_down() {
    assert_eq!(Subset::percent(10_u64).limit(95).unwrap(), 9);
    assert_eq!(Subset::percent("12.5").limit(8).unwrap(), 1);
}

#[test]
fn percent_bounds_are_inclusive() {
    assert_eq!(Subset::percent(0_u64).limit(500).unwrap(), 0);
    assert_eq!(Subset::percent(100_u64).limit(500).unwrap(), 500);
}

#[test]
fn percent_above_hundred_is_rejected() {
    let err = Subset::percent(150_u64).limit(10).unwrap_err();
    assert!(matches!(err, SegmentError::PercentOutOfRange(v) if (v - 150.0).abs() < f64::EPSILON));
}

#[test]
fn negative_percent_is_rejected() {
    assert!(matches!(Subset::percent("-1").limit(10), Err(SegmentError::PercentOutOfRange(_))));
}

#[test]
fn count_limit_caps_at_total() {
    assert_eq!(Subset::count(50_u64).limit(20).unwrap(), 20);
    assert_eq!(Subset::count(5_u64).limit(20).unwrap(), 5);
}

#[test]
fn fractional_or_negative_count_is_rejected() {
    assert!(matches!(Subset::count("2.5").limit(10), Err(SegmentError::InvalidCount(_))));
    assert!(matches!(Subset::count("-3").limit(10), Err(SegmentError::InvalidCount(_))));
}

#[test]
fn missing_value_is_rejected() {
    assert!(matches!(Subset::count("").limit(10), Err(SegmentError::MissingSubsetValue)));
}

#[test]
fn subset_serializes_kind_as_type() {
    let subset = Subset::percent(20_u64).sorted_by(SubsetSort::RecentlyEngaged);
    let json = serde_json::to_value(&subset).unwrap();
    assert_eq!(json, serde_json::json!({"type": "percent", "value": 20, "sort": "recently_engaged"}));
}

#[test]
fn subset_sort_defaults_to_random() {
    let subset: Subset = serde_json::from_str(r#"{"type":"count","value":"10"}"#).unwrap();
    assert_eq!(subset.sort, SubsetSort::Random);
    assert_eq!(subset.value.value(), Some(10.0));
}

#[test]
fn display_reads_naturally() {
    assert_eq!(Subset::percent(20_u64).to_string(), "20%");
    assert_eq!(Subset::count(100_u64).to_string(), "first 100");
}

#[test]
fn check_returns_value_within_range() {
    assert!((Subset::percent("42.5").check().unwrap() - 42.5).abs() < f64::EPSILON);
    assert!(matches!(Subset::percent("150").check(), Err(SegmentError::PercentOutOfRange(_))));
    assert!(matches!(Subset::count("-3.5").check(), Err(SegmentError::InvalidCount(_))));
}
