use super::*;

#[test]
fn empty_input_is_blank_and_absent() {
    let input = NumericInput::empty();
    assert!(input.is_blank());
    assert!(!input.is_present());
    assert_eq!(input.value(), None);
}

#[test]
fn whitespace_counts_as_blank() {
    let input = NumericInput::new("   ");
    assert!(input.is_blank());
    assert!(!input.is_present());
}

#[test]
fn numeric_text_is_present() {
    let input = NumericInput::new(" 12.5 ");
    assert_eq!(input.value(), Some(12.5));
    assert!(input.is_present());
}

#[test]
fn non_numeric_text_is_not_present() {
    let input = NumericInput::new("ten");
    assert!(!input.is_blank());
    assert!(!input.is_present());
}

#[test]
fn non_finite_text_is_not_present() {
    assert!(!NumericInput::new("inf").is_present());
    assert!(!NumericInput::new("NaN").is_present());
}

#[test]
fn deserializes_from_number_string_and_null() {
    let n: NumericInput = serde_json::from_str("7").unwrap();
    assert_eq!(n.value(), Some(7.0));

    let s: NumericInput = serde_json::from_str(r#""30""#).unwrap();
    assert_eq!(s.raw(), Some("30"));

    let null: NumericInput = serde_json::from_str("null").unwrap();
    assert_eq!(null, NumericInput::empty());
}

#[test]
fn serializes_numbers_as_json_numbers() {
    assert_eq!(serde_json::to_string(&NumericInput::new("42")).unwrap(), "42");
    assert_eq!(serde_json::to_string(&NumericInput::new("2.5")).unwrap(), "2.5");
}

#[test]
fn serializes_unparsable_text_verbatim() {
    assert_eq!(serde_json::to_string(&NumericInput::new("abc")).unwrap(), r#""abc""#);
    assert_eq!(serde_json::to_string(&NumericInput::empty()).unwrap(), "null");
}

#[test]
fn display_shows_raw_text() {
    assert_eq!(NumericInput::from(5_u64).to_string(), "5");
    assert_eq!(NumericInput::empty().to_string(), "");
}
