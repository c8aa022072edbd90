use super::*;

#[test]
fn method_procedure_names() {
    assert_eq!(Method::Check.procedure(), "check");
    assert_eq!(Method::ListRules.to_string(), "list-rules");
    assert_eq!(
        "list-categories".parse::<Method>().unwrap(),
        Method::ListCategories
    );
}

#[test]
fn unknown_procedure_is_unimplemented() {
    let err = "lint".parse::<Method>().unwrap_err();
    assert!(matches!(err, CheckError::UnknownMethod(ref name) if name == "lint"));
    assert_eq!(err.code(), ErrorCode::Unimplemented);
}

#[test]
fn list_request_defaults_when_fields_missing() {
    let request: ListRulesRequest = decode(b"{}").unwrap();
    assert_eq!(request.page_size, 0);
    assert!(request.page_token.is_empty());
}

#[test]
fn rule_type_is_serialized_under_type_key() {
    let rule = WireRule {
        id: "FIELD_NAME".to_string(),
        category_ids: vec!["STYLE".to_string()],
        default: true,
        purpose: "Checks field names.".to_string(),
        rule_type: RuleType::Lint,
        deprecated: false,
        replacement_ids: Vec::new(),
    };
    let json = String::from_utf8(encode(&rule).unwrap()).unwrap();
    assert!(json.contains(r#""type":"lint""#));
}

#[test]
fn annotation_without_locations_omits_them() {
    let annotation = WireAnnotation {
        rule_id: "SYNTAX_UNSPECIFIED".to_string(),
        message: "missing syntax".to_string(),
        location: None,
        against_location: None,
    };
    let json = String::from_utf8(encode(&annotation).unwrap()).unwrap();
    assert!(!json.contains("location"));
}

#[test]
fn wire_error_round_trips_code() {
    let err = CheckError::InvalidArgument("unknown page token \"NOPE_NOPE\"".to_string());
    let wire = WireError::from(&err);
    assert_eq!(wire.code, ErrorCode::InvalidArgument);
    let remote = wire.into_error();
    assert_eq!(remote.code(), ErrorCode::InvalidArgument);
    assert!(remote.to_string().contains("unknown page token"));
}

#[test]
fn decode_rejects_garbage() {
    let err = decode::<CheckRequest>(b"not json").unwrap_err();
    assert!(matches!(err, CheckError::Json(_)));
}
