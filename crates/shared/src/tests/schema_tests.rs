use super::*;
use serde_json::json;

const SESSION: &str = "1b4e28ba-2fa1-11d2-883f-0016d3cca427";

fn valid_input() -> Value {
    json!({
        "webinarId": "w1",
        "sessionId": SESSION,
        "firstName": "Ann",
        "lastName": "Lee",
        "email": "ann@x.com"
    })
}

#[test]
fn accepts_complete_registration_without_phone() {
    let request = validate_registration(&valid_input()).expect("valid");
    assert_eq!(request.webinar_id, WebinarId("w1".into()));
    assert_eq!(request.session_id.to_string(), SESSION);
    assert_eq!(request.full_name(), "Ann Lee");
    assert_eq!(request.phone, None);
}

#[test]
fn omitted_and_null_phone_are_identical() {
    let omitted = validate_registration(&valid_input()).expect("omitted");
    let mut input = valid_input();
    input["phone"] = Value::Null;
    let null = validate_registration(&input).expect("null");
    assert_eq!(omitted, null);
}

#[test]
fn phone_is_not_further_validated() {
    let mut input = valid_input();
    input["phone"] = json!("call me maybe");
    let request = validate_registration(&input).expect("valid");
    assert_eq!(request.phone.as_deref(), Some("call me maybe"));
}

#[test]
fn missing_or_empty_names_are_required() {
    let mut input = valid_input();
    input.as_object_mut().expect("object").remove("firstName");
    input["lastName"] = json!("");

    let errors = validate_registration(&input).expect_err("names missing");
    assert_eq!(errors.kind_of("firstName"), Some(IssueKind::Required));
    assert_eq!(errors.kind_of("lastName"), Some(IssueKind::Required));
    assert_eq!(errors.get("lastName").expect("issue").message, "Last name is required");
}

#[test]
fn email_without_at_structure_is_invalid_format() {
    for bad in ["ann.x.com", "ann@", "@x.com", "ann@x", ".ann@x.com", "an..n@x.com", "ann@x.c"] {
        let mut input = valid_input();
        input["email"] = json!(bad);
        let errors = validate_registration(&input).expect_err(bad);
        assert_eq!(errors.kind_of("email"), Some(IssueKind::InvalidFormat), "{bad}");
    }
}

#[test]
fn accepts_common_email_shapes() {
    for good in ["ann@x.com", "ann.lee+webinar@mail.example.org", "O'Neil@Example.IE"] {
        assert!(is_valid_email(good), "{good}");
    }
}

#[test]
fn session_id_must_be_hyphenated_uuid() {
    for bad in ["not-a-uuid", "1b4e28ba2fa111d2883f0016d3cca427", "{1b4e28ba-2fa1-11d2-883f-0016d3cca427}"] {
        let mut input = valid_input();
        input["sessionId"] = json!(bad);
        let errors = validate_registration(&input).expect_err(bad);
        assert_eq!(errors.kind_of("sessionId"), Some(IssueKind::InvalidFormat), "{bad}");
    }
}

#[test]
fn collects_every_field_error_at_once() {
    let errors = validate_registration(&json!({ "email": "nope", "phone": 42 }))
        .expect_err("invalid");
    assert_eq!(errors.kind_of("webinarId"), Some(IssueKind::Required));
    assert_eq!(errors.kind_of("sessionId"), Some(IssueKind::Required));
    assert_eq!(errors.kind_of("firstName"), Some(IssueKind::Required));
    assert_eq!(errors.kind_of("lastName"), Some(IssueKind::Required));
    assert_eq!(errors.kind_of("email"), Some(IssueKind::InvalidFormat));
    assert_eq!(errors.kind_of("phone"), Some(IssueKind::InvalidType));
    assert_eq!(errors.field_errors.len(), 6);
}

#[test]
fn wrong_types_are_reported_as_invalid_type() {
    let mut input = valid_input();
    input["firstName"] = json!(7);
    let errors = validate_registration(&input).expect_err("invalid");
    let issue = errors.get("firstName").expect("issue");
    assert_eq!(issue.kind, IssueKind::InvalidType);
    assert_eq!(issue.message, "Expected string, received number");
}

#[test]
fn non_object_input_is_a_form_error() {
    let errors = validate_registration(&json!(["Ann"])).expect_err("invalid");
    assert_eq!(errors.form_errors, vec!["Expected object, received array".to_string()]);
    assert!(errors.field_errors.is_empty());
}

#[test]
fn serializes_camel_case_and_skips_missing_phone() {
    let request = validate_registration(&valid_input()).expect("valid");
    let encoded = serde_json::to_value(&request).expect("json");
    assert_eq!(encoded, valid_input());
}
