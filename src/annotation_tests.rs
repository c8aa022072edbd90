use super::*;
use crate::descriptor::FileDescriptor;
use crate::file::File;

fn location(file_name: &str, path: &[i32]) -> Location {
    Location::new(
        File::new(FileDescriptor::new(file_name), false),
        path.to_vec(),
    )
}

fn annotation(rule_id: &str, location: Option<Location>) -> Annotation {
    Annotation::new(rule_id, "found", location, None).unwrap()
}

#[test]
fn new_rejects_invalid_rule_id() {
    assert!(Annotation::new("bad", "msg", None, None).is_err());
    assert!(Annotation::new("", "msg", None, None).is_err());
}

#[test]
fn orders_by_rule_id_first() {
    let mut annotations = vec![
        annotation("TYPE_NAME", Some(location("a.proto", &[4, 0]))),
        annotation("ENUM_NAME", Some(location("z.proto", &[4, 0]))),
    ];
    annotations.sort();
    assert_eq!(annotations[0].rule_id(), "ENUM_NAME");
}

#[test]
fn missing_location_sorts_before_present() {
    let mut annotations = vec![
        annotation("FIELD_NAME", Some(location("a.proto", &[4, 0]))),
        annotation("FIELD_NAME", None),
    ];
    annotations.sort();
    assert!(annotations[0].location().is_none());
    assert!(annotations[1].location().is_some());
}

#[test]
fn ties_break_by_file_name_then_path() {
    let mut annotations = vec![
        annotation("FIELD_NAME", Some(location("b.proto", &[4, 0]))),
        annotation("FIELD_NAME", Some(location("a.proto", &[4, 1, 2, 0]))),
        annotation("FIELD_NAME", Some(location("a.proto", &[4, 1]))),
    ];
    annotations.sort();
    let keys: Vec<(&str, &[i32])> = annotations
        .iter()
        .map(|a| {
            let location = a.location().unwrap();
            (location.file_name(), location.source_path())
        })
        .collect();
    assert_eq!(
        keys,
        vec![
            ("a.proto", &[4, 1][..]),
            ("a.proto", &[4, 1, 2, 0][..]),
            ("b.proto", &[4, 0][..]),
        ]
    );
}

#[test]
fn against_location_breaks_remaining_ties() {
    let with_against = Annotation::new(
        "FIELD_SAME_TYPE",
        "changed",
        Some(location("a.proto", &[4, 0])),
        Some(location("a.proto", &[4, 0])),
    )
    .unwrap();
    let without_against = Annotation::new(
        "FIELD_SAME_TYPE",
        "changed",
        Some(location("a.proto", &[4, 0])),
        None,
    )
    .unwrap();
    assert!(without_against < with_against);
}

#[test]
fn to_wire_includes_locations() {
    let wire = annotation("FIELD_NAME", Some(location("a.proto", &[4, 0]))).to_wire();
    assert_eq!(wire.rule_id, "FIELD_NAME");
    assert_eq!(wire.location.unwrap().file_name, "a.proto");
    assert!(wire.against_location.is_none());
}
