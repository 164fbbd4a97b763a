#![cfg(feature = "chrono")]

mod common;

use common::*;
use polywire::{
    CodecError, EnumDecodeError, JsonCodec, ParseNode, ParseOptions, Parsable, TypeRegistry,
    UnknownEnumPolicy, WireEnum,
};
use serde_json::json;

// ========================================
// Wire names
// ========================================

#[test]
fn test_wire_names() {
    assert_eq!(RiskLevel::Low.to_wire(), "low");
    assert_eq!(RiskLevel::UnknownFutureValue.to_wire(), "unknownFutureValue");
    assert_eq!(GroupVisibility::HiddenMembership.to_wire(), "HiddenMembership");
    assert_eq!(DayOfWeek::Wednesday.to_wire(), "wednesday");
}

#[test]
fn test_to_wire_and_from_wire_are_inverse() {
    for member in all_members::<RiskLevel>() {
        assert_eq!(RiskLevel::from_wire(member.to_wire()), Ok(member));
    }
    for member in all_members::<GroupVisibility>() {
        assert_eq!(GroupVisibility::from_wire(member.to_wire()), Ok(member));
    }
    for member in all_members::<DayOfWeek>() {
        assert_eq!(DayOfWeek::from_wire(member.to_wire()), Ok(member));
    }
}

#[test]
fn test_matching_is_case_sensitive() {
    assert_eq!(
        RiskLevel::from_wire("LOW"),
        Err(EnumDecodeError::UnknownMember {
            enum_name: "RiskLevel",
            value: "LOW".to_owned(),
        })
    );
    assert!(GroupVisibility::from_wire("public").is_err());
}

#[test]
fn test_members_and_ordinals() {
    assert_eq!(RiskLevel::MEMBERS.len(), 5);
    assert_eq!(RiskLevel::High.ordinal(), 2);
    assert_eq!(RiskLevel::UNKNOWN, Some(RiskLevel::UnknownFutureValue));
    assert!(RiskLevel::UnknownFutureValue.is_unknown());
    assert!(!RiskLevel::Hidden.is_unknown());
    assert_eq!(DayOfWeek::UNKNOWN, None);
    assert_eq!(DayOfWeek::NAME, "DayOfWeek");
}

// ========================================
// Unknown values
// ========================================

#[test]
fn test_unknown_value_maps_to_future_value() {
    let registry = registry();
    let payload = json!({"@odata.type": "#microsoft.graph.user", "riskLevel": "extreme"});
    let user = polywire::decode::<User>(&to_bytes(&payload), &registry).unwrap();
    assert_eq!(user.risk_level, Some(RiskLevel::UnknownFutureValue));
    assert!(!user.additional_data().contains_key("riskLevel"));
}

#[test]
fn test_reject_policy_errors_with_path() {
    let codec = JsonCodec::new(registry()).with_parse_options(
        ParseOptions::default().with_unknown_enum_members(UnknownEnumPolicy::Reject),
    );
    let payload = json!({
        "@odata.type": "#microsoft.graph.group",
        "members": [{"@odata.type": "#microsoft.graph.user", "riskLevel": "extreme"}]
    });
    let err = codec.decode::<Group>(&to_bytes(&payload)).unwrap_err();
    match err {
        CodecError::Enum { path, source } => {
            assert_eq!(path, "$.members[0].riskLevel");
            assert_eq!(
                source,
                EnumDecodeError::UnknownMember {
                    enum_name: "RiskLevel",
                    value: "extreme".to_owned(),
                }
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_reject_policy_accepts_known_values() {
    let codec = JsonCodec::new(registry()).with_parse_options(
        ParseOptions::default().with_unknown_enum_members(UnknownEnumPolicy::Reject),
    );
    let payload = json!({"@odata.type": "#microsoft.graph.group", "visibility": "Private"});
    let group = codec.decode::<Group>(&to_bytes(&payload)).unwrap();
    assert_eq!(group.visibility, Some(GroupVisibility::Private));
}

#[test]
fn test_closed_enum_errors_under_either_policy() {
    let payload = json!({"daysOfWeek": ["monday", "someday"]});
    for policy in [UnknownEnumPolicy::FutureValue, UnknownEnumPolicy::Reject] {
        let codec = JsonCodec::default()
            .with_parse_options(ParseOptions::default().with_unknown_enum_members(policy));
        let err = codec.decode::<WorkingHours>(&to_bytes(&payload)).unwrap_err();
        assert!(
            matches!(&err, CodecError::Enum { path, .. } if path == "$.daysOfWeek[1]"),
            "{err}"
        );
    }
}

#[test]
fn test_non_string_enum_is_shape_mismatch() {
    let payload = json!({"visibility": 1});
    let err = polywire::decode::<Group>(&to_bytes(&payload), &registry()).unwrap_err();
    assert!(matches!(
        err,
        CodecError::ShapeMismatch { expected: "string", found: "number", .. }
    ));
}

// ========================================
// Collections and encoding
// ========================================

#[test]
fn test_enum_collection_keeps_order() {
    let payload = json!({"daysOfWeek": ["friday", "monday", "friday"], "startTime": "08:30:00"});
    let hours = polywire::decode::<WorkingHours>(&to_bytes(&payload), &TypeRegistry::default())
        .unwrap();
    assert_eq!(
        hours.days_of_week,
        Some(vec![DayOfWeek::Friday, DayOfWeek::Monday, DayOfWeek::Friday])
    );

    let bytes = polywire::encode(hours.as_parsable()).unwrap();
    assert_eq!(
        text(&bytes),
        r#"{"daysOfWeek":["friday","monday","friday"],"startTime":"08:30:00","endTime":null}"#
    );
}

#[test]
fn test_unknown_member_encodes_as_its_wire_name() {
    let mut value = user("u1", "Ada");
    value.risk_level = Some(RiskLevel::UnknownFutureValue);
    let written = reparse(&polywire::encode(&value).unwrap());
    assert_eq!(written["riskLevel"], json!("unknownFutureValue"));
}

#[test]
fn test_reader_enum_getters() {
    let registry = TypeRegistry::default();
    let options = ParseOptions::default();
    let payload = json!({"level": "medium", "levels": ["high", "brandNew"], "missing": null});
    let root = ParseNode::new(&payload, &registry, &options);

    let level = root.get_child_node("level").unwrap();
    assert_eq!(level.get_enum_value::<RiskLevel>().unwrap(), Some(RiskLevel::Medium));
    let levels = root.get_child_node("levels").unwrap();
    assert_eq!(
        levels.get_collection_of_enum_values::<RiskLevel>().unwrap(),
        Some(vec![RiskLevel::High, RiskLevel::UnknownFutureValue])
    );
    let missing = root.get_child_node("missing").unwrap();
    assert_eq!(missing.get_enum_value::<RiskLevel>().unwrap(), None);
}
