#![cfg(feature = "chrono")]

mod common;

use common::*;
use polywire::{Parsable, WireEnum};
use proptest::prelude::*;
use serde_json::{json, Value};

fn extra_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "\\PC{0,12}".prop_map(Value::from),
    ];
    leaf.prop_recursive(2, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

fn arb_user() -> impl Strategy<Value = User> {
    (
        proptest::option::of("\\PC{0,16}"),
        proptest::option::of("\\PC{0,16}"),
        proptest::option::of(any::<bool>()),
        proptest::option::of(prop::collection::vec("[0-9 +]{0,12}", 0..3)),
        proptest::option::of(prop::sample::select(RiskLevel::MEMBERS)),
        prop::collection::vec(("x[A-Za-z]{1,8}", extra_value()), 0..5),
    )
        .prop_map(|(id, name, enabled, phones, risk, extras)| {
            let mut user = User::default();
            user.directory_object.entity.id = id;
            user.display_name = name;
            user.account_enabled = enabled;
            user.business_phones = phones;
            user.risk_level = risk;
            user.additional_data_mut().extend(extras);
            user
        })
}

proptest! {
    #[test]
    fn prop_user_round_trips_with_unknown_fields(user in arb_user()) {
        let registry = registry();
        let bytes = polywire::encode(&user).unwrap();
        let back = polywire::decode::<User>(&bytes, &registry).unwrap();
        prop_assert_eq!(back.get(), &user);
        prop_assert_eq!(polywire::encode(back.as_parsable()).unwrap(), bytes);
    }

    #[test]
    fn prop_user_survives_declared_base(user in arb_user()) {
        let registry = registry();
        let bytes = polywire::encode(&user).unwrap();
        let back = polywire::decode::<Entity>(&bytes, &registry).unwrap();
        prop_assert_eq!(back.downcast_ref::<User>(), Some(&user));
    }

    #[test]
    fn prop_enum_wire_names_are_a_bijection(member in prop::sample::select(RiskLevel::MEMBERS)) {
        prop_assert_eq!(RiskLevel::from_wire(member.to_wire()), Ok(member));
        let others = RiskLevel::MEMBERS.iter().filter(|other| **other != member);
        for other in others {
            prop_assert_ne!(other.to_wire(), member.to_wire());
        }
    }

    #[test]
    fn prop_unlisted_enum_strings_become_future_value(wire in "[a-zA-Z]{1,12}") {
        prop_assume!(RiskLevel::MEMBERS.iter().all(|member| member.to_wire() != wire));
        let payload = json!({"@odata.type": "#microsoft.graph.user", "riskLevel": wire});
        let user = polywire::decode::<User>(&to_bytes(&payload), &registry()).unwrap();
        prop_assert_eq!(user.risk_level, Some(RiskLevel::UnknownFutureValue));
    }
}
