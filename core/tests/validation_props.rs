//! Property tests for field validation: a set of names passes iff every name
//! is on the resource's allow-list, and a rejected create never yields a
//! request.

use proptest::prelude::*;
use proptest::sample::subsequence;
use rt_core::{validate, ApiError, Auth, Fields, ResourceKind, RtClient};

fn arb_kind() -> impl Strategy<Value = ResourceKind> {
    prop_oneof![
        Just(ResourceKind::Queue),
        Just(ResourceKind::Ticket),
        Just(ResourceKind::Asset),
        Just(ResourceKind::User),
    ]
}

/// A kind together with a random subset of its allow-list.
fn arb_allowed_subset() -> impl Strategy<Value = (ResourceKind, Vec<&'static str>)> {
    arb_kind().prop_flat_map(|kind| {
        let table = kind.allowed_fields();
        (Just(kind), subsequence(table, 0..=table.len()))
    })
}

/// Names that are guaranteed to miss every table: lowercase identifiers
/// (all listed names start with an uppercase letter) or an `X-` prefix.
fn arb_stranger() -> impl Strategy<Value = String> {
    prop_oneof!["[a-z][a-zA-Z0-9]{0,12}", "X-[A-Za-z]{1,8}"]
}

proptest! {
    #[test]
    fn subsets_of_the_allow_list_pass((kind, names) in arb_allowed_subset()) {
        prop_assert!(validate(kind, names.iter().copied()).is_ok());
    }

    #[test]
    fn any_stranger_fails(
        (kind, names) in arb_allowed_subset(),
        stranger in arb_stranger(),
        position in any::<prop::sample::Index>(),
    ) {
        let mut owned: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        owned.insert(position.index(owned.len() + 1), stranger.clone());
        let err = validate(kind, owned.iter().map(String::as_str)).unwrap_err();
        match err {
            ApiError::InvalidField { field, resource, allowed } => {
                prop_assert_eq!(field, stranger);
                prop_assert_eq!(resource, kind);
                prop_assert_eq!(allowed, kind.allowed_fields());
            }
            other => prop_assert!(false, "unexpected error: {:?}", other),
        }
    }

    #[test]
    fn names_from_other_tables_follow_membership(kind in arb_kind(), other in arb_kind()) {
        for name in other.allowed_fields() {
            let expected = kind.allowed_fields().contains(name);
            prop_assert_eq!(validate(kind, [*name]).is_ok(), expected);
        }
    }

    #[test]
    fn rejected_queue_create_builds_nothing(stranger in arb_stranger()) {
        let client = RtClient::new("http://localhost:3000", Auth::token("t"));
        let fields = Fields::new().with("Description", "d").with(stranger.clone(), "v");
        let result = client.build_create_queue("q", &fields);
        prop_assert!(
            matches!(result, Err(ApiError::InvalidField { ref field, .. }) if *field == stranger),
            "expected InvalidField"
        );
    }
}
