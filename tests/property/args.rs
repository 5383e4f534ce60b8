use std::collections::{BTreeMap, HashSet};

use proptest::prelude::*;

use impress::command::{build, canonical_flag, ArgMap};
use impress::config::ImpressConfig;
use impress::types::{ArgValue, ExtraArgs};

// Key/value pairs with unique canonical keys, optionally written with one or
// two leading dashes.
fn pairs_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    proptest::collection::vec(
        (
            prop_oneof![Just(""), Just("-"), Just("--")],
            "[a-z][a-z0-9-]{0,8}",
            "[a-z0-9.]{1,6}",
        ),
        0..8,
    )
    .prop_map(|raw| {
        let mut seen = HashSet::new();
        raw.into_iter()
            .filter(|(_, name, _)| seen.insert(canonical_flag(name)))
            .map(|(prefix, name, value)| (format!("{prefix}{name}"), value))
            .collect()
    })
}

fn sorted_tokens(map: &ArgMap) -> Vec<String> {
    let mut tokens = map.to_tokens();
    tokens.sort();
    tokens
}

proptest! {
    #[test]
    fn all_extra_arg_shapes_normalise_equivalently(pairs in pairs_strategy()) {
        let line = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(" ");
        let list: Vec<String> = pairs.iter().map(|(k, v)| format!("{k}={v}")).collect();
        let map: BTreeMap<String, ArgValue> = pairs
            .iter()
            .map(|(k, v)| (k.clone(), ArgValue::Str(v.clone())))
            .collect();

        let mut from_line = ArgMap::with_defaults();
        from_line.merge_extra(&ExtraArgs::Line(line));
        let mut from_list = ArgMap::with_defaults();
        from_list.merge_extra(&ExtraArgs::List(list));
        let mut from_map = ArgMap::with_defaults();
        from_map.merge_extra(&ExtraArgs::Map(map));

        // Line and list keep the written order.
        prop_assert_eq!(&from_line, &from_list);
        prop_assert_eq!(sorted_tokens(&from_line), sorted_tokens(&from_map));

        for (key, _) in from_line.iter() {
            prop_assert!(key.starts_with("--"));
        }
    }

    #[test]
    fn build_is_deterministic(pairs in pairs_strategy(), url in "https?://[a-z]{1,10}\\.[a-z]{2,3}/[a-z0-9?=&]{0,12}") {
        let mut config = ImpressConfig::default();
        let list: Vec<String> = pairs.iter().map(|(k, v)| format!("{k}={v}")).collect();
        config.args.merge_extra(&ExtraArgs::List(list));

        let first = build(&config, &url);
        let second = build(&config, &url);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.to_string(), second.to_string());
    }
}
