use proptest::prelude::*;
use rulescope::parse::{parse_dataset, parse_rules};
use rulescope::Dataset;

fn dataset() -> Dataset {
    parse_dataset(
        "age,color,label\n35,red,yes\n20,blue,no\n",
        ',',
        "label",
    )
    .unwrap()
}

/// Rule-shaped lines built from a small vocabulary to reach deep into the
/// grammar.
fn arb_rule_line() -> impl Strategy<Value = String> {
    let word = prop_oneof![
        Just("if"),
        Just("else"),
        Just("then"),
        Just("and"),
        Just("age"),
        Just("color"),
        Just("label"),
        Just(">="),
        Just("\u{2264}"),
        Just("!="),
        Just("="),
        Just("red"),
        Just("30"),
        Just("yes"),
        Just("no"),
        Just("(3/1)"),
        Just("("),
        Just("/"),
        Just(")"),
        Just("\""),
    ];
    prop::collection::vec(word, 0..12).prop_map(|words| words.join(" "))
}

proptest! {
    /// Arbitrary text is either accepted or rejected, never a panic.
    #[test]
    fn parse_rules_never_panics(text in "\\PC{0,200}") {
        let ds = dataset();
        let _ = parse_rules(&text, ds.catalog());
    }

    #[test]
    fn parse_rule_like_lines_never_panics(lines in prop::collection::vec(arb_rule_line(), 0..6)) {
        let ds = dataset();
        let _ = parse_rules(&lines.join("\n"), ds.catalog());
    }

    #[test]
    fn parse_dataset_never_panics(text in "[a-z0-9,\"\\n ]{0,200}") {
        let _ = parse_dataset(&text, ',', "label");
    }

    /// An accepted list always ends in exactly one default rule.
    #[test]
    fn accepted_lists_end_in_default(lines in prop::collection::vec(arb_rule_line(), 0..6)) {
        let ds = dataset();
        if let Ok(list) = parse_rules(&lines.join("\n"), ds.catalog()) {
            prop_assert!(list.default_rule().is_default());
            prop_assert_eq!(list.rules().iter().filter(|r| r.is_default()).count(), 1);
        }
    }
}
