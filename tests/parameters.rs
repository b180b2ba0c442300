//! Property tests for the parameter mini-language.

use opinet::parameters::{ParameterString, Value, decode, extract};
use proptest::prelude::*;

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Int),
        (-1.0e6f64..1.0e6).prop_map(Value::Float),
        any::<bool>().prop_map(Value::Bool),
        "[a-zA-Z0-9 _.,=()'\"\\\\-]{0,12}".prop_map(Value::Str),
        Just(Value::None),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_scalar().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Tuple),
            proptest::collection::vec(inner, 0..4).prop_map(Value::List),
        ]
    })
}

proptest! {
    #[test]
    fn rendered_literals_decode_back(value in arb_value()) {
        let text = value.to_string();
        prop_assert_eq!(decode(&text).unwrap(), value);
    }

    #[test]
    fn first_occurrence_wins(key in "[a-z]{1,3}_[a-z]{1,3}", a in any::<i64>(), b in any::<i64>()) {
        let line = format!("{key}={a}; {key}={b}");
        prop_assert_eq!(extract(&line, &key).unwrap(), Some(Value::Int(a)));
    }

    #[test]
    fn keys_match_exactly(a in 0i64..1000, b in 0i64..1000) {
        let line = format!("io_tol2={a}; io_tol={b}");
        prop_assert_eq!(extract(&line, "io_tol").unwrap(), Some(Value::Int(b)));
        prop_assert_eq!(extract(&line, "io_tol2").unwrap(), Some(Value::Int(a)));
        prop_assert_eq!(extract(&line, "io_to").unwrap(), None);
    }

    #[test]
    fn surrounding_whitespace_is_ignored(a in -100i64..100) {
        let line = format!("   io_met =  {a}  ;  ");
        prop_assert_eq!(extract(&line, "io_met").unwrap(), Some(Value::Int(a)));
    }
}

#[test]
fn default_lines_decode() {
    use opinet::simulation::config::*;

    for line in [DEFAULT_INITIAL_OPINION, DEFAULT_MODEL, DEFAULT_AGENT_PARAMETERS, DEFAULT_NETWORK] {
        let params = ParameterString::parse(line);
        for fragment in params.fragments() {
            assert!(params.extract(fragment.key).unwrap().is_some(), "{} in {}", fragment.key, line);
        }
    }
}
