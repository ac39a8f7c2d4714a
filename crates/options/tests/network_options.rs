use std::sync::Arc;

use optkit_host::{MemoryHost, NetworkBackend};
use optkit_options::{NetworkOption, OptionError, Registry, Strictness, ValueType};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

const NAME: &str = "network_option";

fn register(strict: Strictness, option: NetworkOption) -> (Arc<MemoryHost>, Registry) {
	let host = Arc::new(MemoryHost::multisite(1));
	let mut registry = Registry::new(strict, host.clone());
	registry.hook(host.hooks());
	registry.add_option(option);
	registry.register(None).unwrap();
	(host, registry)
}

fn option(ty: ValueType) -> NetworkOption {
	NetworkOption::new(NAME, ty).unwrap()
}

#[test]
fn scenario_deregistered_list_reads_as_absent() {
	let (host, mut registry) = register(
		Strictness::Coerce,
		option(ValueType::Array).with_default(json!(["a", "b"])),
	);
	assert_eq!(host.get_site_option(NAME, None).unwrap(), json!(["a", "b"]));
	assert!(host.add_site_option(NAME, json!(["c"])).unwrap());
	assert_eq!(host.get_site_option(NAME, None).unwrap(), json!(["c"]));

	registry.deregister(None).unwrap();
	assert_eq!(host.raw_site_option(NAME), None);
	assert_eq!(host.get_site_option(NAME, None).unwrap(), json!(false));
}

#[rstest]
#[case(ValueType::String, json!(123), json!("123"))]
#[case(ValueType::Boolean, json!("0"), json!(false))]
#[case(ValueType::Integer, json!("123"), json!(123))]
#[case(ValueType::Number, json!("12.3"), json!(12.3))]
#[case(ValueType::Array, json!("foo"), json!(["foo"]))]
#[case(ValueType::Array, json!(null), json!(null))]
fn declared_default_is_coerced(#[case] ty: ValueType, #[case] default: Value, #[case] expected: Value) {
	let (host, _registry) = register(Strictness::Coerce, option(ty).with_default(default));
	assert_eq!(host.get_site_option(NAME, None).unwrap(), expected);
	// Second read is answered from the negative cache.
	assert_eq!(host.get_site_option(NAME, None).unwrap(), expected);
}

#[rstest]
#[case(ValueType::String, json!("Hello World"), json!(123), json!("123"))]
#[case(ValueType::Boolean, json!(false), json!("true"), json!(true))]
#[case(ValueType::Integer, json!(1), json!("2"), json!(2))]
#[case(ValueType::Array, json!(["foo"]), json!("bar"), json!(["bar"]))]
fn callers_default_wins_over_declared(
	#[case] ty: ValueType,
	#[case] declared: Value,
	#[case] passed: Value,
	#[case] expected: Value,
) {
	let (host, _registry) = register(Strictness::Coerce, option(ty).with_default(declared));
	assert_eq!(host.get_site_option(NAME, Some(passed)).unwrap(), expected);
}

#[test]
fn strict_mistyped_default_fails_on_read() {
	let (host, _registry) = register(Strictness::Strict, option(ValueType::Integer).with_default(json!("1")));
	let err = host.get_site_option(NAME, None).unwrap_err();
	assert_eq!(err.to_string(), "Value must be of type integer, string given.");
}

#[rstest]
#[case(ValueType::String, json!(1.2), json!("1.2"))]
#[case(ValueType::Boolean, json!("false"), json!(false))]
#[case(ValueType::Integer, json!(1.9), json!(1))]
#[case(ValueType::Number, json!(false), json!(0))]
#[case(ValueType::Array, json!(true), json!([true]))]
fn coerced_add_and_update(#[case] ty: ValueType, #[case] value: Value, #[case] expected: Value) {
	let (host, _registry) = register(Strictness::Coerce, option(ty));
	assert!(host.add_site_option(NAME, value.clone()).unwrap());
	assert_eq!(host.get_site_option(NAME, None).unwrap(), expected);

	let (host, _registry) = register(Strictness::Coerce, option(ty));
	assert!(host.add_site_option(NAME, json!("initial")).unwrap());
	assert!(host.update_site_option(NAME, value).unwrap());
	assert_eq!(host.get_site_option(NAME, None).unwrap(), expected);
}

#[rstest]
#[case(ValueType::String, json!(1), "Value must be of type string, integer given.")]
#[case(ValueType::Boolean, json!(1), "Value must be of type boolean, integer given.")]
#[case(ValueType::Integer, json!(1.2), "Value must be of type integer, number (float) given.")]
#[case(ValueType::Number, json!("1"), "Value must be of type number, string given.")]
#[case(ValueType::Array, json!("foo"), "Value must be of type array, string given.")]
fn strict_writes_are_type_checked(#[case] ty: ValueType, #[case] value: Value, #[case] message: &str) {
	let (host, _registry) = register(Strictness::Strict, option(ty));
	let err = host.add_site_option(NAME, value.clone()).unwrap_err();
	assert_eq!(err.to_string(), message);
	assert!(matches!(OptionError::from_host(err), OptionError::Type(_)));
	assert_eq!(host.raw_site_option(NAME), None);

	assert!(host.add_site_option(NAME, Value::Null).unwrap());
	let err = host.update_site_option(NAME, value).unwrap_err();
	assert_eq!(err.to_string(), message);
}

#[rstest]
#[case(ValueType::Boolean, json!(false))]
#[case(ValueType::Number, json!(1.5))]
#[case(ValueType::Array, json!({ "foo": "bar" }))]
#[case(ValueType::String, json!(null))]
fn strict_values_round_trip(#[case] ty: ValueType, #[case] value: Value) {
	let (host, _registry) = register(Strictness::Strict, option(ty));
	assert!(host.add_site_option(NAME, value.clone()).unwrap());
	assert_eq!(host.get_site_option(NAME, None).unwrap(), value);
}

#[test]
fn add_is_not_mistaken_for_an_existing_value() {
	let (host, registry) = register(Strictness::Coerce, option(ValueType::Integer).with_default(json!(5)));

	// The add's existence probe runs the default callback too; it must not
	// answer with the declared default or the add would be refused.
	assert!(host.add_site_option(NAME, json!(7)).unwrap());
	assert_eq!(host.get_site_option(NAME, None).unwrap(), json!(7));
	assert_eq!(registry.registered_names(), vec![NAME]);
}

#[test]
fn add_after_a_cached_miss() {
	let (host, _registry) = register(Strictness::Coerce, option(ValueType::Integer).with_default(json!(5)));
	assert_eq!(host.get_site_option(NAME, None).unwrap(), json!(5));
	assert!(host.is_not_option(NAME));

	assert!(host.add_site_option(NAME, json!("9")).unwrap());
	assert!(!host.is_not_option(NAME));
	assert_eq!(host.get_site_option(NAME, None).unwrap(), json!(9));
}

#[test]
fn second_add_is_refused() {
	let (host, _registry) = register(Strictness::Strict, option(ValueType::String));
	assert!(host.add_site_option(NAME, json!("first")).unwrap());
	assert!(!host.add_site_option(NAME, json!("second")).unwrap());
	assert_eq!(host.get_site_option(NAME, None).unwrap(), json!("first"));
}

#[test]
fn stored_false_can_be_updated() {
	let (host, _registry) = register(Strictness::Strict, option(ValueType::Boolean));
	assert!(host.add_site_option(NAME, json!(false)).unwrap());
	assert_eq!(host.get_site_option(NAME, None).unwrap(), json!(false));

	assert!(host.update_site_option(NAME, json!(true)).unwrap());
	assert_eq!(host.get_site_option(NAME, None).unwrap(), json!(true));
}

#[test]
fn single_site_host_leaves_network_keys_alone() {
	let host = Arc::new(MemoryHost::new());
	let mut registry = Registry::new(Strictness::Strict, host.clone());
	registry.hook(host.hooks());
	registry.add_option(option(ValueType::Integer).with_default(json!(5)));
	registry.register(None).unwrap();

	assert!(!host.hooks().has_filter(&format!("default_site_option_{NAME}")));
	assert_eq!(host.get_site_option(NAME, None).unwrap(), json!(false));
	assert!(host.add_site_option(NAME, json!("raw")).unwrap());

	registry.deregister(None).unwrap();
	assert_eq!(host.raw_site_option(NAME), Some(json!("raw")));
}

#[test]
fn refused_add_does_not_shadow_a_later_default() {
	let (host, _registry) = register(Strictness::Coerce, option(ValueType::Integer).with_default(json!(5)));
	assert!(host.add_site_option(NAME, json!(1)).unwrap());
	assert!(!host.add_site_option(NAME, json!(2)).unwrap());

	assert!(host.delete_site_option(NAME).unwrap());
	assert_eq!(host.get_site_option(NAME, None).unwrap(), json!(5));
}
